//! Config composition: defaults policy and the merge service.

pub mod merge_policy;
pub mod service;

//! Tooling & Integration Layer
//!
//! Command-line entry points over the resolver.

pub mod cli;

pub use cli::{Cli, CliContext, Commands, OutputFormat};

//! Content fetcher contract.
//!
//! Agent documents live on content-addressed storage that can be slow or
//! briefly unavailable after upload. Fetchers report failures through
//! [`FetchError`], whose `is_transient` drives the retry policy.

pub mod http;

use crate::error::FetchError;
use async_trait::async_trait;
use serde_json::Value;

pub use http::{GatewayConfig, HttpContentFetcher};

/// Fetches JSON documents by URI.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch_json(&self, uri: &str) -> Result<Value, FetchError>;
}

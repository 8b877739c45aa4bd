//! HTTP content fetcher with IPFS and Arweave gateway rewriting.

use super::ContentFetcher;
use crate::error::FetchError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Gateways used to turn storage-native URIs into HTTP URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub ipfs_gateway: String,
    pub arweave_gateway: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            ipfs_gateway: "https://ipfs.io".to_string(),
            arweave_gateway: "https://arweave.net".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Map a content URI to the HTTP URL to request.
    ///
    /// `ipfs://<cid>/<path>` and `ar://<tx>` go through the configured
    /// gateways; `http` and `https` URIs pass through unchanged.
    pub fn resolve_url(&self, uri: &str) -> Result<String, FetchError> {
        let uri = uri.trim();
        if uri.starts_with("https://") || uri.starts_with("http://") {
            return Ok(uri.to_string());
        }
        if let Some(rest) = uri.strip_prefix("ipfs://") {
            let rest = rest.strip_prefix("ipfs/").unwrap_or(rest);
            if rest.is_empty() {
                return Err(FetchError::UnsupportedUri(uri.to_string()));
            }
            return Ok(format!(
                "{}/ipfs/{}",
                self.ipfs_gateway.trim_end_matches('/'),
                rest
            ));
        }
        if let Some(rest) = uri.strip_prefix("ar://") {
            if rest.is_empty() {
                return Err(FetchError::UnsupportedUri(uri.to_string()));
            }
            return Ok(format!(
                "{}/{}",
                self.arweave_gateway.trim_end_matches('/'),
                rest
            ));
        }
        Err(FetchError::UnsupportedUri(uri.to_string()))
    }
}

/// Content fetcher over HTTP.
pub struct HttpContentFetcher {
    client: reqwest::Client,
    gateways: GatewayConfig,
}

impl HttpContentFetcher {
    pub fn new(timeout: Duration, gateways: GatewayConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, gateways })
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch_json(&self, uri: &str) -> Result<Value, FetchError> {
        let url = self.gateways.resolve_url(uri)?;
        debug!(uri, url = %url, "Fetching agent document");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                uri: uri.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        decode_document(uri, &body)
    }
}

fn decode_document(uri: &str, body: &[u8]) -> Result<Value, FetchError> {
    serde_json::from_slice(body).map_err(|e| FetchError::Decode {
        uri: uri.to_string(),
        message: e.to_string(),
    })
}

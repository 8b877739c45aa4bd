//! Configuration
//!
//! Layered settings for the chain reader, content fetcher, retry policy,
//! resolver and logging. See [`ConfigLoader`] for source precedence.

mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;

use crate::content::GatewayConfig;
use crate::logging::LoggingConfig;
use crate::resolver::{ResolverSettings, DEFAULT_AGENT_SYMBOL};
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// RPC endpoint used when neither config nor environment names one.
pub const DEFAULT_RPC_ENDPOINT: &str = "https://mainnet.helius-rpc.com";

/// Environment variables consulted, in order, for the RPC endpoint.
pub const RPC_ENDPOINT_ENV_VARS: [&str; 2] = ["HELIUS_RPC", "SOLANA_RPC"];

/// Complete resolver configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub chain: ChainConfig,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub retry: RetryPolicy,

    #[serde(default)]
    pub resolver: ResolverSection,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Chain reader configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint with the DAS read API
    #[serde(default)]
    pub rpc_endpoint: Option<String>,

    /// Page size for owner listings
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,

    #[serde(default = "default_chain_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_page_limit() -> u32 {
    1000
}

fn default_chain_timeout_secs() -> u64 {
    30
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_endpoint: None,
            page_limit: default_page_limit(),
            request_timeout_secs: default_chain_timeout_secs(),
        }
    }
}

impl ChainConfig {
    /// Endpoint to use: config, then `HELIUS_RPC`, then `SOLANA_RPC`, then the default.
    pub fn resolved_endpoint(&self) -> String {
        self.resolved_endpoint_with(|key| std::env::var(key).ok())
    }

    pub(crate) fn resolved_endpoint_with(&self, lookup: impl Fn(&str) -> Option<String>) -> String {
        let non_empty = |value: String| {
            let trimmed = value.trim().to_string();
            (!trimmed.is_empty()).then_some(trimmed)
        };
        self.rpc_endpoint
            .clone()
            .and_then(non_empty)
            .or_else(|| {
                RPC_ENDPOINT_ENV_VARS
                    .iter()
                    .find_map(|key| lookup(key).and_then(non_empty))
            })
            .unwrap_or_else(|| DEFAULT_RPC_ENDPOINT.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Content fetcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_content_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_ipfs_gateway")]
    pub ipfs_gateway: String,

    #[serde(default = "default_arweave_gateway")]
    pub arweave_gateway: String,
}

fn default_content_timeout_secs() -> u64 {
    20
}

fn default_ipfs_gateway() -> String {
    GatewayConfig::default().ipfs_gateway
}

fn default_arweave_gateway() -> String {
    GatewayConfig::default().arweave_gateway
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_content_timeout_secs(),
            ipfs_gateway: default_ipfs_gateway(),
            arweave_gateway: default_arweave_gateway(),
        }
    }
}

impl ContentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn gateways(&self) -> GatewayConfig {
        GatewayConfig {
            ipfs_gateway: self.ipfs_gateway.clone(),
            arweave_gateway: self.arweave_gateway.clone(),
        }
    }
}

/// Resolver behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverSection {
    #[serde(default = "default_symbol")]
    pub default_symbol: String,

    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

fn default_symbol() -> String {
    DEFAULT_AGENT_SYMBOL.to_string()
}

fn default_max_concurrent_fetches() -> usize {
    4
}

impl Default for ResolverSection {
    fn default() -> Self {
        Self {
            default_symbol: default_symbol(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

impl ResolverConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.retry.validate()?;

        if self.chain.page_limit == 0 {
            return Err("chain.page_limit must be at least 1".to_string());
        }
        if self.resolver.max_concurrent_fetches == 0 {
            return Err("resolver.max_concurrent_fetches must be at least 1".to_string());
        }
        if self.resolver.default_symbol.trim().is_empty() {
            return Err("resolver.default_symbol cannot be empty".to_string());
        }
        for (key, gateway) in [
            ("content.ipfs_gateway", &self.content.ipfs_gateway),
            ("content.arweave_gateway", &self.content.arweave_gateway),
        ] {
            if !(gateway.starts_with("http://") || gateway.starts_with("https://")) {
                return Err(format!("{} must be an http(s) URL, got {}", key, gateway));
            }
        }

        Ok(())
    }

    /// Resolver settings derived from this configuration.
    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            retry: self.retry,
            max_concurrent_fetches: self.resolver.max_concurrent_fetches,
            default_symbol: self.resolver.default_symbol.trim().to_string(),
        }
    }
}

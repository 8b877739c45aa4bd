//! Error types for agent resolution.
//!
//! Chain and content collaborators report their own error enums. The resolver
//! absorbs content failures into degraded records and only surfaces
//! [`ResolveError`]; [`ApiError`] sits above it for configuration, logging and
//! CLI concerns.

use thiserror::Error;

/// Errors reported by a chain reader.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Token not found: {0}")]
    NotFound(String),

    #[error("Chain transport error: {0}")]
    Transport(String),

    #[error("Chain RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Invalid chain response: {0}")]
    InvalidResponse(String),
}

impl ChainError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ChainError::NotFound(_))
    }
}

/// Errors reported by a content fetcher.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Content transport error: {0}")]
    Transport(String),

    #[error("Content request to {uri} returned HTTP {status}")]
    Status { uri: String, status: u16 },

    #[error("Content at {uri} is not valid JSON: {message}")]
    Decode { uri: String, message: String },

    #[error("Unsupported content URI: {0}")]
    UnsupportedUri(String),
}

impl FetchError {
    /// Whether another attempt may succeed.
    ///
    /// Content networks are eventually available: a freshly uploaded document
    /// can 404 or time out for a while before it is served.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::Status { status, .. } => {
                matches!(status, 404 | 408 | 425 | 429) || (500..600).contains(status)
            }
            FetchError::Decode { .. } => false,
            FetchError::UnsupportedUri(_) => false,
        }
    }
}

/// Outcome of an operation that ran under a retry policy and did not succeed.
#[derive(Debug, Error)]
pub enum RetryError<E: std::error::Error + 'static> {
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },

    #[error("permanent failure on attempt {attempt}: {source}")]
    Permanent {
        attempt: u32,
        #[source]
        source: E,
    },

    #[error("cancelled")]
    Cancelled,
}

impl<E: std::error::Error + 'static> RetryError<E> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled)
    }
}

/// Errors surfaced by the resolver to its caller.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Chain reader failed: {0}")]
    Chain(#[from] ChainError),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Resolution cancelled")]
    Cancelled,
}

/// Top-level error for configuration, logging and command execution.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Output error: {0}")]
    OutputError(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

//! Chain reader contract and token records.
//!
//! The chain is the source of truth for agent identity. Readers map whatever
//! their backend returns into [`TokenRecord`], normalizing the collection
//! reference so the resolver never sees upstream shape differences.

pub mod rpc;

use crate::error::ChainError;
use crate::types::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use rpc::RpcChainReader;

/// On-chain fields of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub mint: String,
    pub name: String,
    pub symbol: String,
    pub content_uri: String,
    pub collection: Option<CollectionRef>,
}

/// Normalized collection reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRef {
    pub address: String,
    pub verified: bool,
}

/// Collection reference as upstream SDKs and indexers emit it.
///
/// Older payloads carry the bare key, newer ones a `{key, verified}` wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawCollection {
    Key(String),
    Wrapped {
        key: String,
        #[serde(default)]
        verified: bool,
    },
}

impl RawCollection {
    /// Normalize to a [`CollectionRef`]. Empty keys and `"None"` mean no collection.
    pub fn normalize(self) -> Option<CollectionRef> {
        let (key, verified) = match self {
            RawCollection::Key(key) => (key, false),
            RawCollection::Wrapped { key, verified } => (key, verified),
        };
        let key = key.trim();
        if key.is_empty() || key == "None" {
            return None;
        }
        Some(CollectionRef {
            address: key.to_string(),
            verified,
        })
    }
}

/// Read access to token records.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Fetch a single token. Returns [`ChainError::NotFound`] when no token exists.
    async fn fetch_token(&self, mint: &Address) -> Result<TokenRecord, ChainError>;

    /// Fetch every token held by `owner`.
    async fn fetch_tokens_by_owner(&self, owner: &Address) -> Result<Vec<TokenRecord>, ChainError>;
}

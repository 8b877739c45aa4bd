//! JSON-RPC chain reader backed by a Digital Asset Standard (DAS) endpoint.
//!
//! Uses `getAsset` for single lookups and pages through `getAssetsByOwner`
//! for owner listings. Calls are made once; retrying chain reads is left to
//! the caller.

use super::{ChainReader, RawCollection, TokenRecord};
use crate::error::ChainError;
use crate::types::Address;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// JSON-RPC request id sent with every call.
const REQUEST_ID: &str = "agent-resolver";

/// Grouping key DAS uses for collection membership.
const COLLECTION_GROUP: &str = "collection";

/// Chain reader talking JSON-RPC over HTTP.
pub struct RpcChainReader {
    client: reqwest::Client,
    endpoint: String,
    page_limit: u32,
}

impl RpcChainReader {
    /// Create a reader for `endpoint`.
    pub fn new(
        endpoint: impl Into<String>,
        page_limit: u32,
        timeout: Duration,
    ) -> Result<Self, ChainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChainError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            page_limit: page_limit.max(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(&self, method: &str, params: Value) -> Result<RpcResponse, ChainError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": REQUEST_ID,
            "method": method,
            "params": params,
        });

        debug!(method, endpoint = %self.endpoint, "Sending chain RPC request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Transport(format!("{} request failed: {}", method, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChainError::Transport(format!(
                "{} returned HTTP {}",
                method,
                status.as_u16()
            )));
        }

        response
            .json::<RpcResponse>()
            .await
            .map_err(|e| ChainError::InvalidResponse(format!("{}: {}", method, e)))
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn fetch_token(&self, mint: &Address) -> Result<TokenRecord, ChainError> {
        let response = self
            .call("getAsset", json!({ "id": mint.as_str() }))
            .await?;
        let result = response.into_result(mint.as_str())?;
        let asset: AssetPayload = serde_json::from_value(result)
            .map_err(|e| ChainError::InvalidResponse(format!("getAsset: {}", e)))?;
        Ok(asset.into_token())
    }

    async fn fetch_tokens_by_owner(&self, owner: &Address) -> Result<Vec<TokenRecord>, ChainError> {
        let mut tokens = Vec::new();
        let mut page = 1u32;

        loop {
            let response = self
                .call(
                    "getAssetsByOwner",
                    json!({
                        "ownerAddress": owner.as_str(),
                        "page": page,
                        "limit": self.page_limit,
                    }),
                )
                .await?;
            let result = response.into_result(owner.as_str())?;
            let assets: AssetPage = serde_json::from_value(result)
                .map_err(|e| ChainError::InvalidResponse(format!("getAssetsByOwner: {}", e)))?;

            let count = assets.items.len();
            tokens.extend(assets.items.into_iter().map(AssetPayload::into_token));

            debug!(owner = %owner, page, count, "Fetched owner asset page");

            if count < self.page_limit as usize {
                break;
            }
            page += 1;
        }

        Ok(tokens)
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

impl RpcResponse {
    /// Unwrap the result, mapping "not found" errors and null results to `NotFound`.
    fn into_result(self, subject: &str) -> Result<Value, ChainError> {
        if let Some(error) = self.error {
            if error.message.to_lowercase().contains("not found") {
                return Err(ChainError::NotFound(subject.to_string()));
            }
            return Err(ChainError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        match self.result {
            Some(Value::Null) | None => Err(ChainError::NotFound(subject.to_string())),
            Some(result) => Ok(result),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AssetPage {
    #[serde(default)]
    items: Vec<AssetPayload>,
}

#[derive(Debug, Deserialize)]
struct AssetPayload {
    id: String,
    #[serde(default)]
    content: AssetContent,
    #[serde(default)]
    grouping: Vec<GroupingEntry>,
    #[serde(default)]
    collection: Option<RawCollection>,
}

#[derive(Debug, Default, Deserialize)]
struct AssetContent {
    #[serde(default)]
    json_uri: String,
    #[serde(default)]
    metadata: AssetMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct AssetMetadata {
    #[serde(default)]
    name: String,
    #[serde(default)]
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct GroupingEntry {
    group_key: String,
    #[serde(default)]
    group_value: Option<String>,
    #[serde(default)]
    verified: Option<bool>,
}

impl AssetPayload {
    fn into_token(self) -> TokenRecord {
        let collection = match self.collection {
            Some(raw) => raw.normalize(),
            None => self
                .grouping
                .into_iter()
                .find(|g| g.group_key == COLLECTION_GROUP)
                .and_then(|g| {
                    // DAS lists unverified groupings only on request, so a
                    // missing flag means verified.
                    let verified = g.verified.unwrap_or(true);
                    RawCollection::Wrapped {
                        key: g.group_value?,
                        verified,
                    }
                    .normalize()
                }),
        };

        TokenRecord {
            mint: self.id,
            name: clean_onchain_string(&self.content.metadata.name),
            symbol: clean_onchain_string(&self.content.metadata.symbol),
            content_uri: clean_onchain_string(&self.content.json_uri),
            collection,
        }
    }
}

/// Strip the NUL padding fixed-width on-chain strings carry.
fn clean_onchain_string(value: &str) -> String {
    value.trim_end_matches('\0').trim().to_string()
}

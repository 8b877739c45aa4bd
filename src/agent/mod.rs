//! Agent records
//!
//! An [`Agent`] is the normalized view of one agent NFT: identity fields from
//! the chain plus optional configuration read from the off-chain document.
//! Records are built fresh on every resolution and never cached here.

pub mod document;

use crate::chain::TokenRecord;
use serde::Serialize;
use serde_json::Value;

pub use document::{parse_document, DocumentFields};

/// Normalized agent record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    /// Token mint address, the sole identity of the agent
    pub mint: String,
    pub name: String,
    pub symbol: String,
    /// Content URI the document was (or would have been) read from
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// System prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Always finite when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    /// Unparsed document, kept for display and fields this crate does not read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_document: Option<Value>,
}

impl Agent {
    /// Record carrying only the chain fields.
    ///
    /// Used when the document could not be fetched or was not a JSON object.
    pub fn from_token(token: &TokenRecord) -> Self {
        Self {
            mint: token.mint.clone(),
            name: token.name.clone(),
            symbol: token.symbol.clone(),
            uri: token.content_uri.clone(),
            image: None,
            prompt: None,
            model: None,
            temperature: None,
            external_url: None,
            raw_document: None,
        }
    }

    /// Record built from the chain fields and a fetched document.
    pub fn from_document(token: &TokenRecord, document: Value) -> Self {
        if !document.is_object() {
            return Self::from_token(token);
        }
        let fields = parse_document(&document);
        Self {
            image: fields.image,
            prompt: fields.prompt,
            model: fields.model,
            temperature: fields.temperature,
            external_url: fields.external_url,
            raw_document: Some(document),
            ..Self::from_token(token)
        }
    }

    /// Whether the off-chain document was loaded.
    ///
    /// Callers render a "metadata unavailable" notice when this is false.
    pub fn has_metadata(&self) -> bool {
        self.raw_document.is_some()
    }
}

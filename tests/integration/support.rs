//! In-memory chain reader and content fetcher.

use agent_resolver::chain::{ChainReader, CollectionRef, TokenRecord};
use agent_resolver::content::ContentFetcher;
use agent_resolver::error::{ChainError, FetchError};
use agent_resolver::types::Address;
use agent_resolver::{AgentResolver, ResolverSettings, RetryPolicy};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Base58 address made of 32 copies of `byte`.
pub fn address(byte: u8) -> String {
    bs58::encode([byte; 32]).into_string()
}

pub fn token(mint: &str, symbol: &str) -> TokenRecord {
    TokenRecord {
        mint: mint.to_string(),
        name: format!("Agent {}", &mint[..6]),
        symbol: symbol.to_string(),
        content_uri: format!("https://arweave.net/{}", mint),
        collection: None,
    }
}

pub fn in_collection(mut token: TokenRecord, collection: Option<CollectionRef>) -> TokenRecord {
    token.collection = collection;
    token
}

#[derive(Default)]
pub struct FakeChain {
    tokens: HashMap<String, TokenRecord>,
    owners: HashMap<String, Vec<TokenRecord>>,
    failure: Option<fn() -> ChainError>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: TokenRecord) -> Self {
        self.tokens.insert(token.mint.clone(), token);
        self
    }

    pub fn with_owner(mut self, owner: &str, tokens: Vec<TokenRecord>) -> Self {
        for token in &tokens {
            self.tokens.insert(token.mint.clone(), token.clone());
        }
        self.owners.insert(owner.to_string(), tokens);
        self
    }

    pub fn failing(failure: fn() -> ChainError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ChainReader for FakeChain {
    async fn fetch_token(&self, mint: &Address) -> Result<TokenRecord, ChainError> {
        if let Some(failure) = self.failure {
            return Err(failure());
        }
        self.tokens
            .get(mint.as_str())
            .cloned()
            .ok_or_else(|| ChainError::NotFound(mint.to_string()))
    }

    async fn fetch_tokens_by_owner(&self, owner: &Address) -> Result<Vec<TokenRecord>, ChainError> {
        if let Some(failure) = self.failure {
            return Err(failure());
        }
        Ok(self.owners.get(owner.as_str()).cloned().unwrap_or_default())
    }
}

/// How the fake answers for one URI.
#[derive(Clone)]
pub enum Behavior {
    Document(Value),
    /// Fails with the given HTTP status every time
    Status(u16),
    /// Fails with HTTP 503 `failures` times, then serves the document
    Flaky { failures: usize, document: Value },
    /// Body is not JSON
    Garbage,
}

#[derive(Default)]
pub struct FakeContent {
    behaviors: HashMap<String, Behavior>,
    calls: Mutex<HashMap<String, usize>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, uri: &str, behavior: Behavior) -> Self {
        self.behaviors.insert(uri.to_string(), behavior);
        self
    }

    /// Every fetch waits `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self, uri: &str) -> usize {
        self.calls.lock().unwrap().get(uri).copied().unwrap_or(0)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentFetcher for FakeContent {
    async fn fetch_json(&self, uri: &str) -> Result<Value, FetchError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(uri.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let status = |status| FetchError::Status {
            uri: uri.to_string(),
            status,
        };
        match self.behaviors.get(uri) {
            Some(Behavior::Document(document)) => Ok(document.clone()),
            Some(Behavior::Status(code)) => Err(status(*code)),
            Some(Behavior::Flaky { failures, document }) => {
                if call <= *failures {
                    Err(status(503))
                } else {
                    Ok(document.clone())
                }
            }
            Some(Behavior::Garbage) => Err(FetchError::Decode {
                uri: uri.to_string(),
                message: "expected value at line 1 column 1".to_string(),
            }),
            None => Err(status(404)),
        }
    }
}

/// Settings with a short backoff so failing fetches finish quickly.
pub fn fast_settings() -> ResolverSettings {
    ResolverSettings {
        retry: RetryPolicy {
            max_attempts: 3,
            base_delay_ms: 1,
            factor: 1.0,
        },
        ..ResolverSettings::default()
    }
}

pub fn resolver(chain: FakeChain, content: Arc<FakeContent>) -> AgentResolver {
    AgentResolver::with_settings(Arc::new(chain), content, fast_settings())
}

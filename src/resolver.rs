//! Agent Metadata Resolver
//!
//! Turns a mint address, or every agent token an owner holds, into [`Agent`]
//! records. The chain is authoritative: chain failures are returned to the
//! caller, while an unavailable or malformed off-chain document only degrades
//! the record to its chain fields.
//!
//! Owner listings fetch documents concurrently up to a fixed bound. Results
//! are sorted by mint (descending) afterwards, so completion order never shows
//! in the output.

use crate::agent::Agent;
use crate::chain::{ChainReader, TokenRecord};
use crate::content::ContentFetcher;
use crate::error::{ChainError, FetchError, ResolveError, RetryError};
use crate::retry::{with_retry, RetryPolicy};
use crate::types::Address;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Symbol tagging the product's own agent tokens.
pub const DEFAULT_AGENT_SYMBOL: &str = "H402";

/// Resolver tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverSettings {
    /// Backoff policy for document fetches
    pub retry: RetryPolicy,
    /// Maximum document fetches in flight during an owner listing
    pub max_concurrent_fetches: usize,
    /// Symbol used when an owner filter does not name one
    pub default_symbol: String,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            max_concurrent_fetches: 4,
            default_symbol: DEFAULT_AGENT_SYMBOL.to_string(),
        }
    }
}

/// Selects which owned tokens are agents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerFilter {
    /// Required symbol, compared case-insensitively; `None` uses the resolver default
    pub symbol: Option<String>,
    /// Required collection address; verification status is not checked
    pub collection: Option<Address>,
}

impl OwnerFilter {
    pub fn with_symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            collection: None,
        }
    }

    pub fn in_collection(mut self, collection: Address) -> Self {
        self.collection = Some(collection);
        self
    }

    /// Whether `token` passes the filter.
    pub fn matches(&self, token: &TokenRecord, default_symbol: &str) -> bool {
        let wanted = self.symbol.as_deref().unwrap_or(default_symbol);
        if token.symbol.to_uppercase() != wanted.to_uppercase() {
            return false;
        }
        match &self.collection {
            Some(wanted) => token
                .collection
                .as_ref()
                .is_some_and(|c| c.address == wanted.as_str()),
            None => true,
        }
    }
}

/// Resolves agent tokens into [`Agent`] records.
pub struct AgentResolver {
    chain: Arc<dyn ChainReader>,
    content: Arc<dyn ContentFetcher>,
    settings: ResolverSettings,
}

impl AgentResolver {
    /// Create a resolver with default settings.
    pub fn new(chain: Arc<dyn ChainReader>, content: Arc<dyn ContentFetcher>) -> Self {
        Self::with_settings(chain, content, ResolverSettings::default())
    }

    pub fn with_settings(
        chain: Arc<dyn ChainReader>,
        content: Arc<dyn ContentFetcher>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            chain,
            content,
            settings,
        }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Resolve a single agent by mint.
    ///
    /// Returns `Ok(None)` when the address is malformed or no token exists.
    pub async fn resolve_by_mint(&self, mint: &str) -> Result<Option<Agent>, ResolveError> {
        self.resolve_by_mint_with_cancel(mint, &CancellationToken::new())
            .await
    }

    /// [`resolve_by_mint`](Self::resolve_by_mint) that stops when `cancel` fires.
    pub async fn resolve_by_mint_with_cancel(
        &self,
        mint: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Agent>, ResolveError> {
        let address = match Address::parse(mint) {
            Ok(address) => address,
            Err(e) => {
                debug!(mint, error = %e, "Malformed mint address, treating as not found");
                return Ok(None);
            }
        };

        let token = match cancellable(cancel, self.chain.fetch_token(&address)).await? {
            Ok(token) => token,
            Err(ChainError::NotFound(_)) => {
                debug!(mint = %address, "Token not found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        self.resolve_token(token, cancel).await.map(Some)
    }

    /// Resolve every agent token held by `owner` that passes `filter`.
    ///
    /// A document failure degrades only the affected record. The result is
    /// sorted by mint, descending.
    pub async fn resolve_by_owner(
        &self,
        owner: &str,
        filter: &OwnerFilter,
    ) -> Result<Vec<Agent>, ResolveError> {
        self.resolve_by_owner_with_cancel(owner, filter, &CancellationToken::new())
            .await
    }

    /// [`resolve_by_owner`](Self::resolve_by_owner) that stops when `cancel` fires.
    pub async fn resolve_by_owner_with_cancel(
        &self,
        owner: &str,
        filter: &OwnerFilter,
        cancel: &CancellationToken,
    ) -> Result<Vec<Agent>, ResolveError> {
        let owner = Address::parse(owner)
            .map_err(|e| ResolveError::InvalidAddress(format!("{}: {}", owner.trim(), e)))?;

        let tokens = cancellable(cancel, self.chain.fetch_tokens_by_owner(&owner)).await??;
        let held = tokens.len();

        let mut matching: Vec<TokenRecord> = tokens
            .into_iter()
            .filter(|token| filter.matches(token, &self.settings.default_symbol))
            .collect();
        sort_by_mint_desc(&mut matching, |token| &token.mint);
        matching.dedup_by(|a, b| a.mint == b.mint);

        let concurrency = self.settings.max_concurrent_fetches.max(1);
        let results: Vec<Result<Agent, ResolveError>> = stream::iter(matching)
            .map(move |token| self.resolve_token(token, cancel))
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut agents = results.into_iter().collect::<Result<Vec<_>, _>>()?;
        sort_by_mint_desc(&mut agents, |agent| &agent.mint);

        info!(
            owner = %owner,
            held,
            matched = agents.len(),
            degraded = agents.iter().filter(|a| !a.has_metadata()).count(),
            "Resolved owner agents"
        );

        Ok(agents)
    }

    /// Build the record for a token, degrading when its document is unavailable.
    async fn resolve_token(
        &self,
        token: TokenRecord,
        cancel: &CancellationToken,
    ) -> Result<Agent, ResolveError> {
        match self.fetch_document(&token.content_uri, cancel).await {
            Ok(document) => {
                let agent = Agent::from_document(&token, document);
                if !agent.has_metadata() {
                    warn!(
                        mint = %token.mint,
                        uri = %token.content_uri,
                        "Agent document is not a JSON object, returning chain fields only"
                    );
                }
                Ok(agent)
            }
            Err(RetryError::Cancelled) => Err(ResolveError::Cancelled),
            Err(e) => {
                warn!(
                    mint = %token.mint,
                    uri = %token.content_uri,
                    error = %e,
                    "Agent document unavailable, returning chain fields only"
                );
                Ok(Agent::from_token(&token))
            }
        }
    }

    async fn fetch_document(
        &self,
        uri: &str,
        cancel: &CancellationToken,
    ) -> Result<Value, RetryError<FetchError>> {
        let content: &dyn ContentFetcher = self.content.as_ref();
        with_retry(
            &self.settings.retry,
            cancel,
            FetchError::is_transient,
            move |attempt| {
                debug!(uri, attempt, "Fetching agent document");
                content.fetch_json(uri)
            },
        )
        .await
    }
}

/// Await `future` unless `cancel` fires first.
async fn cancellable<T>(
    cancel: &CancellationToken,
    future: impl Future<Output = T>,
) -> Result<T, ResolveError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ResolveError::Cancelled),
        value = future => Ok(value),
    }
}

fn sort_by_mint_desc<T>(items: &mut [T], mint: impl Fn(&T) -> &String) {
    items.sort_by(|a, b| mint(b).cmp(mint(a)));
}

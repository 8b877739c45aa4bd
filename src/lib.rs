//! Agent Resolver: agent NFT metadata resolution
//!
//! Reads agent tokens from a Solana RPC endpoint with the DAS read API, fetches
//! their off-chain documents from IPFS or Arweave, and normalizes both document
//! schemas into a single [`Agent`] record.

pub mod agent;
pub mod chain;
pub mod config;
pub mod content;
pub mod error;
pub mod logging;
pub mod resolver;
pub mod retry;
pub mod tooling;
pub mod types;

pub use agent::Agent;
pub use chain::{ChainReader, CollectionRef, TokenRecord};
pub use content::ContentFetcher;
pub use error::{ApiError, ChainError, FetchError, ResolveError, RetryError};
pub use resolver::{AgentResolver, OwnerFilter, ResolverSettings};
pub use retry::RetryPolicy;
pub use types::Address;

//! CLI Tooling
//!
//! Command-line interface over [`AgentResolver`]: look up one agent by mint or
//! list the agents an owner holds.

use crate::agent::Agent;
use crate::chain::RpcChainReader;
use crate::config::{ConfigLoader, ResolverConfig};
use crate::content::HttpContentFetcher;
use crate::error::{ApiError, ResolveError};
use crate::logging::LogOverrides;
use crate::resolver::{AgentResolver, OwnerFilter};
use crate::types::Address;
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use owo_colors::{OwoColorize, Stream};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Agent resolver CLI - resolve agent NFTs into agent records
#[derive(Parser, Debug)]
#[command(name = "agent-resolver")]
#[command(about = "Resolve agent NFTs into agent records from on-chain and off-chain metadata")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// RPC endpoint with the DAS read API (overrides config and environment)
    #[arg(long, global = true)]
    pub rpc: Option<String>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Logging flags given on the command line.
    pub fn log_overrides(&self) -> LogOverrides {
        LogOverrides {
            level: self.log_level.clone(),
            format: self.log_format.clone(),
            output: self.log_output.clone(),
            file: self.log_file.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a single agent by mint address
    Mint {
        /// Mint address (base58)
        mint: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List the agents held by an owner
    Owner {
        /// Owner wallet address (base58)
        owner: String,
        /// Symbol to match (case-insensitive); defaults to the configured symbol
        #[arg(long)]
        symbol: Option<String>,
        /// Only include tokens in this collection
        #[arg(long)]
        collection: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// CLI context holding the loaded configuration and resolver
pub struct CliContext {
    config: ResolverConfig,
    resolver: AgentResolver,
}

impl CliContext {
    /// Create a new CLI context
    pub fn new(config_path: Option<PathBuf>, rpc: Option<String>) -> Result<Self, ApiError> {
        let mut config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };
        if let Some(rpc) = rpc {
            config.chain.rpc_endpoint = Some(rpc);
        }

        let chain = RpcChainReader::new(
            config.chain.resolved_endpoint(),
            config.chain.page_limit,
            config.chain.request_timeout(),
        )
        .map_err(ResolveError::from)?;
        let content = HttpContentFetcher::new(config.content.timeout(), config.content.gateways())
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let resolver = AgentResolver::with_settings(
            Arc::new(chain),
            Arc::new(content),
            config.resolver_settings(),
        );

        Ok(Self { config, resolver })
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Execute a CLI command
    pub async fn execute(
        &self,
        command: &Commands,
        cancel: &CancellationToken,
    ) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = self.execute_inner(command, cancel).await;
        info!(
            command = command_name(command),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    async fn execute_inner(
        &self,
        command: &Commands,
        cancel: &CancellationToken,
    ) -> Result<String, ApiError> {
        match command {
            Commands::Mint { mint, format } => {
                let agent = self
                    .resolver
                    .resolve_by_mint_with_cancel(mint, cancel)
                    .await?;
                match format {
                    OutputFormat::Text => Ok(format_mint_result_text(
                        mint,
                        agent.as_ref(),
                        self.config.logging.color,
                    )),
                    OutputFormat::Json => format_mint_result_json(agent.as_ref()),
                }
            }
            Commands::Owner {
                owner,
                symbol,
                collection,
                format,
            } => {
                let filter = build_owner_filter(symbol.as_deref(), collection.as_deref())?;
                let agents = self
                    .resolver
                    .resolve_by_owner_with_cancel(owner, &filter, cancel)
                    .await?;
                match format {
                    OutputFormat::Text => Ok(format_owner_result_text(owner, &agents)),
                    OutputFormat::Json => format_owner_result_json(owner, &agents),
                }
            }
        }
    }
}

fn build_owner_filter(
    symbol: Option<&str>,
    collection: Option<&str>,
) -> Result<OwnerFilter, ApiError> {
    let collection = collection
        .map(|c| {
            Address::parse(c)
                .map_err(|e| ResolveError::InvalidAddress(format!("{}: {}", c.trim(), e)))
        })
        .transpose()?;
    Ok(OwnerFilter {
        symbol: symbol.map(str::to_string),
        collection,
    })
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Mint { .. } => "mint",
        Commands::Owner { .. } => "owner",
    }
}

const METADATA_UNAVAILABLE: &str = "metadata unavailable";

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

fn format_temperature(value: Option<f64>) -> String {
    value.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Bold heading when `color` is on and stdout supports it (tty, no `NO_COLOR`).
fn format_heading(title: &str, color: bool) -> String {
    if color {
        format!(
            "{}",
            title.if_supports_color(Stream::Stdout, |t| t.bold())
        )
    } else {
        title.to_string()
    }
}

/// Format a single agent as text
fn format_mint_result_text(mint: &str, agent: Option<&Agent>, color: bool) -> String {
    let Some(agent) = agent else {
        return format!("No agent found for mint {}", mint.trim());
    };

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Mint".to_string(), agent.mint.clone()]);
    table.add_row(vec!["Name".to_string(), agent.name.clone()]);
    table.add_row(vec!["Symbol".to_string(), agent.symbol.clone()]);
    table.add_row(vec!["URI".to_string(), agent.uri.clone()]);
    if agent.has_metadata() {
        table.add_row(vec!["Model".to_string(), or_dash(agent.model.as_deref())]);
        table.add_row(vec![
            "Temperature".to_string(),
            format_temperature(agent.temperature),
        ]);
        table.add_row(vec!["Image".to_string(), or_dash(agent.image.as_deref())]);
        table.add_row(vec![
            "External URL".to_string(),
            or_dash(agent.external_url.as_deref()),
        ]);
    }

    let mut out = format!("{}\n{}\n", format_heading(&agent.name, color), table);
    match (&agent.prompt, agent.has_metadata()) {
        (_, false) => out.push_str(&format!("\n({})\n", METADATA_UNAVAILABLE)),
        (Some(prompt), true) => out.push_str(&format!("\nPrompt:\n{}\n", prompt)),
        (None, true) => {}
    }
    out
}

/// Format a single agent as JSON; `null` when not found
fn format_mint_result_json(agent: Option<&Agent>) -> Result<String, ApiError> {
    serde_json::to_string_pretty(&agent)
        .map_err(|e| ApiError::OutputError(format!("Failed to serialize agent: {}", e)))
}

/// Format an owner listing as text
fn format_owner_result_text(owner: &str, agents: &[Agent]) -> String {
    if agents.is_empty() {
        return format!("No agents found for owner {}", owner.trim());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Mint", "Name", "Symbol", "Model", "Temperature", "Metadata"]);
    for agent in agents {
        let status = if agent.has_metadata() {
            "ok"
        } else {
            METADATA_UNAVAILABLE
        };
        table.add_row(vec![
            agent.mint.clone(),
            agent.name.clone(),
            agent.symbol.clone(),
            or_dash(agent.model.as_deref()),
            format_temperature(agent.temperature),
            status.to_string(),
        ]);
    }

    format!("{}\n\nTotal: {} agent(s)", table, agents.len())
}

/// Format an owner listing as JSON
fn format_owner_result_json(owner: &str, agents: &[Agent]) -> Result<String, ApiError> {
    let out = json!({
        "owner": owner.trim(),
        "agents": agents,
        "total": agents.len(),
    });
    serde_json::to_string_pretty(&out)
        .map_err(|e| ApiError::OutputError(format!("Failed to serialize agents: {}", e)))
}

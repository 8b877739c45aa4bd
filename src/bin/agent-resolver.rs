//! Agent Resolver CLI Binary
//!
//! Command-line interface for resolving agent NFTs into agent records.

use agent_resolver::logging::init_logging;
use agent_resolver::tooling::cli::{Cli, CliContext, Commands};
use anyhow::Context;
use clap::Parser;
use std::process;
use tokio_util::sync::CancellationToken;

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    let context = CliContext::new(cli.config.clone(), cli.rpc.clone())
        .context("loading configuration")?;

    init_logging(Some(&context.config().logging), &cli.log_overrides())
        .context("initializing logging")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;

    runtime.block_on(async {
        let cancel = CancellationToken::new();
        let on_signal = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling");
                on_signal.cancel();
            }
        });

        let output = context
            .execute(&cli.command, &cancel)
            .await
            .with_context(|| format!("{} command failed", command_label(&cli.command)))?;
        Ok(output)
    })
}

fn command_label(command: &Commands) -> &'static str {
    match command {
        Commands::Mint { .. } => "mint",
        Commands::Owner { .. } => "owner",
    }
}

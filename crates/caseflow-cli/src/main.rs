//! Caseflow CLI - bulk case-migration batch runner.
//!
//! The main entry point for the `caseflow` binary.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use caseflow_cli::config::Config;
use caseflow_cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse CLI arguments and environment configuration
    let cli = Cli::parse();
    let config = Config::from_env().context("invalid CASEFLOW_* configuration")?;

    // The processor runs cases on parallel workers; give it threads.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match cli.command {
            Commands::Run(args) => caseflow_cli::commands::run::execute(args, &config).await,
            Commands::Jobs(args) => caseflow_cli::commands::jobs::execute(&args, &config),
            Commands::DecodeRoster(args) => caseflow_cli::commands::decode_roster::execute(&args),
        }
    })
}

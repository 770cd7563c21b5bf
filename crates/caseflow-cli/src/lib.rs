//! # caseflow-cli
//!
//! Command-line batch runner for caseflow migration jobs.
//!
//! ## Commands
//!
//! - `caseflow run` - Run one migration job and print its report
//! - `caseflow jobs` - List registered jobs and which are enabled
//! - `caseflow decode-roster` - Decode an encoded roster for inspection
//!
//! ## Configuration
//!
//! Collaborator URLs, credentials, and sizing come from `CASEFLOW_*`
//! environment variables (see [`config::Config::from_env`]); per-run knobs
//! can be overridden with command-line flags. `RUST_LOG` controls log
//! filtering.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
// CLI uses print! macros intentionally
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

pub mod commands;
pub mod config;

use clap::{Parser, Subcommand};

/// Caseflow CLI - bulk case-migration batch runner.
#[derive(Debug, Parser)]
#[command(name = "caseflow")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one migration job.
    Run(commands::run::RunArgs),
    /// List registered jobs.
    Jobs(commands::jobs::JobsArgs),
    /// Decode an encoded candidate roster.
    DecodeRoster(commands::decode_roster::DecodeRosterArgs),
}

/// Output format.
#[derive(Debug, Clone, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

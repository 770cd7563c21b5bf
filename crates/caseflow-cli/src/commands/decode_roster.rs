//! Decode an encoded candidate roster for inspection.
//!
//! Operator debugging for roster-driven jobs: shows how many rows a
//! prepared roster holds and which case references are duplicated (and
//! would therefore be skipped as ambiguous by the job).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use caseflow_engine::Roster;
use caseflow_engine::jobs::venue_backfill;

use crate::OutputFormat;

/// Arguments for the `decode-roster` command.
#[derive(Debug, Args)]
pub struct DecodeRosterArgs {
    /// Path to the encoded roster file.
    #[arg(long)]
    pub file: PathBuf,

    /// Column blanked on duplicate references, as the job would blank it.
    #[arg(long, default_value = venue_backfill::HEARING_COLUMN)]
    pub disambiguator: String,

    /// Output format.
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,
}

/// Execute the `decode-roster` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the payload does not
/// decode.
pub fn execute(args: &DecodeRosterArgs) -> Result<()> {
    let encoded = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read roster file {}", args.file.display()))?;
    let roster = Roster::decode(&encoded, Some(&args.disambiguator))?;

    let duplicates: Vec<i64> = roster.duplicates().iter().map(|r| r.value()).collect();

    match args.output {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "rows": roster.len(),
                    "duplicateReferences": duplicates,
                }))?
            );
        }
        OutputFormat::Text => {
            println!("Roster {}", args.file.display());
            println!("  Rows:       {}", roster.len());
            println!("  Duplicates: {}", duplicates.len());
            if !duplicates.is_empty() {
                println!("Duplicated case references (disambiguator blanked, cases skipped):");
                for reference in duplicates {
                    println!("  {reference}");
                }
            }
        }
    }

    Ok(())
}

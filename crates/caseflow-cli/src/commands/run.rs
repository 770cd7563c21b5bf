//! Run one migration job and print its report.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use caseflow_client::{CaseStore, HttpCaseStore};
use caseflow_engine::{MigrationProcessor, ProcessorConfig};

use crate::config::Config;
use crate::OutputFormat;

/// Arguments for the `run` command.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Name of the registered job to run.
    #[arg(long)]
    pub job: String,

    /// Run the full lifecycle but submit nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Override the configured candidate cap for this run.
    #[arg(long)]
    pub max_cases: Option<usize>,

    /// Override the configured worker pool size for this run.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Output format.
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,
}

/// Execute the `run` command.
///
/// Individual case failures are reported, not fatal; the command exits
/// non-zero only for configuration or collaborator-level errors.
///
/// # Errors
///
/// Returns an error if configuration is incomplete, the job name is
/// unknown or not enabled, or the candidate fetch fails.
pub async fn execute(args: RunArgs, config: &Config) -> Result<()> {
    let credentials = super::identity_client(config)?;
    let catalog = super::build_catalog(config, &credentials)?;
    // Surface configuration typos before anything runs.
    catalog.activate(&config.enabled_jobs)?;

    if !config.enabled_jobs.iter().any(|name| name == &args.job) {
        anyhow::bail!(
            "job '{}' is not enabled. Add it to CASEFLOW_ENABLED_JOBS",
            args.job
        );
    }
    let job = catalog.get(&args.job)?;

    let store_url = super::require(
        config.store_url.as_ref(),
        "Case store URL",
        "CASEFLOW_STORE_URL",
    )?;
    let store = Arc::new(HttpCaseStore::new(store_url, Arc::clone(&credentials)));

    let processor = MigrationProcessor::new(
        store as Arc<dyn CaseStore>,
        ProcessorConfig {
            concurrency: args.concurrency.unwrap_or(config.concurrency),
            max_cases: args.max_cases.unwrap_or(config.max_cases),
            dry_run: args.dry_run,
        },
    );

    let report = processor.run(job).await?;

    match args.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            print!("{report}");
        }
    }

    Ok(())
}

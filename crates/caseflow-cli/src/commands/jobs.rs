//! List registered migration jobs.

use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::config::Config;
use crate::OutputFormat;

/// Arguments for the `jobs` command.
#[derive(Debug, Args)]
pub struct JobsArgs {
    /// Output format.
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,
}

/// Execute the `jobs` command.
///
/// # Errors
///
/// Returns an error if configuration is incomplete or an enabled job name
/// is not registered.
pub fn execute(args: &JobsArgs, config: &Config) -> Result<()> {
    let credentials = super::identity_client(config)?;
    let catalog = super::build_catalog(config, &credentials)?;
    catalog.activate(&config.enabled_jobs)?;

    let case_type = config.case_type()?;
    let enabled = |name: &str| config.enabled_jobs.iter().any(|job| job == name);

    match args.output {
        OutputFormat::Json => {
            let jobs: Vec<_> = catalog
                .jobs()
                .iter()
                .map(|job| {
                    let metadata = job.unit.metadata();
                    json!({
                        "name": job.name,
                        "caseType": case_type,
                        "eventId": metadata.event_id,
                        "summary": metadata.summary,
                        "enabled": enabled(job.name),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&jobs)?);
        }
        OutputFormat::Text => {
            println!("Registered jobs for case type {case_type}:");
            for job in catalog.jobs() {
                let metadata = job.unit.metadata();
                let marker = if enabled(job.name) { "enabled " } else { "disabled" };
                println!(
                    "{marker}  {:<20} {:<28} {}",
                    job.name,
                    metadata.event_id.as_str(),
                    metadata.summary
                );
            }
        }
    }

    Ok(())
}

//! The aggregate result of one migration run.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use caseflow_core::{CaseId, RunId};

/// Everything one run did: counts, id lists, and timing.
///
/// Every processed candidate appears in exactly one of the three id lists.
/// Case-level error messages are not carried here; they live in the
/// per-case log lines, correlated by `run_id`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// The id correlating this run's log lines.
    pub run_id: RunId,
    /// The registered name of the job that ran.
    pub job: String,
    /// True when nothing was submitted.
    pub dry_run: bool,
    /// How many candidates the job produced before the cap.
    pub candidates: usize,
    /// How many cases were processed after the cap.
    pub processed: usize,
    /// Cases whose change was submitted (or would have been, on a dry run).
    pub migrated: Vec<CaseId>,
    /// Cases deliberately left unmodified.
    pub skipped: Vec<CaseId>,
    /// Cases that hit an unexpected error.
    pub failed: Vec<CaseId>,
    /// When processing started.
    pub started_at: DateTime<Utc>,
    /// When the pool drained.
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Number of migrated cases.
    #[must_use]
    pub fn migrated_count(&self) -> usize {
        self.migrated.len()
    }

    /// Number of skipped cases.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Number of failed cases.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// True when no case hit an unexpected error.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Wall-clock duration of the run.
    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

fn write_id_list(f: &mut fmt::Formatter<'_>, label: &str, ids: &[CaseId]) -> fmt::Result {
    if ids.is_empty() {
        return Ok(());
    }
    writeln!(f, "{label}:")?;
    for id in ids {
        writeln!(f, "  {id}")?;
    }
    Ok(())
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Migration run {}", self.run_id)?;
        writeln!(f, "  Job:        {}", self.job)?;
        if self.dry_run {
            writeln!(f, "  Mode:       dry run (nothing submitted)")?;
        }
        writeln!(f, "  Candidates: {}", self.candidates)?;
        writeln!(f, "  Processed:  {}", self.processed)?;
        writeln!(f, "  Migrated:   {}", self.migrated_count())?;
        writeln!(f, "  Skipped:    {}", self.skipped_count())?;
        writeln!(f, "  Failed:     {}", self.failed_count())?;
        writeln!(f, "  Duration:   {}ms", self.duration().num_milliseconds())?;
        write_id_list(f, "Migrated cases", &self.migrated)?;
        write_id_list(f, "Failed cases", &self.failed)
    }
}

//! The pluggable per-job migration contract.
//!
//! A migration unit is the whole of one job's policy: where its candidate
//! cases come from, which fetched records it still accepts, what field
//! changes it writes, and the event metadata its submits carry. The
//! processor drives any unit through the same lifecycle; units never talk
//! to the store directly.

use async_trait::async_trait;

use caseflow_core::{CaseId, CaseRecord, EditMetadata, FieldChanges, SkipReason};

use crate::error::Result;

/// What a unit's transformation decided for one case.
#[derive(Debug, Clone, PartialEq)]
pub enum MigrateAction {
    /// Write these field values to the case.
    Update(FieldChanges),
    /// Deliberately leave the case unmodified.
    Skip(SkipReason),
}

impl MigrateAction {
    /// Returns true when the action skips the case.
    #[must_use]
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip(_))
    }
}

/// One migration job's pluggable behavior.
///
/// `fetch_candidates` may perform I/O (it usually drives the search
/// repository or decodes a roster); `accepts` and `migrate` must not. A
/// skip returned from `migrate` is an expected outcome, distinct from an
/// `Err`, which the processor records as the case's failure.
#[async_trait]
pub trait MigrationUnit: Send + Sync {
    /// Produces the candidate case list for this job.
    ///
    /// # Errors
    ///
    /// Returns an error if candidates cannot be determined; the run aborts
    /// before any case is touched.
    async fn fetch_candidates(&self) -> Result<Vec<CaseId>>;

    /// A cheap last-moment precondition on the freshly fetched record.
    ///
    /// The default accepts every record; the processor has already skipped
    /// cases whose record was absent before consulting this.
    fn accepts(&self, record: &CaseRecord) -> bool {
        let _ = record;
        true
    }

    /// Computes the field changes for one case, or a reason to skip it.
    ///
    /// Pure: reads the record, performs no I/O.
    ///
    /// # Errors
    ///
    /// Returns an error only for unexpected failures; the processor records
    /// the case as failed and continues the batch.
    fn migrate(&self, record: &CaseRecord) -> Result<MigrateAction>;

    /// The fixed event metadata attached to every submit of this job.
    fn metadata(&self) -> EditMetadata;
}

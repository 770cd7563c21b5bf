//! The bounded-concurrency migration processor.
//!
//! One run: fetch the job's candidates, cap the list, then drive every case
//! through start-edit, predicate, transform, and submit on a fixed-size
//! worker pool. A case's failure is recorded and the batch moves on; only
//! candidate fetching and configuration problems abort a run. The pool is
//! drained completely before the report is built, so an in-flight submit is
//! never abandoned.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;

use caseflow_client::CaseStore;
use caseflow_core::{CaseId, EditMetadata, MigrationOutcome, RunId, SkipReason};

use crate::error::Result;
use crate::registry::RegisteredJob;
use crate::report::RunReport;
use crate::unit::{MigrateAction, MigrationUnit};

/// Worker pool size used when none is configured.
pub const DEFAULT_CONCURRENCY: usize = 25;

/// Candidate cap used when none is configured.
pub const DEFAULT_MAX_CASES: usize = 5000;

/// Per-run processor settings, configured per deployment rather than per
/// job.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Size of the worker pool.
    pub concurrency: usize,
    /// Safety cap on how many candidates one run may process.
    pub max_cases: usize,
    /// When true, run the full lifecycle but submit nothing.
    pub dry_run: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            max_cases: DEFAULT_MAX_CASES,
            dry_run: false,
        }
    }
}

impl ProcessorConfig {
    fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(caseflow_core::Error::configuration(
                "concurrency must be at least 1",
            )
            .into());
        }
        if self.max_cases == 0 {
            return Err(caseflow_core::Error::configuration(
                "max cases must be at least 1",
            )
            .into());
        }
        Ok(())
    }
}

/// Drives migration jobs against the case store.
pub struct MigrationProcessor {
    store: Arc<dyn CaseStore>,
    config: ProcessorConfig,
}

/// The shared outcome aggregate workers append to.
#[derive(Debug, Default, Clone)]
struct Outcomes {
    migrated: Vec<CaseId>,
    skipped: Vec<CaseId>,
    failed: Vec<CaseId>,
}

impl Outcomes {
    fn record(&mut self, case: CaseId, outcome: &MigrationOutcome) {
        match outcome {
            MigrationOutcome::Migrated => self.migrated.push(case),
            MigrationOutcome::Skipped(_) => self.skipped.push(case),
            MigrationOutcome::Failed { .. } => self.failed.push(case),
        }
    }

    fn len(&self) -> usize {
        self.migrated.len() + self.skipped.len() + self.failed.len()
    }
}

impl MigrationProcessor {
    /// Creates a processor over a case store.
    #[must_use]
    pub fn new(store: Arc<dyn CaseStore>, config: ProcessorConfig) -> Self {
        Self { store, config }
    }

    /// Runs one job to completion and reports the aggregate outcome.
    ///
    /// # Errors
    ///
    /// Returns an error when configuration is invalid or the candidate
    /// fetch fails; individual case failures are recorded in the report
    /// instead.
    pub async fn run(&self, job: &RegisteredJob) -> Result<RunReport> {
        self.config.validate()?;

        let run_id = RunId::generate();
        let started_at = Utc::now();
        tracing::info!(
            run = %run_id,
            job = job.name,
            concurrency = self.config.concurrency,
            max_cases = self.config.max_cases,
            dry_run = self.config.dry_run,
            "starting migration run"
        );

        let mut cases = job.unit.fetch_candidates().await?;
        let candidates = cases.len();
        if cases.len() > self.config.max_cases {
            tracing::warn!(
                run = %run_id,
                job = job.name,
                candidates,
                cap = self.config.max_cases,
                "candidate list truncated to the configured cap"
            );
            cases.truncate(self.config.max_cases);
        }
        tracing::info!(
            run = %run_id,
            job = job.name,
            candidates,
            processing = cases.len(),
            "candidates fetched"
        );

        let metadata = job.unit.metadata();
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let outcomes = Arc::new(Mutex::new(Outcomes::default()));
        let mut tasks: JoinSet<()> = JoinSet::new();
        let mut spawned: HashMap<tokio::task::Id, CaseId> = HashMap::new();

        for case in cases {
            let semaphore = Arc::clone(&semaphore);
            let store = Arc::clone(&self.store);
            let unit = Arc::clone(&job.unit);
            let outcomes = Arc::clone(&outcomes);
            let metadata = metadata.clone();
            let job_name = job.name;
            let dry_run = self.config.dry_run;
            let task_case = case.clone();

            let handle = tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    // The semaphore is never closed while a run is live.
                    return;
                };
                let outcome =
                    process_case(store.as_ref(), unit.as_ref(), &task_case, &metadata, dry_run)
                        .await;
                log_outcome(run_id, job_name, &task_case, &outcome);
                outcomes.lock().await.record(task_case, &outcome);
            });
            spawned.insert(handle.id(), case);
        }

        // Graceful drain: wait for every worker, attributing any panic to
        // its case instead of killing the run.
        while let Some(joined) = tasks.join_next_with_id().await {
            if let Err(join_error) = joined {
                let outcome = MigrationOutcome::failed(&join_error);
                match spawned.get(&join_error.id()) {
                    Some(case) => {
                        tracing::error!(
                            run = %run_id,
                            job = job.name,
                            case = %case,
                            error = %join_error,
                            "case worker aborted"
                        );
                        outcomes.lock().await.record(case.clone(), &outcome);
                    }
                    None => {
                        tracing::error!(
                            run = %run_id,
                            job = job.name,
                            error = %join_error,
                            "case worker aborted"
                        );
                    }
                }
            }
        }

        let outcomes = match Arc::try_unwrap(outcomes) {
            Ok(mutex) => mutex.into_inner(),
            Err(shared) => shared.lock().await.clone(),
        };
        let finished_at = Utc::now();

        let report = RunReport {
            run_id,
            job: job.name.to_string(),
            dry_run: self.config.dry_run,
            candidates,
            processed: outcomes.len(),
            migrated: outcomes.migrated,
            skipped: outcomes.skipped,
            failed: outcomes.failed,
            started_at,
            finished_at,
        };
        tracing::info!(
            run = %run_id,
            job = job.name,
            processed = report.processed,
            migrated = report.migrated_count(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            "migration run complete"
        );
        Ok(report)
    }
}

/// One case's full lifecycle. Every failure path ends here; nothing
/// escapes to abort the batch.
async fn process_case(
    store: &dyn CaseStore,
    unit: &dyn MigrationUnit,
    case: &CaseId,
    metadata: &EditMetadata,
    dry_run: bool,
) -> MigrationOutcome {
    let session = match store.start_edit(case, &metadata.event_id).await {
        Ok(session) => session,
        Err(e) => return MigrationOutcome::failed(e),
    };

    let Some(record) = session.record else {
        return MigrationOutcome::Skipped(SkipReason::RecordMissing);
    };

    if !unit.accepts(&record) {
        return MigrationOutcome::Skipped(SkipReason::NotApplicable {
            detail: "predicate rejected the record".to_string(),
        });
    }

    let action = match unit.migrate(&record) {
        Ok(action) => action,
        Err(e) => return MigrationOutcome::failed(e),
    };

    let changes = match action {
        MigrateAction::Skip(reason) => return MigrationOutcome::Skipped(reason),
        MigrateAction::Update(changes) => changes,
    };

    if dry_run {
        return MigrationOutcome::Migrated;
    }

    let mut data = record.data;
    changes.apply_to(&mut data);
    match store.submit_edit(case, &session.token, data, metadata).await {
        Ok(_) => MigrationOutcome::Migrated,
        Err(e) => MigrationOutcome::failed(e),
    }
}

fn log_outcome(run_id: RunId, job: &str, case: &CaseId, outcome: &MigrationOutcome) {
    match outcome {
        MigrationOutcome::Migrated => {
            tracing::info!(run = %run_id, job, case = %case, "case migrated");
        }
        MigrationOutcome::Skipped(reason) => {
            tracing::info!(run = %run_id, job, case = %case, reason = %reason, "case skipped");
        }
        MigrationOutcome::Failed { message } => {
            tracing::error!(run = %run_id, job, case = %case, error = %message, "case failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use caseflow_client::ClientError;
    use caseflow_core::{
        CaseData, CaseRecord, CaseReference, CaseTypeId, EditSession, EventId, FieldChanges,
    };
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn case(reference: i64) -> CaseId {
        CaseId::new(
            CaseReference::new(reference).unwrap(),
            CaseTypeId::new("CareCase").unwrap(),
        )
    }

    fn cases(references: &[i64]) -> Vec<CaseId> {
        references.iter().map(|r| case(*r)).collect()
    }

    fn sorted_refs(ids: &[CaseId]) -> Vec<i64> {
        let mut refs: Vec<i64> = ids.iter().map(|id| id.reference.value()).collect();
        refs.sort_unstable();
        refs
    }

    /// A store whose per-case behavior is scripted by reference.
    #[derive(Default)]
    struct ScriptedStore {
        fail_start: HashSet<i64>,
        fail_submit: HashSet<i64>,
        missing_record: HashSet<i64>,
        start_calls: AtomicUsize,
        submit_calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedStore {
        fn failing_submit(references: &[i64]) -> Self {
            Self {
                fail_submit: references.iter().copied().collect(),
                ..Self::default()
            }
        }

        fn record_for(case: &CaseId) -> CaseRecord {
            let mut data = CaseData::new();
            data.insert("legacyHearingType".to_string(), json!("telephone"));
            CaseRecord {
                reference: case.reference,
                state: "Open".to_string(),
                data,
            }
        }
    }

    #[async_trait]
    impl CaseStore for ScriptedStore {
        async fn start_edit(
            &self,
            case: &CaseId,
            _event: &EventId,
        ) -> std::result::Result<EditSession, ClientError> {
            self.start_calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(2)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let reference = case.reference.value();
            if self.fail_start.contains(&reference) {
                return Err(ClientError::http("start edit refused"));
            }
            if self.missing_record.contains(&reference) {
                return Ok(EditSession {
                    token: "token".to_string(),
                    record: None,
                });
            }
            Ok(EditSession {
                token: "token".to_string(),
                record: Some(Self::record_for(case)),
            })
        }

        async fn submit_edit(
            &self,
            case: &CaseId,
            _token: &str,
            _data: CaseData,
            _metadata: &caseflow_core::EditMetadata,
        ) -> std::result::Result<CaseRecord, ClientError> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_submit.contains(&case.reference.value()) {
                return Err(ClientError::http("submit refused"));
            }
            Ok(Self::record_for(case))
        }
    }

    /// A unit whose transform is scripted by reference. The call counters
    /// are shared so tests keep a handle after the unit moves into a job.
    struct ScriptedUnit {
        candidates: Vec<CaseId>,
        error_refs: HashSet<i64>,
        skip_refs: HashSet<i64>,
        accepts_calls: Arc<AtomicUsize>,
        migrate_calls: Arc<AtomicUsize>,
        reject_all: bool,
        fail_fetch: bool,
    }

    impl ScriptedUnit {
        fn new(candidates: Vec<CaseId>) -> Self {
            Self {
                candidates,
                error_refs: HashSet::new(),
                skip_refs: HashSet::new(),
                accepts_calls: Arc::new(AtomicUsize::new(0)),
                migrate_calls: Arc::new(AtomicUsize::new(0)),
                reject_all: false,
                fail_fetch: false,
            }
        }

        fn with_errors(mut self, references: &[i64]) -> Self {
            self.error_refs = references.iter().copied().collect();
            self
        }

        fn with_skips(mut self, references: &[i64]) -> Self {
            self.skip_refs = references.iter().copied().collect();
            self
        }
    }

    #[async_trait]
    impl MigrationUnit for ScriptedUnit {
        async fn fetch_candidates(&self) -> crate::error::Result<Vec<CaseId>> {
            if self.fail_fetch {
                return Err(crate::error::Error::search(
                    "scan failed",
                    ClientError::http("index unreachable"),
                ));
            }
            Ok(self.candidates.clone())
        }

        fn accepts(&self, _record: &CaseRecord) -> bool {
            self.accepts_calls.fetch_add(1, Ordering::SeqCst);
            !self.reject_all
        }

        fn migrate(&self, record: &CaseRecord) -> crate::error::Result<MigrateAction> {
            self.migrate_calls.fetch_add(1, Ordering::SeqCst);
            let reference = record.reference.value();
            if self.error_refs.contains(&reference) {
                return Err(crate::error::Error::migration("bad source data"));
            }
            if self.skip_refs.contains(&reference) {
                return Ok(MigrateAction::Skip(SkipReason::AlreadyMigrated));
            }
            Ok(MigrateAction::Update(
                FieldChanges::new().with("hearingChannel", json!("TEL")),
            ))
        }

        fn metadata(&self) -> caseflow_core::EditMetadata {
            caseflow_core::EditMetadata::new(
                EventId::new_unchecked("migrateHearingChannel"),
                "Migrate hearing channel",
                "Test migration",
            )
        }
    }

    fn processor(store: Arc<ScriptedStore>, concurrency: usize) -> MigrationProcessor {
        MigrationProcessor::new(
            store,
            ProcessorConfig {
                concurrency,
                max_cases: DEFAULT_MAX_CASES,
                dry_run: false,
            },
        )
    }

    fn job(unit: ScriptedUnit) -> RegisteredJob {
        RegisteredJob::new("scripted", Arc::new(unit))
    }

    #[tokio::test]
    async fn failures_stay_isolated_for_any_pool_size() {
        let all: Vec<i64> = (1..=9).collect();
        let failing = [2, 5, 8];

        for concurrency in [1, 5, all.len()] {
            let store = Arc::new(ScriptedStore::failing_submit(&failing));
            let report = processor(Arc::clone(&store), concurrency)
                .run(&job(ScriptedUnit::new(cases(&all))))
                .await
                .expect("report");

            assert_eq!(sorted_refs(&report.failed), failing.to_vec());
            assert_eq!(sorted_refs(&report.migrated), vec![1, 3, 4, 6, 7, 9]);
            assert!(report.skipped.is_empty());
            assert_eq!(report.processed, all.len());
        }
    }

    #[tokio::test]
    async fn cap_limits_how_many_cases_are_started() {
        let store = Arc::new(ScriptedStore::default());
        let processor = MigrationProcessor::new(
            Arc::clone(&store) as Arc<dyn CaseStore>,
            ProcessorConfig {
                concurrency: 3,
                max_cases: 4,
                dry_run: false,
            },
        );

        let report = processor
            .run(&job(ScriptedUnit::new(cases(&(1..=10).collect::<Vec<_>>()))))
            .await
            .expect("report");

        assert_eq!(store.start_calls.load(Ordering::SeqCst), 4);
        assert_eq!(report.candidates, 10);
        assert_eq!(report.processed, 4);
    }

    #[tokio::test]
    async fn a_skip_never_fails_and_never_submits() {
        let store = Arc::new(ScriptedStore::default());
        let unit = ScriptedUnit::new(cases(&[1, 2, 3])).with_skips(&[1, 2, 3]);

        let report = processor(Arc::clone(&store), 2)
            .run(&job(unit))
            .await
            .expect("report");

        assert_eq!(report.skipped_count(), 3);
        assert!(report.failed.is_empty());
        assert!(report.migrated.is_empty());
        assert_eq!(store.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn mixed_three_case_batch_lands_each_case_in_its_list() {
        // Case 1 errors in migrate, case 2 skips, case 3 succeeds.
        let store = Arc::new(ScriptedStore::default());
        let unit = ScriptedUnit::new(cases(&[1, 2, 3]))
            .with_errors(&[1])
            .with_skips(&[2]);

        let report = processor(Arc::clone(&store), 2)
            .run(&job(unit))
            .await
            .expect("report");

        assert_eq!(sorted_refs(&report.migrated), vec![3]);
        assert_eq!(sorted_refs(&report.failed), vec![1]);
        assert_eq!(sorted_refs(&report.skipped), vec![2]);
        assert_eq!(store.submit_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn absent_record_skips_before_the_predicate_runs() {
        let store = Arc::new(ScriptedStore {
            missing_record: [7].into_iter().collect(),
            ..ScriptedStore::default()
        });
        let unit = ScriptedUnit::new(cases(&[7]));
        let accepts_calls = Arc::clone(&unit.accepts_calls);
        let migrate_calls = Arc::clone(&unit.migrate_calls);

        let report = processor(Arc::clone(&store), 1)
            .run(&job(unit))
            .await
            .expect("report");

        assert_eq!(report.skipped_count(), 1);
        assert!(report.failed.is_empty());
        assert_eq!(accepts_calls.load(Ordering::SeqCst), 0);
        assert_eq!(migrate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejected_predicate_skips_without_migrating() {
        let store = Arc::new(ScriptedStore::default());
        let mut unit = ScriptedUnit::new(cases(&[1, 2]));
        unit.reject_all = true;

        let report = processor(Arc::clone(&store), 2)
            .run(&job(unit))
            .await
            .expect("report");

        assert_eq!(report.skipped_count(), 2);
        assert_eq!(store.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dry_run_submits_nothing_but_reports_migrations() {
        let store = Arc::new(ScriptedStore::default());
        let processor = MigrationProcessor::new(
            Arc::clone(&store) as Arc<dyn CaseStore>,
            ProcessorConfig {
                concurrency: 2,
                max_cases: DEFAULT_MAX_CASES,
                dry_run: true,
            },
        );

        let report = processor
            .run(&job(ScriptedUnit::new(cases(&[1, 2, 3]))))
            .await
            .expect("report");

        assert!(report.dry_run);
        assert_eq!(report.migrated_count(), 3);
        assert_eq!(store.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn zero_concurrency_is_rejected_before_any_case_starts() {
        let store = Arc::new(ScriptedStore::default());
        let processor = MigrationProcessor::new(
            Arc::clone(&store) as Arc<dyn CaseStore>,
            ProcessorConfig {
                concurrency: 0,
                max_cases: DEFAULT_MAX_CASES,
                dry_run: false,
            },
        );

        let result = processor.run(&job(ScriptedUnit::new(cases(&[1])))).await;

        assert!(result.is_err_and(|e| e.is_configuration()));
        assert_eq!(store.start_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn candidate_fetch_failure_aborts_the_run() {
        let store = Arc::new(ScriptedStore::default());
        let mut unit = ScriptedUnit::new(Vec::new());
        unit.fail_fetch = true;

        let result = processor(Arc::clone(&store), 2).run(&job(unit)).await;

        assert!(matches!(result, Err(crate::error::Error::Search { .. })));
        assert_eq!(store.start_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn pool_bounds_concurrent_case_processing() {
        let store = Arc::new(ScriptedStore::default());
        let report = processor(Arc::clone(&store), 2)
            .run(&job(ScriptedUnit::new(cases(&(1..=6).collect::<Vec<_>>()))))
            .await
            .expect("report");

        assert_eq!(report.processed, 6);
        let max = store.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 2, "observed {max} cases in flight with a pool of 2");
        assert_eq!(max, 2, "a pool of 2 should overlap case processing");
    }

    #[tokio::test]
    async fn every_candidate_lands_in_exactly_one_list() {
        let all: Vec<i64> = (1..=12).collect();
        let store = Arc::new(ScriptedStore {
            fail_submit: [4, 9].into_iter().collect(),
            fail_start: [11].into_iter().collect(),
            ..ScriptedStore::default()
        });
        let unit = ScriptedUnit::new(cases(&all)).with_skips(&[2, 6]);

        let report = processor(Arc::clone(&store), 5)
            .run(&job(unit))
            .await
            .expect("report");

        assert_eq!(report.processed, all.len());
        let mut seen = sorted_refs(&report.migrated);
        seen.extend(sorted_refs(&report.skipped));
        seen.extend(sorted_refs(&report.failed));
        seen.sort_unstable();
        assert_eq!(seen, all);
        assert_eq!(sorted_refs(&report.failed), vec![4, 9, 11]);
        assert_eq!(sorted_refs(&report.skipped), vec![2, 6]);
    }
}

//! Migration of the legacy hearing-type field onto the hearing channel.
//!
//! Older cases carry a free-text `legacyHearingType` but no
//! `hearingChannel`; listing now keys off the channel code, so this job
//! finds every case with the legacy field and no channel, maps the legacy
//! value onto a channel code, and writes it.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use caseflow_core::{CaseId, CaseRecord, CaseTypeId, EditMetadata, EventId, FieldChanges, SkipReason};

use crate::error::Result;
use crate::query::QueryTemplate;
use crate::repository::SearchRepository;
use crate::unit::{MigrateAction, MigrationUnit};

/// The registered name of this job.
pub const NAME: &str = "hearing-channel";

/// The field this job writes.
pub const CHANNEL_FIELD: &str = "hearingChannel";

/// The legacy field this job reads.
pub const LEGACY_FIELD: &str = "legacyHearingType";

/// Maps a legacy hearing-type label to its channel code.
///
/// Labels are matched case-insensitively; unknown labels yield `None` and
/// the case is skipped rather than guessed at.
#[must_use]
pub fn channel_code(legacy: &str) -> Option<&'static str> {
    match legacy.trim().to_ascii_lowercase().as_str() {
        "telephone" | "phone" => Some("TEL"),
        "video" => Some("VID"),
        "face to face" | "face-to-face" | "in person" => Some("INTER"),
        "paper" => Some("NA"),
        _ => None,
    }
}

/// Search-driven unit writing `hearingChannel` from `legacyHearingType`.
pub struct HearingChannelUnit {
    repository: Arc<SearchRepository>,
    case_type: CaseTypeId,
}

impl HearingChannelUnit {
    /// Creates the unit over a search repository, scoped to one case type.
    #[must_use]
    pub fn new(repository: Arc<SearchRepository>, case_type: CaseTypeId) -> Self {
        Self {
            repository,
            case_type,
        }
    }

    fn template(&self) -> QueryTemplate {
        QueryTemplate::new(
            self.case_type.clone(),
            json!({
                "bool": {
                    "must": [{ "exists": { "field": format!("data.{LEGACY_FIELD}") } }],
                    "must_not": [{ "exists": { "field": format!("data.{CHANNEL_FIELD}") } }]
                }
            }),
        )
        .with_source_field("state")
    }
}

#[async_trait]
impl MigrationUnit for HearingChannelUnit {
    async fn fetch_candidates(&self) -> Result<Vec<CaseId>> {
        let summaries = self.repository.find_all(&self.template()).await?;
        Ok(summaries
            .into_iter()
            .map(|summary| CaseId::new(summary.reference, self.case_type.clone()))
            .collect())
    }

    fn migrate(&self, record: &CaseRecord) -> Result<MigrateAction> {
        // The search index can lag the store; re-check on the fresh record.
        if record.has_field(CHANNEL_FIELD) {
            return Ok(MigrateAction::Skip(SkipReason::AlreadyMigrated));
        }

        let Some(legacy) = record.field_str(LEGACY_FIELD).filter(|v| !v.trim().is_empty())
        else {
            return Ok(MigrateAction::Skip(SkipReason::MissingSourceField {
                field: LEGACY_FIELD.to_string(),
            }));
        };

        let Some(code) = channel_code(legacy) else {
            return Ok(MigrateAction::Skip(SkipReason::NotApplicable {
                detail: format!("no channel mapping for legacy hearing type '{legacy}'"),
            }));
        };

        Ok(MigrateAction::Update(
            FieldChanges::new().with(CHANNEL_FIELD, json!(code)),
        ))
    }

    fn metadata(&self) -> EditMetadata {
        EditMetadata::new(
            EventId::new_unchecked("migrateHearingChannel"),
            "Migrate hearing channel",
            "Populates the hearing channel from the legacy hearing type",
        )
    }
}

//! Backfill of hearing venue codes from a prepared roster.
//!
//! An offline reconciliation produced a roster of (case reference, hearing
//! id, venue code) rows; this job walks it, finds the named hearing inside
//! each case's `hearings` array, and sets its venue code. A case can hold
//! several in-flight hearings, so the hearing id is the disambiguator: rows
//! whose disambiguator was blanked during decode (duplicate references) are
//! skipped as ambiguous, never guessed at.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Value, json};

use caseflow_core::{
    CaseId, CaseRecord, CaseReference, CaseTypeId, EditMetadata, EventId, FieldChanges, SkipReason,
};

use crate::error::{Error, Result};
use crate::roster::{Roster, RosterRow};
use crate::unit::{MigrateAction, MigrationUnit};

/// The registered name of this job.
pub const NAME: &str = "venue-backfill";

/// The roster column naming the hearing to change.
pub const HEARING_COLUMN: &str = "hearing_id";

/// The roster column carrying the venue code to write.
pub const VENUE_COLUMN: &str = "venue_code";

/// The case field holding the hearings array.
pub const HEARINGS_FIELD: &str = "hearings";

/// Roster-driven unit setting one hearing's venue code per case.
pub struct VenueBackfillUnit {
    rows: Option<BTreeMap<CaseReference, RosterRow>>,
    case_type: CaseTypeId,
}

impl VenueBackfillUnit {
    /// Creates the unit from a decoded roster.
    ///
    /// The roster must have been decoded with [`HEARING_COLUMN`] as the
    /// disambiguator so duplicate references were blanked.
    #[must_use]
    pub fn new(roster: &Roster, case_type: CaseTypeId) -> Self {
        let mut rows = BTreeMap::new();
        for row in roster.rows() {
            // Duplicate rows already share a blanked disambiguator; the
            // first row stands in for all of them.
            rows.entry(row.reference()).or_insert_with(|| row.clone());
        }
        Self {
            rows: Some(rows),
            case_type,
        }
    }

    /// Creates the unit with no roster.
    ///
    /// Registration needs a constructed unit before any roster is read;
    /// running it fails at candidate fetch with a message naming the
    /// missing configuration.
    #[must_use]
    pub fn unconfigured(case_type: CaseTypeId) -> Self {
        Self {
            rows: None,
            case_type,
        }
    }

    fn row_for(&self, reference: CaseReference) -> Option<&RosterRow> {
        self.rows.as_ref().and_then(|rows| rows.get(&reference))
    }
}

#[async_trait]
impl MigrationUnit for VenueBackfillUnit {
    async fn fetch_candidates(&self) -> Result<Vec<CaseId>> {
        let rows = self.rows.as_ref().ok_or_else(|| {
            Error::candidate_fetch("no roster supplied; set CASEFLOW_ROSTER_FILE")
        })?;
        Ok(rows
            .keys()
            .map(|reference| CaseId::new(*reference, self.case_type.clone()))
            .collect())
    }

    fn migrate(&self, record: &CaseRecord) -> Result<MigrateAction> {
        let Some(row) = self.row_for(record.reference) else {
            return Ok(MigrateAction::Skip(SkipReason::NotApplicable {
                detail: "case is not on the roster".to_string(),
            }));
        };

        let Some(hearing_id) = row.get(HEARING_COLUMN).filter(|v| !v.is_empty()) else {
            return Ok(MigrateAction::Skip(SkipReason::AmbiguousMatch {
                detail: "roster holds duplicate rows for this case".to_string(),
            }));
        };
        let Some(venue_code) = row.get(VENUE_COLUMN).filter(|v| !v.is_empty()) else {
            return Ok(MigrateAction::Skip(SkipReason::MissingSourceField {
                field: VENUE_COLUMN.to_string(),
            }));
        };

        let Some(hearings) = record.field(HEARINGS_FIELD).and_then(Value::as_array) else {
            return Ok(MigrateAction::Skip(SkipReason::MissingSourceField {
                field: HEARINGS_FIELD.to_string(),
            }));
        };

        let matches: Vec<usize> = hearings
            .iter()
            .enumerate()
            .filter(|(_, hearing)| {
                hearing.get("hearingId").and_then(Value::as_str) == Some(hearing_id)
            })
            .map(|(index, _)| index)
            .collect();
        let [index] = matches[..] else {
            return Ok(MigrateAction::Skip(SkipReason::AmbiguousMatch {
                detail: format!(
                    "{} hearings match id '{hearing_id}'",
                    matches.len()
                ),
            }));
        };

        if hearings[index].get("venueCode").and_then(Value::as_str) == Some(venue_code) {
            return Ok(MigrateAction::Skip(SkipReason::AlreadyMigrated));
        }

        let mut updated = hearings.clone();
        updated[index]["venueCode"] = json!(venue_code);
        Ok(MigrateAction::Update(
            FieldChanges::new().with(HEARINGS_FIELD, Value::Array(updated)),
        ))
    }

    fn metadata(&self) -> EditMetadata {
        EditMetadata::new(
            EventId::new_unchecked("backfillHearingVenue"),
            "Backfill hearing venue",
            "Sets the venue code on one hearing from the prepared roster",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use caseflow_core::CaseData;
    use flate2::Compression;
    use flate2::write::DeflateEncoder;
    use std::io::Write;

    fn encode(rows: serde_json::Value) -> String {
        let json = serde_json::to_vec(&rows).unwrap();
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json).unwrap();
        STANDARD.encode(encoder.finish().unwrap())
    }

    fn unit_from(rows: serde_json::Value) -> VenueBackfillUnit {
        let roster = Roster::decode(&encode(rows), Some(HEARING_COLUMN)).unwrap();
        VenueBackfillUnit::new(&roster, CaseTypeId::new("CareCase").unwrap())
    }

    fn record(reference: i64, hearings: serde_json::Value) -> CaseRecord {
        let mut data = CaseData::new();
        data.insert(HEARINGS_FIELD.to_string(), hearings);
        CaseRecord {
            reference: CaseReference::new(reference).unwrap(),
            state: "Open".to_string(),
            data,
        }
    }

    fn standard_unit() -> VenueBackfillUnit {
        unit_from(json!([
            { "case_reference": "101", "hearing_id": "h-1", "venue_code": "V12" }
        ]))
    }

    #[tokio::test]
    async fn candidates_are_deduplicated_roster_references() {
        let unit = unit_from(json!([
            { "case_reference": "102", "hearing_id": "h-1", "venue_code": "V12" },
            { "case_reference": "101", "hearing_id": "h-2", "venue_code": "V12" },
            { "case_reference": "101", "hearing_id": "h-3", "venue_code": "V12" }
        ]));

        let candidates = unit.fetch_candidates().await.unwrap();
        let references: Vec<i64> = candidates.iter().map(|c| c.reference.value()).collect();
        assert_eq!(references, vec![101, 102]);
    }

    #[tokio::test]
    async fn unconfigured_unit_fails_candidate_fetch() {
        let unit = VenueBackfillUnit::unconfigured(CaseTypeId::new("CareCase").unwrap());
        let err = unit.fetch_candidates().await.unwrap_err();
        assert!(err.to_string().contains("CASEFLOW_ROSTER_FILE"));
    }

    #[test]
    fn migrate_sets_the_venue_on_the_matching_hearing() {
        let unit = standard_unit();
        let record = record(
            101,
            json!([
                { "hearingId": "h-0", "venueCode": "V01" },
                { "hearingId": "h-1" }
            ]),
        );

        let MigrateAction::Update(changes) = unit.migrate(&record).unwrap() else {
            panic!("expected an update");
        };
        let hearings = changes.into_inner().remove(HEARINGS_FIELD).unwrap();
        assert_eq!(hearings[0]["venueCode"], json!("V01"));
        assert_eq!(hearings[1]["venueCode"], json!("V12"));
    }

    #[test]
    fn blanked_disambiguator_skips_as_ambiguous() {
        let unit = unit_from(json!([
            { "case_reference": "101", "hearing_id": "h-1", "venue_code": "V12" },
            { "case_reference": "101", "hearing_id": "h-2", "venue_code": "V12" }
        ]));
        let record = record(101, json!([{ "hearingId": "h-1" }]));

        let action = unit.migrate(&record).unwrap();
        assert!(matches!(
            action,
            MigrateAction::Skip(SkipReason::AmbiguousMatch { .. })
        ));
    }

    #[test]
    fn unmatched_hearing_id_skips_as_ambiguous() {
        let unit = standard_unit();
        let record = record(101, json!([{ "hearingId": "h-9" }]));

        let action = unit.migrate(&record).unwrap();
        assert!(matches!(
            action,
            MigrateAction::Skip(SkipReason::AmbiguousMatch { .. })
        ));
    }

    #[test]
    fn multiply_matched_hearing_id_skips_as_ambiguous() {
        let unit = standard_unit();
        let record = record(
            101,
            json!([{ "hearingId": "h-1" }, { "hearingId": "h-1" }]),
        );

        let action = unit.migrate(&record).unwrap();
        assert!(matches!(
            action,
            MigrateAction::Skip(SkipReason::AmbiguousMatch { .. })
        ));
    }

    #[test]
    fn already_correct_venue_skips_as_migrated() {
        let unit = standard_unit();
        let record = record(101, json!([{ "hearingId": "h-1", "venueCode": "V12" }]));

        let action = unit.migrate(&record).unwrap();
        assert_eq!(action, MigrateAction::Skip(SkipReason::AlreadyMigrated));
    }

    #[test]
    fn missing_hearings_array_skips_with_the_field_named() {
        let unit = standard_unit();
        let record = CaseRecord {
            reference: CaseReference::new(101).unwrap(),
            state: "Open".to_string(),
            data: CaseData::new(),
        };

        let action = unit.migrate(&record).unwrap();
        assert_eq!(
            action,
            MigrateAction::Skip(SkipReason::MissingSourceField {
                field: HEARINGS_FIELD.to_string()
            })
        );
    }

    #[test]
    fn off_roster_case_is_not_applicable() {
        let unit = standard_unit();
        let record = record(999, json!([{ "hearingId": "h-1" }]));

        let action = unit.migrate(&record).unwrap();
        assert!(matches!(
            action,
            MigrateAction::Skip(SkipReason::NotApplicable { .. })
        ));
    }
}

//! Decoding of pre-computed candidate rosters.
//!
//! Some jobs do not search for their candidates; they are handed a roster
//! prepared offline: a base64-encoded, raw-deflate-compressed JSON array of
//! string-to-string row maps. Every row carries the case reference column;
//! jobs may rely on further columns, typically a disambiguator correlating
//! the row to one item inside the case.

use std::collections::BTreeMap;
use std::io::Read;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use flate2::read::DeflateDecoder;

use caseflow_core::CaseReference;

use crate::error::{Error, Result};

/// The column every roster row must carry.
pub const REFERENCE_COLUMN: &str = "case_reference";

/// One decoded roster row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    reference: CaseReference,
    columns: BTreeMap<String, String>,
}

impl RosterRow {
    /// The case this row refers to.
    #[must_use]
    pub fn reference(&self) -> CaseReference {
        self.reference
    }

    /// The value of a column, if the row carries it.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }
}

/// A decoded candidate roster.
#[derive(Debug, Clone)]
pub struct Roster {
    rows: Vec<RosterRow>,
    duplicates: Vec<CaseReference>,
}

impl Roster {
    /// Decodes an encoded roster payload.
    ///
    /// When a `disambiguator` column is named, rows sharing a case
    /// reference have that column cleared; jobs treat a cleared
    /// disambiguator as an ambiguous case and skip it rather than guess
    /// which row was meant.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not valid base64, does not
    /// inflate, is not a JSON array of string maps, or any row lacks a
    /// parseable case reference.
    pub fn decode(encoded: &str, disambiguator: Option<&str>) -> Result<Self> {
        let compressed = STANDARD
            .decode(encoded.trim())
            .map_err(|e| Error::roster(format!("invalid base64: {e}")))?;

        let mut json = Vec::new();
        DeflateDecoder::new(compressed.as_slice())
            .read_to_end(&mut json)
            .map_err(|e| Error::roster(format!("inflate failed: {e}")))?;

        let raw_rows: Vec<BTreeMap<String, String>> = serde_json::from_slice(&json)
            .map_err(|e| Error::roster(format!("invalid roster JSON: {e}")))?;

        let mut rows = Vec::with_capacity(raw_rows.len());
        for (index, columns) in raw_rows.into_iter().enumerate() {
            let raw_reference = columns.get(REFERENCE_COLUMN).ok_or_else(|| {
                Error::roster(format!("row {index} lacks the {REFERENCE_COLUMN} column"))
            })?;
            let reference: CaseReference = raw_reference.parse().map_err(|e| {
                Error::roster(format!("row {index} has an invalid case reference: {e}"))
            })?;
            rows.push(RosterRow { reference, columns });
        }

        let mut counts: BTreeMap<CaseReference, usize> = BTreeMap::new();
        for row in &rows {
            *counts.entry(row.reference).or_insert(0) += 1;
        }
        let duplicates: Vec<CaseReference> = counts
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(reference, _)| *reference)
            .collect();

        if let Some(column) = disambiguator {
            for row in &mut rows {
                if counts.get(&row.reference).copied().unwrap_or(0) > 1 {
                    if let Some(value) = row.columns.get_mut(column) {
                        value.clear();
                    }
                }
            }
        }

        Ok(Self { rows, duplicates })
    }

    /// The decoded rows, in roster order.
    #[must_use]
    pub fn rows(&self) -> &[RosterRow] {
        &self.rows
    }

    /// Number of rows in the roster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the roster has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Case references appearing on more than one row, ascending.
    #[must_use]
    pub fn duplicates(&self) -> &[CaseReference] {
        &self.duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::DeflateEncoder;
    use serde_json::json;
    use std::io::Write;

    fn encode(rows: serde_json::Value) -> String {
        let json = serde_json::to_vec(&rows).unwrap();
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json).unwrap();
        STANDARD.encode(encoder.finish().unwrap())
    }

    #[test]
    fn decodes_rows_with_their_columns() {
        let encoded = encode(json!([
            { "case_reference": "101", "hearing_id": "h-1", "venue_code": "V12" },
            { "case_reference": "102", "hearing_id": "h-9", "venue_code": "V03" }
        ]));

        let roster = Roster::decode(&encoded, Some("hearing_id")).unwrap();

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.rows()[0].reference().value(), 101);
        assert_eq!(roster.rows()[0].get("venue_code"), Some("V12"));
        assert_eq!(roster.rows()[1].get("hearing_id"), Some("h-9"));
        assert!(roster.duplicates().is_empty());
    }

    #[test]
    fn duplicate_references_blank_the_disambiguator() {
        let encoded = encode(json!([
            { "case_reference": "101", "hearing_id": "h-1", "venue_code": "V12" },
            { "case_reference": "101", "hearing_id": "h-2", "venue_code": "V12" },
            { "case_reference": "102", "hearing_id": "h-9", "venue_code": "V03" }
        ]));

        let roster = Roster::decode(&encoded, Some("hearing_id")).unwrap();

        assert_eq!(roster.rows()[0].get("hearing_id"), Some(""));
        assert_eq!(roster.rows()[1].get("hearing_id"), Some(""));
        assert_eq!(roster.rows()[2].get("hearing_id"), Some("h-9"));
        assert_eq!(
            roster.duplicates(),
            &[CaseReference::new(101).unwrap()]
        );
    }

    #[test]
    fn without_a_disambiguator_duplicates_are_only_reported() {
        let encoded = encode(json!([
            { "case_reference": "101", "hearing_id": "h-1" },
            { "case_reference": "101", "hearing_id": "h-2" }
        ]));

        let roster = Roster::decode(&encoded, None).unwrap();

        assert_eq!(roster.rows()[0].get("hearing_id"), Some("h-1"));
        assert_eq!(roster.duplicates().len(), 1);
    }

    #[test]
    fn invalid_base64_is_a_roster_error() {
        let result = Roster::decode("not base64!!!", None);
        assert!(matches!(result, Err(Error::Roster { .. })));
    }

    #[test]
    fn undeflatable_bytes_are_a_roster_error() {
        let encoded = STANDARD.encode(b"plain bytes, never deflated");
        let result = Roster::decode(&encoded, None);
        assert!(matches!(result, Err(Error::Roster { .. })));
    }

    #[test]
    fn rows_without_a_reference_fail_decoding() {
        let encoded = encode(json!([{ "hearing_id": "h-1" }]));
        let result = Roster::decode(&encoded, None);
        assert!(matches!(result, Err(Error::Roster { .. })));
    }

    #[test]
    fn non_numeric_references_fail_decoding() {
        let encoded = encode(json!([{ "case_reference": "abc" }]));
        let result = Roster::decode(&encoded, None);
        assert!(matches!(result, Err(Error::Roster { .. })));
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let encoded = format!("\n  {}  \n", encode(json!([{ "case_reference": "7" }])));
        let roster = Roster::decode(&encoded, None).unwrap();
        assert_eq!(roster.len(), 1);
    }
}

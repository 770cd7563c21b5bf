//! The case data model: records, summaries, field changes, and edit sessions.
//!
//! Case data is an open-ended JSON document; jobs read and write individual
//! fields without the crate imposing a schema. Everything here is plain
//! data — the store clients produce it, migration units transform it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::{CaseReference, EventId};

/// The open-ended field document of a case: field name to JSON value.
pub type CaseData = serde_json::Map<String, Value>;

/// A full case record as returned by the case-management store.
///
/// Owned exclusively by the worker processing the case; fetched fresh via
/// `StartEdit` and discarded after submit or failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    /// The unique case reference.
    pub reference: CaseReference,
    /// The current state label of the case.
    pub state: String,
    /// The case field document.
    #[serde(default)]
    pub data: CaseData,
}

impl CaseRecord {
    /// Returns the value of a top-level field, if present.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Returns the value of a top-level field as a string slice, if the
    /// field is present and is a string.
    #[must_use]
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.data.get(name).and_then(Value::as_str)
    }

    /// Returns true when a top-level field is present and non-null.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.data.get(name).is_some_and(|v| !v.is_null())
    }
}

/// A lightweight case summary as returned by the search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseSummary {
    /// The unique case reference; also the pagination sort key.
    pub reference: CaseReference,
    /// The current state label, when the query projects it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl CaseSummary {
    /// Creates a summary carrying only the reference.
    #[must_use]
    pub fn new(reference: CaseReference) -> Self {
        Self {
            reference,
            state: None,
        }
    }
}

/// The set of field values a migration writes to a case.
///
/// Changes are merged over the fetched field document at submit time;
/// untouched fields pass through unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldChanges(CaseData);

impl FieldChanges {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self(CaseData::new())
    }

    /// Adds a field to the change set, returning the set for chaining.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.0.insert(field.into(), value);
        self
    }

    /// Adds a field to the change set.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// Returns true when no fields would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of changed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Merges the changes over an existing field document.
    pub fn apply_to(&self, data: &mut CaseData) {
        for (field, value) in &self.0 {
            data.insert(field.clone(), value.clone());
        }
    }

    /// Consumes the change set, returning the underlying field map.
    #[must_use]
    pub fn into_inner(self) -> CaseData {
        self.0
    }
}

/// The event metadata attached to every submit of one migration job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditMetadata {
    /// The fixed store event this job submits under.
    pub event_id: EventId,
    /// Human-readable one-line summary shown in the case history.
    pub summary: String,
    /// Longer description shown in the case history.
    pub description: String,
}

impl EditMetadata {
    /// Creates edit metadata from its parts.
    #[must_use]
    pub fn new(
        event_id: EventId,
        summary: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            event_id,
            summary: summary.into(),
            description: description.into(),
        }
    }
}

/// A short-lived edit session issued by the store's `StartEdit` call.
///
/// Pairs the optimistic-concurrency token with the case snapshot it was
/// issued against. Submitted or discarded before the worker moves on;
/// never persisted, never reused across cases. The record is absent when
/// the store answered without a case payload.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    /// The optimistic-concurrency token required by `SubmitEdit`.
    pub token: String,
    /// The case snapshot the token was issued against.
    pub record: Option<CaseRecord>,
}

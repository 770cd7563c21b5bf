//! Keyset-paginated search query documents.
//!
//! Every job supplies a structural query (which fields must or must not
//! exist, which states qualify); this module wraps it into the fixed
//! document shape the search collaborator expects and threads the keyset
//! cursor through successive pages.

use serde_json::{Value, json};

use caseflow_core::{CaseReference, CaseTypeId};

/// The field every query sorts by. The case reference is unique and
/// strictly ordered, which keyset pagination requires of its sort key.
pub const SORT_FIELD: &str = "reference";

/// A job's structural search query, scoped to one case type.
#[derive(Debug, Clone)]
pub struct QueryTemplate {
    case_type: CaseTypeId,
    query: Value,
    source: Vec<String>,
}

impl QueryTemplate {
    /// Creates a template from a structural query clause.
    #[must_use]
    pub fn new(case_type: CaseTypeId, query: Value) -> Self {
        Self {
            case_type,
            query,
            source: vec![SORT_FIELD.to_string()],
        }
    }

    /// Adds a field to the result projection. The sort field is always
    /// projected.
    #[must_use]
    pub fn with_source_field(mut self, field: impl Into<String>) -> Self {
        self.source.push(field.into());
        self
    }

    /// The case type this template queries.
    #[must_use]
    pub fn case_type(&self) -> &CaseTypeId {
        &self.case_type
    }

    /// Builds the query document for one page.
    ///
    /// `page_size` must be positive; this is a caller precondition, not
    /// validated here. With a cursor the document gains a `search_after`
    /// clause resuming immediately after that sort-key value; without one
    /// it requests the first page.
    #[must_use]
    pub fn page(&self, cursor: Option<&CaseReference>, page_size: usize) -> Value {
        let mut document = json!({
            "query": self.query,
            "_source": self.source,
            "size": page_size,
            "sort": [{ SORT_FIELD: { "order": "asc" } }],
        });
        if let Some(cursor) = cursor {
            document["search_after"] = json!([cursor.value()]);
        }
        document
    }
}

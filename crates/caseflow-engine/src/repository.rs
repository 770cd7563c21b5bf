//! Keyset-paginated case retrieval.
//!
//! The repository walks the search index page by page, carrying the last
//! record's reference forward as the `search_after` cursor, until a page
//! comes back empty. This is a plain keyset scan, not a snapshot read: if
//! the index mutates mid-scan the result set reflects a mix of before and
//! after. There is deliberately no page cap; a bulk job owns its index and
//! scans it to the end.

use std::sync::Arc;

use caseflow_client::SearchIndex;
use caseflow_core::{CaseReference, CaseSummary};

use crate::error::{Error, Result};
use crate::query::QueryTemplate;

/// Retrieves the full candidate set matching a job's query.
pub struct SearchRepository {
    index: Arc<dyn SearchIndex>,
    page_size: usize,
}

impl SearchRepository {
    /// Creates a repository over a search index.
    ///
    /// `page_size` must be positive.
    #[must_use]
    pub fn new(index: Arc<dyn SearchIndex>, page_size: usize) -> Self {
        Self { index, page_size }
    }

    /// Accumulates every case matching the template, in index sort order.
    ///
    /// # Errors
    ///
    /// Any page failing aborts the scan immediately; no partial results
    /// are returned.
    pub async fn find_all(&self, template: &QueryTemplate) -> Result<Vec<CaseSummary>> {
        let mut results: Vec<CaseSummary> = Vec::new();
        let mut cursor: Option<CaseReference> = None;
        let mut pages: usize = 0;

        loop {
            let document = template.page(cursor.as_ref(), self.page_size);
            let page = self
                .index
                .search(template.case_type(), &document)
                .await
                .map_err(|e| {
                    Error::search(
                        format!(
                            "page {} of case type {} failed",
                            pages + 1,
                            template.case_type()
                        ),
                        e,
                    )
                })?;
            pages += 1;

            let Some(last) = page.last() else {
                break;
            };
            cursor = Some(last.reference);
            results.extend(page);
        }

        tracing::debug!(
            case_type = %template.case_type(),
            pages,
            total = results.len(),
            "search scan complete"
        );
        Ok(results)
    }
}

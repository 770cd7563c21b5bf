//! Client for the case search index.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use caseflow_core::{CaseSummary, CaseTypeId};

use crate::auth::{CredentialsProvider, SERVICE_AUTH_HEADER};
use crate::error::{ClientError, Result, response_error};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes one search query against the index, returning a single page.
///
/// Pagination lives above this seam: the search repository drives repeated
/// calls with advancing keyset cursors.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Runs the query document against one case type's index.
    ///
    /// An index answering with no result list at all yields an empty page.
    ///
    /// # Errors
    ///
    /// Returns an error if the search call fails or the response is
    /// invalid; pagination above propagates it without partial results.
    async fn search(
        &self,
        case_type: &CaseTypeId,
        query: &serde_json::Value,
    ) -> Result<Vec<CaseSummary>>;
}

/// HTTP client for the search collaborator.
#[derive(Clone)]
pub struct HttpSearchIndex {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialsProvider>,
}

impl HttpSearchIndex {
    /// Creates a new search client targeting the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialsProvider>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: base_url.into(),
            credentials,
        }
    }

    fn search_url(&self, case_type: &CaseTypeId) -> String {
        format!(
            "{}/case-types/{}/search",
            self.base_url.trim_end_matches('/'),
            case_type
        )
    }
}

#[async_trait]
impl SearchIndex for HttpSearchIndex {
    async fn search(
        &self,
        case_type: &CaseTypeId,
        query: &serde_json::Value,
    ) -> Result<Vec<CaseSummary>> {
        let credentials = self.credentials.credentials().await?;
        let response = self
            .client
            .post(self.search_url(case_type))
            .bearer_auth(&credentials.bearer)
            .header(SERVICE_AUTH_HEADER, &credentials.service)
            .json(query)
            .send()
            .await
            .map_err(|e| ClientError::http(format!("search request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(response_error("search", response).await);
        }

        let body: SearchResponse = response.json().await.map_err(|e| {
            ClientError::Serialization {
                message: format!("invalid search response: {e}"),
            }
        })?;
        Ok(body.cases.unwrap_or_default())
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    // A null or absent list is an empty page, not an error.
    #[serde(default)]
    cases: Option<Vec<CaseSummary>>,
}

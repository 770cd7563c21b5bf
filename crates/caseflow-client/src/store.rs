//! Client for the case-management store's start/submit edit protocol.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use caseflow_core::{CaseData, CaseId, CaseRecord, EditMetadata, EditSession, EventId};

use crate::auth::{CredentialsProvider, SERVICE_AUTH_HEADER};
use crate::error::{ClientError, Result, response_error};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The case-management store's edit protocol.
///
/// `start_edit` opens an optimistic-concurrency edit session for a case;
/// `submit_edit` commits new field values under that session's token. The
/// store rejects a submit whose token went stale with a conflict.
#[async_trait]
pub trait CaseStore: Send + Sync {
    /// Starts an edit, returning the session token and the current record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails or the response is invalid.
    async fn start_edit(&self, case: &CaseId, event: &EventId) -> Result<EditSession>;

    /// Submits new field values under a previously started session's token.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the submit (including a stale
    /// session token) or the call fails.
    async fn submit_edit(
        &self,
        case: &CaseId,
        token: &str,
        data: CaseData,
        metadata: &EditMetadata,
    ) -> Result<CaseRecord>;
}

/// HTTP client for the case-management store.
///
/// Credentials are fetched from the provider on every call.
#[derive(Clone)]
pub struct HttpCaseStore {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialsProvider>,
}

impl HttpCaseStore {
    /// Creates a new store client targeting the given base URL.
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

    fn start_edit_url(&self, case: &CaseId, event: &EventId) -> String {
        format!(
            "{}/case-types/{}/cases/{}/edits/{}",
            self.base_url.trim_end_matches('/'),
            case.case_type,
            case.reference,
            event
        )
    }

    fn submit_edit_url(&self, case: &CaseId) -> String {
        format!(
            "{}/case-types/{}/cases/{}/edits",
            self.base_url.trim_end_matches('/'),
            case.case_type,
            case.reference
        )
    }
}

#[async_trait]
impl CaseStore for HttpCaseStore {
    async fn start_edit(&self, case: &CaseId, event: &EventId) -> Result<EditSession> {
        let credentials = self.credentials.credentials().await?;
        let response = self
            .client
            .get(self.start_edit_url(case, event))
            .bearer_auth(&credentials.bearer)
            .header(SERVICE_AUTH_HEADER, &credentials.service)
            .send()
            .await
            .map_err(|e| ClientError::http(format!("start edit request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(response_error("start edit", response).await);
        }

        let body: StartEditResponse = response.json().await.map_err(|e| {
            ClientError::Serialization {
                message: format!("invalid start edit response: {e}"),
            }
        })?;
        Ok(EditSession {
            token: body.token,
            record: body.case,
        })
    }

    async fn submit_edit(
        &self,
        case: &CaseId,
        token: &str,
        data: CaseData,
        metadata: &EditMetadata,
    ) -> Result<CaseRecord> {
        let credentials = self.credentials.credentials().await?;
        let request = SubmitEditRequest {
            token,
            data,
            event: EventBody {
                id: metadata.event_id.as_str(),
                summary: &metadata.summary,
                description: &metadata.description,
            },
        };
        let response = self
            .client
            .post(self.submit_edit_url(case))
            .bearer_auth(&credentials.bearer)
            .header(SERVICE_AUTH_HEADER, &credentials.service)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::http(format!("submit edit request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(response_error("submit edit", response).await);
        }

        response.json().await.map_err(|e| ClientError::Serialization {
            message: format!("invalid submit edit response: {e}"),
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartEditResponse {
    token: String,
    #[serde(default)]
    case: Option<CaseRecord>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitEditRequest<'a> {
    token: &'a str,
    data: CaseData,
    event: EventBody<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventBody<'a> {
    id: &'a str,
    summary: &'a str,
    description: &'a str,
}

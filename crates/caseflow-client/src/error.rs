//! Error types for collaborator clients.
//!
//! Every variant here is a per-call failure. During a migration run these
//! are caught case by case and recorded as that case's failure; they only
//! abort a job when candidate fetching itself fails.

use reqwest::StatusCode;

/// The result type used by collaborator clients.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors returned by the store, search, and identity clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP transport failed (connect, timeout, reading the body).
    #[error("http error: {message}")]
    Http {
        /// Description of the transport failure.
        message: String,
    },

    /// The collaborator rejected the request as invalid.
    #[error("validation error: {message}")]
    Validation {
        /// The collaborator's rejection message.
        message: String,
    },

    /// The edit token was stale; the case changed under the edit session.
    #[error("precondition failed: {message}")]
    PreconditionFailed {
        /// The collaborator's conflict message.
        message: String,
    },

    /// Credentials could not be obtained or were rejected.
    #[error("auth error: {message}")]
    Auth {
        /// Description of the credential failure.
        message: String,
    },

    /// The collaborator answered with an unexpected status.
    #[error("api error ({status}): {message}")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The collaborator's error message, or the raw body.
        message: String,
    },

    /// A response body could not be decoded.
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of the decode failure.
        message: String,
    },
}

impl ClientError {
    /// Creates a transport error with the given message.
    #[must_use]
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
        }
    }

    /// Creates an auth error with the given message.
    #[must_use]
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::CONFLICT => Self::PreconditionFailed { message },
            StatusCode::BAD_REQUEST => Self::Validation { message },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Auth { message },
            _ => Self::Api {
                status: status.as_u16(),
                message,
            },
        }
    }
}

/// Maps a non-success response to a typed error, preferring the JSON
/// `message` field of the body and falling back to the raw text.
pub(crate) async fn response_error(operation: &str, response: reqwest::Response) -> ClientError {
    let status = response.status();
    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            return ClientError::http(format!("failed reading {operation} error body: {e}"));
        }
    };
    let message = serde_json::from_slice::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(|v| v.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| String::from_utf8_lossy(&body).to_string());

    ClientError::from_status(status, format!("{operation} failed: {message}"))
}

//! Error types and result aliases shared across caseflow components.
//!
//! Case-level failures during a migration run are not represented here;
//! they are caught and aggregated by the processor. These errors cover the
//! conditions that abort a job outright: bad identifiers, bad configuration,
//! and malformed payloads.

/// The result type used throughout caseflow.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in caseflow core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An invalid identifier was provided.
    #[error("invalid identifier: {message}")]
    InvalidId {
        /// Description of what made the identifier invalid.
        message: String,
    },

    /// Job or runtime configuration is malformed.
    ///
    /// Surfaced before any case is processed; aborts the whole run.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of the serialization failure.
        message: String,
    },

    /// An internal error occurred that should not happen in normal operation.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl Error {
    /// Creates a new configuration error with the given message.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new serialization error with the given message.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_display() {
        let err = Error::configuration("two case types requested");
        assert_eq!(
            err.to_string(),
            "configuration error: two case types requested"
        );
    }

    #[test]
    fn invalid_id_display() {
        let err = Error::InvalidId {
            message: "reference must be positive".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid identifier: reference must be positive"
        );
    }

    #[test]
    fn serialization_error_display() {
        let err = Error::serialization("unexpected end of input");
        assert_eq!(err.to_string(), "serialization error: unexpected end of input");
    }
}

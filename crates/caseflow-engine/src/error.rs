//! Error types for the migration engine.
//!
//! These are job-level errors: they abort the job that raised them. Per-case
//! failures never surface here; the processor catches those and records them
//! in the run report.

use caseflow_client::ClientError;

/// The result type used throughout caseflow-engine.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in migration engine operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Candidate search failed; the scan aborts with no partial results.
    #[error("search failed: {message}")]
    Search {
        /// Description of the search failure.
        message: String,
        /// The underlying client error, if any.
        #[source]
        source: Option<ClientError>,
    },

    /// An encoded roster could not be decoded.
    #[error("roster decode failed: {message}")]
    Roster {
        /// Description of the decode failure.
        message: String,
    },

    /// No registered job carries the requested name.
    #[error("unknown job: {name} (registered: {registered})")]
    UnknownJob {
        /// The name that was requested.
        name: String,
        /// Comma-separated names of the registered jobs.
        registered: String,
    },

    /// A unit's candidate fetch failed for a non-search reason.
    #[error("candidate fetch failed: {message}")]
    CandidateFetch {
        /// Description of the failure.
        message: String,
    },

    /// A unit's transformation failed unexpectedly.
    ///
    /// Caught per case by the processor; never aborts the batch.
    #[error("migration failed: {message}")]
    Migration {
        /// Description of the failure.
        message: String,
    },

    /// An error from caseflow-core, typically configuration.
    #[error("core error: {0}")]
    Core(#[from] caseflow_core::Error),
}

impl Error {
    /// Creates a search error from a client failure.
    #[must_use]
    pub fn search(message: impl Into<String>, source: ClientError) -> Self {
        Self::Search {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a roster decode error.
    #[must_use]
    pub fn roster(message: impl Into<String>) -> Self {
        Self::Roster {
            message: message.into(),
        }
    }

    /// Creates a candidate fetch error.
    #[must_use]
    pub fn candidate_fetch(message: impl Into<String>) -> Self {
        Self::CandidateFetch {
            message: message.into(),
        }
    }

    /// Creates a migration error.
    #[must_use]
    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration {
            message: message.into(),
        }
    }

    /// Returns true when the error is a configuration problem that should
    /// have been caught before the run started.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Core(caseflow_core::Error::Configuration { .. }) | Self::UnknownJob { .. }
        )
    }
}

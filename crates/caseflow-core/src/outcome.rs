//! Per-case migration outcomes and skip reasons.
//!
//! A skip is a normal, expected outcome: the case did not meet the job's
//! preconditions and was deliberately left unmodified. It is distinct from
//! a failure, which records an unexpected error. Every processed case ends
//! in exactly one of the three outcomes.

use std::fmt;

/// A typed reason a case was deliberately left unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The store answered `StartEdit` without a case payload.
    RecordMissing,
    /// The case already carries the migrated value.
    AlreadyMigrated,
    /// A field the transformation reads is missing or empty.
    MissingSourceField {
        /// The field that was expected.
        field: String,
    },
    /// The case is in a state the job does not touch.
    WrongState {
        /// The state the case was found in.
        state: String,
    },
    /// The case matched more than one target, or its match was withdrawn.
    AmbiguousMatch {
        /// What made the match ambiguous.
        detail: String,
    },
    /// The unit's predicate rejected the case.
    NotApplicable {
        /// Why the case was rejected.
        detail: String,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecordMissing => write!(f, "case record missing"),
            Self::AlreadyMigrated => write!(f, "case already migrated"),
            Self::MissingSourceField { field } => {
                write!(f, "required source field '{field}' missing")
            }
            Self::WrongState { state } => write!(f, "case in state '{state}' is not eligible"),
            Self::AmbiguousMatch { detail } => write!(f, "ambiguous match: {detail}"),
            Self::NotApplicable { detail } => write!(f, "not applicable: {detail}"),
        }
    }
}

/// The terminal classification of one processed case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The change was submitted (or would have been, on a dry run).
    Migrated,
    /// The case was deliberately left unmodified.
    Skipped(SkipReason),
    /// An unexpected error stopped this case; the batch continued.
    Failed {
        /// The error message, for the per-case log line.
        message: String,
    },
}

impl MigrationOutcome {
    /// Creates a failed outcome from any displayable error.
    #[must_use]
    pub fn failed(error: impl fmt::Display) -> Self {
        Self::Failed {
            message: error.to_string(),
        }
    }

    /// Returns true when the case was migrated.
    #[must_use]
    pub fn is_migrated(&self) -> bool {
        matches!(self, Self::Migrated)
    }

    /// Returns true when the case was skipped.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    /// Returns true when the case failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns the outcome label used in log fields.
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Migrated => "migrated",
            Self::Skipped(_) => "skipped",
            Self::Failed { .. } => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_reasons_render_the_specific_reason() {
        assert_eq!(
            SkipReason::MissingSourceField {
                field: "legacyHearingType".to_string()
            }
            .to_string(),
            "required source field 'legacyHearingType' missing"
        );
        assert_eq!(SkipReason::AlreadyMigrated.to_string(), "case already migrated");
        assert_eq!(SkipReason::RecordMissing.to_string(), "case record missing");
    }

    #[test]
    fn outcome_classification() {
        assert!(MigrationOutcome::Migrated.is_migrated());
        assert!(MigrationOutcome::Skipped(SkipReason::AlreadyMigrated).is_skipped());
        assert!(MigrationOutcome::failed("boom").is_failed());
        assert!(!MigrationOutcome::Migrated.is_failed());
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(MigrationOutcome::Migrated.as_label(), "migrated");
        assert_eq!(
            MigrationOutcome::Skipped(SkipReason::RecordMissing).as_label(),
            "skipped"
        );
        assert_eq!(MigrationOutcome::failed("x").as_label(), "failed");
    }

    #[test]
    fn failed_outcome_keeps_the_message() {
        let outcome = MigrationOutcome::failed("connection reset");
        assert_eq!(
            outcome,
            MigrationOutcome::Failed {
                message: "connection reset".to_string()
            }
        );
    }
}

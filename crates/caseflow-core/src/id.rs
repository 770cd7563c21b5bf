//! Strongly-typed identifiers for caseflow entities.
//!
//! All identifiers are:
//! - **Strongly typed**: Prevents mixing up different ID kinds at compile time
//! - **Validated on construction**: A parsed identifier is always well-formed
//! - **Cheap to copy or clone**: Suitable for stamping on every log line
//!
//! # Example
//!
//! ```rust
//! use caseflow_core::id::{CaseReference, CaseTypeId, CaseId};
//!
//! let reference = CaseReference::new(1_675_333_333_333_333).unwrap();
//! let case_type = CaseTypeId::new("CareCase").unwrap();
//! let case = CaseId::new(reference, case_type);
//! assert_eq!(case.to_string(), "CareCase/1675333333333333");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

use crate::error::{Error, Result};

/// The unique numeric reference of a case in the case-management store.
///
/// References are strictly positive and strictly ordered; keyset pagination
/// relies on that ordering, so the search index sorts by this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseReference(i64);

impl CaseReference {
    /// Creates a case reference after validating that it is positive.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference is zero or negative.
    pub fn new(reference: i64) -> Result<Self> {
        if reference <= 0 {
            return Err(Error::InvalidId {
                message: format!("case reference must be positive, got {reference}"),
            });
        }
        Ok(Self(reference))
    }

    /// Returns the raw reference number.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for CaseReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CaseReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw: i64 = s.trim().parse().map_err(|e| Error::InvalidId {
            message: format!("invalid case reference '{s}': {e}"),
        })?;
        Self::new(raw)
    }
}

/// The case-type tag a case belongs to.
///
/// Case types scope every store and search call; a single run targets
/// exactly one case type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseTypeId(String);

impl CaseTypeId {
    /// Creates a new case type ID after validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is empty, too long, or contains
    /// characters other than alphanumerics, hyphens, and underscores.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Creates a case type ID without validation.
    ///
    /// Intended for IDs that have already been validated (e.g., from
    /// configuration that passed `Config::validate`).
    #[must_use]
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the case type ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<()> {
        if id.is_empty() {
            return Err(Error::InvalidId {
                message: "case type ID cannot be empty".to_string(),
            });
        }

        if id.len() > 64 {
            return Err(Error::InvalidId {
                message: format!("case type ID '{id}' is too long (maximum 64 characters)"),
            });
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::InvalidId {
                message: format!(
                    "case type ID '{id}' may only contain alphanumerics, hyphens, and underscores"
                ),
            });
        }

        Ok(())
    }
}

impl fmt::Display for CaseTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CaseTypeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// The identifier of a store edit event.
///
/// Each migration job submits every change under one fixed event ID; the
/// store uses it to select the edit workflow and audit label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Creates a new event ID after validating that it is non-empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is empty or contains whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::InvalidId {
                message: "event ID cannot be empty".to_string(),
            });
        }
        if id.chars().any(char::is_whitespace) {
            return Err(Error::InvalidId {
                message: format!("event ID '{id}' cannot contain whitespace"),
            });
        }
        Ok(Self(id))
    }

    /// Creates an event ID without validation.
    #[must_use]
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the event ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for one migration run.
///
/// Generated at run start and stamped on every log line the run emits,
/// so concurrent and historical runs can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Ulid);

impl RunId {
    /// Generates a new unique run ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    /// Creates a run ID from a raw ULID.
    #[must_use]
    pub const fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    /// Returns the underlying ULID.
    #[must_use]
    pub const fn as_ulid(&self) -> Ulid {
        self.0
    }

    /// Returns the creation timestamp encoded in the ID.
    #[must_use]
    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        let ms = self.0.timestamp_ms();
        chrono::DateTime::from_timestamp_millis(ms as i64).unwrap_or_else(chrono::Utc::now)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ulid::from_string(s)
            .map(Self)
            .map_err(|e| Error::InvalidId {
                message: format!("invalid run ID '{s}': {e}"),
            })
    }
}

/// A fully-qualified case identifier: reference plus case-type tag.
///
/// Produced by the search repository or by decoding a roster; immutable
/// once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseId {
    /// The unique case reference.
    pub reference: CaseReference,
    /// The case type the reference belongs to.
    pub case_type: CaseTypeId,
}

impl CaseId {
    /// Creates a case identifier from its parts.
    #[must_use]
    pub fn new(reference: CaseReference, case_type: CaseTypeId) -> Self {
        Self {
            reference,
            case_type,
        }
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.case_type, self.reference)
    }
}

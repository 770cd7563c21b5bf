//! # caseflow-core
//!
//! Core abstractions for the caseflow bulk case-migration tool.
//!
//! This crate provides the foundational types used across all caseflow
//! components:
//!
//! - **Identifiers**: Strongly-typed case references, case types, event IDs,
//!   and run IDs
//! - **Case Model**: Records, summaries, field change sets, and edit sessions
//! - **Outcomes**: Per-case migration outcomes and typed skip reasons
//! - **Error Types**: Shared error definitions and result types
//!
//! ## Crate Boundary
//!
//! `caseflow-core` defines the shared vocabulary and nothing else: no I/O,
//! no HTTP, no concurrency. Collaborator clients live in `caseflow-client`;
//! the processor and job contract live in `caseflow-engine`.
//!
//! ## Example
//!
//! ```rust
//! use caseflow_core::prelude::*;
//!
//! let reference = CaseReference::new(1_675_333_333_333_333).unwrap();
//! let case_type = CaseTypeId::new("CareCase").unwrap();
//! let case = CaseId::new(reference, case_type);
//!
//! let run = RunId::generate();
//! println!("run {run} targets {case}");
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod case;
pub mod error;
pub mod id;
pub mod outcome;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use caseflow_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::case::{
        CaseData, CaseRecord, CaseSummary, EditMetadata, EditSession, FieldChanges,
    };
    pub use crate::error::{Error, Result};
    pub use crate::id::{CaseId, CaseReference, CaseTypeId, EventId, RunId};
    pub use crate::outcome::{MigrationOutcome, SkipReason};
}

// Re-export key types at crate root for ergonomics
pub use case::{CaseData, CaseRecord, CaseSummary, EditMetadata, EditSession, FieldChanges};
pub use error::{Error, Result};
pub use id::{CaseId, CaseReference, CaseTypeId, EventId, RunId};
pub use outcome::{MigrationOutcome, SkipReason};

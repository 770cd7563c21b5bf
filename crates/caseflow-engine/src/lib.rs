//! # caseflow-engine
//!
//! The core of the caseflow bulk migration tool:
//!
//! - **Query builder** ([`QueryTemplate`]): keyset-paginated search documents
//! - **Search repository** ([`SearchRepository`]): full candidate-set scans
//! - **Unit contract** ([`MigrationUnit`]): the pluggable per-job policy
//! - **Processor** ([`MigrationProcessor`]): the bounded-concurrency
//!   fetch→transform→submit driver
//! - **Report** ([`RunReport`]): the aggregate outcome of one run
//! - **Roster** ([`Roster`]): the encoded candidate-list decoder
//! - **Registry** ([`JobCatalog`]): the explicit list of known jobs
//!
//! Concrete migration jobs live under [`jobs`]; everything else is
//! job-agnostic machinery driven through the [`MigrationUnit`] trait.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod jobs;
pub mod processor;
pub mod query;
pub mod registry;
pub mod report;
pub mod repository;
pub mod roster;
pub mod unit;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use processor::{DEFAULT_CONCURRENCY, DEFAULT_MAX_CASES, MigrationProcessor, ProcessorConfig};
pub use query::{QueryTemplate, SORT_FIELD};
pub use registry::{JobCatalog, RegisteredJob};
pub use report::RunReport;
pub use repository::SearchRepository;
pub use roster::{REFERENCE_COLUMN, Roster, RosterRow};
pub use unit::{MigrateAction, MigrationUnit};

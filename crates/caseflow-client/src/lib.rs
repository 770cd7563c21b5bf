//! # caseflow-client
//!
//! HTTP clients for the collaborators a migration run talks to:
//!
//! - **Case store** ([`CaseStore`]): the versioned start/submit edit protocol
//! - **Search index** ([`SearchIndex`]): single-page query execution
//! - **Identity service** ([`CredentialsProvider`]): bearer and service tokens
//!
//! Each collaborator sits behind an async trait so the engine can be driven
//! by in-memory fakes in tests; the `Http*` types are the production
//! implementations over `reqwest`.
//!
//! ## Credential discipline
//!
//! Credentials are fetched from the provider on every store and search
//! call and never cached here or in the engine, so a token expiring midway
//! through a long batch cannot strand the remaining cases.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod auth;
pub mod error;
pub mod search;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use auth::{
    Credentials, CredentialsProvider, HttpIdentityClient, SERVICE_AUTH_HEADER, StaticCredentials,
};
pub use error::{ClientError, Result};
pub use search::{HttpSearchIndex, SearchIndex};
pub use store::{CaseStore, HttpCaseStore};

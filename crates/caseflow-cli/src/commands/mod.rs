//! CLI command implementations.
//!
//! Each command module exposes an `execute(args, &config)` function; the
//! shared wiring here turns configuration into collaborator clients and
//! the job catalog.

pub mod decode_roster;
pub mod jobs;
pub mod run;

use std::sync::Arc;

use anyhow::{Context, Result};

use caseflow_client::{CredentialsProvider, HttpIdentityClient, HttpSearchIndex, SearchIndex};
use caseflow_engine::jobs::{HearingChannelUnit, VenueBackfillUnit, hearing_channel, venue_backfill};
use caseflow_engine::{JobCatalog, RegisteredJob, Roster, SearchRepository};

use crate::config::Config;

pub(crate) fn require<'a>(value: Option<&'a String>, what: &str, var: &str) -> Result<&'a str> {
    value
        .map(String::as_str)
        .with_context(|| format!("{what} is required. Set {var}"))
}

/// Builds the identity client the store and search clients fetch
/// credentials from on every call.
pub(crate) fn identity_client(config: &Config) -> Result<Arc<dyn CredentialsProvider>> {
    let url = require(
        config.identity_url.as_ref(),
        "Identity service URL",
        "CASEFLOW_IDENTITY_URL",
    )?;
    let username = require(config.username.as_ref(), "Username", "CASEFLOW_USERNAME")?;
    let password = require(config.password.as_ref(), "Password", "CASEFLOW_PASSWORD")?;
    let service_name = require(
        config.service_name.as_ref(),
        "Service name",
        "CASEFLOW_SERVICE_NAME",
    )?;
    let service_secret = require(
        config.service_secret.as_ref(),
        "Service secret",
        "CASEFLOW_SERVICE_SECRET",
    )?;
    Ok(Arc::new(HttpIdentityClient::new(
        url,
        username,
        password,
        service_name,
        service_secret,
    )))
}

/// Builds the catalog of registered jobs wired to real collaborators.
///
/// The roster-driven job is registered even without a roster file; running
/// it then fails at candidate fetch with a message naming the variable.
pub(crate) fn build_catalog(
    config: &Config,
    credentials: &Arc<dyn CredentialsProvider>,
) -> Result<JobCatalog> {
    let case_type = config.case_type()?;
    let search_url = require(
        config.search_url.as_ref(),
        "Search URL",
        "CASEFLOW_SEARCH_URL",
    )?;
    let index = HttpSearchIndex::new(search_url, Arc::clone(credentials));
    let repository = Arc::new(SearchRepository::new(
        Arc::new(index) as Arc<dyn SearchIndex>,
        config.page_size,
    ));

    let hearing = HearingChannelUnit::new(repository, case_type.clone());
    let venue = match &config.roster_file {
        Some(path) => {
            let encoded = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read roster file {}", path.display()))?;
            let roster = Roster::decode(&encoded, Some(venue_backfill::HEARING_COLUMN))?;
            VenueBackfillUnit::new(&roster, case_type)
        }
        None => VenueBackfillUnit::unconfigured(case_type),
    };

    Ok(JobCatalog::new(vec![
        RegisteredJob::new(hearing_channel::NAME, Arc::new(hearing)),
        RegisteredJob::new(venue_backfill::NAME, Arc::new(venue)),
    ]))
}

//! Batch configuration from `CASEFLOW_*` environment variables.
//!
//! Whitespace-only values are treated as unset. Parse failures and
//! violated constraints surface as configuration errors before any case
//! is touched.

use std::path::PathBuf;

use caseflow_core::{CaseTypeId, Error, Result};
use caseflow_engine::{DEFAULT_CONCURRENCY, DEFAULT_MAX_CASES};

/// Search page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Runtime configuration for the caseflow binary.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the case-management store.
    pub store_url: Option<String>,
    /// Base URL of the search collaborator.
    pub search_url: Option<String>,
    /// Base URL of the identity service.
    pub identity_url: Option<String>,
    /// Username for the identity token endpoint.
    pub username: Option<String>,
    /// Password for the identity token endpoint.
    pub password: Option<String>,
    /// Service name for the identity lease endpoint.
    pub service_name: Option<String>,
    /// Service secret for the identity lease endpoint.
    pub service_secret: Option<String>,
    /// Target case types; exactly one is required to run.
    pub case_types: Vec<String>,
    /// Names of the jobs enabled in this deployment.
    pub enabled_jobs: Vec<String>,
    /// Worker pool size.
    pub concurrency: usize,
    /// Safety cap on candidates per run.
    pub max_cases: usize,
    /// Search page size for candidate scans.
    pub page_size: usize,
    /// Path to the encoded roster consumed by roster-driven jobs.
    pub roster_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_url: None,
            search_url: None,
            identity_url: None,
            username: None,
            password: None,
            service_name: None,
            service_secret: None,
            case_types: Vec::new(),
            enabled_jobs: Vec::new(),
            concurrency: DEFAULT_CONCURRENCY,
            max_cases: DEFAULT_MAX_CASES,
            page_size: DEFAULT_PAGE_SIZE,
            roster_file: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("store_url", &self.store_url)
            .field("search_url", &self.search_url)
            .field("identity_url", &self.identity_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("service_name", &self.service_name)
            .field(
                "service_secret",
                &self.service_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("case_types", &self.case_types)
            .field("enabled_jobs", &self.enabled_jobs)
            .field("concurrency", &self.concurrency)
            .field("max_cases", &self.max_cases)
            .field("page_size", &self.page_size)
            .field("roster_file", &self.roster_file)
            .finish()
    }
}

impl Config {
    /// Loads configuration from the environment.
    ///
    /// Supported env vars:
    /// - `CASEFLOW_STORE_URL`
    /// - `CASEFLOW_SEARCH_URL`
    /// - `CASEFLOW_IDENTITY_URL`
    /// - `CASEFLOW_USERNAME`
    /// - `CASEFLOW_PASSWORD`
    /// - `CASEFLOW_SERVICE_NAME`
    /// - `CASEFLOW_SERVICE_SECRET`
    /// - `CASEFLOW_CASE_TYPES` (comma-separated; exactly one to run)
    /// - `CASEFLOW_ENABLED_JOBS` (comma-separated job names)
    /// - `CASEFLOW_CONCURRENCY` (default: 25)
    /// - `CASEFLOW_MAX_CASES` (default: 5000)
    /// - `CASEFLOW_PAGE_SIZE` (default: 100)
    /// - `CASEFLOW_ROSTER_FILE`
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        config.store_url = env_string("CASEFLOW_STORE_URL");
        config.search_url = env_string("CASEFLOW_SEARCH_URL");
        config.identity_url = env_string("CASEFLOW_IDENTITY_URL");
        config.username = env_string("CASEFLOW_USERNAME");
        config.password = env_string("CASEFLOW_PASSWORD");
        config.service_name = env_string("CASEFLOW_SERVICE_NAME");
        config.service_secret = env_string("CASEFLOW_SERVICE_SECRET");

        if let Some(types) = env_string("CASEFLOW_CASE_TYPES") {
            config.case_types = parse_list(&types);
        }
        if let Some(jobs) = env_string("CASEFLOW_ENABLED_JOBS") {
            config.enabled_jobs = parse_list(&jobs);
        }
        if let Some(concurrency) = env_usize("CASEFLOW_CONCURRENCY")? {
            config.concurrency = concurrency;
        }
        if let Some(max_cases) = env_usize("CASEFLOW_MAX_CASES")? {
            config.max_cases = max_cases;
        }
        if let Some(page_size) = env_usize("CASEFLOW_PAGE_SIZE")? {
            config.page_size = page_size;
        }
        config.roster_file = env_string("CASEFLOW_ROSTER_FILE").map(PathBuf::from);

        Ok(config)
    }

    /// Checks the constraints a run depends on.
    ///
    /// # Errors
    ///
    /// Returns an error unless exactly one case type is configured and the
    /// sizing knobs are positive.
    pub fn validate(&self) -> Result<()> {
        match self.case_types.len() {
            1 => {}
            0 => {
                return Err(Error::configuration(
                    "no case type configured; set CASEFLOW_CASE_TYPES",
                ));
            }
            n => {
                return Err(Error::configuration(format!(
                    "exactly one case type is required, CASEFLOW_CASE_TYPES lists {n}"
                )));
            }
        }
        if self.page_size == 0 {
            return Err(Error::configuration("CASEFLOW_PAGE_SIZE must be at least 1"));
        }
        Ok(())
    }

    /// The single configured case type.
    ///
    /// # Errors
    ///
    /// Returns an error if zero or multiple case types are configured, or
    /// the configured value is not a valid case type ID.
    pub fn case_type(&self) -> Result<CaseTypeId> {
        self.validate()?;
        CaseTypeId::new(self.case_types[0].clone())
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn env_usize(name: &str) -> Result<Option<usize>> {
    let Some(v) = env_string(name) else {
        return Ok(None);
    };
    v.parse::<usize>()
        .map(Some)
        .map_err(|e| Error::configuration(format!("{name} must be a positive integer: {e}")))
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

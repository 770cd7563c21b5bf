//! The explicit catalog of migration jobs.
//!
//! Jobs are registered as plain `(name, unit)` pairs built once at startup;
//! the active set is chosen by configuration. There is no discovery
//! mechanism: a job exists because a line of code constructs it.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::unit::MigrationUnit;

/// One registered migration job.
#[derive(Clone)]
pub struct RegisteredJob {
    /// The stable name used in configuration and on the command line.
    pub name: &'static str,
    /// The job's pluggable behavior.
    pub unit: Arc<dyn MigrationUnit>,
}

impl RegisteredJob {
    /// Pairs a name with a unit.
    #[must_use]
    pub fn new(name: &'static str, unit: Arc<dyn MigrationUnit>) -> Self {
        Self { name, unit }
    }
}

impl fmt::Debug for RegisteredJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredJob")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The statically-constructed list of known jobs.
pub struct JobCatalog {
    jobs: Vec<RegisteredJob>,
}

impl JobCatalog {
    /// Creates a catalog from registered jobs.
    #[must_use]
    pub fn new(jobs: Vec<RegisteredJob>) -> Self {
        Self { jobs }
    }

    /// All registered jobs, in registration order.
    #[must_use]
    pub fn jobs(&self) -> &[RegisteredJob] {
        &self.jobs
    }

    /// Looks a job up by its registered name.
    ///
    /// # Errors
    ///
    /// Returns an error naming the registered jobs when the name is
    /// unknown.
    pub fn get(&self, name: &str) -> Result<&RegisteredJob> {
        self.jobs
            .iter()
            .find(|job| job.name == name)
            .ok_or_else(|| Error::UnknownJob {
                name: name.to_string(),
                registered: self.registered_names(),
            })
    }

    /// Resolves the configured active set, in the configured order.
    ///
    /// # Errors
    ///
    /// Returns an error if any enabled name is not registered; a typo in
    /// configuration aborts before anything runs.
    pub fn activate(&self, enabled: &[String]) -> Result<Vec<&RegisteredJob>> {
        enabled.iter().map(|name| self.get(name)).collect()
    }

    fn registered_names(&self) -> String {
        self.jobs
            .iter()
            .map(|job| job.name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

//! Job-level errors and the process exit contract.
//!
//! Exit codes:
//! - 0: run completed with no errors and the failsafe untouched
//! - 1: anything else (config error, fetch failure, mutation errors,
//!   failsafe trip)

use thiserror::Error;

use crate::config::ConfigError;

pub type JobResult<T> = Result<T, JobError>;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("roster fetch failed: {0}")]
    Roster(#[from] muster_roster::RosterError),

    #[error("directory error: {0}")]
    Directory(#[from] muster_directory::DirectoryError),

    /// The run itself completed and reported failure; details were already
    /// logged by the run report.
    #[error("reconciliation run failed")]
    RunFailed,
}

impl JobError {
    pub fn exit_code(&self) -> i32 {
        1
    }

    pub fn print(&self) {
        eprintln!("error: {self}");
    }
}

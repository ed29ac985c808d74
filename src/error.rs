//! Error types.
//!
//! One enum per concern: assignment, ledger storage, publishing, calendar
//! adjustment and input files. The binary wraps these in `anyhow` at the edge.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Failures of the assignment engine.
#[derive(Debug, Error)]
pub enum AssignError {
    /// No conflict-free mapping was found within the retry cap, or the
    /// precheck proved that none exists.
    #[error("no conflict-free mapping after {attempts} attempts{}", reason_suffix(.reason))]
    InfeasibleConflictSet {
        attempts: usize,
        reason: Option<String>,
    },

    #[error("no submitters to assign")]
    NoSubmitters,

    #[error("no reviewers available")]
    NoReviewers,

    /// The ledger holds no reviewers to choose from.
    #[error("load ledger is empty")]
    EmptyLedger,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(r) => format!(": {r}"),
        None => String::new(),
    }
}

/// Ledger storage failures. Always fatal.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("ledger I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ledger at {} is not valid JSON: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("ledger {} is locked by another run (remove the lock file if stale)", .0.display())]
    Locked(PathBuf),

    #[error("ledger backend error: {0}")]
    Backend(String),
}

/// Review publishing failures. Reported, never retried.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("GITHUB_TOKEN is not set")]
    MissingToken,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{0}")]
    Other(String),
}

/// Calendar adjustment failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("no valid class day within {lookahead_days} days of {from}")]
    NoValidDate { from: NaiveDate, lookahead_days: u32 },

    #[error("no class days configured")]
    NoClassDays,

    #[error("unknown weekday name: {0}")]
    UnknownWeekday(String),
}

/// Input and output file failures.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("column '{column}' not found in {}", .path.display())]
    MissingColumn { path: PathBuf, column: String },
}

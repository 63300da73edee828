//! Error types

use thiserror::Error;

/// Main error type for the habit streak engine
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid date format: {0:?} (expected YYYY-MM-DD)")]
    InvalidDateFormat(String),

    #[error("Inconsistent frequency config: {0}")]
    InconsistentFrequencyConfig(String),

    /// The profile changed between read and write; the caller must re-read and retry
    #[error("Profile write conflict (expected version {expected_version})")]
    ProfileWriteConflict { expected_version: i64 },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether retrying the same operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::ProfileWriteConflict { .. })
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for metadata sync operations.

use std::fmt;
use thiserror::Error;

/// Errors that can occur while synchronizing metadata or retrieving bundles.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Network failure or a response body that is not a JSON object.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with an error code and message.
    #[error("Response error code {code} ({message})")]
    Api { code: i64, message: String },

    /// Keys requested by name were missing after the create phase.
    #[error("Reconciliation failed, keys missing after creation: {}", .missing.join(", "))]
    Reconciliation { missing: Vec<String> },

    /// The export start call returned no process identifier.
    #[error("Export could not be started: {0}")]
    Start(String),

    /// A tracked job did not finish.
    #[error("Job did not complete: {0}")]
    Job(JobFailure),

    /// Invalid input configuration, raised before any remote call.
    #[error(transparent)]
    Config(#[from] locsync_core::ConfigError),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bundle download or extraction failed.
    #[error("Archive error: {0}")]
    Archive(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// How a tracked job ended when it did not finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobFailure {
    /// The remote job failed.
    Failed { process_id: String, message: String },
    /// The remote job was cancelled.
    Cancelled { process_id: String, message: String },
    /// The client gave up waiting; the remote job itself did not fail.
    TimedOut { process_id: String, attempts: u32 },
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobFailure::Failed {
                process_id,
                message,
            } => write!(f, "process {} failed: {}", process_id, message),
            JobFailure::Cancelled {
                process_id,
                message,
            } => write!(f, "process {} was cancelled: {}", process_id, message),
            JobFailure::TimedOut {
                process_id,
                attempts,
            } => write!(
                f,
                "gave up waiting for process {} after {} attempt(s)",
                process_id, attempts
            ),
        }
    }
}

impl From<serde_json::Error> for MetadataError {
    fn from(err: serde_json::Error) -> Self {
        MetadataError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for MetadataError {
    fn from(err: reqwest::Error) -> Self {
        MetadataError::Transport(err.to_string())
    }
}

impl From<zip::result::ZipError> for MetadataError {
    fn from(err: zip::result::ZipError) -> Self {
        MetadataError::Archive(err.to_string())
    }
}

impl MetadataError {
    /// Shorthand for an invalid input error.
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        MetadataError::Config(locsync_core::ConfigError::invalid(field, message))
    }
}

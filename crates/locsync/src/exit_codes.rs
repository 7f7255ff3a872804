//! Exit codes for the CLI

use locsync_core::ConfigError;
use locsync_metadata::MetadataError;

/// Success
pub const SUCCESS: u8 = 0;

/// General error
pub const ERROR: u8 = 1;

/// Configuration or invalid input
pub const CONFIG_ERROR: u8 = 2;

/// Transport failure or an error reported by the API
pub const REMOTE_ERROR: u8 = 3;

/// Export job failed, was cancelled or timed out
pub const JOB_ERROR: u8 = 4;

/// Keys missing after creation
pub const RECONCILIATION_ERROR: u8 = 5;

/// Picks the exit code for the first recognised error in the chain.
pub fn from_error(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if cause.downcast_ref::<ConfigError>().is_some() {
            return CONFIG_ERROR;
        }
        if let Some(err) = cause.downcast_ref::<MetadataError>() {
            return match err {
                MetadataError::Config(_) => CONFIG_ERROR,
                MetadataError::Transport(_) | MetadataError::Api { .. } | MetadataError::Start(_) => {
                    REMOTE_ERROR
                }
                MetadataError::Job(_) => JOB_ERROR,
                MetadataError::Reconciliation { .. } => RECONCILIATION_ERROR,
                MetadataError::Io(_) | MetadataError::Archive(_) | MetadataError::Serialization(_) => {
                    ERROR
                }
            };
        }
    }
    ERROR
}

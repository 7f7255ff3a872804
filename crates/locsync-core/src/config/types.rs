//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::defaults::{
    DEFAULT_API_BASE_URL, DEFAULT_EXPORT_DELAY_SECS, DEFAULT_EXPORT_MAX_ATTEMPTS,
    DEFAULT_METADATA_PATH, DEFAULT_REQUEST_TIMEOUT_SECS,
};

/// Main configuration for locsync
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Version of the config schema
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Lokalise project identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Remote API configuration
    pub api: ApiConfig,

    /// Local metadata configuration
    pub metadata: MetadataConfig,

    /// Export bundle configuration
    pub export: ExportConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the Lokalise API
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Local metadata configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Base directory of the fastlane-style metadata tree
    pub path: PathBuf,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_METADATA_PATH),
        }
    }
}

/// Export bundle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Maximum number of status reads before giving up
    pub max_attempts: u32,

    /// Seconds to wait between status reads
    pub delay_secs: u64,

    /// Default extraction directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,

    /// Empty the destination before extracting
    pub clean_destination: bool,

    /// Languages to export (empty means all)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,

    /// Only export keys carrying one of these tags
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_EXPORT_MAX_ATTEMPTS,
            delay_secs: DEFAULT_EXPORT_DELAY_SECS,
            destination: None,
            clean_destination: false,
            languages: Vec::new(),
            tags: Vec::new(),
        }
    }
}

impl ExportConfig {
    /// Delay between status reads as a duration
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

/// Credentials for one run against the remote service
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    /// API token sent with every request
    pub api_token: String,
    /// Project the run operates on
    pub project_id: String,
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_token", &"<redacted>")
            .field("project_id", &self.project_id)
            .finish()
    }
}

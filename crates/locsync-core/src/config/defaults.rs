//! Default configuration values

use super::types::Config;

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "locsync.yaml";

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "locsync.toml";

/// Alternative configuration file name
pub const ALT_CONFIG_FILE: &str = ".locsync.yaml";

/// Lokalise API v2 base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.lokalise.com/api2";

/// Per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Fastlane metadata directory
pub const DEFAULT_METADATA_PATH: &str = "fastlane/metadata";

/// Status reads before an export is considered timed out
pub const DEFAULT_EXPORT_MAX_ATTEMPTS: u32 = 30;

/// Seconds between export status reads
pub const DEFAULT_EXPORT_DELAY_SECS: u64 = 2;

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ALT_CONFIG_FILE,
        ".locsync.toml",
    ]
}

/// Generate default configuration YAML
pub fn default_config_yaml() -> String {
    let config = Config::default();
    serde_yaml::to_string(&config).unwrap_or_else(|_| DEFAULT_CONFIG_TEMPLATE.to_string())
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# locsync configuration
# The API token is read from LOKALISE_API_TOKEN and never stored here.

project_id: null

api:
  base_url: https://api.lokalise.com/api2
  timeout_secs: 60

metadata:
  path: fastlane/metadata

export:
  max_attempts: 30
  delay_secs: 2
  clean_destination: false
"#;

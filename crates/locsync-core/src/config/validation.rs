//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::{ApiCredentials, Config};

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_project(config)?;
    validate_api(config)?;
    validate_export(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_project(config: &Config) -> Result<()> {
    if let Some(project_id) = &config.project_id {
        if project_id.trim().is_empty() {
            return Err(ConfigError::invalid("project_id", "cannot be empty"));
        }
    }

    if config.metadata.path.as_os_str().is_empty() {
        return Err(ConfigError::invalid("metadata.path", "cannot be empty"));
    }

    Ok(())
}

fn validate_api(config: &Config) -> Result<()> {
    let base_url = &config.api.base_url;
    if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
        return Err(ConfigError::invalid(
            "api.base_url",
            "must be an http(s) URL",
        ));
    }

    if config.api.timeout_secs == 0 {
        return Err(ConfigError::invalid(
            "api.timeout_secs",
            "must be greater than zero",
        ));
    }

    Ok(())
}

fn validate_export(config: &Config) -> Result<()> {
    if config.export.max_attempts == 0 {
        return Err(ConfigError::invalid(
            "export.max_attempts",
            "must be at least 1",
        ));
    }

    validate_list("export.languages", &config.export.languages)?;
    validate_list("export.tags", &config.export.tags)?;

    Ok(())
}

/// Reject lists containing blank entries
pub fn validate_list(field: &str, values: &[String]) -> Result<()> {
    if let Some(index) = values.iter().position(|v| v.trim().is_empty()) {
        return Err(ConfigError::invalid(
            field,
            format!("entry at index {} can't be empty", index),
        ));
    }
    Ok(())
}

/// Resolve credentials from explicit values (flags or environment) and the
/// config file. Explicit values win over the file.
pub fn resolve_credentials(
    api_token: Option<&str>,
    project_id: Option<&str>,
    config: &Config,
) -> Result<ApiCredentials> {
    let api_token = api_token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            ConfigError::MissingField(
                "api token (pass --api-token or set LOKALISE_API_TOKEN)".to_string(),
            )
        })?;

    let project_id = project_id
        .or(config.project_id.as_deref())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| {
            ConfigError::MissingField(
                "project id (pass --project-id, set LOKALISE_PROJECT_ID or project_id in config)"
                    .to_string(),
            )
        })?;

    Ok(ApiCredentials {
        api_token: api_token.to_string(),
        project_id: project_id.to_string(),
    })
}

//! Core library for locsync
//!
//! Holds the project configuration shared by the metadata engine and the CLI:
//! config file discovery, parsing, validation and credential resolution.

pub mod config;
pub mod error;

pub use config::{
    find_config, load_config, load_config_from_dir, load_config_or_default, ApiConfig,
    ApiCredentials, Config, ExportConfig, MetadataConfig,
};
pub use error::{ConfigError, Result};

//! CLI definition and command handling

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;

use locsync_core::config::{load_config, load_config_or_default, resolve_credentials};
use locsync_core::Config;
use locsync_metadata::{FastlaneStore, HttpArchiveFetcher, LokaliseClient, PollConfig, SyncContext};

use commands::{
    CompletionsCommand, ExportCommand, InitCommand, KeysCommand, MetadataCommand, StringsCommand,
};

/// locsync - Sync App Store and Google Play metadata with Lokalise
#[derive(Debug, Parser)]
#[command(name = "locsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Configuration file (default: discovered from the working directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Lokalise API token
    #[arg(long, global = true, env = "LOKALISE_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Lokalise project identifier
    #[arg(long, global = true, env = "LOKALISE_PROJECT_ID")]
    pub project_id: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Initialize a new locsync configuration
    Init(InitCommand),

    /// Push or pull store listing metadata
    Metadata(MetadataCommand),

    /// Manage keys in the Lokalise project
    Keys(KeysCommand),

    /// Export a translation bundle and extract it
    Export(ExportCommand),

    /// Upload string resources
    Strings(StringsCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Commands::Init(ref cmd) => cmd.execute(&self),
            Commands::Metadata(ref cmd) => cmd.execute(&self),
            Commands::Keys(ref cmd) => cmd.execute(&self),
            Commands::Export(ref cmd) => cmd.execute(&self),
            Commands::Strings(ref cmd) => cmd.execute(&self),
            Commands::Completions(ref cmd) => cmd.execute(&self),
        }
    }

    /// Loads the explicit config file, or the discovered one, or defaults.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let (config, path) = match &self.config {
            Some(path) => (load_config(path)?, Some(path.clone())),
            None => load_config_or_default(&std::env::current_dir()?)?,
        };
        match &path {
            Some(path) => debug!(path = %path.display(), "loaded configuration"),
            None => debug!("no configuration file found, using defaults"),
        }
        Ok(config)
    }

    /// Builds the sync context from flags, environment and config.
    ///
    /// `metadata_path` overrides the configured metadata directory.
    pub fn sync_context(
        &self,
        config: &Config,
        metadata_path: Option<&PathBuf>,
        poll: PollConfig,
    ) -> anyhow::Result<SyncContext> {
        let credentials =
            resolve_credentials(self.api_token.as_deref(), self.project_id.as_deref(), config)?;
        debug!(project_id = %credentials.project_id, "resolved credentials");

        let client = LokaliseClient::new(credentials, &config.api)
            .context("Failed to set up the Lokalise client")?;
        let fetcher = HttpArchiveFetcher::new(config.api.timeout())?;
        let store = FastlaneStore::new(
            metadata_path
                .cloned()
                .unwrap_or_else(|| config.metadata.path.clone()),
        );

        Ok(SyncContext::new(
            Box::new(client),
            Box::new(store),
            Box::new(fetcher),
            poll,
        ))
    }

    /// Runtime for the async sync actions.
    pub fn runtime(&self) -> anyhow::Result<tokio::runtime::Runtime> {
        Ok(tokio::runtime::Runtime::new()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "locsync",
            "keys",
            "add",
            "a.b",
            "--project-id",
            "123.abc",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.project_id.as_deref(), Some("123.abc"));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_missing_token_is_config_error() {
        let cli = Cli::try_parse_from(["locsync", "--project-id", "p", "keys", "add", "a"]).unwrap();
        let cli = Cli {
            api_token: None,
            ..cli
        };
        let err = cli
            .sync_context(&Config::default(), None, PollConfig::from(&Config::default().export))
            .err()
            .unwrap();
        assert_eq!(crate::exit_codes::from_error(&err), crate::exit_codes::CONFIG_ERROR);
    }
}

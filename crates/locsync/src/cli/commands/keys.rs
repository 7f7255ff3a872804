//! Key management commands

use clap::{Args, Subcommand, ValueEnum};
use tracing::info;

use locsync_metadata::{Platform, PollConfig, SyncAction};

use crate::cli::{output, Cli};

/// Key management commands
#[derive(Debug, Args)]
pub struct KeysCommand {
    #[command(subcommand)]
    pub command: KeysSubcommand,
}

/// Key subcommands
#[derive(Debug, Subcommand)]
pub enum KeysSubcommand {
    /// Create keys without translations
    Add(AddKeysCommand),
}

/// Key platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyPlatform {
    Ios,
    Android,
    Web,
    Other,
}

impl From<KeyPlatform> for Platform {
    fn from(platform: KeyPlatform) -> Self {
        match platform {
            KeyPlatform::Ios => Platform::Ios,
            KeyPlatform::Android => Platform::Android,
            KeyPlatform::Web => Platform::Web,
            KeyPlatform::Other => Platform::Other,
        }
    }
}

/// Create keys without translations
#[derive(Debug, Args)]
pub struct AddKeysCommand {
    /// Key names (comma-separated or repeated)
    #[arg(required = true, value_delimiter = ',')]
    pub keys: Vec<String>,

    /// Platform the keys belong to
    #[arg(long, value_enum, default_value = "ios")]
    pub platform: KeyPlatform,
}

impl KeysCommand {
    /// Execute the keys command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let rt = cli.runtime()?;

        match &self.command {
            KeysSubcommand::Add(cmd) => rt.block_on(cmd.execute(cli)),
        }
    }
}

impl AddKeysCommand {
    async fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(count = self.keys.len(), platform = ?self.platform, "executing keys add");

        let config = cli.load_config()?;
        let context = cli.sync_context(&config, None, PollConfig::from(&config.export))?;

        let report = context
            .run(SyncAction::AddKeys {
                keys: self.keys.clone(),
                platform: self.platform.into(),
            })
            .await?;

        output::report(cli, &report)
    }
}

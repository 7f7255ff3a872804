//! String resource commands

use std::path::PathBuf;

use clap::{Args, Subcommand};
use tracing::info;

use locsync_metadata::{PollConfig, SyncAction};

use crate::cli::{output, Cli};

/// String resource commands
#[derive(Debug, Args)]
pub struct StringsCommand {
    #[command(subcommand)]
    pub command: StringsSubcommand,
}

/// String resource subcommands
#[derive(Debug, Subcommand)]
pub enum StringsSubcommand {
    /// Upload Android strings.xml files
    Upload(UploadCommand),
}

/// Upload Android strings.xml files
#[derive(Debug, Args)]
pub struct UploadCommand {
    /// Languages to upload (comma-separated); `en` reads values/strings.xml
    #[arg(long, required = true, value_delimiter = ',')]
    pub languages: Vec<String>,

    /// Android resources directory
    #[arg(long, default_value = "app/src/main/res")]
    pub resources_dir: PathBuf,
}

impl StringsCommand {
    /// Execute the strings command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let rt = cli.runtime()?;

        match &self.command {
            StringsSubcommand::Upload(cmd) => rt.block_on(cmd.execute(cli)),
        }
    }
}

impl UploadCommand {
    async fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(languages = ?self.languages, "executing strings upload");

        let config = cli.load_config()?;
        let context = cli.sync_context(&config, None, PollConfig::from(&config.export))?;

        let spinner = output::spinner(cli, "Uploading string resources...");
        let result = context
            .run(SyncAction::UploadStrings {
                languages: self.languages.clone(),
                resources_dir: self.resources_dir.clone(),
            })
            .await;
        spinner.finish_and_clear();

        output::report(cli, &result?)
    }
}

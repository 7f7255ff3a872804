//! Metadata CLI commands

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use tracing::info;

use locsync_metadata::{MetadataDomain, PollConfig, SyncAction, SyncReport};

use crate::cli::{output, Cli, OutputFormat};

/// Metadata management commands
#[derive(Debug, Args)]
pub struct MetadataCommand {
    #[command(subcommand)]
    pub command: MetadataSubcommand,
}

/// Metadata subcommands
#[derive(Debug, Subcommand)]
pub enum MetadataSubcommand {
    /// Push local metadata to Lokalise
    Push(PushCommand),

    /// Pull metadata from Lokalise into the local tree
    Pull(PullCommand),
}

/// Store whose metadata is synced
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreDomain {
    /// Apple App Store (ios/ directory)
    #[value(alias = "ios")]
    AppStore,
    /// Google Play (android/ directory)
    #[value(alias = "android")]
    GooglePlay,
}

impl From<StoreDomain> for MetadataDomain {
    fn from(domain: StoreDomain) -> Self {
        match domain {
            StoreDomain::AppStore => MetadataDomain::AppStore,
            StoreDomain::GooglePlay => MetadataDomain::GooglePlay,
        }
    }
}

/// Push local metadata to Lokalise
#[derive(Debug, Args)]
pub struct PushCommand {
    /// Store to push
    #[arg(long, value_enum)]
    pub domain: StoreDomain,

    /// Add the local languages to the project first
    #[arg(long)]
    pub add_languages: bool,

    /// Replace existing translations instead of only filling gaps
    #[arg(long)]
    pub overwrite: bool,

    /// Show what would change without pushing
    #[arg(long)]
    pub dry_run: bool,

    /// Metadata directory (default: from config)
    #[arg(long)]
    pub path: Option<PathBuf>,
}

/// Pull metadata from Lokalise
#[derive(Debug, Args)]
pub struct PullCommand {
    /// Store to pull
    #[arg(long, value_enum)]
    pub domain: StoreDomain,

    /// Release number naming the changelog file (required for Google Play)
    #[arg(long)]
    pub release_number: Option<String>,

    /// Metadata directory (default: from config)
    #[arg(long)]
    pub path: Option<PathBuf>,
}

impl MetadataCommand {
    /// Execute the metadata command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let rt = cli.runtime()?;

        match &self.command {
            MetadataSubcommand::Push(cmd) => rt.block_on(cmd.execute(cli)),
            MetadataSubcommand::Pull(cmd) => rt.block_on(cmd.execute(cli)),
        }
    }
}

impl PushCommand {
    async fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let domain = MetadataDomain::from(self.domain);
        info!(
            domain = %domain,
            overwrite = self.overwrite,
            dry_run = self.dry_run,
            "executing metadata push"
        );

        let config = cli.load_config()?;
        let context = cli.sync_context(&config, self.path.as_ref(), PollConfig::from(&config.export))?;

        if cli.format == OutputFormat::Text && !cli.quiet {
            println!("{}", output::header(&format!("Pushing {} metadata", domain)));
            if self.overwrite {
                output::warning("Existing translations will be overwritten");
            }
        }

        let spinner = output::spinner(cli, "Talking to Lokalise...");
        let result = context
            .run(SyncAction::PushMetadata {
                domain,
                add_languages: self.add_languages,
                overwrite: self.overwrite,
                dry_run: self.dry_run,
            })
            .await;
        spinner.finish_and_clear();

        output::report(cli, &result?)
    }
}

impl PullCommand {
    async fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let domain = MetadataDomain::from(self.domain);
        info!(domain = %domain, "executing metadata pull");

        let config = cli.load_config()?;
        let context = cli.sync_context(&config, self.path.as_ref(), PollConfig::from(&config.export))?;

        let spinner = output::spinner(cli, "Downloading translations...");
        let result = context
            .run(SyncAction::PullMetadata {
                domain,
                release_number: self.release_number.clone(),
            })
            .await;
        spinner.finish_and_clear();

        let report = result?;
        if let (SyncReport::Pulled { files, .. }, OutputFormat::Text) = (&report, cli.format) {
            if cli.verbose && !cli.quiet {
                for file in files {
                    println!("  {}", output::path_style().apply_to(file.display()));
                }
            }
        }
        output::report(cli, &report)
    }
}

//! Bundle export command

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};
use tracing::info;

use locsync_core::ConfigError;
use locsync_metadata::{ExportRequest, PollConfig, SyncAction};

use crate::cli::{output, Cli, OutputFormat};

/// Export a translation bundle and extract it
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Bundle layout
    #[arg(long, value_enum, default_value = "ios-strings")]
    pub preset: ExportPreset,

    /// Directory to extract into (default: export.destination from config)
    #[arg(short, long)]
    pub destination: Option<PathBuf>,

    /// Empty the destination before extracting
    #[arg(long)]
    pub clean: bool,

    /// Languages to export (comma-separated, default: all)
    #[arg(long, value_delimiter = ',')]
    pub languages: Vec<String>,

    /// Only export keys with these tags (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Status reads before giving up
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Seconds between status reads
    #[arg(long)]
    pub delay: Option<u64>,
}

/// Bundle layout presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportPreset {
    /// Localizable.strings in <lang>.lproj directories
    IosStrings,
    /// strings.xml in values-<lang> directories
    AndroidXml,
}

impl ExportCommand {
    /// Execute the export command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let rt = cli.runtime()?;
        rt.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(preset = ?self.preset, "executing export command");
        let config = cli.load_config()?;

        let destination = self
            .destination
            .clone()
            .or_else(|| config.export.destination.clone())
            .ok_or_else(|| {
                ConfigError::MissingField(
                    "destination (pass --destination or set export.destination)".to_string(),
                )
            })?;
        let clean = self.clean || config.export.clean_destination;

        let request = self.request(&config.export.languages, &config.export.tags);
        let poll = self.poll_config(PollConfig::from(&config.export));
        let context = cli.sync_context(&config, None, poll)?;

        if cli.format == OutputFormat::Text && !cli.quiet {
            println!("{}", output::header("Exporting bundle"));
            println!("{}", output::key_value("Format", &request.format));
            println!(
                "{}",
                output::key_value(
                    "Destination",
                    &output::path_style().apply_to(destination.display()).to_string()
                )
            );
            if clean {
                output::info("Destination will be emptied first");
            }
        }

        let spinner = output::spinner(cli, "Waiting for the export to finish...");
        let result = context
            .run(SyncAction::DownloadBundle {
                request,
                destination,
                clean,
            })
            .await;
        spinner.finish_and_clear();

        output::report(cli, &result?)
    }

    /// Export options; flags win over config defaults.
    fn request(&self, languages: &[String], tags: &[String]) -> ExportRequest {
        let request = match self.preset {
            ExportPreset::IosStrings => ExportRequest::ios_strings(),
            ExportPreset::AndroidXml => ExportRequest::android_xml(),
        };
        let pick = |flag: &Vec<String>, config: &[String]| {
            if flag.is_empty() {
                config.to_vec()
            } else {
                flag.clone()
            }
        };
        request
            .with_languages(pick(&self.languages, languages))
            .with_tags(pick(&self.tags, tags))
    }

    fn poll_config(&self, defaults: PollConfig) -> PollConfig {
        PollConfig::new(
            self.max_attempts.unwrap_or(defaults.max_attempts),
            self.delay.map(Duration::from_secs).unwrap_or(defaults.delay),
        )
    }
}

//! Init command

use std::path::PathBuf;

use clap::Args;
use console::style;
use dialoguer::{Confirm, Select};
use tracing::info;

use locsync_core::config::defaults::{DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_YAML};
use locsync_core::Config;

use crate::cli::{output, Cli};

/// Initialize a new locsync configuration
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Use defaults without prompting
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, yes = self.yes, "executing init command");
        let cwd = std::env::current_dir()?;
        let config_path = self
            .output
            .clone()
            .unwrap_or_else(|| cwd.join(DEFAULT_CONFIG_YAML));

        if config_path.exists() && !self.force {
            if self.yes {
                anyhow::bail!(
                    "Configuration file already exists at {}. Use --force to overwrite.",
                    config_path.display()
                );
            }

            let overwrite = Confirm::new()
                .with_prompt(format!(
                    "Configuration file already exists at {}. Overwrite?",
                    config_path.display()
                ))
                .default(false)
                .interact()?;

            if !overwrite {
                println!("{}", style("Aborted.").yellow());
                return Ok(());
            }
        }

        let format = if self.yes {
            "yaml"
        } else {
            let formats = vec!["yaml", "toml"];
            let selection = Select::new()
                .with_prompt("Configuration format")
                .items(&formats)
                .default(0)
                .interact()?;
            formats[selection]
        };

        let config_path =
            if format == "toml" && config_path.extension().is_some_and(|e| e == "yaml") {
                config_path.with_extension("toml")
            } else {
                config_path
            };

        let content = render(format, cli.project_id.as_deref())?;
        std::fs::write(&config_path, &content)?;

        if !cli.quiet {
            output::success(&format!(
                "Created configuration at {}",
                output::path_style().apply_to(config_path.display())
            ));
            println!();
            println!("Next steps:");
            println!(
                "  1. Export {} with a token that can write to the project",
                style("LOKALISE_API_TOKEN").cyan()
            );
            println!(
                "  2. Run {} to preview a push",
                style("locsync metadata push --domain app-store --dry-run").cyan()
            );
        }

        Ok(())
    }
}

/// Config file content; the YAML template keeps its comments unless a project id is filled in.
fn render(format: &str, project_id: Option<&str>) -> anyhow::Result<String> {
    if format == "yaml" && project_id.is_none() {
        return Ok(DEFAULT_CONFIG_TEMPLATE.to_string());
    }

    let mut config: Config = serde_yaml::from_str(DEFAULT_CONFIG_TEMPLATE)?;
    config.project_id = project_id.map(str::to_string);

    Ok(if format == "toml" {
        toml::to_string_pretty(&config)?
    } else {
        serde_yaml::to_string(&config)?
    })
}

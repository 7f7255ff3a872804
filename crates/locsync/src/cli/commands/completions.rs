//! Shell completions

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, CommandFactory};
use clap_complete::Shell;
use tracing::info;

use crate::cli::{output, Cli};

/// Generate shell completions
#[derive(Debug, Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CompletionsCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(shell = %self.shell, "generating completions");
        let Some(path) = &self.output else {
            self.write_to(&mut std::io::stdout());
            return Ok(());
        };

        self.write_to(&mut std::fs::File::create(path)?);
        if !cli.quiet {
            output::success(&format!(
                "{} completions written to {}",
                self.shell,
                output::path_style().apply_to(path.display())
            ));
        }
        Ok(())
    }

    fn write_to(&self, buf: &mut dyn Write) {
        clap_complete::generate(self.shell, &mut Cli::command(), "locsync", buf);
    }
}

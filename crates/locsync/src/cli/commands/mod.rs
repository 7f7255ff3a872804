//! CLI commands

mod completions;
mod export;
mod init;
mod keys;
mod metadata;
mod strings;

pub use completions::CompletionsCommand;
pub use export::ExportCommand;
pub use init::InitCommand;
pub use keys::KeysCommand;
pub use metadata::MetadataCommand;
pub use strings::StringsCommand;

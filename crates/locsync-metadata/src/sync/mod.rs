//! Sync actions between local metadata, the Lokalise project and bundles.
//!
//! A [`SyncContext`] carries everything an action needs: the remote client,
//! the local store, the bundle fetcher and the poll settings. There is no
//! ambient token or project state; each [`SyncAction`] runs against the
//! context it is given and returns a [`SyncReport`].
//!
//! ## Example
//!
//! ```no_run
//! use locsync_core::{ApiConfig, ApiCredentials};
//! use locsync_metadata::sync::{SyncAction, SyncContext};
//! use locsync_metadata::{FastlaneStore, HttpArchiveFetcher, LokaliseClient, MetadataDomain, PollConfig};
//! use std::time::Duration;
//!
//! # async fn example() -> locsync_metadata::Result<()> {
//! let credentials = ApiCredentials {
//!     api_token: "token".to_string(),
//!     project_id: "123.abc".to_string(),
//! };
//! let api = ApiConfig::default();
//! let context = SyncContext::new(
//!     Box::new(LokaliseClient::new(credentials, &api)?),
//!     Box::new(FastlaneStore::new("fastlane/metadata")),
//!     Box::new(HttpArchiveFetcher::new(api.timeout())?),
//!     PollConfig::new(30, Duration::from_secs(2)),
//! );
//!
//! let report = context
//!     .run(SyncAction::PushMetadata {
//!         domain: MetadataDomain::AppStore,
//!         add_languages: false,
//!         overwrite: false,
//!         dry_run: true,
//!     })
//!     .await?;
//! println!("{}", report);
//! # Ok(())
//! # }
//! ```

mod bundle;
mod keys;
mod metadata;

use crate::archive::ArchiveFetcher;
use crate::client::{ExportRequest, RemoteMetadataClient};
use crate::diff::MetadataDiff;
use crate::export::PollConfig;
use crate::reconcile::PushResult;
use crate::storage::MetadataStore;
use crate::{MetadataDomain, Platform, Result};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::info;

/// Dependencies shared by all sync actions.
pub struct SyncContext {
    client: Box<dyn RemoteMetadataClient>,
    store: Box<dyn MetadataStore>,
    fetcher: Box<dyn ArchiveFetcher>,
    poll: PollConfig,
}

impl SyncContext {
    pub fn new(
        client: Box<dyn RemoteMetadataClient>,
        store: Box<dyn MetadataStore>,
        fetcher: Box<dyn ArchiveFetcher>,
        poll: PollConfig,
    ) -> Self {
        Self {
            client,
            store,
            fetcher,
            poll,
        }
    }

    pub fn client(&self) -> &dyn RemoteMetadataClient {
        self.client.as_ref()
    }

    pub fn store(&self) -> &dyn MetadataStore {
        self.store.as_ref()
    }

    pub fn poll_config(&self) -> PollConfig {
        self.poll
    }

    /// Runs one action to completion.
    pub async fn run(&self, action: SyncAction) -> Result<SyncReport> {
        info!(action = action.name(), "running sync action");
        match action {
            SyncAction::PushMetadata {
                domain,
                add_languages,
                overwrite,
                dry_run,
            } => {
                metadata::push(self, domain, add_languages, overwrite, dry_run).await
            }
            SyncAction::PullMetadata {
                domain,
                release_number,
            } => metadata::pull(self, domain, release_number.as_deref()).await,
            SyncAction::AddKeys { keys, platform } => keys::add_keys(self, &keys, platform).await,
            SyncAction::DownloadBundle {
                request,
                destination,
                clean,
            } => bundle::download(self, &request, &destination, clean).await,
            SyncAction::UploadStrings {
                languages,
                resources_dir,
            } => bundle::upload_strings(self, &languages, &resources_dir).await,
        }
    }
}

/// What to do.
#[derive(Debug, Clone)]
pub enum SyncAction {
    /// Push local metadata to the project.
    PushMetadata {
        domain: MetadataDomain,
        /// Create the local languages in the project first.
        add_languages: bool,
        /// Replace remote translations instead of only filling gaps.
        overwrite: bool,
        /// Report what would change without writing anything remotely.
        dry_run: bool,
    },
    /// Write the project's translations to the local store.
    PullMetadata {
        domain: MetadataDomain,
        /// Changelog file name; required for Google Play.
        release_number: Option<String>,
    },
    /// Create keys without translations.
    AddKeys { keys: Vec<String>, platform: Platform },
    /// Export a bundle and extract it.
    DownloadBundle {
        request: ExportRequest,
        destination: PathBuf,
        clean: bool,
    },
    /// Upload Android `strings.xml` files.
    UploadStrings {
        languages: Vec<String>,
        resources_dir: PathBuf,
    },
}

impl SyncAction {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            SyncAction::PushMetadata { .. } => "push-metadata",
            SyncAction::PullMetadata { .. } => "pull-metadata",
            SyncAction::AddKeys { .. } => "add-keys",
            SyncAction::DownloadBundle { .. } => "download-bundle",
            SyncAction::UploadStrings { .. } => "upload-strings",
        }
    }
}

/// Outcome of a sync action.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SyncReport {
    Pushed {
        domain: MetadataDomain,
        dry_run: bool,
        /// Service codes sent to the language creation call.
        languages_requested: Vec<String>,
        /// Changes relative to the remote values, when they were fetched.
        #[serde(skip_serializing_if = "Option::is_none")]
        changes: Option<MetadataDiff>,
        result: PushResult,
    },
    Pulled {
        domain: MetadataDomain,
        locales: Vec<String>,
        files: Vec<PathBuf>,
    },
    KeysAdded {
        inserted: usize,
        rejected: usize,
    },
    Downloaded {
        url: String,
        destination: PathBuf,
        files: Vec<PathBuf>,
    },
    Uploaded {
        uploads: Vec<UploadedFile>,
    },
}

/// One uploaded strings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    pub language: String,
    pub path: PathBuf,
    /// Import process queued by the service, if reported.
    pub process_id: Option<String>,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncReport::Pushed {
                domain,
                dry_run,
                languages_requested,
                changes,
                result,
            } => {
                if !languages_requested.is_empty() {
                    writeln!(f, "Requested languages: {}", languages_requested.join(", "))?;
                }
                if let Some(changes) = changes {
                    writeln!(f, "{}", changes)?;
                }
                if *dry_run {
                    write!(f, "Dry run: nothing pushed to {}", domain)
                } else if result.is_empty() {
                    write!(f, "{} metadata is up to date", domain)
                } else {
                    write!(
                        f,
                        "Pushed {} key(s) across {} locale(s) for {}",
                        result.updated_keys.len(),
                        result.updated_locales.len(),
                        domain
                    )
                }
            }
            SyncReport::Pulled {
                domain,
                locales,
                files,
            } => write!(
                f,
                "Pulled {} file(s) for {} locale(s) of {}",
                files.len(),
                locales.len(),
                domain
            ),
            SyncReport::KeysAdded { inserted, rejected } => {
                write!(f, "Keys uploaded. {} inserted", inserted)?;
                if *rejected > 0 {
                    write!(f, ", {} rejected", rejected)?;
                }
                Ok(())
            }
            SyncReport::Downloaded {
                destination, files, ..
            } => write!(
                f,
                "Extracted {} file(s) into {}",
                files.len(),
                destination.display()
            ),
            SyncReport::Uploaded { uploads } => {
                write!(f, "Uploaded {} file(s)", uploads.len())?;
                for upload in uploads {
                    write!(f, "\n  {} ({})", upload.language, upload.path.display())?;
                    if let Some(id) = &upload.process_id {
                        write!(f, " process {}", id)?;
                    }
                }
                Ok(())
            }
        }
    }
}

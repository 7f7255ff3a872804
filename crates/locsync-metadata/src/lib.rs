//! Store metadata synchronization with Lokalise.
//!
//! This crate moves App Store and Google Play listing metadata between a
//! fastlane-style directory tree and a Lokalise project, and retrieves
//! exported translation bundles.

pub mod archive;
pub mod client;
pub mod diff;
pub mod error;
pub mod export;
pub mod locale;
pub mod reconcile;
pub mod storage;
pub mod sync;
pub mod types;

pub use archive::{extract_archive, ArchiveFetcher, HttpArchiveFetcher};
pub use client::{ExportRequest, LokaliseClient, RemoteMetadataClient};
pub use diff::{preview, reconcile, ChangeType, MetadataChange, MetadataDiff};
pub use error::{JobFailure, MetadataError};
pub use export::{AsyncExportPoller, AsyncJob, ExportState, JobStatus, PollConfig};
pub use locale::{normalize, Direction, LocaleCode};
pub use reconcile::{KeyReconciler, PushResult};
pub use storage::{FastlaneStore, MetadataStore};
pub use sync::{SyncAction, SyncContext, SyncReport};
pub use types::{MetadataDomain, MetadataKey, MetadataSnapshot, Platform};

/// Result type alias for metadata operations.
pub type Result<T> = std::result::Result<T, MetadataError>;

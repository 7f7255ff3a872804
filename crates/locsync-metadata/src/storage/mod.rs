//! Local storage for store metadata.
//!
//! This module provides the [`MetadataStore`] trait and the fastlane-layout
//! implementation used by the sync actions.

mod fastlane;

pub use fastlane::{latest_changelog, FastlaneStore};

use crate::{MetadataDomain, MetadataSnapshot, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// Storage backend for store metadata.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Loads every supported locale of a domain that exists locally.
    async fn load(&self, domain: MetadataDomain) -> Result<MetadataSnapshot>;

    /// Writes a snapshot, returning the files written.
    ///
    /// `release_number` names the changelog file; it is required when the
    /// snapshot carries changelog values.
    async fn save(
        &self,
        domain: MetadataDomain,
        snapshot: &MetadataSnapshot,
        release_number: Option<&str>,
    ) -> Result<Vec<PathBuf>>;

    /// Supported locales of a domain that have a local directory.
    async fn list_locales(&self, domain: MetadataDomain) -> Result<Vec<String>>;

    /// Directory holding a domain's locales.
    fn domain_path(&self, domain: MetadataDomain) -> PathBuf;
}

//! Fastlane-compatible storage backend.
//!
//! ## Directory Structure
//!
//! ```text
//! fastlane/metadata/
//! ├── ios/
//! │   └── {locale}/
//! │       ├── name.txt
//! │       ├── subtitle.txt
//! │       ├── description.txt
//! │       ├── keywords.txt
//! │       ├── promotional_text.txt
//! │       └── release_notes.txt
//! └── android/
//!     └── {locale}/
//!         ├── title.txt
//!         ├── short_description.txt
//!         ├── full_description.txt
//!         └── changelogs/
//!             └── {release_number}.txt
//! ```

use super::MetadataStore;
use crate::locale;
use crate::{MetadataDomain, MetadataError, MetadataKey, MetadataSnapshot, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

const TEXT_EXTENSION: &str = "txt";

/// Fastlane-compatible storage backend.
#[derive(Debug, Clone)]
pub struct FastlaneStore {
    /// Base path for all metadata.
    base_path: PathBuf,
}

impl FastlaneStore {
    /// Creates a store rooted at `base_path` (typically `fastlane/metadata`).
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Gets the base path for this store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Read a text file, returning None if it doesn't exist or is empty.
    async fn read_text_file(&self, path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path).await {
            Ok(content) => {
                let content = content.trim_end_matches(['\r', '\n']);
                Ok(Some(content.to_string()).filter(|c| !c.is_empty()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MetadataError::Io(e)),
        }
    }

    /// Write a text file, creating parent directories as needed.
    async fn write_text_file(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, content).await?;
        Ok(())
    }

    /// Reads the newest changelog of a locale.
    async fn load_changelog(&self, locale_path: &Path, key: &MetadataKey) -> Result<Option<String>> {
        let changelogs_path = locale_path.join(key.field);

        let mut entries = match fs::read_dir(&changelogs_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(MetadataError::Io(e)),
        };

        let mut stems = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some(TEXT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if self.read_text_file(&path).await?.is_some() {
                    stems.push(stem.to_string());
                }
            }
        }

        match latest_changelog(&stems) {
            Some(stem) => {
                debug!("Using changelog {} in {}", stem, changelogs_path.display());
                self.read_text_file(&changelogs_path.join(format!("{}.{}", stem, TEXT_EXTENSION)))
                    .await
            }
            None => Ok(None),
        }
    }

    fn field_path(
        &self,
        domain: MetadataDomain,
        locale: &str,
        key: &MetadataKey,
        release_number: Option<&str>,
    ) -> Result<PathBuf> {
        let locale_path = self.domain_path(domain).join(locale);
        if key.is_changelog() {
            let release = release_number.filter(|r| !r.is_empty()).ok_or_else(|| {
                MetadataError::invalid_input(
                    "release_number",
                    "a release number is required to write changelogs",
                )
            })?;
            Ok(locale_path
                .join(key.field)
                .join(format!("{}.{}", release, TEXT_EXTENSION)))
        } else {
            Ok(locale_path.join(format!("{}.{}", key.field, TEXT_EXTENSION)))
        }
    }
}

/// Picks the changelog stem with the highest release number.
///
/// Stems that are not integers rank below every numeric one; equal numbers
/// fall back to comparing the stems as strings.
pub fn latest_changelog<S: AsRef<str>>(stems: &[S]) -> Option<&str> {
    stems
        .iter()
        .map(AsRef::<str>::as_ref)
        .max_by(|a, b| {
            let rank = |s: &str| s.parse::<u64>().ok();
            rank(*a).cmp(&rank(*b)).then_with(|| a.cmp(b))
        })
}

#[async_trait]
impl MetadataStore for FastlaneStore {
    async fn load(&self, domain: MetadataDomain) -> Result<MetadataSnapshot> {
        let mut snapshot = MetadataSnapshot::new();

        for locale in self.list_locales(domain).await? {
            let locale_path = self.domain_path(domain).join(&locale);
            for key in domain.keys() {
                let value = if key.is_changelog() {
                    self.load_changelog(&locale_path, key).await?
                } else {
                    self.read_text_file(&locale_path.join(format!("{}.{}", key.field, TEXT_EXTENSION)))
                        .await?
                };
                if let Some(value) = value {
                    snapshot.insert(locale.as_str(), key.name, value);
                }
            }
        }

        debug!(
            domain = %domain,
            locales = snapshot.len(),
            values = snapshot.value_count(),
            "loaded local metadata"
        );
        Ok(snapshot)
    }

    async fn save(
        &self,
        domain: MetadataDomain,
        snapshot: &MetadataSnapshot,
        release_number: Option<&str>,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        for (locale, values) in snapshot.iter() {
            for (name, value) in values {
                let Some(key) = domain.key(name) else {
                    warn!("Skipping key {} not used by {}", name, domain);
                    continue;
                };
                let path = self.field_path(domain, locale, key, release_number)?;
                self.write_text_file(&path, value).await?;
                written.push(path);
            }
        }

        debug!(domain = %domain, files = written.len(), "saved metadata");
        Ok(written)
    }

    async fn list_locales(&self, domain: MetadataDomain) -> Result<Vec<String>> {
        let base = self.domain_path(domain);
        let mut locales = Vec::new();
        for code in locale::languages(domain) {
            match fs::metadata(base.join(code)).await {
                Ok(meta) if meta.is_dir() => locales.push(code.to_string()),
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(MetadataError::Io(e)),
            }
        }
        Ok(locales)
    }

    fn domain_path(&self, domain: MetadataDomain) -> PathBuf {
        self.base_path.join(domain.directory())
    }
}

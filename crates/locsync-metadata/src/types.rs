//! Metadata domains, keys and snapshots.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Which store's metadata a run operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataDomain {
    /// Apple App Store listing metadata.
    AppStore,
    /// Google Play listing metadata.
    GooglePlay,
}

impl MetadataDomain {
    /// Remote keys and their local field names for this domain.
    pub fn keys(self) -> &'static [MetadataKey] {
        match self {
            MetadataDomain::AppStore => APP_STORE_KEYS,
            MetadataDomain::GooglePlay => GOOGLE_PLAY_KEYS,
        }
    }

    /// Looks up a key by its remote name.
    pub fn key(self, name: &str) -> Option<&'static MetadataKey> {
        self.keys().iter().find(|k| k.name == name)
    }

    /// Remote key names for this domain.
    pub fn key_names(self) -> Vec<&'static str> {
        self.keys().iter().map(|k| k.name).collect()
    }

    /// Directory under the metadata base path.
    pub fn directory(self) -> &'static str {
        match self {
            MetadataDomain::AppStore => "ios",
            MetadataDomain::GooglePlay => "android",
        }
    }

    /// Platform tag attached to this domain's keys.
    pub fn platform(self) -> Platform {
        Platform::Other
    }
}

impl fmt::Display for MetadataDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataDomain::AppStore => write!(f, "App Store"),
            MetadataDomain::GooglePlay => write!(f, "Google Play"),
        }
    }
}

/// Lokalise key platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    Web,
    Other,
}

impl Platform {
    /// Wire name of the platform.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
            Platform::Web => "web",
            Platform::Other => "other",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A translatable metadata field: remote key name plus local field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetadataKey {
    /// Key name in the translation service.
    pub name: &'static str,
    /// Local file name without extension (or directory for changelogs).
    pub field: &'static str,
}

impl MetadataKey {
    const fn new(name: &'static str, field: &'static str) -> Self {
        Self { name, field }
    }

    /// Whether the field is stored as one file per release.
    pub fn is_changelog(&self) -> bool {
        self.field == CHANGELOGS_FIELD
    }
}

/// Field name of the per-release changelog directory.
pub const CHANGELOGS_FIELD: &str = "changelogs";

const APP_STORE_KEYS: &[MetadataKey] = &[
    MetadataKey::new("appstore.app.name", "name"),
    MetadataKey::new("appstore.app.description", "description"),
    MetadataKey::new("appstore.app.keywords", "keywords"),
    MetadataKey::new("appstore.app.promotional_text", "promotional_text"),
    MetadataKey::new("appstore.app.release_notes", "release_notes"),
    MetadataKey::new("appstore.app.subtitle", "subtitle"),
];

const GOOGLE_PLAY_KEYS: &[MetadataKey] = &[
    MetadataKey::new("googleplay.app.title", "title"),
    MetadataKey::new("googleplay.app.full_description", "full_description"),
    MetadataKey::new("googleplay.app.short_description", "short_description"),
    MetadataKey::new("googleplay.app.changelogs", CHANGELOGS_FIELD),
];

/// Locale (store form) → key name → text.
///
/// Empty values are never retained, and neither are languages without keys:
/// absence is how "no translation" is represented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataSnapshot {
    languages: BTreeMap<String, BTreeMap<String, String>>,
}

impl MetadataSnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value. Empty values are ignored.
    pub fn insert(
        &mut self,
        language: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        self.languages
            .entry(language.into())
            .or_default()
            .insert(key.into(), value);
    }

    /// Adds all non-empty values for a language.
    pub fn insert_language<K, V>(
        &mut self,
        language: impl Into<String>,
        values: impl IntoIterator<Item = (K, V)>,
    ) where
        K: Into<String>,
        V: Into<String>,
    {
        let language = language.into();
        for (key, value) in values {
            self.insert(language.clone(), key, value);
        }
    }

    /// Value for a (language, key) pair.
    pub fn get(&self, language: &str, key: &str) -> Option<&str> {
        self.languages
            .get(language)
            .and_then(|keys| keys.get(key))
            .map(String::as_str)
    }

    /// All values for a language.
    pub fn language(&self, language: &str) -> Option<&BTreeMap<String, String>> {
        self.languages.get(language)
    }

    /// Whether the language has at least one value.
    pub fn contains_language(&self, language: &str) -> bool {
        self.languages.contains_key(language)
    }

    /// Languages in sorted order.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    /// Iterates over `(language, values)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, String>)> {
        self.languages.iter().map(|(l, keys)| (l.as_str(), keys))
    }

    /// Distinct key names referenced by any language.
    pub fn key_names(&self) -> BTreeSet<&str> {
        self.languages
            .values()
            .flat_map(|keys| keys.keys().map(String::as_str))
            .collect()
    }

    /// `(language, value)` pairs for one key across all languages.
    pub fn values_for_key<'a>(&'a self, key: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.languages
            .iter()
            .filter_map(move |(l, keys)| keys.get(key).map(|v| (l.as_str(), v.as_str())))
    }

    /// Number of languages.
    pub fn len(&self) -> usize {
        self.languages.len()
    }

    /// Returns true if the snapshot holds no values.
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    /// Total number of (language, key) values.
    pub fn value_count(&self) -> usize {
        self.languages.values().map(BTreeMap::len).sum()
    }
}

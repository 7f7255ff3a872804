//! Deciding which local values need to be pushed.
//!
//! The merge is gap-filling, not three-way: without `overwrite` a local value
//! is only pushed where the service has no translation for it yet, and
//! nothing present only on the service side is ever touched.

use crate::MetadataSnapshot;
use serde::Serialize;
use std::fmt;

/// Filters `local` down to the values that should be pushed.
pub fn reconcile(
    local: &MetadataSnapshot,
    remote: &MetadataSnapshot,
    overwrite: bool,
) -> MetadataSnapshot {
    if overwrite {
        return local.clone();
    }

    let mut filtered = MetadataSnapshot::new();
    for (language, values) in local.iter() {
        for (key, value) in values {
            let remote_has_value = remote
                .get(language, key)
                .is_some_and(|remote_value| !remote_value.is_empty());
            if !remote_has_value {
                filtered.insert(language, key.as_str(), value.as_str());
            }
        }
    }
    filtered
}

/// Describes, per value, what a push would change on the service.
pub fn preview(local: &MetadataSnapshot, remote: &MetadataSnapshot) -> MetadataDiff {
    let mut diff = MetadataDiff::default();
    for (language, values) in local.iter() {
        for (key, value) in values {
            match remote.get(language, key) {
                None => diff
                    .changes
                    .push(MetadataChange::added(language, key.as_str(), value.clone())),
                Some(remote_value) if remote_value != value => {
                    diff.changes.push(MetadataChange::modified(
                        language,
                        key.as_str(),
                        value.clone(),
                        remote_value.to_string(),
                    ))
                }
                Some(_) => {}
            }
        }
    }
    diff
}

/// Diff between local and remote metadata.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetadataDiff {
    /// List of individual changes detected.
    pub changes: Vec<MetadataChange>,
}

impl MetadataDiff {
    /// Returns the number of changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns true if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Filters changes by change type.
    pub fn by_type(&self, change_type: ChangeType) -> Vec<&MetadataChange> {
        self.changes
            .iter()
            .filter(|c| c.change_type == change_type)
            .collect()
    }

    /// Gets all unique locales with changes.
    pub fn affected_locales(&self) -> Vec<String> {
        let mut locales: Vec<String> = self.changes.iter().map(|c| c.locale.clone()).collect();
        locales.sort();
        locales.dedup();
        locales
    }
}

impl fmt::Display for MetadataDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "No differences found");
        }

        writeln!(f, "Found {} change(s):", self.len())?;

        for change in &self.changes {
            writeln!(f, "  {}", change)?;
        }

        Ok(())
    }
}

/// A single metadata change.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataChange {
    /// Store locale of the value.
    pub locale: String,
    /// Remote key name.
    pub key: String,
    /// The local value.
    pub local_value: String,
    /// The remote value, if any.
    pub remote_value: Option<String>,
    /// The type of change.
    pub change_type: ChangeType,
}

impl MetadataChange {
    /// A value the service does not have yet.
    pub fn added(locale: impl Into<String>, key: impl Into<String>, value: String) -> Self {
        Self {
            locale: locale.into(),
            key: key.into(),
            local_value: value,
            remote_value: None,
            change_type: ChangeType::Added,
        }
    }

    /// A value that differs from the service's translation.
    pub fn modified(
        locale: impl Into<String>,
        key: impl Into<String>,
        local: String,
        remote: String,
    ) -> Self {
        Self {
            locale: locale.into(),
            key: key.into(),
            local_value: local,
            remote_value: Some(remote),
            change_type: ChangeType::Modified,
        }
    }
}

fn truncate(value: &str) -> String {
    if value.chars().count() > 50 {
        format!("{}...", value.chars().take(50).collect::<String>())
    } else {
        value.to_string()
    }
}

impl fmt::Display for MetadataChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self.change_type {
            ChangeType::Added => "+",
            ChangeType::Modified => "~",
        };

        write!(f, "[{}] {}/{}: ", symbol, self.locale, self.key)?;

        match &self.remote_value {
            None => write!(f, "(new) {:?}", truncate(&self.local_value)),
            Some(remote) => write!(
                f,
                "{:?} -> {:?}",
                truncate(remote),
                truncate(&self.local_value)
            ),
        }
    }
}

/// Type of metadata change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// The service has no value yet.
    Added,
    /// The service holds a different value.
    Modified,
}

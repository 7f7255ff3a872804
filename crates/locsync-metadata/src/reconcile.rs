//! Pushing a snapshot to the service as keys and translations.
//!
//! A push runs three strictly sequential phases:
//!
//! 1. **create** every key name the snapshot references (already existing
//!    keys are reported per item and tolerated),
//! 2. **resolve** the names back to key ids,
//! 3. **update** the keys with their translations in one bulk request.
//!
//! Keys only ever get added; translations that are not in the snapshot are
//! left alone.

use crate::client::{KeyUpdate, NewKey, RemoteKey, RemoteMetadataClient, TranslationUpdate};
use crate::locale::{self, to_service, to_store};
use crate::{MetadataDomain, MetadataError, MetadataSnapshot, Platform, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Result of a push operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PushResult {
    /// Store locales that had at least one translation sent.
    pub updated_locales: Vec<String>,
    /// Key names that had at least one translation sent.
    pub updated_keys: Vec<String>,
}

impl PushResult {
    /// Returns true if nothing was sent.
    pub fn is_empty(&self) -> bool {
        self.updated_keys.is_empty()
    }
}

/// Reconciles snapshots of one domain with the remote project.
pub struct KeyReconciler<'a, C: RemoteMetadataClient + ?Sized> {
    client: &'a C,
    domain: MetadataDomain,
}

impl<'a, C: RemoteMetadataClient + ?Sized> KeyReconciler<'a, C> {
    pub fn new(client: &'a C, domain: MetadataDomain) -> Self {
        Self { client, domain }
    }

    /// Creates, resolves and updates the keys referenced by `snapshot`.
    pub async fn push(&self, snapshot: &MetadataSnapshot, platform: Platform) -> Result<PushResult> {
        let names: Vec<String> = snapshot.key_names().into_iter().map(str::to_string).collect();
        if names.is_empty() {
            debug!("nothing to push");
            return Ok(PushResult::default());
        }

        // create
        let new_keys: Vec<NewKey> = names.iter().map(|n| NewKey::new(n.as_str(), platform)).collect();
        let created = self.client.create_keys(&new_keys).await?;
        info!(
            requested = names.len(),
            created = created.keys.len(),
            rejected = created.errors.len(),
            "created keys"
        );

        // resolve
        let remote = self.client.list_keys(&names, false).await?;
        let ids = resolve_ids(&names, &remote)?;

        // update
        let mut updates = Vec::new();
        let mut result = PushResult::default();
        let mut locales = BTreeSet::new();

        for name in &names {
            let translations: Vec<TranslationUpdate> = snapshot
                .values_for_key(name)
                .map(|(language, value)| {
                    locales.insert(language.to_string());
                    TranslationUpdate {
                        language_iso: to_service(language, self.domain),
                        translation: value.to_string(),
                    }
                })
                .collect();

            if translations.is_empty() {
                continue;
            }

            // resolve_ids guarantees every name has an id
            if let Some(&key_id) = ids.get(name.as_str()) {
                updates.push(KeyUpdate {
                    key_id,
                    platforms: vec![platform],
                    translations,
                });
                result.updated_keys.push(name.clone());
            }
        }

        if updates.is_empty() {
            debug!("no translations to update");
            return Ok(result);
        }

        self.client.update_keys(&updates).await?;
        result.updated_locales = locales.into_iter().collect();

        info!(
            keys = result.updated_keys.len(),
            locales = result.updated_locales.len(),
            "updated translations"
        );
        Ok(result)
    }

    /// Adds store locales to the project as languages.
    ///
    /// Languages the project already has come back as per-item errors and
    /// are only logged; an API error fails the call. Returns the service
    /// codes requested.
    pub async fn create_languages(&self, codes: &[String]) -> Result<Vec<String>> {
        let mut service_codes: Vec<String> = codes
            .iter()
            .map(|code| to_service(code, self.domain))
            .collect();
        service_codes.sort();
        service_codes.dedup();

        if service_codes.is_empty() {
            return Ok(service_codes);
        }

        let response = self.client.create_languages(&service_codes).await?;
        for error in &response.errors {
            warn!(code = ?error.code, "language not added: {}", error.message);
        }
        info!(
            requested = service_codes.len(),
            added = response.languages.len(),
            "created languages"
        );
        Ok(service_codes)
    }

    /// Lists the domain's keys with their translations as a store-form snapshot.
    ///
    /// Languages outside the domain's list are skipped, as are keys that do
    /// not belong to the domain.
    pub async fn remote_snapshot(&self) -> Result<MetadataSnapshot> {
        let names: Vec<String> = self
            .domain
            .key_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let keys = self.client.list_keys(&names, true).await?;
        Ok(snapshot_from_keys(&keys, self.domain))
    }
}

/// Maps requested names to key ids, failing if any is missing.
fn resolve_ids<'n>(names: &'n [String], remote: &[RemoteKey]) -> Result<BTreeMap<&'n str, u64>> {
    let by_name: BTreeMap<&str, u64> = remote
        .iter()
        .filter_map(|key| key.name().map(|name| (name, key.key_id)))
        .collect();

    let mut ids = BTreeMap::new();
    let mut missing = Vec::new();
    for name in names {
        match by_name.get(name.as_str()) {
            Some(&id) => {
                ids.insert(name.as_str(), id);
            }
            None => missing.push(name.clone()),
        }
    }

    if missing.is_empty() {
        Ok(ids)
    } else {
        Err(MetadataError::Reconciliation { missing })
    }
}

/// Builds a store-form snapshot from listed keys.
pub fn snapshot_from_keys(keys: &[RemoteKey], domain: MetadataDomain) -> MetadataSnapshot {
    let valid = locale::service_languages(domain);
    let mut snapshot = MetadataSnapshot::new();

    for key in keys {
        let Some(name) = key.name() else { continue };
        if domain.key(name).is_none() {
            continue;
        }
        for translation in &key.translations {
            if !valid.iter().any(|code| code == &translation.language_iso) {
                continue;
            }
            if let Some(text) = &translation.translation {
                snapshot.insert(to_store(&translation.language_iso, domain), name, text.as_str());
            }
        }
    }
    snapshot
}

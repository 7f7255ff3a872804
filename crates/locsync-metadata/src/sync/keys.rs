//! Bulk key creation.

use super::{SyncContext, SyncReport};
use crate::client::NewKey;
use crate::{MetadataError, Platform, Result};
use locsync_core::config::validation::validate_list;
use tracing::info;

pub(super) async fn add_keys(
    context: &SyncContext,
    keys: &[String],
    platform: Platform,
) -> Result<SyncReport> {
    if keys.is_empty() {
        return Err(MetadataError::invalid_input("keys", "at least one key is required"));
    }
    validate_list("keys", keys)?;

    let new_keys: Vec<NewKey> = keys.iter().map(|k| NewKey::new(k.as_str(), platform)).collect();
    let response = context.client().create_keys(&new_keys).await?;

    info!(
        inserted = response.keys.len(),
        rejected = response.errors.len(),
        "keys uploaded"
    );
    Ok(SyncReport::KeysAdded {
        inserted: response.keys.len(),
        rejected: response.errors.len(),
    })
}

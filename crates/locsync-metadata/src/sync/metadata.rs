//! Pushing and pulling store metadata.

use super::{SyncContext, SyncReport};
use crate::diff::{preview, reconcile};
use crate::locale::LocaleCode;
use crate::reconcile::{KeyReconciler, PushResult};
use crate::{MetadataDomain, MetadataError, MetadataSnapshot, Result};
use tracing::{info, warn};

pub(super) async fn push(
    context: &SyncContext,
    domain: MetadataDomain,
    add_languages: bool,
    overwrite: bool,
    dry_run: bool,
) -> Result<SyncReport> {
    let local = canonical_languages(&context.store().load(domain).await?, domain);
    let reconciler = KeyReconciler::new(context.client(), domain);

    if local.is_empty() {
        info!(domain = %domain, "no local metadata found");
        return Ok(SyncReport::Pushed {
            domain,
            dry_run,
            languages_requested: Vec::new(),
            changes: None,
            result: PushResult::default(),
        });
    }

    let languages_requested = if add_languages && !dry_run {
        let codes: Vec<String> = local.languages().map(str::to_string).collect();
        reconciler.create_languages(&codes).await?
    } else {
        Vec::new()
    };

    let remote = if overwrite && !dry_run {
        None
    } else {
        Some(reconciler.remote_snapshot().await?)
    };

    let to_push = match &remote {
        Some(remote) => reconcile(&local, remote, overwrite),
        None => local,
    };
    let changes = remote.as_ref().map(|remote| preview(&to_push, remote));

    if dry_run {
        info!(
            domain = %domain,
            changes = changes.as_ref().map_or(0, |c| c.len()),
            "dry run, skipping push"
        );
        return Ok(SyncReport::Pushed {
            domain,
            dry_run,
            languages_requested,
            changes,
            result: PushResult::default(),
        });
    }

    let result = reconciler.push(&to_push, domain.platform()).await?;
    Ok(SyncReport::Pushed {
        domain,
        dry_run,
        languages_requested,
        changes,
        result,
    })
}

/// Renames legacy store tags to the tag the service's code maps back to, so
/// local and remote snapshots are keyed alike.
///
/// When an alias and its canonical tag both hold a value for a key, the
/// canonical value is kept.
pub(super) fn canonical_languages(
    local: &MetadataSnapshot,
    domain: MetadataDomain,
) -> MetadataSnapshot {
    let mut canonical = MetadataSnapshot::new();
    let mut aliases = Vec::new();

    for (language, values) in local.iter() {
        let store_form = LocaleCode::from_service(
            domain,
            LocaleCode::from_store(domain, language).service_form(),
        )
        .store_form()
        .to_string();
        if store_form == language {
            canonical.insert_language(language, values.clone());
        } else {
            aliases.push((language, store_form, values));
        }
    }

    for (alias, store_form, values) in aliases {
        for (key, value) in values {
            if canonical.get(&store_form, key).is_some() {
                warn!(
                    "Ignoring {}/{}: {} holds a value for the same language",
                    alias, key, store_form
                );
                continue;
            }
            canonical.insert(store_form.as_str(), key.as_str(), value.as_str());
        }
    }
    canonical
}

pub(super) async fn pull(
    context: &SyncContext,
    domain: MetadataDomain,
    release_number: Option<&str>,
) -> Result<SyncReport> {
    let release_number = release_number.filter(|r| !r.trim().is_empty());
    if domain == MetadataDomain::GooglePlay && release_number.is_none() {
        return Err(MetadataError::invalid_input(
            "release_number",
            "a release number is required to pull Google Play metadata",
        ));
    }

    let remote = KeyReconciler::new(context.client(), domain)
        .remote_snapshot()
        .await?;
    let files = context.store().save(domain, &remote, release_number).await?;
    let locales: Vec<String> = remote.languages().map(str::to_string).collect();

    info!(
        domain = %domain,
        locales = locales.len(),
        files = files.len(),
        "pulled metadata"
    );
    Ok(SyncReport::Pulled {
        domain,
        locales,
        files,
    })
}

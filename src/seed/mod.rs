//! Idempotent catalog seeding
//!
//! Looks up every catalog entry by natural key, stages the missing ones and
//! writes them with a single audited commit. Seeding is best effort: a failed
//! pass is logged and startup carries on.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::error::StoreError;
use crate::store::{AuditingStore, CatalogKind, Store};

mod catalog;

pub use catalog::{Catalog, FormSeed, ModuleSeed, PermissionSeed, RoleSeed, SeedEntry};

/// Error that aborted a seeding pass
#[derive(Error, Debug)]
pub enum SeedFailure {
    #[error("Lookup of {kind} '{key}' failed: {source}")]
    Lookup {
        kind: CatalogKind,
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("Catalog commit failed: {0}")]
    Commit(#[source] StoreError),
}

/// Outcome of a successful seeding pass
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Entries inserted by this pass, in seeding order
    pub created: Vec<(CatalogKind, String)>,
    /// Entries that already had a row
    pub skipped: usize,
    pub rows_affected: u64,
}

impl SeedReport {
    pub fn created_count(&self, kind: CatalogKind) -> usize {
        self.created.iter().filter(|(k, _)| *k == kind).count()
    }
}

/// Seed `catalog` into `store`, logging and swallowing any failure.
///
/// Returns `None` when the pass failed; nothing staged by it is left behind.
/// The pass owns the whole unit of work: changes staged on `store` before the
/// call are committed with the catalog, or discarded with it on failure.
pub async fn seed<S: Store>(store: &mut AuditingStore<S>, catalog: &Catalog) -> Option<SeedReport> {
    match try_seed(store, catalog).await {
        Ok(report) => {
            info!(
                "Catalog seeding finished: {} created, {} already present",
                report.created.len(),
                report.skipped
            );
            Some(report)
        }
        Err(e) => {
            store.discard();
            error!("Catalog seeding failed, continuing startup: {}", e);
            None
        }
    }
}

/// Seed `catalog` into `store`: roles, then permissions, modules and forms,
/// followed by exactly one commit.
///
/// On error the changes staged so far stay pending in `store`.
pub async fn try_seed<S: Store>(
    store: &mut AuditingStore<S>,
    catalog: &Catalog,
) -> Result<SeedReport, SeedFailure> {
    let mut report = SeedReport::default();

    seed_category(store, &catalog.roles, &mut report).await?;
    seed_category(store, &catalog.permissions, &mut report).await?;
    seed_category(store, &catalog.modules, &mut report).await?;
    seed_category(store, &catalog.forms, &mut report).await?;

    report.rows_affected = store.commit().await.map_err(SeedFailure::Commit)?;

    for (kind, key) in &report.created {
        info!("Created {} '{}'", kind, key);
    }

    Ok(report)
}

async fn seed_category<S: Store, E: SeedEntry>(
    store: &mut AuditingStore<S>,
    entries: &[E],
    report: &mut SeedReport,
) -> Result<(), SeedFailure> {
    let mut seen = HashSet::new();

    for entry in entries {
        let key = entry.key();
        if !seen.insert(key) {
            debug!("Duplicate {} '{}' in catalog, skipping", E::KIND, key);
            continue;
        }

        let existing = store
            .find_by_key(E::KIND, key)
            .await
            .map_err(|source| SeedFailure::Lookup {
                kind: E::KIND,
                key: key.to_string(),
                source,
            })?;

        match existing {
            Some(row) => {
                if !row.lifecycle.is_live() {
                    debug!("{} '{}' exists but is deleted, leaving it alone", E::KIND, key);
                }
                report.skipped += 1;
            }
            None => {
                let now = store.now();
                store.stage_insert(entry.to_record(now));
                report.created.push((E::KIND, key.to_string()));
            }
        }
    }

    Ok(())
}

//! Read-mostly store for the current catalog snapshot.
//!
//! Readers call [`CatalogStore::snapshot`], which is one atomic load of an
//! `Arc<CatalogSnapshot>`; no locks, no partially merged state. Writers call
//! [`CatalogStore::refresh`] (rebuild only if a source file's modification
//! time changed) or [`CatalogStore::rebuild`] (always), which load the four
//! sources, adapt, merge, and swap the new snapshot in one store.
//!
//! Implementation notes:
//! - Uses `arc-swap` for the pointer swap; a snapshot handed out earlier stays
//!   valid for as long as the reader holds it.
//! - Starts empty; until the first successful rebuild `snapshot()` is `None`.
//! - A failed rebuild leaves the previous snapshot in place.
//! - Two writers racing may both rebuild; the later store wins and both
//!   results are equivalent for the same files.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Catalog, dump, merge::{MergeOptions, SourceTables}};
use crate::{
    adapter::{AdaptReport, SourceLayouts},
    config::EngineConfig,
    source::{self, SourceError, SourceKind},
};

/// Where the four source exports live.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SourcePaths {
    /// Stock summary export.
    pub stock: PathBuf,
    /// Price list export.
    pub price: PathBuf,
    /// Condition list export.
    pub threshold: PathBuf,
    /// Substitute sheet export.
    pub substitutes: PathBuf,
}

impl SourcePaths {
    /// Path configured for `kind`.
    pub fn path(&self, kind: SourceKind) -> &Path {
        match kind {
            SourceKind::Stock => &self.stock,
            SourceKind::Price => &self.price,
            SourceKind::Threshold => &self.threshold,
            SourceKind::Substitutes => &self.substitutes,
        }
    }

    /// Resolve relative paths against `base`.
    pub fn rebase(&mut self, base: &Path) {
        for p in [
            &mut self.stock,
            &mut self.price,
            &mut self.threshold,
            &mut self.substitutes,
        ] {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
    }
}

/// Modification times of the four sources, in [`SourceKind::ALL`] order.
///
/// `None` marks a file whose metadata could not be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStamp([Option<SystemTime>; 4]);

impl SourceStamp {
    /// Stat the four files.
    pub fn read(paths: &SourcePaths) -> Self {
        Self(SourceKind::ALL.map(|kind| source::modified_at(paths.path(kind))))
    }

    /// Modification time recorded for `kind`.
    pub fn modified(&self, kind: SourceKind) -> Option<SystemTime> {
        self.0[kind as usize]
    }
}

/// One published catalog plus how it was built.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    /// The merged catalog.
    pub catalog: Catalog,
    /// When the merge finished.
    pub built_at: DateTime<Utc>,
    /// Source modification times observed before loading.
    pub stamp: SourceStamp,
    /// Adapter cleanup counters per source.
    pub reports: BTreeMap<SourceKind, AdaptReport>,
}

/// Load, adapt and merge the four sources into a fresh snapshot.
pub fn build_snapshot(
    paths: &SourcePaths,
    layouts: &SourceLayouts,
    merge: &MergeOptions,
) -> Result<CatalogSnapshot, SourceError> {
    let stamp = SourceStamp::read(paths);

    let stock = source::load_table(SourceKind::Stock, paths.path(SourceKind::Stock))?;
    let price = source::load_table(SourceKind::Price, paths.path(SourceKind::Price))?;
    let threshold = source::load_table(SourceKind::Threshold, paths.path(SourceKind::Threshold))?;
    let substitutes =
        source::load_table(SourceKind::Substitutes, paths.path(SourceKind::Substitutes))?;

    let tables = SourceTables::from_raw(layouts, &stock, &price, &threshold, &substitutes);
    let reports = BTreeMap::from([
        (SourceKind::Stock, tables.stock.report),
        (SourceKind::Price, tables.price.report),
        (SourceKind::Threshold, tables.threshold.report),
        (SourceKind::Substitutes, tables.substitutes.report),
    ]);

    Ok(CatalogSnapshot {
        catalog: tables.merge(merge),
        built_at: Utc::now(),
        stamp,
        reports,
    })
}

/// Holds the current snapshot and knows how to rebuild it.
#[derive(Debug)]
pub struct CatalogStore {
    paths: SourcePaths,
    layouts: SourceLayouts,
    merge: MergeOptions,
    dump_path: Option<PathBuf>,
    current: ArcSwapOption<CatalogSnapshot>,
}

impl CatalogStore {
    /// Empty store for the given sources.
    pub fn new(paths: SourcePaths, layouts: SourceLayouts, merge: MergeOptions) -> Self {
        Self {
            paths,
            layouts,
            merge,
            dump_path: None,
            current: ArcSwapOption::empty(),
        }
    }

    /// Empty store wired from a loaded config.
    pub fn from_config(cfg: &EngineConfig) -> Self {
        let mut store = Self::new(cfg.sources.clone(), cfg.layout.clone(), cfg.merge.clone());
        store.dump_path = cfg.dump_path.clone();
        store
    }

    /// Write a best-effort audit dump after every successful rebuild.
    pub fn with_dump_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dump_path = Some(path.into());
        self
    }

    /// Configured source paths.
    pub fn paths(&self) -> &SourcePaths {
        &self.paths
    }

    /// Current snapshot, if any rebuild has succeeded yet.
    pub fn snapshot(&self) -> Option<Arc<CatalogSnapshot>> {
        self.current.load_full()
    }

    /// Rebuild if the source files changed since the current snapshot (or if
    /// there is none). Returns the snapshot now in effect.
    pub fn refresh(&self) -> Result<Arc<CatalogSnapshot>, SourceError> {
        if let Some(snap) = self.current.load_full() {
            if snap.stamp == SourceStamp::read(&self.paths) {
                return Ok(snap);
            }
            tracing::debug!("source files changed, rebuilding catalog");
        }
        self.rebuild()
    }

    /// Rebuild unconditionally and publish the result.
    pub fn rebuild(&self) -> Result<Arc<CatalogSnapshot>, SourceError> {
        let snap = match build_snapshot(&self.paths, &self.layouts, &self.merge) {
            Ok(s) => Arc::new(s),
            Err(e) => {
                tracing::warn!(error = %e, kept_previous = self.current.load().is_some(), "catalog rebuild failed");
                return Err(e);
            }
        };

        self.current.store(Some(Arc::clone(&snap)));
        tracing::info!(
            records = snap.catalog.len(),
            built_at = %snap.built_at,
            "published catalog snapshot"
        );

        if let Some(path) = &self.dump_path {
            dump::spawn_dump(Arc::clone(&snap), path.clone());
        }
        Ok(snap)
    }

    /// Drop the current snapshot. Useful for tests.
    pub fn clear(&self) {
        self.current.store(None);
    }
}

//! The merged item catalog.
//!
//! A [`Catalog`] holds one [`CatalogRecord`] per item key seen in any source.
//! It is built in one go by [`merge`](merge::merge) and never mutated
//! afterwards; a changed source produces a brand new catalog which the
//! [`CatalogStore`] publishes atomically.

mod cache;
pub mod dump;
pub mod merge;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    key::{self, ItemKey},
    status::{StockStatus, classify},
};

pub use cache::{CatalogSnapshot, CatalogStore, SourcePaths, SourceStamp, build_snapshot};
pub use merge::{MergeOptions, SourceTables, merge, merge_with};

/// Everything known about one item across the four sources.
///
/// `None` always means "the source had nothing for this key"; it is never
/// folded into zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogRecord {
    /// Primary identity.
    pub key: ItemKey,
    /// Scaled stock quantity.
    pub quantity: Option<f64>,
    /// Minimum-stock condition.
    pub threshold: Option<f64>,
    /// Informational price.
    pub price: Option<f64>,
    /// Unit rate from the stock export.
    pub rate: Option<f64>,
    /// Stock value from the stock export.
    pub stock_value: Option<f64>,
    /// Raw substitute slots in sheet order; may hold blanks and repeats.
    pub substitutes: Vec<ItemKey>,
}

impl CatalogRecord {
    /// Current status, derived from quantity and threshold.
    pub fn status(&self) -> StockStatus {
        classify(self.quantity, self.threshold)
    }
}

/// Immutable set of records keyed (and ordered) by item key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalog {
    records: BTreeMap<ItemKey, CatalogRecord>,
}

impl Catalog {
    pub(crate) fn from_records(records: impl IntoIterator<Item = CatalogRecord>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.key.clone(), r)).collect(),
        }
    }

    /// Record for an already-normalized key.
    pub fn get(&self, key: &ItemKey) -> Option<&CatalogRecord> {
        self.records.get(key)
    }

    /// Normalize `raw` and look it up.
    pub fn find(&self, raw: &str) -> Option<&CatalogRecord> {
        let key = key::normalize(raw);
        if key.is_empty() {
            return None;
        }
        self.get(&key)
    }

    /// True when a record exists for `key`.
    pub fn contains(&self, key: &ItemKey) -> bool {
        self.records.contains_key(key)
    }

    /// Records in key order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogRecord> {
        self.records.values()
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &ItemKey> {
        self.records.keys()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True for an empty catalog.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

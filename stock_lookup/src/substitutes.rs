//! Substitute resolution.
//!
//! Takes the raw substitute slots of one record, cleans them (drop blanks and
//! self-references, stable de-duplication, at most [`SUBSTITUTE_SLOTS`]) and
//! classifies each survivor against the catalog. Chains are not followed:
//! substitutes of substitutes are never looked at.
//!
//! The resolver returns the full classified list. Whether out-of-stock (or
//! low-stock) substitutes are shown is the caller's call, see
//! [`SubstituteFilter`].

use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    adapter::SUBSTITUTE_SLOTS,
    catalog::{Catalog, CatalogRecord},
    key::ItemKey,
    status::StockStatus,
};

/// What the catalog says about a substitute key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstituteStatus {
    /// The key has a catalog record; status derived as usual.
    Known(StockStatus),
    /// The key has no catalog record at all (a data-quality problem, not a
    /// stock level).
    Unknown,
}

impl SubstituteStatus {
    /// Stock status, if the key is known.
    pub fn stock(self) -> Option<StockStatus> {
        match self {
            SubstituteStatus::Known(s) => Some(s),
            SubstituteStatus::Unknown => None,
        }
    }
}

impl fmt::Display for SubstituteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubstituteStatus::Known(s) => fmt::Display::fmt(s, f),
            SubstituteStatus::Unknown => f.write_str("Unknown item"),
        }
    }
}

/// One classified substitute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Substitute {
    /// Substitute item key.
    pub key: ItemKey,
    /// Its availability.
    pub status: SubstituteStatus,
}

/// Display policy for substitutes, applied by callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstituteFilter {
    /// Show everything, unknown keys included.
    All,
    /// Hide substitutes that are out of stock.
    #[default]
    HideOutOfStock,
    /// Show only substitutes that are in stock.
    InStockOnly,
}

impl SubstituteFilter {
    /// Whether a substitute with `status` should be shown.
    pub fn retains(self, status: SubstituteStatus) -> bool {
        match self {
            SubstituteFilter::All => true,
            SubstituteFilter::HideOutOfStock => {
                status != SubstituteStatus::Known(StockStatus::OutOfStock)
            }
            SubstituteFilter::InStockOnly => status == SubstituteStatus::Known(StockStatus::InStock),
        }
    }
}

/// Cleaned substitute keys of `record`, in sheet order.
pub fn candidate_keys(record: &CatalogRecord) -> Vec<ItemKey> {
    let mut seen = HashSet::new();
    record
        .substitutes
        .iter()
        .filter(|k| !k.is_empty() && **k != record.key)
        .filter(|k| seen.insert(*k))
        .take(SUBSTITUTE_SLOTS)
        .cloned()
        .collect()
}

/// Classified substitutes for `key`; empty when the key is not in the catalog.
pub fn resolve_substitutes(key: &ItemKey, catalog: &Catalog) -> Vec<Substitute> {
    let Some(record) = catalog.get(key) else {
        return Vec::new();
    };

    candidate_keys(record)
        .into_iter()
        .map(|k| {
            let status = match catalog.get(&k) {
                Some(r) => SubstituteStatus::Known(r.status()),
                None => SubstituteStatus::Unknown,
            };
            Substitute { key: k, status }
        })
        .collect()
}

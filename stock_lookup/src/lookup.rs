//! One item query, end to end.
//!
//! raw input -> key normalization -> catalog lookup -> classification ->
//! (when not comfortably in stock) substitute resolution -> image resolution
//! for the item and each known substitute.
//!
//! The image folder is scanned at most once per query, and only if some key
//! misses the `{key}.{ext}` fast path.

use std::path::{Path, PathBuf};

use once_cell::unsync::OnceCell;
use serde::Serialize;

use crate::{
    assets::AssetResolver,
    catalog::{Catalog, CatalogRecord},
    key::{self, ItemKey},
    status::StockStatus,
    substitutes::{SubstituteFilter, SubstituteStatus, resolve_substitutes},
};

/// Result of one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LookupOutcome {
    /// The input held no digits.
    InvalidQuery,
    /// The key is not in the catalog.
    NotFound {
        /// Normalized key that was looked up.
        key: ItemKey,
    },
    /// The key is in the catalog.
    Found(ItemReport),
}

/// Everything known about a found item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemReport {
    /// Normalized key.
    pub key: ItemKey,
    /// Merged record.
    pub record: CatalogRecord,
    /// Derived status.
    pub status: StockStatus,
    /// Informational price.
    pub price: Option<f64>,
    /// Resolved image, if any.
    pub image: Option<PathBuf>,
    /// Classified substitutes; only filled when the item is not in stock.
    pub substitutes: Vec<SubstituteReport>,
}

impl ItemReport {
    /// Substitutes passing the caller's display policy.
    pub fn visible_substitutes(
        &self,
        filter: SubstituteFilter,
    ) -> impl Iterator<Item = &SubstituteReport> {
        self.substitutes
            .iter()
            .filter(move |s| filter.retains(s.status))
    }
}

/// One substitute as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubstituteReport {
    /// Substitute key.
    pub key: ItemKey,
    /// Known status or unknown.
    pub status: SubstituteStatus,
    /// Price of a known substitute.
    pub price: Option<f64>,
    /// Image of a known substitute.
    pub image: Option<PathBuf>,
}

/// `"12.50"` or `"N/A"`.
pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) => format!("{p:.2}"),
        None => "N/A".to_string(),
    }
}

/// Query front-end over one catalog snapshot and one image folder.
#[derive(Debug, Clone, Copy)]
pub struct Lookup<'a> {
    catalog: &'a Catalog,
    assets: &'a AssetResolver,
}

impl<'a> Lookup<'a> {
    /// Bind a catalog and an asset resolver.
    pub fn new(catalog: &'a Catalog, assets: &'a AssetResolver) -> Self {
        Self { catalog, assets }
    }

    /// Run one query.
    pub fn query(&self, raw: &str) -> LookupOutcome {
        let key = key::normalize(raw);
        if key.is_empty() {
            return LookupOutcome::InvalidQuery;
        }
        let Some(record) = self.catalog.get(&key) else {
            tracing::debug!(%key, "item not in catalog");
            return LookupOutcome::NotFound { key };
        };

        let index = OnceCell::new();
        let image = |k: &ItemKey| {
            self.assets
                .resolve_with(k, || index.get_or_init(|| self.assets.scan()))
        };

        let status = record.status();
        let substitutes = if status == StockStatus::InStock {
            Vec::new()
        } else {
            resolve_substitutes(&key, self.catalog)
                .into_iter()
                .map(|s| match self.catalog.get(&s.key) {
                    Some(r) => SubstituteReport {
                        image: image(&s.key),
                        price: r.price,
                        key: s.key,
                        status: s.status,
                    },
                    None => SubstituteReport {
                        key: s.key,
                        status: s.status,
                        price: None,
                        image: None,
                    },
                })
                .collect()
        };

        LookupOutcome::Found(ItemReport {
            image: image(&key),
            price: record.price,
            status,
            record: record.clone(),
            key,
            substitutes,
        })
    }

    /// Resolve an image for `key` without a catalog lookup.
    pub fn image(&self, key: &ItemKey) -> Option<PathBuf> {
        self.assets.resolve(key)
    }

    /// Image folder in use.
    pub fn asset_root(&self) -> &Path {
        self.assets.root()
    }
}

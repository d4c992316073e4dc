//! Catalog merge: key union + left joins.
//!
//! The key universe is the union of row keys across all four adapted tables,
//! so an item that only appears in, say, the substitute sheet still gets a
//! record (with no quantity) and is reported out of stock instead of unknown.
//! Each table is then left-joined onto that universe; a missing row leaves the
//! corresponding fields `None`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{Catalog, CatalogRecord};
use crate::{
    adapter::{Adapted, PriceRow, SourceAdapter, SourceLayouts, StockRow, SubstituteRow, ThresholdRow},
    key::ItemKey,
    source::SourceKind,
    table::RawTable,
};

/// Knobs for [`merge_with`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeOptions {
    /// Also create records for keys that only appear as substitute targets.
    ///
    /// When on, such a key becomes a full catalog entry with every field
    /// absent, so it classifies as out of stock. Off by default: a key named
    /// only in someone's substitute slots is not a stocked item, and lookups
    /// and substitute lists report it as unknown instead of out of stock.
    pub register_substitute_targets: bool,
    /// Use the stock export's rate when the price list has no row for a key.
    pub price_fallback_to_rate: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            register_substitute_targets: false,
            price_fallback_to_rate: true,
        }
    }
}

/// The four adapted tables of one input snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTables {
    /// Stock summary.
    pub stock: Adapted<StockRow>,
    /// Price list.
    pub price: Adapted<PriceRow>,
    /// Minimum-stock conditions.
    pub threshold: Adapted<ThresholdRow>,
    /// Substitute mapping.
    pub substitutes: Adapted<SubstituteRow>,
}

impl Default for SourceTables {
    fn default() -> Self {
        Self {
            stock: Adapted::empty(SourceKind::Stock),
            price: Adapted::empty(SourceKind::Price),
            threshold: Adapted::empty(SourceKind::Threshold),
            substitutes: Adapted::empty(SourceKind::Substitutes),
        }
    }
}

impl SourceTables {
    /// Run each raw table through its configured adapter.
    pub fn from_raw(
        layouts: &SourceLayouts,
        stock: &RawTable,
        price: &RawTable,
        threshold: &RawTable,
        substitutes: &RawTable,
    ) -> Self {
        Self {
            stock: layouts.stock.adapt(stock),
            price: layouts.price.adapt(price),
            threshold: layouts.threshold.adapt(threshold),
            substitutes: layouts.substitutes.adapt(substitutes),
        }
    }

    /// Merge with the given options.
    pub fn merge(&self, opts: &MergeOptions) -> Catalog {
        merge_with(
            &self.stock,
            &self.price,
            &self.threshold,
            &self.substitutes,
            opts,
        )
    }
}

/// Merge the four tables with [`MergeOptions::default`].
pub fn merge(
    stock: &Adapted<StockRow>,
    price: &Adapted<PriceRow>,
    threshold: &Adapted<ThresholdRow>,
    substitutes: &Adapted<SubstituteRow>,
) -> Catalog {
    merge_with(stock, price, threshold, substitutes, &MergeOptions::default())
}

/// Merge the four tables. Pure: identical inputs give an identical catalog.
pub fn merge_with(
    stock: &Adapted<StockRow>,
    price: &Adapted<PriceRow>,
    threshold: &Adapted<ThresholdRow>,
    substitutes: &Adapted<SubstituteRow>,
    opts: &MergeOptions,
) -> Catalog {
    let mut universe: BTreeSet<&ItemKey> = BTreeSet::new();
    universe.extend(stock.keys());
    universe.extend(price.keys());
    universe.extend(threshold.keys());
    universe.extend(substitutes.keys());
    if opts.register_substitute_targets {
        universe.extend(
            substitutes
                .rows
                .values()
                .flat_map(|r| r.slots.iter())
                .filter(|k| !k.is_empty()),
        );
    }

    let records = universe.into_iter().map(|key| {
        let s = stock.get(key).copied().unwrap_or_default();
        let listed = price.get(key).and_then(|p| p.price);
        let price = match listed {
            Some(p) => Some(p),
            None if opts.price_fallback_to_rate => s.rate,
            None => None,
        };

        CatalogRecord {
            key: key.clone(),
            quantity: s.quantity,
            threshold: threshold.get(key).and_then(|t| t.threshold),
            price,
            rate: s.rate,
            stock_value: s.value,
            substitutes: substitutes
                .get(key)
                .map(|r| r.slots.clone())
                .unwrap_or_default(),
        }
    });

    let catalog = Catalog::from_records(records);
    tracing::debug!(records = catalog.len(), "merged catalog");
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapter::{PriceLayout, StockLayout, SubstitutesLayout, ThresholdLayout},
        status::StockStatus,
    };

    fn k(s: &str) -> ItemKey {
        ItemKey::parse(s)
    }

    fn tables() -> SourceTables {
        let mut stock_rows = vec![vec!["hdr"]; 9];
        stock_rows.push(vec!["4521", "200 pcs", "12", "2400"]);
        stock_rows.push(vec!["4522", "0", "", ""]);
        let stock = StockLayout::default().adapt(&RawTable::from_text_rows(stock_rows));

        let price = PriceLayout::default().adapt(&RawTable::from_text_rows(vec![
            vec!["ITEM NO.", "RATE"],
            vec!["4522", "9.5"],
            vec!["4600", "30"],
        ]));
        let threshold = ThresholdLayout::default().adapt(&RawTable::from_text_rows(vec![
            vec!["ITEM NO.", "CONDITION"],
            vec!["4521", "15000"],
        ]));
        let substitutes = SubstitutesLayout::default().adapt(&RawTable::from_text_rows(vec![
            vec!["ITEM NO.", "Alt1", "Alt2", "Alt3"],
            vec!["4521", "4600", "", "4700"],
            vec!["4800", "4521", "", ""],
        ]));

        SourceTables {
            stock,
            price,
            threshold,
            substitutes,
        }
    }

    #[test]
    fn universe_is_union_of_row_keys() {
        let cat = tables().merge(&MergeOptions::default());
        let keys: Vec<&str> = cat.keys().map(ItemKey::as_str).collect();
        assert_eq!(keys, vec!["4521", "4522", "4600", "4800"]);
    }

    #[test]
    fn missing_sources_stay_absent() {
        let cat = tables().merge(&MergeOptions::default());

        let only_subs = cat.get(&k("4800")).unwrap();
        assert_eq!(only_subs.quantity, None);
        assert_eq!(only_subs.threshold, None);
        assert_eq!(only_subs.price, None);
        assert_eq!(only_subs.status(), StockStatus::OutOfStock);

        let zero = cat.get(&k("4522")).unwrap();
        assert_eq!(zero.quantity, Some(0.0));
        assert_eq!(zero.price, Some(9.5));

        let full = cat.get(&k("4521")).unwrap();
        assert_eq!(full.quantity, Some(20_000.0));
        assert_eq!(full.threshold, Some(15_000.0));
        assert_eq!(full.status(), StockStatus::InStock);
        assert_eq!(full.substitutes, vec![k("4600"), ItemKey::empty(), k("4700")]);
    }

    #[test]
    fn price_falls_back_to_stock_rate_only_when_enabled() {
        let t = tables();
        let with = t.merge(&MergeOptions::default());
        assert_eq!(with.get(&k("4521")).unwrap().price, Some(12.0));

        let without = t.merge(&MergeOptions {
            price_fallback_to_rate: false,
            ..Default::default()
        });
        assert_eq!(without.get(&k("4521")).unwrap().price, None);
        assert_eq!(without.get(&k("4521")).unwrap().rate, Some(12.0));
    }

    #[test]
    fn substitute_targets_register_on_request() {
        use crate::substitutes::{SubstituteStatus, resolve_substitutes};

        let t = tables();
        let default = t.merge(&MergeOptions::default());
        assert!(!default.contains(&k("4700")));
        let subs = resolve_substitutes(&k("4521"), &default);
        assert_eq!(subs[1].status, SubstituteStatus::Unknown);

        let cat = t.merge(&MergeOptions {
            register_substitute_targets: true,
            ..Default::default()
        });
        let target = cat.get(&k("4700")).unwrap();
        assert_eq!(target.quantity, None);
        assert!(target.substitutes.is_empty());
        assert_eq!(target.status(), StockStatus::OutOfStock);
        let subs = resolve_substitutes(&k("4521"), &cat);
        assert_eq!(subs[1].status, SubstituteStatus::Known(StockStatus::OutOfStock));
    }

    #[test]
    fn merge_is_deterministic() {
        let t = tables();
        let a = merge(&t.stock, &t.price, &t.threshold, &t.substitutes);
        let b = merge(&t.stock, &t.price, &t.threshold, &t.substitutes);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_inputs_give_empty_catalog() {
        let cat = SourceTables::default().merge(&MergeOptions::default());
        assert!(cat.is_empty());
    }
}

//! Source adapters: one raw spreadsheet shape in, one keyed table out.
//!
//! Each adapter is just a *layout* (header offset + column positions) that
//! implements [`SourceAdapter`]. The shared [`SourceAdapter::adapt`] walks the
//! data rows, normalizes the key column, drops rows without a usable key and
//! keeps the first row seen for each key. Cells that fail numeric coercion
//! become `None` and are counted in the [`AdaptReport`]; they never abort the
//! load.
//!
//! Different exports of the same source only differ in their layout, so a new
//! export format is a config change, not new code.

pub mod price;
pub mod stock;
pub mod substitutes;
pub mod threshold;

use indexmap::{IndexMap, map::Entry};
use serde::{Deserialize, Serialize};

use crate::{
    key::ItemKey,
    source::SourceKind,
    table::{Cell, RawTable, cell},
};

pub use price::{PriceLayout, PriceRow};
pub use stock::{StockLayout, StockRow};
pub use substitutes::{SUBSTITUTE_SLOTS, SubstituteRow, SubstitutesLayout};
pub use threshold::{ThresholdLayout, ThresholdRow};

/// Layouts for all four sources, as configured.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceLayouts {
    /// Stock summary layout.
    pub stock: StockLayout,
    /// Price list layout.
    pub price: PriceLayout,
    /// Condition list layout.
    pub threshold: ThresholdLayout,
    /// Substitute sheet layout.
    pub substitutes: SubstitutesLayout,
}

/// Counters describing what an adapter had to clean up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdaptReport {
    /// Data rows looked at (header rows excluded).
    pub rows_seen: usize,
    /// Rows that were blank from end to end.
    pub blank_rows: usize,
    /// Non-blank rows whose key column held no digits.
    pub rows_without_key: usize,
    /// Rows dropped because an earlier row already claimed the key.
    pub duplicate_keys: usize,
    /// Non-blank value cells that could not be coerced to a number.
    pub coercion_failures: usize,
}

/// A source table keyed by normalized item number, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Adapted<V> {
    /// Which source produced this table.
    pub kind: SourceKind,
    /// One entry per distinct key; first row wins.
    pub rows: IndexMap<ItemKey, V>,
    /// Cleanup counters.
    pub report: AdaptReport,
}

impl<V> Adapted<V> {
    /// An empty table for `kind`.
    pub fn empty(kind: SourceKind) -> Self {
        Self {
            kind,
            rows: IndexMap::new(),
            report: AdaptReport::default(),
        }
    }

    /// Value for `key`, if the source had a row for it.
    pub fn get(&self, key: &ItemKey) -> Option<&V> {
        self.rows.get(key)
    }

    /// Keys in source order.
    pub fn keys(&self) -> impl Iterator<Item = &ItemKey> {
        self.rows.keys()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no row survived adaptation.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Converts one raw table shape into an [`Adapted`] table.
pub trait SourceAdapter {
    /// Source-specific value columns.
    type Value;

    /// Which source this adapter reads.
    const KIND: SourceKind;

    /// Leading rows to skip before data starts.
    fn header_rows(&self) -> usize;

    /// Column holding the item number.
    fn key_column(&self) -> usize;

    /// Pull the value columns out of one data row.
    fn extract(&self, row: &[Cell], report: &mut AdaptReport) -> Self::Value;

    /// Adapt a whole table.
    fn adapt(&self, raw: &RawTable) -> Adapted<Self::Value> {
        let mut out = Adapted::empty(Self::KIND);
        let report = &mut out.report;

        for row in raw.data_rows(self.header_rows()) {
            report.rows_seen += 1;
            if row.iter().all(Cell::is_blank) {
                report.blank_rows += 1;
                continue;
            }

            let key = cell(row, self.key_column()).to_key();
            if key.is_empty() {
                report.rows_without_key += 1;
                continue;
            }

            match out.rows.entry(key) {
                Entry::Occupied(_) => report.duplicate_keys += 1,
                Entry::Vacant(slot) => {
                    slot.insert(self.extract(row, report));
                }
            }
        }

        tracing::debug!(kind = %Self::KIND, keys = out.rows.len(), report = ?out.report, "adapted source");
        out
    }
}

/// Numeric value of `row[col]`; blank is absent, garbage is absent and counted.
pub(crate) fn number_at(row: &[Cell], col: usize, report: &mut AdaptReport) -> Option<f64> {
    let c = cell(row, col);
    if c.is_blank() {
        return None;
    }
    let n = c.to_number();
    if n.is_none() {
        report.coercion_failures += 1;
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    struct KeyOnly;

    impl SourceAdapter for KeyOnly {
        type Value = Option<f64>;
        const KIND: SourceKind = SourceKind::Price;

        fn header_rows(&self) -> usize {
            1
        }
        fn key_column(&self) -> usize {
            0
        }
        fn extract(&self, row: &[Cell], report: &mut AdaptReport) -> Option<f64> {
            number_at(row, 1, report)
        }
    }

    #[test]
    fn first_row_wins_and_bad_rows_are_counted() {
        let raw = RawTable::from_text_rows(vec![
            vec!["ITEM NO.", "Rate"],
            vec!["4521", "10"],
            vec!["", ""],
            vec!["Grand Total", "999"],
            vec!["4521.0", "11"],
            vec!["4522", "n/a"],
        ]);
        let t = KeyOnly.adapt(&raw);

        assert_eq!(t.len(), 2);
        assert_eq!(t.get(&ItemKey::parse("4521")), Some(&Some(10.0)));
        assert_eq!(t.get(&ItemKey::parse("4522")), Some(&None));
        assert_eq!(
            t.report,
            AdaptReport {
                rows_seen: 5,
                blank_rows: 1,
                rows_without_key: 1,
                duplicate_keys: 1,
                coercion_failures: 1,
            }
        );
    }
}

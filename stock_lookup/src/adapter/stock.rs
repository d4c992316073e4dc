//! Stock summary adapter.
//!
//! The accounting export starts with a block of report headers, then one row
//! per item: item number, quantity (often with a unit such as `"200 pcs"`),
//! rate and stock value. Quantities are counted in packing units; the
//! business quantity is `units * quantity_multiplier`, applied here and
//! nowhere else.

use serde::{Deserialize, Serialize};

use super::{AdaptReport, SourceAdapter, number_at};
use crate::{source::SourceKind, table::Cell};

/// Packing units to business quantity.
pub const DEFAULT_QUANTITY_MULTIPLIER: f64 = 100.0;

/// Where things sit in the stock export.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StockLayout {
    /// Report header rows before the first item.
    pub header_rows: usize,
    /// Item number column.
    pub key_column: usize,
    /// Quantity column (text, may carry a unit suffix).
    pub quantity_column: usize,
    /// Rate column, if the export carries one.
    pub rate_column: Option<usize>,
    /// Stock value column, if the export carries one.
    pub value_column: Option<usize>,
    /// Scale applied to the raw unit count.
    pub quantity_multiplier: f64,
}

impl Default for StockLayout {
    fn default() -> Self {
        Self {
            header_rows: 9,
            key_column: 0,
            quantity_column: 1,
            rate_column: Some(2),
            value_column: Some(3),
            quantity_multiplier: DEFAULT_QUANTITY_MULTIPLIER,
        }
    }
}

/// Value columns of one stock row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StockRow {
    /// Scaled quantity; `None` when the cell was blank or not a number.
    pub quantity: Option<f64>,
    /// Unit rate from the stock export.
    pub rate: Option<f64>,
    /// Stock value from the stock export.
    pub value: Option<f64>,
}

impl SourceAdapter for StockLayout {
    type Value = StockRow;
    const KIND: SourceKind = SourceKind::Stock;

    fn header_rows(&self) -> usize {
        self.header_rows
    }

    fn key_column(&self) -> usize {
        self.key_column
    }

    fn extract(&self, row: &[Cell], report: &mut AdaptReport) -> StockRow {
        let units = number_at(row, self.quantity_column, report);
        StockRow {
            quantity: units.map(|u| u * self.quantity_multiplier),
            rate: self.rate_column.and_then(|c| number_at(row, c, report)),
            value: self.value_column.and_then(|c| number_at(row, c, report)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{key::ItemKey, table::RawTable};

    fn export(rows: Vec<Vec<&str>>) -> RawTable {
        let mut all = vec![vec!["Stock Summary"]; 9];
        all.extend(rows);
        RawTable::from_text_rows(all)
    }

    #[test]
    fn strips_units_and_scales_once() {
        let raw = export(vec![
            vec!["4521 Wedding Card", "200 pcs", "12.50", "2500"],
            vec!["4522", "0 pcs", "", ""],
            vec!["4523", "", "3", ""],
        ]);
        let t = StockLayout::default().adapt(&raw);

        let r = t.get(&ItemKey::parse("4521")).unwrap();
        assert_eq!(r.quantity, Some(20_000.0));
        assert_eq!(r.rate, Some(12.5));
        assert_eq!(r.value, Some(2500.0));

        assert_eq!(t.get(&ItemKey::parse("4522")).unwrap().quantity, Some(0.0));
        // blank quantity stays absent, it does not turn into zero
        assert_eq!(t.get(&ItemKey::parse("4523")).unwrap().quantity, None);
        assert_eq!(t.report.coercion_failures, 0);
    }

    #[test]
    fn header_block_is_skipped() {
        let raw = export(vec![vec!["77", "1"]]);
        let t = StockLayout::default().adapt(&raw);
        assert_eq!(t.len(), 1);
        assert_eq!(t.report.rows_seen, 1);
    }

    #[test]
    fn dated_preamble_line_never_becomes_an_item() {
        // column header row plus eight report rows, blank lines in between
        let raw = RawTable::from_text_rows(vec![
            vec!["Particulars", "Quantity", "Rate", "Value"],
            vec!["Shop"],
            vec!["12 Market Road"],
            vec![""],
            vec!["Stock Summary"],
            vec!["Godown: Main"],
            vec![""],
            vec!["Group: All"],
            vec!["Closing Balance"],
            vec!["", "Quantity", "Rate", "Value"],
            vec!["1-Apr-24 to 10-Sep-24"],
            vec![""],
            vec!["4521 Wedding Card", "200 pcs", "12.50", "2500"],
        ]);
        let t = StockLayout::default().adapt(&raw);

        let keys: Vec<&str> = t.keys().map(ItemKey::as_str).collect();
        assert_eq!(keys, vec!["4521"]);
        assert_eq!(t.report.blank_rows, 1);
    }

    #[test]
    fn custom_multiplier_and_columns() {
        let layout = StockLayout {
            header_rows: 1,
            key_column: 1,
            quantity_column: 0,
            rate_column: None,
            value_column: None,
            quantity_multiplier: 12.0,
        };
        let raw = RawTable::from_text_rows(vec![vec!["Qty", "Item"], vec!["2 box", "900"]]);
        let t = layout.adapt(&raw);
        assert_eq!(
            t.get(&ItemKey::parse("900")),
            Some(&StockRow {
                quantity: Some(24.0),
                rate: None,
                value: None
            })
        );
    }

    #[test]
    fn garbage_quantity_is_absent_and_counted() {
        let raw = export(vec![vec!["10", "lots"]]);
        let t = StockLayout::default().adapt(&raw);
        assert_eq!(t.get(&ItemKey::parse("10")).unwrap().quantity, None);
        assert_eq!(t.report.coercion_failures, 1);
    }
}

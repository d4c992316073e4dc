//! Price list adapter.

use serde::{Deserialize, Serialize};

use super::{AdaptReport, SourceAdapter, number_at};
use crate::{source::SourceKind, table::Cell};

/// Where things sit in the price list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PriceLayout {
    /// Header rows before the first item.
    pub header_rows: usize,
    /// Item number column.
    pub key_column: usize,
    /// Price column.
    pub price_column: usize,
}

impl Default for PriceLayout {
    fn default() -> Self {
        Self {
            header_rows: 1,
            key_column: 0,
            price_column: 1,
        }
    }
}

/// Value columns of one price row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PriceRow {
    /// Listed price, absent when blank or unparseable.
    pub price: Option<f64>,
}

impl SourceAdapter for PriceLayout {
    type Value = PriceRow;
    const KIND: SourceKind = SourceKind::Price;

    fn header_rows(&self) -> usize {
        self.header_rows
    }

    fn key_column(&self) -> usize {
        self.key_column
    }

    fn extract(&self, row: &[Cell], report: &mut AdaptReport) -> PriceRow {
        PriceRow {
            price: number_at(row, self.price_column, report),
        }
    }
}

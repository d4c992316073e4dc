//! Minimum-stock condition adapter.

use serde::{Deserialize, Serialize};

use super::{AdaptReport, SourceAdapter, number_at};
use crate::{source::SourceKind, table::Cell};

/// Where things sit in the condition list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdLayout {
    /// Header rows before the first item.
    pub header_rows: usize,
    /// Item number column.
    pub key_column: usize,
    /// Minimum-stock condition column.
    pub threshold_column: usize,
}

impl Default for ThresholdLayout {
    fn default() -> Self {
        Self {
            header_rows: 1,
            key_column: 0,
            threshold_column: 1,
        }
    }
}

/// Value columns of one condition row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ThresholdRow {
    /// Configured floor; `None` means "no threshold configured".
    pub threshold: Option<f64>,
}

impl SourceAdapter for ThresholdLayout {
    type Value = ThresholdRow;
    const KIND: SourceKind = SourceKind::Threshold;

    fn header_rows(&self) -> usize {
        self.header_rows
    }

    fn key_column(&self) -> usize {
        self.key_column
    }

    fn extract(&self, row: &[Cell], report: &mut AdaptReport) -> ThresholdRow {
        ThresholdRow {
            threshold: number_at(row, self.threshold_column, report),
        }
    }
}

//! Substitute mapping adapter.
//!
//! Each row names an item and up to [`SUBSTITUTE_SLOTS`] alternates. Every
//! slot is normalized like any other key; blank or digit-less slots become
//! the empty key and stay in place so slot positions are preserved. Filtering
//! happens in [`crate::substitutes`].

use serde::{Deserialize, Serialize};

use super::{AdaptReport, SourceAdapter};
use crate::{
    key::ItemKey,
    source::SourceKind,
    table::{Cell, cell},
};

/// Fixed number of substitute slots in the mapping sheet.
pub const SUBSTITUTE_SLOTS: usize = 3;

/// Where things sit in the substitute sheet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubstitutesLayout {
    /// Header rows before the first item.
    pub header_rows: usize,
    /// Item number column.
    pub key_column: usize,
    /// Substitute columns in priority order (at most [`SUBSTITUTE_SLOTS`]).
    pub substitute_columns: Vec<usize>,
}

impl Default for SubstitutesLayout {
    fn default() -> Self {
        Self {
            header_rows: 1,
            key_column: 0,
            substitute_columns: vec![1, 2, 3],
        }
    }
}

/// Raw substitute slots of one row, normalized but not filtered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubstituteRow {
    /// One key per configured column; empty keys mark blank slots.
    pub slots: Vec<ItemKey>,
}

impl SourceAdapter for SubstitutesLayout {
    type Value = SubstituteRow;
    const KIND: SourceKind = SourceKind::Substitutes;

    fn header_rows(&self) -> usize {
        self.header_rows
    }

    fn key_column(&self) -> usize {
        self.key_column
    }

    fn extract(&self, row: &[Cell], _report: &mut AdaptReport) -> SubstituteRow {
        let slots = self
            .substitute_columns
            .iter()
            .take(SUBSTITUTE_SLOTS)
            .map(|&col| cell(row, col).to_key())
            .collect();
        SubstituteRow { slots }
    }
}

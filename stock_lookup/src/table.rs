//! Raw tabular input as handed over by whatever reads the spreadsheets.
//!
//! A [`RawTable`] is just rows of [`Cell`]s: no header detection, no typing.
//! Header offsets and column positions live in the adapter layouts.

use std::borrow::Cow;

use crate::key::{self, ItemKey};

/// One spreadsheet cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    /// Blank cell.
    #[default]
    Empty,
    /// Text as exported.
    Text(String),
    /// Numeric cell (spreadsheet readers usually hand out floats).
    Number(f64),
}

impl Cell {
    /// Text form of the cell, the way a spreadsheet would print it.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Cell::Empty => Cow::Borrowed(""),
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
            Cell::Number(n) => Cow::Owned(n.to_string()),
        }
    }

    /// True for blank cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Normalized item key held by this cell (possibly empty).
    pub fn to_key(&self) -> ItemKey {
        key::normalize(&self.as_text())
    }

    /// Numeric value of the cell, or `None` when it cannot be coerced.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Number(_) => None,
            Cell::Text(s) => parse_number(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        if s.is_empty() { Cell::Empty } else { Cell::Text(s) }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Number(n as f64)
    }
}

/// Ordered rows of cells, header rows included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Wrap already-split rows.
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Build a table from string rows (blank strings become [`Cell::Empty`]).
    pub fn from_text_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|r| {
                r.into_iter()
                    .map(|s| {
                        let s: String = s.into();
                        Cell::from(s)
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// All rows, header rows included.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Rows after the first `header_rows` non-blank rows.
    ///
    /// Blank rows inside the header block do not count towards it, matching
    /// how spreadsheet readers drop empty rows before applying an offset.
    /// Blank rows after the header block are returned as-is.
    pub fn data_rows(&self, header_rows: usize) -> &[Vec<Cell>] {
        if header_rows == 0 {
            return &self.rows;
        }
        let mut seen = 0;
        for (i, row) in self.rows.iter().enumerate() {
            if row.iter().all(Cell::is_blank) {
                continue;
            }
            seen += 1;
            if seen == header_rows {
                return &self.rows[i + 1..];
            }
        }
        &[]
    }

    /// Number of rows, header rows included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows at all.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Cell at `col` in `row`, treating short rows as blank.
pub(crate) fn cell(row: &[Cell], col: usize) -> &Cell {
    static EMPTY: Cell = Cell::Empty;
    row.get(col).unwrap_or(&EMPTY)
}

/// Coerce exported text into a number.
///
/// Accepts surrounding whitespace, thousands separators and a trailing unit
/// (`"200 pcs"`, `"1,250.50 Nos"`). Returns `None` when no numeric literal
/// leads the text or when it is immediately followed by more digits-like
/// garbage such as a second decimal point.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    let bytes = cleaned.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    let mut seen_dot = false;
    let mut seen_digit = false;
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit || end == digits_start {
        return None;
    }

    // A unit may follow the literal, another number may not.
    let rest = &cleaned[end..];
    if rest.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }

    cleaned[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

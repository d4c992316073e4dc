//! Loading the four spreadsheet exports from disk.
//!
//! Sources arrive as delimited text (CSV, or TSV for `.tsv`/`.tab` files).
//! A file that cannot be read or split into rows at all is a [`SourceError`]
//! and aborts the rebuild; everything finer-grained is left to the adapters,
//! which degrade single bad cells to "absent".

mod delimited;

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    time::SystemTime,
};

use serde::Serialize;
use thiserror::Error;

use crate::table::RawTable;

pub use delimited::{ParseError, parse_rows};

/// The four known source shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Stock summary: item number and physical unit count.
    Stock,
    /// Price list.
    Price,
    /// Minimum-stock conditions.
    Threshold,
    /// Up to three substitute item numbers per item.
    Substitutes,
}

impl SourceKind {
    /// All kinds in load order.
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Stock,
        SourceKind::Price,
        SourceKind::Threshold,
        SourceKind::Substitutes,
    ];
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceKind::Stock => "stock",
            SourceKind::Price => "price",
            SourceKind::Threshold => "threshold",
            SourceKind::Substitutes => "substitutes",
        };
        f.write_str(s)
    }
}

/// A source could not be loaded at all.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file does not exist.
    #[error("{kind} source not found: {}", path.display())]
    Missing {
        /// Which source.
        kind: SourceKind,
        /// Configured path.
        path: PathBuf,
    },

    /// The file exists but reading it failed.
    #[error("failed to read {kind} source {}", path.display())]
    Io {
        /// Which source.
        kind: SourceKind,
        /// Configured path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file was read but is not parseable delimited text.
    #[error("{kind} source {} is malformed at line {line}: {reason}", path.display())]
    Malformed {
        /// Which source.
        kind: SourceKind,
        /// Configured path.
        path: PathBuf,
        /// 1-based line where parsing gave up.
        line: usize,
        /// What went wrong.
        reason: String,
    },
}

impl SourceError {
    /// Which source failed.
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceError::Missing { kind, .. }
            | SourceError::Io { kind, .. }
            | SourceError::Malformed { kind, .. } => *kind,
        }
    }
}

/// Field separator for a path, by extension.
fn separator_for(path: &Path) -> char {
    match path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .as_deref()
    {
        Some("tsv" | "tab") => '\t',
        _ => ',',
    }
}

/// Read and split one source file.
pub fn load_table(kind: SourceKind, path: &Path) -> Result<RawTable, SourceError> {
    let bytes = fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            SourceError::Missing {
                kind,
                path: path.to_path_buf(),
            }
        } else {
            SourceError::Io {
                kind,
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let text = String::from_utf8(bytes).map_err(|e| SourceError::Malformed {
        kind,
        path: path.to_path_buf(),
        line: 1 + line_of_offset(e.as_bytes(), e.utf8_error().valid_up_to()),
        reason: "invalid UTF-8".to_string(),
    })?;
    // Spreadsheet exports on Windows like to start with a BOM.
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let rows = parse_rows(text, separator_for(path)).map_err(|e| SourceError::Malformed {
        kind,
        path: path.to_path_buf(),
        line: e.line,
        reason: e.reason.to_string(),
    })?;

    tracing::debug!(%kind, path = %path.display(), rows = rows.len(), "loaded source");
    Ok(RawTable::from_text_rows(rows))
}

fn line_of_offset(bytes: &[u8], offset: usize) -> usize {
    bytes[..offset.min(bytes.len())]
        .iter()
        .filter(|b| **b == b'\n')
        .count()
}

/// Last modification time of a source file, if it can be read.
pub fn modified_at(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let p = dir.path().join(name);
        let mut f = fs::File::create(&p).unwrap();
        f.write_all(contents).unwrap();
        p
    }

    #[test]
    fn loads_csv_with_bom_and_blank_cells() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "price.csv", "\u{feff}ITEM NO.,Rate\n4521,12.5\n4522,\n".as_bytes());
        let t = load_table(SourceKind::Price, &p).unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.rows()[0][0].as_text(), "ITEM NO.");
        assert!(t.rows()[2][1].is_blank());
    }

    #[test]
    fn tsv_extension_switches_separator() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "alt.tsv", b"ITEM NO.\tAlt1\n10\t20\n");
        let t = load_table(SourceKind::Substitutes, &p).unwrap();
        assert_eq!(t.rows()[1][1].as_text(), "20");
    }

    #[test]
    fn missing_file_is_reported_with_kind() {
        let dir = TempDir::new().unwrap();
        let err = load_table(SourceKind::Stock, &dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, SourceError::Missing { kind: SourceKind::Stock, .. }));
        assert!(err.to_string().contains("stock source not found"));
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "stock.csv", b"a,b\n\xff\xfe,1\n");
        let err = load_table(SourceKind::Stock, &p).unwrap_err();
        match err {
            SourceError::Malformed { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unterminated_quote_is_malformed() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "threshold.csv", b"ITEM NO.,CONDITION\n\"4521,100\n");
        let err = load_table(SourceKind::Threshold, &p).unwrap_err();
        assert_eq!(err.kind(), SourceKind::Threshold);
        assert!(err.to_string().contains("malformed"));
    }
}

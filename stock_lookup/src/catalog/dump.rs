//! Flat CSV dump of a merged catalog, for audit and debugging.
//!
//! Best effort only: [`spawn_dump`] writes on a detached thread and logs
//! failures instead of returning them, so nothing on the lookup path ever
//! waits for or fails because of the dump.
//!
//! Every dump goes to a temporary file next to the target and is renamed
//! into place, so readers only ever see a complete file. Concurrent dumps to
//! the same path are serialized, and a snapshot older than the one already
//! written is skipped.

use std::{
    collections::HashMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    thread,
};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use tempfile::NamedTempFile;

use super::{Catalog, CatalogRecord, CatalogSnapshot};
use crate::adapter::SUBSTITUTE_SLOTS;

/// Column headers of the dump.
pub const HEADERS: [&str; 10] = [
    "ITEM NO.", "Quantity", "Price", "Rate", "Value", "CONDITION", "Alt1", "Alt2", "Alt3",
    "Status",
];

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_row<W: Write>(mut w: W, row: &[String]) -> io::Result<()> {
    for (i, field) in row.iter().enumerate() {
        if i > 0 {
            w.write_all(b",")?;
        }
        if needs_quotes(field) {
            write!(w, "\"{}\"", field.replace('"', "\"\""))?;
        } else {
            w.write_all(field.as_bytes())?;
        }
    }
    writeln!(w)
}

fn num(v: Option<f64>) -> String {
    v.map(|n| n.to_string()).unwrap_or_default()
}

fn record_row(r: &CatalogRecord) -> Vec<String> {
    let mut row = vec![
        r.key.to_string(),
        num(r.quantity),
        num(r.price),
        num(r.rate),
        num(r.stock_value),
        num(r.threshold),
    ];
    for slot in 0..SUBSTITUTE_SLOTS {
        row.push(r.substitutes.get(slot).map(|k| k.to_string()).unwrap_or_default());
    }
    row.push(r.status().label().to_string());
    row
}

/// Write the dump to any writer, header line first, records in key order.
pub fn write_catalog<W: Write>(mut w: W, catalog: &Catalog) -> io::Result<()> {
    let header: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    write_row(&mut w, &header)?;
    for r in catalog.iter() {
        write_row(&mut w, &record_row(r))?;
    }
    Ok(())
}

/// Render the dump into a string.
pub fn render(catalog: &Catalog) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_catalog(&mut buf, catalog);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Write the dump to `path`, creating the parent directory if needed.
///
/// The text is written to a temporary sibling first and renamed over `path`.
pub fn write_dump(catalog: &Catalog, path: &Path) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut w = io::BufWriter::new(tmp.as_file_mut());
        write_catalog(&mut w, catalog)?;
        w.flush()?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// `built_at` of the newest snapshot dumped per target path.
static LAST_DUMPED: Lazy<Mutex<HashMap<PathBuf, DateTime<Utc>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Dump `snapshot` unless a newer one already went to `path`.
///
/// Returns whether the file was written.
pub(crate) fn dump_snapshot(snapshot: &CatalogSnapshot, path: &Path) -> io::Result<bool> {
    let mut last = LAST_DUMPED.lock().unwrap_or_else(|e| e.into_inner());
    if last.get(path).is_some_and(|t| *t > snapshot.built_at) {
        return Ok(false);
    }
    write_dump(&snapshot.catalog, path)?;
    last.insert(path.to_path_buf(), snapshot.built_at);
    Ok(true)
}

/// Fire-and-forget dump of a published snapshot.
pub fn spawn_dump(snapshot: Arc<CatalogSnapshot>, path: PathBuf) {
    let spawned = thread::Builder::new()
        .name("catalog-dump".into())
        .spawn(move || match dump_snapshot(&snapshot, &path) {
            Ok(true) => tracing::debug!(path = %path.display(), "wrote catalog dump"),
            Ok(false) => tracing::debug!(path = %path.display(), "skipped stale catalog dump"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "catalog dump failed"),
        });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "could not start catalog dump thread");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ItemKey;
    use tempfile::TempDir;

    fn sample() -> Catalog {
        Catalog::from_records([
            CatalogRecord {
                key: ItemKey::parse("4521"),
                quantity: Some(20_000.0),
                threshold: Some(15_000.0),
                price: Some(12.5),
                rate: Some(12.5),
                stock_value: Some(2500.0),
                substitutes: vec![ItemKey::parse("4600"), ItemKey::empty(), ItemKey::parse("4700")],
            },
            CatalogRecord {
                key: ItemKey::parse("4600"),
                ..Default::default()
            },
        ])
    }

    #[test]
    fn dump_text() {
        insta::assert_snapshot!(render(&sample()), @r"
        ITEM NO.,Quantity,Price,Rate,Value,CONDITION,Alt1,Alt2,Alt3,Status
        4521,20000,12.5,12.5,2500,15000,4600,,4700,In Stock
        4600,,,,,,,,,Out of Stock
        ");
    }

    #[test]
    fn quotes_fields_that_need_it() {
        let mut buf = Vec::new();
        write_row(&mut buf, &["a,b".to_string(), "say \"x\"".into(), "plain".into()]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "\"a,b\",\"say \"\"x\"\"\",plain\n");
    }

    #[test]
    fn write_dump_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit").join("master.csv");
        write_dump(&sample(), &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("ITEM NO.,"));
        assert_eq!(text.lines().count(), 3);
    }

    fn snapshot_at(catalog: Catalog, built_at: DateTime<Utc>) -> CatalogSnapshot {
        CatalogSnapshot {
            catalog,
            built_at,
            stamp: Default::default(),
            reports: Default::default(),
        }
    }

    fn numbered(n: usize) -> Catalog {
        Catalog::from_records((1..=n).map(|i| CatalogRecord {
            key: ItemKey::parse(&i.to_string()),
            quantity: Some(i as f64),
            ..Default::default()
        }))
    }

    #[test]
    fn concurrent_dumps_leave_one_whole_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("master.csv");
        let sizes = [500, 2000, 50, 1200];

        thread::scope(|s| {
            for n in sizes {
                let path = &path;
                s.spawn(move || write_dump(&numbered(n), path).unwrap());
            }
        });

        let text = fs::read_to_string(&path).unwrap();
        assert!(sizes.iter().any(|n| text == render(&numbered(*n))));
        // no temporary files left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn older_snapshot_does_not_overwrite_newer_dump() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("master.csv");
        let now = Utc::now();
        let newer = snapshot_at(numbered(2), now);
        let older = snapshot_at(numbered(5), now - chrono::Duration::seconds(10));

        assert!(dump_snapshot(&newer, &path).unwrap());
        assert!(!dump_snapshot(&older, &path).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), render(&newer.catalog));
    }

    #[test]
    fn unwritable_target_is_an_error_not_a_panic() {
        let dir = TempDir::new().unwrap();
        // the target is an existing directory
        assert!(write_dump(&sample(), dir.path()).is_err());
    }
}

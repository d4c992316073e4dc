//! Engine configuration: parsing, normalization, and loading.
//!
//! A TOML file names the four source exports, optionally overrides their
//! column layouts, and configures the image folder, merge options and lookup
//! display policy:
//!
//! ```toml
//! dump_path = "out/master.csv"
//!
//! [sources]
//! stock = "data/stock.csv"
//! price = "data/price.csv"
//! threshold = "data/condition.csv"
//! substitutes = "data/alt.csv"
//!
//! [layout.stock]
//! header_rows = 9
//! quantity_multiplier = 100.0
//!
//! [assets]
//! root = "static"
//! extensions = ["jpg", ".PNG"]
//!
//! [lookup]
//! substitute_filter = "hide_out_of_stock"
//! ```
//!
//! Key behaviors:
//! - Extensions are trimmed, lowercased, stripped of a leading dot and
//!   de-duplicated while preserving order.
//! - Substitute columns are de-duplicated; more than three is an error.
//! - A non-positive or non-finite quantity multiplier is an error.
//! - [`load_config_path`] resolves relative paths against the config file's
//!   directory.
//!
//! Entrypoints:
//! - Parse + normalize from a TOML string: [`load_config_str`]
//! - Parse + normalize from a file path: [`load_config_path`]

use std::{
    collections::HashSet,
    mem,
    path::{Path, PathBuf},
};

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use toml::from_str;

use crate::{
    adapter::{SUBSTITUTE_SLOTS, SourceLayouts},
    assets::AssetConfig,
    catalog::{MergeOptions, SourcePaths},
    substitutes::SubstituteFilter,
};

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// The four source exports.
    pub sources: SourcePaths,
    /// Column layouts; every field has a default.
    #[serde(default)]
    pub layout: SourceLayouts,
    /// Image folder.
    #[serde(default)]
    pub assets: AssetConfig,
    /// Merge options.
    #[serde(default)]
    pub merge: MergeOptions,
    /// Query display options.
    #[serde(default)]
    pub lookup: LookupConfig,
    /// Audit dump written after every successful rebuild.
    #[serde(default)]
    pub dump_path: Option<PathBuf>,
}

/// `[lookup]` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LookupConfig {
    /// Which substitutes a front-end shows.
    pub substitute_filter: SubstituteFilter,
}

/// Summary of changes performed during normalization.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConfigNormalizationReport {
    /// Extensions whose spelling changed (case, dot, whitespace).
    pub extensions_rewritten: usize,
    /// Duplicate extensions removed after rewriting.
    pub extensions_deduped: usize,
    /// Duplicate substitute columns removed.
    pub substitute_columns_deduped: usize,
}

/// Normalize a config in place.
///
/// Errors:
/// - An extension that is empty after trimming, or no extension at all
/// - More than three substitute columns
/// - A quantity multiplier that is not a positive finite number
pub fn normalize_config(cfg: &mut EngineConfig) -> anyhow::Result<ConfigNormalizationReport> {
    let mut report = ConfigNormalizationReport::default();

    let mut seen = HashSet::new();
    let mut extensions = Vec::with_capacity(cfg.assets.extensions.len());
    for raw in mem::take(&mut cfg.assets.extensions) {
        let ext = raw.trim().trim_start_matches('.').to_ascii_lowercase();
        if ext.is_empty() {
            bail!("asset extension cannot be empty after trimming: {raw:?}");
        }
        if ext != raw {
            report.extensions_rewritten += 1;
        }
        if seen.insert(ext.clone()) {
            extensions.push(ext);
        } else {
            report.extensions_deduped += 1;
        }
    }
    if extensions.is_empty() {
        bail!("assets.extensions must name at least one extension");
    }
    cfg.assets.extensions = extensions;

    let columns = &mut cfg.layout.substitutes.substitute_columns;
    let before = columns.len();
    let mut seen = HashSet::new();
    columns.retain(|c| seen.insert(*c));
    report.substitute_columns_deduped = before - columns.len();
    if columns.len() > SUBSTITUTE_SLOTS {
        bail!(
            "layout.substitutes.substitute_columns has {} columns, at most {SUBSTITUTE_SLOTS} allowed",
            columns.len()
        );
    }

    let m = cfg.layout.stock.quantity_multiplier;
    if !m.is_finite() || m <= 0.0 {
        bail!("layout.stock.quantity_multiplier must be a positive number, got {m}");
    }

    Ok(report)
}

/// Parse and normalize a config from a TOML string.
///
/// Relative paths are left as written.
pub fn load_config_str(toml_str: &str) -> anyhow::Result<EngineConfig> {
    let mut cfg: EngineConfig = from_str(toml_str).context("failed to parse config TOML")?;
    let report = normalize_config(&mut cfg).context("normalize_config failed")?;
    if report != ConfigNormalizationReport::default() {
        tracing::debug!(?report, "normalized config");
    }
    Ok(cfg)
}

/// Read a config file, parse and normalize it, and resolve relative paths
/// against the file's directory.
pub fn load_config_path(path: impl AsRef<Path>) -> anyhow::Result<EngineConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    let mut cfg =
        load_config_str(&text).with_context(|| format!("load config {}", path.display()))?;

    if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        cfg.rebase(base);
    }
    Ok(cfg)
}

impl EngineConfig {
    /// Resolve every relative path (sources, asset root, dump) against `base`.
    pub fn rebase(&mut self, base: &Path) {
        self.sources.rebase(base);
        if self.assets.root.is_relative() {
            self.assets.root = base.join(&self.assets.root);
        }
        if let Some(dump) = self.dump_path.as_mut().filter(|p| p.is_relative()) {
            *dump = base.join(&*dump);
        }
    }
}

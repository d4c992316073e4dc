//! Locating product images whose filenames only loosely follow item keys.
//!
//! Image folders hold `12345.jpg`, but also `012345.png` or
//! `item_012345 front v2.JPG`. Resolution runs in two phases:
//!
//! 1. fast path: `{key}.{ext}` directly under the root, for each accepted
//!    extension in lower and upper case
//! 2. fallback: enumerate every accepted image under the root ([`AssetIndex`]),
//!    score each against the key ([`score`]) and keep the best one
//!
//! Lower score wins; ties go to the shortest path string, then to the
//! lexicographically smallest, so the answer never depends on directory
//! iteration order. A missing root simply yields no candidates.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::{DirEntry, WalkDir};

use crate::key::{self, ItemKey};

/// Extensions accepted when no configuration says otherwise.
pub const DEFAULT_EXTENSIONS: [&str; 3] = ["jpeg", "jpg", "png"];

/// Image folder settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetConfig {
    /// Folder searched (recursively) for item images.
    pub root: PathBuf,
    /// Accepted extensions, lowercase, without the leading dot.
    pub extensions: Vec<String>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("static"),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// How confidently a candidate file matches a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchScore {
    /// Stem is exactly the key.
    Exact = 0,
    /// Stem's digit run is the key, with padding zeros or text around it.
    Embedded = 1,
    /// Key digits appear somewhere inside the stem's digit run.
    Partial = 2,
}

/// Score `candidate` against `key`; `None` means no match at all.
pub fn score(key: &ItemKey, candidate: &Path) -> Option<MatchScore> {
    if key.is_empty() {
        return None;
    }
    let stem = candidate.file_stem()?.to_string_lossy();
    let run = key::first_digit_run(&stem)?;

    if key::normalize(run) == *key {
        if stem == key.as_str() {
            Some(MatchScore::Exact)
        } else {
            Some(MatchScore::Embedded)
        }
    } else if run.contains(key.as_str()) {
        Some(MatchScore::Partial)
    } else {
        None
    }
}

/// Enumerated image candidates under one root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetIndex {
    candidates: Vec<PathBuf>,
}

impl AssetIndex {
    /// Use a fixed candidate list (no filesystem access). Extensions are not
    /// re-checked here.
    pub fn from_candidates(candidates: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            candidates: candidates.into_iter().collect(),
        }
    }

    /// Walk `root` recursively and keep files with an accepted extension.
    ///
    /// Hidden entries (dot-files, `.git` and the like) are skipped; entries
    /// that cannot be read are logged and skipped.
    pub fn scan(root: &Path, extensions: &[String]) -> Self {
        if !root.is_dir() {
            tracing::debug!(root = %root.display(), "asset root missing, no images");
            return Self::default();
        }

        let mut candidates = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
                        candidates.push(entry.into_path());
                    }
                }
                Err(e) => tracing::warn!("skipping unreadable asset entry: {e}"),
            }
        }

        tracing::debug!(root = %root.display(), candidates = candidates.len(), "scanned assets");
        Self { candidates }
    }

    /// All candidates, in enumeration order.
    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Best-scoring candidate for `key`.
    pub fn best_match(&self, key: &ItemKey) -> Option<&Path> {
        self.candidates
            .iter()
            .filter_map(|p| {
                let s = score(key, p)?;
                let text = p.to_string_lossy();
                Some((s, text.len(), text.into_owned(), p))
            })
            .min_by(|a, b| (a.0, a.1, &a.2).cmp(&(b.0, b.1, &b.2)))
            .map(|(_, _, _, p)| p.as_path())
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|e| extensions.iter().any(|x| *x == e))
}

/// Resolves item keys to image paths under one root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResolver {
    root: PathBuf,
    extensions: Vec<String>,
}

impl AssetResolver {
    /// Resolver over `root` accepting `extensions` (lowercase, no dot).
    pub fn new(root: impl Into<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            root: root.into(),
            extensions,
        }
    }

    /// Resolver from the `[assets]` config section.
    pub fn from_config(cfg: &AssetConfig) -> Self {
        Self::new(cfg.root.clone(), cfg.extensions.clone())
    }

    /// Folder searched for images.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fast path: `{key}.{ext}` directly under the root.
    pub fn exact_match(&self, key: &ItemKey) -> Option<PathBuf> {
        if key.is_empty() {
            return None;
        }
        for ext in &self.extensions {
            for variant in [ext.to_ascii_lowercase(), ext.to_ascii_uppercase()] {
                let p = self.root.join(format!("{key}.{variant}"));
                if p.is_file() {
                    return Some(p);
                }
            }
        }
        None
    }

    /// Enumerate every accepted image under the root.
    pub fn scan(&self) -> AssetIndex {
        AssetIndex::scan(&self.root, &self.extensions)
    }

    /// Fast path, then a full scan. Use [`AssetResolver::resolve_with`] to
    /// share one scan between several keys.
    pub fn resolve(&self, key: &ItemKey) -> Option<PathBuf> {
        if let Some(p) = self.exact_match(key) {
            return Some(p);
        }
        self.scan().best_match(key).map(Path::to_path_buf)
    }

    /// Fast path, then the given (lazily built) index.
    pub fn resolve_with<'a>(
        &self,
        key: &ItemKey,
        index: impl FnOnce() -> &'a AssetIndex,
    ) -> Option<PathBuf> {
        if let Some(p) = self.exact_match(key) {
            return Some(p);
        }
        index().best_match(key).map(Path::to_path_buf)
    }
}

/// Resolve `key` under `asset_root` with the default extensions.
pub fn resolve_image(key: &ItemKey, asset_root: &Path) -> Option<PathBuf> {
    let exts = DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect();
    AssetResolver::new(asset_root, exts).resolve(key)
}

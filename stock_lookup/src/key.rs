//! Item key normalization.
//!
//! Every source spells item numbers differently: `"4521"`, `" 4521 "`,
//! `4521.0` (a float that went through a spreadsheet), `"4521 pcs"` or
//! `"ITEM-004521"`. [`normalize`] collapses all of them to one canonical
//! [`ItemKey`]:
//!
//! - take the first maximal run of ASCII digits in the text form of the input
//! - strip leading zeros, unless the run is made of zeros only (kept as-is)
//! - no digits at all yields the empty key, which callers treat as "unmapped"
//!
//! Normalization never fails and is idempotent.

use std::{cmp::Ordering, fmt};

use serde::Serialize;

/// Canonical digits-only identifier of a catalog item.
///
/// The empty key is a valid value meaning "no usable item number"; rows that
/// normalize to it are dropped by the source adapters.
///
/// Keys order numerically (shorter digit strings first), which is also the
/// order catalogs and dumps list items in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemKey(String);

impl Ord for ItemKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for ItemKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl ItemKey {
    /// Normalize arbitrary text into a key. Same as [`normalize`].
    pub fn parse(raw: &str) -> Self {
        normalize(raw)
    }

    /// The empty key.
    pub const fn empty() -> Self {
        Self(String::new())
    }

    /// True when no digits were found in the raw input.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the digit string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ItemKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalize a raw item-number field.
pub fn normalize(raw: &str) -> ItemKey {
    match first_digit_run(raw) {
        Some(run) => ItemKey(strip_leading_zeros(run).to_string()),
        None => ItemKey::empty(),
    }
}

/// First maximal run of ASCII digits in `s`, untouched (leading zeros kept).
pub(crate) fn first_digit_run(s: &str) -> Option<&str> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let rest = &s[start..];
    let len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..len])
}

fn strip_leading_zeros(run: &str) -> &str {
    let trimmed = run.trim_start_matches('0');
    if trimmed.is_empty() { run } else { trimmed }
}

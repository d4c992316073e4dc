//! Stock status derivation.
//!
//! Status is never stored; it is recomputed from `(quantity, threshold)` every
//! time it is needed.

use std::fmt;

use serde::Serialize;

/// Availability class of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    /// Quantity above the configured floor (or no floor configured).
    InStock,
    /// Positive quantity at or below the configured floor.
    LowStock,
    /// No stock row, or nothing left.
    OutOfStock,
}

impl StockStatus {
    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify an item from its (scaled) quantity and minimum-stock threshold.
///
/// 1. absent, zero or negative quantity -> `OutOfStock` (negative stock is an
///    accounting artifact; it is treated like zero rather than as available)
/// 2. no threshold -> `InStock`
/// 3. quantity above threshold -> `InStock`
/// 4. otherwise -> `LowStock` (equal to the threshold counts as low)
///
/// NaN inputs are treated as absent.
///
/// ```
/// use stock_lookup::{StockStatus, classify};
///
/// assert_eq!(classify(Some(-100.0), None), StockStatus::OutOfStock);
/// assert_eq!(classify(Some(15_000.0), Some(15_000.0)), StockStatus::LowStock);
/// ```
pub fn classify(quantity: Option<f64>, threshold: Option<f64>) -> StockStatus {
    let Some(q) = quantity.filter(|q| !q.is_nan()) else {
        return StockStatus::OutOfStock;
    };
    if q <= 0.0 {
        return StockStatus::OutOfStock;
    }
    match threshold.filter(|t| !t.is_nan()) {
        None => StockStatus::InStock,
        Some(t) if q > t => StockStatus::InStock,
        Some(_) => StockStatus::LowStock,
    }
}

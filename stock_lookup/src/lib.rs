//! Catalog reconciliation for a small parts shop.
//!
//! Four spreadsheet exports (stock summary, price list, minimum-stock
//! conditions, substitute sheet) are loaded, cleaned by per-source adapters
//! and left-joined on a normalized item key into one [`Catalog`]. Lookups
//! classify availability, propose substitutes and locate a product image.

#![deny(missing_docs)]

pub mod adapter;
pub mod assets;
pub mod catalog;
pub mod config;
pub mod key;
pub mod lookup;
pub mod source;
pub mod status;
pub mod substitutes;
pub mod table;

pub use assets::{AssetResolver, resolve_image};
pub use catalog::{Catalog, CatalogRecord, CatalogSnapshot, CatalogStore, merge};
pub use config::{EngineConfig, load_config_path, load_config_str};
pub use key::{ItemKey, normalize};
pub use lookup::{ItemReport, Lookup, LookupOutcome};
pub use source::SourceError;
pub use status::{StockStatus, classify};
pub use substitutes::{SubstituteFilter, SubstituteStatus, resolve_substitutes};

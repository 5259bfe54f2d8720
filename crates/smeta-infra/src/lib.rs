//! Infrastructure layer
//!
//! File-backed implementations of the domain collaborator traits.

pub mod catalog_csv;
pub mod price_catalog;

pub use catalog_csv::load_catalog_csv;
pub use price_catalog::{CatalogItem, PriceCatalogLoader};

//! Karaoke catalog matching engine: normalization pipeline plus an in-memory
//! O(1) index resolving (artist, title) pairs from listening-history sources
//! to canonical catalog entries.

pub mod lookup;
pub mod models;
pub mod normalize;
pub mod source;
pub mod stats;

pub use lookup::CatalogLookup;
pub use models::{CatalogEntry, CatalogRecord};
pub use source::{CatalogSource, SqliteCatalogSource};

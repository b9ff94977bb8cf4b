//! Core data models for catalog matching.

/// One row as delivered by a [`CatalogSource`](crate::source::CatalogSource).
///
/// The source contract is a fixed structural record, not an arbitrary object:
/// exactly these five fields, whatever backend produced them.
///
/// Invariant: `brand_count == brands.split(',').count()` when `brands` is
/// non-empty, else `brand_count == 0`.
#[derive(Clone, Debug)]
pub struct CatalogRecord {
    pub id: i64,
    pub artist: String,
    pub title: String,
    /// Comma-joined karaoke-brand identifiers carrying this song.
    pub brands: String,
    /// Number of brands; crude popularity proxy.
    pub brand_count: i64,
}

/// Denormalized catalog entry stored in the lookup index.
/// `artist` and `title` keep their original (display) form; the normalized
/// forms live only in the index key. Immutable after load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: i64,
    pub artist: String,
    pub title: String,
    pub brands: String,
    pub brand_count: i64,
}

impl CatalogEntry {
    /// Split the comma-joined brand string into individual brand tags.
    pub fn brand_list(&self) -> Vec<&str> {
        if self.brands.is_empty() {
            return Vec::new();
        }
        self.brands.split(',').collect()
    }
}

impl From<CatalogRecord> for CatalogEntry {
    fn from(r: CatalogRecord) -> Self {
        CatalogEntry {
            id: r.id,
            artist: r.artist,
            title: r.title,
            brands: r.brands,
            brand_count: r.brand_count,
        }
    }
}

//! In-memory catalog lookup index.
//!
//! Built once at process startup from a full catalog pass, then queried per
//! track during a listening-history sync. Write-once/read-many: after
//! [`CatalogLookup::load_from_source`] completes the map is never mutated, so
//! concurrent reads need no locking. Construct the instance explicitly and
//! thread it through to consumers; there is no ambient global.

use anyhow::Result;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::time::Instant;
use tracing::{info, warn};

use crate::models::CatalogEntry;
use crate::normalize::{normalize_artist, normalize_title};
use crate::source::CatalogSource;

/// Composite index key: `"<normalized_artist>:<normalized_title>"`.
/// Identical construction at load time and lookup time is what makes the
/// exact-key match tolerant of metadata noise.
pub fn lookup_key(artist: &str, title: &str) -> String {
    format!("{}:{}", normalize_artist(artist), normalize_title(title))
}

/// Keyed in-memory index over the full karaoke catalog.
pub struct CatalogLookup {
    entries: FxHashMap<String, CatalogEntry>,
    loaded: bool,
}

impl CatalogLookup {
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
            loaded: false,
        }
    }

    /// True once a full load has completed. Readiness signal for callers
    /// that gate matching traffic on catalog availability.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Number of indexed entries (0 before load). Collided keys count once.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Build the index from one full catalog pass.
    ///
    /// Idempotent: a second call on a loaded index logs and returns without
    /// re-fetching. Source errors propagate to the caller; `loaded` flips to
    /// true only after the whole pass succeeds.
    ///
    /// On key collision the entry with the higher `brand_count` wins, ties
    /// broken by lower `id`, so the result does not depend on source row
    /// order.
    pub fn load_from_source(&mut self, source: &dyn CatalogSource) -> Result<()> {
        if self.loaded {
            info!(
                entries = self.entries.len(),
                "catalog already loaded, skipping reload"
            );
            return Ok(());
        }

        let start = Instant::now();
        info!("loading catalog into memory");
        let records = source.get_all_songs()?;
        let row_count = records.len();

        // Key construction dominates the build (regex + unicode folding per
        // row), so it runs in parallel; the merge stays sequential.
        let keyed: Vec<(String, CatalogEntry)> = records
            .into_par_iter()
            .map(|r| (lookup_key(&r.artist, &r.title), CatalogEntry::from(r)))
            .collect();

        let mut entries: FxHashMap<String, CatalogEntry> =
            FxHashMap::with_capacity_and_hasher(row_count, Default::default());
        for (key, entry) in keyed {
            match entries.get(&key) {
                Some(existing) if !prefer_on_collision(&entry, existing) => {}
                _ => {
                    entries.insert(key, entry);
                }
            }
        }

        self.entries = entries;
        self.loaded = true;
        info!(
            rows = row_count,
            entries = self.entries.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "catalog loaded"
        );
        Ok(())
    }

    /// Resolve an incoming (artist, title) pair to a catalog entry.
    ///
    /// Accepts arbitrary free text. Returns `None` both for a genuine miss
    /// (the common case) and when called before loading, which logs a
    /// warning instead of failing the request path. No I/O, O(1) expected.
    pub fn match_track(&self, artist: &str, title: &str) -> Option<&CatalogEntry> {
        if !self.loaded {
            warn!(artist, title, "match requested before catalog load");
            return None;
        }
        self.entries.get(&lookup_key(artist, title))
    }
}

impl Default for CatalogLookup {
    fn default() -> Self {
        Self::new()
    }
}

/// Collision rule: higher brand count wins, ties go to the lower id.
fn prefer_on_collision(candidate: &CatalogEntry, existing: &CatalogEntry) -> bool {
    candidate.brand_count > existing.brand_count
        || (candidate.brand_count == existing.brand_count && candidate.id < existing.id)
}

//! Per-run sync statistics.
//!
//! A sync matches a user's whole listening history against the catalog, one
//! track at a time; most tracks miss, so the interesting output is the rates.

use serde::Serialize;

#[derive(Default, Debug, Clone, Serialize)]
pub struct SyncStats {
    pub total_tracks: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Tracks whose artist AND title normalized to empty strings.
    pub degenerate_keys: usize,
    pub elapsed_seconds: f64,
}

impl SyncStats {
    /// Match rate as a percentage of total tracks.
    pub fn match_rate(&self) -> f64 {
        if self.total_tracks == 0 {
            0.0
        } else {
            100.0 * self.matched as f64 / self.total_tracks as f64
        }
    }

    /// Write stats to a JSON file.
    pub fn write_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

//! Catalog source boundary.
//!
//! The matching engine consumes the catalog through a single trait method,
//! called exactly once at load time. The production catalog lives behind a
//! remote query service; [`SqliteCatalogSource`] reads the same rows from a
//! local snapshot database, which is what the CLI and the test suite use.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

use crate::models::CatalogRecord;

/// A full-catalog provider. Implementations return every row in one pass;
/// the engine never asks for random access or incremental fetches.
pub trait CatalogSource {
    fn get_all_songs(&self) -> Result<Vec<CatalogRecord>>;
}

/// Catalog snapshot stored in a local SQLite database with a `songs` table:
///
/// ```sql
/// CREATE TABLE songs (
///     id          INTEGER PRIMARY KEY,
///     artist      TEXT NOT NULL,
///     title       TEXT NOT NULL,
///     brands      TEXT NOT NULL,
///     brand_count INTEGER NOT NULL
/// );
/// ```
pub struct SqliteCatalogSource {
    path: PathBuf,
}

impl SqliteCatalogSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)
            .with_context(|| format!("failed to open catalog database {:?}", self.path))?;
        // Read-side tuning for the one bulk scan
        conn.execute_batch(
            "PRAGMA mmap_size = 8589934592;
             PRAGMA cache_size = -64000;
             PRAGMA temp_store = MEMORY;",
        )?;
        Ok(conn)
    }
}

impl CatalogSource for SqliteCatalogSource {
    fn get_all_songs(&self) -> Result<Vec<CatalogRecord>> {
        let conn = self.open()?;
        read_all_songs(&conn)
    }
}

/// Read every catalog row from an open connection.
pub fn read_all_songs(conn: &Connection) -> Result<Vec<CatalogRecord>> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM songs", [], |row| row.get(0))
        .context("failed to count catalog rows")?;

    let mut stmt = conn
        .prepare("SELECT id, artist, title, brands, brand_count FROM songs")
        .context("failed to prepare catalog query")?;

    let mut records = Vec::with_capacity(count as usize);
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        records.push(CatalogRecord {
            id: row.get(0)?,
            artist: row.get(1)?,
            title: row.get(2)?,
            brands: row.get(3)?,
            brand_count: row.get(4)?,
        });
    }
    Ok(records)
}

pub mod models;
pub mod pool;
pub mod schema;

use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{CatalogError, CatalogResult};
use models::*;

pub use pool::{DbPool, PooledDb};

pub struct Database {
    pub conn: Connection,
    pub path: PathBuf,
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> CatalogResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        set_pragmas(&conn)?;
        schema::create_schema(&conn)?;

        debug!("Opened database: {}", path.display());

        Ok(Database {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Open an extra connection to a store that `open` already initialised.
    ///
    /// Only per-connection pragmas are set; nothing is written, so this never
    /// waits on a writer holding the database lock.
    pub fn open_existing(path: &Path) -> CatalogResult<Self> {
        let conn = Connection::open(path)?;
        set_pragmas(&conn)?;

        debug!("Opened extra connection: {}", path.display());

        Ok(Database {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Fresh private in-memory store with the full schema.
    pub fn open_in_memory() -> CatalogResult<Self> {
        let conn = Connection::open_in_memory()?;
        schema::create_schema(&conn)?;
        Ok(Database {
            conn,
            path: PathBuf::from(":memory:"),
        })
    }

    /// Default database path: ~/.dramadb/dramadb.db
    pub fn default_db_path() -> anyhow::Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".dramadb").join("dramadb.db"))
    }

    /// Number of dramas currently stored.
    pub fn count(&self) -> CatalogResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM dramas", [], |r| r.get(0))?;
        Ok(n)
    }

    /// Replace the whole table with `dramas` in a single transaction.
    ///
    /// Readers on other connections keep seeing the previous rows until the
    /// commit; on any failure the transaction is rolled back and the previous
    /// rows stay in place.
    pub fn replace_all(&self, dramas: &[Drama]) -> CatalogResult<usize> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute("DELETE FROM dramas", [])?;

        {
            let placeholders = (1..=DRAMA_COLUMNS.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "INSERT INTO dramas ({}) VALUES ({placeholders})",
                DRAMA_COLUMNS.join(", ")
            );
            let mut stmt = tx.prepare(&sql)?;

            for d in dramas {
                stmt.execute(rusqlite::params![
                    d.tmdb_id,
                    d.title,
                    d.original_title,
                    d.overview,
                    d.first_air_date,
                    d.last_air_date,
                    d.status,
                    d.seasons,
                    d.episodes,
                    d.average_runtime,
                    d.genres,
                    d.country,
                    d.language,
                    d.network,
                    d.production,
                    d.rating,
                    d.vote_count,
                    d.popularity,
                    d.main_cast,
                    d.keywords,
                    d.poster_path,
                    d.backdrop_path,
                ])
                .map_err(|e| {
                    CatalogError::Ingestion(format!("insert of tmdb_id {} failed: {e}", d.tmdb_id))
                })?;
            }
        }

        let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        tx.execute(
            "INSERT OR REPLACE INTO dramadb_meta (key, value) VALUES ('last_import_at', ?1)",
            [&now],
        )?;
        tx.execute(
            "INSERT OR REPLACE INTO dramadb_meta (key, value) VALUES ('last_import_count', ?1)",
            [dramas.len().to_string()],
        )?;

        tx.commit()?;
        info!("Replaced catalog with {} dramas", dramas.len());
        Ok(dramas.len())
    }

    /// Read a value from `dramadb_meta`.
    pub fn meta(&self, key: &str) -> CatalogResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM dramadb_meta WHERE key = ?1",
                [key],
                |r| r.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Fetch one drama with every column.
    pub fn get_drama(&self, tmdb_id: i64) -> CatalogResult<Drama> {
        let sql = format!(
            "SELECT {} FROM dramas WHERE tmdb_id = ?1",
            DRAMA_COLUMNS.join(", ")
        );
        self.conn
            .query_row(&sql, [tmdb_id], Drama::from_row)
            .optional()?
            .ok_or(CatalogError::NotFound { id: tmdb_id })
    }

    /// Aggregate statistics over the whole, unfiltered table.
    pub fn stats(&self) -> CatalogResult<DbStats> {
        let total_dramas = self.count()?;

        let (average, highest, lowest): (Option<f64>, Option<f64>, Option<f64>) =
            self.conn.query_row(
                "SELECT AVG(rating), MAX(rating), MIN(rating) FROM dramas WHERE rating > 0",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )?;

        let mut stmt = self.conn.prepare(
            "SELECT genres, COUNT(*) AS count FROM dramas
             WHERE genres IS NOT NULL
             GROUP BY genres
             ORDER BY count DESC, genres ASC
             LIMIT 10",
        )?;
        let top_genres = stmt
            .query_map([], |row| {
                Ok(GenreCount {
                    genre: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT status FROM dramas WHERE status IS NOT NULL ORDER BY status",
        )?;
        let available_statuses = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(DbStats {
            total_dramas,
            rating_stats: RatingStats {
                average: average.map(round2),
                highest,
                lowest,
            },
            top_genres,
            available_statuses,
        })
    }

    /// Size of the database file on disk (0 for in-memory stores).
    pub fn size_bytes(&self) -> u64 {
        std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }
}

/// Per-connection settings. `journal_mode = WAL` is persistent and set once by `open`.
fn set_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA synchronous = NORMAL;
         PRAGMA busy_timeout = 5000;
         PRAGMA cache_size = -16000;",
    )
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

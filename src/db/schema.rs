use rusqlite::{Connection, OptionalExtension};

pub const SCHEMA_VERSION: &str = "1";

pub fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        -- Version tracking and import bookkeeping
        CREATE TABLE IF NOT EXISTS dramadb_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        -- One row per series, replaced wholesale on every import
        CREATE TABLE IF NOT EXISTS dramas (
            tmdb_id INTEGER PRIMARY KEY,
            title TEXT,
            original_title TEXT,
            overview TEXT,
            first_air_date TEXT,
            last_air_date TEXT,
            status TEXT,
            seasons INTEGER,
            episodes REAL,
            average_runtime REAL,
            genres TEXT,
            country TEXT,
            language TEXT,
            network TEXT,
            production TEXT,
            rating REAL,
            vote_count INTEGER,
            popularity REAL,
            main_cast TEXT,
            keywords TEXT,
            poster_path TEXT,
            backdrop_path TEXT
        );

        -- Every search orders by these two columns
        CREATE INDEX IF NOT EXISTS idx_dramas_rank ON dramas(rating DESC, popularity DESC);
        CREATE INDEX IF NOT EXISTS idx_dramas_status ON dramas(status);
        ",
    )?;

    // Only write when the version is missing or stale, so reopening an
    // existing store takes no write lock.
    let current: Option<String> = conn
        .query_row(
            "SELECT value FROM dramadb_meta WHERE key = 'schema_version'",
            [],
            |r| r.get(0),
        )
        .optional()?;
    if current.as_deref() != Some(SCHEMA_VERSION) {
        conn.execute(
            "INSERT OR REPLACE INTO dramadb_meta (key, value) VALUES ('schema_version', ?1)",
            [SCHEMA_VERSION],
        )?;
    }

    Ok(())
}

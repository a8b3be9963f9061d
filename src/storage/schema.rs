//! Database schema definitions
//!
//! This module contains the SQL schema for the run database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track scan runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- One row per link found in an article
CREATE TABLE IF NOT EXISTS scan_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    article_index INTEGER NOT NULL,
    article_text TEXT NOT NULL,
    article_link TEXT NOT NULL,
    scanned_link TEXT NOT NULL,
    status TEXT NOT NULL,
    status_code INTEGER,
    outcome TEXT,
    message TEXT NOT NULL,
    final_url TEXT,
    critical INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_scan_results_run ON scan_results(run_id);
CREATE INDEX IF NOT EXISTS idx_scan_results_link ON scan_results(scanned_link);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::{Outcome, ScanResult, ScanStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates a run database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Running),
    })
}

impl Storage for SqliteStorage {
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status FROM runs WHERE id = ?1",
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status FROM runs ORDER BY id DESC LIMIT 1",
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn save_results(&mut self, run_id: i64, results: &[ScanResult]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO scan_results (run_id, article_index, article_text, article_link,
                 scanned_link, status, status_code, outcome, message, final_url, critical)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;

            for result in results {
                stmt.execute(params![
                    run_id,
                    result.article_index as i64,
                    result.article_text,
                    result.article_link,
                    result.scanned_link,
                    result.status.to_string(),
                    result.status_code,
                    result.outcome.map(|o| o.to_db_string()),
                    result.message,
                    result.final_url,
                    result.critical,
                ])?;
            }
        }
        tx.commit()?;

        tracing::debug!("Saved {} scan results for run {}", results.len(), run_id);
        Ok(results.len())
    }

    fn load_results(&self, run_id: i64) -> StorageResult<Vec<ScanResult>> {
        let mut stmt = self.conn.prepare(
            "SELECT article_text, article_link, scanned_link, status, status_code, outcome,
             message, final_url, critical, article_index
             FROM scan_results WHERE run_id = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map(params![run_id], |row| {
            Ok((
                ScanResult {
                    article_index: row.get::<_, i64>(9)? as usize,
                    article_text: row.get(0)?,
                    article_link: row.get(1)?,
                    scanned_link: row.get(2)?,
                    status: ScanStatus::Pending,
                    status_code: row.get(4)?,
                    outcome: None,
                    message: row.get(6)?,
                    final_url: row.get(7)?,
                    critical: row.get(8)?,
                },
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })?;

        let mut results = Vec::new();
        for row in rows {
            let (mut result, status, outcome) = row?;
            result.status = match status.as_str() {
                "pending" => ScanStatus::Pending,
                "done" => ScanStatus::Done,
                other => {
                    return Err(StorageError::CorruptRow {
                        table: "scan_results",
                        reason: format!("unknown status '{}'", other),
                    })
                }
            };
            result.outcome = match outcome {
                Some(outcome) => Some(Outcome::from_db_string(&outcome).ok_or_else(|| {
                    StorageError::CorruptRow {
                        table: "scan_results",
                        reason: format!("unknown outcome '{}'", outcome),
                    }
                })?),
                None => None,
            };
            results.push(result);
        }

        Ok(results)
    }
}

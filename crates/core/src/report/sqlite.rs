use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{ReportError, RunLog, RunLogEntry};
use crate::pipeline::RunMetrics;

/// SQLite-backed run log
pub struct SqliteRunLog {
    conn: Mutex<Connection>,
}

impl SqliteRunLog {
    /// Create a new run log, creating the database file and table if needed
    pub fn new(path: &Path) -> Result<Self, ReportError> {
        let conn = Connection::open(path).map_err(|e| ReportError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory run log (useful for testing)
    pub fn in_memory() -> Result<Self, ReportError> {
        let conn =
            Connection::open_in_memory().map_err(|e| ReportError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), ReportError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                quota_used INTEGER NOT NULL,
                keywords_count INTEGER NOT NULL,
                results_count INTEGER NOT NULL,
                error TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_runs_timestamp ON runs(timestamp);
            "#,
        )
        .map_err(|e| ReportError::Database(e.to_string()))?;

        Ok(())
    }
}

impl RunLog for SqliteRunLog {
    fn log_run(
        &self,
        run_id: &str,
        timestamp: DateTime<Utc>,
        metrics: &RunMetrics,
    ) -> Result<(), ReportError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO runs (run_id, timestamp, quota_used, keywords_count, results_count, error)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                run_id,
                timestamp.to_rfc3339(),
                metrics.quota_used as i64,
                metrics.keywords_count as i64,
                metrics.results_count as i64,
                &metrics.error,
            ],
        )
        .map_err(|e| ReportError::Database(e.to_string()))?;
        Ok(())
    }

    fn recent_runs(&self, limit: usize) -> Result<Vec<RunLogEntry>, ReportError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                r#"
                SELECT run_id, timestamp, quota_used, keywords_count, results_count, error
                FROM runs
                ORDER BY id DESC
                LIMIT ?
                "#,
            )
            .map_err(|e| ReportError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                let run_id: String = row.get(0)?;
                let timestamp: String = row.get(1)?;
                let quota_used: i64 = row.get(2)?;
                let keywords_count: i64 = row.get(3)?;
                let results_count: i64 = row.get(4)?;
                let error: Option<String> = row.get(5)?;
                Ok((run_id, timestamp, quota_used, keywords_count, results_count, error))
            })
            .map_err(|e| ReportError::Database(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            let (run_id, timestamp, quota_used, keywords_count, results_count, error) =
                row.map_err(|e| ReportError::Database(e.to_string()))?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp)
                .map_err(|e| ReportError::Database(e.to_string()))?
                .with_timezone(&Utc);
            entries.push(RunLogEntry {
                run_id,
                timestamp,
                metrics: RunMetrics {
                    keywords_count: keywords_count as usize,
                    results_count: results_count as usize,
                    quota_used: quota_used as u64,
                    error,
                },
            });
        }
        Ok(entries)
    }
}

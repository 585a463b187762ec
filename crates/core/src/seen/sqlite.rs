//! SQLite-backed seen store.

use std::path::Path;
use std::sync::Mutex;

use chrono::NaiveDate;
use rusqlite::{params, Connection};

use super::{SeenEntry, SeenError, SeenStore};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-backed seen store.
///
/// Rows are only ever inserted or cleared wholesale, never updated.
pub struct SqliteSeenStore {
    conn: Mutex<Connection>,
}

impl SqliteSeenStore {
    /// Create a new store, creating the database file and table if needed.
    pub fn new(path: &Path) -> Result<Self, SeenError> {
        let conn = Connection::open(path).map_err(|e| SeenError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, SeenError> {
        let conn =
            Connection::open_in_memory().map_err(|e| SeenError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), SeenError> {
        conn.execute_batch(
            r#"
            -- One row per reported item, in report order
            CREATE TABLE IF NOT EXISTS seen_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                item_id TEXT NOT NULL,
                recorded_on TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_seen_items_item_id ON seen_items(item_id);
            "#,
        )
        .map_err(|e| SeenError::Database(e.to_string()))?;

        Ok(())
    }
}

impl SeenStore for SqliteSeenStore {
    fn load_all(&self) -> Result<Vec<SeenEntry>, SeenError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT item_id, recorded_on FROM seen_items ORDER BY id")
            .map_err(|e| SeenError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                let item_id: String = row.get(0)?;
                let recorded_on: String = row.get(1)?;
                Ok((item_id, recorded_on))
            })
            .map_err(|e| SeenError::Database(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            let (item_id, recorded_on) = row.map_err(|e| SeenError::Database(e.to_string()))?;
            let recorded_on = NaiveDate::parse_from_str(&recorded_on, DATE_FORMAT).map_err(|e| {
                SeenError::Database(format!("invalid date '{}' for {}: {}", recorded_on, item_id, e))
            })?;
            entries.push(SeenEntry {
                item_id,
                recorded_on,
            });
        }
        Ok(entries)
    }

    fn append(&self, entry: &SeenEntry) -> Result<(), SeenError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO seen_items (item_id, recorded_on) VALUES (?, ?)",
            params![
                &entry.item_id,
                entry.recorded_on.format(DATE_FORMAT).to_string()
            ],
        )
        .map_err(|e| SeenError::Database(e.to_string()))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SeenError> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM seen_items", [])
            .map_err(|e| SeenError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(id: &str) -> SeenEntry {
        SeenEntry {
            item_id: id.to_string(),
            recorded_on: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    #[test]
    fn test_append_and_load_in_order() {
        let store = SqliteSeenStore::in_memory().unwrap();
        store.append(&entry("b")).unwrap();
        store.append(&entry("a")).unwrap();

        let entries = store.load_all().unwrap();
        assert_eq!(entries, vec![entry("b"), entry("a")]);
    }

    #[test]
    fn test_clear() {
        let store = SqliteSeenStore::in_memory().unwrap();
        store.append(&entry("a")).unwrap();
        store.clear().unwrap();
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_persists_across_connections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seen.db");

        {
            let store = SqliteSeenStore::new(&path).unwrap();
            store.append(&entry("abc123")).unwrap();
        }

        let store = SqliteSeenStore::new(&path).unwrap();
        assert_eq!(store.load_all().unwrap(), vec![entry("abc123")]);
    }

    #[test]
    fn test_new_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = SqliteSeenStore::new(&dir.path().join("fresh.db")).unwrap();
        assert!(store.load_all().unwrap().is_empty());
    }
}

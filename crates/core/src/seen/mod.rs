//! Seen ledger: the durable record of items already reported.
//!
//! The ledger is loaded fully into memory at the start of a run and every
//! newly reported item is appended to the backing [`SeenStore`] before it is
//! counted as reported. Once `record` succeeds, `contains` answers true for
//! that id in this run and in every later run that loads the same store,
//! until the store is explicitly reset.

mod sqlite;

pub use sqlite::SqliteSeenStore;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Errors for seen ledger storage.
#[derive(Debug, Error)]
pub enum SeenError {
    #[error("Database error: {0}")]
    Database(String),
}

/// One row of the ledger: an item id and the day it was reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenEntry {
    pub item_id: String,
    pub recorded_on: NaiveDate,
}

/// Append-only durable storage for seen entries.
pub trait SeenStore: Send + Sync {
    /// Read every stored entry. Empty storage yields an empty list.
    fn load_all(&self) -> Result<Vec<SeenEntry>, SeenError>;

    /// Durably append one entry.
    fn append(&self, entry: &SeenEntry) -> Result<(), SeenError>;

    /// Discard all entries.
    fn clear(&self) -> Result<(), SeenError>;
}

/// In-memory view of the seen set, backed by a [`SeenStore`].
pub struct SeenLedger {
    store: Arc<dyn SeenStore>,
    entries: HashMap<String, NaiveDate>,
}

impl SeenLedger {
    /// Reconstruct the ledger from storage.
    ///
    /// Duplicate rows collapse to the earliest recorded date.
    pub fn load(store: Arc<dyn SeenStore>) -> Result<Self, SeenError> {
        let mut entries: HashMap<String, NaiveDate> = HashMap::new();
        for entry in store.load_all()? {
            entries
                .entry(entry.item_id)
                .and_modify(|d| *d = (*d).min(entry.recorded_on))
                .or_insert(entry.recorded_on);
        }
        debug!(count = entries.len(), "Seen ledger loaded");
        Ok(Self { store, entries })
    }

    /// Physically clear the backing store. Call before [`SeenLedger::load`].
    pub fn reset(store: &dyn SeenStore) -> Result<(), SeenError> {
        store.clear()?;
        info!("Seen ledger reset");
        Ok(())
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.entries.contains_key(item_id)
    }

    /// Date an item was first recorded, if it has been.
    pub fn recorded_on(&self, item_id: &str) -> Option<NaiveDate> {
        self.entries.get(item_id).copied()
    }

    /// Append `item_id` to the store, then to the in-memory set.
    ///
    /// A store failure leaves the in-memory set untouched and must abort the
    /// run: continuing could report the item again next time.
    pub fn record(&mut self, item_id: &str, date: NaiveDate) -> Result<(), SeenError> {
        self.store.append(&SeenEntry {
            item_id: item_id.to_string(),
            recorded_on: date,
        })?;
        self.entries.entry(item_id.to_string()).or_insert(date);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    /// Store that fails every append.
    struct BrokenStore;

    impl SeenStore for BrokenStore {
        fn load_all(&self) -> Result<Vec<SeenEntry>, SeenError> {
            Ok(Vec::new())
        }

        fn append(&self, _entry: &SeenEntry) -> Result<(), SeenError> {
            Err(SeenError::Database("disk full".to_string()))
        }

        fn clear(&self) -> Result<(), SeenError> {
            Ok(())
        }
    }

    /// Store that returns fixed rows.
    struct FixedStore(Mutex<Vec<SeenEntry>>);

    impl SeenStore for FixedStore {
        fn load_all(&self) -> Result<Vec<SeenEntry>, SeenError> {
            Ok(self.0.lock().unwrap().clone())
        }

        fn append(&self, entry: &SeenEntry) -> Result<(), SeenError> {
            self.0.lock().unwrap().push(entry.clone());
            Ok(())
        }

        fn clear(&self) -> Result<(), SeenError> {
            self.0.lock().unwrap().clear();
            Ok(())
        }
    }

    #[test]
    fn test_empty_store_loads_empty_ledger() {
        let store = Arc::new(SqliteSeenStore::in_memory().unwrap());
        let ledger = SeenLedger::load(store).unwrap();
        assert!(ledger.is_empty());
        assert!(!ledger.contains("abc123"));
    }

    #[test]
    fn test_record_then_contains() {
        let store = Arc::new(SqliteSeenStore::in_memory().unwrap());
        let mut ledger = SeenLedger::load(store.clone()).unwrap();

        ledger.record("abc123", day(1)).unwrap();
        assert!(ledger.contains("abc123"));
        assert_eq!(ledger.recorded_on("abc123"), Some(day(1)));

        let reloaded = SeenLedger::load(store).unwrap();
        assert!(reloaded.contains("abc123"));
    }

    #[test]
    fn test_duplicate_rows_keep_earliest_date() {
        let store = Arc::new(FixedStore(Mutex::new(vec![
            SeenEntry {
                item_id: "a".to_string(),
                recorded_on: day(5),
            },
            SeenEntry {
                item_id: "a".to_string(),
                recorded_on: day(2),
            },
        ])));
        let ledger = SeenLedger::load(store).unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.recorded_on("a"), Some(day(2)));
    }

    #[test]
    fn test_reset_clears_store() {
        let store = Arc::new(SqliteSeenStore::in_memory().unwrap());
        let mut ledger = SeenLedger::load(store.clone()).unwrap();
        ledger.record("abc123", day(1)).unwrap();

        SeenLedger::reset(store.as_ref()).unwrap();
        let reloaded = SeenLedger::load(store).unwrap();
        assert!(!reloaded.contains("abc123"));
    }

    #[test]
    fn test_failed_write_is_not_remembered() {
        let mut ledger = SeenLedger::load(Arc::new(BrokenStore)).unwrap();
        let result = ledger.record("abc123", day(1));
        assert!(matches!(result, Err(SeenError::Database(_))));
        assert!(!ledger.contains("abc123"));
    }
}

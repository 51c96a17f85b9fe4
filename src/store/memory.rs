//! In-memory score store for tests and throwaway sessions

use std::collections::HashMap;
use std::sync::RwLock;

use super::{check_key, StoreError, StoreRecord, UserStore};

/// Rows held in a map; nothing survives the process
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<HashMap<String, Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows
    pub fn len(&self) -> usize {
        self.read_rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a raw row as-is, bypassing record checks
    pub fn insert_row(&self, row: Vec<String>) {
        if let Some(key) = row.first().cloned() {
            self.write_rows().insert(key, row);
        }
    }

    // Poisoning means a thread panicked mid-write; there is nothing to recover.

    /// Acquire read lock on the rows. Panics if lock is poisoned (unrecoverable).
    fn read_rows(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Vec<String>>> {
        self.rows
            .read()
            .expect("rows lock poisoned: a thread panicked while holding this lock")
    }

    /// Acquire write lock on the rows. Panics if lock is poisoned (unrecoverable).
    fn write_rows(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Vec<String>>> {
        self.rows
            .write()
            .expect("rows lock poisoned: a thread panicked while holding this lock")
    }
}

impl UserStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn find(&self, identifier: &str) -> Result<Option<StoreRecord>, StoreError> {
        self.read_rows()
            .get(identifier)
            .map(|row| StoreRecord::from_row(row))
            .transpose()
    }

    fn append(&self, record: &StoreRecord) -> Result<(), StoreError> {
        let mut rows = self.write_rows();
        if rows.contains_key(&record.identifier) {
            return Err(StoreError::Conflict(record.identifier.clone()));
        }
        rows.insert(record.identifier.clone(), record.to_row());
        Ok(())
    }

    fn update(&self, identifier: &str, record: &StoreRecord) -> Result<(), StoreError> {
        check_key(identifier, record)?;
        let mut rows = self.write_rows();
        let row = rows
            .get_mut(identifier)
            .ok_or_else(|| StoreError::NotFound(identifier.to_string()))?;
        *row = record.to_row();
        Ok(())
    }

    fn delete(&self, identifier: &str) -> Result<(), StoreError> {
        self.write_rows()
            .remove(identifier)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(identifier.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: &str, answers: Vec<u32>) -> StoreRecord {
        let total_score = answers.iter().sum();
        StoreRecord {
            identifier: id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            answers,
            total_score,
        }
    }

    #[test]
    fn test_append_then_find() {
        let store = MemoryStore::new();
        store.append(&record("abcde", vec![1, 2])).unwrap();
        assert_eq!(store.find("abcde").unwrap(), Some(record("abcde", vec![1, 2])));
        assert_eq!(store.find("ABCDE").unwrap(), None);
        assert_eq!(store.find("abcd").unwrap(), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_append_existing_conflicts() {
        let store = MemoryStore::new();
        store.append(&record("abcde", vec![1])).unwrap();
        assert!(matches!(
            store.append(&record("abcde", vec![2])),
            Err(StoreError::Conflict(_))
        ));
    }

    #[test]
    fn test_update_overwrites_whole_row() {
        let store = MemoryStore::new();
        store.append(&record("abcde", vec![1, 2, 3])).unwrap();
        store.update("abcde", &record("abcde", vec![9])).unwrap();
        let found = store.find("abcde").unwrap().unwrap();
        assert_eq!(found.answers, vec![9]);
        assert_eq!(found.total_score, 9);
    }

    #[test]
    fn test_update_and_delete_missing_fail() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.update("abcde", &record("abcde", vec![1])),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(store.delete("abcde"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_update_rejects_mismatched_key() {
        let store = MemoryStore::new();
        store.append(&record("abcde", vec![1])).unwrap();
        assert!(matches!(
            store.update("abcde", &record("zzzzz", vec![1])),
            Err(StoreError::IdentifierMismatch { .. })
        ));
    }

    #[test]
    fn test_delete_removes_row() {
        let store = MemoryStore::new();
        store.append(&record("abcde", vec![1])).unwrap();
        store.delete("abcde").unwrap();
        assert!(!store.contains("abcde").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_malformed_row_surfaces() {
        let store = MemoryStore::new();
        store.insert_row(vec!["abcde".to_string(), "yesterday".to_string(), "1".to_string()]);
        assert!(matches!(
            store.find("abcde"),
            Err(StoreError::MalformedRow { .. })
        ));
    }
}

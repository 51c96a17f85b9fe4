//! Score sheet persisted with redb
//!
//! One table, `co2_scores`, maps a user id to its row. Rows are stored as
//! JSON arrays of text cells so the sheet keeps the spreadsheet layout.

use std::path::{Path, PathBuf};

use redb::{ReadableTable, ReadableTableMetadata};
use tracing::{debug, info};

use super::{check_key, StoreError, StoreRecord, UserStore};

// redb table definition
const SCORES_TABLE: redb::TableDefinition<&str, &[u8]> = redb::TableDefinition::new("co2_scores");

fn db_err<E: Into<redb::Error>>(e: E) -> StoreError {
    StoreError::Database(e.into())
}

/// File-backed score sheet
pub struct SheetStore {
    db: redb::Database,
    path: PathBuf,
}

impl SheetStore {
    /// Create or open the sheet at `path`
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let db = redb::Database::create(path).map_err(db_err)?;
        debug!("Opened score sheet at {}", path.display());
        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored rows
    pub fn len(&self) -> Result<u64, StoreError> {
        let read_txn = self.db.begin_read().map_err(db_err)?;
        let table = match read_txn.open_table(SCORES_TABLE) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(0),
            Err(e) => return Err(db_err(e)),
        };
        table.len().map_err(db_err)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn encode(record: &StoreRecord) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(&record.to_row())?)
    }

    fn decode(bytes: &[u8]) -> Result<StoreRecord, StoreError> {
        let row: Vec<String> = serde_json::from_slice(bytes)?;
        StoreRecord::from_row(&row)
    }
}

impl UserStore for SheetStore {
    fn name(&self) -> &str {
        "sheet"
    }

    fn find(&self, identifier: &str) -> Result<Option<StoreRecord>, StoreError> {
        let read_txn = self.db.begin_read().map_err(db_err)?;

        // A fresh sheet has no table yet
        let table = match read_txn.open_table(SCORES_TABLE) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(db_err(e)),
        };

        match table.get(identifier).map_err(db_err)? {
            Some(value) => Ok(Some(Self::decode(value.value())?)),
            None => Ok(None),
        }
    }

    fn append(&self, record: &StoreRecord) -> Result<(), StoreError> {
        let value = Self::encode(record)?;
        let write_txn = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = write_txn.open_table(SCORES_TABLE).map_err(db_err)?;
            let exists = table.get(record.identifier.as_str()).map_err(db_err)?.is_some();
            if exists {
                return Err(StoreError::Conflict(record.identifier.clone()));
            }
            table
                .insert(record.identifier.as_str(), value.as_slice())
                .map_err(db_err)?;
        }
        write_txn.commit().map_err(db_err)?;
        info!("Stored results for {}", record.identifier);
        Ok(())
    }

    fn update(&self, identifier: &str, record: &StoreRecord) -> Result<(), StoreError> {
        check_key(identifier, record)?;
        let value = Self::encode(record)?;
        let write_txn = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = write_txn.open_table(SCORES_TABLE).map_err(db_err)?;
            let exists = table.get(identifier).map_err(db_err)?.is_some();
            if !exists {
                return Err(StoreError::NotFound(identifier.to_string()));
            }
            table.insert(identifier, value.as_slice()).map_err(db_err)?;
        }
        write_txn.commit().map_err(db_err)?;
        info!("Updated results for {}", identifier);
        Ok(())
    }

    fn delete(&self, identifier: &str) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = write_txn.open_table(SCORES_TABLE).map_err(db_err)?;
            let removed = table.remove(identifier).map_err(db_err)?.is_some();
            if !removed {
                return Err(StoreError::NotFound(identifier.to_string()));
            }
        }
        write_txn.commit().map_err(db_err)?;
        info!("Deleted results for {}", identifier);
        Ok(())
    }
}

// redb::Database flushes on Drop

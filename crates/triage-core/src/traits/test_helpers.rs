//! `MemoryCatalog` — in-memory test double for `ProductCatalog`.
//!
//! Used by engine tests to avoid creating real SQLite catalogs.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::errors::StorageError;
use crate::types::product::{DownlinkState, ProductRecord};
use crate::types::value::MetadataValue;

use super::catalog::ProductCatalog;

/// In-memory implementation of `ProductCatalog`.
///
/// Ids are assigned sequentially from 1, matching the SQLite rowid behavior
/// of the real catalog.
pub struct MemoryCatalog {
    records: Mutex<BTreeMap<i64, ProductRecord>>,
    next_id: Mutex<i64>,
    /// When set, `get` fails for this id. Lets planner tests exercise the
    /// snapshot failure path.
    poisoned_id: Mutex<Option<i64>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            next_id: Mutex::new(1),
            poisoned_id: Mutex::new(None),
        }
    }

    /// Make `get(id)` return a SQLite-shaped error, simulating a corrupt row.
    pub fn poison(&self, id: i64) {
        *self.poisoned_id.lock().unwrap() = Some(id);
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductCatalog for MemoryCatalog {
    fn list_ids(&self) -> Result<Vec<i64>, StorageError> {
        Ok(self.records.lock().unwrap().keys().copied().collect())
    }

    fn get(&self, id: i64) -> Result<ProductRecord, StorageError> {
        if *self.poisoned_id.lock().unwrap() == Some(id) {
            return Err(StorageError::Sqlite { message: format!("row {id} unreadable") });
        }
        self.records
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound { id })
    }

    fn insert(&self, record: &mut ProductRecord) -> Result<i64, StorageError> {
        let mut next_id = self.next_id.lock().unwrap();
        let id = *next_id;
        *next_id += 1;
        record.id = id;
        self.records.lock().unwrap().insert(id, record.clone());
        Ok(id)
    }

    fn update_science_utility(&self, id: i64, sue: f64) -> Result<(), StorageError> {
        let mut records = self.records.lock().unwrap();
        let record = records.get_mut(&id).ok_or(StorageError::NotFound { id })?;
        record.science_utility_estimate = sue;
        Ok(())
    }

    fn update_priority_bin(&self, id: i64, bin: i32) -> Result<(), StorageError> {
        let mut records = self.records.lock().unwrap();
        let record = records.get_mut(&id).ok_or(StorageError::NotFound { id })?;
        record.priority_bin = bin;
        Ok(())
    }

    fn update_downlink_state(&self, id: i64, state: DownlinkState) -> Result<(), StorageError> {
        let mut records = self.records.lock().unwrap();
        let record = records.get_mut(&id).ok_or(StorageError::NotFound { id })?;
        record.downlink_state = state;
        Ok(())
    }

    fn update_metadata(
        &self,
        id: i64,
        field: &str,
        value: &MetadataValue,
    ) -> Result<(), StorageError> {
        let mut records = self.records.lock().unwrap();
        let record = records.get_mut(&id).ok_or(StorageError::NotFound { id })?;
        match record.metadata.get_mut(field) {
            Some(slot) => {
                *slot = value.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound { id }),
        }
    }
}

//! `SqliteCatalog` — the SQLite-backed implementation of `ProductCatalog`.
//!
//! Single owner of the connection; all SQL goes through the `queries`
//! modules.

use std::path::Path;

use rusqlite::Connection;
use triage_core::errors::StorageError;
use triage_core::traits::catalog::ProductCatalog;
use triage_core::types::product::{DownlinkState, ProductRecord};
use triage_core::types::value::MetadataValue;

use crate::queries::{self, sqe};
use crate::schema;

pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Open a file-backed catalog, applying the schema if absent.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(sqe)?;
        schema::apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory catalog (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(sqe)?;
        schema::apply_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl ProductCatalog for SqliteCatalog {
    fn list_ids(&self) -> Result<Vec<i64>, StorageError> {
        queries::products::list_ids(&self.conn)
    }

    fn get(&self, id: i64) -> Result<ProductRecord, StorageError> {
        let row = queries::products::get(&self.conn, id)?.ok_or(StorageError::NotFound { id })?;
        let metadata = queries::metadata::get_all(&self.conn, id)?;
        Ok(ProductRecord {
            id: row.id,
            instrument_name: row.instrument_name,
            product_type: row.product_type,
            uri: row.uri,
            size_bytes: row.size_bytes,
            science_utility_estimate: row.science_utility_estimate,
            priority_bin: row.priority_bin,
            downlink_state: row.downlink_state,
            metadata,
        })
    }

    fn insert(&self, record: &mut ProductRecord) -> Result<i64, StorageError> {
        // Product row and metadata rows land together or not at all.
        let tx = self.conn.unchecked_transaction().map_err(sqe)?;

        let row = queries::products::ProductRow {
            id: record.id,
            instrument_name: record.instrument_name.clone(),
            product_type: record.product_type.clone(),
            uri: record.uri.clone(),
            size_bytes: record.size_bytes,
            science_utility_estimate: record.science_utility_estimate,
            priority_bin: record.priority_bin,
            downlink_state: record.downlink_state,
        };
        let id = queries::products::insert(&tx, &row)?;

        for (field, value) in &record.metadata {
            queries::metadata::insert(&tx, id, field, value)?;
        }

        tx.commit().map_err(sqe)?;
        record.id = id;
        Ok(id)
    }

    fn update_science_utility(&self, id: i64, sue: f64) -> Result<(), StorageError> {
        match queries::products::update_science_utility(&self.conn, id, sue)? {
            0 => Err(StorageError::NotFound { id }),
            _ => Ok(()),
        }
    }

    fn update_priority_bin(&self, id: i64, bin: i32) -> Result<(), StorageError> {
        match queries::products::update_priority_bin(&self.conn, id, bin)? {
            0 => Err(StorageError::NotFound { id }),
            _ => Ok(()),
        }
    }

    fn update_downlink_state(&self, id: i64, state: DownlinkState) -> Result<(), StorageError> {
        match queries::products::update_downlink_state(&self.conn, id, state)? {
            0 => Err(StorageError::NotFound { id }),
            _ => Ok(()),
        }
    }

    fn update_metadata(
        &self,
        id: i64,
        field: &str,
        value: &MetadataValue,
    ) -> Result<(), StorageError> {
        match queries::metadata::update(&self.conn, id, field, value)? {
            0 => Err(StorageError::NotFound { id }),
            _ => Ok(()),
        }
    }
}

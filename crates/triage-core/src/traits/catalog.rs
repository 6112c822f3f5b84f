//! Product catalog contract.

use crate::errors::StorageError;
use crate::types::product::{DownlinkState, ProductRecord};
use crate::types::value::MetadataValue;

/// The narrow catalog surface the engine consumes.
///
/// Each operation is atomic from the engine's viewpoint, and no concurrent
/// mutation may happen during a prioritization run; the planner snapshots all
/// rows into memory before entering its inner loop.
pub trait ProductCatalog {
    /// All product ids currently catalogued, in insertion order.
    fn list_ids(&self) -> Result<Vec<i64>, StorageError>;

    /// Fetch one product row, including its metadata map.
    fn get(&self, id: i64) -> Result<ProductRecord, StorageError>;

    /// Insert a new product and assign its id. The record's `id` field is
    /// updated in place and the assigned id returned.
    fn insert(&self, record: &mut ProductRecord) -> Result<i64, StorageError>;

    fn update_science_utility(&self, id: i64, sue: f64) -> Result<(), StorageError>;

    fn update_priority_bin(&self, id: i64, bin: i32) -> Result<(), StorageError>;

    fn update_downlink_state(&self, id: i64, state: DownlinkState) -> Result<(), StorageError>;

    /// Update one existing metadata field. Fails with `NotFound` when the
    /// product or the field does not exist.
    fn update_metadata(&self, id: i64, field: &str, value: &MetadataValue)
        -> Result<(), StorageError>;
}

//! Product catalogue rows and planner-facing entries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::value::MetadataValue;

/// Downlink lifecycle state of a catalogued product.
///
/// The planner considers only non-`Downlinked` products and emits only
/// `Untransmitted` ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownlinkState {
    Untransmitted,
    Transmitted,
    Downlinked,
}

impl DownlinkState {
    /// Storage representation.
    pub fn to_i64(self) -> i64 {
        match self {
            DownlinkState::Untransmitted => 0,
            DownlinkState::Transmitted => 1,
            DownlinkState::Downlinked => 2,
        }
    }

    /// Reconstruct from the storage representation. `None` for unknown codes.
    pub fn from_i64(v: i64) -> Option<Self> {
        match v {
            0 => Some(DownlinkState::Untransmitted),
            1 => Some(DownlinkState::Transmitted),
            2 => Some(DownlinkState::Downlinked),
            _ => None,
        }
    }
}

/// A planner-facing view of one product: field name to typed value.
///
/// `BTreeMap` keeps iteration deterministic, which the planner relies on for
/// reproducible output.
pub type ProductEntry = BTreeMap<String, MetadataValue>;

/// Reserved entry field names populated by the planner during snapshot
/// assembly. User metadata under these names is overwritten.
pub mod fields {
    pub const ID: &str = "id";
    pub const INSTRUMENT_NAME: &str = "instrument_name";
    pub const TYPE: &str = "type";
    pub const SIZE: &str = "size";
    pub const SCIENCE_UTILITY_ESTIMATE: &str = "science_utility_estimate";
    pub const PRIORITY_BIN: &str = "priority_bin";
    pub const FINAL_SCIENCE_UTILITY_ESTIMATE: &str = "final_science_utility_estimate";
}

/// One catalogue row.
///
/// `id` is assigned by the catalog on insertion; ingestion constructs records
/// with `id = -1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: i64,
    pub instrument_name: String,
    pub product_type: String,
    pub uri: String,
    pub size_bytes: u64,
    pub science_utility_estimate: f64,
    pub priority_bin: i32,
    pub downlink_state: DownlinkState,
    pub metadata: ProductEntry,
}

impl ProductRecord {
    /// Build the planner-facing entry for this record: user metadata plus the
    /// reserved fields, reserved values winning on collision.
    pub fn to_entry(&self) -> ProductEntry {
        let mut entry = self.metadata.clone();
        entry.insert(fields::ID.into(), MetadataValue::Integer(self.id));
        entry.insert(
            fields::INSTRUMENT_NAME.into(),
            MetadataValue::Text(self.instrument_name.clone()),
        );
        entry.insert(fields::TYPE.into(), MetadataValue::Text(self.product_type.clone()));
        entry.insert(fields::SIZE.into(), MetadataValue::Integer(self.size_bytes as i64));
        entry.insert(
            fields::SCIENCE_UTILITY_ESTIMATE.into(),
            MetadataValue::Float(self.science_utility_estimate),
        );
        entry.insert(
            fields::PRIORITY_BIN.into(),
            MetadataValue::Integer(self.priority_bin as i64),
        );
        entry
    }
}

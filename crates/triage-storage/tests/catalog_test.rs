//! Catalog round-trip tests.
//!
//! Verifies that product rows and typed metadata persist and read back
//! identically, that the narrow update operations behave, and that missing
//! ids surface as `NotFound`.

use triage_core::errors::StorageError;
use triage_core::traits::catalog::ProductCatalog;
use triage_core::types::product::{DownlinkState, ProductEntry, ProductRecord};
use triage_core::types::value::MetadataValue;
use triage_storage::SqliteCatalog;

fn sample_record() -> ProductRecord {
    let mut metadata = ProductEntry::new();
    metadata.insert("depth".into(), MetadataValue::Integer(3));
    metadata.insert("ratio".into(), MetadataValue::Float(0.25));
    metadata.insert("site".into(), MetadataValue::Text("crater_rim".into()));
    ProductRecord {
        id: -1,
        instrument_name: "cntx".into(),
        product_type: "flat".into(),
        uri: "file:///data/products/a.dat".into(),
        size_bytes: 1024,
        science_utility_estimate: 0.8,
        priority_bin: 1,
        downlink_state: DownlinkState::Untransmitted,
        metadata,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// INSERT / GET ROUND-TRIP
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn roundtrip_insert_and_get() {
    let catalog = SqliteCatalog::open_in_memory().unwrap();

    let mut record = sample_record();
    let id = catalog.insert(&mut record).unwrap();

    assert!(id > 0, "assigned ids are positive");
    assert_eq!(record.id, id, "insert writes the assigned id back");

    let loaded = catalog.get(id).unwrap();
    assert_eq!(loaded, record);
}

#[test]
fn roundtrip_typed_metadata() {
    let catalog = SqliteCatalog::open_in_memory().unwrap();

    let mut record = sample_record();
    let id = catalog.insert(&mut record).unwrap();
    let loaded = catalog.get(id).unwrap();

    assert_eq!(loaded.metadata.len(), 3);
    assert_eq!(loaded.metadata["depth"], MetadataValue::Integer(3));
    assert_eq!(loaded.metadata["ratio"], MetadataValue::Float(0.25));
    assert_eq!(loaded.metadata["site"], MetadataValue::Text("crater_rim".into()));
}

#[test]
fn ids_are_assigned_in_insertion_order() {
    let catalog = SqliteCatalog::open_in_memory().unwrap();

    let mut first = sample_record();
    let mut second = sample_record();
    second.uri = "file:///data/products/b.dat".into();

    let id1 = catalog.insert(&mut first).unwrap();
    let id2 = catalog.insert(&mut second).unwrap();

    assert!(id2 > id1);
    assert_eq!(catalog.list_ids().unwrap(), vec![id1, id2]);
}

#[test]
fn open_on_disk_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");

    let id = {
        let catalog = SqliteCatalog::open(&path).unwrap();
        let mut record = sample_record();
        catalog.insert(&mut record).unwrap()
    };

    let catalog = SqliteCatalog::open(&path).unwrap();
    let loaded = catalog.get(id).unwrap();
    assert_eq!(loaded.instrument_name, "cntx");
    assert_eq!(loaded.size_bytes, 1024);
}

// ═══════════════════════════════════════════════════════════════════════════
// UPDATE OPERATIONS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn update_science_utility() {
    let catalog = SqliteCatalog::open_in_memory().unwrap();
    let mut record = sample_record();
    let id = catalog.insert(&mut record).unwrap();

    catalog.update_science_utility(id, 2.5).unwrap();
    assert_eq!(catalog.get(id).unwrap().science_utility_estimate, 2.5);

    let err = catalog.update_science_utility(id + 100, 1.0).unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));
}

#[test]
fn update_priority_bin() {
    let catalog = SqliteCatalog::open_in_memory().unwrap();
    let mut record = sample_record();
    let id = catalog.insert(&mut record).unwrap();

    catalog.update_priority_bin(id, -4).unwrap();
    assert_eq!(catalog.get(id).unwrap().priority_bin, -4);

    let err = catalog.update_priority_bin(id + 100, 0).unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));
}

#[test]
fn update_downlink_state() {
    let catalog = SqliteCatalog::open_in_memory().unwrap();
    let mut record = sample_record();
    let id = catalog.insert(&mut record).unwrap();

    catalog.update_downlink_state(id, DownlinkState::Transmitted).unwrap();
    assert_eq!(catalog.get(id).unwrap().downlink_state, DownlinkState::Transmitted);

    catalog.update_downlink_state(id, DownlinkState::Downlinked).unwrap();
    assert_eq!(catalog.get(id).unwrap().downlink_state, DownlinkState::Downlinked);

    let err = catalog
        .update_downlink_state(id + 100, DownlinkState::Downlinked)
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));
}

#[test]
fn update_metadata_field() {
    let catalog = SqliteCatalog::open_in_memory().unwrap();
    let mut record = sample_record();
    let id = catalog.insert(&mut record).unwrap();

    // Overwrite an integer field with a string value; the type tag follows.
    catalog
        .update_metadata(id, "depth", &MetadataValue::Text("deep".into()))
        .unwrap();
    assert_eq!(catalog.get(id).unwrap().metadata["depth"], MetadataValue::Text("deep".into()));

    // Updating a field that was never inserted is NotFound, not an upsert.
    let err = catalog
        .update_metadata(id, "missing_field", &MetadataValue::Integer(1))
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));
}

// ═══════════════════════════════════════════════════════════════════════════
// MISSING ROWS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn get_missing_id_is_not_found() {
    let catalog = SqliteCatalog::open_in_memory().unwrap();
    let err = catalog.get(42).unwrap_err();
    assert!(matches!(err, StorageError::NotFound { id: 42 }));
}

#[test]
fn empty_catalog_lists_no_ids() {
    let catalog = SqliteCatalog::open_in_memory().unwrap();
    assert!(catalog.list_ids().unwrap().is_empty());
}

//! File-pair ingestion.
//!
//! Turns a raw data product on disk — the data file plus an optional JSON
//! metadata sidecar — into a catalogue row. The sidecar supplies the science
//! utility estimate, the priority bin, and the typed metadata bag.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use triage_core::errors::IngestError;
use triage_core::traits::catalog::ProductCatalog;
use triage_core::types::product::{DownlinkState, ProductEntry, ProductRecord};
use triage_core::types::value::MetadataValue;

/// A raw product handed to ingestion.
#[derive(Debug, Clone)]
pub struct ProductSubmission {
    pub instrument_name: String,
    pub product_type: String,
    /// Path of the data file; its on-disk size becomes the product size.
    pub uri: String,
    /// Path of the JSON metadata sidecar, if one was produced.
    pub metadata_uri: Option<String>,
}

/// The sidecar document shape. `science_utility_estimate` and
/// `priority_bin` are required with their exact types; the metadata object
/// is required but its values are filtered per-entry.
#[derive(Debug, Deserialize)]
struct Sidecar {
    science_utility_estimate: f64,
    priority_bin: i32,
    metadata: serde_json::Map<String, Value>,
}

/// Catalogue a submitted product, returning its assigned id.
///
/// Zero-size data files are rejected: the planner's relative-utility ratio
/// assumes every catalogued product has positive size.
pub fn submit_product(
    catalog: &dyn ProductCatalog,
    submission: &ProductSubmission,
) -> Result<i64, IngestError> {
    let size_bytes = fs::metadata(&submission.uri)
        .map_err(|e| IngestError::Io { uri: submission.uri.clone(), source: e })?
        .len();
    if size_bytes == 0 {
        return Err(IngestError::EmptyProduct { uri: submission.uri.clone() });
    }

    let (science_utility_estimate, priority_bin, metadata) = match &submission.metadata_uri {
        Some(metadata_uri) => parse_sidecar(Path::new(metadata_uri))?,
        None => {
            tracing::warn!(uri = %submission.uri, "no metadata sidecar provided; using defaults");
            (0.0, 0, ProductEntry::new())
        }
    };

    let mut record = ProductRecord {
        id: -1,
        instrument_name: submission.instrument_name.clone(),
        product_type: submission.product_type.clone(),
        uri: submission.uri.clone(),
        size_bytes,
        science_utility_estimate,
        priority_bin,
        downlink_state: DownlinkState::Untransmitted,
        metadata,
    };
    let id = catalog.insert(&mut record)?;
    tracing::debug!(id, uri = %record.uri, "product catalogued");
    Ok(id)
}

fn parse_sidecar(path: &Path) -> Result<(f64, i32, ProductEntry), IngestError> {
    let uri = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|e| IngestError::Io { uri: uri.clone(), source: e })?;
    let sidecar: Sidecar = serde_json::from_str(&text)
        .map_err(|e| IngestError::Sidecar { uri: uri.clone(), message: e.to_string() })?;

    let mut metadata = ProductEntry::new();
    for (field, value) in sidecar.metadata {
        // Integer identity matters for rule evaluation, so check i64 first.
        let typed = if let Some(i) = value.as_i64() {
            MetadataValue::Integer(i)
        } else if let Some(x) = value.as_f64() {
            MetadataValue::Float(x)
        } else if let Some(s) = value.as_str() {
            MetadataValue::Text(s.to_string())
        } else {
            tracing::warn!(field = %field, "unsupported metadata value type; skipping");
            continue;
        };
        metadata.insert(field, typed);
    }

    Ok((sidecar.science_utility_estimate, sidecar.priority_bin, metadata))
}

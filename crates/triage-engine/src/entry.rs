//! Reserved-field accessors for product entries.
//!
//! The planner injects these fields during snapshot assembly, so lookups are
//! expected to succeed; the fallbacks exist only so a hand-built entry in a
//! misconfigured rule cannot panic the engine.

use triage_core::types::product::{fields, ProductEntry};
use triage_core::types::value::MetadataValue;

pub(crate) fn id_of(entry: &ProductEntry) -> i64 {
    match entry.get(fields::ID) {
        Some(MetadataValue::Integer(id)) => *id,
        _ => 0,
    }
}

pub(crate) fn size_of(entry: &ProductEntry) -> i64 {
    match entry.get(fields::SIZE) {
        Some(MetadataValue::Integer(size)) => *size,
        _ => 0,
    }
}

pub(crate) fn numeric_field(entry: &ProductEntry, field: &str) -> f64 {
    match entry.get(field) {
        Some(value) if value.is_numeric() => value.as_numeric(),
        _ => 0.0,
    }
}

pub(crate) fn text_field<'a>(entry: &'a ProductEntry, field: &str) -> &'a str {
    entry.get(field).map(MetadataValue::as_text).unwrap_or("")
}

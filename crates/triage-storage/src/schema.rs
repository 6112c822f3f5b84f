//! Catalog schema.
//!
//! Two tables: one row per product, one row per metadata field. Applied
//! idempotently at open.

use rusqlite::Connection;
use triage_core::errors::StorageError;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS products (
    product_id INTEGER PRIMARY KEY,
    instrument_name TEXT NOT NULL,
    type TEXT NOT NULL,
    uri TEXT NOT NULL,
    size INTEGER NOT NULL,
    science_utility_estimate REAL NOT NULL,
    priority_bin INTEGER NOT NULL,
    downlink_state INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS product_metadata (
    product_id INTEGER NOT NULL,
    fieldname TEXT NOT NULL,
    type INTEGER NOT NULL,
    value_int INTEGER,
    value_float REAL,
    value_string TEXT,
    FOREIGN KEY(product_id) REFERENCES products(product_id),
    UNIQUE(product_id, fieldname)
);
";

/// Apply the catalog schema to a connection.
pub fn apply_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(SCHEMA)
        .map_err(|e| StorageError::SchemaFailed { message: e.to_string() })
}

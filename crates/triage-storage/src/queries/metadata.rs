//! `product_metadata` table queries.

use rusqlite::{params, Connection};
use triage_core::errors::StorageError;
use triage_core::types::product::ProductEntry;
use triage_core::types::value::MetadataValue;

use super::sqe;

/// Insert one metadata field for a product.
pub fn insert(
    conn: &Connection,
    product_id: i64,
    field: &str,
    value: &MetadataValue,
) -> Result<(), StorageError> {
    let (value_int, value_float, value_string) = value.to_columns();
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO product_metadata
             (product_id, fieldname, type, value_int, value_float, value_string)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(sqe)?;

    stmt.execute(params![
        product_id,
        field,
        value.type_tag(),
        value_int,
        value_float,
        value_string,
    ])
    .map_err(sqe)?;
    Ok(())
}

/// Load all metadata fields for a product.
///
/// Rows with an unknown type tag are skipped with a warning rather than
/// failing the whole load.
pub fn get_all(conn: &Connection, product_id: i64) -> Result<ProductEntry, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT fieldname, type, value_int, value_float, value_string
             FROM product_metadata WHERE product_id = ?1",
        )
        .map_err(sqe)?;

    let rows = stmt
        .query_map(params![product_id], |row| {
            let field: String = row.get(0)?;
            let tag: i64 = row.get(1)?;
            let value_int: i64 = row.get::<_, Option<i64>>(2)?.unwrap_or(0);
            let value_float: f64 = row.get::<_, Option<f64>>(3)?.unwrap_or(0.0);
            let value_string: String = row.get::<_, Option<String>>(4)?.unwrap_or_default();
            Ok((field, tag, value_int, value_float, value_string))
        })
        .map_err(sqe)?;

    let mut entry = ProductEntry::new();
    for row in rows {
        let (field, tag, value_int, value_float, value_string) = row.map_err(sqe)?;
        match MetadataValue::from_columns(tag, value_int, value_float, value_string) {
            Some(value) => {
                entry.insert(field, value);
            }
            None => {
                tracing::warn!(product_id, field = %field, tag, "unknown metadata type tag, skipping field");
            }
        }
    }
    Ok(entry)
}

/// Update one existing metadata field. Returns the changed-row count.
pub fn update(
    conn: &Connection,
    product_id: i64,
    field: &str,
    value: &MetadataValue,
) -> Result<usize, StorageError> {
    let (value_int, value_float, value_string) = value.to_columns();
    conn.execute(
        "UPDATE product_metadata
         SET type = ?1, value_int = ?2, value_float = ?3, value_string = ?4
         WHERE product_id = ?5 AND fieldname = ?6",
        params![
            value.type_tag(),
            value_int,
            value_float,
            value_string,
            product_id,
            field,
        ],
    )
    .map_err(sqe)
}

//! `products` table queries.

use rusqlite::{params, Connection, OptionalExtension};
use triage_core::errors::StorageError;
use triage_core::types::product::DownlinkState;

use super::sqe;

/// A product row without its metadata map.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: i64,
    pub instrument_name: String,
    pub product_type: String,
    pub uri: String,
    pub size_bytes: u64,
    pub science_utility_estimate: f64,
    pub priority_bin: i32,
    pub downlink_state: DownlinkState,
}

/// All product ids in insertion order.
pub fn list_ids(conn: &Connection) -> Result<Vec<i64>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT product_id FROM products ORDER BY product_id")
        .map_err(sqe)?;
    let rows = stmt.query_map([], |row| row.get(0)).map_err(sqe)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(sqe)?);
    }
    Ok(result)
}

/// Fetch one product row. `Ok(None)` when the id is not catalogued.
pub fn get(conn: &Connection, id: i64) -> Result<Option<ProductRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT product_id, instrument_name, type, uri, size,
                    science_utility_estimate, priority_bin, downlink_state
             FROM products WHERE product_id = ?1",
        )
        .map_err(sqe)?;

    let row = stmt
        .query_row(params![id], |row| {
            let state_code: i64 = row.get(7)?;
            Ok(ProductRow {
                id: row.get(0)?,
                instrument_name: row.get(1)?,
                product_type: row.get(2)?,
                uri: row.get(3)?,
                size_bytes: row.get::<_, i64>(4)? as u64,
                science_utility_estimate: row.get(5)?,
                priority_bin: row.get(6)?,
                downlink_state: DownlinkState::from_i64(state_code)
                    .unwrap_or(DownlinkState::Untransmitted),
            })
        })
        .optional()
        .map_err(sqe)?;
    Ok(row)
}

/// Insert a product row and return the assigned id.
pub fn insert(conn: &Connection, row: &ProductRow) -> Result<i64, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO products
             (instrument_name, type, uri, size,
              science_utility_estimate, priority_bin, downlink_state)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .map_err(sqe)?;

    stmt.execute(params![
        row.instrument_name,
        row.product_type,
        row.uri,
        row.size_bytes as i64,
        row.science_utility_estimate,
        row.priority_bin,
        row.downlink_state.to_i64(),
    ])
    .map_err(sqe)?;

    Ok(conn.last_insert_rowid())
}

/// Update the science utility estimate. Returns the changed-row count.
pub fn update_science_utility(conn: &Connection, id: i64, sue: f64) -> Result<usize, StorageError> {
    conn.execute(
        "UPDATE products SET science_utility_estimate = ?1 WHERE product_id = ?2",
        params![sue, id],
    )
    .map_err(sqe)
}

/// Update the priority bin. Returns the changed-row count.
pub fn update_priority_bin(conn: &Connection, id: i64, bin: i32) -> Result<usize, StorageError> {
    conn.execute(
        "UPDATE products SET priority_bin = ?1 WHERE product_id = ?2",
        params![bin, id],
    )
    .map_err(sqe)
}

/// Update the downlink state. Returns the changed-row count.
pub fn update_downlink_state(
    conn: &Connection,
    id: i64,
    state: DownlinkState,
) -> Result<usize, StorageError> {
    conn.execute(
        "UPDATE products SET downlink_state = ?1 WHERE product_id = ?2",
        params![state.to_i64(), id],
    )
    .map_err(sqe)
}

//! SQL query modules, one per table.

pub mod metadata;
pub mod products;

use triage_core::errors::StorageError;

/// Map a rusqlite error into the storage error shape.
pub(crate) fn sqe(e: impl std::fmt::Display) -> StorageError {
    StorageError::Sqlite { message: e.to_string() }
}

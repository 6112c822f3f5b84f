//! Storage-layer errors for catalog operations.

use super::error_code::{self, TriageErrorCode};

/// Errors that can occur in the catalog storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("product {id} not found")]
    NotFound { id: i64 },

    #[error("schema initialization failed: {message}")]
    SchemaFailed { message: String },
}

impl TriageErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Sqlite { .. } => error_code::STORAGE_ERROR,
            Self::NotFound { .. } => error_code::NOT_FOUND,
            Self::SchemaFailed { .. } => error_code::SCHEMA_FAILED,
        }
    }
}

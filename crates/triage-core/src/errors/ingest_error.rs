//! Ingestion errors.

use super::error_code::{self, TriageErrorCode};
use super::storage_error::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read product file {uri}: {source}")]
    Io {
        uri: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed metadata sidecar {uri}: {message}")]
    Sidecar { uri: String, message: String },

    #[error("product file {uri} is empty")]
    EmptyProduct { uri: String },

    #[error("catalog insertion failed")]
    Catalog(#[from] StorageError),
}

impl TriageErrorCode for IngestError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => error_code::INGEST_IO,
            Self::Sidecar { .. } => error_code::INGEST_SIDECAR,
            Self::EmptyProduct { .. } => error_code::INGEST_EMPTY,
            Self::Catalog(_) => error_code::STORAGE_ERROR,
        }
    }
}

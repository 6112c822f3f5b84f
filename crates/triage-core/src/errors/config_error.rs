//! Configuration loading errors.
//!
//! These cover only document-level failures (unreadable file, unparseable
//! JSON). Malformed individual rules, constraints, and similarity functions
//! are dropped with a log so the rest of the document still takes effect.

use super::error_code::{self, TriageErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration {path}: {message}")]
    Read { path: String, message: String },

    #[error("malformed configuration {path}: {message}")]
    Parse { path: String, message: String },
}

impl TriageErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Read { .. } => error_code::CONFIG_READ,
            Self::Parse { .. } => error_code::CONFIG_PARSE,
        }
    }
}

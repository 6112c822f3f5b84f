//! Planner errors.
//!
//! A prioritization run has exactly three outcomes: `Ok` (success, possibly
//! with an empty list), `Err(Timeout)`, or `Err(Catalog)` (failure). Soft
//! evaluation errors inside rule expressions never surface here.

use super::error_code::{self, TriageErrorCode};
use super::storage_error::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("prioritization exceeded the allotted processing time")]
    Timeout,

    #[error("catalog access failed during snapshot")]
    Catalog(#[from] StorageError),
}

impl TriageErrorCode for PlanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Timeout => error_code::PLAN_TIMEOUT,
            Self::Catalog(_) => error_code::PLAN_CATALOG,
        }
    }
}

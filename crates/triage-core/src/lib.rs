//! # triage-core
//!
//! Foundation crate for the triage downlink prioritization engine.
//! Defines the data model (metadata values, product records, downlink
//! states), error types, and capability traits (catalog, clock).
//! Every other crate in the workspace depends on this.

pub mod errors;
pub mod traits;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use errors::{ConfigError, IngestError, PlanError, StorageError};
pub use traits::catalog::ProductCatalog;
pub use traits::clock::{Clock, ManualClock, SystemClock};
pub use types::product::{DownlinkState, ProductEntry, ProductRecord};
pub use types::value::MetadataValue;

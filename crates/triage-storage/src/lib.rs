//! # triage-storage
//!
//! SQLite-backed product catalog. Owns the connection, applies the schema,
//! and implements the `ProductCatalog` trait from `triage-core`. All SQL
//! lives in the `queries` modules; nothing outside this crate touches a raw
//! connection.

pub mod catalog;
pub mod queries;
pub mod schema;

pub use catalog::SqliteCatalog;

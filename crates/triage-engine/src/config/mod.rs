//! Configuration loaders.
//!
//! Both loaders are tolerant at the item level: a malformed rule,
//! constraint, or similarity function is dropped with a log and the rest of
//! the document still takes effect. Only an unreadable or unparseable
//! document is a hard error.

pub mod rules_loader;
pub mod similarity_loader;

pub use rules_loader::{load_rule_config, parse_rule_config};
pub use similarity_loader::{load_similarity_config, parse_similarity_config};

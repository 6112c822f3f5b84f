//! # triage-engine
//!
//! The prioritization core: the rule expression language and its evaluator,
//! rule sets and constraints, the diversity-aware similarity subsystem, and
//! the per-bin max-marginal-relevance planner, plus the loaders that lift
//! JSON configuration into those structures and the file-pair ingestion path.

pub mod ast;
pub mod config;
pub mod ingest;
pub mod planner;
pub mod rules;
pub mod similarity;

mod entry;

pub use config::{load_rule_config, load_similarity_config, parse_rule_config, parse_similarity_config};
pub use ingest::{submit_product, ProductSubmission};
pub use planner::prioritize;
pub use rules::{Constraint, Rule, RuleSet};
pub use similarity::{Similarity, SimilarityFunction};

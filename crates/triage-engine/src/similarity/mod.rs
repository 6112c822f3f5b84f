//! Diversity-aware similarity.
//!
//! Each instrument/type pair can register a similarity function: an ordered
//! list of numeric metadata fields (the diversity descriptor), per-field
//! weights, and a kernel. The planner asks for a discount factor that mixes
//! raw utility against dissimilarity to the already-selected queue via the
//! per-bin alpha coefficient.
//!
//! Pairwise similarities are memoized for the lifetime of the instance,
//! keyed by unordered product-id pair.

use std::collections::{BTreeMap, HashMap};

use triage_core::types::product::{fields, ProductEntry};

use crate::entry::{id_of, numeric_field, text_field};

/// Lookup key for similarity functions: `(instrument_name, product_type)`.
pub type FunctionKey = (String, String);

/// Similarity functions registered for one scope (default or a single bin).
pub type FunctionMap = BTreeMap<FunctionKey, SimilarityFunction>;

const GAUSSIAN_KERNEL: &str = "gaussian";

/// Squared Euclidean distance over the common prefix of two vectors.
fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Gaussian kernel: `exp(-dist² / sigma²)`.
fn gaussian_similarity(sigma: f64, a: &[f64], b: &[f64]) -> f64 {
    (-(squared_distance(a, b) / (sigma * sigma))).exp()
}

/// A diversity-descriptor extraction plus kernel for one instrument/type.
#[derive(Debug, Clone)]
pub struct SimilarityFunction {
    descriptors: Vec<String>,
    weights: Vec<f64>,
    kernel: String,
    parameters: BTreeMap<String, f64>,
}

impl SimilarityFunction {
    pub fn new(
        descriptors: Vec<String>,
        weights: Vec<f64>,
        kernel: String,
        parameters: BTreeMap<String, f64>,
    ) -> Self {
        Self { descriptors, weights, kernel, parameters }
    }

    /// Read the descriptor vector off a product entry.
    ///
    /// Missing or non-numeric fields contribute 0.0 — a tolerance, not an
    /// error, so one product with sparse metadata cannot poison a bin.
    fn extract_descriptor(&self, product: &ProductEntry) -> Vec<f64> {
        self.descriptors
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let value = numeric_field(product, field);
                match self.weights.get(i) {
                    Some(weight) => value * weight,
                    None => value,
                }
            })
            .collect()
    }

    /// Kernel similarity between two products.
    pub fn similarity(&self, a: &ProductEntry, b: &ProductEntry) -> f64 {
        let da = self.extract_descriptor(a);
        let db = self.extract_descriptor(b);

        if self.kernel == GAUSSIAN_KERNEL {
            let sigma = match self.parameters.get("sigma") {
                Some(&sigma) => sigma,
                None => {
                    tracing::warn!("gaussian kernel missing sigma parameter; using 1.0");
                    1.0
                }
            };
            gaussian_similarity(sigma, &da, &db)
        } else {
            tracing::warn!(kernel = %self.kernel, "unknown similarity kernel; similarity is 0");
            0.0
        }
    }
}

/// Cache key: unordered product-id pair, smaller id first.
///
/// Ordering is enforced here, at construction, so symmetry cannot depend on
/// call sites.
fn pair_key(a: i64, b: i64) -> (i64, i64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn cached_similarity(
    cache: &mut HashMap<(i64, i64), f64>,
    function: &SimilarityFunction,
    a: &ProductEntry,
    b: &ProductEntry,
) -> f64 {
    let key = pair_key(id_of(a), id_of(b));
    if let Some(&similarity) = cache.get(&key) {
        return similarity;
    }
    let similarity = function.similarity(a, b);
    cache.insert(key, similarity);
    similarity
}

/// Per-bin similarity configuration plus the pairwise value cache.
///
/// Instances live for one prioritization run; dropping the instance drops
/// the cache.
#[derive(Debug, Clone)]
pub struct Similarity {
    default_alpha: f64,
    bin_alphas: BTreeMap<i32, f64>,
    default_functions: FunctionMap,
    bin_functions: BTreeMap<i32, FunctionMap>,
    cache: HashMap<(i64, i64), f64>,
}

impl Default for Similarity {
    /// An empty configuration: no functions, alpha 1.0 everywhere.
    fn default() -> Self {
        Self::new(1.0, BTreeMap::new(), FunctionMap::new(), BTreeMap::new())
    }
}

impl Similarity {
    pub fn new(
        default_alpha: f64,
        bin_alphas: BTreeMap<i32, f64>,
        default_functions: FunctionMap,
        bin_functions: BTreeMap<i32, FunctionMap>,
    ) -> Self {
        Self {
            default_alpha,
            bin_alphas,
            default_functions,
            bin_functions,
            cache: HashMap::new(),
        }
    }

    /// The mixing coefficient for a bin.
    pub fn alpha(&self, bin: i32) -> f64 {
        self.bin_alphas.get(&bin).copied().unwrap_or(self.default_alpha)
    }

    /// Number of unordered pairs evaluated so far. Exposed so callers (and
    /// tests) can observe cache behavior.
    pub fn cached_pairs(&self) -> usize {
        self.cache.len()
    }

    /// Maximum similarity between a candidate and any queue product of the
    /// same instrument/type.
    ///
    /// Returns 0.0 for an empty queue or when no function is registered for
    /// the candidate's instrument/type; products of a different
    /// instrument/type contribute nothing.
    pub fn max_similarity(
        &mut self,
        bin: i32,
        queue: &[&ProductEntry],
        candidate: &ProductEntry,
    ) -> f64 {
        if queue.is_empty() {
            return 0.0;
        }

        let candidate_key: FunctionKey = (
            text_field(candidate, fields::INSTRUMENT_NAME).to_string(),
            text_field(candidate, fields::TYPE).to_string(),
        );

        let functions = self.bin_functions.get(&bin).unwrap_or(&self.default_functions);
        let Some(function) = functions.get(&candidate_key) else {
            return 0.0;
        };

        let mut max_similarity: f64 = 0.0;
        for &other in queue {
            let other_key = (
                text_field(other, fields::INSTRUMENT_NAME).to_string(),
                text_field(other, fields::TYPE).to_string(),
            );
            if other_key != candidate_key {
                continue;
            }
            let similarity = cached_similarity(&mut self.cache, function, candidate, other);
            max_similarity = max_similarity.max(similarity);
        }

        max_similarity
    }

    /// Diversity discount for adding `candidate` to `queue`:
    /// `(1 - alpha) + alpha * (1 - max_similarity)`.
    ///
    /// Alpha 0 disables diversity; alpha 1 applies the full discount.
    pub fn discount_factor(
        &mut self,
        bin: i32,
        queue: &[&ProductEntry],
        candidate: &ProductEntry,
    ) -> f64 {
        let max_similarity = self.max_similarity(bin, queue, candidate);
        let alpha = self.alpha(bin);
        (1.0 - alpha) + alpha * (1.0 - max_similarity)
    }
}

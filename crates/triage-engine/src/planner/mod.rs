//! Max-marginal-relevance downlink planner.
//!
//! A prioritization run is a pure function of the catalogue snapshot, the
//! rule set, and the similarity configuration: snapshot the undownlinked
//! products, bucket them by priority bin, run the greedy MMR loop per bin in
//! ascending bin order, and concatenate the results.

pub mod timer;

use std::collections::BTreeMap;

use triage_core::errors::PlanError;
use triage_core::traits::catalog::ProductCatalog;
use triage_core::traits::clock::Clock;
use triage_core::types::product::{fields, DownlinkState, ProductEntry};
use triage_core::types::value::MetadataValue;

use crate::entry::{id_of, numeric_field, size_of};
use crate::rules::RuleSet;
use crate::similarity::Similarity;
use timer::Timer;

/// Prioritize the catalogue.
///
/// Returns the product ids in downlink order. `Err(Timeout)` when the
/// cooperative deadline expires, `Err(Catalog)` when a snapshot lookup
/// fails; an empty list is a valid success.
pub fn prioritize(
    catalog: &dyn ProductCatalog,
    rule_set: &RuleSet,
    similarity: &mut Similarity,
    clock: &dyn Clock,
    max_processing_secs: f64,
) -> Result<Vec<i64>, PlanError> {
    let timer = Timer::start(clock, max_processing_secs);

    // Snapshot: one entry per undownlinked product, bucketed by bin.
    // Transmitted products are already in flight; they are held out of the
    // MMR loop and never re-emitted.
    let mut binned: BTreeMap<i32, Vec<ProductEntry>> = BTreeMap::new();
    let mut held_out = 0usize;
    for id in catalog.list_ids()? {
        let record = catalog.get(id)?;
        match record.downlink_state {
            DownlinkState::Downlinked => continue,
            DownlinkState::Transmitted => {
                held_out += 1;
                continue;
            }
            DownlinkState::Untransmitted => {
                binned.entry(record.priority_bin).or_default().push(record.to_entry());
            }
        }
    }

    if timer.expired() {
        tracing::warn!("prioritization timed out after catalogue snapshot");
        return Err(PlanError::Timeout);
    }
    tracing::debug!(bins = binned.len(), held_out, "catalogue snapshot loaded");

    let mut prioritized = Vec::new();
    for (bin, candidates) in binned {
        if timer.expired() {
            tracing::warn!(bin, "prioritization timed out between bins");
            return Err(PlanError::Timeout);
        }
        let ordered = prioritize_bin(bin, candidates, rule_set, similarity);
        tracing::debug!(bin, selected = ordered.len(), "bin prioritized");
        prioritized.extend(ordered);
    }

    Ok(prioritized)
}

/// Greedy MMR selection within one bin.
///
/// Each round probes every remaining candidate as a hypothetical extension
/// of the selected queue and keeps the one maximizing marginal relative
/// utility (cumulative utility per cumulative byte). Ties go to the
/// first-probed candidate. A round with no admissible candidate ends the
/// bin early.
fn prioritize_bin(
    bin: i32,
    mut candidates: Vec<ProductEntry>,
    rule_set: &RuleSet,
    similarity: &mut Similarity,
) -> Vec<i64> {
    let mut selected: Vec<ProductEntry> = Vec::with_capacity(candidates.len());
    let mut cumulative_size: i64 = 0;
    let mut cumulative_sue: f64 = 0.0;

    let rounds = candidates.len();
    for _ in 0..rounds {
        // (candidate index, relative utility, final SUE at probe time)
        let mut best: Option<(usize, f64, f64)> = None;

        for idx in 0..candidates.len() {
            let selected_refs: Vec<&ProductEntry> = selected.iter().collect();
            let discount = similarity.discount_factor(bin, &selected_refs, &candidates[idx]);
            let final_sue =
                discount * numeric_field(&candidates[idx], fields::SCIENCE_UTILITY_ESTIMATE);
            candidates[idx].insert(
                fields::FINAL_SCIENCE_UTILITY_ESTIMATE.into(),
                MetadataValue::Float(final_sue),
            );

            let candidate_utility = cumulative_sue + final_sue;
            let candidate_size = cumulative_size + size_of(&candidates[idx]);

            let mut hypothetical: Vec<&ProductEntry> = selected.iter().collect();
            hypothetical.push(&candidates[idx]);
            let (admissible, adjustment) = rule_set.apply(bin, &hypothetical);
            if !admissible {
                continue;
            }

            let relative_utility = (candidate_utility + adjustment) / candidate_size as f64;
            let improves = match best {
                None => true,
                Some((_, best_value, _)) => relative_utility > best_value,
            };
            if improves {
                best = Some((idx, relative_utility, final_sue));
            }
        }

        // No admissible successor; the bin is done even with candidates left.
        let Some((best_idx, _, winner_final_sue)) = best else {
            break;
        };

        // The winner's final SUE was captured during its own probe this
        // round, so later probes cannot have clobbered it.
        let winner = candidates.remove(best_idx);
        cumulative_size += size_of(&winner);
        cumulative_sue += winner_final_sue;
        selected.push(winner);
    }

    selected.iter().map(|product| id_of(product)).collect()
}

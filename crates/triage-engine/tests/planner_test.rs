//! End-to-end planner scenarios.
//!
//! Every test drives `prioritize` against an in-memory catalog with a
//! deterministic clock, so expected orderings are computed by hand.

use serde_json::json;
use triage_core::errors::PlanError;
use triage_core::traits::catalog::ProductCatalog;
use triage_core::traits::clock::ManualClock;
use triage_core::traits::test_helpers::MemoryCatalog;
use triage_core::types::product::{DownlinkState, ProductEntry, ProductRecord};
use triage_core::types::value::MetadataValue;
use triage_engine::{parse_rule_config, parse_similarity_config, prioritize, RuleSet, Similarity};

const NO_TIMEOUT: f64 = 1e9;

struct ProductSpec {
    instrument: &'static str,
    size: u64,
    sue: f64,
    bin: i32,
    state: DownlinkState,
    dd: Option<f64>,
}

impl Default for ProductSpec {
    fn default() -> Self {
        Self {
            instrument: "cntx",
            size: 1,
            sue: 1.0,
            bin: 0,
            state: DownlinkState::Untransmitted,
            dd: None,
        }
    }
}

fn insert(catalog: &MemoryCatalog, spec: ProductSpec) -> i64 {
    let mut metadata = ProductEntry::new();
    if let Some(dd) = spec.dd {
        metadata.insert("dd".into(), MetadataValue::Float(dd));
    }
    let mut record = ProductRecord {
        id: -1,
        instrument_name: spec.instrument.into(),
        product_type: "flat".into(),
        uri: String::new(),
        size_bytes: spec.size,
        science_utility_estimate: spec.sue,
        priority_bin: spec.bin,
        downlink_state: spec.state,
        metadata,
    };
    catalog.insert(&mut record).unwrap()
}

fn run(catalog: &MemoryCatalog, rule_set: &RuleSet, similarity: &mut Similarity) -> Vec<i64> {
    let clock = ManualClock::new(0.0);
    prioritize(catalog, rule_set, similarity, &clock, NO_TIMEOUT).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// BOUNDARY CASES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn empty_catalog_is_an_empty_success() {
    let catalog = MemoryCatalog::new();
    let ids = run(&catalog, &RuleSet::default(), &mut Similarity::default());
    assert!(ids.is_empty());
}

#[test]
fn fully_downlinked_catalog_is_an_empty_success() {
    let catalog = MemoryCatalog::new();
    for _ in 0..3 {
        insert(&catalog, ProductSpec { state: DownlinkState::Downlinked, ..Default::default() });
    }
    let ids = run(&catalog, &RuleSet::default(), &mut Similarity::default());
    assert!(ids.is_empty());
}

#[test]
fn snapshot_failure_surfaces_as_a_catalog_error() {
    let catalog = MemoryCatalog::new();
    let id = insert(&catalog, ProductSpec::default());
    catalog.poison(id);

    let clock = ManualClock::new(0.0);
    let err = prioritize(
        &catalog,
        &RuleSet::default(),
        &mut Similarity::default(),
        &clock,
        NO_TIMEOUT,
    )
    .unwrap_err();
    assert!(matches!(err, PlanError::Catalog(_)));
}

#[test]
fn zero_duration_timer_times_out() {
    let catalog = MemoryCatalog::new();
    insert(&catalog, ProductSpec::default());

    let clock = ManualClock::new(0.0);
    let err = prioritize(
        &catalog,
        &RuleSet::default(),
        &mut Similarity::default(),
        &clock,
        0.0,
    )
    .unwrap_err();
    assert!(matches!(err, PlanError::Timeout));
}

// ═══════════════════════════════════════════════════════════════════════════
// ORDERING SCENARIOS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn identical_products_come_out_in_catalogue_order() {
    // No rules, no similarity functions: every probe ties, and ties go to
    // the first-probed candidate.
    let catalog = MemoryCatalog::new();
    let ids: Vec<i64> = (0..3).map(|_| insert(&catalog, ProductSpec::default())).collect();

    let plan = run(&catalog, &RuleSet::default(), &mut Similarity::default());
    assert_eq!(plan, ids);
}

#[test]
fn pair_rule_pulls_the_first_b_product_forward() {
    // Rule: a queue containing an "a" product and a "b" product earns +100,
    // at most once. Products 1 and 2 are "a" (SUE 1.0); product 3 is "b"
    // with SUE 0.1, product 4 is "b" with SUE 1.0.
    //
    // Round 1: no singleton queue can pair, so utilities are raw and
    // product 1 wins the tie. Round 2: adding either "b" completes the
    // pair; product 4's higher SUE wins (102/2 vs 101.1/2). The rest follow
    // by plain utility per byte.
    let doc = json!({
        "default": {
            "rules": [{
                "__type__": "Rule",
                "__contents__": {
                    "variables": ["x", "y"],
                    "application": {
                        "__type__": "BinaryLogicalExpression",
                        "__contents__": {
                            "operator": "AND",
                            "left_expression": {
                                "__type__": "ComparatorExpression",
                                "__contents__": {
                                    "comparator": "==",
                                    "left_expression": {
                                        "__type__": "Field",
                                        "__contents__": {"variable_name": "x", "field_name": "instrument_name"}
                                    },
                                    "right_expression": {
                                        "__type__": "StringConstant",
                                        "__contents__": {"value": "a"}
                                    }
                                }
                            },
                            "right_expression": {
                                "__type__": "ComparatorExpression",
                                "__contents__": {
                                    "comparator": "==",
                                    "left_expression": {
                                        "__type__": "Field",
                                        "__contents__": {"variable_name": "y", "field_name": "instrument_name"}
                                    },
                                    "right_expression": {
                                        "__type__": "StringConstant",
                                        "__contents__": {"value": "b"}
                                    }
                                }
                            }
                        }
                    },
                    "adjustment": {"__type__": "ConstExpression", "__contents__": {"value": 100.0}},
                    "max_applications": 1
                }
            }],
            "constraints": []
        }
    });
    let rule_set = parse_rule_config(&doc);

    let catalog = MemoryCatalog::new();
    let id1 = insert(&catalog, ProductSpec { instrument: "a", ..Default::default() });
    let id2 = insert(&catalog, ProductSpec { instrument: "a", ..Default::default() });
    let id3 = insert(&catalog, ProductSpec { instrument: "b", sue: 0.1, ..Default::default() });
    let id4 = insert(&catalog, ProductSpec { instrument: "b", ..Default::default() });

    let plan = run(&catalog, &rule_set, &mut Similarity::default());
    assert_eq!(plan, vec![id1, id4, id2, id3]);
}

#[test]
fn diversity_discount_orders_the_duplicate_last() {
    // Three equal-utility products with descriptors [0], [0], [10] under a
    // gaussian kernel at alpha 1. The first [0] wins the opening tie, the
    // [10] product keeps nearly full utility (discount ~1), and the second
    // [0] is fully discounted against the first.
    let doc = json!({
        "alphas": {"0": 1.0},
        "functions": {
            "default": [{
                "key": ["cntx", "flat"],
                "function": {
                    "diversity_descriptor": ["dd"],
                    "weights": [1.0],
                    "similarity_type": "gaussian",
                    "similarity_parameters": {"sigma": 1.0}
                }
            }]
        }
    });
    let mut similarity = parse_similarity_config(&doc);

    let catalog = MemoryCatalog::new();
    let id1 = insert(&catalog, ProductSpec { dd: Some(0.0), ..Default::default() });
    let id2 = insert(&catalog, ProductSpec { dd: Some(0.0), ..Default::default() });
    let id3 = insert(&catalog, ProductSpec { dd: Some(10.0), ..Default::default() });

    let plan = run(&catalog, &RuleSet::default(), &mut similarity);
    assert_eq!(plan, vec![id1, id3, id2]);
}

#[test]
fn count_constraint_caps_the_plan_length() {
    // "fewer than 3 selected": queues of size 3 are inadmissible, so the
    // bin ends after two picks even with candidates remaining.
    let doc = json!({
        "default": {
            "rules": [],
            "constraints": [{
                "__type__": "Constraint",
                "__contents__": {
                    "variables": ["x"],
                    "application": {"__type__": "LogicalConstant", "__contents__": {"value": true}},
                    "sum_field": null,
                    "constraint_value": 3.0
                }
            }]
        }
    });
    let rule_set = parse_rule_config(&doc);

    let catalog = MemoryCatalog::new();
    let ids: Vec<i64> = (0..6).map(|_| insert(&catalog, ProductSpec::default())).collect();

    let plan = run(&catalog, &rule_set, &mut Similarity::default());
    assert_eq!(plan, ids[..2].to_vec());
}

#[test]
fn bins_are_emitted_in_ascending_order() {
    // Bin 3 holds the highest-utility products, but bin 1 still goes first.
    let catalog = MemoryCatalog::new();
    let high_a = insert(&catalog, ProductSpec { bin: 3, sue: 10.0, ..Default::default() });
    let high_b = insert(&catalog, ProductSpec { bin: 3, sue: 20.0, ..Default::default() });
    let low_a = insert(&catalog, ProductSpec { bin: 1, sue: 0.5, ..Default::default() });
    let low_b = insert(&catalog, ProductSpec { bin: 1, sue: 0.25, ..Default::default() });

    let plan = run(&catalog, &RuleSet::default(), &mut Similarity::default());
    assert_eq!(plan, vec![low_a, low_b, high_b, high_a]);
}

// ═══════════════════════════════════════════════════════════════════════════
// INVARIANTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn downlinked_and_transmitted_products_never_appear() {
    let catalog = MemoryCatalog::new();
    let kept = insert(&catalog, ProductSpec::default());
    insert(&catalog, ProductSpec { state: DownlinkState::Transmitted, ..Default::default() });
    insert(&catalog, ProductSpec { state: DownlinkState::Downlinked, ..Default::default() });
    let kept_too = insert(&catalog, ProductSpec::default());

    let plan = run(&catalog, &RuleSet::default(), &mut Similarity::default());
    assert_eq!(plan, vec![kept, kept_too]);
}

#[test]
fn plan_contains_no_duplicates() {
    let catalog = MemoryCatalog::new();
    for i in 0..8 {
        insert(&catalog, ProductSpec { sue: (i as f64) * 0.3 + 0.1, ..Default::default() });
    }
    let plan = run(&catalog, &RuleSet::default(), &mut Similarity::default());

    let mut seen = std::collections::BTreeSet::new();
    for id in &plan {
        assert!(seen.insert(*id), "id {id} appears twice");
    }
    assert_eq!(plan.len(), 8, "every untransmitted product is planned");
}

#[test]
fn planning_is_deterministic_and_repeatable() {
    let doc = json!({
        "alphas": {"default": 0.5},
        "functions": {
            "default": [{
                "key": ["cntx", "flat"],
                "function": {
                    "diversity_descriptor": ["dd"],
                    "weights": [2.0],
                    "similarity_type": "gaussian",
                    "similarity_parameters": {"sigma": 2.0}
                }
            }]
        }
    });

    let catalog = MemoryCatalog::new();
    for i in 0..6 {
        insert(
            &catalog,
            ProductSpec {
                sue: 1.0 + (i % 3) as f64,
                size: 1 + (i % 2) as u64,
                dd: Some(i as f64),
                ..Default::default()
            },
        );
    }

    let rule_set = RuleSet::default();
    let mut first_similarity = parse_similarity_config(&doc);
    let first = run(&catalog, &rule_set, &mut first_similarity);

    // A fresh similarity instance (empty cache) must reproduce the plan.
    let mut second_similarity = parse_similarity_config(&doc);
    let second = run(&catalog, &rule_set, &mut second_similarity);
    assert_eq!(first, second);

    // Re-running with the warm cache must too.
    let third = run(&catalog, &rule_set, &mut first_similarity);
    assert_eq!(first, third);
}

#[test]
fn planner_injected_fields_win_over_user_metadata() {
    let catalog = MemoryCatalog::new();

    let mut record = ProductRecord {
        id: -1,
        instrument_name: "cntx".into(),
        product_type: "flat".into(),
        uri: String::new(),
        size_bytes: 1,
        science_utility_estimate: 1.0,
        priority_bin: 0,
        downlink_state: DownlinkState::Untransmitted,
        metadata: ProductEntry::new(),
    };
    // A hostile id field must not leak into the plan output.
    record.metadata.insert("id".into(), MetadataValue::Integer(999));
    record.metadata.insert("size".into(), MetadataValue::Text("bogus".into()));
    let id = catalog.insert(&mut record).unwrap();

    let plan = run(&catalog, &RuleSet::default(), &mut Similarity::default());
    assert_eq!(plan, vec![id]);
}

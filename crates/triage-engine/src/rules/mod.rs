//! Rules, constraints, and per-bin rule sets.
//!
//! A rule adjusts the utility of a candidate queue whenever its application
//! expression holds for some assignment of queue products to its variables.
//! A constraint bounds an aggregate over the queue; a queue is admissible
//! only when every constraint of its bin holds.

use std::collections::BTreeMap;

use triage_core::types::product::ProductEntry;

use crate::ast::{Assignments, BoolExprId, ExprArena, ValueExprId};

/// A utility-adjustment rule over one or two queue variables.
#[derive(Debug, Clone)]
pub struct Rule {
    variables: Vec<String>,
    application: BoolExprId,
    adjustment: ValueExprId,
    max_applications: i32,
}

impl Rule {
    /// `max_applications < 0` means unbounded.
    pub fn new(
        variables: Vec<String>,
        application: BoolExprId,
        adjustment: ValueExprId,
        max_applications: i32,
    ) -> Self {
        Self { variables, application, adjustment, max_applications }
    }

    fn capped(&self, applications: i32) -> bool {
        self.max_applications >= 0 && applications >= self.max_applications
    }

    /// Total adjustment contributed by this rule over the queue.
    ///
    /// Assignments are enumerated in queue order; for two variables the
    /// first variable is the outer loop. Enumeration stops as soon as the
    /// application count reaches `max_applications`.
    pub fn apply(&self, arena: &ExprArena, queue: &[&ProductEntry]) -> f64 {
        let mut applications = 0;
        let mut total = 0.0;

        // A zero cap means the counter starts at its limit.
        if self.capped(applications) {
            return total;
        }

        match self.variables.as_slice() {
            [var] => {
                for &product in queue {
                    let mut env = Assignments::new();
                    env.insert(var.as_str(), product);
                    if self.eval_one(arena, &env, queue, &mut total, &mut applications) {
                        break;
                    }
                }
            }

            [first, second] => {
                'outer: for &a in queue {
                    for &b in queue {
                        let mut env = Assignments::new();
                        env.insert(first.as_str(), a);
                        env.insert(second.as_str(), b);
                        if self.eval_one(arena, &env, queue, &mut total, &mut applications) {
                            break 'outer;
                        }
                    }
                }
            }

            _ => {
                tracing::warn!(
                    arity = self.variables.len(),
                    "rules support one or two variables; skipping"
                );
            }
        }

        total
    }

    /// Evaluate one assignment; returns true when the application cap was
    /// reached and enumeration should stop.
    fn eval_one(
        &self,
        arena: &ExprArena,
        env: &Assignments<'_>,
        queue: &[&ProductEntry],
        total: &mut f64,
        applications: &mut i32,
    ) -> bool {
        if !arena.eval_bool(self.application, env, queue) {
            return false;
        }
        let adjustment = arena.eval_value(self.adjustment, env, queue);
        if adjustment.is_numeric() {
            *total += adjustment.as_numeric();
            *applications += 1;
        } else {
            tracing::warn!("rule adjustment evaluated to a non-numeric value; skipping");
        }
        self.capped(*applications)
    }
}

/// An upper-bound constraint over a single queue variable.
#[derive(Debug, Clone)]
pub struct Constraint {
    variables: Vec<String>,
    application: BoolExprId,
    sum_field: Option<ValueExprId>,
    limit: f64,
}

impl Constraint {
    /// `sum_field: None` counts satisfying products instead of summing a
    /// field.
    pub fn new(
        variables: Vec<String>,
        application: BoolExprId,
        sum_field: Option<ValueExprId>,
        limit: f64,
    ) -> Self {
        Self { variables, application, sum_field, limit }
    }

    /// Whether the queue satisfies this constraint (strict upper bound).
    ///
    /// Only one-variable constraints are supported; any other arity is
    /// trivially satisfied so a misconfigured constraint cannot block an
    /// entire bin.
    pub fn apply(&self, arena: &ExprArena, queue: &[&ProductEntry]) -> bool {
        let [var] = self.variables.as_slice() else {
            tracing::warn!(
                arity = self.variables.len(),
                "constraints support exactly one variable; treating as satisfied"
            );
            return true;
        };

        let mut aggregate = 0.0;
        for &product in queue {
            let mut env = Assignments::new();
            env.insert(var.as_str(), product);
            if !arena.eval_bool(self.application, &env, queue) {
                continue;
            }
            match self.sum_field {
                Some(sum_field) => {
                    let value = arena.eval_value(sum_field, &env, queue);
                    if value.is_numeric() {
                        aggregate += value.as_numeric();
                    } else {
                        tracing::warn!("constraint sum field evaluated to a non-numeric value; skipping");
                    }
                }
                None => aggregate += 1.0,
            }
        }

        aggregate < self.limit
    }
}

/// Per-bin rules and constraints with defaults, plus the expression arena
/// every rule in the set refers into.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    arena: ExprArena,
    default_rules: Vec<Rule>,
    default_constraints: Vec<Constraint>,
    bin_rules: BTreeMap<i32, Vec<Rule>>,
    bin_constraints: BTreeMap<i32, Vec<Constraint>>,
}

impl RuleSet {
    pub fn new(
        arena: ExprArena,
        default_rules: Vec<Rule>,
        default_constraints: Vec<Constraint>,
        bin_rules: BTreeMap<i32, Vec<Rule>>,
        bin_constraints: BTreeMap<i32, Vec<Constraint>>,
    ) -> Self {
        Self { arena, default_rules, default_constraints, bin_rules, bin_constraints }
    }

    pub fn arena(&self) -> &ExprArena {
        &self.arena
    }

    /// The rule list for a bin, falling back to the defaults.
    pub fn rules(&self, bin: i32) -> &[Rule] {
        self.bin_rules.get(&bin).unwrap_or(&self.default_rules)
    }

    /// The constraint list for a bin, falling back to the defaults.
    pub fn constraints(&self, bin: i32) -> &[Constraint] {
        self.bin_constraints.get(&bin).unwrap_or(&self.default_constraints)
    }

    /// Check admissibility and compute the total rule adjustment for a queue.
    ///
    /// Constraints are checked in order and evaluation stops at the first
    /// violation, returning `(false, 0.0)`. An admissible queue gets the sum
    /// of all rule adjustments.
    pub fn apply(&self, bin: i32, queue: &[&ProductEntry]) -> (bool, f64) {
        for constraint in self.constraints(bin) {
            if !constraint.apply(&self.arena, queue) {
                return (false, 0.0);
            }
        }

        let mut utility = 0.0;
        for rule in self.rules(bin) {
            utility += rule.apply(&self.arena, queue);
        }
        (true, utility)
    }
}

//! Rule expression trees.
//!
//! Expressions come in two kinds: Boolean-valued (rule applicability,
//! constraint applicability) and value-valued (adjustments, sum fields).
//! All nodes live in a single arena owned by the rule set; children are
//! referenced by typed index, so a rule set is plain data with no pointer
//! graph to manage.
//!
//! Evaluation never fails. Type mismatches, unknown fields, and unknown
//! variables degrade to a benign sentinel (`false` for Booleans, NaN for
//! values) with a log entry, so a misconfigured rule cannot abort a
//! planning run.

use std::collections::BTreeMap;

use triage_core::types::product::ProductEntry;
use triage_core::types::value::MetadataValue;

/// Variable bindings in effect during one rule application.
///
/// Built fresh per application; borrows the entries it references.
pub type Assignments<'a> = BTreeMap<&'a str, &'a ProductEntry>;

/// Index of a Boolean expression in an [`ExprArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoolExprId(usize);

/// Index of a value expression in an [`ExprArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueExprId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
}

/// Boolean-valued expression node.
#[derive(Debug, Clone)]
pub enum BoolExpr {
    Constant(bool),
    Not(BoolExprId),
    Logical {
        op: LogicalOp,
        left: BoolExprId,
        right: BoolExprId,
    },
    Compare {
        op: CompareOp,
        left: ValueExprId,
        right: ValueExprId,
    },
    /// True iff `body` holds for some product in the queue bound to
    /// `variable`.
    Exists { variable: String, body: BoolExprId },
}

/// Value-valued expression node.
#[derive(Debug, Clone)]
pub enum ValueExpr {
    Number(f64),
    Text(String),
    Negate(ValueExprId),
    Arith {
        op: ArithOp,
        left: ValueExprId,
        right: ValueExprId,
    },
    /// Look up `field` on the product bound to `variable`.
    Field { variable: String, field: String },
}

/// Arena holding every expression node of a rule set.
#[derive(Debug, Clone, Default)]
pub struct ExprArena {
    bools: Vec<BoolExpr>,
    values: Vec<ValueExpr>,
}

impl ExprArena {
    pub fn push_bool(&mut self, expr: BoolExpr) -> BoolExprId {
        self.bools.push(expr);
        BoolExprId(self.bools.len() - 1)
    }

    pub fn push_value(&mut self, expr: ValueExpr) -> ValueExprId {
        self.values.push(expr);
        ValueExprId(self.values.len() - 1)
    }

    /// Evaluate a Boolean expression against the current bindings and queue.
    pub fn eval_bool<'a>(
        &'a self,
        id: BoolExprId,
        env: &Assignments<'a>,
        queue: &[&'a ProductEntry],
    ) -> bool {
        match &self.bools[id.0] {
            BoolExpr::Constant(value) => *value,

            BoolExpr::Not(inner) => !self.eval_bool(*inner, env, queue),

            // Short-circuit evaluation is load-bearing: the existential
            // quantifier relies on it to terminate early.
            BoolExpr::Logical { op, left, right } => match op {
                LogicalOp::And => {
                    self.eval_bool(*left, env, queue) && self.eval_bool(*right, env, queue)
                }
                LogicalOp::Or => {
                    self.eval_bool(*left, env, queue) || self.eval_bool(*right, env, queue)
                }
            },

            BoolExpr::Compare { op, left, right } => {
                let left = self.eval_value(*left, env, queue);
                let right = self.eval_value(*right, env, queue);
                self.compare(*op, &left, &right)
            }

            BoolExpr::Exists { variable, body } => {
                for &product in queue {
                    let mut inner_env = env.clone();
                    inner_env.insert(variable.as_str(), product);
                    if self.eval_bool(*body, &inner_env, queue) {
                        return true;
                    }
                }
                false
            }
        }
    }

    /// Evaluate a value expression against the current bindings and queue.
    pub fn eval_value<'a>(
        &'a self,
        id: ValueExprId,
        env: &Assignments<'a>,
        queue: &[&'a ProductEntry],
    ) -> MetadataValue {
        match &self.values[id.0] {
            ValueExpr::Number(x) => MetadataValue::Float(*x),

            ValueExpr::Text(s) => MetadataValue::Text(s.clone()),

            ValueExpr::Negate(inner) => {
                let value = self.eval_value(*inner, env, queue);
                if value.is_numeric() {
                    MetadataValue::Float(-value.as_numeric())
                } else {
                    tracing::warn!("negation of a non-numeric value");
                    MetadataValue::Float(f64::NAN)
                }
            }

            ValueExpr::Arith { op, left, right } => {
                let left = self.eval_value(*left, env, queue);
                let right = self.eval_value(*right, env, queue);
                if left.is_numeric() && right.is_numeric() {
                    let (l, r) = (left.as_numeric(), right.as_numeric());
                    let result = match op {
                        ArithOp::Add => l + r,
                        ArithOp::Sub => l - r,
                        ArithOp::Mul => l * r,
                    };
                    MetadataValue::Float(result)
                } else {
                    tracing::warn!(?op, "arithmetic on a non-numeric operand");
                    MetadataValue::Float(f64::NAN)
                }
            }

            ValueExpr::Field { variable, field } => match env.get(variable.as_str()) {
                Some(product) => match product.get(field) {
                    Some(value) => value.clone(),
                    None => {
                        tracing::debug!(variable = %variable, field = %field, "field not present on product");
                        MetadataValue::Float(f64::NAN)
                    }
                },
                None => {
                    tracing::debug!(variable = %variable, "variable not bound");
                    MetadataValue::Float(f64::NAN)
                }
            },
        }
    }

    fn compare(&self, op: CompareOp, left: &MetadataValue, right: &MetadataValue) -> bool {
        if left.is_numeric() != right.is_numeric() {
            tracing::warn!("comparison between numeric and string values");
            return false;
        }
        if left.is_numeric() {
            let (l, r) = (left.as_numeric(), right.as_numeric());
            match op {
                CompareOp::Eq => l == r,
                CompareOp::Ne => l != r,
                CompareOp::Gt => l > r,
                CompareOp::Ge => l >= r,
                CompareOp::Lt => l < r,
                CompareOp::Le => l <= r,
            }
        } else {
            let (l, r) = (left.as_text(), right.as_text());
            match op {
                CompareOp::Eq => l == r,
                CompareOp::Ne => l != r,
                _ => {
                    tracing::warn!(?op, "ordering comparison between strings");
                    false
                }
            }
        }
    }
}

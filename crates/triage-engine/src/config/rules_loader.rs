//! Rule configuration loader.
//!
//! The document is one top-level object whose keys are either `"default"`
//! or a decimal bin number, each value carrying `rules` and `constraints`
//! arrays. Every expression node is wrapped in the envelope
//! `{"__type__": Name, "__contents__": {field: child, ...}}`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;
use triage_core::errors::ConfigError;

use crate::ast::{
    ArithOp, BoolExpr, BoolExprId, CompareOp, ExprArena, LogicalOp, ValueExpr, ValueExprId,
};
use crate::rules::{Constraint, Rule, RuleSet};

/// Read and parse a rule configuration file.
pub fn load_rule_config(path: &Path) -> Result<RuleSet, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let doc: Value = serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(parse_rule_config(&doc))
}

/// Lift a parsed document into a rule set.
pub fn parse_rule_config(doc: &Value) -> RuleSet {
    let Some(map) = doc.as_object() else {
        tracing::warn!("rule configuration is not an object; using an empty rule set");
        return RuleSet::default();
    };

    let mut arena = ExprArena::default();
    let mut default_rules = Vec::new();
    let mut default_constraints = Vec::new();
    let mut bin_rules = BTreeMap::new();
    let mut bin_constraints = BTreeMap::new();

    for (key, bin_value) in map {
        let (rules, constraints) = parse_bin(bin_value, &mut arena);
        if key == "default" {
            default_rules = rules;
            default_constraints = constraints;
        } else {
            match key.parse::<i32>() {
                Ok(bin) => {
                    bin_rules.insert(bin, rules);
                    bin_constraints.insert(bin, constraints);
                }
                Err(_) => {
                    tracing::warn!(key = %key, "rule configuration key is neither \"default\" nor a bin number; skipping");
                }
            }
        }
    }

    RuleSet::new(arena, default_rules, default_constraints, bin_rules, bin_constraints)
}

fn parse_bin(value: &Value, arena: &mut ExprArena) -> (Vec<Rule>, Vec<Constraint>) {
    let mut rules = Vec::new();
    let mut constraints = Vec::new();

    if let Some(items) = value.get("rules").and_then(Value::as_array) {
        for item in items {
            match parse_rule(item, arena) {
                Some(rule) => rules.push(rule),
                None => tracing::warn!("dropping malformed rule"),
            }
        }
    }

    if let Some(items) = value.get("constraints").and_then(Value::as_array) {
        for item in items {
            match parse_constraint(item, arena) {
                Some(constraint) => constraints.push(constraint),
                None => tracing::warn!("dropping malformed constraint"),
            }
        }
    }

    (rules, constraints)
}

fn parse_rule(value: &Value, arena: &mut ExprArena) -> Option<Rule> {
    if node_type(value)? != "Rule" {
        return None;
    }
    let variables = parse_variables(contents(value, "variables")?)?;
    let application = parse_bool_expr(contents(value, "application")?, arena)?;
    let adjustment = parse_value_expr(contents(value, "adjustment")?, arena)?;
    // Absent or malformed means unbounded.
    let max_applications = contents(value, "max_applications")
        .and_then(Value::as_i64)
        .map(|n| n as i32)
        .unwrap_or(-1);
    Some(Rule::new(variables, application, adjustment, max_applications))
}

fn parse_constraint(value: &Value, arena: &mut ExprArena) -> Option<Constraint> {
    if node_type(value)? != "Constraint" {
        return None;
    }
    let variables = parse_variables(contents(value, "variables")?)?;
    let application = parse_bool_expr(contents(value, "application")?, arena)?;
    // `sum_field` may be null or absent entirely; both mean count semantics.
    let sum_field = match contents(value, "sum_field") {
        None => None,
        Some(Value::Null) => None,
        Some(node) => Some(parse_value_expr(node, arena)?),
    };
    let limit = contents(value, "constraint_value")?.as_f64()?;
    Some(Constraint::new(variables, application, sum_field, limit))
}

/// The `__type__` discriminator of an envelope node.
fn node_type(value: &Value) -> Option<&str> {
    value.get("__type__")?.as_str()
}

/// A named child within a node's `__contents__`.
fn contents<'v>(value: &'v Value, field: &str) -> Option<&'v Value> {
    value.get("__contents__")?.as_object()?.get(field)
}

/// A list of variable names; non-string items are skipped.
fn parse_variables(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

fn parse_bool_expr(value: &Value, arena: &mut ExprArena) -> Option<BoolExprId> {
    let expr = match node_type(value)? {
        "LogicalConstant" => BoolExpr::Constant(contents(value, "value")?.as_bool()?),

        "LogicalNot" => {
            let inner = parse_bool_expr(contents(value, "expression")?, arena)?;
            BoolExpr::Not(inner)
        }

        "BinaryLogicalExpression" => {
            let op = match contents(value, "operator")?.as_str()? {
                "AND" => LogicalOp::And,
                "OR" => LogicalOp::Or,
                other => {
                    tracing::warn!(operator = %other, "unknown logical operator");
                    return None;
                }
            };
            let left = parse_bool_expr(contents(value, "left_expression")?, arena)?;
            let right = parse_bool_expr(contents(value, "right_expression")?, arena)?;
            BoolExpr::Logical { op, left, right }
        }

        "ComparatorExpression" => {
            let op = match contents(value, "comparator")?.as_str()? {
                "==" => CompareOp::Eq,
                "!=" => CompareOp::Ne,
                ">" => CompareOp::Gt,
                ">=" => CompareOp::Ge,
                "<" => CompareOp::Lt,
                "<=" => CompareOp::Le,
                other => {
                    tracing::warn!(comparator = %other, "unknown comparator");
                    return None;
                }
            };
            let left = parse_value_expr(contents(value, "left_expression")?, arena)?;
            let right = parse_value_expr(contents(value, "right_expression")?, arena)?;
            BoolExpr::Compare { op, left, right }
        }

        "ExistentialExpression" => {
            let variable = contents(value, "variable")?.as_str()?.to_string();
            let body = parse_bool_expr(contents(value, "expression")?, arena)?;
            BoolExpr::Exists { variable, body }
        }

        other => {
            tracing::warn!(node = %other, "unknown Boolean expression node");
            return None;
        }
    };
    Some(arena.push_bool(expr))
}

fn parse_value_expr(value: &Value, arena: &mut ExprArena) -> Option<ValueExprId> {
    let expr = match node_type(value)? {
        "ConstExpression" => ValueExpr::Number(contents(value, "value")?.as_f64()?),

        "StringConstant" => ValueExpr::Text(contents(value, "value")?.as_str()?.to_string()),

        "MinusExpression" => {
            let inner = parse_value_expr(contents(value, "expression")?, arena)?;
            ValueExpr::Negate(inner)
        }

        "BinaryExpression" => {
            let op = match contents(value, "operator")?.as_str()? {
                "+" => ArithOp::Add,
                "-" => ArithOp::Sub,
                "*" => ArithOp::Mul,
                other => {
                    tracing::warn!(operator = %other, "unknown arithmetic operator");
                    return None;
                }
            };
            let left = parse_value_expr(contents(value, "left_expression")?, arena)?;
            let right = parse_value_expr(contents(value, "right_expression")?, arena)?;
            ValueExpr::Arith { op, left, right }
        }

        "Field" => {
            let variable = contents(value, "variable_name")?.as_str()?.to_string();
            let field = contents(value, "field_name")?.as_str()?.to_string();
            ValueExpr::Field { variable, field }
        }

        other => {
            tracing::warn!(node = %other, "unknown value expression node");
            return None;
        }
    };
    Some(arena.push_value(expr))
}

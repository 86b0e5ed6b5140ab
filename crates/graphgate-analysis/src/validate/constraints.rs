//! Per-property rules over model graph nodes.

use graphgate_core::artifact::Violation;
use graphgate_core::model::{ModelGraph, ModelNode, PropertyRule, RuleKind};
use serde_json::Value;

pub const PROP_NOT_BOOLEAN: &str = "prop.notBoolean";
pub const PROP_NOT_NON_NEGATIVE_INTEGER: &str = "prop.notNonNegativeInteger";
pub const PROP_MISSING: &str = "prop.missing";

/// Whether `value` is an integer `>= 0`. Floats with no fractional part
/// count, since JSON does not distinguish `3` from `3.0` for most producers.
#[allow(clippy::float_cmp)]
fn is_non_negative_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f >= 0.0 && f.fract() == 0.0)
        }
        _ => false,
    }
}

fn applies_to(rule: &PropertyRule, node: &ModelNode) -> bool {
    rule.kind
        .as_deref()
        .is_none_or(|kind| node.kind.as_deref() == Some(kind))
}

fn check_node(rule: &PropertyRule, node: &ModelNode) -> Option<Violation> {
    let value = node.props.get(&rule.property);
    let (id, message) = match (rule.rule, value) {
        (RuleKind::Required, None) => (
            PROP_MISSING,
            format!("{} is missing required property `{}`", node.id, rule.property),
        ),
        (RuleKind::Boolean, Some(v)) if !v.is_boolean() => (
            PROP_NOT_BOOLEAN,
            format!("{}.{} must be a boolean, got {v}", node.id, rule.property),
        ),
        (RuleKind::NonNegativeInteger, Some(v)) if !is_non_negative_integer(v) => (
            PROP_NOT_NON_NEGATIVE_INTEGER,
            format!(
                "{}.{} must be a non-negative integer, got {v}",
                node.id, rule.property
            ),
        ),
        _ => return None,
    };

    Some(Violation {
        id: id.to_string(),
        node: node.id.clone(),
        message,
        severity: rule.severity,
    })
}

/// Evaluate `extra_rules` followed by the graph's own rules on every node.
///
/// Rules that appear in both lists are evaluated once. Violations come out
/// in node order, then rule order.
#[must_use]
pub fn check_constraints(graph: &ModelGraph, extra_rules: &[PropertyRule]) -> Vec<Violation> {
    let mut rules: Vec<&PropertyRule> = Vec::with_capacity(extra_rules.len() + graph.rules.len());
    for rule in extra_rules.iter().chain(&graph.rules) {
        if !rules.contains(&rule) {
            rules.push(rule);
        }
    }

    graph
        .nodes
        .iter()
        .flat_map(|node| {
            rules
                .iter()
                .filter(move |rule| applies_to(rule, node))
                .filter_map(move |rule| check_node(rule, node))
        })
        .collect()
}

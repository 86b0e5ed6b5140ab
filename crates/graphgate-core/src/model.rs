//! Semantic node-port graph checked by the validation engine.
//!
//! Nodes declare ordered input and output port types and carry a free-form
//! property map. Edges may name the port type they expect to carry. The
//! document may also declare per-property rules; these are merged with the
//! rules from configuration before checking.
//!
//! Loading rejects documents that cannot be checked at all: bad JSON, a
//! missing `nodes` or `edges` list, unknown keys, and empty or duplicate node
//! ids. Edges pointing at unknown nodes are left for the validation engine to
//! report as violations.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::error::{GateError, Result};

const ARTIFACT: &str = "model graph";

/// Violation severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
        })
    }
}

/// A node of the semantic graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Declared input port types, in port order.
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Declared output port types, in port order.
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default, alias = "properties")]
    pub props: BTreeMap<String, Value>,
}

/// An edge of the semantic graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelEdge {
    pub from: String,
    pub to: String,
    /// Port type the edge is expected to carry.
    #[serde(default, rename = "type", alias = "expectedType", skip_serializing_if = "Option::is_none")]
    pub expected_type: Option<String>,
}

/// Kind of per-property rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    /// Value must be a JSON boolean.
    Boolean,
    /// Value must be an integer `>= 0`.
    NonNegativeInteger,
    /// Property must be present on every node the rule applies to.
    Required,
}

/// A declared rule over one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyRule {
    pub property: String,
    pub rule: RuleKind,
    #[serde(default)]
    pub severity: Severity,
    /// Restrict the rule to nodes of this kind. `None` applies to all nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A semantic graph as loaded from disk.
///
/// `nodes` and `edges` are required even when empty; `rules` is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelGraph {
    pub nodes: Vec<ModelNode>,
    pub edges: Vec<ModelEdge>,
    #[serde(default)]
    pub rules: Vec<PropertyRule>,
}

impl ModelGraph {
    /// Parse and validate a model graph from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Malformed`] for invalid JSON, missing or unknown
    /// fields, or empty/duplicate node ids.
    #[instrument(skip_all)]
    pub fn from_json(text: &str) -> Result<Self> {
        let graph: Self =
            serde_json::from_str(text).map_err(|e| GateError::malformed(ARTIFACT, e.to_string()))?;
        graph.check_ids()?;
        Ok(graph)
    }

    /// Index nodes by id.
    #[must_use]
    pub fn node_lookup(&self) -> HashMap<&str, &ModelNode> {
        self.nodes.iter().map(|n| (n.id.as_str(), n)).collect()
    }

    fn check_ids(&self) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            if node.id.is_empty() {
                return Err(GateError::malformed(ARTIFACT, format!("nodes[{i}] has an empty id")));
            }
            if !seen.insert(node.id.as_str()) {
                return Err(GateError::malformed(
                    ARTIFACT,
                    format!("duplicate node id `{}`", node.id),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ports_props_and_rules() {
        let g = ModelGraph::from_json(
            r#"{
                "nodes": [
                    {"id": "osc", "kind": "source", "outputs": ["color"]},
                    {"id": "mix", "inputs": ["color", "float"], "props": {"bypass": false}}
                ],
                "edges": [{"from": "osc", "to": "mix", "type": "color"}],
                "rules": [{"property": "bypass", "rule": "boolean"}]
            }"#,
        )
        .expect("valid");

        assert_eq!(g.nodes.len(), 2);
        assert_eq!(g.edges[0].expected_type.as_deref(), Some("color"));
        assert_eq!(g.rules[0].rule, RuleKind::Boolean);
        assert_eq!(g.rules[0].severity, Severity::Error);
        assert_eq!(g.node_lookup()["mix"].inputs, vec!["color", "float"]);
    }

    #[test]
    fn properties_alias_is_accepted() {
        let g = ModelGraph::from_json(r#"{"nodes":[{"id":"a","properties":{"gain":1}}],"edges":[]}"#)
            .expect("valid");
        assert!(g.nodes[0].props.contains_key("gain"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = ModelGraph::from_json(r#"{"nodes":[{"id":"a"},{"id":"a"}],"edges":[]}"#).unwrap_err();
        assert!(err.to_string().contains("duplicate node id `a`"));
    }

    #[test]
    fn rejects_empty_id() {
        assert!(ModelGraph::from_json(r#"{"nodes":[{"id":""}],"edges":[]}"#).is_err());
    }

    #[test]
    fn dangling_edges_are_not_a_load_error() {
        let g = ModelGraph::from_json(r#"{"nodes":[],"edges":[{"from":"x","to":"y"}]}"#)
            .expect("loads");
        assert_eq!(g.edges.len(), 1);
    }

    #[test]
    fn rejects_documents_without_node_or_edge_lists() {
        for text in ["{}", "[]", r#"{"nodes":[]}"#, r#"{"edges":[]}"#] {
            let err = ModelGraph::from_json(text).unwrap_err();
            assert!(matches!(err, GateError::Malformed { .. }), "{text}: {err}");
        }
    }

    #[test]
    fn rejects_misspelled_keys() {
        let misspelled = [
            r#"{"node":[{"id":"a","inputs":["float"]}],"edge":[{"from":"a","to":"b","type":"color"}]}"#,
            r#"{"nodes":[{"id":"a","input":["float"]}],"edges":[]}"#,
            r#"{"nodes":[{"id":"a"}],"edges":[{"from":"a","too":"a"}]}"#,
            r#"{"nodes":[],"edges":[],"rules":[{"property":"x","rule":"boolean","severty":"warning"}]}"#,
        ];
        for text in misspelled {
            let err = ModelGraph::from_json(text).unwrap_err();
            assert!(err.to_string().contains("unknown field"), "{text}: {err}");
        }
    }

    #[test]
    fn empty_lists_are_an_empty_graph() {
        let g = ModelGraph::from_json(r#"{"nodes":[],"edges":[]}"#).expect("valid");
        assert!(g.nodes.is_empty());
        assert!(g.edges.is_empty());
        assert!(g.rules.is_empty());
    }
}

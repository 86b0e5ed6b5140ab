//! Named dependency graph.
//!
//! # Edge Direction
//!
//! An edge `A → B` means "a change to A affects B". Closure and impact
//! queries walk edges in that direction.
//!
//! The input document lists node names and typed edges:
//!
//! ```json
//! {"nodes": ["A", "B"], "edges": [{"from": "A", "to": "B", "kind": "code"}], "directed": true}
//! ```
//!
//! Every edge endpoint must be a declared node and node names must be unique;
//! anything else is rejected as malformed input.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{GateError, Result};

const ARTIFACT: &str = "dependency graph";

/// What a dependency edge carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepKind {
    Code,
    Asset,
    Config,
}

impl DepKind {
    /// Lowercase label used in artifacts and DOT output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Asset => "asset",
            Self::Config => "config",
        }
    }
}

impl fmt::Display for DepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One edge of the dependency input document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepEdgeInput {
    pub from: String,
    pub to: String,
    pub kind: DepKind,
}

/// Raw dependency graph document as it appears on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepGraphInput {
    pub nodes: Vec<String>,
    pub edges: Vec<DepEdgeInput>,
    #[serde(default = "default_directed")]
    pub directed: bool,
}

const fn default_directed() -> bool {
    true
}

/// A validated dependency graph.
///
/// Node weights are node names; edge weights are [`DepKind`]s. Nodes are
/// inserted in input order, edges in input order.
#[derive(Debug, Clone)]
pub struct DepGraph {
    /// Directed graph: nodes = names, edges = typed dependencies.
    pub graph: DiGraph<String, DepKind>,
    /// Mapping from node name to petgraph `NodeIndex`.
    pub node_map: HashMap<String, NodeIndex>,
}

impl DepGraph {
    /// Parse and validate a dependency graph from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Malformed`] for invalid JSON, undirected input,
    /// duplicate node names, or edges referencing undeclared nodes.
    pub fn from_json(text: &str) -> Result<Self> {
        let input: DepGraphInput =
            serde_json::from_str(text).map_err(|e| GateError::malformed(ARTIFACT, e.to_string()))?;
        Self::from_input(input)
    }

    /// Validate a decoded [`DepGraphInput`] and build the graph.
    ///
    /// # Errors
    ///
    /// See [`DepGraph::from_json`].
    #[instrument(skip_all, fields(nodes = input.nodes.len(), edges = input.edges.len()))]
    pub fn from_input(input: DepGraphInput) -> Result<Self> {
        if !input.directed {
            return Err(GateError::malformed(ARTIFACT, "dependency graphs must be directed"));
        }

        let mut graph = DiGraph::<String, DepKind>::with_capacity(input.nodes.len(), input.edges.len());
        let mut node_map: HashMap<String, NodeIndex> = HashMap::with_capacity(input.nodes.len());

        for name in input.nodes {
            if node_map.contains_key(&name) {
                return Err(GateError::malformed(ARTIFACT, format!("duplicate node `{name}`")));
            }
            let idx = graph.add_node(name.clone());
            node_map.insert(name, idx);
        }

        for (i, edge) in input.edges.into_iter().enumerate() {
            let from = lookup(&node_map, &edge.from, i, "from")?;
            let to = lookup(&node_map, &edge.to, i, "to")?;
            graph.add_edge(from, to, edge.kind);
        }

        Ok(Self { graph, node_map })
    }

    /// Return the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the `NodeIndex` for a node name.
    #[must_use]
    pub fn node_index(&self, name: &str) -> Option<NodeIndex> {
        self.node_map.get(name).copied()
    }

    /// Return the name of a node.
    #[must_use]
    pub fn node_name(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(String::as_str)
    }
}

fn lookup(
    node_map: &HashMap<String, NodeIndex>,
    name: &str,
    edge: usize,
    end: &str,
) -> Result<NodeIndex> {
    node_map.get(name).copied().ok_or_else(|| {
        GateError::malformed(
            ARTIFACT,
            format!("edges[{edge}].{end} references undeclared node `{name}`"),
        )
    })
}

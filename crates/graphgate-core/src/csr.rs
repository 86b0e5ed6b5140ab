//! Compressed sparse row (CSR) graph model.
//!
//! # Layout
//!
//! A graph with `N` nodes and `M` edges is stored as:
//!
//! - `offsets`: length `N + 1`, non-decreasing, `offsets[0] == 0`,
//!   `offsets[N] == M`. The out-edges of node `u` are
//!   `edges[offsets[u]..offsets[u + 1]]`.
//! - `edges`: length `M`, each entry a target node index in `0..N`.
//! - `weights`: optional, length `M`, parallel to `edges`.
//! - `node_kind`: optional, length `N`, a category label per node.
//!
//! [`CsrGraph::from_input`] is the only constructor and validates every
//! structural invariant up front. A [`CsrGraph`] is immutable afterwards.
//!
//! ## Undirected input
//!
//! When `directed == false` a reverse adjacency is derived at load time so
//! traversals can walk each stored edge in both directions via
//! [`CsrGraph::neighbors`]. [`CsrGraph::out_edges`] always reflects the
//! stored orientation.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{GateError, Result};

const ARTIFACT: &str = "graph input";

/// Raw CSR document as it appears on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrInput {
    pub offsets: Vec<usize>,
    pub edges: Vec<usize>,
    pub directed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_kind: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<f64>>,
}

/// A validated, immutable CSR graph.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrGraph {
    offsets: Vec<usize>,
    edges: Vec<usize>,
    weights: Option<Vec<f64>>,
    node_kind: Option<Vec<u32>>,
    directed: bool,
    reverse: Option<Reverse>,
    content_hash: String,
}

/// Reverse adjacency for undirected traversal, stored in CSR form and
/// carrying the index of the originating forward edge for weight lookup.
#[derive(Debug, Clone, PartialEq)]
struct Reverse {
    offsets: Vec<usize>,
    sources: Vec<usize>,
    edge_ids: Vec<usize>,
}

impl CsrGraph {
    /// Parse and validate a CSR document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Malformed`] if the text is not valid JSON for the
    /// CSR schema or if any structural invariant is violated.
    pub fn from_json(text: &str) -> Result<Self> {
        let input: CsrInput =
            serde_json::from_str(text).map_err(|e| GateError::malformed(ARTIFACT, e.to_string()))?;
        Self::from_input(input)
    }

    /// Validate a decoded [`CsrInput`] and build the graph.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Malformed`] when the offsets/edges/kind/weight
    /// arrays are inconsistent. Input is never coerced into an empty graph.
    #[instrument(skip_all, fields(offsets = input.offsets.len(), edges = input.edges.len()))]
    pub fn from_input(input: CsrInput) -> Result<Self> {
        validate(&input)?;
        let content_hash = compute_content_hash(&input);
        let reverse = (!input.directed).then(|| build_reverse(&input.offsets, &input.edges));

        Ok(Self {
            offsets: input.offsets,
            edges: input.edges,
            weights: input.weights,
            node_kind: input.node_kind,
            directed: input.directed,
            reverse,
            content_hash,
        })
    }

    /// Number of nodes (`N`).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Number of stored edges (`M`).
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the input declared the graph as directed.
    #[must_use]
    pub const fn is_directed(&self) -> bool {
        self.directed
    }

    /// Whether the input carried explicit edge weights.
    #[must_use]
    pub const fn is_weighted(&self) -> bool {
        self.weights.is_some()
    }

    /// Per-node kind labels, if present.
    #[must_use]
    pub fn node_kinds(&self) -> Option<&[u32]> {
        self.node_kind.as_deref()
    }

    /// BLAKE3 hash of the canonical input, formatted as `blake3:<hex>`.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Stored out-edge targets of `node`, in CSR order.
    ///
    /// # Panics
    ///
    /// Panics if `node >= node_count()`.
    #[must_use]
    pub fn out_edges(&self, node: usize) -> &[usize] {
        &self.edges[self.offsets[node]..self.offsets[node + 1]]
    }

    /// Every stored edge as `(source, target)`, in CSR order.
    pub fn edge_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.node_count())
            .flat_map(move |u| self.out_edges(u).iter().map(move |&v| (u, v)))
    }

    /// Traversal neighbors of `node` with the weight of the connecting edge.
    ///
    /// Forward edges come first in CSR order. For undirected graphs the
    /// reverse edges follow, ordered by source index. Unweighted edges
    /// report a weight of `1.0`.
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let start = self.offsets[node];
        let forward = self
            .out_edges(node)
            .iter()
            .enumerate()
            .map(move |(i, &v)| (v, self.weight(start + i)));

        let backward = self.reverse.iter().flat_map(move |rev| {
            let range = rev.offsets[node]..rev.offsets[node + 1];
            rev.sources[range.clone()]
                .iter()
                .zip(&rev.edge_ids[range])
                .map(move |(&u, &edge)| (u, self.weight(edge)))
        });

        forward.chain(backward)
    }

    /// Out-degree of every node under the stored orientation.
    #[must_use]
    pub fn out_degrees(&self) -> Vec<usize> {
        self.offsets.windows(2).map(|w| w[1] - w[0]).collect()
    }

    fn weight(&self, edge: usize) -> f64 {
        self.weights.as_ref().map_or(1.0, |w| w[edge])
    }
}

fn validate(input: &CsrInput) -> Result<()> {
    let offsets = &input.offsets;
    let Some(&last) = offsets.last() else {
        return Err(GateError::malformed(ARTIFACT, "offsets must have length N+1 >= 1"));
    };

    if offsets[0] != 0 {
        return Err(GateError::malformed(
            ARTIFACT,
            format!("offsets[0] must be 0, got {}", offsets[0]),
        ));
    }

    if let Some(i) = offsets.windows(2).position(|w| w[1] < w[0]) {
        return Err(GateError::malformed(
            ARTIFACT,
            format!("offsets[{}] < offsets[{i}]: offsets must be non-decreasing", i + 1),
        ));
    }

    let edge_count = input.edges.len();
    if last != edge_count {
        return Err(GateError::malformed(
            ARTIFACT,
            format!("offsets[N] = {last} but edges has length {edge_count}"),
        ));
    }

    let node_count = offsets.len() - 1;
    if let Some((i, &target)) = input.edges.iter().enumerate().find(|(_, t)| **t >= node_count) {
        return Err(GateError::malformed(
            ARTIFACT,
            format!("edges[{i}] = {target} references a node outside 0..{node_count}"),
        ));
    }

    if let Some(kinds) = &input.node_kind {
        if kinds.len() != node_count {
            return Err(GateError::malformed(
                ARTIFACT,
                format!("nodeKind has length {} but N = {node_count}", kinds.len()),
            ));
        }
    }

    if let Some(weights) = &input.weights {
        if weights.len() != edge_count {
            return Err(GateError::malformed(
                ARTIFACT,
                format!("weights has length {} but M = {edge_count}", weights.len()),
            ));
        }
        if let Some((i, w)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(GateError::malformed(
                ARTIFACT,
                format!("weights[{i}] = {w} must be finite and non-negative"),
            ));
        }
    }

    Ok(())
}

fn build_reverse(offsets: &[usize], edges: &[usize]) -> Reverse {
    let node_count = offsets.len() - 1;
    let mut counts = vec![0_usize; node_count + 1];
    for &v in edges {
        counts[v + 1] += 1;
    }
    for i in 1..counts.len() {
        counts[i] += counts[i - 1];
    }

    let rev_offsets = counts.clone();
    let mut cursor = counts;
    let mut sources = vec![0_usize; edges.len()];
    let mut edge_ids = vec![0_usize; edges.len()];

    // Sources are visited in ascending order, so each reverse bucket ends up
    // sorted by source index.
    for u in 0..node_count {
        for edge in offsets[u]..offsets[u + 1] {
            let v = edges[edge];
            let slot = cursor[v];
            sources[slot] = u;
            edge_ids[slot] = edge;
            cursor[v] += 1;
        }
    }

    Reverse {
        offsets: rev_offsets,
        sources,
        edge_ids,
    }
}

fn compute_content_hash(input: &CsrInput) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(if input.directed { b"d" } else { b"u" });
    for value in &input.offsets {
        hasher.update(&(*value as u64).to_le_bytes());
    }
    hasher.update(b"|");
    for value in &input.edges {
        hasher.update(&(*value as u64).to_le_bytes());
    }
    if let Some(kinds) = &input.node_kind {
        hasher.update(b"|k");
        for kind in kinds {
            hasher.update(&kind.to_le_bytes());
        }
    }
    if let Some(weights) = &input.weights {
        hasher.update(b"|w");
        for weight in weights {
            hasher.update(&weight.to_bits().to_le_bytes());
        }
    }
    format!("blake3:{}", hasher.finalize().to_hex())
}

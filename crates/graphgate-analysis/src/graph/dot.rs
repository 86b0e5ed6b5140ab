//! Graphviz dump of a CSR graph for cycle diagnostics.
//!
//! Exact cycle membership is never computed. The dump contains every edge and
//! fills the nodes Kahn's algorithm could not settle, which is enough to spot
//! the offending region by eye.

use std::fmt::Write as _;

use fixedbitset::FixedBitSet;
use graphgate_core::csr::CsrGraph;

/// Render all edges of `graph`, highlighting `unsettled` nodes.
#[must_use]
pub fn cycles_dot(graph: &CsrGraph, unsettled: &[usize]) -> String {
    let n = graph.node_count();
    let mut marked = FixedBitSet::with_capacity(n);
    for &u in unsettled {
        if u < n {
            marked.insert(u);
        }
    }

    let arrow = if graph.is_directed() { "->" } else { "--" };
    let keyword = if graph.is_directed() { "digraph" } else { "graph" };

    let mut out = String::new();
    let _ = writeln!(out, "{keyword} cycles {{");
    let _ = writeln!(out, "  node [shape=circle];");
    for u in marked.ones() {
        let _ = writeln!(out, "  {u} [style=filled, fillcolor=\"#f4a6a6\"];");
    }
    for (u, v) in graph.edge_pairs() {
        if marked.contains(u) && marked.contains(v) {
            let _ = writeln!(out, "  {u} {arrow} {v} [color=red];");
        } else {
            let _ = writeln!(out, "  {u} {arrow} {v};");
        }
    }
    out.push_str("}\n");
    out
}

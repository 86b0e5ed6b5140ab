//! Dependency analyzer: closure, impact radius and DOT export over a named
//! dependency graph.

pub mod reach;

use std::collections::BTreeMap;

use graphgate_core::artifact::ImpactArtifact;
use graphgate_core::depgraph::DepGraph;
use petgraph::dot::Dot;
use tracing::{info, instrument};

pub use reach::{Closure, Impact, impact_radius, transitive_closure};

/// Run closure and impact for `changed` and assemble `graph.impact.json`.
#[must_use]
#[instrument(skip_all, fields(nodes = graph.node_count(), changed = changed.len()))]
pub fn build_impact_artifact(graph: &DepGraph, changed: &[String]) -> ImpactArtifact {
    let impact = impact_radius(graph, changed.iter().map(String::as_str));
    // Same reached set as the closure, only ordered differently.
    let mut closure = impact.names();
    closure.sort_unstable();

    info!(
        closure = closure.len(),
        impact = impact.ordered.len(),
        unknown = impact.unknown.len(),
        "impact computed"
    );

    let distances: BTreeMap<String, usize> = impact.ordered.iter().cloned().collect();
    ImpactArtifact {
        changed: changed.to_vec(),
        closure,
        impact: impact.names(),
        distances,
        unknown: impact.unknown,
    }
}

/// Graphviz text with one edge statement per dependency, labelled by kind.
#[must_use]
pub fn deps_dot(graph: &DepGraph) -> String {
    format!("{}", Dot::new(&graph.graph))
}

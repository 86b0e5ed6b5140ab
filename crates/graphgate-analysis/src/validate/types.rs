//! Port-type checking along model graph edges.

use graphgate_core::artifact::Violation;
use graphgate_core::model::{ModelGraph, Severity};

pub const EDGE_MISSING_NODE: &str = "edge.missingNode";
pub const TYPE_MISMATCH: &str = "type.mismatch";
pub const TYPE_OUTPUT_MISMATCH: &str = "type.outputMismatch";

/// Check every edge against the port types its endpoints declare.
///
/// - An endpoint that is not a node yields one `edge.missingNode` error and
///   the edge is not checked further.
/// - An expected type absent from the destination's non-empty input list
///   yields a `type.mismatch` error.
/// - An expected type absent from the source's non-empty output list yields
///   a `type.outputMismatch` warning.
///
/// Nodes that declare no ports accept anything.
#[must_use]
pub fn check_types(graph: &ModelGraph) -> Vec<Violation> {
    let lookup = graph.node_lookup();
    let mut out = Vec::new();

    for edge in &graph.edges {
        let (Some(src), Some(dst)) = (lookup.get(edge.from.as_str()), lookup.get(edge.to.as_str()))
        else {
            let missing: Vec<&str> = [edge.from.as_str(), edge.to.as_str()]
                .into_iter()
                .filter(|name| !lookup.contains_key(name))
                .collect();
            out.push(Violation {
                id: EDGE_MISSING_NODE.to_string(),
                node: missing.first().copied().unwrap_or_default().to_string(),
                message: format!(
                    "edge {} -> {} references missing node(s): {}",
                    edge.from,
                    edge.to,
                    missing.join(", ")
                ),
                severity: Severity::Error,
            });
            continue;
        };

        let Some(expected) = edge.expected_type.as_deref() else {
            continue;
        };

        if !dst.inputs.is_empty() && !dst.inputs.iter().any(|t| t == expected) {
            out.push(Violation {
                id: TYPE_MISMATCH.to_string(),
                node: dst.id.clone(),
                message: format!(
                    "edge {} -> {} carries `{expected}` but {} accepts [{}]",
                    edge.from,
                    edge.to,
                    dst.id,
                    dst.inputs.join(", ")
                ),
                severity: Severity::Error,
            });
        }

        if !src.outputs.is_empty() && !src.outputs.iter().any(|t| t == expected) {
            out.push(Violation {
                id: TYPE_OUTPUT_MISMATCH.to_string(),
                node: src.id.clone(),
                message: format!(
                    "edge {} -> {} expects `{expected}` but {} produces [{}]",
                    edge.from,
                    edge.to,
                    src.id,
                    src.outputs.join(", ")
                ),
                severity: Severity::Warning,
            });
        }
    }

    out
}

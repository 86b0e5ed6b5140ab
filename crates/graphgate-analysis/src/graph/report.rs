//! Assemble the `graph.metrics.json` and `graph.analysis.json` artifacts.

use graphgate_core::artifact::{AnalysisArtifact, MetricsArtifact};
use graphgate_core::csr::CsrGraph;
use tracing::{debug, instrument};

use crate::graph::topo::topo_sort;
use crate::graph::traversal::{bfs, dfs_preorder, dijkstra, dijkstra_distances};

/// Metrics and cycle analysis computed in one pass over the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphReport {
    pub metrics: MetricsArtifact,
    pub analysis: AnalysisArtifact,
}

/// Run every traversal from `source` plus the topological sort.
///
/// An empty graph produces empty traversal arrays and no source.
///
/// # Panics
///
/// Panics if the graph is non-empty and `source >= graph.node_count()`.
#[must_use]
#[instrument(skip(graph), fields(n = graph.node_count(), m = graph.edge_count()))]
pub fn analyze(graph: &CsrGraph, source: usize) -> GraphReport {
    let n = graph.node_count();
    let m = graph.edge_count();

    let (source, bfs_dist, dfs, dijkstra_dist) = if n == 0 {
        (None, Vec::new(), Vec::new(), Vec::new())
    } else {
        let hops = bfs(graph, source);
        let order = dfs_preorder(graph, source);
        let dist = dijkstra(graph, source);
        (
            Some(source),
            hops.distances(),
            order,
            dijkstra_distances(&dist),
        )
    };

    let topo = topo_sort(graph);
    let cycle = topo.has_cycle;
    debug!(settled = topo.order.len(), cycle, "topological sort finished");

    let metrics = MetricsArtifact {
        n,
        m,
        directed: graph.is_directed(),
        source,
        bfs: bfs_dist,
        dfs,
        dijkstra: dijkstra_dist,
        topo: topo.full_order().map(<[usize]>::to_vec),
        cycle,
        is_dag: !cycle,
        content_hash: Some(graph.content_hash().to_string()),
    };

    let analysis = AnalysisArtifact {
        cycle_detected: cycle,
        settled: topo.order.len(),
        n,
        m,
        unsettled: topo.unsettled(n),
        edges: graph.edge_pairs().map(|(u, v)| [u, v]).collect(),
    };

    GraphReport { metrics, analysis }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphgate_core::csr::CsrGraph;

    #[test]
    fn acyclic_graph_report() {
        let g = CsrGraph::from_json(r#"{"offsets":[0,1,2,2],"edges":[1,2],"directed":true}"#)
            .expect("valid");
        let r = analyze(&g, 0);
        assert_eq!(r.metrics.bfs, vec![0, 1, 2]);
        assert_eq!(r.metrics.dfs, vec![0, 1, 2]);
        assert_eq!(r.metrics.dijkstra, vec![0.0, 1.0, 2.0]);
        assert_eq!(r.metrics.topo, Some(vec![0, 1, 2]));
        assert!(r.metrics.is_dag);
        assert!(!r.analysis.cycle_detected);
        assert!(r.analysis.unsettled.is_empty());
        assert_eq!(r.analysis.edges, vec![[0, 1], [1, 2]]);
    }

    #[test]
    fn cyclic_graph_report_has_null_topo() {
        let g = CsrGraph::from_json(r#"{"offsets":[0,1,2],"edges":[1,0],"directed":true}"#)
            .expect("valid");
        let r = analyze(&g, 1);
        assert_eq!(r.metrics.source, Some(1));
        assert_eq!(r.metrics.topo, None);
        assert!(r.metrics.cycle);
        assert!(!r.metrics.is_dag);
        assert!(r.analysis.cycle_detected);
        assert_eq!(r.analysis.unsettled, vec![0, 1]);
        let json = serde_json::to_value(&r.metrics).expect("serialize");
        assert!(json["topo"].is_null());
    }

    #[test]
    fn empty_graph_report() {
        let g = CsrGraph::from_json(r#"{"offsets":[0],"edges":[],"directed":true}"#).expect("valid");
        let r = analyze(&g, 0);
        assert_eq!(r.metrics.source, None);
        assert!(r.metrics.bfs.is_empty());
        assert_eq!(r.metrics.topo, Some(Vec::new()));
        assert!(r.metrics.is_dag);
    }
}

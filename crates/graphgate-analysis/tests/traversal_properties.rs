//! Property tests for the traversal engine and dependency analyzer on
//! generated graphs.
//!
//! Cycle detection is cross-checked against petgraph's independent
//! `is_cyclic_directed`, and Dijkstra against BFS on unweighted input.

use graphgate_analysis::deps::transitive_closure;
use graphgate_analysis::graph::{bfs, dfs_preorder, dijkstra, topo_sort};
use graphgate_core::csr::{CsrGraph, CsrInput};
use graphgate_core::depgraph::{DepEdgeInput, DepGraph, DepGraphInput, DepKind};
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::DiGraph;
use proptest::prelude::*;

/// Adjacency lists over `n` nodes with up to four out-edges each.
fn arb_adjacency() -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1_usize..24).prop_flat_map(|n| prop::collection::vec(prop::collection::vec(0..n, 0..4), n))
}

fn to_csr(adjacency: &[Vec<usize>], directed: bool) -> CsrGraph {
    let mut offsets = vec![0];
    let mut edges = Vec::new();
    for targets in adjacency {
        edges.extend_from_slice(targets);
        offsets.push(edges.len());
    }
    CsrGraph::from_input(CsrInput {
        offsets,
        edges,
        directed,
        node_kind: None,
        weights: None,
    })
    .expect("generated CSR is well formed")
}

fn to_petgraph(adjacency: &[Vec<usize>]) -> DiGraph<(), ()> {
    let mut g = DiGraph::<(), ()>::new();
    let nodes: Vec<_> = (0..adjacency.len()).map(|_| g.add_node(())).collect();
    for (u, targets) in adjacency.iter().enumerate() {
        for &v in targets {
            g.add_edge(nodes[u], nodes[v], ());
        }
    }
    g
}

fn to_depgraph(adjacency: &[Vec<usize>]) -> DepGraph {
    let nodes: Vec<String> = (0..adjacency.len()).map(|i| format!("n{i:02}")).collect();
    let edges = adjacency
        .iter()
        .enumerate()
        .flat_map(|(u, targets)| {
            let nodes = &nodes;
            targets.iter().map(move |&v| DepEdgeInput {
                from: nodes[u].clone(),
                to: nodes[v].clone(),
                kind: DepKind::Code,
            })
        })
        .collect();
    DepGraph::from_input(DepGraphInput {
        nodes,
        edges,
        directed: true,
    })
    .expect("generated dependency graph is well formed")
}

proptest! {
    #[test]
    fn bfs_distances_respect_edge_relaxation(adjacency in arb_adjacency()) {
        let g = to_csr(&adjacency, true);
        let r = bfs(&g, 0);
        for (u, v) in g.edge_pairs() {
            if let (Some(du), Some(dv)) = (r.dist[u], r.dist[v]) {
                prop_assert!(dv <= du + 1, "edge {u}->{v}: {dv} > {du} + 1");
            }
            if r.dist[u].is_some() {
                prop_assert!(r.dist[v].is_some());
            }
        }
    }

    #[test]
    fn bfs_paths_have_distance_length(adjacency in arb_adjacency()) {
        let g = to_csr(&adjacency, true);
        let r = bfs(&g, 0);
        for target in 0..g.node_count() {
            match (r.dist[target], r.path_to(target)) {
                (Some(d), Some(path)) => {
                    prop_assert_eq!(path.len(), d + 1);
                    prop_assert_eq!(path[0], 0);
                }
                (None, None) => {}
                other => prop_assert!(false, "inconsistent path state {other:?}"),
            }
        }
    }

    #[test]
    fn topo_agrees_with_petgraph_cycle_check(adjacency in arb_adjacency()) {
        let g = to_csr(&adjacency, true);
        let r = topo_sort(&g);
        prop_assert_eq!(r.has_cycle, is_cyclic_directed(&to_petgraph(&adjacency)));
    }

    #[test]
    fn topo_is_a_permutation_iff_acyclic(adjacency in arb_adjacency()) {
        let g = to_csr(&adjacency, true);
        let r = topo_sort(&g);
        let n = g.node_count();
        let mut sorted = r.order.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), r.order.len());
        prop_assert_eq!(r.order.len() == n, !r.has_cycle);

        if !r.has_cycle {
            let mut position = vec![0; n];
            for (i, &u) in r.order.iter().enumerate() {
                position[u] = i;
            }
            for (u, v) in g.edge_pairs() {
                prop_assert!(position[u] < position[v]);
            }
        }
    }

    #[test]
    fn dijkstra_equals_bfs_when_unweighted(adjacency in arb_adjacency(), directed in any::<bool>()) {
        let g = to_csr(&adjacency, directed);
        let hops = bfs(&g, 0).dist;
        let dist = dijkstra(&g, 0);
        for (h, d) in hops.iter().zip(&dist) {
            #[allow(clippy::cast_precision_loss)]
            let expected = h.map(|h| h as f64);
            prop_assert_eq!(*d, expected);
        }
    }

    #[test]
    fn dfs_visits_exactly_the_bfs_reachable_set(adjacency in arb_adjacency()) {
        let g = to_csr(&adjacency, true);
        let mut visited = dfs_preorder(&g, 0);
        visited.sort_unstable();
        let mut reached: Vec<usize> = bfs(&g, 0).order;
        reached.sort_unstable();
        prop_assert_eq!(visited, reached);
    }

    #[test]
    fn closure_is_idempotent(adjacency in arb_adjacency(), start in 0_usize..24) {
        let deps = to_depgraph(&adjacency);
        let name = format!("n{:02}", start % adjacency.len());
        let once = transitive_closure(&deps, [name.as_str()]);
        let twice = transitive_closure(&deps, once.nodes.iter().map(String::as_str));
        prop_assert_eq!(once.nodes, twice.nodes);
    }
}

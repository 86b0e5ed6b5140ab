//! Topological ordering and cycle detection.
//!
//! Kahn's algorithm with a min-ordered ready set: whenever several nodes have
//! in-degree zero, the smallest index is emitted first. The order is thus a
//! pure function of the graph.
//!
//! A graph has a cycle exactly when the order is shorter than `N`. The nodes
//! left out are members of a cycle or downstream of one; exact cycle
//! membership is not computed.
//!
//! Topological sorting always follows the stored edge orientation, even for
//! graphs declared undirected.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use graphgate_core::csr::CsrGraph;

/// Outcome of a topological sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopoResult {
    /// Emitted nodes. A permutation of `0..N` when acyclic, shorter otherwise.
    pub order: Vec<usize>,
    /// True when at least one cycle prevented a full order.
    pub has_cycle: bool,
}

impl TopoResult {
    /// The full order, or `None` when the graph has a cycle.
    #[must_use]
    pub fn full_order(&self) -> Option<&[usize]> {
        (!self.has_cycle).then_some(self.order.as_slice())
    }

    /// Nodes never emitted by Kahn's algorithm, ascending.
    #[must_use]
    pub fn unsettled(&self, node_count: usize) -> Vec<usize> {
        let mut emitted = FixedBitSet::with_capacity(node_count);
        for &u in &self.order {
            emitted.insert(u);
        }
        (0..node_count).filter(|&u| !emitted.contains(u)).collect()
    }
}

/// Kahn's topological sort with ascending-index tie breaking.
#[must_use]
pub fn topo_sort(graph: &CsrGraph) -> TopoResult {
    let n = graph.node_count();
    let mut in_degree = vec![0_usize; n];
    for (_, v) in graph.edge_pairs() {
        in_degree[v] += 1;
    }

    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter_map(|(u, &d)| (d == 0).then_some(Reverse(u)))
        .collect();

    let mut order = Vec::with_capacity(n);
    while let Some(Reverse(u)) = ready.pop() {
        order.push(u);
        for &v in graph.out_edges(u) {
            in_degree[v] -= 1;
            if in_degree[v] == 0 {
                ready.push(Reverse(v));
            }
        }
    }

    let has_cycle = order.len() < n;
    TopoResult { order, has_cycle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphgate_core::csr::CsrInput;

    fn graph(adjacency: &[&[usize]]) -> CsrGraph {
        let mut offsets = vec![0];
        let mut edges = Vec::new();
        for targets in adjacency {
            edges.extend_from_slice(targets);
            offsets.push(edges.len());
        }
        CsrGraph::from_input(CsrInput {
            offsets,
            edges,
            directed: true,
            node_kind: None,
            weights: None,
        })
        .expect("valid test graph")
    }

    #[test]
    fn diamond_order_breaks_ties_by_index() {
        // 0 -> {2, 1}, 1 -> 3, 2 -> 3
        let g = graph(&[&[2, 1], &[3], &[3], &[]]);
        let r = topo_sort(&g);
        assert!(!r.has_cycle);
        assert_eq!(r.order, vec![0, 1, 2, 3]);
        assert_eq!(r.full_order(), Some(&[0, 1, 2, 3][..]));
    }

    #[test]
    fn independent_roots_come_out_ascending() {
        // 3 -> 0, 2 and 1 isolated
        let g = graph(&[&[], &[], &[], &[0]]);
        assert_eq!(topo_sort(&g).order, vec![1, 2, 3, 0]);
    }

    #[test]
    fn cycle_yields_partial_order() {
        // 0 -> 1 -> 2 -> 1, 2 -> 3
        let g = graph(&[&[1], &[2], &[1, 3], &[]]);
        let r = topo_sort(&g);
        assert!(r.has_cycle);
        assert_eq!(r.order, vec![0]);
        assert_eq!(r.full_order(), None);
        assert_eq!(r.unsettled(4), vec![1, 2, 3]);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let g = graph(&[&[0]]);
        let r = topo_sort(&g);
        assert!(r.has_cycle);
        assert!(r.order.is_empty());
    }

    #[test]
    fn parallel_edges_are_counted() {
        let g = graph(&[&[1, 1], &[]]);
        let r = topo_sort(&g);
        assert!(!r.has_cycle);
        assert_eq!(r.order, vec![0, 1]);
    }

    #[test]
    fn empty_graph_is_acyclic() {
        let g = graph(&[]);
        let r = topo_sort(&g);
        assert!(!r.has_cycle);
        assert!(r.order.is_empty());
    }
}

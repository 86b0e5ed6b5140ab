//! Single-source traversals over a [`CsrGraph`].
//!
//! All traversals use explicit queues or stacks so generated graphs with very
//! deep chains cannot exhaust the call stack. Neighbors are visited in the
//! order reported by [`CsrGraph::neighbors`], which makes every result fully
//! deterministic for a given input.
//!
//! Callers must pass `source < graph.node_count()`.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use fixedbitset::FixedBitSet;
use graphgate_core::artifact::UNREACHED;
use graphgate_core::csr::CsrGraph;

/// Breadth-first search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BfsResult {
    pub source: usize,
    /// Hop distance from the source, `None` when unreached.
    pub dist: Vec<Option<usize>>,
    /// BFS-tree parent of each reached node (the source has none).
    pub parent: Vec<Option<usize>>,
    /// Nodes in the order they were settled.
    pub order: Vec<usize>,
}

impl BfsResult {
    /// Distances with unreached nodes mapped to [`UNREACHED`].
    #[must_use]
    pub fn distances(&self) -> Vec<i64> {
        self.dist
            .iter()
            .map(|d| d.map_or(UNREACHED, |d| i64::try_from(d).unwrap_or(i64::MAX)))
            .collect()
    }

    /// Reconstruct the BFS-tree path from the source to `target`.
    ///
    /// Returns `None` if `target` was not reached.
    #[must_use]
    pub fn path_to(&self, target: usize) -> Option<Vec<usize>> {
        self.dist.get(target).copied().flatten()?;

        let mut path = vec![target];
        let mut cursor = target;
        while let Some(prev) = self.parent[cursor] {
            path.push(prev);
            cursor = prev;
        }
        path.reverse();
        Some(path)
    }
}

/// Single-source shortest hop counts.
///
/// The frontier is FIFO: among nodes at equal distance, the one enqueued
/// first is settled first, and it becomes the parent of any node it
/// discovers. O(N + M).
///
/// # Panics
///
/// Panics if `source >= graph.node_count()`.
#[must_use]
pub fn bfs(graph: &CsrGraph, source: usize) -> BfsResult {
    let n = graph.node_count();
    let mut dist: Vec<Option<usize>> = vec![None; n];
    let mut parent: Vec<Option<usize>> = vec![None; n];
    let mut order = Vec::with_capacity(n);
    let mut queue: VecDeque<usize> = VecDeque::from([source]);
    dist[source] = Some(0);

    while let Some(u) = queue.pop_front() {
        order.push(u);
        let next = dist[u].map_or(0, |d| d + 1);
        for (v, _) in graph.neighbors(u) {
            if dist[v].is_none() {
                dist[v] = Some(next);
                parent[v] = Some(u);
                queue.push_back(v);
            }
        }
    }

    BfsResult {
        source,
        dist,
        parent,
        order,
    }
}

/// Depth-first preorder from `source`.
///
/// Matches the order a recursive DFS would produce: the first neighbor in
/// CSR order is explored first.
///
/// # Panics
///
/// Panics if `source >= graph.node_count()`.
#[must_use]
pub fn dfs_preorder(graph: &CsrGraph, source: usize) -> Vec<usize> {
    let n = graph.node_count();
    let mut visited = FixedBitSet::with_capacity(n);
    let mut order = Vec::new();
    let mut stack = vec![source];
    let mut scratch: Vec<usize> = Vec::new();

    while let Some(u) = stack.pop() {
        if visited.put(u) {
            continue;
        }
        order.push(u);

        scratch.clear();
        scratch.extend(graph.neighbors(u).map(|(v, _)| v).filter(|&v| !visited.contains(v)));
        stack.extend(scratch.iter().rev());
    }

    order
}

#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    dist: f64,
    node: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    // Reversed so `BinaryHeap` pops the smallest distance, then smallest index.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Single-source shortest path lengths over non-negative edge weights.
///
/// Unweighted graphs use weight `1.0` per edge, so the result equals
/// [`bfs`] distances exactly. Unreached nodes are `None`.
///
/// # Panics
///
/// Panics if `source >= graph.node_count()`.
#[must_use]
pub fn dijkstra(graph: &CsrGraph, source: usize) -> Vec<Option<f64>> {
    let n = graph.node_count();
    let mut dist: Vec<Option<f64>> = vec![None; n];
    let mut settled = FixedBitSet::with_capacity(n);
    let mut heap = BinaryHeap::from([HeapEntry {
        dist: 0.0,
        node: source,
    }]);
    dist[source] = Some(0.0);

    while let Some(HeapEntry { dist: d, node: u }) = heap.pop() {
        if settled.put(u) {
            continue;
        }
        for (v, w) in graph.neighbors(u) {
            let candidate = d + w;
            if dist[v].is_none_or(|current| candidate < current) {
                dist[v] = Some(candidate);
                heap.push(HeapEntry {
                    dist: candidate,
                    node: v,
                });
            }
        }
    }

    dist
}

/// Dijkstra distances with unreached nodes mapped to `-1.0`.
#[must_use]
pub fn dijkstra_distances(dist: &[Option<f64>]) -> Vec<f64> {
    #[allow(clippy::cast_precision_loss)]
    let unreached = UNREACHED as f64;
    dist.iter().map(|d| d.unwrap_or(unreached)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphgate_core::csr::CsrInput;

    fn graph(adjacency: &[&[usize]], directed: bool) -> CsrGraph {
        graph_weighted(adjacency, None, directed)
    }

    fn graph_weighted(adjacency: &[&[usize]], weights: Option<Vec<f64>>, directed: bool) -> CsrGraph {
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
            weights,
        })
        .expect("valid test graph")
    }

    #[test]
    fn bfs_chain_distances() {
        // 0 -> 1 -> 2, 3 isolated
        let g = graph(&[&[1], &[2], &[], &[]], true);
        let r = bfs(&g, 0);
        assert_eq!(r.distances(), vec![0, 1, 2, -1]);
        assert_eq!(r.order, vec![0, 1, 2]);
    }

    #[test]
    fn bfs_fifo_parent_is_first_enqueued() {
        // 0 -> {1, 2}, 1 -> 3, 2 -> 3: node 3 is discovered via 1 first.
        let g = graph(&[&[1, 2], &[3], &[3], &[]], true);
        let r = bfs(&g, 0);
        assert_eq!(r.path_to(3), Some(vec![0, 1, 3]));
        assert_eq!(r.path_to(0), Some(vec![0]));
    }

    #[test]
    fn bfs_path_to_unreached_is_none() {
        let g = graph(&[&[], &[0]], true);
        assert_eq!(bfs(&g, 0).path_to(1), None);
    }

    #[test]
    fn bfs_undirected_walks_both_directions() {
        // stored: 1 -> 0
        let g = graph(&[&[], &[0]], false);
        assert_eq!(bfs(&g, 0).distances(), vec![0, 1]);
    }

    #[test]
    fn dfs_preorder_matches_recursive_order() {
        // 0 -> {1, 3}, 1 -> 2, 3 -> 2
        let g = graph(&[&[1, 3], &[2], &[], &[2]], true);
        assert_eq!(dfs_preorder(&g, 0), vec![0, 1, 2, 3]);
    }

    #[test]
    fn dfs_handles_cycles_and_long_chains() {
        let n = 50_000;
        let adjacency: Vec<Vec<usize>> = (0..n).map(|i| vec![(i + 1) % n]).collect();
        let refs: Vec<&[usize]> = adjacency.iter().map(Vec::as_slice).collect();
        let g = graph(&refs, true);
        let order = dfs_preorder(&g, 0);
        assert_eq!(order.len(), n);
        assert_eq!(order[n - 1], n - 1);
    }

    #[test]
    fn dijkstra_unweighted_equals_bfs() {
        let g = graph(&[&[1, 2], &[3], &[3], &[4], &[]], true);
        let hops = bfs(&g, 0).dist;
        let dist = dijkstra(&g, 0);
        for (h, d) in hops.iter().zip(&dist) {
            #[allow(clippy::cast_precision_loss)]
            let expected = h.map(|h| h as f64);
            assert_eq!(*d, expected);
        }
    }

    #[test]
    fn dijkstra_prefers_lighter_longer_path() {
        // 0 -> 1 (10), 0 -> 2 (1), 2 -> 1 (1)
        let g = graph_weighted(&[&[1, 2], &[], &[1]], Some(vec![10.0, 1.0, 1.0]), true);
        let dist = dijkstra(&g, 0);
        assert_eq!(dist, vec![Some(0.0), Some(2.0), Some(1.0)]);
    }

    #[test]
    fn dijkstra_distances_use_sentinel() {
        let g = graph(&[&[], &[]], true);
        assert_eq!(dijkstra_distances(&dijkstra(&g, 0)), vec![0.0, -1.0]);
    }
}

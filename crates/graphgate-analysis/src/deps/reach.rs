//! Reachability queries over a [`DepGraph`].
//!
//! Both queries run a multi-source BFS along `from → to` edges. Names that are
//! not nodes of the graph are skipped and handed back to the caller so they
//! can be reported; they never abort the query.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet, VecDeque};

use graphgate_core::depgraph::DepGraph;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use tracing::warn;

/// Resolve names to node indices, splitting out the unknown ones.
///
/// Duplicates are dropped; first occurrence wins in both lists.
fn resolve<'a, I>(graph: &DepGraph, names: I) -> (Vec<NodeIndex>, Vec<String>)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashSet<&str> = HashSet::new();
    let mut known = Vec::new();
    let mut unknown = Vec::new();
    for name in names {
        if !seen.insert(name) {
            continue;
        }
        match graph.node_index(name) {
            Some(idx) => known.push(idx),
            None => {
                warn!(node = name, "node is not in the dependency graph, skipping");
                unknown.push(name.to_string());
            }
        }
    }
    (known, unknown)
}

/// BFS from every start node at distance 0. Returns hop distance per
/// reached node.
fn multi_source_bfs(graph: &DepGraph, starts: &[NodeIndex]) -> BTreeMap<NodeIndex, usize> {
    let mut dist: BTreeMap<NodeIndex, usize> = BTreeMap::new();
    let mut queue: VecDeque<NodeIndex> = VecDeque::with_capacity(starts.len());
    for &s in starts {
        if dist.insert(s, 0).is_none() {
            queue.push_back(s);
        }
    }

    while let Some(u) = queue.pop_front() {
        let next = dist.get(&u).map_or(0, |d| d + 1);
        for v in graph.graph.neighbors_directed(u, Direction::Outgoing) {
            if let Entry::Vacant(slot) = dist.entry(v) {
                slot.insert(next);
                queue.push_back(v);
            }
        }
    }

    dist
}

/// Result of a closure query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closure {
    /// Reachable nodes, start nodes included, sorted by name.
    pub nodes: Vec<String>,
    /// Start names missing from the graph.
    pub unknown: Vec<String>,
}

/// Every node reachable from any name in `start`, sorted by name.
///
/// Idempotent: the closure of a closure is itself.
#[must_use]
pub fn transitive_closure<'a, I>(graph: &DepGraph, start: I) -> Closure
where
    I: IntoIterator<Item = &'a str>,
{
    let (starts, unknown) = resolve(graph, start);
    let dist = multi_source_bfs(graph, &starts);

    let mut nodes: Vec<String> = dist
        .keys()
        .filter_map(|&idx| graph.node_name(idx).map(str::to_string))
        .collect();
    nodes.sort_unstable();

    Closure { nodes, unknown }
}

/// Result of an impact-radius query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Impact {
    /// Reached nodes ordered by distance, ties by name.
    pub ordered: Vec<(String, usize)>,
    /// Changed names missing from the graph.
    pub unknown: Vec<String>,
}

impl Impact {
    /// Node names in impact order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.ordered.iter().map(|(name, _)| name.clone()).collect()
    }
}

/// Multi-source BFS with every changed node at distance 0.
///
/// Unreached nodes are excluded. The (distance, name) ordering of the
/// result is stable across runs.
#[must_use]
pub fn impact_radius<'a, I>(graph: &DepGraph, changed: I) -> Impact
where
    I: IntoIterator<Item = &'a str>,
{
    let (starts, unknown) = resolve(graph, changed);
    let dist = multi_source_bfs(graph, &starts);

    let mut ordered: Vec<(String, usize)> = dist
        .into_iter()
        .filter_map(|(idx, d)| graph.node_name(idx).map(|name| (name.to_string(), d)))
        .collect();
    ordered.sort_unstable_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    Impact { ordered, unknown }
}

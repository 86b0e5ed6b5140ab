//! Traversal engine over the CSR graph model.
//!
//! ## Pipeline
//!
//! ```text
//! graph input (CSR JSON)
//!        ↓  CsrGraph::from_json()
//! CsrGraph (validated, immutable)
//!        ↓  report::analyze()
//! GraphReport
//!   ├─ metrics:  BFS / DFS / Dijkstra from a source, topo order, DAG flag
//!   └─ analysis: cycle flag, unsettled nodes, edge dump
//!        ↓  dot::cycles_dot()
//! graph.cycles.dot (only when a cycle exists)
//! ```

pub mod dot;
pub mod report;
pub mod topo;
pub mod traversal;

pub use dot::cycles_dot;
pub use report::{GraphReport, analyze};
pub use topo::{TopoResult, topo_sort};
pub use traversal::{BfsResult, bfs, dfs_preorder, dijkstra, dijkstra_distances};

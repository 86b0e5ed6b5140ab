#![forbid(unsafe_code)]
//! graphgate-analysis library.
//!
//! Graph algorithms and checks that turn loaded inputs into stage artifacts:
//!
//! - [`graph`]: BFS, DFS, Dijkstra, topological sort, cycle dump
//! - [`deps`]: transitive closure and impact radius over named dependencies
//! - [`cost`]: cost model calibration and estimation
//! - [`validate`]: type, property and access-policy checks
//! - [`gate`]: final pass/fail decision
//!
//! Every entry point is a pure function of its arguments.

pub mod cost;
pub mod deps;
pub mod gate;
pub mod graph;
pub mod validate;

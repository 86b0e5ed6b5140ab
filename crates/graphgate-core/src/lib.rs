#![forbid(unsafe_code)]
//! graphgate-core library.
//!
//! Input schemas and their structural validation, artifact documents,
//! whole-document artifact I/O, configuration, and the error taxonomy.
//!
//! # Conventions
//!
//! - **Errors**: Return [`error::GateError`] from every fallible function.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).
//! - **Immutability**: Loaded graphs are never mutated after validation.

pub mod artifact;
pub mod config;
pub mod costmodel;
pub mod csr;
pub mod depgraph;
pub mod error;
pub mod model;
pub mod persist;

pub use csr::CsrGraph;
pub use depgraph::{DepGraph, DepKind};
pub use error::{GateError, Result};
pub use model::{ModelGraph, Severity};

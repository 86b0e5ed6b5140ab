//! One module per pipeline stage.
//!
//! Every stage reads whole input documents, computes, writes whole artifacts
//! into an output directory and prints a short summary. Returned errors abort
//! the stage; `main` maps them to exit code 2.

pub mod calibrate;
pub mod completions;
pub mod estimate;
pub mod gate;
pub mod impact;
pub mod lint;
pub mod metrics;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use graphgate_core::config::GraphgateConfig;
use graphgate_core::csr::CsrGraph;
use graphgate_core::persist;
use tracing::debug;

use crate::output::OutputMode;

/// Default artifact directory when `--out-dir` is not given.
pub const DEFAULT_ARTIFACT_DIR: &str = "artifacts";

/// Everything a stage needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct StageContext {
    pub config: GraphgateConfig,
    pub output: OutputMode,
    pub quiet: bool,
}

impl StageContext {
    /// Whether a stdout summary should be printed.
    pub const fn show_summary(&self) -> bool {
        !self.quiet || self.output.is_json()
    }
}

/// Read and validate a CSR graph input file.
pub fn load_csr(path: &Path) -> anyhow::Result<CsrGraph> {
    let text = persist::read_document(path)?;
    let graph =
        CsrGraph::from_json(&text).with_context(|| format!("loading {}", path.display()))?;
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        weighted = graph.is_weighted(),
        "graph loaded"
    );
    Ok(graph)
}

/// Create `dir` if needed and return the path of `name` inside it.
pub fn artifact_path(dir: &Path, name: &str) -> anyhow::Result<PathBuf> {
    persist::ensure_dir(dir)?;
    Ok(dir.join(name))
}

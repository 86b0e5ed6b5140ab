use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use graphgate_analysis::graph::{analyze, cycles_dot};
use graphgate_core::artifact::names;
use graphgate_core::error::GateError;
use graphgate_core::persist::{write_json, write_text};
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::{DEFAULT_ARTIFACT_DIR, StageContext, artifact_path, load_csr};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `graphgate metrics`.
#[derive(Args, Debug)]
pub struct MetricsArgs {
    /// CSR graph input (`{offsets, edges, directed, nodeKind?, weights?}`).
    #[arg(long)]
    pub graph: PathBuf,

    /// Source node for BFS, DFS and Dijkstra.
    #[arg(long, default_value_t = 0)]
    pub source: usize,

    /// Directory the artifacts are written to.
    #[arg(long, default_value = DEFAULT_ARTIFACT_DIR)]
    pub out_dir: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MetricsSummary {
    n: usize,
    m: usize,
    is_dag: bool,
    unsettled: usize,
    reached: usize,
    content_hash: String,
    written: Vec<String>,
}

/// Traverse the graph and write `graph.metrics.json`, `graph.analysis.json`
/// and, when a cycle exists, `graph.cycles.dot`.
///
/// # Errors
///
/// Returns an error if the input is unreadable or malformed, the source is
/// out of range, or an artifact cannot be written.
#[instrument(skip_all, fields(graph = %args.graph.display()))]
pub fn run_metrics(args: &MetricsArgs, ctx: &StageContext) -> Result<()> {
    let graph = load_csr(&args.graph)?;
    let n = graph.node_count();
    if n > 0 && args.source >= n {
        return Err(GateError::Usage(format!(
            "--source {} is out of range for a graph with {n} nodes",
            args.source
        ))
        .into());
    }

    let report = analyze(&graph, args.source);
    let mut written = Vec::new();

    let metrics_path = artifact_path(&args.out_dir, names::METRICS)?;
    write_json(&metrics_path, &report.metrics)?;
    written.push(metrics_path.display().to_string());

    let analysis_path = artifact_path(&args.out_dir, names::ANALYSIS)?;
    write_json(&analysis_path, &report.analysis)?;
    written.push(analysis_path.display().to_string());

    if report.analysis.cycle_detected {
        warn!(unsettled = report.analysis.unsettled.len(), "cycle detected");
        let dot_path = artifact_path(&args.out_dir, names::CYCLES_DOT)?;
        write_text(&dot_path, &cycles_dot(&graph, &report.analysis.unsettled))?;
        written.push(dot_path.display().to_string());
    }

    info!(n, m = graph.edge_count(), is_dag = report.metrics.is_dag, "metrics written");

    if !ctx.show_summary() {
        return Ok(());
    }
    let summary = MetricsSummary {
        n,
        m: graph.edge_count(),
        is_dag: report.metrics.is_dag,
        unsettled: report.analysis.unsettled.len(),
        reached: report.metrics.bfs.iter().filter(|&&d| d >= 0).count(),
        content_hash: graph.content_hash().to_string(),
        written,
    };
    render_mode(
        ctx.output,
        &summary,
        |s, w| {
            writeln!(
                w,
                "N={} M={} isDag={} unsettled={} reached={}",
                s.n, s.m, s.is_dag, s.unsettled, s.reached
            )
        },
        |s, w| {
            pretty_section(w, "Graph metrics")?;
            pretty_kv(w, "nodes", s.n.to_string())?;
            pretty_kv(w, "edges", s.m.to_string())?;
            pretty_kv(w, "DAG", if s.is_dag { "yes" } else { "no (cycle)" })?;
            pretty_kv(w, "unsettled", s.unsettled.to_string())?;
            pretty_kv(w, "reached", s.reached.to_string())?;
            pretty_kv(w, "hash", &s.content_hash)?;
            for path in &s.written {
                pretty_kv(w, "wrote", path)?;
            }
            Ok(())
        },
    )
}

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use graphgate_analysis::cost::{CostModel, estimate};
use graphgate_core::artifact::names;
use graphgate_core::costmodel::CostModelDocument;
use graphgate_core::persist::{read_document, write_json};
use tracing::{debug, instrument};

use super::{DEFAULT_ARTIFACT_DIR, StageContext, artifact_path, load_csr};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `graphgate estimate`.
#[derive(Args, Debug)]
pub struct EstimateArgs {
    /// CSR graph input.
    #[arg(long)]
    pub graph: PathBuf,

    /// Cost model: a `{kind: {us}}` table or a raw sample list. Without it
    /// every node costs `cost.default_kind_us`.
    #[arg(long)]
    pub cost_model: Option<PathBuf>,

    /// Directory the artifact is written to.
    #[arg(long, default_value = DEFAULT_ARTIFACT_DIR)]
    pub out_dir: PathBuf,
}

/// Predict latency and resources and write `graph.estimate.json`.
///
/// # Errors
///
/// Returns an error if an input is unreadable or malformed, or the artifact
/// cannot be written.
#[instrument(skip_all, fields(graph = %args.graph.display()))]
pub fn run_estimate(args: &EstimateArgs, ctx: &StageContext) -> Result<()> {
    let graph = load_csr(&args.graph)?;
    let default_us = ctx.config.cost.default_kind_us;

    let model = match &args.cost_model {
        Some(path) => {
            let text = read_document(path)?;
            let doc = CostModelDocument::from_json(&text)
                .with_context(|| format!("loading {}", path.display()))?;
            CostModel::from_document(&doc, default_us)
        }
        None => {
            debug!("no cost model given, using default kind cost");
            CostModel::with_default(default_us)
        }
    };

    let artifact = estimate(&graph, &model, &ctx.config.cost);
    write_json(&artifact_path(&args.out_dir, names::ESTIMATE)?, &artifact)?;

    if !ctx.show_summary() {
        return Ok(());
    }
    render_mode(
        ctx.output,
        &artifact,
        |a, w| {
            writeln!(
                w,
                "ms={:.4} cpuPct={:.2} memKB={} ops={}",
                a.est.ms, a.est.cpu_pct, a.mem_kb, a.ops
            )
        },
        |a, w| {
            pretty_section(w, "Cost estimate")?;
            pretty_kv(w, "latency", format!("{:.4} ms", a.est.ms))?;
            pretty_kv(w, "cpu", format!("{:.2} %", a.est.cpu_pct))?;
            pretty_kv(w, "memory", format!("{} KiB", a.mem_kb))?;
            pretty_kv(w, "ops", a.ops.to_string())?;
            pretty_kv(w, "edge coef", format!("{:.6}", a.model.edge_coefficient))
        },
    )
}

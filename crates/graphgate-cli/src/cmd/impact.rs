use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use graphgate_analysis::deps::{build_impact_artifact, deps_dot};
use graphgate_core::artifact::names;
use graphgate_core::depgraph::DepGraph;
use graphgate_core::persist::{read_document, write_json, write_text};
use tracing::instrument;

use super::{DEFAULT_ARTIFACT_DIR, StageContext, artifact_path};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `graphgate impact`.
#[derive(Args, Debug)]
pub struct ImpactArgs {
    /// Dependency graph input (`{nodes, edges:[{from,to,kind}], directed}`).
    #[arg(long)]
    pub deps: PathBuf,

    /// Changed node names (repeatable or comma separated).
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub changed: Vec<String>,

    /// Also write `deps.dot`.
    #[arg(long)]
    pub dot: bool,

    /// Directory the artifacts are written to.
    #[arg(long, default_value = DEFAULT_ARTIFACT_DIR)]
    pub out_dir: PathBuf,
}

/// Compute closure and impact radius and write `graph.impact.json`.
///
/// Changed names missing from the graph are reported, not fatal.
///
/// # Errors
///
/// Returns an error if the dependency graph is unreadable or malformed, or
/// an artifact cannot be written.
#[instrument(skip_all, fields(deps = %args.deps.display()))]
pub fn run_impact(args: &ImpactArgs, ctx: &StageContext) -> Result<()> {
    let text = read_document(&args.deps)?;
    let graph =
        DepGraph::from_json(&text).with_context(|| format!("loading {}", args.deps.display()))?;

    let artifact = build_impact_artifact(&graph, &args.changed);
    write_json(&artifact_path(&args.out_dir, names::IMPACT)?, &artifact)?;

    if args.dot {
        write_text(&artifact_path(&args.out_dir, names::DEPS_DOT)?, &deps_dot(&graph))?;
    }

    if !ctx.show_summary() {
        return Ok(());
    }
    render_mode(
        ctx.output,
        &artifact,
        |a, w| {
            writeln!(w, "impact={}", a.impact.join(","))?;
            if !a.unknown.is_empty() {
                writeln!(w, "unknown={}", a.unknown.join(","))?;
            }
            Ok(())
        },
        |a, w| {
            pretty_section(w, "Impact radius")?;
            pretty_kv(w, "changed", a.changed.join(", "))?;
            for name in &a.impact {
                let dist = a.distances.get(name).copied().unwrap_or_default();
                pretty_kv(w, &format!("  +{dist}"), name)?;
            }
            pretty_kv(w, "closure", a.closure.len().to_string())?;
            if !a.unknown.is_empty() {
                pretty_kv(w, "unknown", a.unknown.join(", "))?;
            }
            Ok(())
        },
    )
}

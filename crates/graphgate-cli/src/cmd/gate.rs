use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use graphgate_analysis::gate::{GateInputs, evaluate};
use graphgate_core::artifact::{GateStatus, names};
use graphgate_core::persist::{read_optional_artifact, write_json};
use tracing::instrument;

use super::{DEFAULT_ARTIFACT_DIR, StageContext, artifact_path};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `graphgate gate`.
#[derive(Args, Debug)]
pub struct GateArgs {
    /// Directory holding the stage artifacts; `gates.status.json` is written here.
    #[arg(long, default_value = DEFAULT_ARTIFACT_DIR)]
    pub artifacts: PathBuf,

    /// Latency budget in milliseconds (overrides `gate.latency_budget_ms`).
    #[arg(long)]
    pub latency_budget_ms: Option<f64>,

    /// CPU budget in percent (overrides `gate.cpu_budget_pct`).
    #[arg(long)]
    pub cpu_budget_pct: Option<f64>,
}

/// Load whichever artifacts exist in `dir`.
///
/// A present but malformed artifact is an error, never a silent skip.
pub fn load_inputs(dir: &Path) -> Result<GateInputs> {
    Ok(GateInputs {
        metrics: read_optional_artifact(&dir.join(names::METRICS), names::METRICS)?,
        estimate: read_optional_artifact(&dir.join(names::ESTIMATE), names::ESTIMATE)?,
        analysis: read_optional_artifact(&dir.join(names::ANALYSIS), names::ANALYSIS)?,
        validation: read_optional_artifact(&dir.join(names::VALIDATION), names::VALIDATION)?,
        ast_findings: read_optional_artifact(
            &dir.join(names::AST_FINDINGS),
            names::AST_FINDINGS,
        )?,
    })
}

/// Merge the stage artifacts into `gates.status.json`.
///
/// Returns the gate decision; a failed gate is not an error.
///
/// # Errors
///
/// Returns an error if a threshold is missing or invalid, a present artifact
/// is malformed, or the status cannot be written.
#[instrument(skip_all, fields(artifacts = %args.artifacts.display()))]
pub fn run_gate(args: &GateArgs, ctx: &StageContext) -> Result<bool> {
    let thresholds = ctx
        .config
        .gate
        .thresholds(args.latency_budget_ms, args.cpu_budget_pct)?;
    let inputs = load_inputs(&args.artifacts)?;

    let status = evaluate(&inputs, thresholds);
    write_json(&artifact_path(&args.artifacts, names::GATE_STATUS)?, &status)?;

    if ctx.show_summary() {
        render_status(ctx, &status)?;
    }
    Ok(status.passed)
}

fn render_status(ctx: &StageContext, status: &GateStatus) -> Result<()> {
    render_mode(
        ctx.output,
        status,
        |s, w| {
            writeln!(w, "passed={}", s.passed)?;
            for f in &s.failures {
                writeln!(w, "failure\t{f}")?;
            }
            for n in &s.notes {
                writeln!(w, "note\t{n}")?;
            }
            Ok(())
        },
        |s, w| {
            pretty_section(w, if s.passed { "Gate: PASSED" } else { "Gate: FAILED" })?;
            for f in &s.failures {
                pretty_kv(w, "failure", f)?;
            }
            for n in &s.notes {
                pretty_kv(w, "note", n)?;
            }
            if let Some(ms) = s.metrics.ms {
                pretty_kv(
                    w,
                    "latency",
                    format!("{ms:.4} / {} ms", s.metrics.latency_budget_ms),
                )?;
            }
            if let Some(cpu) = s.metrics.cpu_pct {
                pretty_kv(w, "cpu", format!("{cpu:.2} / {} %", s.metrics.cpu_budget_pct))?;
            }
            Ok(())
        },
    )
}

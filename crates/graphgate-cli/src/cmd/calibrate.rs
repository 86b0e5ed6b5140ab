use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use graphgate_analysis::cost::CostModel;
use graphgate_core::costmodel::CostModelDocument;
use graphgate_core::persist::{read_document, write_json};
use tracing::{info, instrument};

use super::StageContext;
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `graphgate calibrate`.
#[derive(Args, Debug)]
pub struct CalibrateArgs {
    /// Sample list `[{nodeKind, us}]` (a `{kind: {us}}` table is passed through).
    #[arg(long)]
    pub samples: PathBuf,

    /// Where to write the `{kind: {us}}` cost model.
    #[arg(long)]
    pub out: PathBuf,
}

/// Turn observed samples into a per-kind cost table.
///
/// # Errors
///
/// Returns an error if the samples are unreadable or malformed, or the model
/// cannot be written.
#[instrument(skip_all, fields(samples = %args.samples.display()))]
pub fn run_calibrate(args: &CalibrateArgs, ctx: &StageContext) -> Result<()> {
    let text = read_document(&args.samples)?;
    let doc = CostModelDocument::from_json(&text)
        .with_context(|| format!("loading {}", args.samples.display()))?;

    let model = CostModel::from_document(&doc, ctx.config.cost.default_kind_us);
    let table = model.to_table();
    write_json(&args.out, &table)?;
    info!(kinds = table.len(), out = %args.out.display(), "cost model written");

    if !ctx.show_summary() {
        return Ok(());
    }
    render_mode(
        ctx.output,
        &table,
        |t, w| {
            for (kind, cost) in t {
                writeln!(w, "{kind}={}", cost.us)?;
            }
            Ok(())
        },
        |t, w| {
            pretty_section(w, "Calibrated cost model (us)")?;
            if t.is_empty() {
                pretty_kv(w, "default", model.default_us.to_string())?;
            }
            for (kind, cost) in t {
                pretty_kv(w, kind, format!("{:.3}", cost.us))?;
            }
            Ok(())
        },
    )
}

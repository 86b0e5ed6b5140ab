use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use graphgate_analysis::validate::{AccessPolicy, SourceText, validate_all};
use graphgate_core::artifact::names;
use graphgate_core::error::GateError;
use graphgate_core::model::ModelGraph;
use graphgate_core::persist::{read_document, write_json};
use tracing::instrument;

use super::{DEFAULT_ARTIFACT_DIR, StageContext, artifact_path};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `graphgate validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Semantic model graph (`{nodes, edges, rules?}`).
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Generated source files to run the access-policy lint on.
    #[arg(long = "text", num_args = 1..)]
    pub texts: Vec<PathBuf>,

    /// Directory the artifact is written to.
    #[arg(long, default_value = DEFAULT_ARTIFACT_DIR)]
    pub out_dir: PathBuf,
}

/// Read each path as a [`SourceText`] named after the path.
pub fn read_sources(paths: &[PathBuf]) -> Result<Vec<SourceText>> {
    paths
        .iter()
        .map(|path| -> Result<SourceText> {
            Ok(SourceText {
                name: path.display().to_string(),
                text: read_document(path)?,
            })
        })
        .collect()
}

/// Run type, property and policy checks and write `graph.validation.json`.
///
/// Violations are data: the stage succeeds even when errors are reported.
///
/// # Errors
///
/// Returns an error if no input is given, an input is unreadable or
/// malformed, a policy pattern is invalid, or the artifact cannot be written.
#[instrument(skip_all)]
pub fn run_validate(args: &ValidateArgs, ctx: &StageContext) -> Result<()> {
    if args.model.is_none() && args.texts.is_empty() {
        return Err(GateError::Usage("give --model, --text, or both".to_string()).into());
    }

    let model = match &args.model {
        Some(path) => {
            let text = read_document(path)?;
            Some(
                ModelGraph::from_json(&text)
                    .with_context(|| format!("loading {}", path.display()))?,
            )
        }
        None => None,
    };
    let sources = read_sources(&args.texts)?;
    let policy = AccessPolicy::from_config(&ctx.config.policy)?;

    let report = validate_all(
        model.as_ref(),
        &sources,
        &ctx.config.validation.rules,
        &policy,
    );
    write_json(&artifact_path(&args.out_dir, names::VALIDATION)?, &report)?;

    if !ctx.show_summary() {
        return Ok(());
    }
    render_mode(
        ctx.output,
        &report,
        |r, w| {
            for v in &r.violations {
                writeln!(w, "{}\t{}\t{}\t{}", v.severity, v.id, v.node, v.message)?;
            }
            writeln!(w, "errors={} warnings={}", r.counts.errors, r.counts.warnings)
        },
        |r, w| {
            pretty_section(w, "Validation")?;
            for v in &r.violations {
                writeln!(w, "{:<8} {:<28} {}: {}", v.severity, v.id, v.node, v.message)?;
            }
            pretty_kv(w, "errors", r.counts.errors.to_string())?;
            pretty_kv(w, "warnings", r.counts.warnings.to_string())
        },
    )
}

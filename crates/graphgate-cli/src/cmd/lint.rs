use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use graphgate_analysis::validate::AccessPolicy;
use graphgate_core::artifact::{AstFindingsArtifact, names};
use graphgate_core::persist::write_json;
use tracing::{info, instrument};

use super::validate::read_sources;
use super::{DEFAULT_ARTIFACT_DIR, StageContext, artifact_path};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `graphgate lint`.
#[derive(Args, Debug)]
pub struct LintArgs {
    /// Generated source files to scan.
    #[arg(required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Directory the artifact is written to.
    #[arg(long, default_value = DEFAULT_ARTIFACT_DIR)]
    pub out_dir: PathBuf,
}

/// Locate raw-buffer accesses and write `ast.findings.json`.
///
/// # Errors
///
/// Returns an error if a file is unreadable, a policy pattern is invalid, or
/// the artifact cannot be written.
#[instrument(skip_all, fields(files = args.files.len()))]
pub fn run_lint(args: &LintArgs, ctx: &StageContext) -> Result<()> {
    let policy = AccessPolicy::from_config(&ctx.config.policy)?;
    let sources = read_sources(&args.files)?;

    let mut artifact = AstFindingsArtifact::default();
    for source in &sources {
        artifact
            .memory_access_findings
            .extend(policy.scan(&source.name, &source.text));
        artifact.files.push(source.name.clone());
    }
    info!(findings = artifact.memory_access_findings.len(), "lint finished");

    write_json(&artifact_path(&args.out_dir, names::AST_FINDINGS)?, &artifact)?;

    if !ctx.show_summary() {
        return Ok(());
    }
    render_mode(
        ctx.output,
        &artifact,
        |a, w| {
            for f in &a.memory_access_findings {
                writeln!(w, "{}:{}:{}: {}", f.file, f.line, f.column, f.snippet)?;
            }
            writeln!(w, "findings={}", a.memory_access_findings.len())
        },
        |a, w| {
            pretty_section(w, "Memory access lint")?;
            for f in &a.memory_access_findings {
                writeln!(w, "{}:{}:{}  {}", f.file, f.line, f.column, f.snippet)?;
            }
            pretty_kv(w, "files", a.files.len().to_string())?;
            pretty_kv(w, "findings", a.memory_access_findings.len().to_string())
        },
    )
}

#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use cmd::StageContext;
use graphgate_core::config::{ConfigSource, resolve_config};
use graphgate_core::error::{EXIT_GATE_FAILED, EXIT_OK, EXIT_USAGE_OR_IO, GateError};
use output::{CliError, OutputMode};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "graphgate: graph analysis and quality gates for generated code",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON summaries instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Suppress stdout summaries (artifacts are still written).
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Explicit config file (otherwise ./graphgate.toml, then the user config).
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Graph",
        about = "Traverse a CSR graph and detect cycles",
        long_about = "Run BFS, DFS, Dijkstra and a topological sort from a source node. Writes graph.metrics.json and graph.analysis.json, plus graph.cycles.dot when a cycle exists.",
        after_help = "EXAMPLES:\n    # Analyze a graph into ./artifacts\n    graphgate metrics --graph graph.json\n\n    # Pick a different traversal source\n    graphgate metrics --graph graph.json --source 3 --out-dir out"
    )]
    Metrics(cmd::metrics::MetricsArgs),

    #[command(
        next_help_heading = "Graph",
        about = "Compute the impact radius of changed nodes",
        long_about = "Multi-source BFS over a named dependency graph. Writes graph.impact.json.",
        after_help = "EXAMPLES:\n    # Impact of two changed modules\n    graphgate impact --deps deps.json --changed parser,lexer\n\n    # Also emit deps.dot\n    graphgate impact --deps deps.json --changed parser --dot"
    )]
    Impact(cmd::impact::ImpactArgs),

    #[command(
        next_help_heading = "Cost",
        about = "Calibrate a cost model from samples",
        after_help = "EXAMPLES:\n    graphgate calibrate --samples samples.json --out cost-model.json"
    )]
    Calibrate(cmd::calibrate::CalibrateArgs),

    #[command(
        next_help_heading = "Cost",
        about = "Estimate latency, CPU and memory for a graph",
        long_about = "Apply a cost model to a CSR graph. Writes graph.estimate.json.",
        after_help = "EXAMPLES:\n    graphgate estimate --graph graph.json --cost-model cost-model.json"
    )]
    Estimate(cmd::estimate::EstimateArgs),

    #[command(
        next_help_heading = "Checks",
        about = "Check port types, property rules and the access policy",
        long_about = "Validate a semantic model graph and lint generated text. Writes graph.validation.json.",
        after_help = "EXAMPLES:\n    graphgate validate --model model.json --text shader.glsl"
    )]
    Validate(cmd::validate::ValidateArgs),

    #[command(
        next_help_heading = "Checks",
        about = "Locate raw memory accesses in generated files",
        long_about = "Report every disallowed raw-buffer index with its position. Writes ast.findings.json.",
        after_help = "EXAMPLES:\n    graphgate lint gen/*.glsl"
    )]
    Lint(cmd::lint::LintArgs),

    #[command(
        next_help_heading = "Gate",
        about = "Merge stage artifacts into a pass/fail decision",
        long_about = "Evaluate every hard-fail predicate over the artifacts present and write gates.status.json. Exits 1 when the gate fails.",
        after_help = "EXAMPLES:\n    graphgate gate --latency-budget-ms 8 --cpu-budget-pct 80\n\n    # Thresholds from graphgate.toml [gate]\n    graphgate gate --artifacts out"
    )]
    Gate(cmd::gate::GateArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    graphgate completions bash > /etc/bash_completion.d/graphgate"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

impl Commands {
    /// Stage label used in error prefixes.
    const fn stage(&self) -> &'static str {
        match self {
            Self::Metrics(_) => "metrics",
            Self::Impact(_) => "impact",
            Self::Calibrate(_) => "calibrate",
            Self::Estimate(_) => "estimate",
            Self::Validate(_) => "validate",
            Self::Lint(_) => "lint",
            Self::Gate(_) => "gate",
            Self::Completions(_) => "completions",
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("GRAPHGATE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "graphgate=debug,info"
        } else {
            "graphgate=info,warn"
        })
    });

    let format = env::var("GRAPHGATE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Run the selected stage and return its exit code.
fn run(cli: Cli, output: OutputMode) -> anyhow::Result<u8> {
    if let Commands::Completions(args) = &cli.command {
        cmd::completions::run_completions(args, Cli::command(), &mut std::io::stdout().lock());
        return Ok(EXIT_OK);
    }

    let working_dir = env::current_dir()?;
    let (config, source) = resolve_config(cli.config.as_deref(), &working_dir)?;
    match source {
        ConfigSource::Defaults => debug!("using built-in defaults"),
        ConfigSource::Explicit(path) | ConfigSource::Project(path) | ConfigSource::User(path) => {
            debug!(path = %path.display(), "config loaded");
        }
    }

    let ctx = StageContext {
        config,
        output,
        quiet: cli.quiet,
    };

    match &cli.command {
        Commands::Metrics(args) => cmd::metrics::run_metrics(args, &ctx)?,
        Commands::Impact(args) => cmd::impact::run_impact(args, &ctx)?,
        Commands::Calibrate(args) => cmd::calibrate::run_calibrate(args, &ctx)?,
        Commands::Estimate(args) => cmd::estimate::run_estimate(args, &ctx)?,
        Commands::Validate(args) => cmd::validate::run_validate(args, &ctx)?,
        Commands::Lint(args) => cmd::lint::run_lint(args, &ctx)?,
        Commands::Gate(args) => {
            let passed = cmd::gate::run_gate(args, &ctx)?;
            return Ok(if passed { EXIT_OK } else { EXIT_GATE_FAILED });
        }
        Commands::Completions(_) => {}
    }
    Ok(EXIT_OK)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    let stage = cli.command.stage();

    match run(cli, output) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            output::render_error(output, &CliError::from_anyhow(stage, &err));
            let code = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<GateError>())
                .map_or(EXIT_USAGE_OR_IO, GateError::exit_code);
            ExitCode::from(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["graphgate", "metrics", "--graph", "g.json", "--json"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn quiet_and_config_are_global() {
        let cli = Cli::parse_from([
            "graphgate",
            "-q",
            "--config",
            "gg.toml",
            "gate",
            "--latency-budget-ms",
            "8",
        ]);
        assert!(cli.quiet);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("gg.toml")));
        let Commands::Gate(args) = cli.command else {
            panic!("expected gate");
        };
        assert_eq!(args.latency_budget_ms, Some(8.0));
        assert_eq!(args.cpu_budget_pct, None);
    }

    #[test]
    fn metrics_defaults() {
        let cli = Cli::parse_from(["graphgate", "metrics", "--graph", "g.json"]);
        let Commands::Metrics(args) = cli.command else {
            panic!("expected metrics");
        };
        assert_eq!(args.source, 0);
        assert_eq!(args.out_dir, std::path::PathBuf::from("artifacts"));
    }

    #[test]
    fn changed_accepts_commas_and_repeats() {
        let cli = Cli::parse_from([
            "graphgate", "impact", "--deps", "d.json", "--changed", "A,B", "--changed", "C",
        ]);
        let Commands::Impact(args) = cli.command else {
            panic!("expected impact");
        };
        assert_eq!(args.changed, vec!["A", "B", "C"]);
    }

    #[test]
    fn lint_requires_files() {
        assert!(Cli::try_parse_from(["graphgate", "lint"]).is_err());
    }

    #[test]
    fn stage_labels() {
        let cli = Cli::parse_from(["graphgate", "completions", "bash"]);
        assert_eq!(cli.command.stage(), "completions");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}

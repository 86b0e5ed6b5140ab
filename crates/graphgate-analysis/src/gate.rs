//! Gate evaluator.
//!
//! Merges whatever stage artifacts exist into one pass/fail decision. A
//! missing artifact is recorded as a note and never fails the gate. Every
//! hard-fail predicate is evaluated; failures accumulate rather than stopping
//! at the first one.

use graphgate_core::artifact::{
    AnalysisArtifact, AstFindingsArtifact, EstimateArtifact, GateSnapshot, GateStatus,
    MetricsArtifact, ValidationArtifact, names,
};
use graphgate_core::config::GateThresholds;
use tracing::{info, instrument, warn};

/// Stage artifacts available to the gate. `None` means the file was absent.
#[derive(Debug, Clone, Default)]
pub struct GateInputs {
    pub metrics: Option<MetricsArtifact>,
    pub estimate: Option<EstimateArtifact>,
    pub analysis: Option<AnalysisArtifact>,
    pub validation: Option<ValidationArtifact>,
    pub ast_findings: Option<AstFindingsArtifact>,
}

fn missing(notes: &mut Vec<String>, file: &str) {
    notes.push(format!("{file} not found; checks depending on it were skipped"));
}

/// Evaluate all hard-fail predicates against `thresholds`.
#[must_use]
#[instrument(skip_all)]
pub fn evaluate(inputs: &GateInputs, thresholds: GateThresholds) -> GateStatus {
    let mut failures: Vec<String> = Vec::new();
    let mut notes: Vec<String> = Vec::new();
    let mut snapshot = GateSnapshot {
        latency_budget_ms: thresholds.latency_budget_ms,
        cpu_budget_pct: thresholds.cpu_budget_pct,
        ..GateSnapshot::default()
    };

    match &inputs.analysis {
        Some(analysis) => {
            snapshot.cycle_detected = Some(analysis.cycle_detected);
            if analysis.cycle_detected {
                failures.push(format!(
                    "cycle detected: {} of {} nodes could not be ordered",
                    analysis.unsettled.len(),
                    analysis.n
                ));
            }
        }
        None => missing(&mut notes, names::ANALYSIS),
    }

    match &inputs.metrics {
        Some(metrics) => {
            snapshot.content_hash.clone_from(&metrics.content_hash);
            snapshot.n = Some(metrics.n);
            snapshot.m = Some(metrics.m);
            snapshot.is_dag = Some(metrics.is_dag);
            if !metrics.is_dag {
                failures.push("graph is not a DAG".to_string());
            }
        }
        None => missing(&mut notes, names::METRICS),
    }

    match &inputs.estimate {
        Some(estimate) => {
            let est = estimate.est;
            snapshot.ms = Some(est.ms);
            snapshot.cpu_pct = Some(est.cpu_pct);
            snapshot.mem_kb = Some(estimate.mem_kb);
            if est.ms > thresholds.latency_budget_ms {
                failures.push(format!(
                    "estimated latency {:.3} ms exceeds budget {} ms",
                    est.ms, thresholds.latency_budget_ms
                ));
            }
            if est.cpu_pct > thresholds.cpu_budget_pct {
                failures.push(format!(
                    "estimated CPU {:.1}% exceeds budget {}%",
                    est.cpu_pct, thresholds.cpu_budget_pct
                ));
            }
        }
        None => missing(&mut notes, names::ESTIMATE),
    }

    match &inputs.validation {
        Some(validation) => {
            snapshot.validation_errors = Some(validation.counts.errors);
            snapshot.validation_warnings = Some(validation.counts.warnings);
            if validation.error_count() > 0 {
                failures.push(format!(
                    "validation reported {} error(s)",
                    validation.error_count()
                ));
            }
        }
        None => missing(&mut notes, names::VALIDATION),
    }

    match &inputs.ast_findings {
        Some(ast) => {
            let count = ast.memory_access_findings.len();
            snapshot.memory_access_findings = Some(count);
            if count > 0 {
                failures.push(format!("{count} direct memory access finding(s)"));
            }
        }
        None => missing(&mut notes, names::AST_FINDINGS),
    }

    let passed = failures.is_empty();
    if passed {
        info!(notes = notes.len(), "gate passed");
    } else {
        warn!(failures = failures.len(), "gate failed");
    }

    GateStatus {
        passed,
        failures,
        notes,
        metrics: snapshot,
    }
}

//! Artifact documents exchanged between pipeline stages.
//!
//! Every stage reads whole JSON documents from a shared directory and writes
//! whole documents back. The file names in [`names`] are the contract between
//! stages; the structs below are the schemas. Fields a consumer relies on are
//! required, descriptive extras default when absent so artifacts written by
//! older producers still load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Severity;

/// Well-known artifact file names inside an artifact directory.
pub mod names {
    pub const METRICS: &str = "graph.metrics.json";
    pub const ANALYSIS: &str = "graph.analysis.json";
    pub const IMPACT: &str = "graph.impact.json";
    pub const ESTIMATE: &str = "graph.estimate.json";
    pub const VALIDATION: &str = "graph.validation.json";
    pub const AST_FINDINGS: &str = "ast.findings.json";
    pub const GATE_STATUS: &str = "gates.status.json";
    pub const DEPS_DOT: &str = "deps.dot";
    pub const CYCLES_DOT: &str = "graph.cycles.dot";
}

/// Distance value used for unreached nodes in BFS and Dijkstra arrays.
pub const UNREACHED: i64 = -1;

// ---------------------------------------------------------------------------
// graph.metrics.json / graph.analysis.json
// ---------------------------------------------------------------------------

/// Traversal facts for one CSR graph (`graph.metrics.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsArtifact {
    #[serde(rename = "N")]
    pub n: usize,
    #[serde(rename = "M")]
    pub m: usize,
    #[serde(default)]
    pub directed: bool,
    /// Traversal source node, absent for an empty graph.
    #[serde(default)]
    pub source: Option<usize>,
    /// BFS hop distances, [`UNREACHED`] for unreached nodes.
    #[serde(default)]
    pub bfs: Vec<i64>,
    /// DFS preorder from the source.
    #[serde(default)]
    pub dfs: Vec<usize>,
    /// Dijkstra distances, `-1.0` for unreached nodes.
    #[serde(default)]
    pub dijkstra: Vec<f64>,
    /// Topological order, `null` when the graph has a cycle.
    #[serde(default)]
    pub topo: Option<Vec<usize>>,
    pub cycle: bool,
    pub is_dag: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

/// Cycle analysis with a best-effort edge dump (`graph.analysis.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisArtifact {
    pub cycle_detected: bool,
    /// Number of nodes placed in the (possibly partial) topological order.
    #[serde(default)]
    pub settled: usize,
    #[serde(rename = "N", default)]
    pub n: usize,
    #[serde(rename = "M", default)]
    pub m: usize,
    /// Nodes never settled by Kahn's algorithm: members of, or downstream of, a cycle.
    #[serde(default)]
    pub unsettled: Vec<usize>,
    /// Every edge of the graph as `[source, target]`.
    #[serde(default)]
    pub edges: Vec<[usize; 2]>,
}

// ---------------------------------------------------------------------------
// graph.impact.json
// ---------------------------------------------------------------------------

/// Closure and impact radius for a changed-node set (`graph.impact.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactArtifact {
    pub changed: Vec<String>,
    /// Every node reachable from the changed set, sorted by name.
    pub closure: Vec<String>,
    /// Reachable nodes ordered by distance, then name.
    pub impact: Vec<String>,
    #[serde(default)]
    pub distances: BTreeMap<String, usize>,
    /// Changed names that are not nodes of the dependency graph.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown: Vec<String>,
}

// ---------------------------------------------------------------------------
// graph.estimate.json
// ---------------------------------------------------------------------------

/// Predicted latency and CPU share.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub ms: f64,
    pub cpu_pct: f64,
}

/// Parameters the estimate was computed with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EstimateModel {
    /// Per-kind average cost in microseconds.
    pub kinds: BTreeMap<String, f64>,
    pub default_us: f64,
    pub base_overhead_ms: f64,
    pub edge_coefficient: f64,
    pub structural_coefficient: f64,
    pub frame_budget_ms: f64,
    pub avg_out_degree: f64,
}

/// Cost estimate for one CSR graph (`graph.estimate.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateArtifact {
    pub est: Estimate,
    #[serde(default)]
    pub ops: u64,
    #[serde(rename = "memKB", default)]
    pub mem_kb: u64,
    #[serde(default)]
    pub model: EstimateModel,
}

// ---------------------------------------------------------------------------
// graph.validation.json
// ---------------------------------------------------------------------------

/// One finding of the validation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Machine-readable rule id, e.g. `type.mismatch`.
    pub id: String,
    /// Offending node id (or input name for text checks).
    pub node: String,
    pub message: String,
    pub severity: Severity,
}

/// Error and warning tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationCounts {
    pub errors: usize,
    pub warnings: usize,
}

impl ViolationCounts {
    /// Tally a violation list.
    #[must_use]
    pub fn of(violations: &[Violation]) -> Self {
        violations.iter().fold(Self::default(), |mut acc, v| {
            match v.severity {
                Severity::Error => acc.errors += 1,
                Severity::Warning => acc.warnings += 1,
            }
            acc
        })
    }
}

/// Validation report (`graph.validation.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationArtifact {
    pub violations: Vec<Violation>,
    pub counts: ViolationCounts,
}

impl ValidationArtifact {
    /// Build a report, deriving counts from the violation list.
    #[must_use]
    pub fn new(violations: Vec<Violation>) -> Self {
        let counts = ViolationCounts::of(&violations);
        Self { violations, counts }
    }

    /// Number of error-severity violations.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.counts.errors
    }
}

// ---------------------------------------------------------------------------
// ast.findings.json
// ---------------------------------------------------------------------------

/// A disallowed raw-buffer access found in generated text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryAccessFinding {
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column of the match start.
    pub column: usize,
    pub pattern: String,
    pub snippet: String,
}

/// Raw memory-access findings (`ast.findings.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstFindingsArtifact {
    pub memory_access_findings: Vec<MemoryAccessFinding>,
    /// Files that were scanned.
    #[serde(default)]
    pub files: Vec<String>,
}

// ---------------------------------------------------------------------------
// gates.status.json
// ---------------------------------------------------------------------------

/// Snapshot of the metrics the gate decision was based on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    #[serde(rename = "N", default, skip_serializing_if = "Option::is_none")]
    pub n: Option<usize>,
    #[serde(rename = "M", default, skip_serializing_if = "Option::is_none")]
    pub m: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_dag: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_detected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_pct: Option<f64>,
    #[serde(rename = "memKB", default, skip_serializing_if = "Option::is_none")]
    pub mem_kb: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_warnings: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_access_findings: Option<usize>,
    pub latency_budget_ms: f64,
    pub cpu_budget_pct: f64,
}

/// Terminal artifact of the pipeline (`gates.status.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateStatus {
    pub passed: bool,
    pub failures: Vec<String>,
    pub notes: Vec<String>,
    pub metrics: GateSnapshot,
}

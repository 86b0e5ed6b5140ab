//! Known-fixture regression tests across the analysis stages.
//!
//! Each test feeds a hand-written input document through the same functions
//! the CLI stages call and checks the artifact fields a downstream stage
//! relies on.

use graphgate_analysis::cost::{CostModel, calibrate, estimate};
use graphgate_analysis::deps::{build_impact_artifact, transitive_closure};
use graphgate_analysis::gate::{GateInputs, evaluate};
use graphgate_analysis::graph::analyze;
use graphgate_analysis::validate::{AccessPolicy, SourceText, validate_all};
use graphgate_core::config::{CostConfig, GateThresholds, PolicyConfig};
use graphgate_core::costmodel::CostModelDocument;
use graphgate_core::csr::CsrGraph;
use graphgate_core::depgraph::DepGraph;
use graphgate_core::model::ModelGraph;

// ---------------------------------------------------------------------------
// Dependency analyzer
// ---------------------------------------------------------------------------

const DEPS: &str = r#"{
    "nodes": ["A", "B", "C", "D", "E"],
    "edges": [
        {"from": "A", "to": "B", "kind": "code"},
        {"from": "B", "to": "C", "kind": "code"},
        {"from": "B", "to": "D", "kind": "asset"},
        {"from": "D", "to": "E", "kind": "config"}
    ],
    "directed": true
}"#;

#[test]
fn closure_of_a_reaches_d_and_e() {
    let g = DepGraph::from_json(DEPS).expect("fixture parses");
    let closure = transitive_closure(&g, ["A"]).nodes;
    assert!(closure.contains(&"D".to_string()));
    assert!(closure.contains(&"E".to_string()));
}

#[test]
fn impact_of_b_is_ordered() {
    let g = DepGraph::from_json(DEPS).expect("fixture parses");
    let artifact = build_impact_artifact(&g, &["B".to_string()]);
    assert_eq!(artifact.impact, vec!["B", "C", "D", "E"]);
    assert_eq!(artifact.closure, vec!["B", "C", "D", "E"]);
    assert!(artifact.unknown.is_empty());
}

#[test]
fn dangling_dependency_is_malformed() {
    let err = DepGraph::from_json(r#"{"nodes":["A"],"edges":[{"from":"A","to":"Q","kind":"code"}]}"#)
        .expect_err("dangling endpoint rejected");
    assert!(err.to_string().contains("Q"));
}

// ---------------------------------------------------------------------------
// Validation engine
// ---------------------------------------------------------------------------

fn policy() -> AccessPolicy {
    AccessPolicy::from_config(&PolicyConfig::default()).expect("default policy compiles")
}

fn text(body: &str) -> Vec<SourceText> {
    vec![SourceText {
        name: "shader.glsl".to_string(),
        text: body.to_string(),
    }]
}

#[test]
fn spectrogram_index_is_one_direct_access() {
    let report = validate_all(None, &text("float x = spectrogram[3];"), &[], &policy());
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].id, "audio.directAccess");
    assert_eq!(report.counts.errors, 1);
}

#[test]
fn accessor_token_clears_direct_access() {
    let report = validate_all(
        None,
        &text("float x = spectrogram[3]; // via AUDIO_SPECTRUM"),
        &[],
        &policy(),
    );
    assert!(report.violations.is_empty());
}

#[test]
fn color_into_color_float_inputs_is_clean() {
    let graph = ModelGraph::from_json(
        r#"{"nodes":[{"id":"a"},{"id":"b","inputs":["color","float"]}],
            "edges":[{"from":"a","to":"b","type":"color"}]}"#,
    )
    .expect("valid");
    assert!(validate_all(Some(&graph), &[], &[], &policy()).violations.is_empty());
}

#[test]
fn color_into_float_input_is_one_mismatch() {
    let graph = ModelGraph::from_json(
        r#"{"nodes":[{"id":"a"},{"id":"b","inputs":["float"]}],
            "edges":[{"from":"a","to":"b","type":"color"}]}"#,
    )
    .expect("valid");
    let report = validate_all(Some(&graph), &[], &[], &policy());
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].id, "type.mismatch");
}

// ---------------------------------------------------------------------------
// Cost estimator
// ---------------------------------------------------------------------------

#[test]
fn estimate_is_bit_identical_across_runs_and_sample_orders() {
    let g = CsrGraph::from_json(
        r#"{"offsets":[0,2,3,4,4],"edges":[1,2,3,3],"directed":true,"nodeKind":[0,1,1,2]}"#,
    )
    .expect("valid");
    let forward = r#"[{"nodeKind":0,"us":1.1},{"nodeKind":1,"us":2.2},{"nodeKind":1,"us":3.3},{"nodeKind":1,"us":0.7}]"#;
    let backward = r#"[{"nodeKind":1,"us":0.7},{"nodeKind":1,"us":3.3},{"nodeKind":1,"us":2.2},{"nodeKind":0,"us":1.1}]"#;

    let model_for = |text: &str| {
        let CostModelDocument::Samples(samples) = CostModelDocument::from_json(text).expect("valid")
        else {
            panic!("expected samples");
        };
        calibrate(&samples, 1.0)
    };

    let config = CostConfig::default();
    let a = estimate(&g, &model_for(forward), &config);
    let b = estimate(&g, &model_for(backward), &config);
    assert_eq!(a.est.ms.to_bits(), b.est.ms.to_bits());
    assert_eq!(a.est.cpu_pct.to_bits(), b.est.cpu_pct.to_bits());
    assert_eq!(a, b);
}

#[test]
fn graph_without_kinds_uses_default_cost() {
    let g = CsrGraph::from_json(r#"{"offsets":[0,1,1],"edges":[1],"directed":true}"#)
        .expect("valid");
    let est = estimate(&g, &CostModel::with_default(500.0), &CostConfig::default());
    assert!((est.model.edge_coefficient - 0.5).abs() < 1e-12);
}

// ---------------------------------------------------------------------------
// Gate evaluator
// ---------------------------------------------------------------------------

const THRESHOLDS: GateThresholds = GateThresholds {
    latency_budget_ms: 16.67,
    cpu_budget_pct: 85.0,
};

#[test]
fn gate_never_passes_with_a_cycle() {
    let g = CsrGraph::from_json(r#"{"offsets":[0,1,2,3],"edges":[1,2,0],"directed":true}"#)
        .expect("valid");
    let report = analyze(&g, 0);
    let inputs = GateInputs {
        analysis: Some(report.analysis),
        ..GateInputs::default()
    };
    let status = evaluate(&inputs, THRESHOLDS);
    assert!(!status.passed);
    assert_eq!(status.failures.len(), 1);
}

#[test]
fn gate_accumulates_every_failure() {
    let g = CsrGraph::from_json(r#"{"offsets":[0,1,2],"edges":[1,0],"directed":true}"#)
        .expect("valid");
    let report = analyze(&g, 0);
    let mut est = estimate(&g, &CostModel::with_default(1.0e6), &CostConfig::default());
    est.est.ms = 100.0;

    let validation = validate_all(None, &text("waveform[0];"), &[], &policy());
    let findings = graphgate_core::artifact::AstFindingsArtifact {
        memory_access_findings: policy().scan("shader.glsl", "waveform[0];"),
        files: vec!["shader.glsl".to_string()],
    };

    let inputs = GateInputs {
        metrics: Some(report.metrics),
        estimate: Some(est),
        analysis: Some(report.analysis),
        validation: Some(validation),
        ast_findings: Some(findings),
    };
    let status = evaluate(&inputs, THRESHOLDS);
    assert!(!status.passed);
    assert_eq!(status.failures.len(), 6, "{:?}", status.failures);
    assert!(status.notes.is_empty());
    assert_eq!(status.metrics.is_dag, Some(false));
    assert!(status.metrics.content_hash.is_some());
}

#[test]
fn clean_pipeline_passes() {
    let g = CsrGraph::from_json(r#"{"offsets":[0,1,2,2],"edges":[1,2],"directed":true}"#)
        .expect("valid");
    let report = analyze(&g, 0);
    let est = estimate(&g, &CostModel::with_default(1.0), &CostConfig::default());
    let inputs = GateInputs {
        metrics: Some(report.metrics),
        estimate: Some(est),
        analysis: Some(report.analysis),
        validation: None,
        ast_findings: None,
    };
    let status = evaluate(&inputs, THRESHOLDS);
    assert!(status.passed, "{:?}", status.failures);
    assert_eq!(status.notes.len(), 2);
}

//! Validation engine.
//!
//! Three independent checks produce [`Violation`]s:
//!
//! - [`types::check_types`]: port types along model graph edges
//! - [`constraints::check_constraints`]: per-property rules on nodes
//! - [`policy::AccessPolicy::lint_text`]: raw-buffer access in generated text
//!
//! [`validate_all`] runs every check and concatenates the results. A failing
//! check never prevents the others from running.

pub mod constraints;
pub mod policy;
pub mod types;

use graphgate_core::artifact::{ValidationArtifact, Violation};
use graphgate_core::model::{ModelGraph, PropertyRule};
use tracing::{debug, info, instrument};

pub use constraints::check_constraints;
pub use policy::AccessPolicy;
pub use types::check_types;

/// A generated source file to lint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub name: String,
    pub text: String,
}

/// Run all checks and build `graph.validation.json`.
///
/// Violation order: type checks, then property rules, then one text lint per
/// source in the order given.
#[must_use]
#[instrument(skip_all, fields(model = model.is_some(), texts = texts.len()))]
pub fn validate_all(
    model: Option<&ModelGraph>,
    texts: &[SourceText],
    rules: &[PropertyRule],
    policy: &AccessPolicy,
) -> ValidationArtifact {
    let mut violations: Vec<Violation> = Vec::new();

    if let Some(graph) = model {
        let typed = check_types(graph);
        debug!(count = typed.len(), "type check");
        violations.extend(typed);

        let constrained = check_constraints(graph, rules);
        debug!(count = constrained.len(), "constraint check");
        violations.extend(constrained);
    }

    for source in texts {
        violations.extend(policy.lint_text(&source.name, &source.text));
    }

    let artifact = ValidationArtifact::new(violations);
    info!(
        errors = artifact.counts.errors,
        warnings = artifact.counts.warnings,
        "validation finished"
    );
    artifact
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphgate_core::config::PolicyConfig;

    #[test]
    fn checks_do_not_short_circuit() {
        let graph = ModelGraph::from_json(
            r#"{"nodes":[{"id":"a","props":{"bypass":1}},{"id":"b","inputs":["float"]}],
                "edges":[{"from":"a","to":"b","type":"color"},{"from":"a","to":"nope"}],
                "rules":[{"property":"bypass","rule":"boolean","severity":"warning"}]}"#,
        )
        .expect("valid");
        let policy = AccessPolicy::from_config(&PolicyConfig::default()).expect("compile");
        let texts = vec![SourceText {
            name: "gen.glsl".to_string(),
            text: "float v = spectrogram[0];".to_string(),
        }];

        let report = validate_all(Some(&graph), &texts, &[], &policy);
        let ids: Vec<&str> = report.violations.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["type.mismatch", "edge.missingNode", "prop.notBoolean", "audio.directAccess"]
        );
        assert_eq!(report.counts.errors, 3);
        assert_eq!(report.counts.warnings, 1);
    }

    #[test]
    fn nothing_to_check_is_clean() {
        let policy = AccessPolicy::from_config(&PolicyConfig::default()).expect("compile");
        let report = validate_all(None, &[], &[], &policy);
        assert!(report.violations.is_empty());
        assert_eq!(report.error_count(), 0);
    }
}

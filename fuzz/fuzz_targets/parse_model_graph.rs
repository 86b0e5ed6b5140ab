#![no_main]

use graphgate_analysis::validate::{AccessPolicy, validate_all};
use graphgate_core::config::PolicyConfig;
use graphgate_core::model::ModelGraph;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(graph) = ModelGraph::from_json(text) {
        let Ok(policy) = AccessPolicy::from_config(&PolicyConfig::default()) else {
            return;
        };
        let report = validate_all(Some(&graph), &[], &graph.rules, &policy);
        assert_eq!(report.counts.errors + report.counts.warnings, report.violations.len());
    }
});

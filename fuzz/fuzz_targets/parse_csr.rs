#![no_main]

use graphgate_analysis::graph::analyze;
use graphgate_core::csr::CsrGraph;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Anything that loads must survive a full traversal pass.
    if let Ok(graph) = CsrGraph::from_json(text) {
        let report = analyze(&graph, 0);
        assert_eq!(report.metrics.n, graph.node_count());
        assert_eq!(report.analysis.settled + report.analysis.unsettled.len(), graph.node_count());
    }
});

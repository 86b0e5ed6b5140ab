//! Cost estimator.
//!
//! A [`CostModel`] maps node-kind labels to an average per-node cost in
//! microseconds, with a global default for kinds it has not seen. Models are
//! read directly from a `{kind: {us}}` table or calibrated from raw samples.
//!
//! The estimate for a graph with `N` nodes and `M` edges is
//!
//! ```text
//! ms     = base + edge_coef * avg_out_degree * N + structural_coef * cbrt(N)
//! cpuPct = clamp(ms / frame_budget_ms * 100, 0, 95)
//! memKB  = round((N + M) * 4 / 1024)
//! ops    = N + M
//! ```
//!
//! where `edge_coef = edge_scale * mean per-node cost in ms`, the mean taken
//! over the graph's nodes looked up by kind.

use std::collections::BTreeMap;

use graphgate_core::artifact::{Estimate, EstimateArtifact, EstimateModel};
use graphgate_core::config::CostConfig;
use graphgate_core::costmodel::{CostModelDocument, CostSample, KindCost};
use graphgate_core::csr::CsrGraph;
use tracing::{debug, instrument};

/// Upper bound of the reported CPU share.
pub const CPU_PCT_CAP: f64 = 95.0;

/// Per-kind average cost table.
#[derive(Debug, Clone, PartialEq)]
pub struct CostModel {
    pub per_kind_us: BTreeMap<String, f64>,
    pub default_us: f64,
}

impl CostModel {
    /// A model that only knows the default cost.
    #[must_use]
    pub const fn with_default(default_us: f64) -> Self {
        Self {
            per_kind_us: BTreeMap::new(),
            default_us,
        }
    }

    /// Build a model from a decoded document, calibrating sample lists.
    #[must_use]
    pub fn from_document(doc: &CostModelDocument, default_us: f64) -> Self {
        match doc {
            CostModelDocument::Table(table) => Self {
                per_kind_us: table.iter().map(|(k, c)| (k.clone(), c.us)).collect(),
                default_us,
            },
            CostModelDocument::Samples(samples) => calibrate(samples, default_us),
        }
    }

    /// Average cost of `kind`, falling back to the default.
    #[must_use]
    pub fn cost_us(&self, kind: &str) -> f64 {
        self.per_kind_us.get(kind).copied().unwrap_or(self.default_us)
    }

    /// The `{kind: {us}}` table form written by the calibrate stage.
    #[must_use]
    pub fn to_table(&self) -> BTreeMap<String, KindCost> {
        self.per_kind_us
            .iter()
            .map(|(k, &us)| (k.clone(), KindCost { us }))
            .collect()
    }
}

/// Per-kind arithmetic mean of observed costs.
///
/// Each kind's samples are summed in ascending order, so the mean is
/// bit-identical for any permutation of the same sample multiset. With no
/// samples the model holds only `default_us`.
#[must_use]
#[instrument(skip_all, fields(samples = samples.len()))]
pub fn calibrate(samples: &[CostSample], default_us: f64) -> CostModel {
    let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for sample in samples {
        grouped.entry(sample.node_kind.label()).or_default().push(sample.us);
    }

    let per_kind_us = grouped
        .into_iter()
        .map(|(kind, mut values)| {
            values.sort_by(f64::total_cmp);
            let sum: f64 = values.iter().sum();
            #[allow(clippy::cast_precision_loss)]
            let mean = sum / values.len() as f64;
            (kind, mean)
        })
        .collect::<BTreeMap<_, _>>();

    debug!(kinds = per_kind_us.len(), "calibrated cost model");
    CostModel {
        per_kind_us,
        default_us,
    }
}

/// Mean per-node cost in microseconds over the graph's nodes.
fn mean_node_cost_us(graph: &CsrGraph, model: &CostModel) -> f64 {
    let n = graph.node_count();
    match graph.node_kinds() {
        Some(kinds) if n > 0 => {
            let total: f64 = kinds.iter().map(|k| model.cost_us(&k.to_string())).sum();
            #[allow(clippy::cast_precision_loss)]
            let mean = total / n as f64;
            mean
        }
        _ => model.default_us,
    }
}

/// Predict latency, CPU share, memory and op count for `graph`.
///
/// Pure: identical inputs give bit-identical output.
#[must_use]
#[instrument(skip_all, fields(n = graph.node_count(), m = graph.edge_count()))]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn estimate(graph: &CsrGraph, model: &CostModel, config: &CostConfig) -> EstimateArtifact {
    let n = graph.node_count();
    let m = graph.edge_count();
    let nf = n as f64;
    let mf = m as f64;

    let avg_out_degree = if n == 0 { 0.0 } else { mf / nf };
    let edge_coefficient = config.edge_scale * mean_node_cost_us(graph, model) / 1000.0;

    let ms = config.base_overhead_ms
        + edge_coefficient * avg_out_degree * nf
        + config.structural_coefficient * nf.cbrt();
    let cpu_pct = (ms / config.frame_budget_ms * 100.0).clamp(0.0, CPU_PCT_CAP);
    let mem_kb = ((nf + mf) * 4.0 / 1024.0).round() as u64;
    let ops = (n + m) as u64;

    debug!(ms, cpu_pct, mem_kb, ops, "estimate computed");

    EstimateArtifact {
        est: Estimate { ms, cpu_pct },
        ops,
        mem_kb,
        model: EstimateModel {
            kinds: model.per_kind_us.clone(),
            default_us: model.default_us,
            base_overhead_ms: config.base_overhead_ms,
            edge_coefficient,
            structural_coefficient: config.structural_coefficient,
            frame_budget_ms: config.frame_budget_ms,
            avg_out_degree,
        },
    }
}

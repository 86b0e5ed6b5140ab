use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use graphgate_analysis::cost::{CostModel, estimate};
use graphgate_analysis::graph::{bfs, dijkstra, topo_sort};
use graphgate_core::config::CostConfig;
use graphgate_core::csr::{CsrGraph, CsrInput};

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

/// Layered DAG: each node links to the next three indices.
fn layered(n: usize) -> CsrGraph {
    let mut offsets = Vec::with_capacity(n + 1);
    let mut edges = Vec::with_capacity(n * 3);
    offsets.push(0);
    for u in 0..n {
        for step in 1..=3 {
            if u + step < n {
                edges.push(u + step);
            }
        }
        offsets.push(edges.len());
    }
    #[allow(clippy::cast_possible_truncation)]
    let node_kind = Some((0..n).map(|u| (u % 7) as u32).collect());
    CsrGraph::from_input(CsrInput {
        offsets,
        edges,
        directed: true,
        node_kind,
        weights: None,
    })
    .expect("layered graph is well formed")
}

fn bench_traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("traversal");

    for n in SIZES {
        let graph = layered(n);
        group.throughput(Throughput::Elements((graph.node_count() + graph.edge_count()) as u64));

        group.bench_with_input(BenchmarkId::new("bfs", n), &graph, |b, g| {
            b.iter(|| black_box(bfs(g, 0)));
        });
        group.bench_with_input(BenchmarkId::new("dijkstra", n), &graph, |b, g| {
            b.iter(|| black_box(dijkstra(g, 0)));
        });
        group.bench_with_input(BenchmarkId::new("topo", n), &graph, |b, g| {
            b.iter(|| black_box(topo_sort(g)));
        });
    }

    group.finish();
}

fn bench_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate");
    let model = CostModel::with_default(1.0);
    let config = CostConfig::default();

    for n in SIZES {
        let graph = layered(n);
        group.bench_with_input(BenchmarkId::new("estimate", n), &graph, |b, g| {
            b.iter(|| black_box(estimate(g, &model, &config)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_traversal, bench_estimate);
criterion_main!(benches);

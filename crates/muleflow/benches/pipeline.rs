//! Benchmark suite for the MuleFlow pipeline.
//!
//! Run with: `cargo bench --package muleflow`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use muleflow::prelude::*;

const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;

/// Background traffic with injected laundering structures, sized by
/// transaction count.
fn scenario(transactions: usize) -> Vec<Transaction> {
    let mut gen = ScenarioGenerator::new(7);
    let accounts = ScenarioGenerator::account_ids("ACC", transactions / 10 + 2);
    let mut txs = gen.background(&accounts, transactions, 0, 30 * DAY);

    let ring = ScenarioGenerator::account_ids("RING", 4);
    txs.extend(gen.cycle_ring(&ring, 20_000.0, 5 * DAY, 2 * HOUR));

    let senders = ScenarioGenerator::account_ids("FAN", 14);
    txs.extend(gen.fan_in("SINK", &senders, 1_000.0, 40.0, 10 * DAY, 48 * HOUR));

    let shells = ScenarioGenerator::account_ids("SHELL", 5);
    txs.extend(gen.shell_chain(&shells, 60_000.0, 1_500.0, 12 * DAY, HOUR));

    txs
}

fn analyze_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/analyze");
    let config = AnalysisConfig::default();

    for size in [500, 2_000, 10_000].iter() {
        let txs = scenario(*size);
        group.throughput(Throughput::Elements(txs.len() as u64));
        group.bench_with_input(BenchmarkId::new("transactions", size), size, |b, _| {
            b.iter(|| analyze(black_box(&txs), black_box(&config)))
        });
    }

    group.finish();
}

fn build_graph_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/build-graph");

    for size in [2_000, 10_000].iter() {
        let txs = scenario(*size);
        group.throughput(Throughput::Elements(txs.len() as u64));
        group.bench_with_input(BenchmarkId::new("transactions", size), size, |b, _| {
            b.iter(|| GraphBuilder::new().build(black_box(&txs)))
        });
    }

    group.finish();
}

criterion_group!(benches, analyze_benchmark, build_graph_benchmark);
criterion_main!(benches);

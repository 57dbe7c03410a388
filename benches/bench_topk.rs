use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use svs_common::types::Neighbor;
use svs_core::pack::greedy_fill;
use svs_core::topk::TopK;

fn random_batch(k: usize) -> Vec<Neighbor> {
    let mut rng = rand::thread_rng();
    let mut batch: Vec<Neighbor> = (0..k)
        .map(|i| Neighbor::new(i as i64, rng.gen_range(-1.0..1.0)))
        .collect();
    batch.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
    batch
}

/// Benchmark merging per-shard result batches at different k and shard
/// counts.
fn bench_topk_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("topk_merge");

    for &(num_shards, k) in &[(4, 10), (16, 10), (4, 100), (16, 100)] {
        let batches: Vec<Vec<Neighbor>> = (0..num_shards).map(|_| random_batch(k)).collect();

        group.throughput(Throughput::Elements((num_shards * k) as u64));
        group.bench_with_input(
            BenchmarkId::new(format!("k{k}"), num_shards),
            &batches,
            |b, batches| {
                b.iter(|| {
                    let mut merged = TopK::seeded(k, &batches[0]);
                    for batch in &batches[1..] {
                        for &candidate in batch {
                            merged.offer(candidate);
                        }
                    }
                    merged.into_sorted()
                });
            },
        );
    }
    group.finish();
}

/// Benchmark the bucket-fill planning step across cluster sizes.
fn bench_greedy_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("greedy_fill");

    for &num_shards in &[8usize, 64, 512] {
        let mut rng = rand::thread_rng();
        let sizes: Vec<u32> = (0..num_shards).map(|_| rng.gen_range(0..1000)).collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(num_shards),
            &sizes,
            |b, sizes| {
                b.iter(|| greedy_fill(10_000, 1000, sizes));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_topk_merge, bench_greedy_fill);
criterion_main!(benches);

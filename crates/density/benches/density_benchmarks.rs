//! Benchmarks for point accumulation and density field construction.
//!
//! Run with: cargo bench --package density --bench density_benchmarks
//! Parallel rows: cargo bench --package density --features parallel

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;

use density::{Accumulator, FieldBuilder};
use kde_common::{Sample, WeightedPoint};

/// Random points inside a small lng/lat box.
fn random_points(count: usize) -> Vec<WeightedPoint> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            WeightedPoint::new(
                121.50 + rng.gen_range(0.0..0.05),
                25.00 + rng.gen_range(0.0..0.05),
                rng.gen_range(1.0..10.0),
            )
        })
        .collect()
}

// =============================================================================
// ACCUMULATOR BENCHMARKS
// =============================================================================

fn bench_accumulator(c: &mut Criterion) {
    let mut group = c.benchmark_group("accumulator");

    for count in [1_000usize, 10_000, 100_000] {
        let mut rng = rand::thread_rng();
        // Coordinates snapped to a coarse lattice so buckets collide.
        let samples: Vec<Sample> = (0..count)
            .map(|_| {
                Sample::new(
                    rng.gen_range(0..200) as f64 * 0.001,
                    rng.gen_range(0..200) as f64 * 0.001,
                )
                .with_value(rng.gen_range(-1.0..5.0))
            })
            .collect();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("add_many", count), &samples, |b, samples| {
            b.iter(|| {
                let mut acc = Accumulator::default();
                acc.add_many(black_box(samples.iter().copied()));
                acc.len()
            });
        });
    }

    group.finish();
}

// =============================================================================
// FIELD BENCHMARKS
// =============================================================================

fn bench_field(c: &mut Criterion) {
    let mut group = c.benchmark_group("density_field");
    group.sample_size(20);

    for count in [50usize, 200, 1_000] {
        let points = random_points(count);

        group.bench_with_input(BenchmarkId::new("full", count), &points, |b, points| {
            b.iter(|| FieldBuilder::new(0.001, 0.002).build(black_box(points)));
        });

        group.bench_with_input(BenchmarkId::new("cutoff_4_sigma", count), &points, |b, points| {
            b.iter(|| {
                FieldBuilder::new(0.001, 0.002)
                    .with_cutoff_sigmas(4.0)
                    .build(black_box(points))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_accumulator, bench_field);
criterion_main!(benches);

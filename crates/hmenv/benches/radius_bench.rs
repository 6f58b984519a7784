//! Criterion benches for the two radius estimators on seeded random clouds.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use hmenv::radius::{binned_radius, hull_vertex_radius};
use nalgebra::Vector3;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_cloud(n: usize, seed: u64) -> Vec<Vector3<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            Vector3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            )
        })
        .collect()
}

fn bench_radius(c: &mut Criterion) {
    let mut group = c.benchmark_group("radius");
    for &n in &[1_000usize, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::new("hull", n), &n, |b, &n| {
            b.iter_batched(
                || random_cloud(n, 42),
                |pts| {
                    let _ = hull_vertex_radius(&pts);
                },
                BatchSize::LargeInput,
            )
        });
        group.bench_with_input(BenchmarkId::new("bins_18x36", n), &n, |b, &n| {
            b.iter_batched(
                || random_cloud(n, 43),
                |pts| {
                    let _ = binned_radius(&pts, 18, 36);
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_radius);
criterion_main!(benches);

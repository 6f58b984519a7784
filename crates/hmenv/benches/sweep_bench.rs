//! Criterion benches for the envelope sweep.
//!
//! - adj/VS and pyr/CS at a few angle resolutions (point counts up to ~1e5).
//! - serial vs. parallel sweep when built with `--features parallel`.
//!
//! Results live under `target/criterion`.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use hmenv::config::{ClusterCombination, EnvelopeCfg, SpeedType};
use hmenv::envelope::generate;

fn cfg(comb: ClusterCombination, speed: SpeedType, n_theta: usize, n_h: usize) -> EnvelopeCfg {
    EnvelopeCfg {
        combination: comb,
        speed,
        angle_segments: n_theta,
        magnitude_segments: n_h,
        ..EnvelopeCfg::default()
    }
}

fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep");
    group.sample_size(20);
    for &n in &[12usize, 24, 36] {
        let adj = cfg(ClusterCombination::AdjacentPair, SpeedType::Variable, n, 5);
        group.bench_with_input(BenchmarkId::new("adj_vs", n), &adj, |b, cfg| {
            b.iter(|| generate(cfg).unwrap())
        });
    }
    for &n in &[6usize, 12, 18] {
        let pyr = cfg(ClusterCombination::Pyramid, SpeedType::Constant, n, 2);
        group.bench_with_input(BenchmarkId::new("pyr_cs", n), &pyr, |b, cfg| {
            b.iter(|| generate(cfg).unwrap())
        });
        #[cfg(feature = "parallel")]
        group.bench_with_input(BenchmarkId::new("pyr_cs_par", n), &pyr, |b, cfg| {
            b.iter(|| hmenv::envelope::generate_par(cfg).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sweep);
criterion_main!(benches);

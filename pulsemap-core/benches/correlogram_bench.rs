//! Criterion benchmarks for the correlogram hot paths.
//!
//! Benchmarks:
//! 1. ACF over a multi-year daily series at 40 lags
//! 2. CCF over a pair of aligned series at ±40 lags
//! 3. Rolling volatility precompute

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pulsemap_core::preprocess::rolling_population_std;
use pulsemap_core::stats::{acf, ccf};

/// Deterministic pseudo-noisy series (no RNG dependency needed).
fn make_series(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            (t * 0.37).sin() * 3.0 + (t * 0.011).cos() * 10.0 + (t * 7.7).sin()
        })
        .collect()
}

fn bench_acf(c: &mut Criterion) {
    let mut group = c.benchmark_group("acf");
    for n in [252usize, 1260, 2520] {
        let series = make_series(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &series, |b, s| {
            b.iter(|| acf(black_box(s), 40));
        });
    }
    group.finish();
}

fn bench_ccf(c: &mut Criterion) {
    let x = make_series(1260);
    let y: Vec<f64> = x.iter().rev().copied().collect();
    c.bench_function("ccf_1260x40", |b| {
        b.iter(|| ccf(black_box(&x), black_box(&y), 40));
    });
}

fn bench_rolling_std(c: &mut Criterion) {
    let series = make_series(2520);
    c.bench_function("rolling_std_2520w7", |b| {
        b.iter(|| rolling_population_std(black_box(&series), 7));
    });
}

criterion_group!(benches, bench_acf, bench_ccf, bench_rolling_std);
criterion_main!(benches);

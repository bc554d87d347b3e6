//! Benchmarks for the propagation pipeline.
//!
//! Run with: cargo bench -p itm-core --bench itm_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use itm_core::prelude::*;

fn rolling_profile(samples: usize) -> TerrainProfile {
    let heights: Vec<f64> = (0..samples)
        .map(|i| 50.0 * (2.0 * std::f64::consts::PI * i as f64 / 100.0).sin())
        .collect();
    TerrainProfile::new(heights, 1000.0).expect("valid profile")
}

fn bench_point_to_point(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_to_point");

    let params = ItmParams::builder().heights(30.0, 30.0).frequency(500.0).build();
    for samples in [101usize, 401, 1001].iter() {
        let terrain = rolling_profile(*samples);
        group.throughput(Throughput::Elements(*samples as u64));
        group.bench_with_input(
            BenchmarkId::new("rolling", samples),
            samples,
            |b, _| b.iter(|| point_to_point(black_box(&params), black_box(&terrain))),
        );
    }

    group.finish();
}

fn bench_area(c: &mut Criterion) {
    let mut group = c.benchmark_group("area");

    let params = ItmParams::builder().heights(30.0, 30.0).frequency(500.0).build();
    for distance_km in [10.0f64, 100.0, 400.0].iter() {
        group.bench_with_input(
            BenchmarkId::new("random_siting", *distance_km as u64),
            distance_km,
            |b, &d| {
                b.iter(|| {
                    area(
                        black_box(&params),
                        SitingCriteria::Random,
                        SitingCriteria::Random,
                        black_box(d),
                        90.0,
                    )
                })
            },
        );
    }

    group.finish();
}

fn bench_frequency_sweep(c: &mut Criterion) {
    let terrain = rolling_profile(101);

    c.bench_function("frequency_sweep_20", |b| {
        b.iter(|| {
            for i in 0..20 {
                let f = 40.0 + 498.0 * i as f64;
                let params = ItmParams::builder().heights(30.0, 30.0).frequency(f).build();
                let _ = point_to_point(black_box(&params), black_box(&terrain));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_point_to_point,
    bench_area,
    bench_frequency_sweep
);
criterion_main!(benches);

//! Benchmarks for the CPU integration path and particle resets.
//!
//! Run with: `cargo bench`

use attractors::integrator::{advance, integrate_point, StepParams};
use attractors::particles::scatter;
use attractors::{Preset, PresetRegistry, Vec3};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn scattered(count: usize) -> Vec<Vec3> {
    let mut rng = SmallRng::seed_from_u64(42);
    let mut positions = vec![Vec3::ZERO; count];
    scatter(&mut positions, 20.0, &mut rng).unwrap();
    positions
}

fn bench_integrate_point(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrate_point");

    for preset in PresetRegistry::builtin().iter() {
        group.bench_function(preset.name.as_str(), |b| {
            let params = StepParams::new(0.0015, 4);
            let p = Vec3::new(1.0, 2.0, 3.0);
            b.iter(|| black_box(integrate_point(&preset.field, black_box(p), params)))
        });
    }

    group.finish();
}

fn bench_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance");
    group.sample_size(20);

    let field = Preset::lorenz(10.0, 28.0, 8.0 / 3.0).field;
    let params = StepParams::new(0.0015, 4);

    for count in [10_000usize, 100_000, 1_000_000] {
        let src = scattered(count);
        let mut dst = vec![Vec3::ZERO; count];

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("lorenz", count), &count, |b, _| {
            b.iter(|| advance(black_box(&src), &mut dst, &field, params))
        });
    }

    group.finish();
}

fn bench_sub_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("sub_steps");
    group.sample_size(20);

    let field = Preset::lorenz(10.0, 28.0, 8.0 / 3.0).field;
    let src = scattered(100_000);
    let mut dst = vec![Vec3::ZERO; src.len()];

    for sub_steps in [1u32, 4, 16] {
        let params = StepParams::new(0.0015, sub_steps);
        group.bench_with_input(BenchmarkId::from_parameter(sub_steps), &sub_steps, |b, _| {
            b.iter(|| advance(black_box(&src), &mut dst, &field, params))
        });
    }

    group.finish();
}

fn bench_scatter(c: &mut Criterion) {
    let mut group = c.benchmark_group("scatter");

    for count in [100_000usize, 1_000_000] {
        let mut positions = vec![Vec3::ZERO; count];
        let mut rng = SmallRng::seed_from_u64(7);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| scatter(black_box(&mut positions), 20.0, &mut rng))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_integrate_point,
    bench_advance,
    bench_sub_steps,
    bench_scatter,
);
criterion_main!(benches);

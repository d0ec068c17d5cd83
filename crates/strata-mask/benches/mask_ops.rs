//! Benchmarks for the hot mask operations: summed-area smoothing,
//! distance fields, and stochastic morphology.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::sync::Arc;
use strata_mask::{BitMask, Mask, ScalarMask};
use strata_symmetry::{Symmetry, SymmetryScope, SymmetrySettings};

const SIZE: u32 = 256;

fn settings() -> Arc<SymmetrySettings> {
    Arc::new(SymmetrySettings::uniform(Symmetry::Point2))
}

fn seeded_bit() -> BitMask {
    let mut mask: BitMask = Mask::new(SIZE, Some(42), settings());
    mask.randomize(0.4);
    mask
}

fn bench_smooth(c: &mut Criterion) {
    let mut mask: ScalarMask = Mask::new(SIZE, Some(42), settings());
    mask.add_white_noise(1.0);
    let mut group = c.benchmark_group("smooth");
    for radius in [1u32, 4, 16] {
        group.bench_function(format!("radius-{radius}"), |b| {
            b.iter(|| {
                let mut scratch = mask.clone();
                scratch.smooth(black_box(radius));
                scratch
            })
        });
    }
    group.finish();
}

fn bench_distance_field(c: &mut Criterion) {
    let mask = seeded_bit();
    c.bench_function("distance_field", |b| {
        b.iter(|| black_box(&mask).distance_field())
    });
}

fn bench_grow(c: &mut Criterion) {
    let mask = seeded_bit();
    c.bench_function("grow", |b| {
        b.iter(|| {
            let mut scratch = mask.clone();
            scratch.grow(black_box(0.5), SymmetryScope::Terrain, 2);
            scratch
        })
    });
}

fn bench_inflate(c: &mut Criterion) {
    let mask = seeded_bit();
    c.bench_function("inflate", |b| {
        b.iter(|| {
            let mut scratch = mask.clone();
            scratch.inflate(black_box(8.0));
            scratch
        })
    });
}

criterion_group!(
    benches,
    bench_smooth,
    bench_distance_field,
    bench_grow,
    bench_inflate
);
criterion_main!(benches);

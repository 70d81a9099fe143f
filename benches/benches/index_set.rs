// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use thicket_index_set::IndexSet;

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }
}

fn scattered(len: u32, universe: u32, seed: u64) -> Vec<u32> {
    let mut rng = Lcg::new(seed);
    (0..len).map(|_| rng.next_u32() % universe).collect()
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_set/construct");

    for len in [1_024_u32, 16_384, 262_144] {
        group.throughput(Throughput::Elements(u64::from(len)));

        group.bench_with_input(BenchmarkId::new("from_range", len), &len, |b, &len| {
            b.iter(|| black_box(IndexSet::from_range(0..len)));
        });

        let indices = scattered(len, len * 4, 0x7A1C_0000_0000_0001);
        group.bench_with_input(
            BenchmarkId::new("from_indices_scattered", len),
            &indices,
            |b, indices| {
                b.iter(|| black_box(IndexSet::from_indices(indices)));
            },
        );
    }

    group.finish();
}

fn bench_set_algebra(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_set/algebra");

    for len in [1_024_u32, 16_384, 262_144] {
        let left = IndexSet::from_range(0..len);
        let right = IndexSet::from_range(len / 2..len + len / 2);
        group.throughput(Throughput::Elements(u64::from(len)));

        group.bench_with_input(BenchmarkId::new("union_with", len), &len, |b, _| {
            b.iter_batched(
                || left.clone(),
                |mut set| {
                    set.union_with(&right);
                    black_box(set);
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("difference_with", len), &len, |b, _| {
            b.iter_batched(
                || left.clone(),
                |mut set| {
                    set.difference_with(&right);
                    black_box(set);
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("remove_range", len), &len, |b, &len| {
            b.iter_batched(
                || left.clone(),
                |mut set| {
                    set.remove_range(len / 4..len / 2);
                    black_box(set);
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("ranges", len), &len, |b, _| {
            b.iter(|| black_box(left.ranges()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_construction, bench_set_algebra);
criterion_main!(benches);

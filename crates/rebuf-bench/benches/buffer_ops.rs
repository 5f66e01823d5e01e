//! Criterion micro-benchmarks for engine buffer operations.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use rebuf_bench::{ramp_buffer, ELEMENT_COUNT};
use rebuf_core::{ElemType, Kind};
use rebuf_engine::Buffer;

/// Benchmark: Zeroed allocation of 16K `u32` elements.
fn bench_allocate_zeroed(c: &mut Criterion) {
    c.bench_function("allocate_zeroed_16k", |b| {
        b.iter(|| {
            let buf = Buffer::allocate_zeroed(black_box(ELEMENT_COUNT), 4).unwrap();
            black_box(buf.size());
        });
    });
}

/// Benchmark: Statically typed sum over 16K `u32` elements.
fn bench_typed_sum(c: &mut Criterion) {
    let buf = ramp_buffer(ELEMENT_COUNT);
    c.bench_function("typed_sum_16k", |b| {
        b.iter(|| {
            let sum: u64 = (0..buf.len_of::<u32>())
                .filter_map(|i| buf.get::<u32>(i))
                .map(u64::from)
                .sum();
            black_box(sum);
        });
    });
}

/// Benchmark: Runtime-typed reads of the same data, reinterpreted as floats.
fn bench_runtime_read(c: &mut Criterion) {
    let buf = ramp_buffer(ELEMENT_COUNT);
    let ty = ElemType::unsigned(Kind::Float);
    c.bench_function("runtime_read_f32_16k", |b| {
        b.iter(|| {
            let mut acc = 0.0f64;
            for i in 0..buf.len_as(ty) {
                if let Some(v) = buf.read(i, ty) {
                    acc += v.to_f64();
                }
            }
            black_box(acc);
        });
    });
}

/// Benchmark: Growing one byte at a time from 1 to 4 KiB.
fn bench_incremental_growth(c: &mut Criterion) {
    c.bench_function("enlarge_by_one_4k", |b| {
        b.iter(|| {
            let mut buf = Buffer::allocate(1).unwrap();
            for _ in 1..4096 {
                buf.enlarge(1).unwrap();
            }
            black_box(buf.capacity());
        });
    });
}

criterion_group!(
    benches,
    bench_allocate_zeroed,
    bench_typed_sum,
    bench_runtime_read,
    bench_incremental_growth
);
criterion_main!(benches);

//! Criterion micro-benchmarks for array growth on the heap and pool backends.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bumpvec_array::DynArray;
use bumpvec_bench::{interleaved_growth, push_pop, reference_pool, RECORD_BYTES};
use bumpvec_pool::Pool;

/// Benchmark: push then pop 10K records on the heap backend.
fn bench_heap_push_pop_10k(c: &mut Criterion) {
    c.bench_function("heap_push_pop_10k", |b| {
        b.iter(|| {
            let mut arr: DynArray<'_> = DynArray::create(None, 1, RECORD_BYTES).unwrap();
            black_box(push_pop(&mut arr, 10_000).unwrap());
            arr.release();
        });
    });
}

/// Benchmark: push then pop 10K records on a pool where the array stays the
/// tail, so every growth extends in place.
fn bench_pool_tail_push_pop_10k(c: &mut Criterion) {
    let pool = reference_pool();
    c.bench_function("pool_tail_push_pop_10k", |b| {
        b.iter(|| {
            let mut arr = DynArray::create(Some(&pool), 1, RECORD_BYTES).unwrap();
            black_box(push_pop(&mut arr, 10_000).unwrap());
            arr.release();
        });
    });
    assert_eq!(pool.borrow().tail().offset, 0);
}

/// Benchmark: two arrays growing in lockstep, so every growth reallocates.
fn bench_pool_interleaved_1k(c: &mut Criterion) {
    let pool = reference_pool();
    c.bench_function("pool_interleaved_1k", |b| {
        b.iter(|| {
            black_box(interleaved_growth(&pool, 1_000).unwrap());
            pool.borrow_mut().reset();
        });
    });
}

/// Benchmark: reserve once, then fill 10K records without further growth.
fn bench_pool_reserved_fill_10k(c: &mut Criterion) {
    let pool = reference_pool();
    c.bench_function("pool_reserved_fill_10k", |b| {
        b.iter(|| {
            let mut arr = DynArray::create(Some(&pool), 0, RECORD_BYTES).unwrap();
            arr.reserve(10_000).unwrap();
            arr.push_n(10_000).unwrap().fill(1);
            black_box(arr.len());
            arr.release();
        });
    });
}

criterion_group!(
    benches,
    bench_heap_push_pop_10k,
    bench_pool_tail_push_pop_10k,
    bench_pool_interleaved_1k,
    bench_pool_reserved_fill_10k
);
criterion_main!(benches);

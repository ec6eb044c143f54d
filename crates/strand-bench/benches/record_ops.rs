//! Criterion micro-benchmarks for command recording and list reset.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use strand_arena::{ArenaConfig, CommandAllocator};
use strand_bench::{record_frame, record_upload};
use strand_command::CommandList;
use strand_test_utils::fixtures::ResourceSet;

/// Benchmark: record a 256-draw frame into a warm list, then reset it.
fn bench_record_frame_256(c: &mut Criterion) {
    let set = ResourceSet::new();
    let mut list = CommandList::default();
    c.bench_function("record_frame_256", |b| {
        b.iter(|| {
            record_frame(&mut list, &set, 256);
            black_box(list.len());
            list.reset();
        });
    });
}

/// Benchmark: 64 uploads of 4 KiB, spanning several arenas.
fn bench_record_upload_256k(c: &mut Criterion) {
    let set = ResourceSet::new();
    let mut list = CommandList::default();
    c.bench_function("record_upload_256k", |b| {
        b.iter(|| {
            record_upload(&mut list, &set, 64, 4096);
            black_box(list.allocator().used_bytes());
            list.reset();
        });
    });
}

/// Benchmark: raw arena bump allocation of 1024 small payloads.
fn bench_allocator_bump(c: &mut Criterion) {
    let mut alloc = CommandAllocator::new(&ArenaConfig::default()).unwrap();
    let payload = [7u32; 4];
    c.bench_function("allocator_bump_1024", |b| {
        b.iter(|| {
            for _ in 0..1024 {
                black_box(alloc.alloc_slice(&payload).unwrap());
            }
            alloc.reset();
        });
    });
}

criterion_group!(
    benches,
    bench_record_frame_256,
    bench_record_upload_256k,
    bench_allocator_bump
);
criterion_main!(benches);

//! Forwarding overhead benchmarks
//!
//! Compares a direct system allocation against the same request routed
//! through a hook pair value and through the process-wide registry.

#![allow(unsafe_code)]

use std::hint::black_box;
use std::ptr::NonNull;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use meshnav_alloc::{
    AllocHint, AllocHooks, GlobalHooks, RawAllocator, SystemAllocator, registry, system_alloc,
    system_free,
};

fn custom_alloc(size: usize, hint: AllocHint) -> Option<NonNull<u8>> {
    system_alloc(size, hint)
}

unsafe fn custom_free(ptr: NonNull<u8>) {
    unsafe { system_free(ptr) }
}

fn round_trip<A: RawAllocator>(alloc: &A, size: usize) {
    let ptr = alloc.allocate(size, AllocHint::Temporary).unwrap();
    black_box(ptr);
    unsafe { alloc.deallocate(ptr) };
}

/// Single allocate/release cycle per path
fn bench_single_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_cycle");

    for size in [16usize, 256, 4096] {
        group.bench_with_input(BenchmarkId::new("system_direct", size), &size, |b, &size| {
            let alloc = SystemAllocator::new();
            b.iter(|| round_trip(&alloc, black_box(size)));
        });

        group.bench_with_input(BenchmarkId::new("hook_pair", size), &size, |b, &size| {
            let hooks = AllocHooks::new(custom_alloc, custom_free);
            b.iter(|| round_trip(&hooks, black_box(size)));
        });

        group.bench_with_input(
            BenchmarkId::new("registry_default", size),
            &size,
            |b, &size| {
                registry::reset();
                b.iter(|| round_trip(&GlobalHooks, black_box(size)));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("registry_custom", size),
            &size,
            |b, &size| {
                registry::configure(Some(custom_alloc), Some(custom_free));
                b.iter(|| {
                    let ptr = registry::allocate(black_box(size), AllocHint::Temporary).unwrap();
                    black_box(ptr);
                    unsafe { registry::deallocate(ptr.as_ptr()) };
                });
                registry::reset();
            },
        );
    }

    group.finish();
}

/// Many live blocks, released in allocation order
fn bench_batch(c: &mut Criterion) {
    const BATCH: usize = 100;

    let mut group = c.benchmark_group("batch_100x64b");

    group.bench_function("system_direct", |b| {
        let alloc = SystemAllocator::new();
        b.iter(|| {
            let blocks: Vec<_> = (0..BATCH)
                .map(|_| alloc.allocate(64, AllocHint::Permanent).unwrap())
                .collect();
            for ptr in blocks {
                unsafe { alloc.deallocate(ptr) };
            }
        });
    });

    group.bench_function("registry_default", |b| {
        registry::reset();
        b.iter(|| {
            let blocks: Vec<_> = (0..BATCH)
                .map(|_| registry::allocate(64, AllocHint::Permanent).unwrap())
                .collect();
            for ptr in blocks {
                unsafe { registry::deallocate(ptr.as_ptr()) };
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_single_cycle, bench_batch);
criterion_main!(benches);

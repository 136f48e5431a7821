//! Benchmarks for block unstacking and 4x4 averaging.
//!
//! Run with: cargo bench --package misr --bench unstack_benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use misr::{downsample_4x4, unstack, unstack_values, MisrResolution, BLOCK_COUNT};
use test_utils::block_stack;

// =============================================================================
// UNSTACK BENCHMARKS
// =============================================================================

fn bench_unstack(c: &mut Criterion) {
    let mut group = c.benchmark_group("unstack");
    group.sample_size(10);

    let resolution = MisrResolution::Low;
    let radiance = vec![42.0f64; resolution.stack_len()];
    let counts = vec![1u16; resolution.stack_len()];
    group.throughput(Throughput::Elements(radiance.len() as u64));

    group.bench_function("low_f64", |b| {
        b.iter(|| black_box(unstack_values(black_box(&radiance), resolution).unwrap()));
    });
    group.bench_function("low_u16", |b| {
        b.iter(|| black_box(unstack(black_box(&counts), resolution, 0).unwrap()));
    });

    group.finish();
}

// =============================================================================
// DOWNSAMPLE BENCHMARKS
// =============================================================================

fn bench_downsample(c: &mut Criterion) {
    let mut group = c.benchmark_group("downsample_4x4");
    group.sample_size(10);

    // A tenth of an orbit at high resolution.
    let high = MisrResolution::High;
    let blocks = BLOCK_COUNT / 10;
    let data = block_stack(blocks, high.rows_per_block(), high.block_width());
    group.throughput(Throughput::Elements(data.len() as u64));

    group.bench_function("18_blocks", |b| {
        b.iter(|| {
            black_box(
                downsample_4x4(
                    black_box(&data),
                    blocks,
                    high.rows_per_block(),
                    high.block_width(),
                )
                .unwrap(),
            )
        });
    });

    group.finish();
}

criterion_group!(benches, bench_unstack, bench_downsample);
criterion_main!(benches);

//! Benchmarks for a single slope channel.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use eurorack_dsp::dsp::slope::{increments, Slope, SlopeMode};

use crate::BLOCK_SIZES;

pub fn bench_slope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/slope");
    let (rise, fall) = increments(220.0, 0.3, 48_000.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Linear curve skips the shaper entirely
        for (name, curve) in [("linear", 0.5), ("exponential", 0.1), ("sine", 0.9)] {
            let mut slope = Slope::new();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for sample in buffer.iter_mut() {
                        slope.next_sample(SlopeMode::Cycle, 0.0, rise, fall);
                        *sample = slope.shaped(black_box(curve));
                    }
                })
            });
        }
    }

    group.finish();
}

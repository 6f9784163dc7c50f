//! Benchmarks for waveshaping transfer functions.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use eurorack_dsp::dsp::distortion;

use crate::BLOCK_SIZES;

pub fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/distortion");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sine-like values)
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        let shapers: [(&str, fn(f32) -> f32); 5] = [
            ("tanh", |x| distortion::tanh_clip(x, 4.0)),
            ("soft_clip", |x| distortion::soft_clip(x, 4.0)),
            ("triode", |x| distortion::triode(x, 4.0)),
            ("hard_clip", |x| distortion::hard_clip(x, 2.0, 0.8)),
            // Closed form, same cost at any drive
            ("foldback", |x| distortion::foldback(x, 3.0, 0.5)),
        ];

        for (name, shaper) in shapers {
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for (out, &x) in buffer.iter_mut().zip(&input) {
                        *out = shaper(black_box(x));
                    }
                })
            });
        }
    }

    group.finish();
}

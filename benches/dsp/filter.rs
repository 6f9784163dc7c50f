//! Benchmarks for the state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use eurorack_dsp::dsp::filter::{coefficient, damping, FilterType, Svf};

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let sample_rate = 48_000.0;

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        for (name, filter_type) in [
            ("lowpass", FilterType::LowPass),
            ("highpass", FilterType::HighPass),
            ("bandpass", FilterType::BandPass),
            ("notch", FilterType::Notch),
        ] {
            let mut filter = Svf::new();
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer), filter_type, 1_000.0, 2.0, sample_rate);
                })
            });
        }

        // Audio-rate sweep: coefficient recomputed every sample
        let mut filter = Svf::new();
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("swept", size), &size, |b, _| {
            b.iter(|| {
                let k = damping(4.0);
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let f = coefficient(200.0 + i as f32 * 20.0, sample_rate);
                    *sample = filter.process(black_box(input[i]), f, k).lowpass;
                }
            })
        });
    }

    group.finish();
}

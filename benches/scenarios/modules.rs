//! One block through each module with realistic settings.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use eurorack_dsp::{
    dsp::SlopeMode,
    io::ChannelBuffers,
    modules::{
        filter_bank, DrumControls, DrumSynth, FilterBank, FilterBankControls, FilterMode,
        FormantControls, FormantOscillator, Quantizer, QuantizerControls, SaturationMode,
        Saturator, SaturatorControls, Sequencer, SequencerControls, SlopeRange, Slopes,
        SlopesControls,
    },
    Module, RenderCtx, BLOCK_SIZE,
};

fn ctx() -> RenderCtx {
    RenderCtx::new(48_000.0).expect("valid sample rate")
}

/// Saw-ish test input shared by the audio processors.
fn ramp<const N: usize>() -> ChannelBuffers<N> {
    let mut input = ChannelBuffers::<N>::new();
    for ch in 0..N {
        for (i, v) in input.channel_mut(ch).iter_mut().enumerate() {
            *v = (i as f32 / BLOCK_SIZE as f32) * 2.0 - 1.0;
        }
    }
    input
}

pub fn bench_modules(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/modules");

    // All six channels cycling at audio rate, worst case for the curve shaper
    let mut module = Slopes::new(ctx());
    let params = Slopes::params(&SlopesControls {
        mode: SlopeMode::Cycle,
        range: SlopeRange::Sound,
        curve: 0.8,
        ..SlopesControls::default()
    });
    let input = ChannelBuffers::<11>::new();
    let mut output = ChannelBuffers::<7>::new();
    group.bench_function(BenchmarkId::new("slopes", BLOCK_SIZE), |b| {
        b.iter(|| module.process(&input.inputs(), &mut output.outputs(), black_box(&params)))
    });

    let mut module = FormantOscillator::new(ctx());
    let params = FormantOscillator::params(&FormantControls {
        fm_index: 0.5,
        ..FormantControls::default()
    });
    let input = ramp::<5>();
    let mut output = ChannelBuffers::<2>::new();
    group.bench_function(BenchmarkId::new("formant", BLOCK_SIZE), |b| {
        b.iter(|| module.process(&input.inputs(), &mut output.outputs(), black_box(&params)))
    });

    // FM patched in: cutoffs recomputed every sample
    for (name, mode) in [("crossover", FilterMode::Crossover), ("formant", FilterMode::Formant)] {
        let mut module = FilterBank::new(ctx());
        let params = FilterBank::params(&FilterBankControls {
            mode,
            fm: 0.5,
            span: 0.4,
            ..FilterBankControls::default()
        });
        let mut input = ramp::<2>();
        input.channel_mut(filter_bank::IN_FM).fill(0.2);
        let mut output = ChannelBuffers::<4>::new();
        group.bench_function(BenchmarkId::new(format!("filter_bank/{name}"), BLOCK_SIZE), |b| {
            b.iter(|| module.process(&input.inputs(), &mut output.outputs(), black_box(&params)))
        });
    }

    let mut module = DrumSynth::new(ctx());
    let params = DrumSynth::params(&DrumControls::default());
    let mut input = ChannelBuffers::<2>::new();
    input.channel_mut(0)[0] = 1.0;
    input.channel_mut(1)[BLOCK_SIZE / 2] = 1.0;
    let mut output = ChannelBuffers::<2>::new();
    group.bench_function(BenchmarkId::new("drums", BLOCK_SIZE), |b| {
        b.iter(|| module.process(&input.inputs(), &mut output.outputs(), black_box(&params)))
    });

    let mut module = Sequencer::new(ctx());
    let params = Sequencer::params(&SequencerControls {
        bpm: 300.0,
        swing: 0.3,
        ..SequencerControls::default()
    });
    let input = ChannelBuffers::<2>::new();
    let mut output = ChannelBuffers::<3>::new();
    group.bench_function(BenchmarkId::new("sequencer", BLOCK_SIZE), |b| {
        b.iter(|| module.process(&input.inputs(), &mut output.outputs(), black_box(&params)))
    });

    let mut module = Quantizer::new(ctx());
    let params = Quantizer::params(&QuantizerControls::default());
    let input = ramp::<1>();
    let mut output = ChannelBuffers::<1>::new();
    group.bench_function(BenchmarkId::new("quantizer", BLOCK_SIZE), |b| {
        b.iter(|| module.process(&input.inputs(), &mut output.outputs(), black_box(&params)))
    });

    let mut module = Saturator::new(ctx());
    let params = Saturator::params(&SaturatorControls {
        mode: SaturationMode::Triode,
        drive: 6.0,
        low_gain_db: 6.0,
        ..SaturatorControls::default()
    });
    let input = ramp::<1>();
    let mut output = ChannelBuffers::<1>::new();
    group.bench_function(BenchmarkId::new("saturator", BLOCK_SIZE), |b| {
        b.iter(|| module.process(&input.inputs(), &mut output.outputs(), black_box(&params)))
    });

    group.finish();
}

//! The demo patch signal chain, wired by hand.
//!
//! Mirrors the `patchbay` render order: sequencer into drums and slopes,
//! slopes into quantizer and formant oscillator, everything through the
//! filter bank and saturator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use eurorack_dsp::{
    dsp::SlopeMode,
    io::ChannelBuffers,
    modules::{
        drums, filter_bank, formant, slopes, DrumControls, DrumSynth, FilterBank,
        FilterBankControls, FormantControls, FormantOscillator, Quantizer, QuantizerControls,
        Saturator, SaturatorControls, Sequencer, SequencerControls, SequencerMessage,
        SequencerVoice, Slopes,
        SlopesControls,
    },
    Module, RenderCtx, BLOCK_SIZE,
};

pub fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/chain");
    let ctx = RenderCtx::new(48_000.0).expect("valid sample rate");

    let mut sequencer = Sequencer::new(ctx);
    let mut drum_synth = DrumSynth::new(ctx);
    let mut slope_gen = Slopes::new(ctx);
    let mut quantizer = Quantizer::new(ctx);
    let mut oscillator = FormantOscillator::new(ctx);
    let mut bank = FilterBank::new(ctx);
    let mut saturator = Saturator::new(ctx);

    for voice in SequencerVoice::ALL {
        for step in (0..16).step_by(2) {
            sequencer.handle(SequencerMessage::SetStep { voice, step, on: true });
        }
    }

    let sequencer_params = Sequencer::params(&SequencerControls {
        bpm: 300.0,
        ..SequencerControls::default()
    });
    let drum_params = DrumSynth::params(&DrumControls::default());
    let slope_params = Slopes::params(&SlopesControls {
        mode: SlopeMode::Cycle,
        ..SlopesControls::default()
    });
    let quantizer_params = Quantizer::params(&QuantizerControls::default());
    let formant_params = FormantOscillator::params(&FormantControls::default());
    let bank_params = FilterBank::params(&FilterBankControls {
        fm: 0.3,
        ..FilterBankControls::default()
    });
    let saturator_params = Saturator::params(&SaturatorControls::default());

    let mut seq_out = ChannelBuffers::<3>::new();
    let mut drum_out = ChannelBuffers::<2>::new();
    let mut slope_out = ChannelBuffers::<7>::new();
    let mut pitch = ChannelBuffers::<1>::new();
    let mut voice_out = ChannelBuffers::<2>::new();
    let mut bank_in = ChannelBuffers::<2>::new();
    let mut bank_out = ChannelBuffers::<4>::new();
    let mut out = ChannelBuffers::<1>::new();

    group.bench_function(BenchmarkId::new("patch", BLOCK_SIZE), |b| {
        b.iter(|| {
            let silent: &[f32] = &[];

            sequencer.process(&[], &mut seq_out.outputs(), &sequencer_params);
            let kick = seq_out.channel(SequencerVoice::Kick.index());
            let snare = seq_out.channel(SequencerVoice::Snare.index());
            let hat = seq_out.channel(SequencerVoice::Hat.index());

            let mut drum_inputs = [silent; 2];
            drum_inputs[drums::IN_KICK] = kick;
            drum_inputs[drums::IN_SNARE] = snare;
            drum_synth.process(&drum_inputs, &mut drum_out.outputs(), &drum_params);

            let mut slope_inputs = [silent; 11];
            slope_inputs[slopes::IN_TRIGGER..slopes::IN_TRIGGER + slopes::CHANNELS].fill(hat);
            slope_gen.process(&slope_inputs, &mut slope_out.outputs(), &slope_params);

            quantizer.process(&[slope_out.channel(0)], &mut pitch.outputs(), &quantizer_params);

            let mut formant_inputs = [silent; 5];
            formant_inputs[formant::IN_PITCH_CV] = pitch.channel(0);
            formant_inputs[formant::IN_FM] = slope_out.channel(1);
            oscillator.process(&formant_inputs, &mut voice_out.outputs(), &formant_params);

            let left = drum_out.channel(drums::OUT_LEFT);
            let voice = voice_out.channel(formant::OUT_FORMANT);
            for (i, v) in bank_in.channel_mut(filter_bank::IN_AUDIO).iter_mut().enumerate() {
                *v = left[i] + voice[i] * 0.3;
            }
            bank_in
                .channel_mut(filter_bank::IN_FM)
                .copy_from_slice(slope_out.channel(slopes::OUT_MIX));
            bank.process(&bank_in.inputs(), &mut bank_out.outputs(), &bank_params);

            saturator.process(
                &[bank_out.channel(filter_bank::OUT_ALL)],
                &mut out.outputs(),
                &saturator_params,
            );
            black_box(out.channel(0));
        })
    });

    group.finish();
}

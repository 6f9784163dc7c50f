//! Patch - fixed module graph rendered in topological order
//!
//! ```text
//! sequencer ─┬─ kick/snare ──→ drums ─────────────┐
//!            └─ hat ──→ slopes ─┬─ 1 → quantizer → formant ─┤
//!                               ├─ 2 → formant FM          ├→ filter bank → saturator → out
//!                               ├─ 3 → formant CV          │
//!                               └─ MIX → filter bank FM ───┘
//! ```
//!
//! Every buffer is allocated up front; `fill` only copies and calls
//! `process`, so it is safe to run inside the audio callback.

use color_eyre::eyre::Result as EyreResult;

use eurorack_dsp::{
    graph::{shared::CONTROL_QUEUE_SIZE, ModuleHandle, SharedModule},
    io::ChannelBuffers,
    modules::{
        drums, filter_bank, formant, sequencer::SequencerVoice, slopes, DrumSynth, FilterBank,
        FormantOscillator, Quantizer, QuantizerMessage, Saturator, Sequencer, Slopes,
    },
    presets::{PatchPreset, Preset},
    RenderCtx, BLOCK_SIZE,
};

/// Room for a full pattern rewrite: clear plus every step of every voice.
const SEQUENCER_QUEUE_SIZE: usize = 256;
/// Formant share of the filter bank input
const FORMANT_LEVEL: f32 = 0.3;
const MASTER_GAIN: f32 = 0.5;

/// Controller-side handles for every module in the patch.
pub struct Handles {
    pub sequencer: ModuleHandle<Sequencer>,
    pub drums: ModuleHandle<DrumSynth>,
    pub slopes: ModuleHandle<Slopes>,
    pub quantizer: ModuleHandle<Quantizer>,
    pub formant: ModuleHandle<FormantOscillator>,
    pub filter_bank: ModuleHandle<FilterBank>,
    pub saturator: ModuleHandle<Saturator>,
}

impl Handles {
    /// Queue a module preset. Returns false if that module's queue is full.
    pub fn apply(&mut self, preset: Preset) -> bool {
        match preset {
            Preset::Slopes(c) => self.slopes.set_controls(c),
            Preset::Formant(c) => self.formant.set_controls(c),
            Preset::FilterBank(c) => self.filter_bank.set_controls(c),
            Preset::Drums(c) => self.drums.set_controls(c),
            Preset::Sequencer(c) => self.sequencer.set_controls(c),
            Preset::Quantizer(c) => self.quantizer.set_controls(c),
            Preset::Saturator(c) => self.saturator.set_controls(c),
        }
    }

    /// Queue a whole patch: controls, patterns and scale.
    pub fn load(&mut self, patch: &PatchPreset) -> bool {
        let mut queued = true;
        for preset in patch.presets() {
            queued &= self.apply(preset);
        }
        for message in patch.patterns.messages() {
            queued &= self.sequencer.send(message);
        }
        queued &= self.quantizer.send(QuantizerMessage::SetNoteMask(patch.note_mask()));
        queued
    }
}

#[derive(Default)]
struct Buffers {
    sequencer: ChannelBuffers<3>,
    drums: ChannelBuffers<2>,
    slopes: ChannelBuffers<7>,
    quantizer: ChannelBuffers<1>,
    formant: ChannelBuffers<2>,
    bank_in: ChannelBuffers<2>,
    bank: ChannelBuffers<4>,
    out: ChannelBuffers<1>,
}

/// Audio-side owner of the module graph.
pub struct Patch {
    sequencer: SharedModule<Sequencer>,
    drums: SharedModule<DrumSynth>,
    slopes: SharedModule<Slopes>,
    quantizer: SharedModule<Quantizer>,
    formant: SharedModule<FormantOscillator>,
    filter_bank: SharedModule<FilterBank>,
    saturator: SharedModule<Saturator>,
    buffers: Box<Buffers>,
    /// Next unread frame of `buffers.out`
    cursor: usize,
}

impl Patch {
    pub fn new(ctx: RenderCtx, preset: &PatchPreset) -> EyreResult<(Self, Handles)> {
        let (sequencer, sequencer_handle) =
            SharedModule::new(Sequencer::new(ctx), preset.sequencer, SEQUENCER_QUEUE_SIZE)?;
        let (drums, drums_handle) = SharedModule::new(DrumSynth::new(ctx), preset.drums, CONTROL_QUEUE_SIZE)?;
        let (slopes, slopes_handle) = SharedModule::new(Slopes::new(ctx), preset.slopes, CONTROL_QUEUE_SIZE)?;
        let (quantizer, quantizer_handle) =
            SharedModule::new(Quantizer::new(ctx), preset.quantizer, CONTROL_QUEUE_SIZE)?;
        let (formant, formant_handle) =
            SharedModule::new(FormantOscillator::new(ctx), preset.formant, CONTROL_QUEUE_SIZE)?;
        let (filter_bank, filter_bank_handle) =
            SharedModule::new(FilterBank::new(ctx), preset.filter_bank, CONTROL_QUEUE_SIZE)?;
        let (saturator, saturator_handle) =
            SharedModule::new(Saturator::new(ctx), preset.saturator, CONTROL_QUEUE_SIZE)?;

        let patch = Self {
            sequencer,
            drums,
            slopes,
            quantizer,
            formant,
            filter_bank,
            saturator,
            buffers: Box::default(),
            cursor: BLOCK_SIZE,
        };
        let handles = Handles {
            sequencer: sequencer_handle,
            drums: drums_handle,
            slopes: slopes_handle,
            quantizer: quantizer_handle,
            formant: formant_handle,
            filter_bank: filter_bank_handle,
            saturator: saturator_handle,
        };
        Ok((patch, handles))
    }

    /// Fill an interleaved output buffer, duplicating the mono signal to every channel.
    pub fn fill(&mut self, data: &mut [f32], channels: usize) {
        for frame in data.chunks_mut(channels.max(1)) {
            if self.cursor >= BLOCK_SIZE {
                self.render_block();
                self.cursor = 0;
            }
            frame.fill(self.buffers.out.channel(0)[self.cursor] * MASTER_GAIN);
            self.cursor += 1;
        }
    }

    /// Run every module once, producers before consumers.
    fn render_block(&mut self) {
        let b = &mut *self.buffers;
        let silent: &[f32] = &[];

        self.sequencer.process(&[], &mut b.sequencer.outputs());

        let kick = b.sequencer.channel(SequencerVoice::Kick.index());
        let snare = b.sequencer.channel(SequencerVoice::Snare.index());
        let hat = b.sequencer.channel(SequencerVoice::Hat.index());

        let mut drum_inputs = [silent; 2];
        drum_inputs[drums::IN_KICK] = kick;
        drum_inputs[drums::IN_SNARE] = snare;
        self.drums.process(&drum_inputs, &mut b.drums.outputs());

        let mut slope_inputs = [silent; 11];
        slope_inputs[slopes::IN_TRIGGER..slopes::IN_TRIGGER + slopes::CHANNELS].fill(hat);
        self.slopes.process(&slope_inputs, &mut b.slopes.outputs());

        self.quantizer.process(&[b.slopes.channel(0)], &mut b.quantizer.outputs());

        let mut formant_inputs = [silent; 5];
        formant_inputs[formant::IN_PITCH_CV] = b.quantizer.channel(0);
        formant_inputs[formant::IN_FM] = b.slopes.channel(1);
        formant_inputs[formant::IN_FORMANT_CV] = b.slopes.channel(2);
        self.formant.process(&formant_inputs, &mut b.formant.outputs());

        let drums_left = b.drums.channel(drums::OUT_LEFT);
        let voice = b.formant.channel(formant::OUT_FORMANT);
        for (i, sample) in b.bank_in.channel_mut(filter_bank::IN_AUDIO).iter_mut().enumerate() {
            *sample = drums_left[i] + voice[i] * FORMANT_LEVEL;
        }
        b.bank_in
            .channel_mut(filter_bank::IN_FM)
            .copy_from_slice(b.slopes.channel(slopes::OUT_MIX));
        self.filter_bank.process(&b.bank_in.inputs(), &mut b.bank.outputs());

        self.saturator.process(&[b.bank.channel(filter_bank::OUT_ALL)], &mut b.out.outputs());
    }
}

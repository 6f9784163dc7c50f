//! Formant oscillator.
//!
//! A triangle core with linear FM clocks an impulse
//! generator: every rising edge of the derived square fires a short
//! attack/release slope. The impulse runs through a VCA and a clipped-sine
//! waveshaper to become the formant output.
//!
//! In constant-wave mode the impulse width is a fraction of the oscillator
//! period, so the timbre stays put as the pitch moves. In constant-formant
//! mode the width is fixed in seconds, so the spectral peak stays put
//! instead, like a vowel. Each edge restarts the impulse from zero, so an
//! impulse longer than the period is cut short and the formant output
//! always runs at the oscillator rate.
//!
//! # Channels
//!
//! Inputs: pitch CV (1 V/oct), FM, barrel CV, formant CV, air CV.
//! Outputs: square (±1), formant (0–1).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{
        distortion::clipped_sine,
        oscillator::{square_from, triangle, Phasor},
        slope::{increments, Slope, SlopeMode},
        volts::to_volts,
    },
    graph::{Module, Param, RenderCtx},
    io,
};

pub const IN_PITCH_CV: usize = 0;
pub const IN_FM: usize = 1;
pub const IN_BARREL_CV: usize = 2;
pub const IN_FORMANT_CV: usize = 3;
pub const IN_AIR_CV: usize = 4;
pub const OUT_SQUARE: usize = 0;
pub const OUT_FORMANT: usize = 1;

/// Pitch knob at 0.
pub const BASE_HZ: f32 = 27.5;
/// Octaves covered by the pitch knob.
pub const PITCH_OCTAVES: f32 = 7.0;
/// Limits on knob, fine tune and CV combined, relative to `BASE_HZ`.
const MIN_OCTAVES: f32 = -12.0;
const MAX_OCTAVES: f32 = 14.0;
pub const MIN_HZ: f32 = 0.1;
pub const MAX_FM_INDEX: f32 = 20.0;
/// Impulse rate with the formant knob at 0, constant-formant mode.
const FORMANT_BASE_HZ: f32 = 20.0;
const FORMANT_OCTAVES: f32 = 8.0;
/// Octaves the formant knob narrows the impulse in constant-wave mode.
const WAVE_OCTAVES: f32 = 4.0;
const BARREL_MIN: f32 = 0.01;
const CV_SPAN: f32 = 0.5;
const AIR_DRIVE: f32 = 3.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormantMode {
    /// Impulse width tracks the oscillator period.
    #[default]
    ConstantWave,
    /// Impulse width fixed in time.
    ConstantFormant,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormantControls {
    pub pitch: f32,
    /// Fine tune, −1..1 is ±1 semitone.
    pub fine: f32,
    /// FM index, 0..1 maps onto 0..20.
    pub fm_index: f32,
    pub formant: f32,
    pub barrel: f32,
    pub air: f32,
    /// Attenuverter on the air CV, −1..1.
    pub air_cv_amount: f32,
    pub mode: FormantMode,
}

impl Default for FormantControls {
    fn default() -> Self {
        Self {
            pitch: 0.5,
            fine: 0.0,
            fm_index: 0.0,
            formant: 0.5,
            barrel: 0.5,
            air: 0.5,
            air_cv_amount: 1.0,
            mode: FormantMode::ConstantWave,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FormantParams<'a> {
    pub pitch: Param<'a>,
    pub fine: Param<'a>,
    pub fm_index: Param<'a>,
    pub formant: Param<'a>,
    pub barrel: Param<'a>,
    pub air: Param<'a>,
    pub air_cv_amount: Param<'a>,
    pub mode: FormantMode,
}

/// Core frequency before FM: knob, fine tune and 1 V/oct CV.
#[inline]
pub fn pitch_to_hz(pitch: f32, fine: f32, cv_volts: f32) -> f32 {
    let octaves = pitch.clamp(0.0, 1.0) * PITCH_OCTAVES + fine.clamp(-1.0, 1.0) / 12.0 + cv_volts;
    BASE_HZ * octaves.clamp(MIN_OCTAVES, MAX_OCTAVES).exp2()
}

/// Impulse length in seconds.
#[inline]
pub fn impulse_duration(formant: f32, frequency: f32, mode: FormantMode) -> f32 {
    let formant = formant.clamp(0.0, 1.0);
    match mode {
        FormantMode::ConstantFormant => 1.0 / (FORMANT_BASE_HZ * (formant * FORMANT_OCTAVES).exp2()),
        FormantMode::ConstantWave => 1.0 / (frequency * (formant * WAVE_OCTAVES).exp2()),
    }
}

pub struct FormantOscillator {
    ctx: RenderCtx,
    phasor: Phasor,
    impulse: Slope,
    last_square: f32,
}

impl FormantOscillator {
    pub fn new(ctx: RenderCtx) -> Self {
        Self {
            ctx,
            phasor: Phasor::new(),
            impulse: Slope::new(),
            last_square: -1.0,
        }
    }

    /// Current impulse level, before the VCA.
    pub fn impulse_level(&self) -> f32 {
        self.impulse.level()
    }
}

impl Module for FormantOscillator {
    type Controls = FormantControls;
    type Message = ();
    type Params<'a> = FormantParams<'a>;

    const INPUTS: usize = 5;
    const OUTPUTS: usize = 2;

    fn params(c: &FormantControls) -> FormantParams<'static> {
        FormantParams {
            pitch: c.pitch.into(),
            fine: c.fine.into(),
            fm_index: c.fm_index.into(),
            formant: c.formant.into(),
            barrel: c.barrel.into(),
            air: c.air.into(),
            air_cv_amount: c.air_cv_amount.into(),
            mode: c.mode,
        }
    }

    fn process(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        params: &FormantParams<'_>,
    ) -> bool {
        let sample_rate = self.ctx.sample_rate;
        let limit = self.ctx.nyquist_limit();

        for n in 0..io::frames(outputs) {
            let base = pitch_to_hz(
                params.pitch.at(n),
                params.fine.at(n),
                to_volts(io::input(inputs, IN_PITCH_CV, n)),
            );
            let index = params.fm_index.at(n).clamp(0.0, 1.0) * MAX_FM_INDEX;
            let fm = io::input(inputs, IN_FM, n);
            let frequency = base + fm * index * base;
            let frequency = if frequency.is_finite() {
                frequency.clamp(MIN_HZ, limit)
            } else {
                MIN_HZ
            };

            let (phase, _) = self.phasor.advance(frequency, sample_rate);
            let square = square_from(triangle(phase));
            if square > 0.0 && self.last_square <= 0.0 {
                self.impulse.restart();
            }
            self.last_square = square;

            let formant = (params.formant.at(n) + io::input(inputs, IN_FORMANT_CV, n) * CV_SPAN).clamp(0.0, 1.0);
            let barrel = (params.barrel.at(n) + io::input(inputs, IN_BARREL_CV, n) * CV_SPAN)
                .clamp(BARREL_MIN, 1.0 - BARREL_MIN);
            let duration = impulse_duration(formant, frequency, params.mode);
            let (rise, fall) = increments(1.0 / duration, barrel, sample_rate);
            let level = self.impulse.next_sample(SlopeMode::Transient, 0.0, rise, fall);

            let air_cv = io::input(inputs, IN_AIR_CV, n) * params.air_cv_amount.at(n).clamp(-1.0, 1.0);
            let air = (params.air.at(n) + air_cv).clamp(0.0, 1.0);
            let shaped = clipped_sine(level * air, 1.0 + AIR_DRIVE * air);

            io::write(outputs, OUT_SQUARE, n, square);
            io::write(outputs, OUT_FORMANT, n, shaped);
        }

        true
    }

    fn reset(&mut self) {
        self.phasor.reset();
        self.impulse.reset();
        self.last_square = -1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ChannelBuffers;

    const SAMPLE_RATE: f32 = 48_000.0;

    /// Render one second and return (square rising edges, formant samples above zero).
    fn render_second(controls: &FormantControls, inputs: &ChannelBuffers<5>) -> (usize, usize) {
        let mut osc = FormantOscillator::new(RenderCtx::new(SAMPLE_RATE).unwrap());
        let mut outputs = ChannelBuffers::<2>::new();
        let params = FormantOscillator::params(controls);
        let mut edges = 0;
        let mut active = 0;
        let mut last = -1.0;

        for _ in 0..(SAMPLE_RATE as usize / crate::BLOCK_SIZE) {
            osc.process(&inputs.inputs(), &mut outputs.outputs(), &params);
            for (&sq, &f) in outputs.channel(OUT_SQUARE).iter().zip(outputs.channel(OUT_FORMANT)) {
                assert!(sq == 1.0 || sq == -1.0);
                assert!((0.0..=1.0).contains(&f));
                if sq > 0.0 && last < 0.0 {
                    edges += 1;
                }
                if f > 0.0 {
                    active += 1;
                }
                last = sq;
            }
        }
        (edges, active)
    }

    fn pitch_for(hz: f32) -> f32 {
        (hz / BASE_HZ).log2() / PITCH_OCTAVES
    }

    #[test]
    fn pitch_mapping() {
        assert_eq!(pitch_to_hz(0.0, 0.0, 0.0), BASE_HZ);
        assert!((pitch_to_hz(1.0 / 7.0, 0.0, 0.0) - 55.0).abs() < 1e-3);
        assert!((pitch_to_hz(0.0, 0.0, 1.0) - 55.0).abs() < 1e-3);
        assert!((pitch_to_hz(0.0, 1.0, 0.0) - BASE_HZ * (1.0f32 / 12.0).exp2()).abs() < 1e-4);
    }

    #[test]
    fn square_runs_at_core_frequency() {
        let controls = FormantControls {
            pitch: pitch_for(110.0),
            ..FormantControls::default()
        };
        let (edges, _) = render_second(&controls, &ChannelBuffers::new());
        assert!((109..=111).contains(&edges), "edges {edges}");
    }

    #[test]
    fn zero_air_silences_formant() {
        let controls = FormantControls {
            air: 0.0,
            ..FormantControls::default()
        };
        let (_, active) = render_second(&controls, &ChannelBuffers::new());
        assert_eq!(active, 0);
    }

    #[test]
    fn constant_formant_keeps_impulse_width() {
        let width = |hz: f32| {
            let controls = FormantControls {
                pitch: pitch_for(hz),
                air: 1.0,
                mode: FormantMode::ConstantFormant,
                ..FormantControls::default()
            };
            let (edges, active) = render_second(&controls, &ChannelBuffers::new());
            active as f32 / edges as f32
        };
        let (low, high) = (width(55.0), width(110.0));
        assert!((low / high - 1.0).abs() < 0.05, "{low} vs {high}");
    }

    #[test]
    fn constant_wave_scales_impulse_with_period() {
        let width = |hz: f32| {
            let controls = FormantControls {
                pitch: pitch_for(hz),
                air: 1.0,
                mode: FormantMode::ConstantWave,
                ..FormantControls::default()
            };
            let (edges, active) = render_second(&controls, &ChannelBuffers::new());
            active as f32 / edges as f32
        };
        let (low, high) = (width(55.0), width(110.0));
        assert!((low / high - 2.0).abs() < 0.1, "{low} vs {high}");
    }

    #[test]
    fn fm_needs_index() {
        let mut inputs = ChannelBuffers::<5>::new();
        inputs.channel_mut(IN_FM).fill(0.5);
        let controls = FormantControls {
            pitch: pitch_for(100.0),
            ..FormantControls::default()
        };
        let (plain, _) = render_second(&controls, &inputs);
        assert!((99..=101).contains(&plain));

        // index 0.1 -> 2, so f + 0.5·2·f doubles the frequency
        let modulated = FormantControls {
            fm_index: 0.1,
            ..controls
        };
        let (edges, _) = render_second(&modulated, &inputs);
        assert!((199..=201).contains(&edges), "edges {edges}");
    }

    #[test]
    fn negative_fm_floors_frequency() {
        let mut inputs = ChannelBuffers::<5>::new();
        inputs.channel_mut(IN_FM).fill(-1.0);
        let controls = FormantControls {
            fm_index: 1.0,
            ..FormantControls::default()
        };
        // 0.1 Hz: at most one edge in a second
        let (edges, _) = render_second(&controls, &inputs);
        assert!(edges <= 1);
    }

    #[test]
    fn recovers_after_out_of_range_input() {
        let mut osc = FormantOscillator::new(RenderCtx::new(SAMPLE_RATE).unwrap());
        let mut inputs = ChannelBuffers::<5>::new();
        let mut outputs = ChannelBuffers::<2>::new();
        let params = FormantOscillator::params(&FormantControls::default());

        inputs.channel_mut(IN_PITCH_CV).fill(30.0);
        inputs.channel_mut(IN_FM).fill(f32::NAN);
        osc.process(&inputs.inputs(), &mut outputs.outputs(), &params);
        let broken = FormantOscillator::params(&FormantControls {
            pitch: f32::NAN,
            ..FormantControls::default()
        });
        osc.process(&ChannelBuffers::<5>::new().inputs(), &mut outputs.outputs(), &broken);

        let inputs = ChannelBuffers::<5>::new();
        let mut edges = 0;
        let mut last = -1.0;
        for _ in 0..400 {
            osc.process(&inputs.inputs(), &mut outputs.outputs(), &params);
            for (&sq, &f) in outputs.channel(OUT_SQUARE).iter().zip(outputs.channel(OUT_FORMANT)) {
                assert!(f.is_finite());
                if sq > 0.0 && last < 0.0 {
                    edges += 1;
                }
                last = sq;
            }
        }
        // default pitch is ~311 Hz; 400 blocks is just over a second
        assert!(edges > 300, "edges {edges}");
    }

    #[test]
    fn every_edge_restarts_a_long_impulse() {
        // 50 ms impulse against a 110 Hz core
        let controls = FormantControls {
            pitch: pitch_for(110.0),
            formant: 0.0,
            air: 1.0,
            mode: FormantMode::ConstantFormant,
            ..FormantControls::default()
        };
        let mut osc = FormantOscillator::new(RenderCtx::new(SAMPLE_RATE).unwrap());
        let inputs = ChannelBuffers::<5>::new();
        let mut outputs = ChannelBuffers::<2>::new();
        let params = FormantOscillator::params(&controls);
        let mut edges = 0;
        let mut last = -1.0;
        for _ in 0..100 {
            osc.process(&inputs.inputs(), &mut outputs.outputs(), &params);
            for (&sq, &f) in outputs.channel(OUT_SQUARE).iter().zip(outputs.channel(OUT_FORMANT)) {
                if sq > 0.0 && last < 0.0 {
                    edges += 1;
                    assert!(f < 0.05, "impulse not restarted at edge {edges}: {f}");
                }
                last = sq;
            }
        }
        assert!(edges > 20);
    }

    #[test]
    fn impulse_duration_modes() {
        assert!((impulse_duration(0.0, 100.0, FormantMode::ConstantFormant) - 0.05).abs() < 1e-6);
        assert!((impulse_duration(0.0, 100.0, FormantMode::ConstantWave) - 0.01).abs() < 1e-6);
        assert!((impulse_duration(1.0, 100.0, FormantMode::ConstantWave) - 0.01 / 16.0).abs() < 1e-6);
    }
}

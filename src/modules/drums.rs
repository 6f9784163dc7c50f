//! Two-voice drum synthesizer.
//!
//! # Kick
//!
//! A sine whose pitch rides its own envelope down to the base frequency:
//!
//! ```text
//! freq = pitch + pitch·4·env
//! out  = sin(phase)·env²
//! ```
//!
//! # Snare
//!
//! A pitch-swept sine (`pitch + pitch·env`) under white noise, 20/80, shaped
//! by the envelope and then high-passed at 1.4 kHz with a one-pole filter.
//!
//! Both envelopes jump to 1.0 on every sample where their trigger input is
//! high and decay as `env *= exp(−1 / (fs·decay))`, so `env` falls to 1/e
//! after `decay` seconds. The voices are weighted, summed and saturated with
//! `tanh`; the same signal goes to both outputs.

use std::f32::consts::{PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{distortion::tanh_clip, oscillator::NoiseSource, trigger},
    graph::{Module, Param, RenderCtx},
    io, MIN_TIME,
};

pub const IN_KICK: usize = 0;
pub const IN_SNARE: usize = 1;
pub const OUT_LEFT: usize = 0;
pub const OUT_RIGHT: usize = 1;

const KICK_SWEEP: f32 = 4.0;
const SNARE_NOISE: f32 = 0.8;
const SNARE_TONE: f32 = 0.2;
pub const SNARE_HIGHPASS_HZ: f32 = 1_400.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrumControls {
    pub kick_pitch: f32,
    /// Seconds to 1/e.
    pub kick_decay: f32,
    pub snare_pitch: f32,
    pub snare_decay: f32,
    pub kick_level: f32,
    pub snare_level: f32,
    pub drive: f32,
}

impl Default for DrumControls {
    fn default() -> Self {
        Self {
            kick_pitch: 50.0,
            kick_decay: 0.5,
            snare_pitch: 180.0,
            snare_decay: 0.2,
            kick_level: 0.9,
            snare_level: 0.6,
            drive: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DrumParams<'a> {
    pub kick_pitch: Param<'a>,
    pub kick_decay: Param<'a>,
    pub snare_pitch: Param<'a>,
    pub snare_decay: Param<'a>,
    pub kick_level: Param<'a>,
    pub snare_level: Param<'a>,
    pub drive: Param<'a>,
}

/// Per-sample multiplier for an exponential decay reaching 1/e after `seconds`.
#[inline]
pub fn decay_coefficient(seconds: f32, sample_rate: f32) -> f32 {
    (-1.0 / (sample_rate * seconds.max(MIN_TIME))).exp()
}

/// Exponential envelope retriggered to 1.0 while its trigger is high.
#[derive(Debug, Clone, Copy, Default)]
struct DecayEnvelope {
    level: f32,
}

impl DecayEnvelope {
    /// Level for this sample; the decay is applied afterwards.
    #[inline]
    fn next(&mut self, trigger: f32, coefficient: f32) -> f32 {
        if trigger::is_high(trigger) {
            self.level = 1.0;
        }
        let level = self.level;
        self.level *= coefficient;
        level
    }
}

/// One-pole highpass, `y[n] = a·(y[n−1] + x[n] − x[n−1])`.
#[derive(Debug, Clone, Copy, Default)]
struct OnePoleHighpass {
    x1: f32,
    y1: f32,
}

impl OnePoleHighpass {
    fn coefficient(cutoff_hz: f32, sample_period: f32) -> f32 {
        let rc = 1.0 / (2.0 * PI * cutoff_hz);
        rc / (rc + sample_period)
    }

    #[inline]
    fn process(&mut self, x: f32, a: f32) -> f32 {
        let y = a * (self.y1 + x - self.x1);
        self.x1 = x;
        self.y1 = y;
        y
    }
}

/// Advance a radian phase accumulator, wrapping at 2π.
#[inline]
fn advance(phase: &mut f32, frequency: f32, sample_rate: f32) -> f32 {
    let current = *phase;
    *phase += TAU * frequency / sample_rate;
    if *phase >= TAU {
        *phase = phase.rem_euclid(TAU);
    }
    current
}

pub struct DrumSynth {
    ctx: RenderCtx,
    kick_env: DecayEnvelope,
    kick_phase: f32,
    snare_env: DecayEnvelope,
    snare_phase: f32,
    noise: NoiseSource,
    highpass: OnePoleHighpass,
    highpass_a: f32,
}

impl DrumSynth {
    pub fn new(ctx: RenderCtx) -> Self {
        Self {
            ctx,
            kick_env: DecayEnvelope::default(),
            kick_phase: 0.0,
            snare_env: DecayEnvelope::default(),
            snare_phase: 0.0,
            noise: NoiseSource::default(),
            highpass: OnePoleHighpass::default(),
            highpass_a: OnePoleHighpass::coefficient(SNARE_HIGHPASS_HZ, ctx.sample_period()),
        }
    }

    /// Kick envelope level that the next sample will use.
    pub fn kick_envelope(&self) -> f32 {
        self.kick_env.level
    }

    pub fn snare_envelope(&self) -> f32 {
        self.snare_env.level
    }
}

impl Module for DrumSynth {
    type Controls = DrumControls;
    type Message = ();
    type Params<'a> = DrumParams<'a>;

    const INPUTS: usize = 2;
    const OUTPUTS: usize = 2;

    fn params(c: &DrumControls) -> DrumParams<'static> {
        DrumParams {
            kick_pitch: c.kick_pitch.into(),
            kick_decay: c.kick_decay.into(),
            snare_pitch: c.snare_pitch.into(),
            snare_decay: c.snare_decay.into(),
            kick_level: c.kick_level.into(),
            snare_level: c.snare_level.into(),
            drive: c.drive.into(),
        }
    }

    fn process(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        params: &DrumParams<'_>,
    ) -> bool {
        let sample_rate = self.ctx.sample_rate;
        let limit = self.ctx.nyquist_limit();

        for n in 0..io::frames(outputs) {
            let kick_decay = decay_coefficient(params.kick_decay.at(n), sample_rate);
            let env = self.kick_env.next(io::input(inputs, IN_KICK, n), kick_decay);
            let pitch = params.kick_pitch.at(n).clamp(0.0, limit);
            let freq = (pitch + pitch * KICK_SWEEP * env).min(limit);
            let kick = advance(&mut self.kick_phase, freq, sample_rate).sin() * env * env;

            let snare_decay = decay_coefficient(params.snare_decay.at(n), sample_rate);
            let env = self.snare_env.next(io::input(inputs, IN_SNARE, n), snare_decay);
            let pitch = params.snare_pitch.at(n).clamp(0.0, limit);
            let tone = advance(&mut self.snare_phase, (pitch + pitch * env).min(limit), sample_rate).sin();
            let body = (SNARE_NOISE * self.noise.next_sample() + SNARE_TONE * tone) * env;
            let snare = self.highpass.process(body, self.highpass_a);

            let mix = kick * params.kick_level.at(n).max(0.0) + snare * params.snare_level.at(n).max(0.0);
            let out = tanh_clip(mix, params.drive.at(n).max(0.0));

            io::write(outputs, OUT_LEFT, n, out);
            io::write(outputs, OUT_RIGHT, n, out);
        }

        true
    }

    fn reset(&mut self) {
        self.kick_env = DecayEnvelope::default();
        self.snare_env = DecayEnvelope::default();
        self.kick_phase = 0.0;
        self.snare_phase = 0.0;
        self.highpass = OnePoleHighpass::default();
        self.noise = NoiseSource::default();
    }
}

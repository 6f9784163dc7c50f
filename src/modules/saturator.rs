//! Three-band EQ into a selectable saturation stage.
//!
//! The EQ splits the input with two SVFs: LOW is a lowpass at `low_hz`, HIGH
//! a highpass at `high_hz`, and MID whatever is left over, so flat gains
//! rebuild the input. Each band gets its own gain in dB before the sum is
//! driven into the waveshaper. `mix` blends the shaped signal against the
//! untouched input.

use std::f32::consts::SQRT_2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{
        distortion::{foldback, hard_clip, soft_clip, tanh_clip, triode},
        filter::{coefficient, damping, Svf},
    },
    graph::{Module, Param, RenderCtx},
    io,
};

pub const MIN_DRIVE: f32 = 1.0;
pub const MAX_DRIVE: f32 = 20.0;
pub const MAX_GAIN_DB: f32 = 18.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaturationMode {
    /// tanh
    #[default]
    Soft,
    /// x / (1 + |x|)
    Tape,
    /// Asymmetric, adds even harmonics
    Triode,
    Hard,
    Fold,
}

impl SaturationMode {
    /// Resolve a mode name; unknown names fall back to `Soft`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "soft" | "tanh" => Self::Soft,
            "tape" => Self::Tape,
            "triode" | "tube" => Self::Triode,
            "hard" | "clip" => Self::Hard,
            "fold" | "foldback" => Self::Fold,
            other => {
                tracing::warn!(mode = other, "unknown saturation mode, using soft");
                Self::Soft
            }
        }
    }

    #[inline]
    pub fn apply(self, sample: f32, drive: f32) -> f32 {
        match self {
            Self::Soft => tanh_clip(sample, drive),
            Self::Tape => soft_clip(sample, drive),
            Self::Triode => triode(sample, drive),
            Self::Hard => hard_clip(sample, drive, 1.0),
            Self::Fold => foldback(sample, drive, 1.0),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaturatorControls {
    pub drive: f32,
    /// Dry/wet, 0–1.
    pub mix: f32,
    /// Linear output gain.
    pub output: f32,
    pub mode: SaturationMode,
    pub low_gain_db: f32,
    pub mid_gain_db: f32,
    pub high_gain_db: f32,
    pub low_hz: f32,
    pub high_hz: f32,
}

impl Default for SaturatorControls {
    fn default() -> Self {
        Self {
            drive: 1.0,
            mix: 1.0,
            output: 1.0,
            mode: SaturationMode::Soft,
            low_gain_db: 0.0,
            mid_gain_db: 0.0,
            high_gain_db: 0.0,
            low_hz: 200.0,
            high_hz: 3_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SaturatorParams<'a> {
    pub drive: Param<'a>,
    pub mix: Param<'a>,
    pub output: Param<'a>,
    pub mode: SaturationMode,
    pub low_gain_db: Param<'a>,
    pub mid_gain_db: Param<'a>,
    pub high_gain_db: Param<'a>,
    pub low_hz: f32,
    pub high_hz: f32,
}

#[inline]
fn db_to_gain(db: f32) -> f32 {
    10f32.powf(db.clamp(-MAX_GAIN_DB, MAX_GAIN_DB) / 20.0)
}

pub struct Saturator {
    ctx: RenderCtx,
    low: Svf,
    high: Svf,
}

impl Saturator {
    pub fn new(ctx: RenderCtx) -> Self {
        Self {
            ctx,
            low: Svf::new(),
            high: Svf::new(),
        }
    }
}

impl Module for Saturator {
    type Controls = SaturatorControls;
    type Message = ();
    type Params<'a> = SaturatorParams<'a>;

    const INPUTS: usize = 1;
    const OUTPUTS: usize = 1;

    fn params(c: &SaturatorControls) -> SaturatorParams<'static> {
        SaturatorParams {
            drive: c.drive.into(),
            mix: c.mix.into(),
            output: c.output.into(),
            mode: c.mode,
            low_gain_db: c.low_gain_db.into(),
            mid_gain_db: c.mid_gain_db.into(),
            high_gain_db: c.high_gain_db.into(),
            low_hz: c.low_hz,
            high_hz: c.high_hz,
        }
    }

    fn process(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        params: &SaturatorParams<'_>,
    ) -> bool {
        let sample_rate = self.ctx.sample_rate;
        let limit = self.ctx.nyquist_limit();
        let f_low = coefficient(params.low_hz.clamp(20.0, limit), sample_rate);
        let f_high = coefficient(params.high_hz.clamp(20.0, limit), sample_rate);
        // Butterworth
        let k = damping(SQRT_2 / 2.0);

        for n in 0..io::frames(outputs) {
            let x = io::input(inputs, 0, n);

            let low = self.low.process(x, f_low, k).lowpass;
            let high = self.high.process(x, f_high, k).highpass;
            let mid = x - low - high;
            let eq = low * db_to_gain(params.low_gain_db.at(n))
                + mid * db_to_gain(params.mid_gain_db.at(n))
                + high * db_to_gain(params.high_gain_db.at(n));

            let drive = params.drive.at(n).clamp(MIN_DRIVE, MAX_DRIVE);
            let wet = params.mode.apply(eq, drive);
            let mix = params.mix.at(n).clamp(0.0, 1.0);
            let out = (x + (wet - x) * mix) * params.output.at(n).max(0.0);

            io::write(outputs, 0, n, if out.is_finite() { out } else { 0.0 });
        }

        true
    }

    fn reset(&mut self) {
        self.low.reset();
        self.high.reset();
    }
}

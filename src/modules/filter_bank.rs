/*
Multi-Mode Filter Bank
======================

Three blocks, LOW, CENTRE and HIGH, each two cascaded SVFs fed from the same
input. FREQ sets a centre cutoff; SPAN pushes the LOW and HIGH cutoffs
apart from it symmetrically in octaves. CENTRE always works around the
unspread centre.

Topologies
----------

                 LOW                 CENTRE                HIGH
  crossover   LP(lo) → LP(lo)     HP(lo) → LP(hi)       HP(hi) → HP(hi)
  formant     HP(lo) → LP(lo)     BP(c)  → BP(c)        LP(hi) → HP(hi)

In crossover mode CENTRE uses the LOW and HIGH cutoffs as its band edges;
with SPAN at zero it collapses to HP(c) → LP(c).

QUALITY
-------

  above centre   resonance on the final stage: Q = 0.7 + 39.3·t², t = (q − 0.5)·2
  below centre   anti-resonance: amount = (0.5 − q)·2 of the final stage's
                 complementary response (LP↔HP, BP↔notch) is added to the
                 block output, carving a notch at the cutoff

The first stage of every cascade stays at Butterworth damping.

ALL is the plain average of the three blocks.
*/

use std::f32::consts::FRAC_1_SQRT_2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::filter::{coefficient, damping, FilterType, Svf},
    graph::{Module, Param, RenderCtx},
    io,
};

pub const IN_AUDIO: usize = 0;
pub const IN_FM: usize = 1;
pub const OUT_LOW: usize = 0;
pub const OUT_CENTRE: usize = 1;
pub const OUT_HIGH: usize = 2;
pub const OUT_ALL: usize = 3;

/// Centre cutoff with FREQ at 0.5.
pub const REFERENCE_HZ: f32 = 500.0;
/// Octaves covered by the FREQ knob.
pub const FREQ_OCTAVES: f32 = 10.0;
/// Octaves each side at full SPAN.
pub const SPAN_OCTAVES: f32 = 3.0;
/// Octaves for a full-scale FM input at full depth.
pub const FM_OCTAVES: f32 = 4.0;
pub const MIN_CUTOFF_HZ: f32 = 20.0;
const MIN_Q: f32 = 0.7;
const Q_RANGE: f32 = 39.3;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Complementary low/mid/high split.
    #[default]
    Crossover,
    /// Three bandpass peaks.
    Formant,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterBankControls {
    pub freq: f32,
    /// FM depth, 0–1.
    pub fm: f32,
    pub span: f32,
    pub quality: f32,
    pub mode: FilterMode,
}

impl Default for FilterBankControls {
    fn default() -> Self {
        Self {
            freq: 0.5,
            fm: 0.0,
            span: 0.0,
            quality: 0.5,
            mode: FilterMode::Crossover,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FilterBankParams<'a> {
    pub freq: Param<'a>,
    pub fm: Param<'a>,
    pub span: Param<'a>,
    pub quality: Param<'a>,
    pub mode: FilterMode,
}

/// The three cutoffs in Hz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cutoffs {
    pub low: f32,
    pub centre: f32,
    pub high: f32,
}

/// Cutoffs for the knob positions and an FM shift in octaves, clamped to
/// `[20 Hz, 0.45·fs]`.
pub fn cutoffs(freq: f32, span: f32, fm_octaves: f32, sample_rate: f32) -> Cutoffs {
    let max = sample_rate * 0.45;
    let octaves = (freq.clamp(0.0, 1.0) - 0.5) * FREQ_OCTAVES + fm_octaves;
    let centre = REFERENCE_HZ * octaves.exp2();
    let spread = (span.clamp(0.0, 1.0) * SPAN_OCTAVES).exp2();
    let clamp = |hz: f32| if hz.is_finite() { hz.clamp(MIN_CUTOFF_HZ, max) } else { MIN_CUTOFF_HZ };

    Cutoffs {
        low: clamp(centre / spread),
        centre: clamp(centre),
        high: clamp(centre * spread),
    }
}

/// QUALITY split into `(Q of the final stage, anti-resonance amount)`.
pub fn quality(q: f32) -> (f32, f32) {
    let q = q.clamp(0.0, 1.0);
    if q > 0.5 {
        let t = (q - 0.5) * 2.0;
        (MIN_Q + Q_RANGE * t * t, 0.0)
    } else {
        (MIN_Q, (0.5 - q) * 2.0)
    }
}

#[inline]
fn complement(filter_type: FilterType) -> FilterType {
    match filter_type {
        FilterType::LowPass => FilterType::HighPass,
        FilterType::HighPass => FilterType::LowPass,
        FilterType::BandPass => FilterType::Notch,
        FilterType::Notch => FilterType::BandPass,
    }
}

/// One stage of a cascade: response type and frequency coefficient.
#[derive(Debug, Clone, Copy)]
struct Stage {
    filter_type: FilterType,
    f: f32,
}

/// Two cascaded SVFs.
#[derive(Debug, Clone, Copy, Default)]
struct FilterBlock {
    first: Svf,
    second: Svf,
}

impl FilterBlock {
    #[inline]
    fn process(&mut self, sample: f32, first: Stage, second: Stage, k: f32, anti: f32) -> f32 {
        let stage_one = self.first.process(sample, first.f, damping(FRAC_1_SQRT_2));
        let x = stage_one.select(first.filter_type);
        let out = self.second.process(x, second.f, k);
        out.select(second.filter_type) + anti * out.select(complement(second.filter_type))
    }

    fn reset(&mut self) {
        self.first.reset();
        self.second.reset();
    }
}

pub struct FilterBank {
    ctx: RenderCtx,
    low: FilterBlock,
    centre: FilterBlock,
    high: FilterBlock,
    last_cutoffs: Cutoffs,
}

impl FilterBank {
    pub fn new(ctx: RenderCtx) -> Self {
        let defaults = FilterBankControls::default();
        Self {
            ctx,
            low: FilterBlock::default(),
            centre: FilterBlock::default(),
            high: FilterBlock::default(),
            last_cutoffs: cutoffs(defaults.freq, defaults.span, 0.0, ctx.sample_rate),
        }
    }

    /// Cutoffs used for the most recent sample.
    pub fn cutoffs(&self) -> Cutoffs {
        self.last_cutoffs
    }
}

impl Module for FilterBank {
    type Controls = FilterBankControls;
    type Message = ();
    type Params<'a> = FilterBankParams<'a>;

    const INPUTS: usize = 2;
    const OUTPUTS: usize = 4;

    fn params(c: &FilterBankControls) -> FilterBankParams<'static> {
        FilterBankParams {
            freq: c.freq.into(),
            fm: c.fm.into(),
            span: c.span.into(),
            quality: c.quality.into(),
            mode: c.mode,
        }
    }

    fn process(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        params: &FilterBankParams<'_>,
    ) -> bool {
        use FilterType::*;

        let sample_rate = self.ctx.sample_rate;

        for n in 0..io::frames(outputs) {
            let fm = io::input(inputs, IN_FM, n) * params.fm.at(n).clamp(0.0, 1.0) * FM_OCTAVES;
            let hz = cutoffs(params.freq.at(n), params.span.at(n), fm, sample_rate);
            let (q, anti) = quality(params.quality.at(n));
            let k = damping(q);

            let lo = coefficient(hz.low, sample_rate);
            let c = coefficient(hz.centre, sample_rate);
            let hi = coefficient(hz.high, sample_rate);
            let stage = |filter_type, f| Stage { filter_type, f };

            let x = io::input(inputs, IN_AUDIO, n);
            let (low, centre, high) = match params.mode {
                FilterMode::Crossover => (
                    self.low.process(x, stage(LowPass, lo), stage(LowPass, lo), k, anti),
                    self.centre.process(x, stage(HighPass, lo), stage(LowPass, hi), k, anti),
                    self.high.process(x, stage(HighPass, hi), stage(HighPass, hi), k, anti),
                ),
                FilterMode::Formant => (
                    self.low.process(x, stage(HighPass, lo), stage(LowPass, lo), k, anti),
                    self.centre.process(x, stage(BandPass, c), stage(BandPass, c), k, anti),
                    self.high.process(x, stage(LowPass, hi), stage(HighPass, hi), k, anti),
                ),
            };

            io::write(outputs, OUT_LOW, n, low);
            io::write(outputs, OUT_CENTRE, n, centre);
            io::write(outputs, OUT_HIGH, n, high);
            io::write(outputs, OUT_ALL, n, (low + centre + high) / 3.0);
            self.last_cutoffs = hz;
        }

        true
    }

    fn reset(&mut self) {
        self.low.reset();
        self.centre.reset();
        self.high.reset();
    }
}

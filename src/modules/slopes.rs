//! Six-channel slope generator.
//!
//! Six [`Slope`] channels share TIME, RAMP, CURVE and MODE, and spread their
//! frequencies with INTONE: channel *i* runs at `1 + (i−1)·a` times the base
//! frequency on the overtone side and `1 / (1 + (i−1)·a)` on the undertone
//! side, where `a` is how far INTONE sits from centre. Channel 1 always runs
//! at the base frequency.
//!
//! # Channels
//!
//! Inputs (11): triggers 1–6, TIME CV, INTONE CV, RAMP CV, CURVE CV, FM.
//! Outputs (7): slopes 1–6, MIX.
//!
//! # Ranges
//!
//! SHAPE is the envelope/LFO range (0.01–20 Hz) with unipolar 0–8 V output.
//! SOUND is the oscillator range (20–5000 Hz) with bipolar ±5 V output.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{
        slope::{increments, Slope, SlopeMode, SlopeStage},
        volts::{to_signal, BIPOLAR_MAX_VOLTS, UNIPOLAR_MAX_VOLTS},
    },
    graph::{Module, Param, RenderCtx},
    io,
};

pub const CHANNELS: usize = 6;

pub const IN_TRIGGER: usize = 0;
pub const IN_TIME_CV: usize = 6;
pub const IN_INTONE_CV: usize = 7;
pub const IN_RAMP_CV: usize = 8;
pub const IN_CURVE_CV: usize = 9;
pub const IN_FM: usize = 10;
pub const OUT_MIX: usize = 6;

pub const SHAPE_MIN_HZ: f32 = 0.01;
pub const SHAPE_MAX_HZ: f32 = 20.0;
pub const SOUND_MIN_HZ: f32 = 20.0;
pub const SOUND_MAX_HZ: f32 = 5_000.0;
/// RAMP never reaches 0 or 1; the short side becomes a near-instant jump.
pub const RAMP_MIN: f32 = 0.001;
/// Knob travel produced by a full-scale (±1) CV.
pub const CV_SPAN: f32 = 0.5;
/// Octaves of frequency shift for a full-scale FM input at full depth.
pub const FM_OCTAVES: f32 = 2.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlopeRange {
    #[default]
    Shape,
    Sound,
}

/// How the FM input spreads across channels.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FmMode {
    /// Every channel shifts by the same amount.
    #[default]
    Time,
    /// Shift grows with channel index.
    Intone,
}

/// Knob positions, all 0–1 with 0.5 neutral for INTONE, RAMP, CURVE and FM.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopesControls {
    pub time: f32,
    pub intone: f32,
    pub ramp: f32,
    pub curve: f32,
    pub fm: f32,
    pub fm_mode: FmMode,
    pub mode: SlopeMode,
    pub range: SlopeRange,
}

impl Default for SlopesControls {
    fn default() -> Self {
        Self {
            time: 0.5,
            intone: 0.5,
            ramp: 0.5,
            curve: 0.5,
            fm: 0.5,
            fm_mode: FmMode::Time,
            mode: SlopeMode::Transient,
            range: SlopeRange::Shape,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SlopesParams<'a> {
    pub time: Param<'a>,
    pub intone: Param<'a>,
    pub ramp: Param<'a>,
    pub curve: Param<'a>,
    pub fm: Param<'a>,
    pub fm_mode: FmMode,
    pub mode: SlopeMode,
    pub range: SlopeRange,
}

impl From<&SlopesControls> for SlopesParams<'static> {
    fn from(c: &SlopesControls) -> Self {
        Self {
            time: c.time.into(),
            intone: c.intone.into(),
            ramp: c.ramp.into(),
            curve: c.curve.into(),
            fm: c.fm.into(),
            fm_mode: c.fm_mode,
            mode: c.mode,
            range: c.range,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlopesMessage {
    /// Software trigger for one channel (0-based).
    Trigger(usize),
    /// Trigger every channel at once.
    TriggerAll,
    Reset,
}

/// Frequency ratio of `channel` (0-based) relative to channel 1.
#[inline]
pub fn intone_ratio(intone: f32, channel: usize) -> f32 {
    let amount = (intone.clamp(0.0, 1.0) - 0.5) * 2.0;
    let step = channel as f32 * amount.abs();
    if amount >= 0.0 {
        1.0 + step
    } else {
        1.0 / (1.0 + step)
    }
}

/// Exponential TIME mapping for a range.
#[inline]
pub fn time_to_hz(time: f32, range: SlopeRange) -> f32 {
    let (min, max) = match range {
        SlopeRange::Shape => (SHAPE_MIN_HZ, SHAPE_MAX_HZ),
        SlopeRange::Sound => (SOUND_MIN_HZ, SOUND_MAX_HZ),
    };
    min * (max / min).powf(time.clamp(0.0, 1.0))
}

/// Shaped level (0–1) to output volts.
#[inline]
fn to_range_volts(shaped: f32, range: SlopeRange) -> f32 {
    match range {
        SlopeRange::Shape => shaped * UNIPOLAR_MAX_VOLTS,
        SlopeRange::Sound => (2.0 * shaped - 1.0) * BIPOLAR_MAX_VOLTS,
    }
}

/// MIX output in volts.
///
/// SHAPE: the largest of each channel divided by its index.
/// SOUND: the mean of all channels through a tanh limiter.
pub fn mix_volts(values: &[f32; CHANNELS], range: SlopeRange) -> f32 {
    match range {
        SlopeRange::Shape => values
            .iter()
            .enumerate()
            .map(|(i, v)| v / (i + 1) as f32)
            .fold(0.0f32, f32::max),
        SlopeRange::Sound => {
            let mean = values.iter().sum::<f32>() / CHANNELS as f32;
            BIPOLAR_MAX_VOLTS * (mean / BIPOLAR_MAX_VOLTS).tanh()
        }
    }
}

pub struct Slopes {
    ctx: RenderCtx,
    channels: [Slope; CHANNELS],
    /// Last output of each channel in volts
    values: [f32; CHANNELS],
    /// Mode seen by the last block, used for software triggers
    mode: SlopeMode,
}

impl Slopes {
    pub fn new(ctx: RenderCtx) -> Self {
        Self {
            ctx,
            channels: [Slope::new(); CHANNELS],
            values: [0.0; CHANNELS],
            mode: SlopeMode::Transient,
        }
    }

    /// Last output of each channel, in volts.
    pub fn levels(&self) -> [f32; CHANNELS] {
        self.values
    }

    pub fn stages(&self) -> [SlopeStage; CHANNELS] {
        self.channels.map(|c| c.stage())
    }

    /// Frequency of each channel for the given knob positions and FM sample.
    pub fn channel_frequencies(&self, time: f32, intone: f32, range: SlopeRange) -> [f32; CHANNELS] {
        let base = time_to_hz(time, range);
        let limit = self.ctx.nyquist_limit();
        std::array::from_fn(|i| (base * intone_ratio(intone, i)).min(limit))
    }
}

impl Module for Slopes {
    type Controls = SlopesControls;
    type Message = SlopesMessage;
    type Params<'a> = SlopesParams<'a>;

    const INPUTS: usize = 11;
    const OUTPUTS: usize = 7;

    fn params(controls: &SlopesControls) -> SlopesParams<'static> {
        controls.into()
    }

    fn process(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        params: &SlopesParams<'_>,
    ) -> bool {
        let sample_rate = self.ctx.sample_rate;
        let limit = self.ctx.nyquist_limit();
        let mode = params.mode;
        let range = params.range;
        self.mode = mode;

        for n in 0..io::frames(outputs) {
            let time = (params.time.at(n) + io::input(inputs, IN_TIME_CV, n) * CV_SPAN).clamp(0.0, 1.0);
            let intone =
                (params.intone.at(n) + io::input(inputs, IN_INTONE_CV, n) * CV_SPAN).clamp(0.0, 1.0);
            let ramp = (params.ramp.at(n) + io::input(inputs, IN_RAMP_CV, n) * CV_SPAN)
                .clamp(RAMP_MIN, 1.0 - RAMP_MIN);
            let curve = (params.curve.at(n) + io::input(inputs, IN_CURVE_CV, n) * CV_SPAN).clamp(0.0, 1.0);

            let depth = (params.fm.at(n).clamp(0.0, 1.0) - 0.5) * 2.0;
            let fm = io::input(inputs, IN_FM, n) * depth * FM_OCTAVES;
            let base = time_to_hz(time, range);

            for (i, slope) in self.channels.iter_mut().enumerate() {
                let octaves = match params.fm_mode {
                    FmMode::Time => fm,
                    FmMode::Intone => fm * (i + 1) as f32 / CHANNELS as f32,
                };
                let frequency = (base * intone_ratio(intone, i) * octaves.exp2()).min(limit);
                let (rise, fall) = increments(frequency, ramp, sample_rate);

                slope.next_sample(mode, io::input(inputs, IN_TRIGGER + i, n), rise, fall);

                let volts = to_range_volts(slope.shaped(curve), range);
                self.values[i] = volts;
                io::write(outputs, i, n, to_signal(volts));
            }

            io::write(outputs, OUT_MIX, n, to_signal(mix_volts(&self.values, range)));
        }

        true
    }

    fn handle(&mut self, message: SlopesMessage) {
        match message {
            SlopesMessage::Trigger(channel) => {
                if let Some(slope) = self.channels.get_mut(channel) {
                    slope.fire(self.mode);
                }
            }
            SlopesMessage::TriggerAll => {
                for slope in self.channels.iter_mut() {
                    slope.fire(self.mode);
                }
            }
            SlopesMessage::Reset => self.reset(),
        }
    }

    fn reset(&mut self) {
        for slope in self.channels.iter_mut() {
            slope.reset();
        }
        self.values = [0.0; CHANNELS];
    }
}

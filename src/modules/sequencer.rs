/*
Step Sequencer / Clock Divider
==============================

A 16-step trigger pattern per voice, played back by a cursor.

Clocking
--------

  internal    Steps are timed from BPM: samples per step = fs·60 / (bpm·division).
              Runs with no inputs patched.

  subdivide   Input 0 carries a beat clock. The interval between two pulses is
              measured and split into `division` steps. Every pulse re-syncs the
              cursor: it always starts a new step, and at most `division − 1`
              timed steps follow before the next pulse.

  step        Every rising edge on input 0 advances one step.

A rising edge on input 1 (reset) sends the cursor to step 0 and plays it on
the same sample. Reset wins over a clock edge landing on the same sample,
though in subdivide mode that pulse still counts toward the measured period.

Before the first boundary the cursor has not started, so the first boundary
plays step 0 rather than step 1.

Swing
-----

Pairs of steps share their time unevenly: even steps last `sps·(1 + swing)`
and odd steps `sps·(1 − swing)`, which pushes every odd step late by
`swing·sps` while the pair keeps its length.

Output is a 1.0 pulse, one sample wide, on every voice whose step is set.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::trigger::EdgeDetector,
    graph::{Module, Param, RenderCtx},
    io,
};

pub const STEPS: usize = 16;
pub const VOICES: usize = 3;
pub const IN_CLOCK: usize = 0;
pub const IN_RESET: usize = 1;
pub const MIN_BPM: f32 = 20.0;
pub const MAX_BPM: f32 = 300.0;
pub const MAX_DIVISION: u32 = 16;
pub const MAX_SWING: f32 = 0.75;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequencerVoice {
    Kick,
    Snare,
    Hat,
}

impl SequencerVoice {
    pub const ALL: [SequencerVoice; VOICES] = [Self::Kick, Self::Snare, Self::Hat];

    /// Output channel of the voice.
    pub fn index(self) -> usize {
        match self {
            Self::Kick => 0,
            Self::Snare => 1,
            Self::Hat => 2,
        }
    }

    /// Resolve a voice name; unknown names fall back to `Kick`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "kick" | "bd" => Self::Kick,
            "snare" | "sd" => Self::Snare,
            "hat" | "hihat" | "hh" => Self::Hat,
            other => {
                tracing::warn!(voice = other, "unknown sequencer voice, using kick");
                Self::Kick
            }
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockSource {
    #[default]
    Internal,
    Subdivide,
    Step,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencerControls {
    pub bpm: f32,
    /// Steps per beat (internal) or per clock pulse (subdivide).
    pub division: u32,
    pub swing: f32,
    pub clock: ClockSource,
}

impl Default for SequencerControls {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            division: 4,
            swing: 0.0,
            clock: ClockSource::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SequencerParams<'a> {
    pub bpm: Param<'a>,
    pub swing: Param<'a>,
    pub division: u32,
    pub clock: ClockSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerMessage {
    SetStep {
        voice: SequencerVoice,
        step: usize,
        on: bool,
    },
    ToggleStep {
        voice: SequencerVoice,
        step: usize,
    },
    ClearPattern(SequencerVoice),
    ClearAll,
    Reset,
}

/// Swung length of `step` in samples.
#[inline]
pub fn step_length(step: usize, samples_per_step: f32, swing: f32) -> f32 {
    let swing = swing.clamp(0.0, MAX_SWING);
    if step % 2 == 0 {
        samples_per_step * (1.0 + swing)
    } else {
        samples_per_step * (1.0 - swing)
    }
}

pub struct Sequencer {
    ctx: RenderCtx,
    patterns: [[bool; STEPS]; VOICES],
    cursor: Option<usize>,
    /// Samples left in the current step.
    countdown: f32,
    clock: EdgeDetector,
    reset: EdgeDetector,
    /// Samples since the last beat pulse, once one has arrived.
    since_pulse: Option<u32>,
    pulse_period: Option<f32>,
    steps_since_pulse: u32,
}

impl Sequencer {
    pub fn new(ctx: RenderCtx) -> Self {
        Self {
            ctx,
            patterns: [[false; STEPS]; VOICES],
            cursor: None,
            countdown: 0.0,
            clock: EdgeDetector::new(),
            reset: EdgeDetector::new(),
            since_pulse: None,
            pulse_period: None,
            steps_since_pulse: 0,
        }
    }

    /// Step that played last, `None` before the first boundary.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn pattern(&self, voice: SequencerVoice) -> &[bool; STEPS] {
        &self.patterns[voice.index()]
    }

    /// Measured beat-clock period in samples.
    pub fn pulse_period(&self) -> Option<f32> {
        self.pulse_period
    }

    fn samples_per_step(&self, params: &SequencerParams<'_>, n: usize) -> f32 {
        let division = params.division.clamp(1, MAX_DIVISION) as f32;
        match params.clock {
            ClockSource::Internal => {
                let bpm = params.bpm.at(n).clamp(MIN_BPM, MAX_BPM);
                self.ctx.sample_rate * 60.0 / (bpm * division)
            }
            ClockSource::Subdivide => self.pulse_period.unwrap_or(0.0) / division,
            ClockSource::Step => 0.0,
        }
    }

    /// Track the beat-clock period. Runs on every subdivide sample, reset or not.
    fn measure(&mut self, clock: bool) {
        if let Some(since) = self.since_pulse.as_mut() {
            *since += 1;
        }
        if clock {
            if let Some(since) = self.since_pulse {
                self.pulse_period = Some(since as f32);
            }
            self.since_pulse = Some(0);
        }
    }

    /// Whether a step boundary falls on this sample, ignoring reset.
    fn boundary(&mut self, clock: bool, params: &SequencerParams<'_>) -> bool {
        match params.clock {
            ClockSource::Internal => self.countdown <= 0.0,
            ClockSource::Step => clock,
            ClockSource::Subdivide => {
                if clock {
                    self.steps_since_pulse = 0;
                    self.countdown = 0.0;
                    true
                } else {
                    self.pulse_period.is_some()
                        && self.countdown <= 0.0
                        && self.steps_since_pulse < params.division.clamp(1, MAX_DIVISION)
                }
            }
        }
    }
}

impl Module for Sequencer {
    type Controls = SequencerControls;
    type Message = SequencerMessage;
    type Params<'a> = SequencerParams<'a>;

    const INPUTS: usize = 2;
    const OUTPUTS: usize = VOICES;

    fn params(c: &SequencerControls) -> SequencerParams<'static> {
        SequencerParams {
            bpm: c.bpm.into(),
            swing: c.swing.into(),
            division: c.division,
            clock: c.clock,
        }
    }

    fn process(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        params: &SequencerParams<'_>,
    ) -> bool {
        for n in 0..io::frames(outputs) {
            let clock = self.clock.rising(io::input(inputs, IN_CLOCK, n));
            let reset = self.reset.rising(io::input(inputs, IN_RESET, n));
            if params.clock == ClockSource::Subdivide {
                self.measure(clock);
            }

            let step = if reset {
                self.countdown = 0.0;
                self.steps_since_pulse = 0;
                Some(0)
            } else if self.boundary(clock, params) {
                Some(self.cursor.map_or(0, |c| (c + 1) % STEPS))
            } else {
                None
            };

            for voice in 0..VOICES {
                let hit = step.is_some_and(|s| self.patterns[voice][s]);
                io::write(outputs, voice, n, if hit { 1.0 } else { 0.0 });
            }

            if params.clock == ClockSource::Step {
                self.cursor = step.or(self.cursor);
                continue;
            }

            if let Some(s) = step {
                self.cursor = Some(s);
                self.steps_since_pulse += 1;
                let length = step_length(s, self.samples_per_step(params, n), params.swing.at(n));
                self.countdown = self.countdown.max(-1.0) + length;
            }
            self.countdown -= 1.0;
        }

        true
    }

    fn handle(&mut self, message: SequencerMessage) {
        match message {
            SequencerMessage::SetStep { voice, step, on } => {
                if let Some(slot) = self.patterns[voice.index()].get_mut(step) {
                    *slot = on;
                }
            }
            SequencerMessage::ToggleStep { voice, step } => {
                if let Some(slot) = self.patterns[voice.index()].get_mut(step) {
                    *slot = !*slot;
                }
            }
            SequencerMessage::ClearPattern(voice) => {
                self.patterns[voice.index()] = [false; STEPS];
            }
            SequencerMessage::ClearAll => self.patterns = [[false; STEPS]; VOICES],
            SequencerMessage::Reset => {
                self.cursor = None;
                self.countdown = 0.0;
                self.steps_since_pulse = 0;
            }
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.ctx);
    }
}

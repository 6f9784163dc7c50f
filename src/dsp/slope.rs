use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::trigger::EdgeDetector;

/*
Slope Generator Channel
=======================

One channel of a function generator: a level that rises from 0 to 1 and
falls back again, driven by triggers, gates, or free-running. The same
primitive is an AR envelope, an ASR envelope, or an LFO / oscillator
depending on the mode.

Vocabulary
----------

  level       Position of the slope, 0.0 (rest) to 1.0 (peak). Output
              scaling to volts happens in the module, not here.

  ramp        Fraction of a cycle spent rising. 0.5 is a triangle, small
              values a falling saw, large values a rising saw.

  curve       Waveshape applied to the level: rectangular at 0.0, linear
              at 0.5, sinusoidal at 1.0.

  increment   How much `level` moves per sample:
                rising:  f / (ramp · fs)
                falling: f / ((1 − ramp) · fs)
              so one full rise + fall takes exactly 1/f seconds.


The State Machine
-----------------

  transient   Idle ──edge──→ Rising ──level=1──→ Falling ──level=0──→ Idle
              Edges while Rising or Falling are ignored.

  sustain     Idle/Falling ──gate high──→ Rising ──level=1──→ Sustaining
              Rising/Sustaining ──gate low──→ Falling ──level=0──→ Idle

  cycle       Rising ──level=1──→ Falling ──level=0──→ Rising ...
              An edge restarts the rise from 0. Never idle.


The Curve
---------

    bend = (curve − 0.5) · 2

    bend = 0    identity, output is exactly the level
    bend < 0    power law with p = 1 + bend:
                  rising:   x^p
                  falling:  1 − (1 − x)^p
                At p = 0 the output jumps straight to the target: rectangular.
    bend > 0    linear blend toward the raised cosine (1 − cos πx) / 2
*/

/// The current stage of a slope channel.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlopeStage {
    #[default]
    Idle,
    Rising,
    Falling,
    Sustaining,
}

/// How a slope responds to its trigger/gate input.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlopeMode {
    /// Attack/release, one shot per trigger edge.
    #[default]
    Transient,
    /// Attack/sustain/release following a gate.
    Sustain,
    /// Free-running, retriggerable.
    Cycle,
}

impl SlopeMode {
    /// Resolve a mode name; unknown names fall back to `Transient`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "transient" | "ar" => SlopeMode::Transient,
            "sustain" | "asr" => SlopeMode::Sustain,
            "cycle" | "loop" => SlopeMode::Cycle,
            other => {
                tracing::warn!(mode = other, "unknown slope mode, using transient");
                SlopeMode::Transient
            }
        }
    }
}

/// Apply the curve control to a level in `[0, 1]`.
#[inline]
pub fn shape(level: f32, curve: f32, rising: bool) -> f32 {
    let bend = (curve.clamp(0.0, 1.0) - 0.5) * 2.0;
    if bend == 0.0 {
        return level;
    }

    let x = level.clamp(0.0, 1.0);
    if x <= 0.0 || x >= 1.0 {
        return x;
    }

    if bend > 0.0 {
        let sine = 0.5 - 0.5 * (PI * x).cos();
        x + (sine - x) * bend
    } else {
        let p = 1.0 + bend;
        if rising {
            x.powf(p)
        } else {
            1.0 - (1.0 - x).powf(p)
        }
    }
}

/// Rise and fall increments per sample for a frequency and ramp.
#[inline]
pub fn increments(frequency: f32, ramp: f32, sample_rate: f32) -> (f32, f32) {
    let per_sample = (frequency / sample_rate).max(0.0);
    let rise = (per_sample / ramp).min(1.0);
    let fall = (per_sample / (1.0 - ramp)).min(1.0);
    (rise, fall)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Slope {
    stage: SlopeStage,
    level: f32,
    edge: EdgeDetector,
}

impl Slope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Software trigger, equivalent to a rising edge on the input.
    pub fn fire(&mut self, mode: SlopeMode) {
        match mode {
            SlopeMode::Transient => {
                if self.stage == SlopeStage::Idle {
                    self.stage = SlopeStage::Rising;
                }
            }
            SlopeMode::Cycle => {
                self.level = 0.0;
                self.stage = SlopeStage::Rising;
            }
            // Sustain follows the gate level only
            SlopeMode::Sustain => {}
        }
    }

    /// Start a new rise from 0 whatever the current stage.
    pub fn restart(&mut self) {
        self.level = 0.0;
        self.stage = SlopeStage::Rising;
    }

    /// Advance one sample. `input` is the trigger/gate signal for this sample.
    pub fn next_sample(&mut self, mode: SlopeMode, input: f32, rise: f32, fall: f32) -> f32 {
        let edge = self.edge.rising(input);
        let gate = self.edge.is_high();

        match mode {
            SlopeMode::Transient => {
                if edge {
                    self.fire(mode);
                }
                if self.stage == SlopeStage::Sustaining {
                    self.stage = SlopeStage::Falling;
                }
            }
            SlopeMode::Sustain => match self.stage {
                SlopeStage::Idle | SlopeStage::Falling if gate => self.stage = SlopeStage::Rising,
                SlopeStage::Rising | SlopeStage::Sustaining if !gate => {
                    self.stage = SlopeStage::Falling
                }
                _ => {}
            },
            SlopeMode::Cycle => {
                if edge {
                    self.fire(mode);
                }
                if matches!(self.stage, SlopeStage::Idle | SlopeStage::Sustaining) {
                    self.stage = SlopeStage::Rising;
                }
            }
        }

        match self.stage {
            SlopeStage::Idle => {
                self.level = 0.0;
            }

            SlopeStage::Rising => {
                self.level += rise;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = if mode == SlopeMode::Sustain && gate {
                        SlopeStage::Sustaining
                    } else {
                        SlopeStage::Falling
                    };
                }
            }

            SlopeStage::Sustaining => {
                self.level = 1.0;
            }

            SlopeStage::Falling => {
                self.level -= fall;
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.stage = if mode == SlopeMode::Cycle {
                        SlopeStage::Rising
                    } else {
                        SlopeStage::Idle
                    };
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// Current level with the curve applied.
    #[inline]
    pub fn shaped(&self, curve: f32) -> f32 {
        shape(self.level, curve, self.stage != SlopeStage::Falling)
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> SlopeStage {
        self.stage
    }

    /// Idle and not producing output.
    pub fn is_idle(&self) -> bool {
        self.stage == SlopeStage::Idle
    }

    pub fn reset(&mut self) {
        self.stage = SlopeStage::Idle;
        self.level = 0.0;
        self.edge.reset();
    }
}

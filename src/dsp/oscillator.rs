//! Phase accumulators and noise.
//!
//! Waveform math shared by the modules. Everything here is a few floats of
//! state and allocation-free.

use std::f32::consts::TAU;

/// Normalized phase accumulator in `[0, 1)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Phasor {
    phase: f32,
}

impl Phasor {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Advance by `frequency / sample_rate`, returning the phase *before* the step
    /// and whether the step wrapped. A non-finite step leaves the phase alone.
    #[inline]
    pub fn advance(&mut self, frequency: f32, sample_rate: f32) -> (f32, bool) {
        let current = self.phase;
        let increment = frequency / sample_rate;
        if increment.is_finite() {
            self.phase += increment.clamp(0.0, 0.5);
        }

        let wrapped = self.phase >= 1.0;
        if wrapped {
            self.phase -= 1.0;
        }
        (current, wrapped)
    }

    #[inline]
    pub fn next_sine(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let (phase, _) = self.advance(frequency, sample_rate);
        (TAU * phase).sin()
    }

    /// Triangle in `[-1, 1]`, starting at -1 when phase is 0.
    #[inline]
    pub fn next_triangle(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let (phase, _) = self.advance(frequency, sample_rate);
        triangle(phase)
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// Triangle of a normalized phase: -1 at 0, +1 at 0.5.
#[inline]
pub fn triangle(phase: f32) -> f32 {
    1.0 - 4.0 * (phase - 0.5).abs()
}

/// Square derived from a bipolar signal's sign.
#[inline]
pub fn square_from(signal: f32) -> f32 {
    if signal >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// White noise from a xorshift32 generator, uniform in `[-1, 1)`.
#[derive(Debug, Clone, Copy)]
pub struct NoiseSource {
    state: u32,
}

impl NoiseSource {
    pub fn new(seed: u32) -> Self {
        // xorshift never leaves zero
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;

        // Top 24 bits -> [0, 1) -> [-1, 1)
        (x >> 8) as f32 * (2.0 / 16_777_216.0) - 1.0
    }
}

impl Default for NoiseSource {
    fn default() -> Self {
        Self::new(0x1234_5678)
    }
}

//! Distortion / Waveshaping
//!
//! A waveshaper applies a static transfer function to each sample:
//!   output = f(input * drive)
//!
//! At low drive the signal stays in the linear part of f() and passes mostly
//! unchanged; pushing it harder reaches the curved region and adds harmonics.
//!
//! # Transfer Functions
//!
//! tanh:
//!   f(x) = tanh(x)
//!   - The reference soft limiter, smooth and symmetric
//!   - Used for mix buses and the drum voice output
//!
//! Rational soft clip:
//!   f(x) = x / (1 + |x|)
//!   - Gentler knee than tanh, slow approach to ±1
//!   - Tape-like compression of peaks
//!
//! Triode:
//!   Asymmetric: positive half through tanh, negative half through a softer
//!   rational curve, with a small even-order bias. Adds 2nd harmonic.
//!
//! Hard clip:
//!   f(x) = clamp(x, -t, t)
//!
//! Foldback:
//!   Reflects the signal back inside ±t each time it crosses the threshold.
//!
//! Clipped sine:
//!   f(x) = sin(π/2 · clamp(x, -1, 1))
//!   - Rounds off the top of an impulse; the formant VCA uses it

use std::f32::consts::FRAC_PI_2;

/// Symmetric tanh saturation.
#[inline]
pub fn tanh_clip(sample: f32, drive: f32) -> f32 {
    (sample * drive).tanh()
}

/// Soft clipping using the x / (1 + |x|) transfer function.
#[inline]
pub fn soft_clip(sample: f32, drive: f32) -> f32 {
    let x = sample * drive;
    x / (1.0 + x.abs())
}

/// Asymmetric triode-style curve. Zero in, zero out.
#[inline]
pub fn triode(sample: f32, drive: f32) -> f32 {
    const BIAS: f32 = 0.2;
    let x = sample * drive + BIAS;
    let shaped = if x >= 0.0 { x.tanh() } else { x / (1.0 + 2.0 * x.abs()) };
    shaped - BIAS.tanh()
}

/// Hard clipping at `±threshold`.
#[inline]
pub fn hard_clip(sample: f32, drive: f32, threshold: f32) -> f32 {
    let x = sample * drive;
    x.clamp(-threshold, threshold)
}

/// Foldback distortion: the signal reflects at `±threshold`.
#[inline]
pub fn foldback(sample: f32, drive: f32, threshold: f32) -> f32 {
    let x = sample * drive;
    if !x.is_finite() || threshold <= 0.0 {
        return 0.0;
    }

    // Closed form of repeated reflection, period 4t
    let period = 4.0 * threshold;
    let shifted = (x + threshold).rem_euclid(period);
    if shifted < 2.0 * threshold {
        shifted - threshold
    } else {
        3.0 * threshold - shifted
    }
}

/// Clipped-sine waveshaper.
#[inline]
pub fn clipped_sine(sample: f32, drive: f32) -> f32 {
    (FRAC_PI_2 * (sample * drive).clamp(-1.0, 1.0)).sin()
}

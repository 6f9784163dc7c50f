//! Eurorack voltage domain <-> normalized signal.
//!
//! Modules compute in volts (±5 V bipolar, 0–8 V unipolar) and exchange
//! signals normalized by a fixed factor of 5, so ±5 V maps to ±1.0 and an
//! 8 V envelope peak maps to 1.6. Both directions are a single multiply or divide.

/// Volts represented by a normalized signal of 1.0.
pub const VOLTS_PER_UNIT: f32 = 5.0;
/// Peak of a unipolar 0–8 V signal.
pub const UNIPOLAR_MAX_VOLTS: f32 = 8.0;
/// Peak of a bipolar ±5 V signal.
pub const BIPOLAR_MAX_VOLTS: f32 = 5.0;
/// Normalized value of a full-scale unipolar signal (8 V / 5).
pub const UNIPOLAR_MAX_NORMALIZED: f32 = 1.6;

#[inline]
pub fn to_signal(volts: f32) -> f32 {
    volts / VOLTS_PER_UNIT
}

#[inline]
pub fn to_volts(signal: f32) -> f32 {
    signal * VOLTS_PER_UNIT
}

//! Low-level DSP primitives used by the patchable modules.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside module structs. They stay focused on the
//! signal-processing math; modules layer on control mapping, channel layout
//! and voltage scaling.

/// Waveshaping transfer functions (tanh, soft/hard clip, foldback, clipped sine).
pub mod distortion;
/// State-variable filter primitive with simultaneous responses.
pub mod filter;
/// Phase accumulators, basic waveforms and white noise.
pub mod oscillator;
/// Rise/fall slope channel with transient, sustain and cycle modes.
pub mod slope;
/// Rising-edge and gate detection.
pub mod trigger;
/// Eurorack voltage <-> normalized signal conversion.
pub mod volts;

pub use filter::{FilterType, Svf, SvfOutputs};
pub use slope::{Slope, SlopeMode, SlopeStage};

//! Benchmarks for low-level DSP primitives.

mod distortion;
mod filter;
mod oscillator;
mod slope;

pub use distortion::bench_distortion;
pub use filter::bench_filter;
pub use oscillator::bench_oscillator;
pub use slope::bench_slope;

//! Construction and configuration errors.
//!
//! Nothing in the per-sample path returns these. Out-of-range control values
//! are clamped and unknown mode names fall back to defaults; only setup steps
//! (sample rate validation, queue creation, preset parsing) can fail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Sample rate was non-finite or outside the supported range.
    #[error("unsupported sample rate: {0} Hz (expected 1000..=768000)")]
    InvalidSampleRate(f32),

    /// A control queue was requested with no room for messages.
    #[error("control queue capacity must be at least 1")]
    QueueCapacity,

    /// Preset JSON could not be parsed or serialized.
    #[cfg(feature = "serde")]
    #[error("invalid preset: {0}")]
    Preset(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

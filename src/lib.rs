pub mod dsp;
pub mod error;
pub mod graph; // Host contract: Module trait, params, control handoff
pub mod io;
pub mod modules; // Patchable Eurorack-style modules
#[cfg(feature = "serde")]
pub mod presets;

pub use error::{Error, Result};
pub use graph::{Module, Param, RenderCtx};

/// Frames per block the host is expected to deliver.
pub const BLOCK_SIZE: usize = 128;
/// Shortest envelope time: one sample at 48 kHz.
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;

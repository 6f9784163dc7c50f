//! Patchable modules.
//!
//! Each module implements [`Module`](crate::graph::Module): a fixed channel
//! layout, a `Controls` snapshot for knob positions, and a `process` call
//! that renders one block. All signals on the channels are normalized, with
//! 1.0 standing for 5 V.

/// Two triggered drum voices summed through a saturator.
pub mod drums;
/// Three-block SVF filter bank with crossover and formant topologies.
pub mod filter_bank;
/// Triangle core driving a triggered impulse and waveshaper.
pub mod formant;
/// Pitch-class quantizer.
pub mod quantizer;
/// Three-band EQ into selectable saturation.
pub mod saturator;
/// 16-step trigger sequencer and clock divider.
pub mod sequencer;
/// Six-channel slope generator.
pub mod slopes;

pub use drums::{DrumControls, DrumSynth};
pub use filter_bank::{FilterBank, FilterBankControls, FilterMode};
pub use formant::{FormantControls, FormantMode, FormantOscillator};
pub use quantizer::{NoteMask, Quantizer, QuantizerControls, QuantizerMessage};
pub use saturator::{SaturationMode, Saturator, SaturatorControls};
pub use sequencer::{ClockSource, Sequencer, SequencerControls, SequencerMessage, SequencerVoice};
pub use slopes::{FmMode, SlopeRange, Slopes, SlopesControls, SlopesMessage};

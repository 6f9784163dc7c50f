//! JSON presets for module controls.
//!
//! A [`Preset`] holds one module's control snapshot, tagged with the module
//! it belongs to. A [`PatchPreset`] holds a whole demo patch: every module's
//! controls plus the sequencer patterns and the quantizer scale. Every field
//! is optional in JSON and falls back to the module default.
//!
//! ```
//! use eurorack_dsp::presets::Preset;
//!
//! let preset = Preset::from_json(r#"{ "module": "quantizer", "offset": 1.0 }"#).unwrap();
//! assert!(matches!(preset, Preset::Quantizer(c) if c.offset == 1.0 && c.depth == 1.0));
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    dsp::SlopeMode,
    error::Result,
    modules::{
        quantizer::NoteMask,
        sequencer::{SequencerMessage, SequencerVoice, STEPS},
        DrumControls, FilterBankControls, FormantControls, QuantizerControls, SaturatorControls,
        SequencerControls, SlopesControls,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "module", rename_all = "snake_case")]
pub enum Preset {
    Slopes(SlopesControls),
    Formant(FormantControls),
    FilterBank(FilterBankControls),
    Drums(DrumControls),
    Sequencer(SequencerControls),
    Quantizer(QuantizerControls),
    Saturator(SaturatorControls),
}

impl Preset {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Steps that are on, per sequencer voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Patterns {
    pub kick: Vec<usize>,
    pub snare: Vec<usize>,
    pub hat: Vec<usize>,
}

impl Default for Patterns {
    fn default() -> Self {
        Self {
            kick: vec![0, 4, 8, 12],
            snare: vec![4, 12],
            hat: (0..STEPS).step_by(2).collect(),
        }
    }
}

impl Patterns {
    /// Messages that replace the sequencer's patterns with these.
    pub fn messages(&self) -> impl Iterator<Item = SequencerMessage> + '_ {
        let lanes = [
            (SequencerVoice::Kick, &self.kick),
            (SequencerVoice::Snare, &self.snare),
            (SequencerVoice::Hat, &self.hat),
        ];
        std::iter::once(SequencerMessage::ClearAll).chain(lanes.into_iter().flat_map(|(voice, steps)| {
            steps.iter().map(move |&step| SequencerMessage::SetStep {
                voice,
                step,
                on: true,
            })
        }))
    }
}

/// A complete patch for the demo host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchPreset {
    pub slopes: SlopesControls,
    pub formant: FormantControls,
    pub filter_bank: FilterBankControls,
    pub drums: DrumControls,
    pub sequencer: SequencerControls,
    pub quantizer: QuantizerControls,
    pub saturator: SaturatorControls,
    pub patterns: Patterns,
    /// Allowed pitch classes for the quantizer, 0 = C.
    pub scale: Vec<usize>,
}

impl Default for PatchPreset {
    fn default() -> Self {
        Self {
            slopes: SlopesControls {
                mode: SlopeMode::Cycle,
                time: 0.35,
                intone: 0.7,
                ..SlopesControls::default()
            },
            formant: FormantControls::default(),
            filter_bank: FilterBankControls::default(),
            drums: DrumControls::default(),
            sequencer: SequencerControls::default(),
            // slopes swing 0-8 V; keep the melody inside two octaves
            quantizer: QuantizerControls {
                depth: 0.25,
                ..QuantizerControls::default()
            },
            saturator: SaturatorControls::default(),
            patterns: Patterns::default(),
            // C minor pentatonic
            scale: vec![0, 3, 5, 7, 10],
        }
    }
}

impl PatchPreset {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn note_mask(&self) -> NoteMask {
        NoteMask::from_pitch_classes(&self.scale)
    }

    /// Split into per-module presets.
    pub fn presets(&self) -> [Preset; 7] {
        [
            Preset::Slopes(self.slopes),
            Preset::Formant(self.formant),
            Preset::FilterBank(self.filter_bank),
            Preset::Drums(self.drums),
            Preset::Sequencer(self.sequencer),
            Preset::Quantizer(self.quantizer),
            Preset::Saturator(self.saturator),
        ]
    }
}

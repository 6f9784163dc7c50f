/*
Pitch Quantizer
===============

Snaps a 1 V/octave control voltage to the nearest allowed pitch class.

  semitones   = volts · 12
  rounded     = nearest integer semitone
  pitch class = rounded mod 12   (0 = C … 11 = B)

If the rounded pitch class is not in the mask, search outward one semitone at
a time (up to a tritone) until an allowed neighbour turns up. When both
neighbours at the same distance are allowed, the side the input sits on wins,
so the result is always the nearest allowed note.

Depth scales the input before quantization and offset transposes it, also
before quantization, so the output always lands on the lattice.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::volts::{to_signal, to_volts},
    graph::{Module, Param, RenderCtx},
    io,
};

pub const OFFSET_MAX_VOLTS: f32 = 5.0;

const PITCH_CLASSES: usize = 12;
const ALL_NOTES: u16 = (1 << PITCH_CLASSES) - 1;
const MAJOR_STEPS: [usize; 7] = [0, 2, 4, 5, 7, 9, 11];
const MINOR_STEPS: [usize; 7] = [0, 2, 3, 5, 7, 8, 10];

/// Set of allowed pitch classes, bit `n` for pitch class `n`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteMask(u16);

impl NoteMask {
    pub const fn chromatic() -> Self {
        Self(ALL_NOTES)
    }

    pub const fn none() -> Self {
        Self(0)
    }

    /// Pitch classes outside 0–11 are ignored.
    pub fn from_pitch_classes(pitch_classes: &[usize]) -> Self {
        let mut mask = Self::none();
        for &pc in pitch_classes {
            mask.set(pc, true);
        }
        mask
    }

    pub fn major(root: usize) -> Self {
        Self::scale(root, &MAJOR_STEPS)
    }

    pub fn minor(root: usize) -> Self {
        Self::scale(root, &MINOR_STEPS)
    }

    fn scale(root: usize, steps: &[usize]) -> Self {
        let mut mask = Self::none();
        for step in steps {
            mask.set((root + step) % PITCH_CLASSES, true);
        }
        mask
    }

    #[inline]
    pub fn allows(&self, pitch_class: usize) -> bool {
        pitch_class < PITCH_CLASSES && self.0 & (1 << pitch_class) != 0
    }

    pub fn set(&mut self, pitch_class: usize, allowed: bool) {
        if pitch_class >= PITCH_CLASSES {
            return;
        }
        if allowed {
            self.0 |= 1 << pitch_class;
        } else {
            self.0 &= !(1 << pitch_class);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0 & ALL_NOTES == 0
    }

    pub fn bits(&self) -> u16 {
        self.0
    }
}

impl Default for NoteMask {
    fn default() -> Self {
        Self::chromatic()
    }
}

/// Quantize `volts` (1 V/octave) to the nearest pitch allowed by `mask`.
///
/// An empty mask behaves like a mask holding only C.
pub fn quantize(volts: f32, mask: &NoteMask) -> f32 {
    if !volts.is_finite() {
        return 0.0;
    }
    if mask.is_empty() {
        return volts.round();
    }

    let semitones = volts * PITCH_CLASSES as f32;
    let rounded = semitones.round();
    let pitch_class = (rounded as i32).rem_euclid(PITCH_CLASSES as i32) as usize;

    if mask.allows(pitch_class) {
        return rounded / PITCH_CLASSES as f32;
    }

    // ties go up when the fractional semitone is at least one half
    let above = semitones - semitones.floor() >= 0.5;
    for distance in 1..=PITCH_CLASSES / 2 {
        let up = mask.allows((pitch_class + distance) % PITCH_CLASSES);
        let down = mask.allows((pitch_class + PITCH_CLASSES - distance) % PITCH_CLASSES);
        let step = match (up, down) {
            (true, true) if above => distance as f32,
            (true, true) => -(distance as f32),
            (true, false) => distance as f32,
            (false, true) => -(distance as f32),
            (false, false) => continue,
        };
        return (rounded + step) / PITCH_CLASSES as f32;
    }

    // unreachable with a non-empty mask
    rounded / PITCH_CLASSES as f32
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizerControls {
    /// Input attenuation, 0–1.
    pub depth: f32,
    /// Transposition in volts, applied before quantization.
    pub offset: f32,
}

impl Default for QuantizerControls {
    fn default() -> Self {
        Self {
            depth: 1.0,
            offset: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QuantizerParams<'a> {
    pub depth: Param<'a>,
    pub offset: Param<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantizerMessage {
    SetNoteMask(NoteMask),
    SetNote { pitch_class: usize, allowed: bool },
}

/// One CV in, one quantized CV out.
pub struct Quantizer {
    mask: NoteMask,
}

impl Quantizer {
    /// Quantization is rate-independent; the context is taken for a uniform constructor.
    pub fn new(ctx: RenderCtx) -> Self {
        Self::with_mask(ctx, NoteMask::chromatic())
    }

    pub fn with_mask(_ctx: RenderCtx, mask: NoteMask) -> Self {
        Self { mask }
    }

    pub fn note_mask(&self) -> NoteMask {
        self.mask
    }
}

impl Module for Quantizer {
    type Controls = QuantizerControls;
    type Message = QuantizerMessage;
    type Params<'a> = QuantizerParams<'a>;

    const INPUTS: usize = 1;
    const OUTPUTS: usize = 1;

    fn params(controls: &QuantizerControls) -> QuantizerParams<'static> {
        QuantizerParams {
            depth: controls.depth.into(),
            offset: controls.offset.into(),
        }
    }

    fn process(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        params: &QuantizerParams<'_>,
    ) -> bool {
        for n in 0..io::frames(outputs) {
            let depth = params.depth.at(n).clamp(0.0, 1.0);
            let offset = params.offset.at(n).clamp(-OFFSET_MAX_VOLTS, OFFSET_MAX_VOLTS);
            let volts = to_volts(io::input(inputs, 0, n)) * depth + offset;
            io::write(outputs, 0, n, to_signal(quantize(volts, &self.mask)));
        }
        true
    }

    fn handle(&mut self, message: QuantizerMessage) {
        match message {
            QuantizerMessage::SetNoteMask(mask) => self.mask = mask,
            QuantizerMessage::SetNote {
                pitch_class,
                allowed,
            } => self.mask.set(pitch_class, allowed),
        }
    }

    fn reset(&mut self) {
        self.mask = NoteMask::chromatic();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ChannelBuffers;

    fn semitone(n: i32) -> f32 {
        n as f32 / 12.0
    }

    #[test]
    fn chromatic_rounds_to_nearest_semitone() {
        let mask = NoteMask::chromatic();
        assert_eq!(quantize(0.37, &mask), semitone(4));
        assert_eq!(quantize(-0.37, &mask), semitone(-4));
        assert_eq!(quantize(1.0, &mask), 1.0);
    }

    #[test]
    fn quantized_values_are_fixed_points() {
        let masks = [
            NoteMask::chromatic(),
            NoteMask::major(0),
            NoteMask::minor(9),
            NoteMask::from_pitch_classes(&[0]),
        ];
        for mask in &masks {
            for i in -600..600 {
                let once = quantize(i as f32 * 0.0137, mask);
                assert_eq!(quantize(once, mask), once);
            }
        }
    }

    #[test]
    fn only_c_snaps_to_an_octave() {
        let mask = NoteMask::from_pitch_classes(&[0]);
        for i in -500..500 {
            let volts = i as f32 * 0.0093;
            let out = quantize(volts, &mask);
            let semitones = (volts * 12.0).round() as i32;
            if semitones.rem_euclid(12) == 6 {
                // tritone: both octaves are six semitones away
                assert!(out == volts.floor() || out == volts.ceil(), "input {volts}");
            } else {
                assert_eq!(out, volts.round(), "input {volts}");
            }
        }
    }

    #[test]
    fn equal_distance_ties_follow_the_fractional_semitone() {
        // D rounds in from either side; C and E are both two semitones away
        let mask = NoteMask::from_pitch_classes(&[0, 4]);
        assert_eq!(quantize(semitone(2) * 1.2, &mask), semitone(0));
        assert_eq!(quantize(semitone(2) * 0.8, &mask), semitone(4));

        // C major: C# and F# sit between two allowed notes
        let mask = NoteMask::major(0);
        assert_eq!(quantize(semitone(1) + 0.01, &mask), semitone(0));
        assert_eq!(quantize(semitone(1) - 0.01, &mask), semitone(2));
        assert_eq!(quantize(semitone(6) + 0.02, &mask), semitone(5));
        assert_eq!(quantize(semitone(6) - 0.02, &mask), semitone(7));
    }

    #[test]
    fn lone_neighbour_wins_regardless_of_side() {
        let mask = NoteMask::from_pitch_classes(&[0, 5]);
        // E: F is one away, C four
        assert_eq!(quantize(semitone(4) - 0.01, &mask), semitone(5));
        assert_eq!(quantize(semitone(4) + 0.01, &mask), semitone(5));
    }

    #[test]
    fn one_sided_search_crosses_octaves() {
        let mask = NoteMask::from_pitch_classes(&[11]);
        assert_eq!(quantize(0.0, &mask), semitone(-1));
        assert_eq!(quantize(semitone(4), &mask), semitone(-1));
        assert_eq!(quantize(semitone(6) + 0.01, &mask), semitone(11));
    }

    #[test]
    fn empty_mask_falls_back_to_c() {
        let mask = NoteMask::none();
        assert!(mask.is_empty());
        assert_eq!(quantize(0.4, &mask), 0.0);
        assert_eq!(quantize(2.7, &mask), 3.0);
    }

    #[test]
    fn non_finite_input_is_silenced() {
        assert_eq!(quantize(f32::NAN, &NoteMask::chromatic()), 0.0);
        assert_eq!(quantize(f32::INFINITY, &NoteMask::chromatic()), 0.0);
    }

    #[test]
    fn mask_edits() {
        let mut mask = NoteMask::major(2);
        assert!(mask.allows(2) && mask.allows(6) && mask.allows(1));
        assert!(!mask.allows(0));
        mask.set(0, true);
        mask.set(2, false);
        mask.set(40, true);
        assert!(mask.allows(0) && !mask.allows(2));
        assert!(!mask.allows(40));
        assert_eq!(NoteMask::chromatic().bits(), 0x0fff);
    }

    #[test]
    fn module_applies_depth_and_offset_before_quantizing() {
        let mut quantizer = Quantizer::new(RenderCtx::new(48_000.0).unwrap());
        let mut input = ChannelBuffers::<1>::new();
        input.channel_mut(0).fill(to_signal(0.37));
        let mut output = ChannelBuffers::<1>::new();

        quantizer.process(
            &input.inputs(),
            &mut output.outputs(),
            &Quantizer::params(&QuantizerControls::default()),
        );
        assert!((to_volts(output.channel(0)[0]) - 4.0 / 12.0).abs() < 1e-6);

        // half depth plus a fifth: 0.185 + 7/12 lands on 9/12
        let controls = QuantizerControls {
            depth: 0.5,
            offset: 7.0 / 12.0,
        };
        quantizer.process(&input.inputs(), &mut output.outputs(), &Quantizer::params(&controls));
        assert!((to_volts(output.channel(0)[64]) - 9.0 / 12.0).abs() < 1e-6);
    }

    #[test]
    fn messages_edit_the_mask() {
        let mut quantizer = Quantizer::new(RenderCtx::new(48_000.0).unwrap());
        quantizer.handle(QuantizerMessage::SetNoteMask(NoteMask::from_pitch_classes(&[0, 7])));
        quantizer.handle(QuantizerMessage::SetNote {
            pitch_class: 4,
            allowed: true,
        });
        assert_eq!(quantizer.note_mask(), NoteMask::from_pitch_classes(&[0, 4, 7]));
        quantizer.reset();
        assert_eq!(quantizer.note_mask(), NoteMask::chromatic());
    }
}

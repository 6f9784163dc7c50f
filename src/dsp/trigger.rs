//! Gate and trigger detection.

/// Level a trigger or gate input has to exceed to count as high.
pub const TRIGGER_THRESHOLD: f32 = 0.1;

/// Rising-edge detector with a fixed threshold.
///
/// An edge is reported on the first sample above [`TRIGGER_THRESHOLD`] after
/// at least one sample at or below it. The detector starts low, so a signal
/// that is already high on the very first sample also counts as an edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeDetector {
    high: bool,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self { high: false }
    }

    /// Feed one sample; returns true on a rising edge.
    #[inline]
    pub fn rising(&mut self, sample: f32) -> bool {
        let high = is_high(sample);
        let edge = high && !self.high;
        self.high = high;
        edge
    }

    /// Whether the last sample was high (gate level).
    pub fn is_high(&self) -> bool {
        self.high
    }

    pub fn reset(&mut self) {
        self.high = false;
    }
}

#[inline]
pub fn is_high(sample: f32) -> bool {
    sample > TRIGGER_THRESHOLD
}

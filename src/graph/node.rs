use crate::error::{Error, Result};

/// Lowest sample rate a module can be built for.
pub const MIN_SAMPLE_RATE: f32 = 1_000.0;
/// Highest sample rate a module can be built for.
pub const MAX_SAMPLE_RATE: f32 = 768_000.0;

/// Context shared by every module instance.
///
/// Built once at construction; the sample rate is validated here so the
/// audio path can divide by it without checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCtx {
    pub sample_rate: f32,
}

impl RenderCtx {
    pub fn new(sample_rate: f32) -> Result<Self> {
        if !sample_rate.is_finite() || !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate)
        {
            return Err(Error::InvalidSampleRate(sample_rate));
        }
        tracing::debug!(sample_rate, "render context created");
        Ok(Self { sample_rate })
    }

    /// Seconds per sample.
    #[inline]
    pub fn sample_period(&self) -> f32 {
        1.0 / self.sample_rate
    }

    /// Highest frequency an oscillator is allowed to run at.
    #[inline]
    pub fn nyquist_limit(&self) -> f32 {
        self.sample_rate * 0.45
    }
}

/// Core trait for patchable modules.
///
/// A module owns all of its state, is driven one block at a time by the host,
/// and never allocates or blocks inside [`Module::process`].
///
/// Channel layout is fixed per module (`INPUTS`/`OUTPUTS`, order-significant).
/// Inputs that are missing or shorter than the block read as silence; output
/// channels that are missing are skipped. The block length is the length of
/// the shortest output buffer.
pub trait Module: Send {
    /// Snapshot of knob positions and switches. Cheap to copy across threads.
    type Controls: Copy + Default + Send + 'static;
    /// Discrete edits that are not knob positions (pattern steps, note masks).
    type Message: Send + 'static;
    /// Per-block view of the controls; fields may carry per-sample automation.
    type Params<'a>;

    const INPUTS: usize;
    const OUTPUTS: usize;

    /// Block-rate parameters built from a control snapshot.
    fn params(controls: &Self::Controls) -> Self::Params<'static>;

    /// Render one block. Returns whether the module wants to keep running,
    /// which is always the case: the host stops a module by not calling it.
    fn process(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        params: &Self::Params<'_>,
    ) -> bool;

    /// Apply a discrete edit. Called between blocks.
    ///
    /// Default implementation ignores the message.
    fn handle(&mut self, _message: Self::Message) {
        // Default: do nothing
    }

    /// Return to the freshly constructed state.
    fn reset(&mut self);
}

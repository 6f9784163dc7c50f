//! Control parameters: one value per block, or one per sample.

/// A control value as seen by [`Module::process`](crate::graph::node::Module::process).
///
/// `Automated` carries per-sample values supplied by the host for this block.
/// Samples past the end of the lane, and non-finite samples, read as the
/// block-start value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Param<'a> {
    Block(f32),
    Automated { start: f32, values: &'a [f32] },
}

impl<'a> Param<'a> {
    /// Automation lane whose fallback is its own first sample.
    pub fn automated(values: &'a [f32], fallback: f32) -> Self {
        let start = values.first().copied().filter(|v| v.is_finite()).unwrap_or(fallback);
        Param::Automated { start, values }
    }

    /// Value for sample `index` of the current block.
    #[inline]
    pub fn at(&self, index: usize) -> f32 {
        match *self {
            Param::Block(value) => value,
            Param::Automated { start, values } => match values.get(index) {
                Some(v) if v.is_finite() => *v,
                _ => start,
            },
        }
    }

    /// Value at the start of the block.
    #[inline]
    pub fn start(&self) -> f32 {
        match *self {
            Param::Block(value) => value,
            Param::Automated { start, .. } => start,
        }
    }
}

impl From<f32> for Param<'_> {
    fn from(value: f32) -> Self {
        Param::Block(value)
    }
}

impl Default for Param<'_> {
    fn default() -> Self {
        Param::Block(0.0)
    }
}

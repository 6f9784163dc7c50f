// Purpose - channel access for the per-block contract, host-side buffers

use crate::BLOCK_SIZE;

/// Sample `frame` of input `channel`; silence if the channel or frame is absent.
#[inline]
pub fn input(inputs: &[&[f32]], channel: usize, frame: usize) -> f32 {
    inputs
        .get(channel)
        .and_then(|c| c.get(frame))
        .copied()
        .unwrap_or(0.0)
}

/// Number of frames to render: the shortest output buffer, 0 without outputs.
#[inline]
pub fn frames(outputs: &[&mut [f32]]) -> usize {
    outputs.iter().map(|c| c.len()).min().unwrap_or(0)
}

/// Write `value` to output `channel` at `frame`, skipping absent channels.
#[inline]
pub fn write(outputs: &mut [&mut [f32]], channel: usize, frame: usize, value: f32) {
    if let Some(sample) = outputs.get_mut(channel).and_then(|c| c.get_mut(frame)) {
        *sample = value;
    }
}

/// Fixed-size, stack-allocated block buffers for hosts and tests.
#[derive(Debug, Clone)]
pub struct ChannelBuffers<const CHANNELS: usize> {
    data: [[f32; BLOCK_SIZE]; CHANNELS],
}

impl<const CHANNELS: usize> ChannelBuffers<CHANNELS> {
    pub fn new() -> Self {
        Self {
            data: [[0.0; BLOCK_SIZE]; CHANNELS],
        }
    }

    pub fn inputs(&self) -> [&[f32]; CHANNELS] {
        std::array::from_fn(|i| &self.data[i][..])
    }

    pub fn outputs(&mut self) -> [&mut [f32]; CHANNELS] {
        self.data.each_mut().map(|c| &mut c[..])
    }

    pub fn channel(&self, channel: usize) -> &[f32] {
        &self.data[channel]
    }

    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        &mut self.data[channel]
    }

    pub fn clear(&mut self) {
        for channel in self.data.iter_mut() {
            channel.fill(0.0);
        }
    }
}

impl<const CHANNELS: usize> Default for ChannelBuffers<CHANNELS> {
    fn default() -> Self {
        Self::new()
    }
}

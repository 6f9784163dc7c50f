//! Lock-free control handoff between a UI/controller thread and the audio thread.
//!
//! The controller owns a [`ModuleHandle`] and pushes control snapshots or
//! discrete messages into a single-producer/single-consumer ring buffer. The
//! audio thread owns the [`SharedModule`], which drains the queue at the start
//! of every block and then renders with the latest snapshot, so a block never
//! sees a half-applied update and the audio path never waits on a lock.

use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    error::{Error, Result},
    graph::node::Module,
};

/// Default number of pending updates a handle can queue.
pub const CONTROL_QUEUE_SIZE: usize = 64;

/// An update travelling from the controller to the audio thread.
#[derive(Debug, Clone)]
pub enum Control<C, M> {
    /// Replace the whole control snapshot (knob positions, modes, presets).
    Preset(C),
    /// Discrete edit forwarded to [`Module::handle`].
    Message(M),
}

/// Controller-side end of the queue.
pub struct ModuleHandle<M: Module> {
    tx: Producer<Control<M::Controls, M::Message>>,
}

impl<M: Module> ModuleHandle<M> {
    /// Queue a new control snapshot. Returns false if the queue is full.
    pub fn set_controls(&mut self, controls: M::Controls) -> bool {
        self.push(Control::Preset(controls))
    }

    /// Queue a discrete message. Returns false if the queue is full.
    pub fn send(&mut self, message: M::Message) -> bool {
        self.push(Control::Message(message))
    }

    /// Free slots left in the queue.
    pub fn slots(&self) -> usize {
        self.tx.slots()
    }

    fn push(&mut self, control: Control<M::Controls, M::Message>) -> bool {
        match self.tx.push(control) {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!("control queue full, update dropped");
                false
            }
        }
    }
}

/// Audio-side owner of a module and its current control snapshot.
pub struct SharedModule<M: Module> {
    module: M,
    controls: M::Controls,
    rx: Consumer<Control<M::Controls, M::Message>>,
}

impl<M: Module> SharedModule<M> {
    pub fn new(module: M, controls: M::Controls, capacity: usize) -> Result<(Self, ModuleHandle<M>)> {
        if capacity == 0 {
            return Err(Error::QueueCapacity);
        }

        let (tx, rx) = RingBuffer::new(capacity);
        let shared = Self {
            module,
            controls,
            rx,
        };

        Ok((shared, ModuleHandle { tx }))
    }

    /// Apply queued updates, then render one block with block-rate parameters.
    pub fn process(&mut self, inputs: &[&[f32]], outputs: &mut [&mut [f32]]) -> bool {
        self.apply_pending();
        let params = M::params(&self.controls);
        self.module.process(inputs, outputs, &params)
    }

    /// Drain the queue without rendering.
    pub fn apply_pending(&mut self) {
        while let Ok(control) = self.rx.pop() {
            match control {
                Control::Preset(controls) => self.controls = controls,
                Control::Message(message) => self.module.handle(message),
            }
        }
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut M {
        &mut self.module
    }

    pub fn controls(&self) -> &M::Controls {
        &self.controls
    }
}

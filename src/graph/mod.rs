//! The host-facing contract shared by all modules.
//!
//! A host creates modules with a [`RenderCtx`], calls [`Module::process`] once
//! per block in a fixed producer-before-consumer order, and feeds control
//! changes through [`shared`] so they land between blocks.

/// `RenderCtx` and the `Module` trait.
pub mod node;
/// Block-rate or per-sample control values.
pub mod param;
/// SPSC control queue wrapping a module.
#[cfg(feature = "rtrb")]
pub mod shared;

pub use node::{Module, RenderCtx};
pub use param::Param;
#[cfg(feature = "rtrb")]
pub use shared::{Control, ModuleHandle, SharedModule};

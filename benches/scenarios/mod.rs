//! Module-level benchmarks.
//!
//! Modules render fixed `BLOCK_SIZE` blocks, so these measure one block per
//! iteration rather than sweeping buffer sizes.

mod chain;
mod modules;

pub use chain::bench_chain;
pub use modules::bench_modules;

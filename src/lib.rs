//! hexstack (workspace facade crate).
//!
//! Re-exports the member crates under `hexstack::{core,engine,types}` so that
//! binaries, tests and benches depend on a single package.

pub use hexstack_core as core;
pub use hexstack_engine as engine;
pub use hexstack_types as types;

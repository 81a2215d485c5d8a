//! BlockRiser (workspace facade crate).
//!
//! Re-exports the member crates as `block_riser::{core, engine, save, types}`
//! and hosts the headless autoplay runner used by the binary.

pub mod autoplay;

pub use block_riser_core as core;
pub use block_riser_engine as engine;
pub use block_riser_save as save;
pub use block_riser_types as types;

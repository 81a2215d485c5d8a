//! Placement search over the queue: phantom previews and best-move hints.

pub mod place;

pub use block_riser_core as core;
pub use block_riser_types as types;

pub use place::{apply_hint, best_move, evaluate, preview, Hint, Preview};

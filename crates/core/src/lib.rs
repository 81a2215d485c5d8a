//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains all the puzzle rules, session state and resolution
//! logic. It has **no dependencies** on rendering, audio, input or storage:
//!
//! - **Deterministic**: every random decision goes through an injected
//!   [`rand::Rng`]; the same seed replays the same run
//! - **Clock-driven**: delayed steps run from [`GameSession::tick`], never
//!   from real timers
//! - **Value snapshots**: the board is a fixed array, undo copies it outright
//!
//! # Module Structure
//!
//! - [`board`]: 8x8 grid of optional cells, placement validation and mutation
//! - [`pieces`]: the shape catalog, palettes and queue pieces
//! - [`factory`]: piece generation with level-gated special kinds
//! - [`queue`]: the 1-3 pending pieces
//! - [`clear`]: full-line detection and per-kind resolution
//! - [`scoring`]: combo/streak formulas, coins, levels, frenzy and leagues
//! - [`goal`]: adventure catalog and goal tracker
//! - [`snapshot`]: undo manager and render snapshot
//! - [`scheduler`]: simulated clock and the `Idle`/`Resolving` phase
//! - [`profile`]: lifetime stats, shop, achievements and leaderboard
//! - [`game_state`]: the session controller
//!
//! # Example
//!
//! ```
//! use block_riser_core::{GameSession, Piece, Profile, SessionConfig};
//! use block_riser_types::Color;
//!
//! let mut game = GameSession::new(SessionConfig::default(), Profile::default());
//!
//! // Script the first slot and place it in the corner
//! game.queue_mut()
//!     .set_slots(&[Some(Piece::named("3x1", Color(0xFF3366))), None, None]);
//! let outcome = game.place_piece(0, 0, 0).unwrap();
//!
//! assert_eq!(outcome.cells, 3);
//! assert_eq!(game.score(), 30); // 3 cells x 10 x level 1
//! ```
//!
//! # Timing
//!
//! - **Clear resolve**: 250ms between detecting full lines and committing them
//! - **Zen refresh**: 1000ms between running out of moves and the board wipe
//! - **Market events**: 30s bull market, 20s tax haven
//!
//! Call [`GameSession::tick`](game_state::GameSession::tick) every frame with elapsed time.

pub mod board;
pub mod clear;
pub mod error;
pub mod factory;
pub mod game_state;
pub mod goal;
pub mod pieces;
pub mod profile;
pub mod queue;
pub mod rng;
pub mod scheduler;
pub mod scoring;
pub mod snapshot;

pub use block_riser_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use clear::{ClearLines, Resolution};
pub use error::ActionError;
pub use factory::build_piece;
pub use game_state::{GameSession, PlaceOutcome, SessionConfig, SessionState, SessionStats};
pub use goal::{adventure_level, AdventureLevel, GoalCounters, GoalStatus, GoalTracker, ADVENTURE_LEVELS};
pub use pieces::{Piece, PieceDescriptor, Shape, ShapeId, SHAPES};
pub use profile::{GlobalStats, Leaderboard, LeaderboardEntry, Profile, ACHIEVEMENTS};
pub use queue::PieceQueue;
pub use rng::{RngPosition, SimpleRng};
pub use scheduler::{Phase, Scheduler, Step};
pub use scoring::{calculate_level, line_clear_points, Frenzy, League};
pub use snapshot::{GameSnapshot, QueueDescriptors, UndoManager, UndoSnapshot};

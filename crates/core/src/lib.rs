//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the rules of the hex stacking puzzle: the board, the
//! cascade resolver, scoring and the game session. It has **no** timing, UI or
//! I/O of its own beyond reading a rules file, which makes it:
//!
//! - **Deterministic**: Same rules, seed and moves produce identical games
//! - **Testable**: Every rule is reachable from plain function calls
//! - **Portable**: Any driver (paced, headless, benchmark) can step it
//!
//! # Module Structure
//!
//! - [`board`]: Hexagonal board of chip stacks and obstacle cells
//! - [`queue`]: Deduplicating FIFO of coordinates awaiting resolution
//! - [`cascade`]: Step-wise resolver (gather, pump-and-dump, eliminate)
//! - [`failsafe`]: Full-board sweep once the local cascade drains
//! - [`scoring`]: Elimination points, combos and the win signal
//! - [`rng`]: Seeded pile dealer
//! - [`config`]: Rules loaded from JSON and environment overrides
//! - [`game_state`]: One session: hand, moves, colors, win/loss
//! - [`snapshot`]: Serializable view of a session
//!
//! # Resolution Rules
//!
//! - A placement seeds the queue with the placed cell.
//! - A cell with no matching neighbor stays put and eliminates its top run
//!   once it reaches 10 chips.
//! - Otherwise the hub and each matching neighbor are scored as the merge
//!   destination; the hub wins ties.
//! - After at most 100 steps the pass stops, even mid-cascade.
//!
//! # Example
//!
//! ```
//! use hexstack_core::{GameState, RulesConfig};
//! use hexstack_core::types::Hex;
//!
//! let mut game = GameState::new(RulesConfig::default(), 12345).unwrap();
//! let cascade = game.commit_pile(0, Hex::ORIGIN).unwrap();
//! let resolution = game.resolve(cascade);
//!
//! assert!(resolution.steps >= 1);
//! assert_eq!(game.moves(), 1);
//! ```

pub mod board;
pub mod cascade;
pub mod config;
pub mod failsafe;
pub mod game_state;
pub mod queue;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use hexstack_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, BoardError, Cell};
pub use cascade::{
    choose_destination, destination_scores, resolve, Candidate, Cascade, CascadeError, Resolution,
    StepAction, StepReport, Termination,
};
pub use config::{ConfigError, ObstaclePlacement, RulesConfig};
pub use game_state::{GameState, GameStatus};
pub use queue::ResolutionQueue;
pub use rng::{Pile, PileDealer, SimpleRng};
pub use scoring::{elimination_points, EliminationScore, ScoreTracker};
pub use snapshot::{CellSnapshot, GameSnapshot};

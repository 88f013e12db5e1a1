// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Space Explore: a single-player, turn-based exploration game engine.
//!
//! A ship crosses a grid of hidden star systems, reveals them, collects
//! faction totems from per-color racks and races the turn limit to reach its
//! home capital with a winning set.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   CLI clients (play, board, run)    │
//! ├─────────────────────────────────────┤
//! │   GameEngine: commands & snapshot   │
//! ├─────────────────────────────────────┤
//! │  Board · Racks · Scoring · Pathing  │
//! └─────────────────────────────────────┘
//! ```
//!
//! ```
//! use std::time::Instant;
//! use space_explore::{Command, GameConfig, GameEngine};
//!
//! let mut engine = GameEngine::new(GameConfig::default(), 42).unwrap();
//! engine.setup_game().unwrap();
//! let outcome = engine.apply(Command::EndTurn, Instant::now()).unwrap();
//! assert_eq!(engine.turn(), 2);
//! assert!(!outcome.is_game_over());
//! ```

pub mod error;
pub mod game;

pub use error::{ActionError, ActionResult, CommandParseError, ConfigError, SetupError};

// Re-export key game types at crate root for convenience
pub use game::{
    Board, Cell, Command, Direction, Faction, GameConfig, GameEngine, GameOutcome, GameSnapshot,
    Outcome, Phase, SystemColor,
};

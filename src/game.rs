//! Turn engine for Space Explore.
//!
//! Implements the game rules:
//! - Board generation and the multi-cell system index
//! - Single-step movement and breadth-first pathfinding
//! - Per-color racks of totems and rotating faction cards
//! - The per-turn action state machine and the timed observer reveal
//! - Scoring and victory evaluation

mod board;
mod catalog;
mod command;
mod config;
mod invariants;
mod mapgen;
mod path;
mod player;
mod rack;
mod rng;
mod scoring;
mod snapshot;
mod state;

pub use board::{Board, Cell, StarSystem, SystemBlueprint, SystemId, SystemKind};
pub use catalog::{Faction, FactionCatalog, FactionInfo, SystemColor};
pub use command::{Command, Outcome, parse_script};
pub use config::{DistributionTable, GameConfig};
pub use invariants::{InvariantViolation, assert_invariants, check_invariants};
pub use mapgen::{
    BoardLayout, Placement, candidate_anchors, doubled_center_distance, generate_board,
    respects_distance,
};
pub use path::{Direction, find_path};
pub use player::{Player, PlayerId, Ship};
pub use rack::{FactionCard, Rack, Racks, Totem};
pub use rng::GameRng;
pub use scoring::{ScoreBreakdown, VictoryCondition, calculate_score, check_victory};
pub use snapshot::{GameSnapshot, RackView, ShipView, SystemView, TotemView};
pub use state::{
    ActionFlags, Announcement, GameEngine, GameOutcome, Observation, OutcomeReason, Phase,
    STEP_COST,
};

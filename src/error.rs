//! Error types for the exploration engine.
//!
//! Three tiers, matching how failures are handled:
//! - [`ConfigError`]: bad configuration data, fatal at engine construction.
//! - [`SetupError`]: the board could not host a game, fatal at game start.
//! - [`ActionError`]: a rejected player command, recoverable and side-effect free.

use std::path::PathBuf;

use crate::game::{Cell, Faction, Phase, SystemColor};

/// Errors raised while loading or validating a [`GameConfig`](crate::game::GameConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for this schema.
    #[error("failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The distribution table names a faction the catalog does not define.
    #[error("faction {faction} used by the {color} rack is missing from the faction catalog")]
    UnknownFaction {
        /// Faction that is missing.
        faction: Faction,
        /// Rack that referenced it.
        color: SystemColor,
    },

    /// A faction appears more than once in the catalog.
    #[error("faction {0} is defined twice in the faction catalog")]
    DuplicateFaction(Faction),

    /// A numeric setting is outside its valid range.
    #[error("invalid setting `{field}`: {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Errors that abort game setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    /// Board generation could not seat a single system.
    #[error("no systems could be placed, cannot assign a starting position")]
    NoSystemsPlaced,

    /// The board dimensions cannot host a single footprint.
    #[error("board size {size} cannot host footprint {footprint}")]
    InvalidBoard {
        /// Requested board side length.
        size: u16,
        /// Requested footprint side length.
        footprint: u16,
    },

    /// `setup_game` was called on an engine that is already set up.
    #[error("game already set up (phase {0:?})")]
    AlreadySetUp(Phase),
}

/// Reasons a player command was rejected.
///
/// Every rejection leaves the engine state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// Commands are only accepted during the player's turn.
    #[error("command not accepted in phase {0:?}")]
    WrongPhase(Phase),

    /// The per-turn action has already been used.
    #[error("{0} already used this turn")]
    AlreadyUsed(&'static str),

    /// The target cell lies outside the board.
    #[error("cell {0} is outside the board")]
    OutOfBounds(Cell),

    /// The step would stay inside the same system footprint.
    #[error("cannot move between two cells of the same system")]
    IntraSystemMove,

    /// Not enough movement points remain for the step.
    #[error("step costs {cost} movement points, {remaining} remaining")]
    InsufficientMovement {
        /// Cost of the requested step.
        cost: u32,
        /// Points left this turn.
        remaining: u32,
    },

    /// The ship is not on a revealed system.
    #[error("ship is not on a revealed system")]
    NotOnRevealedSystem,

    /// Influence requires a revealed capital.
    #[error("ship is not on a revealed capital system")]
    NotOnCapital,

    /// The rack for this color has no faction cards.
    #[error("the {0} rack has no faction card")]
    NoActiveCard(SystemColor),

    /// The rack holds no totem of the active faction.
    #[error("the {color} rack holds no totem of faction {faction}")]
    NoMatchingTotem {
        /// Rack color.
        color: SystemColor,
        /// Currently active faction.
        faction: Faction,
    },

    /// Influence needs at least two cards to rotate.
    #[error("the {0} rack has too few cards to rotate")]
    NotEnoughCards(SystemColor),

    /// The player's inventory is full.
    #[error("inventory full ({capacity} totems)")]
    InventoryFull {
        /// Inventory capacity.
        capacity: usize,
    },

    /// The player holds no totems.
    #[error("inventory is empty")]
    InventoryEmpty,

    /// The requested inventory slot does not exist.
    #[error("no totem at inventory slot {index} (holding {held})")]
    NoSuchTotem {
        /// Requested slot.
        index: usize,
        /// Number of totems held.
        held: usize,
    },

    /// Observer mode is already armed.
    #[error("observer already armed")]
    ObserverAlreadyArmed,

    /// A target was supplied without arming the observer first.
    #[error("observer not armed")]
    ObserverNotArmed,

    /// A transient reveal is still running.
    #[error("an observation is already in progress")]
    ObservationInFlight,

    /// Every system on the board is already revealed.
    #[error("no hidden system to observe")]
    NoHiddenSystem,

    /// The observer target is not a hidden system.
    #[error("cell {0} is not a hidden system")]
    InvalidObserverTarget(Cell),
}

/// Errors from parsing the text command syntax.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandParseError {
    /// The verb is not recognised.
    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    /// The argument after `:` is malformed.
    #[error("invalid argument for `{verb}`: `{arg}`")]
    InvalidArgument {
        /// Command verb.
        verb: String,
        /// Offending argument text.
        arg: String,
    },
}

/// Result type for player commands.
pub type ActionResult<T> = Result<T, ActionError>;

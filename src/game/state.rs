//! The turn engine.
//!
//! [`GameEngine`] exclusively owns the board, the racks and the player. All
//! player input arrives as [`Command`]s through [`GameEngine::apply`]; every
//! command either succeeds completely or is rejected with an [`ActionError`]
//! and leaves the state untouched.
//!
//! Lifecycle: `Running` (constructed, not set up) -> `PlayerTurn` (re-entered
//! at every turn start) -> `GameOver` (terminal).

use std::fmt;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ActionError, ActionResult, ConfigError, SetupError};
use crate::game::{
    Board, BoardLayout, Cell, Command, Direction, Faction, GameConfig, GameRng,
    Outcome, Player, Racks, ScoreBreakdown, SystemBlueprint, SystemColor, SystemId,
    VictoryCondition, calculate_score, check_victory, generate_board,
};

/// Movement points spent per step.
pub const STEP_COST: u32 = 1;

/// Engine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    /// Constructed; `setup_game` has not run yet.
    Running,
    /// Accepting player commands.
    PlayerTurn,
    /// Terminal.
    GameOver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Running => "running",
            Phase::PlayerTurn => "player turn",
            Phase::GameOver => "game over",
        };
        f.write_str(name)
    }
}

/// Per-turn "used" flags, cleared at every turn start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionFlags {
    /// Movement ended by entering a system.
    pub moved: bool,
    /// Collect succeeded.
    pub collected: bool,
    /// Deposit succeeded.
    pub deposited: bool,
    /// Influence succeeded.
    pub influenced: bool,
    /// Observer revealed a system.
    pub observed: bool,
}

/// A transient observer reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    /// The temporarily revealed system.
    pub system: SystemId,
    /// When the reveal started.
    pub started_at: Instant,
    /// When `tick` hides the system again.
    pub expires_at: Instant,
}

/// The most recent faction-card announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Announcement {
    /// Rack whose active card was announced.
    pub color: SystemColor,
    /// Active faction, or `None` if the rack has no cards.
    pub faction: Option<Faction>,
    /// Turn of the announcement (0 during setup).
    pub turn: u32,
}

/// Why the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeReason {
    /// The turn counter passed the configured maximum.
    TurnLimit,
    /// The player reached the origin capital while satisfying a predicate.
    Victory(VictoryCondition),
}

/// Final result, recorded once on entering [`Phase::GameOver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameOutcome {
    /// Why the game ended.
    pub reason: OutcomeReason,
    /// Base score plus totem score at the end.
    pub final_score: u32,
    /// Totem score at the end.
    pub breakdown: ScoreBreakdown,
    /// Completed turns.
    pub turns_played: u32,
}

/// Single-player turn engine.
#[derive(Debug)]
pub struct GameEngine {
    config: GameConfig,
    rng: GameRng,
    board: Board,
    racks: Racks,
    initial_totems: usize,
    player: Option<Player>,
    phase: Phase,
    turn: u32,
    flags: ActionFlags,
    observer_armed: bool,
    observation: Option<Observation>,
    origin_anchor: Option<Cell>,
    unplaced: Vec<SystemBlueprint>,
    announcement: Option<Announcement>,
    outcome: Option<GameOutcome>,
}

impl GameEngine {
    /// Validate `config` and build the racks.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is inconsistent.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = GameRng::new(seed);
        let racks = Racks::from_config(&config, &mut rng)?;
        let board = Board::new(config.board_size, config.footprint).ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "footprint",
                reason: format!("does not fit on a {} board", config.board_size),
            }
        })?;
        let initial_totems = racks.totem_count();

        Ok(Self {
            config,
            rng,
            board,
            racks,
            initial_totems,
            player: None,
            phase: Phase::Running,
            turn: 0,
            flags: ActionFlags::default(),
            observer_armed: false,
            observation: None,
            origin_anchor: None,
            unplaced: Vec::new(),
            announcement: None,
            outcome: None,
        })
    }

    /// Set up a game with a random player color.
    ///
    /// # Errors
    ///
    /// See [`GameEngine::setup_game_as`].
    pub fn setup_game(&mut self) -> Result<(), SetupError> {
        let color = self.rng.choose(&SystemColor::ALL).copied().unwrap_or(SystemColor::Yellow);
        self.setup_game_as(color)
    }

    /// Set up a game for a player of `color` and start turn 1.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::AlreadySetUp`] on a second call and
    /// [`SetupError::NoSystemsPlaced`] if the generator seats nothing.
    pub fn setup_game_as(&mut self, color: SystemColor) -> Result<(), SetupError> {
        if self.player.is_some() {
            return Err(SetupError::AlreadySetUp(self.phase));
        }
        info!(seed = self.rng.seed(), %color, "setting up game");

        let mut systems: Vec<SystemBlueprint> = SystemColor::ALL
            .iter()
            .map(|&capital| SystemBlueprint::capital(capital, capital == color))
            .collect();
        for _ in 0..self.config.planet_count {
            if let Some(&planet) = self.rng.choose(&SystemColor::ALL) {
                systems.push(SystemBlueprint::planet(planet));
            }
        }

        let placement = generate_board(&BoardLayout::from(&self.config), systems, &mut self.rng)?;
        if placement.board.systems().is_empty() {
            return Err(SetupError::NoSystemsPlaced);
        }

        let board = placement.board;
        let origin_anchor = board
            .systems()
            .iter()
            .find(|system| system.is_origin())
            .map(|system| system.anchor);
        if origin_anchor.is_none() {
            warn!(%color, "origin capital was not placed, victory is unreachable");
        }

        let start_index = self.rng.gen_range_usize(0..board.systems().len());
        let start = board.systems()[start_index];

        self.board = board;
        self.unplaced = placement.unplaced;
        self.origin_anchor = origin_anchor;
        self.player = Some(Player::new(
            0,
            color,
            start.anchor,
            self.config.movement_points_per_turn,
            self.config.inventory_capacity,
            self.config.starting_base_score,
        ));
        self.board.reveal(start.anchor);
        info!(anchor = %start.anchor, system_color = %start.color, "ship placed");
        self.announce(start.color);

        self.start_turn();
        Ok(())
    }

    fn start_turn(&mut self) -> Outcome {
        self.turn += 1;
        if let Some(player) = self.player.as_mut() {
            player.ship.reset_movement();
        }
        self.flags = ActionFlags::default();
        self.observer_armed = false;
        if let Some(observation) = self.observation.take() {
            self.board.set_revealed(observation.system, false);
            info!(system = %observation.system, "observation cleared at turn start");
        }
        self.phase = Phase::PlayerTurn;
        info!(turn = self.turn, max_turns = self.config.max_turns, "turn started");

        match self.check_game_over() {
            Some(outcome) => Outcome::GameOver {
                final_score: outcome.final_score,
                victory: match outcome.reason {
                    OutcomeReason::Victory(condition) => Some(condition),
                    OutcomeReason::TurnLimit => None,
                },
            },
            None => Outcome::TurnStarted(self.turn),
        }
    }

    /// Evaluate termination; enters [`Phase::GameOver`] at most once.
    ///
    /// Runs at every turn start. Returns the recorded outcome once the game
    /// is over.
    pub fn check_game_over(&mut self) -> Option<GameOutcome> {
        if self.phase == Phase::GameOver {
            return self.outcome;
        }
        let player = self.player.as_ref()?;

        let reason = if self.turn > self.config.max_turns {
            OutcomeReason::TurnLimit
        } else {
            let on_origin = self.board.system_at(player.ship.position).is_some_and(|system| {
                system.is_capital() && system.color == player.origin_color
            });
            if !on_origin {
                return None;
            }
            OutcomeReason::Victory(check_victory(player.inventory(), &self.config)?)
        };

        let breakdown = calculate_score(player.inventory(), &self.config);
        let outcome = GameOutcome {
            reason,
            final_score: player.base_score().saturating_add(breakdown.total),
            breakdown,
            turns_played: self.turn.saturating_sub(1),
        };
        info!(
            reason = ?outcome.reason,
            final_score = outcome.final_score,
            turns = outcome.turns_played,
            "game over"
        );
        self.phase = Phase::GameOver;
        self.observer_armed = false;
        self.outcome = Some(outcome);
        self.outcome
    }

    /// Apply one command.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason; rejected commands change nothing.
    pub fn apply(&mut self, command: Command, now: Instant) -> ActionResult<Outcome> {
        let result = match command {
            Command::Move(direction) => self.move_ship(direction),
            Command::Collect => self.collect(),
            Command::Deposit(index) => self.deposit(index),
            Command::Influence => self.influence(),
            Command::ObserverArm => self.observer_arm(),
            Command::ObserverTarget(cell) => self.observer_target(cell, now),
            Command::ObserverCancel => self.observer_cancel(),
            Command::EndTurn => self.end_turn(),
        };
        if let Err(err) = &result {
            debug!(%command, %err, "command rejected");
        }
        result
    }

    /// Apply the end-turn penalty and start the next turn.
    ///
    /// # Errors
    ///
    /// Only valid during [`Phase::PlayerTurn`].
    pub fn end_turn(&mut self) -> ActionResult<Outcome> {
        self.ensure_turn()?;
        let penalty = self.config.end_turn_penalty;
        if let Some(player) = self.player.as_mut() {
            player.apply_penalty(penalty);
            info!(turn = self.turn, penalty, base_score = player.base_score(), "turn ended");
        }
        Ok(self.start_turn())
    }

    /// Take one step in `direction`.
    ///
    /// Entering a system ends movement for the turn, reveals the system and
    /// announces its rack's active card.
    ///
    /// # Errors
    ///
    /// Rejects steps off the board, steps between two cells of one system,
    /// steps without enough points, and any step after movement ended.
    pub fn move_ship(&mut self, direction: Direction) -> ActionResult<Outcome> {
        self.ensure_turn()?;
        if self.flags.moved {
            return Err(ActionError::AlreadyUsed("move"));
        }
        let player = self.player.as_mut().ok_or(ActionError::WrongPhase(self.phase))?;

        let from = player.ship.position;
        let to = direction.step(from);
        if !self.board.in_bounds(to) {
            return Err(ActionError::OutOfBounds(to));
        }
        if self.board.same_system(from, to) {
            return Err(ActionError::IntraSystemMove);
        }
        player.ship.step(to, STEP_COST)?;

        let entered = self.board.system_id_at(to);
        if let Some(id) = entered {
            player.ship.halt();
            self.flags.moved = true;
            self.board.reveal(to);
            if self.observation.is_some_and(|observation| observation.system == id) {
                self.observation = None;
                info!(system = %id, "observed system entered, reveal is now permanent");
            }
        }
        let remaining = player.ship.movement_points();
        info!(%to, remaining, direction = direction.label(), "ship moved");

        if let Some(system) = entered.and_then(|id| self.board.system(id)) {
            let color = system.color;
            info!(%color, kind = ?system.kind, "entered system, movement ends");
            self.announce(color);
        }

        Ok(Outcome::Moved {
            to,
            remaining,
            entered,
        })
    }

    /// Take the active faction's totem from the current system's rack.
    ///
    /// # Errors
    ///
    /// Requires a revealed system, an active card, a matching totem and room
    /// in the inventory.
    pub fn collect(&mut self) -> ActionResult<Outcome> {
        self.ensure_turn()?;
        if self.flags.collected {
            return Err(ActionError::AlreadyUsed("collect"));
        }
        let player = self.player.as_mut().ok_or(ActionError::WrongPhase(self.phase))?;
        let color = revealed_color_at(&self.board, player.ship.position)?;

        let rack = self.racks.get_mut(color);
        let card = rack.active_card().ok_or(ActionError::NoActiveCard(color))?;
        let no_match = ActionError::NoMatchingTotem {
            color,
            faction: card.faction,
        };
        let index = rack.find_totem(card.faction).ok_or(no_match)?;
        if !player.has_room() {
            return Err(ActionError::InventoryFull {
                capacity: player.capacity(),
            });
        }
        let totem = rack.take_totem(index).ok_or(no_match)?;
        let (faction, value) = (totem.faction(), totem.value());
        if let Err(totem) = player.add_totem(totem) {
            rack.put_totem(totem);
            return Err(ActionError::InventoryFull {
                capacity: player.capacity(),
            });
        }
        info!(%faction, %color, value, "collected totem");

        self.flags.collected = true;
        Ok(Outcome::Collected { faction, color })
    }

    /// Return a held totem (the first by default) to the current system's rack.
    ///
    /// # Errors
    ///
    /// Requires a non-empty inventory, a valid slot and a revealed system.
    pub fn deposit(&mut self, index: Option<usize>) -> ActionResult<Outcome> {
        self.ensure_turn()?;
        if self.flags.deposited {
            return Err(ActionError::AlreadyUsed("deposit"));
        }
        let player = self.player.as_mut().ok_or(ActionError::WrongPhase(self.phase))?;
        if player.inventory().is_empty() {
            return Err(ActionError::InventoryEmpty);
        }
        let color = revealed_color_at(&self.board, player.ship.position)?;

        let totem = player.remove_totem(index.unwrap_or(0))?;
        let faction = totem.faction();
        info!(%totem, rack = %color, "deposited totem");
        self.racks.get_mut(color).put_totem(totem);

        self.flags.deposited = true;
        Ok(Outcome::Deposited { faction, color })
    }

    /// Rotate the current capital's card queue and announce the new card.
    ///
    /// # Errors
    ///
    /// Requires a revealed capital whose rack holds at least two cards.
    pub fn influence(&mut self) -> ActionResult<Outcome> {
        self.ensure_turn()?;
        if self.flags.influenced {
            return Err(ActionError::AlreadyUsed("influence"));
        }
        let player = self.player.as_ref().ok_or(ActionError::WrongPhase(self.phase))?;
        let color = self
            .board
            .system_at(player.ship.position)
            .filter(|system| system.revealed && system.is_capital())
            .map(|system| system.color)
            .ok_or(ActionError::NotOnCapital)?;

        let rack = self.racks.get_mut(color);
        if rack.card_count() <= 1 {
            return Err(ActionError::NotEnoughCards(color));
        }
        let card = rack.rotate().ok_or(ActionError::NoActiveCard(color))?;
        info!(%card, "influenced rack");
        self.announce(color);

        self.flags.influenced = true;
        Ok(Outcome::Influenced(card))
    }

    /// Enter observer selection.
    ///
    /// # Errors
    ///
    /// Rejected once the observer was used this turn, while a reveal is in
    /// flight, while already armed, or when nothing is hidden.
    pub fn observer_arm(&mut self) -> ActionResult<Outcome> {
        self.ensure_turn()?;
        if self.flags.observed {
            return Err(ActionError::AlreadyUsed("observe"));
        }
        if self.observation.is_some() {
            return Err(ActionError::ObservationInFlight);
        }
        if self.observer_armed {
            return Err(ActionError::ObserverAlreadyArmed);
        }
        if self.board.hidden_count() == 0 {
            return Err(ActionError::NoHiddenSystem);
        }
        self.observer_armed = true;
        info!("observer armed");
        Ok(Outcome::ObserverArmed)
    }

    /// Reveal the hidden system at `cell` until the observer timer expires.
    ///
    /// # Errors
    ///
    /// An invalid target keeps the observer armed and the action unused.
    pub fn observer_target(&mut self, cell: Cell, now: Instant) -> ActionResult<Outcome> {
        self.ensure_turn()?;
        if !self.observer_armed {
            return Err(ActionError::ObserverNotArmed);
        }
        let id = self
            .board
            .system_id_at(cell)
            .filter(|&id| self.board.system(id).is_some_and(|system| !system.revealed))
            .ok_or(ActionError::InvalidObserverTarget(cell))?;

        self.board.set_revealed(id, true);
        self.observation = Some(Observation {
            system: id,
            started_at: now,
            expires_at: now + self.config.observer_duration(),
        });
        self.observer_armed = false;
        self.flags.observed = true;
        info!(system = %id, %cell, "observing system");
        Ok(Outcome::Observing(id))
    }

    /// Leave observer selection; the action stays available this turn.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::ObserverNotArmed`] if selection is not active.
    pub fn observer_cancel(&mut self) -> ActionResult<Outcome> {
        self.ensure_turn()?;
        if !self.observer_armed {
            return Err(ActionError::ObserverNotArmed);
        }
        self.observer_armed = false;
        info!("observer cancelled");
        Ok(Outcome::ObserverCancelled)
    }

    /// Poll the observer timer. Returns the system hidden again, if any.
    pub fn tick(&mut self, now: Instant) -> Option<SystemId> {
        let observation = self.observation?;
        if now < observation.expires_at {
            return None;
        }
        self.board.set_revealed(observation.system, false);
        self.observation = None;
        info!(system = %observation.system, "observation expired");
        Some(observation.system)
    }

    fn ensure_turn(&self) -> ActionResult<()> {
        if self.phase == Phase::PlayerTurn && self.player.is_some() {
            Ok(())
        } else {
            Err(ActionError::WrongPhase(self.phase))
        }
    }

    fn announce(&mut self, color: SystemColor) {
        let faction = self.racks.get(color).active_card().map(|card| card.faction);
        match faction {
            Some(faction) => info!(%color, %faction, "active faction card"),
            None => info!(%color, "rack has no faction card"),
        }
        self.announcement = Some(Announcement {
            color,
            faction,
            turn: self.turn,
        });
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Seed the engine was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// The board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// The racks.
    #[must_use]
    pub const fn racks(&self) -> &Racks {
        &self.racks
    }

    /// Totems that existed at construction.
    #[must_use]
    pub const fn initial_totem_count(&self) -> usize {
        self.initial_totems
    }

    /// The player, once set up.
    #[must_use]
    pub const fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Turn counter; 1 after setup.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Per-turn used flags.
    #[must_use]
    pub const fn flags(&self) -> ActionFlags {
        self.flags
    }

    /// Whether observer selection is active.
    #[must_use]
    pub const fn observer_armed(&self) -> bool {
        self.observer_armed
    }

    /// The in-flight observer reveal.
    #[must_use]
    pub const fn observation(&self) -> Option<Observation> {
        self.observation
    }

    /// Anchor of the player's origin capital, if it was placed.
    #[must_use]
    pub const fn origin_anchor(&self) -> Option<Cell> {
        self.origin_anchor
    }

    /// Systems the generator could not seat.
    #[must_use]
    pub fn unplaced(&self) -> &[SystemBlueprint] {
        &self.unplaced
    }

    /// Most recent faction-card announcement.
    #[must_use]
    pub const fn last_announcement(&self) -> Option<Announcement> {
        self.announcement
    }

    /// Final result, once the game is over.
    #[must_use]
    pub const fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// Current totem score.
    #[must_use]
    pub fn score(&self) -> ScoreBreakdown {
        self.player
            .as_ref()
            .map(|player| calculate_score(player.inventory(), &self.config))
            .unwrap_or_default()
    }

    /// Base score plus totem score.
    #[must_use]
    pub fn total_score(&self) -> u32 {
        self.player
            .as_ref()
            .map_or(0, |player| player.base_score().saturating_add(self.score().total))
    }

    /// First victory predicate the inventory satisfies.
    #[must_use]
    pub fn victory_condition(&self) -> Option<VictoryCondition> {
        self.player
            .as_ref()
            .and_then(|player| check_victory(player.inventory(), &self.config))
    }
}

#[cfg(test)]
impl GameEngine {
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub(crate) fn player_mut(&mut self) -> Option<&mut Player> {
        self.player.as_mut()
    }
}

fn revealed_color_at(board: &Board, cell: Cell) -> ActionResult<SystemColor> {
    board
        .system_at(cell)
        .filter(|system| system.revealed)
        .map(|system| system.color)
        .ok_or(ActionError::NotOnRevealedSystem)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::Duration;

    use super::*;
    use crate::game::{DistributionTable, Totem, SystemKind};

    fn engine(seed: u64) -> GameEngine {
        let mut engine = GameEngine::new(GameConfig::default(), seed).unwrap();
        engine.setup_game_as(SystemColor::Green).unwrap();
        engine
    }

    /// Replace the generated board with a hand-built one and park the ship.
    fn staged(systems: &[(SystemBlueprint, Cell)], start: Cell) -> GameEngine {
        let mut engine = engine(11);
        let mut board = Board::new(24, 2).unwrap();
        for &(blueprint, anchor) in systems {
            assert!(board.place(blueprint, anchor));
        }
        board.reveal(start);
        engine.board = board;
        if let Some(player) = engine.player.as_mut() {
            player.ship.position = start;
        }
        engine
    }

    /// [`staged`] with racks rebuilt from a custom distribution table.
    fn staged_with(
        distribution: DistributionTable,
        systems: &[(SystemBlueprint, Cell)],
        start: Cell,
    ) -> GameEngine {
        let mut engine = staged(systems, start);
        engine.config.distribution = distribution;
        engine.racks = Racks::from_config(&engine.config, &mut engine.rng).unwrap();
        engine.initial_totems = engine.racks.totem_count();
        engine
    }

    fn give(engine: &mut GameEngine, faction: Faction, color: SystemColor) {
        let totem = Totem::new(faction, color, &engine.config.factions).unwrap();
        let player = engine.player.as_mut().unwrap();
        player.add_totem(totem).unwrap();
        engine.initial_totems += 1;
    }

    fn player(engine: &GameEngine) -> &Player {
        engine.player().unwrap()
    }

    #[test]
    fn test_new_engine_is_running() {
        let engine = GameEngine::new(GameConfig::default(), 1).unwrap();
        assert_eq!(engine.phase(), Phase::Running);
        assert_eq!(engine.turn(), 0);
        assert!(engine.player().is_none());
        assert_eq!(engine.initial_totem_count(), 69);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GameConfig {
            movement_points_per_turn: 0,
            ..GameConfig::default()
        };
        assert!(GameEngine::new(config, 1).is_err());
    }

    #[test]
    fn test_commands_rejected_before_setup() {
        let mut engine = GameEngine::new(GameConfig::default(), 1).unwrap();
        let err = engine.apply(Command::Collect, Instant::now()).unwrap_err();
        assert_eq!(err, ActionError::WrongPhase(Phase::Running));
        assert!(engine.check_game_over().is_none());
    }

    #[test]
    fn test_setup() {
        let engine = engine(5);
        let player = player(&engine);
        assert_eq!(engine.phase(), Phase::PlayerTurn);
        assert_eq!(engine.turn(), 1);
        assert_eq!(player.origin_color, SystemColor::Green);
        assert_eq!(player.ship.movement_points(), 4);

        let system = engine.board().system_at(player.ship.position).unwrap();
        assert!(system.revealed);
        assert_eq!(system.anchor, player.ship.position);

        let announcement = engine.last_announcement().unwrap();
        assert_eq!(announcement.color, system.color);
        assert_eq!(
            announcement.faction,
            engine.racks().get(system.color).active_card().map(|c| c.faction)
        );
    }

    #[test]
    fn test_setup_twice_rejected() {
        let mut engine = engine(5);
        assert_eq!(
            engine.setup_game(),
            Err(SetupError::AlreadySetUp(Phase::PlayerTurn))
        );
    }

    #[test]
    fn test_setup_is_deterministic() {
        let mut a = GameEngine::new(GameConfig::default(), 77).unwrap();
        let mut b = GameEngine::new(GameConfig::default(), 77).unwrap();
        a.setup_game().unwrap();
        b.setup_game().unwrap();
        assert_eq!(a.board().systems(), b.board().systems());
        assert_eq!(player(&a).color, player(&b).color);
        assert_eq!(player(&a).ship.position, player(&b).ship.position);
    }

    #[test]
    fn test_origin_anchor_recorded() {
        let engine = engine(9);
        let anchor = engine.origin_anchor().unwrap();
        let origin = engine.board().system_at(anchor).unwrap();
        assert!(origin.is_origin());
        assert_eq!(origin.color, SystemColor::Green);
    }

    #[test]
    fn test_move_in_open_space() {
        let mut engine = staged(&[], Cell::new(10, 10));
        let outcome = engine.move_ship(Direction::East).unwrap();
        assert_eq!(
            outcome,
            Outcome::Moved {
                to: Cell::new(11, 10),
                remaining: 3,
                entered: None
            }
        );
        assert!(!engine.flags().moved);
        engine.move_ship(Direction::East).unwrap();
        engine.move_ship(Direction::East).unwrap();
        engine.move_ship(Direction::East).unwrap();
        let err = engine.move_ship(Direction::East).unwrap_err();
        assert_eq!(err, ActionError::InsufficientMovement { cost: 1, remaining: 0 });
        assert_eq!(player(&engine).ship.position, Cell::new(14, 10));
    }

    #[test]
    fn test_entering_system_ends_movement() {
        let planet = SystemBlueprint::planet(SystemColor::Red);
        let mut engine = staged(&[(planet, Cell::new(12, 10))], Cell::new(10, 10));
        let outcome = engine.move_ship(Direction::East).unwrap();
        assert!(matches!(outcome, Outcome::Moved { entered: None, .. }));

        let outcome = engine.move_ship(Direction::East).unwrap();
        assert_eq!(
            outcome,
            Outcome::Moved {
                to: Cell::new(12, 10),
                remaining: 0,
                entered: Some(SystemId(0))
            }
        );
        assert!(engine.flags().moved);
        assert!(engine.board().system(SystemId(0)).unwrap().revealed);
        assert_eq!(engine.last_announcement().unwrap().color, SystemColor::Red);
        assert_eq!(
            engine.move_ship(Direction::East),
            Err(ActionError::AlreadyUsed("move"))
        );
    }

    #[test]
    fn test_intra_system_step_rejected() {
        let planet = SystemBlueprint::planet(SystemColor::Red);
        let mut engine = staged(&[(planet, Cell::new(10, 10))], Cell::new(10, 10));
        assert_eq!(
            engine.move_ship(Direction::SouthEast),
            Err(ActionError::IntraSystemMove)
        );
        assert_eq!(player(&engine).ship.movement_points(), 4);
        // Leaving the system is a plain step.
        engine.move_ship(Direction::West).unwrap();
        assert_eq!(player(&engine).ship.position, Cell::new(9, 10));
    }

    #[test]
    fn test_off_board_step_rejected() {
        let mut engine = staged(&[], Cell::new(0, 0));
        assert_eq!(
            engine.move_ship(Direction::North),
            Err(ActionError::OutOfBounds(Cell::new(0, -1)))
        );
        assert_eq!(player(&engine).ship.movement_points(), 4);
    }

    #[test]
    fn test_collect_and_deposit() {
        let planet = SystemBlueprint::planet(SystemColor::Red);
        let mut engine = staged(&[(planet, Cell::new(10, 10))], Cell::new(10, 10));
        let active = engine.racks().get(SystemColor::Red).active_card().unwrap();
        let red_before = engine.racks().get(SystemColor::Red).totems().len();

        let outcome = engine.collect().unwrap();
        assert_eq!(
            outcome,
            Outcome::Collected {
                faction: active.faction,
                color: SystemColor::Red
            }
        );
        assert_eq!(engine.racks().get(SystemColor::Red).totems().len(), red_before - 1);
        assert_eq!(engine.collect(), Err(ActionError::AlreadyUsed("collect")));

        engine.deposit(None).unwrap();
        assert!(player(&engine).inventory().is_empty());
        assert_eq!(engine.racks().get(SystemColor::Red).totems().len(), red_before);
        assert_eq!(engine.deposit(None), Err(ActionError::AlreadyUsed("deposit")));
    }

    #[test]
    fn test_collect_requires_revealed_system() {
        let mut engine = staged(&[], Cell::new(5, 5));
        assert_eq!(engine.collect(), Err(ActionError::NotOnRevealedSystem));
        assert!(!engine.flags().collected);
    }

    #[test]
    fn test_collect_with_full_inventory_changes_nothing() {
        let planet = SystemBlueprint::planet(SystemColor::Red);
        let mut engine = staged(&[(planet, Cell::new(10, 10))], Cell::new(10, 10));
        for _ in 0..engine.config.inventory_capacity {
            give(&mut engine, Faction::B, SystemColor::Yellow);
        }
        let rack_before = engine.racks().get(SystemColor::Red).totems().len();
        assert_eq!(engine.collect(), Err(ActionError::InventoryFull { capacity: 9 }));
        assert_eq!(engine.racks().get(SystemColor::Red).totems().len(), rack_before);
        assert!(!engine.flags().collected);
    }

    #[test]
    fn test_deposit_errors() {
        let mut engine = staged(&[], Cell::new(5, 5));
        assert_eq!(engine.deposit(None), Err(ActionError::InventoryEmpty));
        give(&mut engine, Faction::A, SystemColor::Yellow);
        assert_eq!(engine.deposit(None), Err(ActionError::NotOnRevealedSystem));
        assert_eq!(player(&engine).inventory().len(), 1);
    }

    #[test]
    fn test_deposit_bad_index() {
        let planet = SystemBlueprint::planet(SystemColor::Blue);
        let mut engine = staged(&[(planet, Cell::new(10, 10))], Cell::new(10, 10));
        give(&mut engine, Faction::A, SystemColor::Yellow);
        assert_eq!(
            engine.deposit(Some(4)),
            Err(ActionError::NoSuchTotem { index: 4, held: 1 })
        );
        assert!(!engine.flags().deposited);
    }

    #[test]
    fn test_influence_rotates_capital_rack() {
        let capital = SystemBlueprint::capital(SystemColor::Violet, false);
        let mut engine = staged(&[(capital, Cell::new(10, 10))], Cell::new(10, 10));
        let cards: Vec<_> = engine.racks().get(SystemColor::Violet).cards().copied().collect();

        let outcome = engine.influence().unwrap();
        assert_eq!(outcome, Outcome::Influenced(cards[1]));
        assert_eq!(engine.racks().get(SystemColor::Violet).active_card(), Some(cards[1]));
        assert_eq!(engine.last_announcement().unwrap().faction, Some(cards[1].faction));
        assert_eq!(engine.influence(), Err(ActionError::AlreadyUsed("influence")));
    }

    #[test]
    fn test_influence_requires_capital() {
        let planet = SystemBlueprint::planet(SystemColor::Violet);
        let mut engine = staged(&[(planet, Cell::new(10, 10))], Cell::new(10, 10));
        assert_eq!(engine.influence(), Err(ActionError::NotOnCapital));
    }

    #[test]
    fn test_influence_single_card_rejected() {
        let distribution = DistributionTable::from([(
            SystemColor::Violet,
            BTreeMap::from([(Faction::E, 1)]),
        )]);
        let capital = SystemBlueprint::capital(SystemColor::Violet, false);
        let mut engine = staged_with(distribution, &[(capital, Cell::new(10, 10))], Cell::new(10, 10));
        let active = engine.racks().get(SystemColor::Violet).active_card();

        assert_eq!(
            engine.influence(),
            Err(ActionError::NotEnoughCards(SystemColor::Violet))
        );
        assert_eq!(engine.flags(), ActionFlags::default());
        let rack = engine.racks().get(SystemColor::Violet);
        assert_eq!(rack.card_count(), 1);
        assert_eq!(rack.active_card(), active);
    }

    #[test]
    fn test_collect_without_card_rejected() {
        let distribution = DistributionTable::from([(
            SystemColor::Yellow,
            BTreeMap::from([(Faction::A, 2)]),
        )]);
        let planet = SystemBlueprint::planet(SystemColor::Red);
        let mut engine = staged_with(distribution, &[(planet, Cell::new(10, 10))], Cell::new(10, 10));

        assert_eq!(
            engine.collect(),
            Err(ActionError::NoActiveCard(SystemColor::Red))
        );
        assert_eq!(engine.flags(), ActionFlags::default());
        assert_eq!(engine.racks().get(SystemColor::Red).card_count(), 0);
        assert!(engine.racks().get(SystemColor::Red).totems().is_empty());
        assert!(player(&engine).inventory().is_empty());
    }

    #[test]
    fn test_collect_without_matching_totem_rejected() {
        let distribution = DistributionTable::from([(
            SystemColor::Red,
            BTreeMap::from([(Faction::D, 1)]),
        )]);
        let planet = SystemBlueprint::planet(SystemColor::Red);
        let mut engine = staged_with(distribution, &[(planet, Cell::new(10, 10))], Cell::new(10, 10));
        let per_faction = usize::try_from(engine.config.totems_per_faction).unwrap();

        // Drain the rack one totem per turn.
        for _ in 0..per_faction {
            engine.collect().unwrap();
            engine.end_turn().unwrap();
        }
        assert!(engine.racks().get(SystemColor::Red).totems().is_empty());

        assert_eq!(
            engine.collect(),
            Err(ActionError::NoMatchingTotem {
                color: SystemColor::Red,
                faction: Faction::D
            })
        );
        assert_eq!(engine.flags(), ActionFlags::default());
        let rack = engine.racks().get(SystemColor::Red);
        assert_eq!(rack.card_count(), 1);
        assert!(rack.totems().is_empty());
        assert_eq!(player(&engine).inventory().len(), per_faction);
    }

    #[test]
    fn test_observer_cycle() {
        let hidden = SystemBlueprint::planet(SystemColor::Orange);
        let home = SystemBlueprint::planet(SystemColor::Red);
        let mut engine = staged(
            &[(home, Cell::new(2, 2)), (hidden, Cell::new(10, 10))],
            Cell::new(2, 2),
        );
        let t0 = Instant::now();

        assert_eq!(
            engine.observer_target(Cell::new(10, 10), t0),
            Err(ActionError::ObserverNotArmed)
        );
        engine.observer_arm().unwrap();
        assert_eq!(engine.observer_arm(), Err(ActionError::ObserverAlreadyArmed));

        // Invalid targets keep the observer armed.
        assert_eq!(
            engine.observer_target(Cell::new(2, 2), t0),
            Err(ActionError::InvalidObserverTarget(Cell::new(2, 2)))
        );
        assert_eq!(
            engine.observer_target(Cell::new(0, 20), t0),
            Err(ActionError::InvalidObserverTarget(Cell::new(0, 20)))
        );
        assert!(engine.observer_armed());
        assert!(!engine.flags().observed);

        let outcome = engine.observer_target(Cell::new(11, 11), t0).unwrap();
        assert_eq!(outcome, Outcome::Observing(SystemId(1)));
        assert!(engine.board().system(SystemId(1)).unwrap().revealed);
        assert!(engine.flags().observed);
        assert_eq!(engine.observer_arm(), Err(ActionError::AlreadyUsed("observe")));

        assert_eq!(engine.tick(t0 + Duration::from_millis(1999)), None);
        assert!(engine.board().system(SystemId(1)).unwrap().revealed);
        assert_eq!(engine.tick(t0 + Duration::from_secs(2)), Some(SystemId(1)));
        assert!(!engine.board().system(SystemId(1)).unwrap().revealed);
        assert!(engine.observation().is_none());
        assert!(engine.flags().observed);
    }

    #[test]
    fn test_observer_cancel_keeps_action() {
        let hidden = SystemBlueprint::planet(SystemColor::Orange);
        let mut engine = staged(&[(hidden, Cell::new(10, 10))], Cell::new(2, 2));
        assert_eq!(engine.observer_cancel(), Err(ActionError::ObserverNotArmed));
        engine.observer_arm().unwrap();
        engine.observer_cancel().unwrap();
        assert!(!engine.observer_armed());
        engine.observer_arm().unwrap();
    }

    #[test]
    fn test_observer_needs_hidden_system() {
        let home = SystemBlueprint::planet(SystemColor::Red);
        let mut engine = staged(&[(home, Cell::new(2, 2))], Cell::new(2, 2));
        assert_eq!(engine.observer_arm(), Err(ActionError::NoHiddenSystem));
    }

    #[test]
    fn test_turn_start_clears_observation() {
        let hidden = SystemBlueprint::planet(SystemColor::Orange);
        let mut engine = staged(&[(hidden, Cell::new(10, 10))], Cell::new(2, 2));
        let t0 = Instant::now();
        engine.observer_arm().unwrap();
        engine.observer_target(Cell::new(10, 10), t0).unwrap();

        engine.end_turn().unwrap();
        assert!(engine.observation().is_none());
        assert!(!engine.board().system(SystemId(0)).unwrap().revealed);
        assert_eq!(engine.flags(), ActionFlags::default());
        assert_eq!(engine.tick(t0 + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_entering_observed_system_makes_reveal_permanent() {
        let hidden = SystemBlueprint::planet(SystemColor::Orange);
        let mut engine = staged(&[(hidden, Cell::new(10, 10))], Cell::new(9, 9));
        let t0 = Instant::now();
        engine.observer_arm().unwrap();
        engine.observer_target(Cell::new(10, 10), t0).unwrap();
        engine.move_ship(Direction::SouthEast).unwrap();

        assert!(engine.observation().is_none());
        assert_eq!(engine.tick(t0 + Duration::from_secs(3)), None);
        assert!(engine.board().system(SystemId(0)).unwrap().revealed);
    }

    #[test]
    fn test_end_turn_penalty_clamps() {
        let mut engine = engine(3);
        engine.player.as_mut().unwrap().apply_penalty(5000 - 150);
        assert_eq!(player(&engine).base_score(), 150);
        engine.end_turn().unwrap();
        assert_eq!(player(&engine).base_score(), 0);
        engine.end_turn().unwrap();
        assert_eq!(player(&engine).base_score(), 0);
        assert_eq!(engine.turn(), 3);
    }

    #[test]
    fn test_turn_limit_ends_game_once() {
        let config = GameConfig {
            max_turns: 2,
            ..GameConfig::default()
        };
        let mut engine = GameEngine::new(config, 4).unwrap();
        engine.setup_game().unwrap();
        assert_eq!(engine.end_turn().unwrap(), Outcome::TurnStarted(2));
        let outcome = engine.end_turn().unwrap();
        assert!(outcome.is_game_over());
        assert_eq!(engine.phase(), Phase::GameOver);

        let recorded = engine.outcome().unwrap();
        assert_eq!(recorded.reason, OutcomeReason::TurnLimit);
        assert_eq!(recorded.turns_played, 2);
        assert_eq!(recorded.final_score, 5000 - 400);

        assert_eq!(engine.end_turn(), Err(ActionError::WrongPhase(Phase::GameOver)));
        assert_eq!(engine.check_game_over(), Some(recorded));
        assert_eq!(player(&engine).base_score(), 5000 - 400);
    }

    #[test]
    fn test_victory_on_origin_capital() {
        let origin = SystemBlueprint::capital(SystemColor::Green, true);
        let mut engine = staged(&[(origin, Cell::new(10, 10))], Cell::new(10, 10));
        give(&mut engine, Faction::A, SystemColor::Yellow);
        give(&mut engine, Faction::A, SystemColor::Red);
        give(&mut engine, Faction::A, SystemColor::Blue);

        let outcome = engine.end_turn().unwrap();
        assert_eq!(
            outcome,
            Outcome::GameOver {
                final_score: 5000 - 200 + 250,
                victory: Some(VictoryCondition::FactionSet(Faction::A)),
            }
        );
        assert_eq!(engine.phase(), Phase::GameOver);
        assert_eq!(engine.apply(Command::Collect, Instant::now()), Err(ActionError::WrongPhase(Phase::GameOver)));
    }

    #[test]
    fn test_no_victory_away_from_origin() {
        let other = SystemBlueprint::capital(SystemColor::Red, false);
        let mut engine = staged(&[(other, Cell::new(10, 10))], Cell::new(10, 10));
        give(&mut engine, Faction::A, SystemColor::Yellow);
        give(&mut engine, Faction::A, SystemColor::Red);
        give(&mut engine, Faction::A, SystemColor::Blue);
        assert_eq!(engine.end_turn().unwrap(), Outcome::TurnStarted(2));
    }

    #[test]
    fn test_rejected_command_leaves_state() {
        let mut engine = staged(&[], Cell::new(5, 5));
        let before = (player(&engine).ship, engine.flags(), engine.turn());
        let _ = engine.apply(Command::Influence, Instant::now());
        let _ = engine.apply(Command::Deposit(None), Instant::now());
        let _ = engine.apply(Command::ObserverTarget(Cell::new(1, 1)), Instant::now());
        assert_eq!((player(&engine).ship, engine.flags(), engine.turn()), before);
    }

    #[test]
    fn test_capitals_keep_kind() {
        let engine = engine(21);
        let capitals = engine
            .board()
            .systems()
            .iter()
            .filter(|s| matches!(s.kind, SystemKind::Capital { .. }))
            .count();
        assert!(capitals <= 7);
        assert_eq!(engine.board().systems().len() + engine.unplaced().len(), 15);
    }
}

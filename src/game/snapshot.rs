//! Read-only view of the engine for rendering clients.

use serde::Serialize;

use crate::game::{
    ActionFlags, Announcement, Cell, Faction, GameEngine, GameOutcome, Phase, ScoreBreakdown,
    SystemColor, SystemId, SystemKind, VictoryCondition,
};

/// One system as seen by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SystemView {
    /// Index on the board.
    pub id: SystemId,
    /// Capital or planet.
    pub kind: SystemKind,
    /// System color.
    pub color: SystemColor,
    /// Top-left footprint cell.
    pub anchor: Cell,
    /// Whether the system is currently visible.
    pub revealed: bool,
}

/// The ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShipView {
    /// Current cell.
    pub position: Cell,
    /// Owning color.
    pub color: SystemColor,
    /// Points left this turn.
    pub movement_points: u32,
    /// Points granted per turn.
    pub budget: u32,
}

/// A held totem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotemView {
    /// Faction.
    pub faction: Faction,
    /// Origin color.
    pub color: SystemColor,
    /// Point value.
    pub value: u32,
    /// Faction display name.
    pub name: String,
    /// Faction symbol.
    pub symbol: String,
}

/// Public state of one rack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RackView {
    /// Rack color.
    pub color: SystemColor,
    /// Faction of the active card.
    pub active_faction: Option<Faction>,
    /// Cards in rotation.
    pub cards: usize,
    /// Totems left in the rack.
    pub totems: usize,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    /// Seed of the game.
    pub seed: u64,
    /// Board side length.
    pub board_size: i32,
    /// Footprint side length.
    pub footprint: i32,
    /// Placed systems.
    pub systems: Vec<SystemView>,
    /// The ship, once the game is set up.
    pub ship: Option<ShipView>,
    /// Player color.
    pub player_color: Option<SystemColor>,
    /// Anchor of the origin capital.
    pub origin_anchor: Option<Cell>,
    /// Turn counter.
    pub turn: u32,
    /// Configured turn limit.
    pub max_turns: u32,
    /// Engine phase.
    pub phase: Phase,
    /// Held totems.
    pub inventory: Vec<TotemView>,
    /// Inventory capacity.
    pub inventory_capacity: usize,
    /// Totem score.
    pub score: ScoreBreakdown,
    /// Running base score.
    pub base_score: u32,
    /// `base_score + score.total`.
    pub total_score: u32,
    /// Victory predicate currently satisfied by the inventory.
    pub victory_ready: Option<VictoryCondition>,
    /// Per-turn used flags.
    pub flags: ActionFlags,
    /// Observer selection active.
    pub observer_armed: bool,
    /// System under a transient reveal.
    pub observing: Option<SystemId>,
    /// Racks in palette order.
    pub racks: Vec<RackView>,
    /// Most recent faction-card announcement.
    pub announcement: Option<Announcement>,
    /// Final result once the game is over.
    pub outcome: Option<GameOutcome>,
}

impl GameSnapshot {
    /// The system covering `cell`, if any.
    #[must_use]
    pub fn system_at(&self, cell: Cell) -> Option<&SystemView> {
        self.systems.iter().find(|system| {
            cell.x >= system.anchor.x
                && cell.x < system.anchor.x + self.footprint
                && cell.y >= system.anchor.y
                && cell.y < system.anchor.y + self.footprint
        })
    }
}

impl GameEngine {
    /// Copy the state a renderer needs.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        let board = self.board();
        let player = self.player();

        GameSnapshot {
            seed: self.seed(),
            board_size: board.size(),
            footprint: board.footprint(),
            systems: board
                .systems()
                .iter()
                .enumerate()
                .map(|(index, system)| SystemView {
                    id: SystemId(index),
                    kind: system.kind,
                    color: system.color,
                    anchor: system.anchor,
                    revealed: system.revealed,
                })
                .collect(),
            ship: player.map(|player| ShipView {
                position: player.ship.position,
                color: player.ship.color,
                movement_points: player.ship.movement_points(),
                budget: player.ship.budget(),
            }),
            player_color: player.map(|player| player.color),
            origin_anchor: self.origin_anchor(),
            turn: self.turn(),
            max_turns: self.config().max_turns,
            phase: self.phase(),
            inventory: player
                .map(|player| {
                    player
                        .inventory()
                        .iter()
                        .map(|totem| TotemView {
                            faction: totem.faction(),
                            color: totem.color(),
                            value: totem.value(),
                            name: totem.name().to_string(),
                            symbol: totem.symbol().to_string(),
                        })
                        .collect()
                })
                .unwrap_or_default(),
            inventory_capacity: self.config().inventory_capacity,
            score: self.score(),
            base_score: player.map_or(0, |player| player.base_score()),
            total_score: self.total_score(),
            victory_ready: self.victory_condition(),
            flags: self.flags(),
            observer_armed: self.observer_armed(),
            observing: self.observation().map(|observation| observation.system),
            racks: self
                .racks()
                .iter()
                .map(|rack| RackView {
                    color: rack.color(),
                    active_faction: rack.active_card().map(|card| card.faction),
                    cards: rack.card_count(),
                    totems: rack.totems().len(),
                })
                .collect(),
            announcement: self.last_announcement(),
            outcome: self.outcome(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::game::{GameConfig, GameEngine, Phase, SystemColor};

    #[test]
    fn test_snapshot_before_setup() {
        let engine = GameEngine::new(GameConfig::default(), 2).unwrap();
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.phase, Phase::Running);
        assert!(snapshot.ship.is_none());
        assert!(snapshot.systems.is_empty());
        assert_eq!(snapshot.racks.len(), 7);
        assert_eq!(snapshot.total_score, 0);
    }

    #[test]
    fn test_snapshot_after_setup() {
        let mut engine = GameEngine::new(GameConfig::default(), 2).unwrap();
        engine.setup_game_as(SystemColor::Rose).unwrap();
        let snapshot = engine.snapshot();

        let ship = snapshot.ship.unwrap();
        assert_eq!(ship.movement_points, 4);
        assert_eq!(snapshot.player_color, Some(SystemColor::Rose));
        assert_eq!(snapshot.turn, 1);
        assert_eq!(snapshot.max_turns, 40);
        assert_eq!(snapshot.total_score, 5000);

        let here = snapshot.system_at(ship.position).unwrap();
        assert!(here.revealed);
        assert_eq!(snapshot.systems.iter().filter(|s| s.revealed).count(), 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut engine = GameEngine::new(GameConfig::default(), 8).unwrap();
        engine.setup_game().unwrap();
        let json = serde_json::to_value(engine.snapshot()).unwrap();
        assert_eq!(json["turn"], 1);
        assert_eq!(json["phase"], "PlayerTurn");
        assert!(json["systems"].as_array().is_some_and(|s| !s.is_empty()));
    }
}

//! Player and ship state.

use crate::error::{ActionError, ActionResult};
use crate::game::{Cell, SystemColor, Totem};

/// Unique identifier for a player.
pub type PlayerId = u8;

/// The player's ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ship {
    /// Current cell.
    pub position: Cell,
    /// Owning color.
    pub color: SystemColor,
    movement_points: u32,
    budget: u32,
}

impl Ship {
    /// A ship at `position` with a full movement budget.
    #[must_use]
    pub const fn new(position: Cell, color: SystemColor, budget: u32) -> Self {
        Self {
            position,
            color,
            movement_points: budget,
            budget,
        }
    }

    /// Points left this turn.
    #[must_use]
    pub const fn movement_points(&self) -> u32 {
        self.movement_points
    }

    /// Points granted at every turn start.
    #[must_use]
    pub const fn budget(&self) -> u32 {
        self.budget
    }

    /// Refill movement points to the per-turn budget.
    pub const fn reset_movement(&mut self) {
        self.movement_points = self.budget;
    }

    /// Spend `cost` points and move to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::InsufficientMovement`] if fewer than `cost`
    /// points remain; the ship does not move.
    pub const fn step(&mut self, to: Cell, cost: u32) -> ActionResult<()> {
        if cost > self.movement_points {
            return Err(ActionError::InsufficientMovement {
                cost,
                remaining: self.movement_points,
            });
        }
        self.movement_points -= cost;
        self.position = to;
        Ok(())
    }

    /// Zero the remaining points for this turn.
    pub const fn halt(&mut self) {
        self.movement_points = 0;
    }
}

/// The single player.
#[derive(Debug)]
pub struct Player {
    /// Identifier.
    pub id: PlayerId,
    /// Player color.
    pub color: SystemColor,
    /// Color of the home capital; always equal to `color`.
    pub origin_color: SystemColor,
    /// The player's ship.
    pub ship: Ship,
    inventory: Vec<Totem>,
    capacity: usize,
    base_score: u32,
}

impl Player {
    /// Create a player whose ship starts at `start`.
    #[must_use]
    pub const fn new(
        id: PlayerId,
        color: SystemColor,
        start: Cell,
        movement_budget: u32,
        capacity: usize,
        base_score: u32,
    ) -> Self {
        Self {
            id,
            color,
            origin_color: color,
            ship: Ship::new(start, color, movement_budget),
            inventory: Vec::new(),
            capacity,
            base_score,
        }
    }

    /// Held totems in pickup order.
    #[must_use]
    pub fn inventory(&self) -> &[Totem] {
        &self.inventory
    }

    /// Maximum number of held totems.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether another totem fits.
    #[must_use]
    pub fn has_room(&self) -> bool {
        self.inventory.len() < self.capacity
    }

    /// Store a totem.
    ///
    /// # Errors
    ///
    /// Hands the totem back when the inventory is full.
    pub fn add_totem(&mut self, totem: Totem) -> Result<(), Totem> {
        if !self.has_room() {
            return Err(totem);
        }
        self.inventory.push(totem);
        Ok(())
    }

    /// Remove the totem at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::InventoryEmpty`] or [`ActionError::NoSuchTotem`].
    pub fn remove_totem(&mut self, index: usize) -> ActionResult<Totem> {
        let held = self.inventory.len();
        if held == 0 {
            return Err(ActionError::InventoryEmpty);
        }
        if index >= held {
            return Err(ActionError::NoSuchTotem { index, held });
        }
        Ok(self.inventory.remove(index))
    }

    /// Running base score.
    #[must_use]
    pub const fn base_score(&self) -> u32 {
        self.base_score
    }

    /// Subtract `amount` from the base score, stopping at zero.
    pub const fn apply_penalty(&mut self, amount: u32) {
        self.base_score = self.base_score.saturating_sub(amount);
    }
}

//! Board cells, systems, and the spatial index.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::SystemColor;

/// A board coordinate (column, row). Not pixel space.
///
/// Signed so that neighbor arithmetic at the edges yields out-of-bounds
/// cells instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// X coordinate (column).
    pub x: i32,
    /// Y coordinate (row).
    pub y: i32,
}

impl Cell {
    /// Create a new cell.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell displaced by `(dx, dy)`.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Chebyshev (king-move) distance.
    #[must_use]
    pub const fn chebyshev(self, other: Cell) -> i32 {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        if dx > dy { dx } else { dy }
    }

    /// The eight surrounding cells, unbounded.
    #[must_use]
    pub const fn neighbors(self) -> [Cell; 8] {
        [
            self.offset(-1, -1),
            self.offset(-1, 0),
            self.offset(-1, 1),
            self.offset(0, -1),
            self.offset(0, 1),
            self.offset(1, -1),
            self.offset(1, 0),
            self.offset(1, 1),
        ]
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Index of a system on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SystemId(pub usize);

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemKind {
    /// A capital. One per color; the player's own is its origin.
    Capital {
        /// Whether this is the player's home system.
        is_origin: bool,
    },
    /// An ordinary planet system.
    Planet,
}

/// A system that has not been placed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemBlueprint {
    /// Capital or planet.
    pub kind: SystemKind,
    /// System color.
    pub color: SystemColor,
}

impl SystemBlueprint {
    /// A capital blueprint.
    #[must_use]
    pub const fn capital(color: SystemColor, is_origin: bool) -> Self {
        Self {
            kind: SystemKind::Capital { is_origin },
            color,
        }
    }

    /// A planet blueprint.
    #[must_use]
    pub const fn planet(color: SystemColor) -> Self {
        Self {
            kind: SystemKind::Planet,
            color,
        }
    }
}

/// A placed system. The anchor never moves once placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarSystem {
    /// Capital or planet.
    pub kind: SystemKind,
    /// System color.
    pub color: SystemColor,
    /// Top-left cell of the footprint.
    pub anchor: Cell,
    /// Whether the system is currently visible.
    pub revealed: bool,
}

impl StarSystem {
    /// Whether this system is a capital.
    #[must_use]
    pub const fn is_capital(&self) -> bool {
        matches!(self.kind, SystemKind::Capital { .. })
    }

    /// Whether this is the player's origin capital.
    #[must_use]
    pub const fn is_origin(&self) -> bool {
        matches!(self.kind, SystemKind::Capital { is_origin: true })
    }
}

/// The board: a square grid of cells hosting multi-cell systems.
///
/// Lookups scan the system list.
#[derive(Debug, Clone)]
pub struct Board {
    size: i32,
    footprint: i32,
    systems: Vec<StarSystem>,
}

impl Board {
    /// Create an empty board.
    ///
    /// Returns `None` if the size or footprint is zero, or the footprint does
    /// not fit on the board.
    #[must_use]
    pub fn new(size: u16, footprint: u16) -> Option<Self> {
        if size == 0 || footprint == 0 || footprint > size {
            return None;
        }

        Some(Self {
            size: i32::from(size),
            footprint: i32::from(footprint),
            systems: Vec::new(),
        })
    }

    /// Side length of the board.
    #[must_use]
    pub const fn size(&self) -> i32 {
        self.size
    }

    /// Side length of every system footprint.
    #[must_use]
    pub const fn footprint(&self) -> i32 {
        self.footprint
    }

    /// Check if a cell is within the board.
    #[must_use]
    pub const fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.size && cell.y < self.size
    }

    /// Place a system with its footprint anchored at `anchor`.
    ///
    /// Returns `false` if any footprint cell would fall off the board.
    pub fn place(&mut self, blueprint: SystemBlueprint, anchor: Cell) -> bool {
        let far = anchor.offset(self.footprint - 1, self.footprint - 1);
        if !self.in_bounds(anchor) || !self.in_bounds(far) {
            return false;
        }

        self.systems.push(StarSystem {
            kind: blueprint.kind,
            color: blueprint.color,
            anchor,
            revealed: false,
        });
        true
    }

    /// All placed systems, indexed by [`SystemId`].
    #[must_use]
    pub fn systems(&self) -> &[StarSystem] {
        &self.systems
    }

    /// Look up a system by id.
    #[must_use]
    pub fn system(&self, id: SystemId) -> Option<&StarSystem> {
        self.systems.get(id.0)
    }

    /// Whether `cell` lies inside the footprint anchored at `anchor`.
    #[must_use]
    pub const fn footprint_contains(&self, anchor: Cell, cell: Cell) -> bool {
        cell.x >= anchor.x
            && cell.x < anchor.x + self.footprint
            && cell.y >= anchor.y
            && cell.y < anchor.y + self.footprint
    }

    /// Id of the system covering `cell`, if any.
    #[must_use]
    pub fn system_id_at(&self, cell: Cell) -> Option<SystemId> {
        self.systems
            .iter()
            .position(|system| self.footprint_contains(system.anchor, cell))
            .map(SystemId)
    }

    /// The system covering `cell`, if any.
    #[must_use]
    pub fn system_at(&self, cell: Cell) -> Option<&StarSystem> {
        self.system_id_at(cell).and_then(|id| self.system(id))
    }

    /// Whether both cells lie inside one and the same system.
    #[must_use]
    pub fn same_system(&self, a: Cell, b: Cell) -> bool {
        match (self.system_id_at(a), self.system_id_at(b)) {
            (Some(first), Some(second)) => first == second,
            _ => false,
        }
    }

    /// Every cell covered by a system footprint.
    #[must_use]
    pub fn occupied_cells(&self) -> HashSet<Cell> {
        self.systems
            .iter()
            .flat_map(|system| self.footprint_cells(system.anchor))
            .collect()
    }

    /// The cells of the footprint anchored at `anchor`.
    pub fn footprint_cells(&self, anchor: Cell) -> impl Iterator<Item = Cell> + use<> {
        let footprint = self.footprint;
        (0..footprint).flat_map(move |dy| (0..footprint).map(move |dx| anchor.offset(dx, dy)))
    }

    /// Reveal the system covering `cell`.
    ///
    /// Returns the system only if it was hidden before this call.
    pub fn reveal(&mut self, cell: Cell) -> Option<SystemId> {
        let id = self.system_id_at(cell)?;
        let system = self.systems.get_mut(id.0)?;
        if system.revealed {
            return None;
        }
        system.revealed = true;
        Some(id)
    }

    /// Force the revealed flag of a system.
    pub(crate) fn set_revealed(&mut self, id: SystemId, revealed: bool) {
        if let Some(system) = self.systems.get_mut(id.0) {
            system.revealed = revealed;
        }
    }

    /// Number of systems not currently revealed.
    #[must_use]
    pub fn hidden_count(&self) -> usize {
        self.systems.iter().filter(|system| !system.revealed).count()
    }
}

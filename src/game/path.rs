//! Movement directions and breadth-first pathfinding.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::game::{Board, Cell};

/// One of the eight king-move directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Up.
    North,
    /// Up and right.
    NorthEast,
    /// Right.
    East,
    /// Down and right.
    SouthEast,
    /// Down.
    South,
    /// Down and left.
    SouthWest,
    /// Left.
    West,
    /// Up and left.
    NorthWest,
}

impl Direction {
    /// All eight directions, clockwise from north.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Cell delta `(dx, dy)`; y grows downwards.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// Apply this direction to a cell.
    #[must_use]
    pub const fn step(self, from: Cell) -> Cell {
        let (dx, dy) = self.delta();
        from.offset(dx, dy)
    }

    /// Short compass label (`n`, `ne`, ...).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Direction::North => "n",
            Direction::NorthEast => "ne",
            Direction::East => "e",
            Direction::SouthEast => "se",
            Direction::South => "s",
            Direction::SouthWest => "sw",
            Direction::West => "w",
            Direction::NorthWest => "nw",
        }
    }

    /// Parse a compass label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|dir| dir.label() == label)
    }
}

/// Find a shortest path from `start` to `end` using at most `max_steps` hops.
///
/// The path includes both endpoints. Travel that starts and ends inside the
/// same system is refused, and the search never steps back into the system
/// containing `start`.
#[must_use]
pub fn find_path(board: &Board, start: Cell, end: Cell, max_steps: usize) -> Option<Vec<Cell>> {
    if board.same_system(start, end) {
        return None;
    }
    if start == end {
        return Some(vec![start]);
    }

    let start_system = board.system_id_at(start);
    let mut queue = VecDeque::from([vec![start]]);
    let mut visited = HashSet::from([start]);

    while let Some(path) = queue.pop_front() {
        if path.len() > max_steps {
            continue;
        }
        let Some(&current) = path.last() else {
            continue;
        };

        for next in current.neighbors() {
            if !board.in_bounds(next) || visited.contains(&next) {
                continue;
            }
            if start_system.is_some() && board.system_id_at(next) == start_system {
                continue;
            }

            let mut extended = path.clone();
            extended.push(next);
            if next == end {
                return Some(extended);
            }
            visited.insert(next);
            queue.push_back(extended);
        }
    }

    None
}

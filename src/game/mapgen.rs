//! Randomised system placement.
//!
//! Systems are seated one at a time on shuffled candidate anchors. An anchor
//! is accepted when its footprint center keeps the minimum Chebyshev distance
//! to every system already placed; accepted anchors leave the candidate pool.
//! Systems that find no anchor are reported back rather than failing the run.

use tracing::{info, warn};

use crate::error::SetupError;
use crate::game::{Board, Cell, GameConfig, GameRng, SystemBlueprint};

/// Geometry the generator works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLayout {
    /// Board side length.
    pub board_size: u16,
    /// Footprint side length.
    pub footprint: u16,
    /// Minimum Chebyshev distance between footprint centers.
    pub min_distance: u16,
    /// Lowest anchor coordinate on each axis.
    pub edge_margin: u16,
}

impl From<&GameConfig> for BoardLayout {
    fn from(config: &GameConfig) -> Self {
        Self {
            board_size: config.board_size,
            footprint: config.footprint,
            min_distance: config.min_system_distance,
            edge_margin: config.edge_margin,
        }
    }
}

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct Placement {
    /// The board with every seated system.
    pub board: Board,
    /// Systems that could not be seated.
    pub unplaced: Vec<SystemBlueprint>,
}

/// Every anchor whose footprint fits between the margin and the far edge.
///
/// Anchors stop one footprint short of the far edge, which leaves a one-cell
/// gutter on the right and bottom sides.
#[must_use]
pub fn candidate_anchors(layout: &BoardLayout) -> Vec<Cell> {
    let low = i32::from(layout.edge_margin);
    let high = i32::from(layout.board_size) - i32::from(layout.footprint);
    (low..high)
        .flat_map(|x| (low..high).map(move |y| Cell::new(x, y)))
        .collect()
}

/// Chebyshev distance between the centers of two footprints, doubled so that
/// half-cell centers stay integral.
#[must_use]
pub fn doubled_center_distance(a: Cell, b: Cell, footprint: u16) -> i32 {
    let f = i32::from(footprint);
    let center_a = Cell::new(2 * a.x + f, 2 * a.y + f);
    let center_b = Cell::new(2 * b.x + f, 2 * b.y + f);
    center_a.chebyshev(center_b)
}

/// Whether a footprint at `anchor` keeps its distance from every placed system.
#[must_use]
pub fn respects_distance(board: &Board, anchor: Cell, layout: &BoardLayout) -> bool {
    let min = 2 * i32::from(layout.min_distance);
    board.systems().iter().all(|system| {
        doubled_center_distance(anchor, system.anchor, layout.footprint) >= min
            && !footprints_overlap(anchor, system.anchor, board.footprint())
    })
}

fn footprints_overlap(a: Cell, b: Cell, footprint: i32) -> bool {
    (a.x - b.x).abs() < footprint && (a.y - b.y).abs() < footprint
}

/// Place `systems` on a fresh board.
///
/// # Errors
///
/// Returns [`SetupError::InvalidBoard`] if the layout cannot host a footprint.
/// Individual placement failures are returned in [`Placement::unplaced`].
pub fn generate_board(
    layout: &BoardLayout,
    mut systems: Vec<SystemBlueprint>,
    rng: &mut GameRng,
) -> Result<Placement, SetupError> {
    let mut board = Board::new(layout.board_size, layout.footprint).ok_or(SetupError::InvalidBoard {
        size: layout.board_size,
        footprint: layout.footprint,
    })?;

    rng.shuffle(&mut systems);
    let mut pool = candidate_anchors(layout);
    rng.shuffle(&mut pool);

    let total = systems.len();
    let mut unplaced = Vec::new();

    for blueprint in systems {
        let mut scan = pool.clone();
        rng.shuffle(&mut scan);

        let anchor = scan
            .into_iter()
            .find(|&anchor| respects_distance(&board, anchor, layout));

        match anchor {
            Some(anchor) if board.place(blueprint, anchor) => {
                pool.retain(|&candidate| candidate != anchor);
            }
            _ => {
                warn!(color = %blueprint.color, kind = ?blueprint.kind, "could not place system");
                unplaced.push(blueprint);
            }
        }
    }

    info!(
        placed = board.systems().len(),
        total,
        "board generated"
    );

    Ok(Placement { board, unplaced })
}

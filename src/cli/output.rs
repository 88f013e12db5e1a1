//! Output formatting utilities for CLI.

use space_explore::game::{GameSnapshot, OutcomeReason, SystemKind, SystemView};
use space_explore::{Cell, SystemColor};

/// Single-letter tag for a color. Capitals render upper case.
pub(super) const fn color_glyph(color: SystemColor) -> char {
    match color {
        SystemColor::Yellow => 'y',
        SystemColor::Red => 'r',
        SystemColor::Violet => 'v',
        SystemColor::Orange => 'o',
        SystemColor::Green => 'g',
        SystemColor::Blue => 'b',
        SystemColor::Rose => 'p',
    }
}

/// Board glyph for a cell: `@` ship, `#` hidden system, color tag, `.` space.
pub(super) fn cell_glyph(snapshot: &GameSnapshot, cell: Cell, reveal_all: bool) -> char {
    if snapshot.ship.is_some_and(|ship| ship.position == cell) {
        return '@';
    }
    match snapshot.system_at(cell) {
        Some(system) if system.revealed || reveal_all => system_glyph(system),
        Some(_) => '#',
        None => '.',
    }
}

fn system_glyph(system: &SystemView) -> char {
    let glyph = color_glyph(system.color);
    match system.kind {
        SystemKind::Capital { .. } => glyph.to_ascii_uppercase(),
        SystemKind::Planet => glyph,
    }
}

/// Render the board as ASCII rows.
pub(super) fn format_board(snapshot: &GameSnapshot, reveal_all: bool) -> String {
    let mut output = String::new();
    for y in 0..snapshot.board_size {
        let row: Vec<String> = (0..snapshot.board_size)
            .map(|x| cell_glyph(snapshot, Cell::new(x, y), reveal_all).to_string())
            .collect();
        output.push_str(&row.join(" "));
        output.push('\n');
    }
    output
}

/// Status lines shown under the board and in the TUI side panel.
pub(super) fn status_lines(snapshot: &GameSnapshot) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!(
        "Turn {}/{} ({})",
        snapshot.turn, snapshot.max_turns, snapshot.phase
    ));
    if let Some(color) = snapshot.player_color {
        lines.push(format!("Player: {color}"));
    }
    if let Some(ship) = snapshot.ship {
        lines.push(format!(
            "Ship {} | MP {}/{}",
            ship.position, ship.movement_points, ship.budget
        ));
    }
    lines.push(format!(
        "Score: {} (base {} + totems {} + colors {} + factions {})",
        snapshot.total_score,
        snapshot.base_score,
        snapshot.score.totem_value,
        snapshot.score.color_bonus,
        snapshot.score.faction_bonus
    ));
    lines.push(format!(
        "Victory: {}",
        snapshot
            .victory_ready
            .map_or_else(|| "not met".to_string(), |condition| condition.to_string())
    ));

    let flags = snapshot.flags;
    let mark = |used: bool| if used { "x" } else { "-" };
    lines.push(format!(
        "Used: move[{}] collect[{}] deposit[{}] influence[{}] observe[{}]",
        mark(flags.moved),
        mark(flags.collected),
        mark(flags.deposited),
        mark(flags.influenced),
        mark(flags.observed)
    ));
    if snapshot.observer_armed {
        lines.push("Observer: choose a hidden system".to_string());
    }
    if let Some(system) = snapshot.observing {
        lines.push(format!("Observer: watching system {system}"));
    }
    if let Some(announcement) = snapshot.announcement {
        let faction = announcement
            .faction
            .map_or_else(|| "none".to_string(), |faction| faction.to_string());
        lines.push(format!("Card {}: faction {faction}", announcement.color));
    }

    lines.push(format!(
        "Inventory {}/{}:",
        snapshot.inventory.len(),
        snapshot.inventory_capacity
    ));
    for (index, totem) in snapshot.inventory.iter().enumerate() {
        lines.push(format!(
            "  {index}: {} {} ({}) {}",
            totem.faction, totem.color, totem.name, totem.value
        ));
    }

    if let Some(outcome) = snapshot.outcome {
        let reason = match outcome.reason {
            OutcomeReason::TurnLimit => "turn limit reached".to_string(),
            OutcomeReason::Victory(condition) => format!("victory, {condition}"),
        };
        lines.push(format!(
            "GAME OVER: {reason} | final score {} in {} turns",
            outcome.final_score, outcome.turns_played
        ));
    }

    lines
}

/// Board plus status as one block of text.
pub(super) fn format_text(snapshot: &GameSnapshot, reveal_all: bool) -> String {
    let mut output = format!("Space Explore (seed: {})\n\n", snapshot.seed);
    output.push_str(&format_board(snapshot, reveal_all));
    output.push('\n');
    for line in status_lines(snapshot) {
        output.push_str(&line);
        output.push('\n');
    }
    output
}

//! Engine invariants - sanity checks that detect bugs.
//!
//! These should never trigger through the command API. The fuzz target and
//! the property tests run them after every command.

use crate::game::{GameEngine, doubled_center_distance};

/// Invariant violation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invariant violation: {message}")]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

fn violation(message: String) -> InvariantViolation {
    InvariantViolation { message }
}

/// Check all engine invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(engine: &GameEngine) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let board = engine.board();
    let config = engine.config();
    let systems = board.systems();
    let footprint = board.footprint();

    for (i, system) in systems.iter().enumerate() {
        let far = system.anchor.offset(footprint - 1, footprint - 1);
        if !board.in_bounds(system.anchor) || !board.in_bounds(far) {
            violations.push(violation(format!(
                "system #{i} at {} leaves the board",
                system.anchor
            )));
        }

        for (j, other) in systems.iter().enumerate().skip(i + 1) {
            let dx = (system.anchor.x - other.anchor.x).abs();
            let dy = (system.anchor.y - other.anchor.y).abs();
            if dx < footprint && dy < footprint {
                violations.push(violation(format!("systems #{i} and #{j} overlap")));
            }
            let distance = doubled_center_distance(system.anchor, other.anchor, config.footprint);
            if distance < 2 * i32::from(config.min_system_distance) {
                violations.push(violation(format!(
                    "systems #{i} and #{j} centers are {}.{} apart, minimum {}",
                    distance / 2,
                    if distance % 2 == 0 { 0 } else { 5 },
                    config.min_system_distance
                )));
            }
        }
    }

    let held = engine.player().map_or(0, |player| player.inventory().len());
    let total = engine.racks().totem_count() + held;
    if total != engine.initial_totem_count() {
        violations.push(violation(format!(
            "{total} totems exist, {} were created",
            engine.initial_totem_count()
        )));
    }

    if let Some(player) = engine.player() {
        if player.inventory().len() > player.capacity() {
            violations.push(violation(format!(
                "inventory holds {} totems, capacity {}",
                player.inventory().len(),
                player.capacity()
            )));
        }
        if player.ship.movement_points() > player.ship.budget() {
            violations.push(violation(format!(
                "ship has {} movement points, budget {}",
                player.ship.movement_points(),
                player.ship.budget()
            )));
        }
        if !board.in_bounds(player.ship.position) {
            violations.push(violation(format!(
                "ship at {} is off the board",
                player.ship.position
            )));
        }
    }

    if let Some(observation) = engine.observation() {
        match board.system(observation.system) {
            Some(system) if !system.revealed => violations.push(violation(format!(
                "observed system {} is not revealed",
                observation.system
            ))),
            None => violations.push(violation(format!(
                "observed system {} does not exist",
                observation.system
            ))),
            Some(_) => {}
        }
        if !engine.flags().observed {
            violations.push(violation(
                "observation in flight but observer not marked used".to_string(),
            ));
        }
    }

    violations
}

/// Assert all engine invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(engine: &GameEngine) {
    let violations = check_invariants(engine);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Engine invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_engine: &GameEngine) {}

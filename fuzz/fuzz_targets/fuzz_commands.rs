#![no_main]

//! Command stream fuzzer.
//!
//! Sets up a game from a fuzzer-chosen seed and color, then applies an
//! arbitrary command sequence on a simulated clock. Engine invariants must
//! hold after every command, and rejected commands must change nothing.

use std::time::{Duration, Instant};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use space_explore::game::check_invariants;
use space_explore::{Cell, Command, Direction, GameConfig, GameEngine, SystemColor};

/// A fuzzer-generated command.
#[derive(Arbitrary, Debug, Clone, Copy)]
enum FuzzCommand {
    Move(u8),
    Collect,
    Deposit(Option<u8>),
    Influence,
    ObserverArm,
    ObserverTarget { x: u8, y: u8 },
    ObserverCancel,
    EndTurn,
    /// Let simulated time pass without a command.
    Wait(u16),
}

/// Structured input for one game.
#[derive(Arbitrary, Debug)]
struct GameInput {
    seed: u64,
    color: u8,
    commands: Vec<FuzzCommand>,
}

fuzz_target!(|input: GameInput| {
    let Ok(mut engine) = GameEngine::new(GameConfig::default(), input.seed) else {
        return;
    };
    let color = SystemColor::ALL[usize::from(input.color) % SystemColor::COUNT];
    if engine.setup_game_as(color).is_err() {
        return;
    }

    let violations = check_invariants(&engine);
    assert!(violations.is_empty(), "Invariants violated at start: {violations:?}");

    let mut now = Instant::now();
    for fuzz in input.commands.into_iter().take(500) {
        let command = match fuzz {
            FuzzCommand::Move(d) => Command::Move(Direction::ALL[usize::from(d) % 8]),
            FuzzCommand::Collect => Command::Collect,
            FuzzCommand::Deposit(index) => Command::Deposit(index.map(usize::from)),
            FuzzCommand::Influence => Command::Influence,
            FuzzCommand::ObserverArm => Command::ObserverArm,
            FuzzCommand::ObserverTarget { x, y } => {
                // Off-board targets are fine; the engine must reject them
                Command::ObserverTarget(Cell::new(i32::from(x) - 4, i32::from(y) - 4))
            }
            FuzzCommand::ObserverCancel => Command::ObserverCancel,
            FuzzCommand::EndTurn => Command::EndTurn,
            FuzzCommand::Wait(ms) => {
                now += Duration::from_millis(u64::from(ms));
                engine.tick(now);
                continue;
            }
        };

        let before = engine.snapshot();
        if engine.apply(command, now).is_err() {
            assert_eq!(before, engine.snapshot(), "rejected {command} changed state");
        }

        let violations = check_invariants(&engine);
        assert!(violations.is_empty(), "Invariants violated after {command}: {violations:?}");
    }
});

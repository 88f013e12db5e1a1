//! Run command implementation - apply a command script headlessly.

use super::output::format_text;
use super::{CliError, OutputFormat, new_game};
use serde::Serialize;
use space_explore::game::{GameSnapshot, check_invariants, parse_script};
use space_explore::{Command, GameEngine, Outcome, SystemColor};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Options for the run command.
#[derive(Debug)]
pub(crate) struct RunOptions {
    /// Inline commands.
    pub(crate) commands: Vec<String>,
    /// Script file, read before the inline commands.
    pub(crate) script: Option<PathBuf>,
    /// Random seed.
    pub(crate) seed: Option<u64>,
    /// Config file.
    pub(crate) config: Option<PathBuf>,
    /// Player color.
    pub(crate) color: Option<SystemColor>,
    /// Simulated time between commands.
    pub(crate) tick_ms: u64,
    /// Output format.
    pub(crate) format: OutputFormat,
    /// Stop at the first rejection.
    pub(crate) strict: bool,
}

/// One applied command and what came of it.
#[derive(Debug, Serialize)]
struct StepRecord {
    /// Command text.
    command: String,
    /// Outcome on success.
    outcome: Option<Outcome>,
    /// Rejection reason.
    error: Option<String>,
}

/// JSON document printed by `--format json`.
#[derive(Debug, Serialize)]
struct RunReport {
    steps: Vec<StepRecord>,
    snapshot: GameSnapshot,
}

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the script cannot be read or parsed, setup fails, a
/// command is rejected in strict mode, or an engine invariant breaks.
pub(crate) fn execute(options: RunOptions) -> Result<(), CliError> {
    let mut commands = Vec::new();
    if let Some(path) = &options.script {
        let text = fs::read_to_string(path)
            .map_err(|e| CliError::new(format!("Failed to read {}: {e}", path.display())))?;
        commands.extend(parse_script(&text)?);
    }
    commands.extend(parse_script(&options.commands.join(" "))?);

    let mut engine = new_game(options.config, options.seed, options.color)?;
    let steps = play_script(
        &mut engine,
        &commands,
        Duration::from_millis(options.tick_ms),
        options.strict,
    )?;
    let snapshot = engine.snapshot();

    match options.format {
        OutputFormat::Text => {
            for step in &steps {
                match (&step.outcome, &step.error) {
                    (Some(outcome), _) => println!("{:>10}  ok  {outcome:?}", step.command),
                    (None, Some(error)) => println!("{:>10}  --  {error}", step.command),
                    (None, None) => {}
                }
            }
            println!();
            print!("{}", format_text(&snapshot, false));
        }
        OutputFormat::Json => {
            let report = RunReport { steps, snapshot };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Apply `commands` in order on a simulated clock, stopping at game over.
fn play_script(
    engine: &mut GameEngine,
    commands: &[Command],
    tick: Duration,
    strict: bool,
) -> Result<Vec<StepRecord>, CliError> {
    let mut now = Instant::now();
    let mut steps = Vec::with_capacity(commands.len());

    for &command in commands {
        now += tick;
        engine.tick(now);

        let result = engine.apply(command, now);
        let violations = check_invariants(engine);
        if let Some(violation) = violations.first() {
            return Err(CliError::new(format!("after `{command}`: {violation}")));
        }

        match result {
            Ok(outcome) => {
                steps.push(StepRecord {
                    command: command.to_string(),
                    outcome: Some(outcome),
                    error: None,
                });
                if outcome.is_game_over() {
                    break;
                }
            }
            Err(err) if strict => {
                return Err(CliError::new(format!("command `{command}` rejected: {err}")));
            }
            Err(err) => steps.push(StepRecord {
                command: command.to_string(),
                outcome: None,
                error: Some(err.to_string()),
            }),
        }
    }

    Ok(steps)
}

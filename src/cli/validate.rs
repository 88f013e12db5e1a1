//! Config validation command implementation.

use super::{CliError, resolve_seed};
use space_explore::{GameConfig, GameEngine, SystemColor};
use std::path::PathBuf;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, does not parse, or fails
/// validation.
pub(crate) fn execute(path: PathBuf, seed: Option<u64>) -> Result<(), CliError> {
    println!("Validating: {}", path.display());
    println!();

    let config = GameConfig::from_json_file(&path);
    print_check("JSON parses", config.is_ok());
    let config = config?;

    let validation = config.validate();
    print_check("Settings consistent", validation.is_ok());
    validation?;

    let listed = config.distribution.len();
    print_check("Every color has a rack entry", listed == SystemColor::COUNT);

    println!();
    print!("Trial setup... ");
    let seed = resolve_seed(seed);
    let mut engine = GameEngine::new(config, seed)?;
    match engine.setup_game() {
        Ok(()) => {
            println!("OK");
            println!();
            println!("Summary:");
            println!("  Seed:            {seed}");
            println!("  Board:           {0}x{0}", engine.config().board_size);
            println!("  Systems placed:  {}", engine.board().systems().len());
            println!("  Systems dropped: {}", engine.unplaced().len());
            println!("  Totems:          {}", engine.initial_totem_count());
        }
        Err(e) => {
            println!("FAILED");
            return Err(CliError::new(format!("Trial setup failed: {e}")));
        }
    }

    println!();
    println!("Validation successful!");

    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}

//! Board command implementation - generate a board and print it.

use super::output::format_text;
use super::{CliError, OutputFormat, new_game};
use space_explore::SystemColor;
use std::path::PathBuf;

/// Execute the board command.
///
/// # Errors
///
/// Returns an error if the config is invalid or setup fails.
pub(crate) fn execute(
    seed: Option<u64>,
    config: Option<PathBuf>,
    color: Option<SystemColor>,
    format: OutputFormat,
    reveal_all: bool,
) -> Result<(), CliError> {
    let engine = new_game(config, seed, color)?;
    let snapshot = engine.snapshot();

    match format {
        OutputFormat::Text => {
            print!("{}", format_text(&snapshot, reveal_all));
            if !engine.unplaced().is_empty() {
                println!();
                println!("Unplaced systems: {}", engine.unplaced().len());
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
    }

    Ok(())
}

//! CLI command implementations for Space Explore.

pub(crate) mod board;
pub(crate) mod play;
pub(crate) mod run;
pub(crate) mod validate;

mod output;

use clap::ValueEnum;
use space_explore::{CommandParseError, ConfigError, GameConfig, GameEngine, SetupError, SystemColor};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Output format for the `board` and `run` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// CLI error type.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(format!("invalid configuration: {e}"))
    }
}

impl From<SetupError> for CliError {
    fn from(e: SetupError) -> Self {
        Self::new(format!("game setup failed: {e}"))
    }
}

impl From<CommandParseError> for CliError {
    fn from(e: CommandParseError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("JSON output failed: {e}"))
    }
}

/// Install the tracing subscriber.
///
/// Logs go to `log_file` when given, otherwise to stderr if `to_stderr` is
/// set. The interactive client passes neither so logs never touch the TUI.
pub(crate) fn init_tracing(log_file: Option<&Path>, to_stderr: bool) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    if let Some(path) = log_file {
        let file = File::create(path).map_err(|e| {
            CliError::new(format!("Failed to create log file {}: {e}", path.display()))
        })?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    } else if to_stderr {
        builder.with_writer(std::io::stderr).init();
    }
    Ok(())
}

/// Parse a color name for clap.
pub(crate) fn parse_color(name: &str) -> Result<SystemColor, String> {
    SystemColor::ALL
        .into_iter()
        .find(|color| color.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            let names: Vec<_> = SystemColor::ALL.iter().map(|c| c.name()).collect();
            format!("unknown color `{name}` (expected one of {})", names.join(", "))
        })
}

/// Load the config file, or the defaults.
pub(crate) fn load_config(path: Option<&Path>) -> Result<GameConfig, CliError> {
    match path {
        Some(path) => Ok(GameConfig::from_json_file(path)?),
        None => Ok(GameConfig::default()),
    }
}

/// Use the given seed or derive one from the clock.
pub(crate) fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() ^ u64::from(d.subsec_nanos()))
            .unwrap_or(42)
    })
}

/// Build and set up an engine from CLI options.
pub(crate) fn new_game(
    config: Option<PathBuf>,
    seed: Option<u64>,
    color: Option<SystemColor>,
) -> Result<GameEngine, CliError> {
    let config = load_config(config.as_deref())?;
    let mut engine = GameEngine::new(config, resolve_seed(seed))?;
    match color {
        Some(color) => engine.setup_game_as(color)?,
        None => engine.setup_game()?,
    }
    Ok(engine)
}

//! Player commands and their text syntax.
//!
//! | text          | command                         |
//! |---------------|---------------------------------|
//! | `n` .. `nw`   | [`Command::Move`]               |
//! | `collect`     | [`Command::Collect`]            |
//! | `deposit[:i]` | [`Command::Deposit`]            |
//! | `influence`   | [`Command::Influence`]          |
//! | `observe`     | [`Command::ObserverArm`]        |
//! | `target:x,y`  | [`Command::ObserverTarget`]     |
//! | `cancel`      | [`Command::ObserverCancel`]     |
//! | `end`         | [`Command::EndTurn`]            |

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CommandParseError;
use crate::game::{Cell, Direction, Faction, FactionCard, SystemColor, SystemId, VictoryCondition};

/// A discrete input pushed into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Take one step.
    Move(Direction),
    /// Take the active faction's totem from the current system's rack.
    Collect,
    /// Return a held totem to the current system's rack; defaults to the first.
    Deposit(Option<usize>),
    /// Rotate the card queue of the current capital's color.
    Influence,
    /// Enter observer selection.
    ObserverArm,
    /// Pick the system to observe.
    ObserverTarget(Cell),
    /// Leave observer selection without observing.
    ObserverCancel,
    /// Finish the turn.
    EndTurn,
}

impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();
        let (verb, arg) = match text.split_once(':') {
            Some((verb, arg)) => (verb.trim(), Some(arg.trim())),
            None => (text.as_str(), None),
        };
        let bad_arg = |arg: &str| CommandParseError::InvalidArgument {
            verb: verb.to_string(),
            arg: arg.to_string(),
        };

        if let Some(direction) = Direction::from_label(verb) {
            return match arg {
                None => Ok(Command::Move(direction)),
                Some(arg) => Err(bad_arg(arg)),
            };
        }

        match (verb, arg) {
            ("collect", None) => Ok(Command::Collect),
            ("deposit", None) => Ok(Command::Deposit(None)),
            ("deposit", Some(arg)) => arg
                .parse()
                .map(|index| Command::Deposit(Some(index)))
                .map_err(|_| bad_arg(arg)),
            ("influence", None) => Ok(Command::Influence),
            ("observe", None) => Ok(Command::ObserverArm),
            ("target", Some(arg)) => parse_cell(arg)
                .map(Command::ObserverTarget)
                .ok_or_else(|| bad_arg(arg)),
            ("cancel", None) => Ok(Command::ObserverCancel),
            ("end", None) => Ok(Command::EndTurn),
            ("collect" | "influence" | "observe" | "cancel" | "end", Some(arg)) => Err(bad_arg(arg)),
            ("target", None) => Err(bad_arg("")),
            _ => Err(CommandParseError::UnknownCommand(s.trim().to_string())),
        }
    }
}

fn parse_cell(arg: &str) -> Option<Cell> {
    let (x, y) = arg.split_once(',')?;
    Some(Cell::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move(direction) => write!(f, "{}", direction.label()),
            Command::Collect => write!(f, "collect"),
            Command::Deposit(None) => write!(f, "deposit"),
            Command::Deposit(Some(index)) => write!(f, "deposit:{index}"),
            Command::Influence => write!(f, "influence"),
            Command::ObserverArm => write!(f, "observe"),
            Command::ObserverTarget(cell) => write!(f, "target:{},{}", cell.x, cell.y),
            Command::ObserverCancel => write!(f, "cancel"),
            Command::EndTurn => write!(f, "end"),
        }
    }
}

/// Parse a whitespace- or newline-separated script. Lines starting with `#`
/// are comments.
///
/// # Errors
///
/// Returns the first token that fails to parse.
pub fn parse_script(script: &str) -> Result<Vec<Command>, CommandParseError> {
    script
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(str::split_whitespace)
        .map(str::parse::<Command>)
        .collect()
}

/// What a successful command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// The ship stepped to `to`.
    Moved {
        /// Destination cell.
        to: Cell,
        /// Points left after the step.
        remaining: u32,
        /// System entered by the step, if any; entering one ends movement.
        entered: Option<SystemId>,
    },
    /// A totem moved from a rack to the inventory.
    Collected {
        /// Faction of the collected totem.
        faction: Faction,
        /// Rack it came from.
        color: SystemColor,
    },
    /// A totem moved from the inventory to a rack.
    Deposited {
        /// Faction of the deposited totem.
        faction: Faction,
        /// Rack it went to.
        color: SystemColor,
    },
    /// The rack's card queue rotated; the new active card is announced.
    Influenced(FactionCard),
    /// Observer selection is waiting for a target.
    ObserverArmed,
    /// A hidden system is revealed until the observer timer expires.
    Observing(SystemId),
    /// Observer selection was abandoned.
    ObserverCancelled,
    /// A new turn started.
    TurnStarted(u32),
    /// The game ended.
    GameOver {
        /// Final score.
        final_score: u32,
        /// Satisfied victory predicate, if the game was won.
        victory: Option<VictoryCondition>,
    },
}

impl Outcome {
    /// Whether this outcome terminated the game.
    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        matches!(self, Outcome::GameOver { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_moves() {
        assert_eq!("n".parse(), Ok(Command::Move(Direction::North)));
        assert_eq!(" SW ".parse(), Ok(Command::Move(Direction::SouthWest)));
        assert!("n:2".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_actions() {
        assert_eq!("collect".parse(), Ok(Command::Collect));
        assert_eq!("deposit".parse(), Ok(Command::Deposit(None)));
        assert_eq!("deposit:2".parse(), Ok(Command::Deposit(Some(2))));
        assert_eq!("influence".parse(), Ok(Command::Influence));
        assert_eq!("observe".parse(), Ok(Command::ObserverArm));
        assert_eq!("target:3,14".parse(), Ok(Command::ObserverTarget(Cell::new(3, 14))));
        assert_eq!("cancel".parse(), Ok(Command::ObserverCancel));
        assert_eq!("end".parse(), Ok(Command::EndTurn));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "warp".parse::<Command>(),
            Err(CommandParseError::UnknownCommand("warp".to_string()))
        );
        assert!(matches!(
            "deposit:x".parse::<Command>(),
            Err(CommandParseError::InvalidArgument { .. })
        ));
        assert!("target:3".parse::<Command>().is_err());
        assert!("target".parse::<Command>().is_err());
        assert!("end:now".parse::<Command>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        let commands = [
            Command::Move(Direction::NorthEast),
            Command::Deposit(Some(4)),
            Command::ObserverTarget(Cell::new(-1, 7)),
            Command::EndTurn,
        ];
        for command in commands {
            assert_eq!(command.to_string().parse(), Ok(command));
        }
    }

    #[test]
    fn test_parse_script() {
        let script = "# opening\nn ne\n\ncollect end\n";
        let commands = parse_script(script).unwrap();
        assert_eq!(commands.len(), 4);
        assert_eq!(commands[2], Command::Collect);
        assert!(parse_script("n bogus").is_err());
    }
}

//! Static game configuration.
//!
//! Every tunable constant lives here and is handed to the engine once at
//! construction. `Default` reproduces the reference game; a JSON file may
//! override any subset of fields.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::game::{Faction, FactionCatalog, SystemColor};

/// Per-color faction distribution: how many faction cards each listed faction
/// contributes to that color's rack. Listed factions also seed totems.
pub type DistributionTable = BTreeMap<SystemColor, BTreeMap<Faction, u32>>;

/// Complete configuration for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width and height of the square board, in cells.
    pub board_size: u16,
    /// Side length of every system footprint, in cells.
    pub footprint: u16,
    /// Minimum Chebyshev distance between two system centers.
    pub min_system_distance: u16,
    /// Lowest anchor coordinate allowed on each axis.
    pub edge_margin: u16,
    /// Number of planet systems to place (capitals are one per color).
    pub planet_count: u16,
    /// Movement points restored at the start of every turn.
    pub movement_points_per_turn: u32,
    /// Maximum number of totems the player may hold.
    pub inventory_capacity: usize,
    /// The game ends when the turn counter exceeds this.
    pub max_turns: u32,
    /// Base score the player starts with.
    pub starting_base_score: u32,
    /// Points removed from the base score at every end of turn.
    pub end_turn_penalty: u32,
    /// Bonus per color with at least `set_threshold` held totems.
    pub color_set_bonus: u32,
    /// Bonus per faction with at least `set_threshold` held totems.
    pub faction_set_bonus: u32,
    /// Count at which a color or faction set earns its bonus.
    pub set_threshold: usize,
    /// Totems seeded per listed faction in each rack.
    pub totems_per_faction: u32,
    /// How long an observer reveal lasts, in milliseconds.
    pub observer_duration_ms: u64,
    /// Faction names, values, and symbols.
    pub factions: FactionCatalog,
    /// Card counts per faction per color.
    pub distribution: DistributionTable,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: 24,
            footprint: 2,
            min_system_distance: 3,
            edge_margin: 2,
            planet_count: 8,
            movement_points_per_turn: 4,
            inventory_capacity: 9,
            max_turns: 40,
            starting_base_score: 5000,
            end_turn_penalty: 200,
            color_set_bonus: 1000,
            faction_set_bonus: 10,
            set_threshold: 3,
            totems_per_faction: 3,
            observer_duration_ms: 2000,
            factions: FactionCatalog::default(),
            distribution: default_distribution(),
        }
    }
}

fn default_distribution() -> DistributionTable {
    use Faction::{A, B, C, D, E, F};

    let rows: [(SystemColor, &[(Faction, u32)]); 7] = [
        (SystemColor::Yellow, &[(A, 6), (B, 1)]),
        (SystemColor::Red, &[(C, 2), (D, 5)]),
        (SystemColor::Violet, &[(E, 4), (F, 3)]),
        (SystemColor::Orange, &[(A, 4), (B, 1), (D, 1), (F, 1)]),
        (SystemColor::Green, &[(A, 3), (C, 1), (D, 1), (E, 2)]),
        (SystemColor::Blue, &[(A, 1), (B, 1), (C, 1), (D, 2), (E, 1), (F, 1)]),
        (SystemColor::Rose, &[(A, 4), (D, 2), (E, 1)]),
    ];

    rows.into_iter()
        .map(|(color, counts)| (color, counts.iter().copied().collect()))
        .collect()
}

impl GameConfig {
    /// Parse a (possibly partial) JSON document; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fails [`GameConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Check the configuration-data invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.footprint == 0 {
            return Err(invalid("footprint", "must be at least 1"));
        }
        if self.min_system_distance < self.footprint {
            return Err(invalid(
                "min_system_distance",
                format!(
                    "{} is smaller than the footprint {}, systems could overlap",
                    self.min_system_distance, self.footprint
                ),
            ));
        }
        if u32::from(self.board_size)
            <= u32::from(self.edge_margin) + u32::from(self.footprint)
        {
            return Err(invalid(
                "board_size",
                format!(
                    "{} leaves no anchor between margin {} and footprint {}",
                    self.board_size, self.edge_margin, self.footprint
                ),
            ));
        }
        if self.movement_points_per_turn == 0 {
            return Err(invalid("movement_points_per_turn", "must be at least 1"));
        }
        if self.inventory_capacity == 0 {
            return Err(invalid("inventory_capacity", "must be at least 1"));
        }
        if self.max_turns == 0 {
            return Err(invalid("max_turns", "must be at least 1"));
        }
        if self.set_threshold == 0 {
            return Err(invalid("set_threshold", "must be at least 1"));
        }

        for (i, info) in self.factions.iter().enumerate() {
            if self.factions.iter().skip(i + 1).any(|other| other.id == info.id) {
                return Err(ConfigError::DuplicateFaction(info.id));
            }
        }

        for (&color, counts) in &self.distribution {
            for &faction in counts.keys() {
                if self.factions.get(faction).is_none() {
                    return Err(ConfigError::UnknownFaction { faction, color });
                }
            }
        }

        let best = self.max_possible_score();
        if best > u64::from(u32::MAX) {
            return Err(invalid(
                "starting_base_score",
                format!(
                    "base {} plus the best possible hand reaches {best}, above {}",
                    self.starting_base_score,
                    u32::MAX
                ),
            ));
        }

        Ok(())
    }

    /// Highest total a player could reach: the starting base plus a full
    /// inventory of the most valuable faction with every set bonus earned.
    fn max_possible_score(&self) -> u64 {
        let widen = |n: usize| u64::try_from(n).unwrap_or(u64::MAX);
        let max_value = self.factions.iter().map(|info| info.value).max().unwrap_or(0);
        let sets = self.inventory_capacity / self.set_threshold;
        let color_sets = widen(sets.min(SystemColor::COUNT));
        let faction_sets = widen(sets.min(self.factions.len()));

        u64::from(self.starting_base_score)
            .saturating_add(widen(self.inventory_capacity).saturating_mul(u64::from(max_value)))
            .saturating_add(color_sets.saturating_mul(u64::from(self.color_set_bonus)))
            .saturating_add(faction_sets.saturating_mul(u64::from(self.faction_set_bonus)))
    }

    /// Observer reveal duration.
    #[must_use]
    pub const fn observer_duration(&self) -> Duration {
        Duration::from_millis(self.observer_duration_ms)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::FactionInfo;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_distribution_covers_every_color() {
        let config = GameConfig::default();
        for color in SystemColor::ALL {
            assert!(config.distribution.contains_key(&color), "missing {color}");
        }
        let blue = &config.distribution[&SystemColor::Blue];
        assert_eq!(blue.len(), 6);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json_str(r#"{"max_turns": 10, "planet_count": 2}"#).unwrap();
        assert_eq!(config.max_turns, 10);
        assert_eq!(config.planet_count, 2);
        assert_eq!(config.board_size, 24);
        assert_eq!(config.end_turn_penalty, 200);
    }

    #[test]
    fn test_distribution_from_json() {
        let json = r#"{"distribution": {"yellow": {"A": 2}, "rose": {"F": 1, "B": 3}}}"#;
        let config = GameConfig::from_json_str(json).unwrap();
        assert_eq!(config.distribution.len(), 2);
        assert_eq!(config.distribution[&SystemColor::Rose][&Faction::B], 3);
    }

    #[test]
    fn test_unknown_faction_rejected() {
        let mut config = GameConfig::default();
        config.factions = FactionCatalog::new(vec![FactionInfo {
            id: Faction::A,
            name: "ACTOS".to_string(),
            value: 80,
            symbol: "Losange".to_string(),
        }]);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownFaction { .. }));
    }

    #[test]
    fn test_overlapping_distance_rejected() {
        let config = GameConfig {
            footprint: 3,
            min_system_distance: 2,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "min_system_distance", .. })
        ));
    }

    #[test]
    fn test_unbounded_base_score_rejected() {
        let err = GameConfig::from_json_str(r#"{"starting_base_score": 4294967295}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { field: "starting_base_score", .. }
        ));
    }

    #[test]
    fn test_score_ceiling_is_exact() {
        // Default best hand: 9 * 1000 value, 3 color sets, 3 faction sets.
        let best_hand = 9 * 1000 + 3 * 1000 + 3 * 10;
        let at_limit = GameConfig {
            starting_base_score: u32::MAX - best_hand,
            ..GameConfig::default()
        };
        assert!(at_limit.validate().is_ok());

        let over = GameConfig {
            starting_base_score: u32::MAX - best_hand + 1,
            ..GameConfig::default()
        };
        assert!(over.validate().is_err());
    }

    #[test]
    fn test_huge_faction_value_rejected() {
        let mut config = GameConfig::default();
        config.factions = FactionCatalog::new(
            FactionCatalog::default()
                .iter()
                .map(|info| FactionInfo {
                    value: u32::MAX / 4,
                    ..info.clone()
                })
                .collect(),
        );
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "starting_base_score", .. })
        ));
    }

    #[test]
    fn test_board_too_small_rejected() {
        let config = GameConfig {
            board_size: 4,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"board_size": 30, "observer_duration_ms": 500}}"#).unwrap();

        let config = GameConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.board_size, 30);
        assert_eq!(config.observer_duration(), Duration::from_millis(500));
    }

    #[test]
    fn test_missing_file() {
        let err = GameConfig::from_json_file(Path::new("/nonexistent/space.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = GameConfig::from_json_str("{ board_size: ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}

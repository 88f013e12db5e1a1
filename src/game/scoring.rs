//! Score and victory evaluation.
//!
//! Both are pure functions of the held totems and are recomputed on every
//! query.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::game::{Faction, GameConfig, SystemColor, Totem};

/// Totem score split into its parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    /// Sum of held totem values.
    pub totem_value: u32,
    /// Bonus for colors held at or above the set threshold.
    pub color_bonus: u32,
    /// Bonus for factions held at or above the set threshold.
    pub faction_bonus: u32,
    /// `totem_value + color_bonus + faction_bonus`.
    pub total: u32,
}

/// Compute the totem score of `totems`.
#[must_use]
pub fn calculate_score(totems: &[Totem], config: &GameConfig) -> ScoreBreakdown {
    let totem_value = totems.iter().map(Totem::value).fold(0, u32::saturating_add);

    let mut by_color: BTreeMap<SystemColor, usize> = BTreeMap::new();
    let mut by_faction: BTreeMap<Faction, usize> = BTreeMap::new();
    for totem in totems {
        *by_color.entry(totem.color()).or_default() += 1;
        *by_faction.entry(totem.faction()).or_default() += 1;
    }

    let color_bonus = set_bonus(by_color.values(), config.set_threshold, config.color_set_bonus);
    let faction_bonus =
        set_bonus(by_faction.values(), config.set_threshold, config.faction_set_bonus);

    ScoreBreakdown {
        totem_value,
        color_bonus,
        faction_bonus,
        total: totem_value.saturating_add(color_bonus).saturating_add(faction_bonus),
    }
}

fn set_bonus<'a>(counts: impl Iterator<Item = &'a usize>, threshold: usize, bonus: u32) -> u32 {
    counts
        .filter(|&&count| count >= threshold)
        .fold(0, |total, _| total.saturating_add(bonus))
}

/// The four alternative victory predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VictoryCondition {
    /// At least one totem of every faction.
    AllFactions,
    /// At least one totem of every color.
    AllColors,
    /// Some color held at the set threshold across as many distinct factions.
    ColorSet(SystemColor),
    /// Some faction held at the set threshold across as many distinct colors.
    FactionSet(Faction),
}

impl fmt::Display for VictoryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VictoryCondition::AllFactions => write!(f, "every faction collected"),
            VictoryCondition::AllColors => write!(f, "every color collected"),
            VictoryCondition::ColorSet(color) => write!(f, "{color} set of distinct factions"),
            VictoryCondition::FactionSet(faction) => {
                write!(f, "faction {faction} set across distinct colors")
            }
        }
    }
}

/// Return the first satisfied victory predicate, checked in order.
///
/// An empty inventory never wins.
#[must_use]
pub fn check_victory(totems: &[Totem], config: &GameConfig) -> Option<VictoryCondition> {
    if totems.is_empty() {
        return None;
    }

    let factions: BTreeSet<Faction> = totems.iter().map(Totem::faction).collect();
    if factions.len() == Faction::COUNT {
        return Some(VictoryCondition::AllFactions);
    }

    let colors: BTreeSet<SystemColor> = totems.iter().map(Totem::color).collect();
    if colors.len() == SystemColor::COUNT {
        return Some(VictoryCondition::AllColors);
    }

    let threshold = config.set_threshold;

    let mut by_color: BTreeMap<SystemColor, Vec<Faction>> = BTreeMap::new();
    for totem in totems {
        by_color.entry(totem.color()).or_default().push(totem.faction());
    }
    for (color, members) in &by_color {
        let distinct: BTreeSet<_> = members.iter().collect();
        if members.len() >= threshold && distinct.len() >= threshold {
            return Some(VictoryCondition::ColorSet(*color));
        }
    }

    let mut by_faction: BTreeMap<Faction, Vec<SystemColor>> = BTreeMap::new();
    for totem in totems {
        by_faction.entry(totem.faction()).or_default().push(totem.color());
    }
    for (faction, members) in &by_faction {
        let distinct: BTreeSet<_> = members.iter().collect();
        if members.len() >= threshold && distinct.len() >= threshold {
            return Some(VictoryCondition::FactionSet(*faction));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{FactionCatalog, FactionInfo};

    fn totem(faction: Faction, color: SystemColor) -> Totem {
        Totem::new(faction, color, &FactionCatalog::default()).unwrap()
    }

    #[test]
    fn test_empty_score() {
        let score = calculate_score(&[], &GameConfig::default());
        assert_eq!(score, ScoreBreakdown::default());
    }

    #[test]
    fn test_value_sum() {
        let totems = [totem(Faction::B, SystemColor::Blue), totem(Faction::D, SystemColor::Red)];
        let score = calculate_score(&totems, &GameConfig::default());
        assert_eq!(score.totem_value, 1150);
        assert_eq!(score.total, 1150);
    }

    #[test]
    fn test_color_bonus_threshold() {
        let config = GameConfig::default();
        let mut totems = vec![
            totem(Faction::D, SystemColor::Red),
            totem(Faction::D, SystemColor::Red),
        ];
        assert_eq!(calculate_score(&totems, &config).color_bonus, 0);

        totems.push(totem(Faction::C, SystemColor::Red));
        let score = calculate_score(&totems, &config);
        assert_eq!(score.color_bonus, 1000);
        assert_eq!(score.faction_bonus, 0);

        totems.push(totem(Faction::C, SystemColor::Red));
        assert_eq!(calculate_score(&totems, &config).color_bonus, 1000);
    }

    #[test]
    fn test_faction_bonus_threshold() {
        let config = GameConfig::default();
        let totems = [
            totem(Faction::A, SystemColor::Yellow),
            totem(Faction::A, SystemColor::Red),
            totem(Faction::A, SystemColor::Blue),
        ];
        let score = calculate_score(&totems, &config);
        assert_eq!(score.totem_value, 240);
        assert_eq!(score.faction_bonus, 10);
        assert_eq!(score.color_bonus, 0);
        assert_eq!(score.total, 250);
    }

    #[test]
    fn test_score_saturates() {
        let mut config = GameConfig::default();
        config.factions = FactionCatalog::new(
            FactionCatalog::default()
                .iter()
                .map(|info| FactionInfo {
                    value: u32::MAX / 2,
                    ..info.clone()
                })
                .collect(),
        );
        config.color_set_bonus = u32::MAX;
        let totems: Vec<_> = (0..3)
            .map(|_| Totem::new(Faction::B, SystemColor::Blue, &config.factions).unwrap())
            .collect();

        let score = calculate_score(&totems, &config);
        assert_eq!(score.totem_value, u32::MAX);
        assert_eq!(score.color_bonus, u32::MAX);
        assert_eq!(score.total, u32::MAX);
    }

    #[test]
    fn test_no_victory_when_empty() {
        assert_eq!(check_victory(&[], &GameConfig::default()), None);
    }

    #[test]
    fn test_faction_set_victory() {
        let totems = [
            totem(Faction::A, SystemColor::Yellow),
            totem(Faction::A, SystemColor::Red),
            totem(Faction::A, SystemColor::Blue),
        ];
        assert_eq!(
            check_victory(&totems, &GameConfig::default()),
            Some(VictoryCondition::FactionSet(Faction::A))
        );
    }

    #[test]
    fn test_color_set_victory() {
        let totems = [
            totem(Faction::A, SystemColor::Blue),
            totem(Faction::B, SystemColor::Blue),
            totem(Faction::C, SystemColor::Blue),
        ];
        assert_eq!(
            check_victory(&totems, &GameConfig::default()),
            Some(VictoryCondition::ColorSet(SystemColor::Blue))
        );
    }

    #[test]
    fn test_same_faction_same_color_is_not_a_set() {
        let totems = [
            totem(Faction::D, SystemColor::Red),
            totem(Faction::D, SystemColor::Red),
            totem(Faction::D, SystemColor::Red),
        ];
        assert_eq!(check_victory(&totems, &GameConfig::default()), None);
    }

    #[test]
    fn test_all_factions_victory() {
        let totems: Vec<_> = Faction::ALL
            .iter()
            .map(|&faction| totem(faction, SystemColor::Blue))
            .collect();
        assert_eq!(
            check_victory(&totems, &GameConfig::default()),
            Some(VictoryCondition::AllFactions)
        );
    }

    #[test]
    fn test_all_colors_victory() {
        let totems: Vec<_> = SystemColor::ALL
            .iter()
            .map(|&color| totem(Faction::A, color))
            .collect();
        assert_eq!(
            check_victory(&totems, &GameConfig::default()),
            Some(VictoryCondition::AllColors)
        );
    }
}

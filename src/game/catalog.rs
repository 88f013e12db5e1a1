//! Colors, factions, and the faction catalog.
//!
//! Colors are the identity key shared by systems, racks, and totems, so they
//! are a closed enum rather than raw RGB values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the seven system colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemColor {
    /// Yellow.
    Yellow,
    /// Red.
    Red,
    /// Violet.
    Violet,
    /// Orange.
    Orange,
    /// Green.
    Green,
    /// Blue.
    Blue,
    /// Rose.
    Rose,
}

impl SystemColor {
    /// Every color, in palette order.
    pub const ALL: [SystemColor; 7] = [
        SystemColor::Yellow,
        SystemColor::Red,
        SystemColor::Violet,
        SystemColor::Orange,
        SystemColor::Green,
        SystemColor::Blue,
        SystemColor::Rose,
    ];

    /// Number of colors in the palette.
    pub const COUNT: usize = Self::ALL.len();

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            SystemColor::Yellow => "Yellow",
            SystemColor::Red => "Red",
            SystemColor::Violet => "Violet",
            SystemColor::Orange => "Orange",
            SystemColor::Green => "Green",
            SystemColor::Blue => "Blue",
            SystemColor::Rose => "Rose",
        }
    }

    /// Position in [`SystemColor::ALL`], used to index per-color tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SystemColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One of the six factions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// Faction A.
    A,
    /// Faction B.
    B,
    /// Faction C.
    C,
    /// Faction D.
    D,
    /// Faction E.
    E,
    /// Faction F.
    F,
}

impl Faction {
    /// Every faction, in catalog order.
    pub const ALL: [Faction; 6] = [
        Faction::A,
        Faction::B,
        Faction::C,
        Faction::D,
        Faction::E,
        Faction::F,
    ];

    /// Number of factions.
    pub const COUNT: usize = Self::ALL.len();

    /// Single-letter identifier.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Faction::A => 'A',
            Faction::B => 'B',
            Faction::C => 'C',
            Faction::D => 'D',
            Faction::E => 'E',
            Faction::F => 'F',
        }
    }

    /// Position in [`Faction::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Static description of a faction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionInfo {
    /// Faction identifier.
    pub id: Faction,
    /// Display name.
    pub name: String,
    /// Point value of each of its totems.
    pub value: u32,
    /// Symbol printed on its totems.
    pub symbol: String,
}

impl FactionInfo {
    fn new(id: Faction, name: &str, value: u32, symbol: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            value,
            symbol: symbol.to_string(),
        }
    }
}

/// Lookup table from faction to its static description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactionCatalog {
    factions: Vec<FactionInfo>,
}

impl FactionCatalog {
    /// Build a catalog from a list of entries.
    #[must_use]
    pub fn new(factions: Vec<FactionInfo>) -> Self {
        Self { factions }
    }

    /// Look up a faction.
    #[must_use]
    pub fn get(&self, faction: Faction) -> Option<&FactionInfo> {
        self.factions.iter().find(|info| info.id == faction)
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = &FactionInfo> {
        self.factions.iter()
    }

    /// Number of factions in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factions.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factions.is_empty()
    }
}

impl Default for FactionCatalog {
    fn default() -> Self {
        Self::new(vec![
            FactionInfo::new(Faction::A, "ACTOS", 80, "Losange"),
            FactionInfo::new(Faction::B, "B.O.", 1000, "Triangle"),
            FactionInfo::new(Faction::C, "Confrerie Cursarius", 750, "Clepsydre"),
            FactionInfo::new(Faction::D, "Demos Vita", 150, "Croix"),
            FactionInfo::new(Faction::E, "Esperio Scientus", 300, "Cercles"),
            FactionInfo::new(Faction::F, "Frea Totis", 500, "Carré"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_index_matches_palette_order() {
        for (i, color) in SystemColor::ALL.iter().enumerate() {
            assert_eq!(color.index(), i);
        }
    }

    #[test]
    fn test_color_serde_lowercase() {
        let json = serde_json::to_string(&SystemColor::Rose).unwrap();
        assert_eq!(json, "\"rose\"");
        let back: SystemColor = serde_json::from_str("\"violet\"").unwrap();
        assert_eq!(back, SystemColor::Violet);
    }

    #[test]
    fn test_default_catalog_complete() {
        let catalog = FactionCatalog::default();
        assert_eq!(catalog.len(), Faction::COUNT);
        for faction in Faction::ALL {
            assert!(catalog.get(faction).is_some(), "missing {faction}");
        }
        assert_eq!(catalog.get(Faction::B).unwrap().value, 1000);
    }
}

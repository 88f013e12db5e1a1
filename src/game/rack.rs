//! Totems, faction cards, and the per-color racks that hold them.

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use crate::error::ConfigError;
use crate::game::{Faction, FactionCatalog, GameConfig, GameRng, SystemColor};

/// A collectible token. Moves between a rack and the player, never copied.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Totem {
    faction: Faction,
    color: SystemColor,
    value: u32,
    name: String,
    symbol: String,
}

impl Totem {
    /// Build a totem from the catalog entry of `faction`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownFaction`] if the catalog does not define
    /// the faction; this is a data bug, not a player error.
    pub fn new(
        faction: Faction,
        color: SystemColor,
        catalog: &FactionCatalog,
    ) -> Result<Self, ConfigError> {
        let info = catalog
            .get(faction)
            .ok_or(ConfigError::UnknownFaction { faction, color })?;
        Ok(Self {
            faction,
            color,
            value: info.value,
            name: info.name.clone(),
            symbol: info.symbol.clone(),
        })
    }

    /// Owning faction.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.faction
    }

    /// Color of the rack it originated from.
    #[must_use]
    pub const fn color(&self) -> SystemColor {
        self.color
    }

    /// Point value.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Faction display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Faction symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl fmt::Display for Totem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Totem({}, {})", self.faction, self.color)
    }
}

/// A "relation-faction" card: decides which faction a rack currently yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FactionCard {
    /// Faction this card activates.
    pub faction: Faction,
    /// Rack the card belongs to.
    pub color: SystemColor,
}

impl fmt::Display for FactionCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Card({}, {})", self.faction, self.color)
    }
}

/// Totems and the card rotation for one color.
#[derive(Debug)]
pub struct Rack {
    color: SystemColor,
    totems: Vec<Totem>,
    cards: VecDeque<FactionCard>,
}

impl Rack {
    /// An empty rack.
    #[must_use]
    pub const fn new(color: SystemColor) -> Self {
        Self {
            color,
            totems: Vec::new(),
            cards: VecDeque::new(),
        }
    }

    /// Rack color.
    #[must_use]
    pub const fn color(&self) -> SystemColor {
        self.color
    }

    /// Totems currently held.
    #[must_use]
    pub fn totems(&self) -> &[Totem] {
        &self.totems
    }

    /// Cards in rotation order; the front is active.
    pub fn cards(&self) -> impl Iterator<Item = &FactionCard> {
        self.cards.iter()
    }

    /// Number of cards in rotation.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    /// The active (front) card.
    #[must_use]
    pub fn active_card(&self) -> Option<FactionCard> {
        self.cards.front().copied()
    }

    /// Move the active card to the back. Returns the new active card.
    pub fn rotate(&mut self) -> Option<FactionCard> {
        let top = self.cards.pop_front()?;
        self.cards.push_back(top);
        self.active_card()
    }

    /// Index of the first totem of `faction`.
    #[must_use]
    pub fn find_totem(&self, faction: Faction) -> Option<usize> {
        self.totems.iter().position(|totem| totem.faction == faction)
    }

    /// Remove the totem at `index`.
    pub fn take_totem(&mut self, index: usize) -> Option<Totem> {
        (index < self.totems.len()).then(|| self.totems.remove(index))
    }

    /// Add a totem.
    pub fn put_totem(&mut self, totem: Totem) {
        self.totems.push(totem);
    }

    fn push_card(&mut self, card: FactionCard) {
        self.cards.push_back(card);
    }
}

/// One rack per color, independent of how many systems of that color exist.
#[derive(Debug)]
pub struct Racks {
    racks: [Rack; SystemColor::COUNT],
}

impl Racks {
    /// Seed every rack from the distribution table and shuffle its cards once.
    ///
    /// # Errors
    ///
    /// Returns an error if the table references a faction missing from the catalog.
    pub fn from_config(config: &GameConfig, rng: &mut GameRng) -> Result<Self, ConfigError> {
        let mut racks = SystemColor::ALL.map(Rack::new);

        for (&color, counts) in &config.distribution {
            let rack = &mut racks[color.index()];
            for &faction in counts.keys() {
                for _ in 0..config.totems_per_faction {
                    rack.put_totem(Totem::new(faction, color, &config.factions)?);
                }
            }
            let mut cards = Vec::new();
            for (&faction, &count) in counts {
                for _ in 0..count {
                    cards.push(FactionCard { faction, color });
                }
            }
            rng.shuffle(&mut cards);
            for card in cards {
                rack.push_card(card);
            }
        }

        Ok(Self { racks })
    }

    /// The rack for `color`.
    #[must_use]
    pub fn get(&self, color: SystemColor) -> &Rack {
        &self.racks[color.index()]
    }

    /// Mutable rack for `color`.
    pub fn get_mut(&mut self, color: SystemColor) -> &mut Rack {
        &mut self.racks[color.index()]
    }

    /// Iterate over all racks in palette order.
    pub fn iter(&self) -> impl Iterator<Item = &Rack> {
        self.racks.iter()
    }

    /// Total totems across all racks.
    #[must_use]
    pub fn totem_count(&self) -> usize {
        self.racks.iter().map(|rack| rack.totems.len()).sum()
    }
}

//! Card queries: declarative resolution of a card from a zone.
//!
//! A query produces a `Card` or nothing; it never owns entities and never
//! removes cards from the zone it inspects. Callers - summon, equip,
//! transform and add-card actions - treat an empty result as a silent
//! no-op, never an error.

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::core::{Game, PlayerId};

use super::condition::CardCondition;

/// The zone a query draws candidates from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardZone {
    Hand,
    Deck,
    Graveyard,
    /// The injected card catalog.
    Library,
}

/// How to break a tie when several cards remain after filtering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickPolicy {
    #[default]
    First,
    /// Seeded-uniform-random pick from the game RNG.
    Random,
}

/// A declarative card query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardQuery {
    /// A specific card, by exact library name.
    Named { name: String },
    /// A zone filtered by AND-composed conditions.
    Filtered {
        zone: CardZone,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        conditions: Vec<CardCondition>,
        #[serde(default)]
        pick: PickPolicy,
    },
}

impl CardQuery {
    /// Documented kind strings, for save-file validation.
    pub const KINDS: &'static [&'static str] = &["named", "filtered"];

    /// Query for a specific library card.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named { name: name.into() }
    }

    /// Query a zone with conditions and the default first-match policy.
    #[must_use]
    pub fn filtered(zone: CardZone, conditions: Vec<CardCondition>) -> Self {
        Self::Filtered {
            zone,
            conditions,
            pick: PickPolicy::First,
        }
    }

    /// Switch to the seeded-random pick policy (builder pattern).
    #[must_use]
    pub fn random_pick(self) -> Self {
        match self {
            Self::Filtered {
                zone, conditions, ..
            } => Self::Filtered {
                zone,
                conditions,
                pick: PickPolicy::Random,
            },
            named => named,
        }
    }

    /// Resolve to a card for the given player, or `None` on a miss.
    #[must_use]
    pub fn resolve(&self, game: &mut Game, player: PlayerId) -> Option<Card> {
        match self {
            Self::Named { name } => game.library.get(name).cloned(),

            Self::Filtered {
                zone,
                conditions,
                pick,
            } => {
                let matched: Vec<Card> = {
                    let cards: Vec<&Card> = match zone {
                        CardZone::Hand => game.player(player).hand.iter().collect(),
                        CardZone::Deck => game.player(player).deck.iter().collect(),
                        CardZone::Graveyard => game.player(player).graveyard.iter().collect(),
                        CardZone::Library => game.library.iter().collect(),
                    };
                    cards
                        .into_iter()
                        .filter(|card| conditions.iter().all(|c| c.matches(card)))
                        .cloned()
                        .collect()
                };

                match pick {
                    PickPolicy::First => matched.into_iter().next(),
                    PickPolicy::Random => {
                        let idx = game.rng.pick_index(matched.len())?;
                        matched.into_iter().nth(idx)
                    }
                }
            }
        }
    }
}

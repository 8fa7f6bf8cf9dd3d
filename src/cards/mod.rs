//! Card definitions and the injected card catalog.
//!
//! A [`Card`] is pure data: cost, stats and the tag lists (battlecries,
//! deathrattles, auras, triggered effects) that the engine interprets when
//! the card is played. The [`CardLibrary`] is the name-indexed catalog
//! that card queries and summons resolve against; the engine never hard
//! codes a card.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::Subtype;
use crate::tags::{Action, Aura, Effect, Selector};

/// What a card puts into play when resolved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardKind {
    Minion {
        attack: i32,
        health: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subtype: Option<Subtype>,
    },
    Weapon {
        attack: i32,
        durability: i32,
    },
    /// No entity; the action fires against the selector and the card is
    /// spent.
    Spell {
        action: Action,
        selector: Selector,
    },
}

impl CardKind {
    /// Documented kind strings, for save-file validation.
    pub const KINDS: &'static [&'static str] = &["minion", "weapon", "spell"];
}

/// A card definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    pub mana: i32,
    /// Overload charged to the next turn when played.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub overload: i32,
    pub kind: CardKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub battlecries: Vec<Effect>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deathrattles: Vec<Effect>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auras: Vec<Aura>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl Card {
    /// A vanilla minion.
    #[must_use]
    pub fn minion(name: impl Into<String>, mana: i32, attack: i32, health: i32) -> Self {
        Self {
            name: name.into(),
            mana,
            overload: 0,
            kind: CardKind::Minion {
                attack,
                health,
                subtype: None,
            },
            battlecries: Vec::new(),
            deathrattles: Vec::new(),
            auras: Vec::new(),
            effects: Vec::new(),
        }
    }

    /// A weapon.
    #[must_use]
    pub fn weapon(name: impl Into<String>, mana: i32, attack: i32, durability: i32) -> Self {
        Self {
            name: name.into(),
            mana,
            overload: 0,
            kind: CardKind::Weapon { attack, durability },
            battlecries: Vec::new(),
            deathrattles: Vec::new(),
            auras: Vec::new(),
            effects: Vec::new(),
        }
    }

    /// A spell.
    #[must_use]
    pub fn spell(name: impl Into<String>, mana: i32, action: Action, selector: Selector) -> Self {
        Self {
            name: name.into(),
            mana,
            overload: 0,
            kind: CardKind::Spell { action, selector },
            battlecries: Vec::new(),
            deathrattles: Vec::new(),
            auras: Vec::new(),
            effects: Vec::new(),
        }
    }

    /// Set the minion subtype (builder pattern).
    #[must_use]
    pub fn with_subtype(mut self, subtype: Subtype) -> Self {
        if let CardKind::Minion {
            subtype: ref mut s, ..
        } = self.kind
        {
            *s = Some(subtype);
        }
        self
    }

    /// Charge overload when played (builder pattern).
    #[must_use]
    pub fn with_overload(mut self, overload: i32) -> Self {
        self.overload = overload;
        self
    }

    /// Add a battlecry (builder pattern).
    #[must_use]
    pub fn with_battlecry(mut self, action: Action, selector: Selector) -> Self {
        self.battlecries.push(Effect::battlecry(action, selector));
        self
    }

    /// Add a deathrattle (builder pattern).
    #[must_use]
    pub fn with_deathrattle(mut self, action: Action, selector: Selector) -> Self {
        self.deathrattles.push(Effect::deathrattle(action, selector));
        self
    }

    /// Add an aura (builder pattern).
    #[must_use]
    pub fn with_aura(mut self, aura: Aura) -> Self {
        self.auras.push(aura);
        self
    }

    /// Add a triggered effect (builder pattern).
    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn is_minion(&self) -> bool {
        matches!(self.kind, CardKind::Minion { .. })
    }

    #[must_use]
    pub fn is_weapon(&self) -> bool {
        matches!(self.kind, CardKind::Weapon { .. })
    }

    #[must_use]
    pub fn is_spell(&self) -> bool {
        matches!(self.kind, CardKind::Spell { .. })
    }
}

/// Name-indexed card catalog.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CardLibrary {
    cards: FxHashMap<String, Card>,
}

impl CardLibrary {
    /// Create an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card under its name, replacing any previous definition.
    pub fn register(&mut self, card: Card) {
        self.cards.insert(card.name.clone(), card);
    }

    /// Look up a card by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Card> {
        self.cards.get(name)
    }

    /// Iterate cards in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        let mut names: Vec<&String> = self.cards.keys().collect();
        names.sort();
        names.into_iter().map(|n| &self.cards[n])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

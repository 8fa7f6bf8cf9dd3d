//! Conditions: pure predicates over (source, candidate).
//!
//! Conditions are the leaves of the tag system - they never mutate and
//! depend on nothing but the current board. [`Condition`] filters board
//! entities inside selectors and effect triggers; [`CardCondition`] filters
//! cards inside card queries and mana filters. Both are total over missing
//! entities: a candidate that no longer exists simply does not match.

use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardKind};
use crate::core::{EntityId, Game, Subtype};

/// A predicate over a source entity and a candidate entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// Always matches.
    Always,
    /// Candidate is below its maximum health.
    IsDamaged,
    /// Candidate is at its maximum health.
    IsUndamaged,
    /// Candidate has at least one taunt grant.
    HasTaunt,
    /// Candidate's computed attack is at least `attack`.
    AttackAtLeast { attack: i32 },
    /// Candidate's computed attack is at most `attack`.
    AttackAtMost { attack: i32 },
    /// Candidate belongs to the source's controller.
    IsFriendly,
    /// Candidate belongs to the source's opponent.
    IsEnemy,
    /// Candidate is not the source itself.
    NotSelf,
    /// Candidate has the given minion subtype.
    IsSubtype { subtype: Subtype },
    /// The source's controller has overload, pending or locked.
    OwnerHasOverload,
    /// The source's controller has a weapon equipped.
    OwnerHasWeapon,
    /// The source's controller has at least `count` minions on board.
    MinionCountAtLeast { count: usize },

    /// All conditions must hold.
    All { conditions: Vec<Condition> },
    /// At least one condition must hold.
    Any { conditions: Vec<Condition> },
    /// The condition must not hold.
    Not { condition: Box<Condition> },
}

impl Condition {
    /// Documented kind strings, for save-file validation.
    pub const KINDS: &'static [&'static str] = &[
        "always",
        "is_damaged",
        "is_undamaged",
        "has_taunt",
        "attack_at_least",
        "attack_at_most",
        "is_friendly",
        "is_enemy",
        "not_self",
        "is_subtype",
        "owner_has_overload",
        "owner_has_weapon",
        "minion_count_at_least",
        "all",
        "any",
        "not",
    ];

    /// Evaluate against the current board. Missing entities never match.
    #[must_use]
    pub fn matches(&self, game: &Game, source: EntityId, candidate: EntityId) -> bool {
        match self {
            Self::Always => true,

            Self::IsDamaged => game
                .character(candidate)
                .is_some_and(|c| c.is_damaged()),
            Self::IsUndamaged => game
                .character(candidate)
                .is_some_and(|c| !c.is_damaged()),
            Self::HasTaunt => game
                .character(candidate)
                .is_some_and(|c| c.status.taunt > 0),
            Self::AttackAtLeast { attack } => game
                .character(candidate)
                .is_some_and(|c| c.attack() >= *attack),
            Self::AttackAtMost { attack } => game
                .character(candidate)
                .is_some_and(|c| c.attack() <= *attack),

            Self::IsFriendly => match (game.character(source), game.character(candidate)) {
                (Some(s), Some(c)) => s.owner == c.owner,
                _ => false,
            },
            Self::IsEnemy => match (game.character(source), game.character(candidate)) {
                (Some(s), Some(c)) => s.owner != c.owner,
                _ => false,
            },
            Self::NotSelf => source != candidate,
            Self::IsSubtype { subtype } => game
                .character(candidate)
                .is_some_and(|c| c.subtype == Some(*subtype)),

            Self::OwnerHasOverload => game
                .character(source)
                .is_some_and(|s| game.player(s.owner).has_overload()),
            Self::OwnerHasWeapon => game
                .character(source)
                .is_some_and(|s| game.player(s.owner).weapon.is_some()),
            Self::MinionCountAtLeast { count } => game
                .character(source)
                .is_some_and(|s| game.player(s.owner).board.len() >= *count),

            Self::All { conditions } => conditions
                .iter()
                .all(|c| c.matches(game, source, candidate)),
            Self::Any { conditions } => conditions
                .iter()
                .any(|c| c.matches(game, source, candidate)),
            Self::Not { condition } => !condition.matches(game, source, candidate),
        }
    }

    /// Combine with AND.
    #[must_use]
    pub fn and(self, other: Condition) -> Self {
        match self {
            Self::All { mut conditions } => {
                conditions.push(other);
                Self::All { conditions }
            }
            _ => Self::All {
                conditions: vec![self, other],
            },
        }
    }

    /// Combine with OR.
    #[must_use]
    pub fn or(self, other: Condition) -> Self {
        match self {
            Self::Any { mut conditions } => {
                conditions.push(other);
                Self::Any { conditions }
            }
            _ => Self::Any {
                conditions: vec![self, other],
            },
        }
    }

    /// Negate.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not {
            condition: Box::new(self),
        }
    }
}

/// A predicate over a card in hand, deck, graveyard or the library.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardCondition {
    IsMinionCard,
    IsWeaponCard,
    IsSpellCard,
    CostAtMost { cost: i32 },
    CostAtLeast { cost: i32 },
    NameIs { name: String },
    HasSubtype { subtype: Subtype },
}

impl CardCondition {
    /// Documented kind strings, for save-file validation.
    pub const KINDS: &'static [&'static str] = &[
        "is_minion_card",
        "is_weapon_card",
        "is_spell_card",
        "cost_at_most",
        "cost_at_least",
        "name_is",
        "has_subtype",
    ];

    /// Evaluate against a card.
    #[must_use]
    pub fn matches(&self, card: &Card) -> bool {
        match self {
            Self::IsMinionCard => matches!(card.kind, CardKind::Minion { .. }),
            Self::IsWeaponCard => matches!(card.kind, CardKind::Weapon { .. }),
            Self::IsSpellCard => matches!(card.kind, CardKind::Spell { .. }),
            Self::CostAtMost { cost } => card.mana <= *cost,
            Self::CostAtLeast { cost } => card.mana >= *cost,
            Self::NameIs { name } => card.name == *name,
            Self::HasSubtype { subtype } => match card.kind {
                CardKind::Minion { subtype: s, .. } => s == Some(*subtype),
                _ => false,
            },
        }
    }
}

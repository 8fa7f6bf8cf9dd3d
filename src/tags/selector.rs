//! Selectors: declarative queries over board entities.
//!
//! A selector resolves an ordered set of entities relative to a source.
//! Ordering is always left-to-right board position, friendly side before
//! enemy side, heroes after minions. Resolution materializes a fresh
//! candidate list every time, so it is safe to resolve while the board is
//! being mutated by the very action the selector feeds.
//!
//! `matches` answers membership without running the picker, which is what
//! aura diffing needs: the picker narrows an ambiguous match-set to a
//! single target for one-shot applications, while auras track the whole
//! set.

use serde::{Deserialize, Serialize};

use crate::core::{CharacterKind, EntityId, Game};

use super::condition::Condition;

/// Which side of the board to consider, relative to the source's controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Friendly,
    Enemy,
    Both,
}

/// How to narrow an ambiguous match-set to a single target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Picker {
    /// Leftmost match.
    First,
    /// Rightmost match.
    Last,
    /// Seeded-uniform-random match.
    Random,
    /// Externally-directed choice, popped from the controller's choice
    /// queue; falls back to the leftmost match when no choice is queued.
    Directed,
}

/// A declarative board query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selector {
    /// The source itself.
    SelfOnly,
    /// Minions adjacent to the source on its own board row.
    ///
    /// Uses the source's last board position when the source has already
    /// been removed, so deathrattles see the board as of the instant of
    /// death.
    Adjacent {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<Condition>,
    },
    /// Minions on one or both board rows.
    Minions {
        side: Side,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<Condition>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        picker: Option<Picker>,
    },
    /// Minions with the totem subtype.
    Totems {
        side: Side,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<Condition>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        picker: Option<Picker>,
    },
    /// Minions and heroes together.
    Characters {
        side: Side,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<Condition>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        picker: Option<Picker>,
    },
    /// Heroes only.
    Heroes { side: Side },
    /// Equipped weapons only.
    Weapons { side: Side },
}

impl Selector {
    /// Documented kind strings, for save-file validation.
    pub const KINDS: &'static [&'static str] = &[
        "self_only",
        "adjacent",
        "minions",
        "totems",
        "characters",
        "heroes",
        "weapons",
    ];

    /// Friendly minions.
    #[must_use]
    pub fn friendly_minions() -> Self {
        Self::Minions {
            side: Side::Friendly,
            condition: None,
            picker: None,
        }
    }

    /// Enemy minions.
    #[must_use]
    pub fn enemy_minions() -> Self {
        Self::Minions {
            side: Side::Enemy,
            condition: None,
            picker: None,
        }
    }

    /// The friendly hero.
    #[must_use]
    pub fn friendly_hero() -> Self {
        Self::Heroes {
            side: Side::Friendly,
        }
    }

    /// The enemy hero.
    #[must_use]
    pub fn enemy_hero() -> Self {
        Self::Heroes { side: Side::Enemy }
    }

    /// Resolve the ordered match-set, applying the picker if any.
    ///
    /// An empty result is a resolution miss: callers treat it as a silent
    /// no-op, never an error.
    #[must_use]
    pub fn resolve(&self, game: &mut Game, source: EntityId) -> Vec<EntityId> {
        let matched = self.match_set(game, source);
        match self.picker() {
            None => matched,
            Some(picker) => Self::pick(game, picker, matched),
        }
    }

    /// Whether a candidate is in the match-set, ignoring the picker.
    #[must_use]
    pub fn matches(&self, game: &Game, source: EntityId, candidate: EntityId) -> bool {
        self.match_set(game, source).contains(&candidate)
    }

    /// The full ordered match-set before picker narrowing.
    #[must_use]
    pub fn match_set(&self, game: &Game, source: EntityId) -> Vec<EntityId> {
        let Some(owner) = game.character(source).map(|c| c.owner) else {
            return Vec::new();
        };

        match self {
            Self::SelfOnly => {
                if game.character(source).is_some_and(|c| !c.removed) {
                    vec![source]
                } else {
                    Vec::new()
                }
            }

            Self::Adjacent { condition } => {
                let mut out = Vec::new();
                let Some(ch) = game.character(source) else {
                    return out;
                };
                if !ch.is_minion() {
                    return out;
                }
                let board = &game.player(owner).board;
                // A removed source keeps its final position; its old
                // neighbors now sit at last_index - 1 and last_index.
                let (left, right) = if ch.removed {
                    let idx = ch.last_index.min(board.len());
                    (idx.checked_sub(1), Some(idx).filter(|&i| i < board.len()))
                } else {
                    let Some(idx) = board.iter().position(|&id| id == source) else {
                        return out;
                    };
                    (
                        idx.checked_sub(1),
                        Some(idx + 1).filter(|&i| i < board.len()),
                    )
                };
                for idx in [left, right].into_iter().flatten() {
                    let id = board[idx];
                    if id != source && Self::passes(game, condition, source, id) {
                        out.push(id);
                    }
                }
                out
            }

            Self::Minions {
                side, condition, ..
            } => Self::collect(game, source, owner, *side, condition, |c| c.is_minion()),

            Self::Totems {
                side, condition, ..
            } => Self::collect(game, source, owner, *side, condition, |c| {
                c.is_minion() && c.subtype == Some(crate::core::Subtype::Totem)
            }),

            Self::Characters {
                side, condition, ..
            } => {
                let mut out =
                    Self::collect(game, source, owner, *side, condition, |c| c.is_minion());
                for player in Self::sides(owner, *side) {
                    let hero = game.player(player).hero;
                    if Self::passes(game, condition, source, hero) {
                        out.push(hero);
                    }
                }
                out
            }

            Self::Heroes { side } => Self::sides(owner, *side)
                .into_iter()
                .map(|p| game.player(p).hero)
                .collect(),

            Self::Weapons { side } => Self::sides(owner, *side)
                .into_iter()
                .filter_map(|p| game.player(p).weapon)
                .collect(),
        }
    }

    fn picker(&self) -> Option<Picker> {
        match self {
            Self::Minions { picker, .. }
            | Self::Totems { picker, .. }
            | Self::Characters { picker, .. } => *picker,
            _ => None,
        }
    }

    fn sides(owner: crate::core::PlayerId, side: Side) -> Vec<crate::core::PlayerId> {
        match side {
            Side::Friendly => vec![owner],
            Side::Enemy => vec![owner.opponent()],
            Side::Both => vec![owner, owner.opponent()],
        }
    }

    fn passes(
        game: &Game,
        condition: &Option<Condition>,
        source: EntityId,
        candidate: EntityId,
    ) -> bool {
        condition
            .as_ref()
            .map_or(true, |c| c.matches(game, source, candidate))
    }

    fn collect(
        game: &Game,
        source: EntityId,
        owner: crate::core::PlayerId,
        side: Side,
        condition: &Option<Condition>,
        filter: impl Fn(&crate::core::Character) -> bool,
    ) -> Vec<EntityId> {
        let mut out = Vec::new();
        for player in Self::sides(owner, side) {
            for &id in game.player(player).board.iter() {
                let Some(ch) = game.character(id) else { continue };
                debug_assert_eq!(ch.kind, CharacterKind::Minion);
                if filter(ch) && Self::passes(game, condition, source, id) {
                    out.push(id);
                }
            }
        }
        out
    }

    fn pick(game: &mut Game, picker: Picker, matched: Vec<EntityId>) -> Vec<EntityId> {
        if matched.is_empty() {
            return matched;
        }
        let chosen = match picker {
            Picker::First => matched[0],
            Picker::Last => matched[matched.len() - 1],
            Picker::Random => {
                let idx = game
                    .rng
                    .pick_index(matched.len())
                    .unwrap_or(0);
                matched[idx]
            }
            Picker::Directed => match game.next_choice() {
                Some(choice) if matched.contains(&choice) => choice,
                _ => matched[0],
            },
        };
        vec![chosen]
    }
}

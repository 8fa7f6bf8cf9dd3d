//! Per-player state: hero, board row, card zones and mana.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::Card;
use crate::tags::CardCondition;

use super::entity::{EntityId, PlayerId};

pub const BOARD_LIMIT: usize = 7;
pub const HAND_LIMIT: usize = 10;
pub const MAX_MANA: i32 = 10;

/// A cost modifier installed by a mana-change action.
///
/// The discount applies to cards matching every condition, never dropping
/// the cost below `minimum`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManaFilter {
    pub id: u32,
    pub amount: i32,
    pub minimum: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<CardCondition>,
}

impl ManaFilter {
    fn applies_to(&self, card: &Card) -> bool {
        self.conditions.iter().all(|c| c.matches(card))
    }
}

/// One side of the board.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub hero: EntityId,
    /// Minions in board order, left to right.
    pub board: SmallVec<[EntityId; BOARD_LIMIT]>,
    pub weapon: Option<EntityId>,

    pub hand: Vec<Card>,
    pub deck: Vec<Card>,
    pub graveyard: Vec<Card>,

    pub mana: i32,
    pub max_mana: i32,
    /// Overload charged this turn, locked at the start of the next.
    pub overload_pending: i32,
    /// Crystals locked this turn by last turn's overload.
    pub overload_locked: i32,

    pub spell_damage: i32,
    pub mana_filters: Vec<ManaFilter>,
}

impl Player {
    /// A fresh player with an empty board and zones.
    #[must_use]
    pub fn new(id: PlayerId, hero: EntityId) -> Self {
        Self {
            id,
            hero,
            board: SmallVec::new(),
            weapon: None,
            hand: Vec::new(),
            deck: Vec::new(),
            graveyard: Vec::new(),
            mana: 0,
            max_mana: 0,
            overload_pending: 0,
            overload_locked: 0,
            spell_damage: 0,
            mana_filters: Vec::new(),
        }
    }

    /// Whether any overload is pending or locked.
    #[must_use]
    pub fn has_overload(&self) -> bool {
        self.overload_pending > 0 || self.overload_locked > 0
    }

    /// Cost of a card after every matching mana filter, in install order.
    #[must_use]
    pub fn effective_cost(&self, card: &Card) -> i32 {
        self.mana_filters
            .iter()
            .filter(|f| f.applies_to(card))
            .fold(card.mana, |cost, f| (cost - f.amount).max(f.minimum))
    }

    /// Whether the board row has room for another minion.
    #[must_use]
    pub fn board_full(&self) -> bool {
        self.board.len() >= BOARD_LIMIT
    }

    /// Position of a minion on this board row.
    #[must_use]
    pub fn board_index(&self, id: EntityId) -> Option<usize> {
        self.board.iter().position(|&e| e == id)
    }
}

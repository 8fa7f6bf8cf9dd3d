//! Entity identity and the `Character` board object.
//!
//! Every targetable board object - minion, hero or weapon - is a
//! [`Character`] stored in the game's character arena and referenced by
//! [`EntityId`]. Auras and effects never own their targets; they hold ids
//! and re-resolve them on every evaluation.

use serde::{Deserialize, Serialize};

use crate::tags::Effect;

/// Unique identifier for any board entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create an entity ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// One of the two seats in a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a player ID. Only 0 and 1 are meaningful.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// The other seat.
    #[must_use]
    pub const fn opponent(self) -> Self {
        Self(1 - self.0)
    }

    /// Index into the game's player array.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player({})", self.0)
    }
}

/// What kind of board object a character is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterKind {
    Minion,
    Hero,
    Weapon,
}

impl CharacterKind {
    /// Documented kind strings, for save-file validation.
    pub const KINDS: &'static [&'static str] = &["minion", "hero", "weapon"];
}

/// Minion subtype, for subtype-scoped selectors and conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subtype {
    Totem,
    Beast,
    Mech,
    Murloc,
}

/// Stacking status counters.
///
/// These are counters rather than booleans so that two independent grants
/// of the same status stack, and removing one grant does not strip the
/// other: a minion given taunt by two different auras keeps taunt when one
/// aura detaches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounters {
    pub taunt: u32,
    pub divine_shield: u32,
    pub windfury: u32,
    pub stealth: u32,
    pub immune: u32,
    pub frozen: u32,
    pub charge: u32,
    pub cant_attack: u32,
}

/// A targetable board object: minion, hero or weapon.
///
/// Computed stats are always base plus the sum of deltas from currently
/// applied actions; every applied delta has exactly one matching revert
/// record held by the aura that applied it, so removal never
/// double-subtracts or leaks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: EntityId,
    /// Name of the card this character came from.
    pub card_name: String,
    pub kind: CharacterKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<Subtype>,
    pub owner: PlayerId,

    pub base_attack: i32,
    /// Base health; doubles as durability for weapons.
    pub base_health: i32,
    /// Sum of attack deltas from currently applied actions.
    pub attack_delta: i32,
    /// Sum of max-health deltas from currently applied actions.
    pub health_delta: i32,
    /// Current health.
    pub health: i32,
    /// Hero armor; absorbed before health.
    #[serde(default)]
    pub armor: i32,

    #[serde(default)]
    pub status: StatusCounters,

    /// Deathrattles carried by this character, fired at the instant of death
    /// against the board as it stood at its last position.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deathrattles: Vec<Effect>,

    /// Set when the character has been taken off the board but actions fired
    /// by its death still need to resolve against its final placement.
    #[serde(default)]
    pub removed: bool,
    /// Board index at the instant of removal.
    #[serde(default)]
    pub last_index: usize,
}

impl Character {
    /// Create a minion.
    #[must_use]
    pub fn minion(
        id: EntityId,
        card_name: impl Into<String>,
        owner: PlayerId,
        attack: i32,
        health: i32,
    ) -> Self {
        Self::with_kind(id, card_name, CharacterKind::Minion, owner, attack, health)
    }

    /// Create a hero.
    #[must_use]
    pub fn hero(id: EntityId, card_name: impl Into<String>, owner: PlayerId, health: i32) -> Self {
        Self::with_kind(id, card_name, CharacterKind::Hero, owner, 0, health)
    }

    /// Create a weapon; durability is modeled as health.
    #[must_use]
    pub fn weapon(
        id: EntityId,
        card_name: impl Into<String>,
        owner: PlayerId,
        attack: i32,
        durability: i32,
    ) -> Self {
        Self::with_kind(id, card_name, CharacterKind::Weapon, owner, attack, durability)
    }

    fn with_kind(
        id: EntityId,
        card_name: impl Into<String>,
        kind: CharacterKind,
        owner: PlayerId,
        attack: i32,
        health: i32,
    ) -> Self {
        Self {
            id,
            card_name: card_name.into(),
            kind,
            subtype: None,
            owner,
            base_attack: attack,
            base_health: health,
            attack_delta: 0,
            health_delta: 0,
            health,
            armor: 0,
            status: StatusCounters::default(),
            deathrattles: Vec::new(),
            removed: false,
            last_index: 0,
        }
    }

    /// Set the subtype (builder pattern).
    #[must_use]
    pub fn with_subtype(mut self, subtype: Subtype) -> Self {
        self.subtype = Some(subtype);
        self
    }

    /// Computed attack: base plus deltas, never negative.
    #[must_use]
    pub fn attack(&self) -> i32 {
        (self.base_attack + self.attack_delta).max(0)
    }

    /// Computed maximum health: base plus deltas.
    #[must_use]
    pub fn max_health(&self) -> i32 {
        self.base_health + self.health_delta
    }

    #[must_use]
    pub fn is_minion(&self) -> bool {
        self.kind == CharacterKind::Minion
    }

    #[must_use]
    pub fn is_hero(&self) -> bool {
        self.kind == CharacterKind::Hero
    }

    #[must_use]
    pub fn is_weapon(&self) -> bool {
        self.kind == CharacterKind::Weapon
    }

    #[must_use]
    pub fn is_damaged(&self) -> bool {
        self.health < self.max_health()
    }
}

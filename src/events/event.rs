//! Game event kinds and payloads.
//!
//! The controller owns *when* events occur: it calls
//! [`Game::fire_event`](crate::core::Game::fire_event) for every
//! state-changing action it performs. The engine owns only the reaction -
//! aura re-diffing and effect firing. Mutations performed by the engine
//! itself (damage, summons, deaths) fire the same events internally so that
//! re-entrant cascades behave identically to controller-fired ones.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};

/// The closed set of event kinds the engine reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    CardPlayed,
    CardDrawn,
    TurnStarted,
    TurnEnded,
    MinionSummoned,
    MinionDied,
    CharacterDamaged,
    CharacterHealed,
    /// Structural change to a board row: insertion, removal, transform.
    BoardChanged,
}

impl EventKind {
    /// Documented kind strings, for save-file validation.
    pub const KINDS: &'static [&'static str] = &[
        "card_played",
        "card_drawn",
        "turn_started",
        "turn_ended",
        "minion_summoned",
        "minion_died",
        "character_damaged",
        "character_healed",
        "board_changed",
    ];
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A fired event with contextual data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub kind: EventKind,
    /// The entity that caused the event, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<EntityId>,
    /// The entity affected by the event, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<EntityId>,
    /// The player the event belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerId>,
    /// Magnitude (damage dealt, amount healed), zero when meaningless.
    #[serde(default)]
    pub amount: i32,
    /// Card name for card-centric events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<String>,
}

impl GameEvent {
    /// Create an event with just a kind.
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            source: None,
            target: None,
            player: None,
            amount: 0,
            card: None,
        }
    }

    /// Set the source entity (builder pattern).
    #[must_use]
    pub fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the target entity (builder pattern).
    #[must_use]
    pub fn with_target(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the associated player (builder pattern).
    #[must_use]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    /// Set the amount (builder pattern).
    #[must_use]
    pub fn with_amount(mut self, amount: i32) -> Self {
        self.amount = amount;
        self
    }

    /// Set the card name (builder pattern).
    #[must_use]
    pub fn with_card(mut self, card: impl Into<String>) -> Self {
        self.card = Some(card.into());
        self
    }

    /// A player-centric event, like a turn boundary.
    #[must_use]
    pub fn for_player(kind: EventKind, player: PlayerId) -> Self {
        Self::new(kind).with_player(player)
    }

    /// A damage or heal event.
    #[must_use]
    pub fn for_amount(kind: EventKind, target: EntityId, amount: i32) -> Self {
        Self::new(kind).with_target(target).with_amount(amount)
    }

    /// A card-centric event, like a card being played or drawn.
    #[must_use]
    pub fn for_card(kind: EventKind, player: PlayerId, card: impl Into<String>) -> Self {
        Self::new(kind).with_player(player).with_card(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let event = GameEvent::new(EventKind::CharacterDamaged)
            .with_source(EntityId(10))
            .with_target(EntityId(20))
            .with_player(PlayerId::new(0))
            .with_amount(3);

        assert_eq!(event.kind, EventKind::CharacterDamaged);
        assert_eq!(event.source, Some(EntityId(10)));
        assert_eq!(event.target, Some(EntityId(20)));
        assert_eq!(event.player, Some(PlayerId::new(0)));
        assert_eq!(event.amount, 3);
    }

    #[test]
    fn test_for_card() {
        let event = GameEvent::for_card(EventKind::CardPlayed, PlayerId::new(1), "Wisp");
        assert_eq!(event.player, Some(PlayerId::new(1)));
        assert_eq!(event.card.as_deref(), Some("Wisp"));
    }

    #[test]
    fn test_kind_strings_cover_enum() {
        // Each kind serializes to a documented string.
        for kind in [
            EventKind::CardPlayed,
            EventKind::CardDrawn,
            EventKind::TurnStarted,
            EventKind::TurnEnded,
            EventKind::MinionSummoned,
            EventKind::MinionDied,
            EventKind::CharacterDamaged,
            EventKind::CharacterHealed,
            EventKind::BoardChanged,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            let name = json.trim_matches('"');
            assert!(EventKind::KINDS.contains(&name), "{name} undocumented");
        }
    }

    #[test]
    fn test_serialization() {
        let event = GameEvent::for_amount(EventKind::CharacterHealed, EntityId(4), 2);
        let json = serde_json::to_string(&event).unwrap();
        let back: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}

//! The process-scoped event dispatcher.
//!
//! Every aura refresh hook, effect trigger and auxiliary listener is a
//! [`Listener`] here, identified by a [`ListenerId`] handle that its owner
//! releases deterministically on detach. Reactions are declarative data,
//! not closures, so the whole listener table serializes with the game and a
//! reloaded game resumes with identical firing order.
//!
//! Firing is single-threaded, synchronous and re-entrant: a reaction may
//! fire further events before the outer fire returns. [`Dispatcher::matching`]
//! therefore returns an O(1) snapshot of the listener list; nested
//! subscriptions or removals never corrupt an in-progress iteration, and a
//! listener removed mid-event is skipped via [`Dispatcher::is_subscribed`].

use serde::{Deserialize, Serialize};

use crate::core::EntityId;
use crate::tags::{AuraId, EffectId};

use super::event::EventKind;

/// Handle for a registered listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u32);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Listener({})", self.0)
    }
}

/// What a listener does when its event fires.
///
/// Reactions are interpreted by [`Game::fire_event`](crate::core::Game::fire_event).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reaction {
    /// Re-diff an attached aura's match-set.
    RefreshAura { aura: AuraId },
    /// Force an `AuraUntil` to detach.
    ExpireAura { aura: AuraId },
    /// Fire a bound triggered effect.
    FireEffect { effect: EffectId },
    /// Clamp a character's health up to a floor after damage.
    EnforceHealthFloor { target: EntityId, floor: i32 },
}

impl Reaction {
    /// Documented kind strings, for save-file validation.
    pub const KINDS: &'static [&'static str] = &[
        "refresh_aura",
        "expire_aura",
        "fire_effect",
        "enforce_health_floor",
    ];
}

/// A registered listener: an event filter plus a reaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Listener {
    pub id: ListenerId,
    /// Event kind to react to; `None` reacts to every event.
    pub filter: Option<EventKind>,
    pub reaction: Reaction,
}

/// Registration-ordered listener table.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Dispatcher {
    listeners: im::Vector<Listener>,
    next_id: u32,
}

impl Dispatcher {
    /// Create an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; returns its handle.
    ///
    /// Listeners fire in registration order.
    pub fn subscribe(&mut self, filter: Option<EventKind>, reaction: Reaction) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push_back(Listener {
            id,
            filter,
            reaction,
        });
        id
    }

    /// Remove a listener by handle.
    pub fn unsubscribe(&mut self, id: ListenerId) -> Option<Listener> {
        let pos = self.listeners.iter().position(|l| l.id == id)?;
        Some(self.listeners.remove(pos))
    }

    /// Whether a handle is still registered.
    #[must_use]
    pub fn is_subscribed(&self, id: ListenerId) -> bool {
        self.listeners.iter().any(|l| l.id == id)
    }

    /// Snapshot the listeners matching an event kind, in registration order.
    ///
    /// The snapshot is taken before any reaction runs, so nested
    /// subscription changes affect only later events.
    #[must_use]
    pub fn matching(&self, kind: EventKind) -> Vec<Listener> {
        self.listeners
            .iter()
            .filter(|l| l.filter.is_none() || l.filter == Some(kind))
            .cloned()
            .collect()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Iterate listeners in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Listener> {
        self.listeners.iter()
    }
}

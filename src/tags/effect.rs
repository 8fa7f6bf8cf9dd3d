//! Effects: one-shot actions fired at lifecycle moments.
//!
//! A triggered effect binds to its owner while the owner is in play and
//! fires its action whenever a matching event occurs. Battlecries fire
//! once when the owner enters play; deathrattles fire at the instant of
//! death, with selectors resolved against the board as it was when the
//! owner died. Effects never track undo records; whatever they apply
//! stays applied.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::EntityId;
use crate::events::{EventKind, ListenerId};

use super::action::Action;
use super::condition::Condition;
use super::selector::Selector;

/// Handle for a bound triggered effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectId(pub u32);

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Effect({})", self.0)
    }
}

/// Filter deciding whether an event fires a bound effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventFilter {
    pub kind: EventKind,
    /// Restrict to events raised on the owner's side.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub friendly_only: bool,
    /// Extra predicate; source is the effect owner, candidate the event's
    /// subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl EventFilter {
    /// Match any event of `kind`.
    #[must_use]
    pub fn on(kind: EventKind) -> Self {
        Self {
            kind,
            friendly_only: false,
            condition: None,
        }
    }

    /// Restrict to the owner's side (builder pattern).
    #[must_use]
    pub fn friendly(mut self) -> Self {
        self.friendly_only = true;
        self
    }

    /// Add a predicate on the event's subject (builder pattern).
    #[must_use]
    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// A one-shot action bound to a lifecycle moment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    /// Fires on every matching event while the owner is in play.
    Triggered {
        trigger: EventFilter,
        action: Action,
        selector: Selector,
    },
    /// Fires once when the owner enters play.
    Battlecry { action: Action, selector: Selector },
    /// Fires at the instant the owner dies.
    Deathrattle { action: Action, selector: Selector },
}

impl Effect {
    /// Documented kind strings, for save-file validation.
    pub const KINDS: &'static [&'static str] = &["triggered", "battlecry", "deathrattle"];

    /// A triggered effect.
    #[must_use]
    pub fn triggered(trigger: EventFilter, action: Action, selector: Selector) -> Self {
        Self::Triggered {
            trigger,
            action,
            selector,
        }
    }

    /// A battlecry.
    #[must_use]
    pub fn battlecry(action: Action, selector: Selector) -> Self {
        Self::Battlecry { action, selector }
    }

    /// A deathrattle.
    #[must_use]
    pub fn deathrattle(action: Action, selector: Selector) -> Self {
        Self::Deathrattle { action, selector }
    }

    /// The fired action.
    #[must_use]
    pub fn action(&self) -> &Action {
        match self {
            Self::Triggered { action, .. }
            | Self::Battlecry { action, .. }
            | Self::Deathrattle { action, .. } => action,
        }
    }

    /// The target selector.
    #[must_use]
    pub fn selector(&self) -> &Selector {
        match self {
            Self::Triggered { selector, .. }
            | Self::Battlecry { selector, .. }
            | Self::Deathrattle { selector, .. } => selector,
        }
    }

    /// The trigger filter, for the triggered form.
    #[must_use]
    pub fn trigger(&self) -> Option<&EventFilter> {
        match self {
            Self::Triggered { trigger, .. } => Some(trigger),
            _ => None,
        }
    }
}

/// Lifecycle state of a bound effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectState {
    Bound,
    /// Listener released; kept only transiently during teardown.
    Unbound,
}

/// A live binding of a triggered effect to its owner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectInstance {
    pub id: EffectId,
    pub owner: EntityId,
    pub effect: Effect,
    pub state: EffectState,
    /// Dispatcher hook; released on unbind.
    pub listener: ListenerId,
}

/// Registry of bound triggered effects.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EffectRegistry {
    instances: FxHashMap<u32, EffectInstance>,
    next_id: u32,
}

impl EffectRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next effect handle.
    pub fn next_id(&mut self) -> EffectId {
        let id = EffectId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert an instance under its own id.
    pub fn insert(&mut self, instance: EffectInstance) {
        self.instances.insert(instance.id.0, instance);
    }

    /// Remove an instance, returning it for teardown.
    pub fn remove(&mut self, id: EffectId) -> Option<EffectInstance> {
        self.instances.remove(&id.0)
    }

    #[must_use]
    pub fn get(&self, id: EffectId) -> Option<&EffectInstance> {
        self.instances.get(&id.0)
    }

    /// Ids of every effect bound to `owner`, in bind order.
    #[must_use]
    pub fn for_owner(&self, owner: EntityId) -> Vec<EffectId> {
        let mut ids: Vec<EffectId> = self
            .instances
            .values()
            .filter(|i| i.owner == owner)
            .map(|i| i.id)
            .collect();
        ids.sort_by_key(|id| id.0);
        ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

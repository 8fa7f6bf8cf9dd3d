//! Auras: reversible actions continuously maintained over a match-set.
//!
//! An attached aura tracks the exact set of entities its action is
//! currently applied to, together with the per-target undo records. The
//! refresh cycle in [`Game`](crate::core::Game) re-resolves the selector
//! and diffs: newcomers get the action applied, leavers get their recorded
//! inverse, entities matched across the refresh are left untouched. Detach
//! reverts every tracked record, so attach-then-detach with no board
//! change in between is externally unobservable.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::EntityId;
use crate::events::ListenerId;

use super::action::{Action, Applied};
use super::effect::EventFilter;
use super::selector::Selector;

/// Handle for an attached aura instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuraId(pub u32);

impl std::fmt::Display for AuraId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Aura({})", self.0)
    }
}

/// A declarative aura: a reversible action paired with a selector.
///
/// The `Until` form additionally expires itself the first time its filter
/// matches an event, detaching as if the owner had left play.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Aura {
    /// Maintained for as long as the owner is in play.
    #[serde(rename = "aura")]
    Continuous { action: Action, selector: Selector },
    /// Maintained until the expiry event fires.
    #[serde(rename = "aura_until")]
    Until {
        action: Action,
        selector: Selector,
        until: EventFilter,
    },
}

impl Aura {
    /// Documented kind strings, for save-file validation.
    pub const KINDS: &'static [&'static str] = &["aura", "aura_until"];

    /// An aura maintained while the owner is in play.
    #[must_use]
    pub fn new(action: Action, selector: Selector) -> Self {
        Self::Continuous { action, selector }
    }

    /// An aura that also expires on an event.
    #[must_use]
    pub fn until(action: Action, selector: Selector, until: EventFilter) -> Self {
        Self::Until {
            action,
            selector,
            until,
        }
    }

    /// The maintained action.
    #[must_use]
    pub fn action(&self) -> &Action {
        match self {
            Self::Continuous { action, .. } | Self::Until { action, .. } => action,
        }
    }

    /// The selector defining the match-set.
    #[must_use]
    pub fn selector(&self) -> &Selector {
        match self {
            Self::Continuous { selector, .. } | Self::Until { selector, .. } => selector,
        }
    }

    /// The expiry filter, if any.
    #[must_use]
    pub fn expiry(&self) -> Option<&EventFilter> {
        match self {
            Self::Continuous { .. } => None,
            Self::Until { until, .. } => Some(until),
        }
    }
}

/// Lifecycle state of an attached aura.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuraState {
    Attached,
    /// Fully reverted; kept only transiently during teardown.
    Detached,
}

/// One tracked application: the target and the undo record apply returned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppliedTo {
    pub target: EntityId,
    pub record: Applied,
}

/// A live aura attachment: definition, owner and tracked applications.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuraInstance {
    pub id: AuraId,
    /// Entity the aura's lifetime is bound to.
    pub owner: EntityId,
    pub aura: Aura,
    pub state: AuraState,
    /// Targets currently under the action, in selector order.
    pub applied: Vec<AppliedTo>,
    /// Refresh hook; released on detach.
    pub listener: ListenerId,
    /// Expiry hook for `Until` auras.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_listener: Option<ListenerId>,
}

impl AuraInstance {
    /// Whether the action is currently applied to `target`.
    #[must_use]
    pub fn is_applied_to(&self, target: EntityId) -> bool {
        self.applied.iter().any(|a| a.target == target)
    }

    /// Current tracked targets, in application order.
    #[must_use]
    pub fn tracked(&self) -> Vec<EntityId> {
        self.applied.iter().map(|a| a.target).collect()
    }
}

/// Registry of attached aura instances.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AuraRegistry {
    instances: FxHashMap<u32, AuraInstance>,
    next_id: u32,
}

impl AuraRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next aura handle.
    pub fn next_id(&mut self) -> AuraId {
        let id = AuraId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert an instance under its own id.
    pub fn insert(&mut self, instance: AuraInstance) {
        self.instances.insert(instance.id.0, instance);
    }

    /// Remove an instance, returning it for teardown.
    pub fn remove(&mut self, id: AuraId) -> Option<AuraInstance> {
        self.instances.remove(&id.0)
    }

    #[must_use]
    pub fn get(&self, id: AuraId) -> Option<&AuraInstance> {
        self.instances.get(&id.0)
    }

    pub fn get_mut(&mut self, id: AuraId) -> Option<&mut AuraInstance> {
        self.instances.get_mut(&id.0)
    }

    /// Ids of every aura bound to `owner`, in attach order.
    #[must_use]
    pub fn for_owner(&self, owner: EntityId) -> Vec<AuraId> {
        let mut ids: Vec<AuraId> = self
            .instances
            .values()
            .filter(|i| i.owner == owner)
            .map(|i| i.id)
            .collect();
        ids.sort_by_key(|id| id.0);
        ids
    }

    /// Ids of every attached aura, in attach order.
    #[must_use]
    pub fn all_ids(&self) -> Vec<AuraId> {
        let mut ids: Vec<AuraId> = self.instances.values().map(|i| i.id).collect();
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

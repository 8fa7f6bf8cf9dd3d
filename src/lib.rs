//! # emberstone
//!
//! A declarative tag-based effect engine for card battlers.
//!
//! Cards carry no code. Their behavior is written in a closed vocabulary
//! of serializable tags - conditions, selectors, actions, auras and
//! effects - and the engine interprets those tags against the board. The
//! two load-bearing guarantees:
//!
//! - **Exact reversal**: every reversible action returns an undo record
//!   capturing what was actually applied, so removing a buff restores the
//!   target precisely even after intervening changes.
//!
//! - **Determinism**: all randomness flows through one seeded RNG, and the
//!   whole game state - listener table and aura tracking included -
//!   serializes to JSON, so a reloaded game replays identically.
//!
//! ## Modules
//!
//! - `core`: entities, players, the [`Game`] orchestrator, seeded RNG
//! - `events`: event kinds and the listener dispatcher
//! - `tags`: the tag vocabulary cards are written in
//! - `cards`: card definitions and the card library
//! - `persist`: save files with tag-vocabulary validation

pub mod cards;
pub mod core;
pub mod error;
pub mod events;
pub mod persist;
pub mod tags;

pub use crate::cards::{Card, CardKind, CardLibrary};
pub use crate::core::{
    Character, CharacterKind, EntityId, Game, GameRng, GameRngState, ManaFilter, Player, PlayerId,
    StatusCounters, Subtype,
};
pub use crate::error::LoadError;
pub use crate::events::{Dispatcher, EventKind, GameEvent, Listener, ListenerId, Reaction};
pub use crate::persist::{card_from_json, card_to_json, load_json, save_json};
pub use crate::tags::{
    Action, Amount, Applied, AppliedTo, Aura, AuraId, AuraInstance, AuraRegistry, AuraState,
    CardCondition, CardQuery, CardZone, Condition, Effect, EffectId, EffectInstance,
    EffectRegistry, EffectState, EventFilter, Multiplier, PickPolicy, Picker, Selector, Side,
};

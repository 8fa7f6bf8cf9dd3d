//! The tag system: the declarative vocabulary cards are written in.
//!
//! Conditions filter, selectors resolve targets, card queries resolve
//! cards, actions mutate, auras maintain reversible actions over a
//! match-set, and effects fire one-shot actions at lifecycle moments.
//! Every type here serializes to a tagged record, so card definitions and
//! whole game states round-trip through JSON.

mod action;
mod aura;
mod card_query;
mod condition;
mod effect;
mod selector;

pub use action::{Action, Amount, Applied, Multiplier};
pub use aura::{AppliedTo, Aura, AuraId, AuraInstance, AuraRegistry, AuraState};
pub use card_query::{CardQuery, CardZone, PickPolicy};
pub use condition::{CardCondition, Condition};
pub use effect::{Effect, EffectId, EffectInstance, EffectRegistry, EffectState, EventFilter};
pub use selector::{Picker, Selector, Side};

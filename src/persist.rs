//! Save-file handling.
//!
//! Game states and card definitions serialize to JSON as trees of tagged
//! records: every enum in the tag vocabulary carries a `kind` field
//! naming its variant. Loading validates every `kind` in the document
//! against the documented vocabulary before decoding, so a save written
//! by a newer build with kinds this build does not know fails with
//! [`LoadError::UnknownTagKind`] instead of silently dropping behavior.

use serde_json::Value;

use crate::cards::{Card, CardKind};
use crate::core::{CharacterKind, Game};
use crate::error::LoadError;
use crate::events::{EventKind, Reaction};
use crate::tags::{
    Action, Applied, Aura, CardCondition, CardQuery, Condition, Effect, Multiplier, Selector,
};

/// Serialize a full game state.
pub fn save_json(game: &Game) -> Result<String, LoadError> {
    Ok(serde_json::to_string_pretty(game)?)
}

/// Load a full game state, validating the tag vocabulary first.
pub fn load_json(text: &str) -> Result<Game, LoadError> {
    let value: Value = serde_json::from_str(text)?;
    validate_kinds(&value)?;
    Ok(serde_json::from_value(value)?)
}

/// Serialize a card definition.
pub fn card_to_json(card: &Card) -> Result<String, LoadError> {
    Ok(serde_json::to_string_pretty(card)?)
}

/// Load a card definition, validating the tag vocabulary first.
pub fn card_from_json(text: &str) -> Result<Card, LoadError> {
    let value: Value = serde_json::from_str(text)?;
    validate_kinds(&value)?;
    Ok(serde_json::from_value(value)?)
}

/// Every documented `kind` string across the tag vocabulary.
fn documented(kind: &str) -> bool {
    const FAMILIES: &[&[&str]] = &[
        Action::KINDS,
        Applied::KINDS,
        Multiplier::KINDS,
        Aura::KINDS,
        Effect::KINDS,
        Condition::KINDS,
        CardCondition::KINDS,
        CardQuery::KINDS,
        Selector::KINDS,
        Reaction::KINDS,
        EventKind::KINDS,
        CharacterKind::KINDS,
        CardKind::KINDS,
    ];
    FAMILIES.iter().any(|family| family.contains(&kind))
}

/// Walk the document and reject any object whose `kind` is undocumented.
fn validate_kinds(value: &Value) -> Result<(), LoadError> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(kind)) = map.get("kind") {
                if !documented(kind) {
                    return Err(LoadError::UnknownTagKind { kind: kind.clone() });
                }
            }
            for nested in map.values() {
                validate_kinds(nested)?;
            }
        }
        Value::Array(items) => {
            for item in items {
                validate_kinds(item)?;
            }
        }
        _ => {}
    }
    Ok(())
}

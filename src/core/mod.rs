//! Core game state: entities, players, the game orchestrator and the
//! seeded RNG.

mod entity;
mod game;
mod player;
mod rng;

pub use entity::{Character, CharacterKind, EntityId, PlayerId, StatusCounters, Subtype};
pub use game::Game;
pub use player::{ManaFilter, Player, BOARD_LIMIT, HAND_LIMIT, MAX_MANA};
pub use rng::{GameRng, GameRngState};

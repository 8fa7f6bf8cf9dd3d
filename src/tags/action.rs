//! The action family: atomic, optionally reversible board mutations.
//!
//! An action is the leaf mutation unit of the tag system. One-shot actions
//! (damage, draw, summon...) fire and are done. Reversible actions are the
//! ones auras are built from: `apply` returns an [`Applied`] undo record
//! capturing exactly what was done - the diff actually applied, the
//! listener actually registered - so `revert` is an exact inverse of the
//! immediately preceding apply on that target, independent of anything
//! that changed in between.
//!
//! Missing targets are resolution misses: apply and revert on an entity
//! that no longer exists are silent no-ops. Reverting an action that was
//! never applied to the target is an authoring bug: it fails fast in dev
//! builds and degrades to a logged no-op in release builds.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, Game, StatusCounters};
use crate::events::{EventKind, ListenerId, Reaction};

use super::aura::{Aura, AuraId};
use super::card_query::CardQuery;
use super::condition::CardCondition;
use super::effect::Effect;
use super::selector::Selector;

fn one() -> u32 {
    1
}

/// A magnitude with an optional multiplier resolved at apply time.
///
/// The resolved value is what gets recorded in the undo record, so revert
/// subtracts what was actually applied even if the multiplier's inputs
/// have since changed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    pub base: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<Multiplier>,
}

impl Amount {
    /// A fixed magnitude.
    #[must_use]
    pub fn fixed(base: i32) -> Self {
        Self {
            base,
            multiplier: None,
        }
    }

    /// `base` per entity matched by `selector`, counted from the actor.
    #[must_use]
    pub fn per(base: i32, selector: Selector) -> Self {
        Self {
            base,
            multiplier: Some(Multiplier::Count { selector }),
        }
    }

    /// Resolve the magnitude now.
    #[must_use]
    pub fn resolve(&self, game: &Game, actor: EntityId) -> i32 {
        match &self.multiplier {
            None => self.base,
            Some(Multiplier::Fixed { value }) => self.base * value,
            Some(Multiplier::Count { selector }) => {
                self.base * selector.match_set(game, actor).len() as i32
            }
        }
    }
}

impl From<i32> for Amount {
    fn from(base: i32) -> Self {
        Self::fixed(base)
    }
}

/// Multiplier applied to an [`Amount`]'s base at apply time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Multiplier {
    Fixed { value: i32 },
    /// Number of entities the selector currently matches from the actor.
    Count { selector: Selector },
}

impl Multiplier {
    /// Documented kind strings, for save-file validation.
    pub const KINDS: &'static [&'static str] = &["fixed", "count"];
}

/// Undo record produced by [`Action::apply`].
///
/// Serialized with attached auras so that a reloaded game reverts exactly
/// what the original run applied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Applied {
    /// Nothing to undo (one-shot actions).
    None,
    /// A resolved numeric delta.
    Amount { amount: i32 },
    /// A single status grant.
    Granted,
    /// An auxiliary listener registered at apply time.
    Listener { listener: ListenerId },
    /// A mana filter installed on the owning player.
    ManaFilter { filter: u32 },
    /// Auras granted to the target.
    Auras { auras: Vec<AuraId> },
}

impl Applied {
    /// Documented kind strings, for save-file validation.
    pub const KINDS: &'static [&'static str] = &[
        "none",
        "amount",
        "granted",
        "listener",
        "mana_filter",
        "auras",
    ];
}

/// An atomic board mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    // === One-shot ===
    /// Deal damage to the target.
    Damage { amount: i32 },
    /// Heal the target up to its maximum health.
    Heal { amount: i32 },
    /// Draw cards for the target's controller.
    Draw {
        #[serde(default = "one")]
        count: u32,
    },
    /// Discard random cards from the target controller's hand.
    Discard {
        #[serde(default = "one")]
        count: u32,
    },
    /// Destroy the target outright.
    Kill,
    /// Strip the target's auras, effects and deathrattles.
    Silence,
    /// Return the target minion to its owner's hand.
    Bounce,
    /// Freeze the target until its controller's next turn.
    Freeze,
    /// Add armor to the target hero.
    IncreaseArmor { amount: i32 },
    /// Grant mana crystals to the target's controller, optionally empty.
    GiveManaCrystal {
        #[serde(default = "one")]
        count: u32,
        #[serde(default)]
        empty: bool,
    },
    /// Destroy one of the target controller's mana crystals.
    DestroyManaCrystal,
    /// Add pending overload to the target's controller.
    GainOverload { amount: i32 },
    /// Summon minions for the target's controller.
    Summon {
        card: CardQuery,
        #[serde(default = "one")]
        count: u32,
    },
    /// Replace the target minion in place.
    Transform { card: CardQuery },
    /// Add cards to the target controller's hand.
    AddCard {
        card: CardQuery,
        #[serde(default = "one")]
        count: u32,
    },
    /// Equip a weapon for the target's controller.
    Equip { weapon: CardQuery },
    /// Apply the inner action with probability 1/`one_in`.
    Chance { action: Box<Action>, one_in: u32 },
    /// Grant auras owned by the target itself.
    Give { auras: Vec<Aura> },
    /// Grant triggered effects or deathrattles to the target.
    GiveEffect { effects: Vec<Effect> },

    // === Reversible ===
    /// Add to the target's attack; magnitude resolved at apply time.
    ChangeAttack { amount: Amount },
    /// Add to the target's maximum health; positive grants heal too.
    ChangeHealth { amount: Amount },
    /// Force the target's attack to a value, recording the diff actually
    /// applied so revert restores the prior attack exactly.
    SetAttack { attack: i32 },
    /// Keep the target's health from dropping below a floor while applied.
    MinimumHealth { floor: i32 },
    Taunt,
    Charge,
    Stealth,
    DivineShield,
    Windfury,
    Immune,
    CantAttack,
    /// Add spell damage to the target controller.
    SpellDamage { amount: i32 },
    /// Install a mana-cost discount on the target's controller for cards
    /// matching the conditions, never below `minimum`.
    ManaChange {
        amount: i32,
        minimum: i32,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        conditions: Vec<CardCondition>,
    },
}

impl Action {
    /// Documented kind strings, for save-file validation.
    pub const KINDS: &'static [&'static str] = &[
        "damage",
        "heal",
        "draw",
        "discard",
        "kill",
        "silence",
        "bounce",
        "freeze",
        "increase_armor",
        "give_mana_crystal",
        "destroy_mana_crystal",
        "gain_overload",
        "summon",
        "transform",
        "add_card",
        "equip",
        "chance",
        "give",
        "give_effect",
        "change_attack",
        "change_health",
        "set_attack",
        "minimum_health",
        "taunt",
        "charge",
        "stealth",
        "divine_shield",
        "windfury",
        "immune",
        "cant_attack",
        "spell_damage",
        "mana_change",
    ];

    /// Whether this action has an exact inverse and may drive an aura.
    #[must_use]
    pub fn is_reversible(&self) -> bool {
        matches!(
            self,
            Self::ChangeAttack { .. }
                | Self::ChangeHealth { .. }
                | Self::SetAttack { .. }
                | Self::MinimumHealth { .. }
                | Self::Taunt
                | Self::Charge
                | Self::Stealth
                | Self::DivineShield
                | Self::Windfury
                | Self::Immune
                | Self::CantAttack
                | Self::SpellDamage { .. }
                | Self::ManaChange { .. }
                | Self::Give { .. }
        )
    }

    /// Whether this action is only meaningful on minion targets.
    ///
    /// This is a construction-time contract: pairing a minion action with
    /// a selector that can yield heroes or weapons is an authoring bug.
    #[must_use]
    pub fn requires_minion(&self) -> bool {
        matches!(
            self,
            Self::MinimumHealth { .. }
                | Self::Taunt
                | Self::Charge
                | Self::Stealth
                | Self::DivineShield
                | Self::Windfury
                | Self::Immune
                | Self::CantAttack
                | Self::SpellDamage { .. }
        )
    }

    /// Copy of this action with a spell-damage bonus folded into its
    /// damage amounts. Only direct damage grows; heals, summons and the
    /// rest pass through unchanged.
    #[must_use]
    pub fn boosted(&self, bonus: i32) -> Self {
        if bonus == 0 {
            return self.clone();
        }
        match self {
            Self::Damage { amount } => Self::Damage {
                amount: amount + bonus,
            },
            Self::Chance { action, one_in } => Self::Chance {
                action: Box::new(action.boosted(bonus)),
                one_in: *one_in,
            },
            other => other.clone(),
        }
    }

    /// Apply to a target, returning the undo record.
    ///
    /// A missing target or an empty card-query result is a silent no-op.
    pub fn apply(&self, game: &mut Game, actor: EntityId, target: EntityId) -> Applied {
        match self {
            Self::Damage { amount } => {
                game.deal_damage(Some(actor), target, *amount);
                Applied::None
            }
            Self::Heal { amount } => {
                game.heal(actor, target, *amount);
                Applied::None
            }
            Self::Draw { count } => {
                if let Some(player) = game.owner_of(target) {
                    for _ in 0..*count {
                        game.draw_card(player);
                    }
                }
                Applied::None
            }
            Self::Discard { count } => {
                if let Some(player) = game.owner_of(target) {
                    for _ in 0..*count {
                        game.discard_random(player);
                    }
                }
                Applied::None
            }
            Self::Kill => {
                game.kill(target);
                Applied::None
            }
            Self::Silence => {
                game.silence(target);
                Applied::None
            }
            Self::Bounce => {
                game.bounce(target);
                Applied::None
            }
            Self::Freeze => {
                if let Some(ch) = game.character_mut(target) {
                    ch.status.frozen += 1;
                }
                Applied::None
            }
            Self::IncreaseArmor { amount } => {
                if let Some(ch) = game.character_mut(target) {
                    ch.armor += amount;
                }
                Applied::None
            }
            Self::GiveManaCrystal { count, empty } => {
                if let Some(player) = game.owner_of(target) {
                    let p = game.player_mut(player);
                    p.max_mana = (p.max_mana + *count as i32).min(10);
                    if !empty {
                        p.mana += *count as i32;
                    }
                }
                Applied::None
            }
            Self::DestroyManaCrystal => {
                if let Some(player) = game.owner_of(target) {
                    let p = game.player_mut(player);
                    p.max_mana = (p.max_mana - 1).max(0);
                    if p.mana > 0 {
                        p.mana -= 1;
                    }
                }
                Applied::None
            }
            Self::GainOverload { amount } => {
                if let Some(player) = game.owner_of(target) {
                    game.player_mut(player).overload_pending += amount;
                }
                Applied::None
            }
            Self::Summon { card, count } => {
                self.apply_summon(game, actor, target, card, *count);
                Applied::None
            }
            Self::Transform { card } => {
                if let Some(player) = game.owner_of(target) {
                    if let Some(card) = card.resolve(game, player) {
                        game.transform(target, &card);
                    }
                }
                Applied::None
            }
            Self::AddCard { card, count } => {
                if let Some(player) = game.owner_of(target) {
                    for _ in 0..*count {
                        if let Some(card) = card.resolve(game, player) {
                            game.add_to_hand(player, card);
                        }
                    }
                }
                Applied::None
            }
            Self::Equip { weapon } => {
                if let Some(player) = game.owner_of(target) {
                    if let Some(card) = weapon.resolve(game, player) {
                        game.equip_weapon(player, &card);
                    }
                }
                Applied::None
            }
            Self::Chance { action, one_in } => {
                if game.rng.one_in(*one_in) {
                    action.apply(game, actor, target);
                }
                Applied::None
            }
            Self::Give { auras } => {
                let ids = auras
                    .iter()
                    .map(|aura| game.attach_aura(target, aura.clone()))
                    .collect();
                Applied::Auras { auras: ids }
            }
            Self::GiveEffect { effects } => {
                for effect in effects {
                    game.grant_effect(target, effect.clone());
                }
                Applied::None
            }

            Self::ChangeAttack { amount } => {
                let resolved = amount.resolve(game, actor);
                match game.character_mut(target) {
                    Some(ch) => {
                        ch.attack_delta += resolved;
                        Applied::Amount { amount: resolved }
                    }
                    None => Applied::None,
                }
            }
            Self::ChangeHealth { amount } => {
                let resolved = amount.resolve(game, actor);
                let Some(ch) = game.character_mut(target) else {
                    return Applied::None;
                };
                if resolved > 0 {
                    ch.health_delta += resolved;
                    ch.health += resolved;
                } else {
                    ch.health_delta += resolved;
                    if ch.health > ch.max_health() {
                        ch.health = ch.max_health();
                    }
                }
                // A reduction below one health is lethal for minions.
                let lethal = ch.is_minion() && ch.health <= 0;
                if lethal {
                    game.flag_lethal(target);
                }
                Applied::Amount { amount: resolved }
            }
            Self::SetAttack { attack } => match game.character_mut(target) {
                Some(ch) => {
                    let diff = *attack - ch.attack();
                    ch.attack_delta += diff;
                    Applied::Amount { amount: diff }
                }
                None => Applied::None,
            },
            Self::MinimumHealth { floor } => {
                if game.character(target).is_none() {
                    return Applied::None;
                }
                let listener = game.dispatcher.subscribe(
                    Some(EventKind::CharacterDamaged),
                    Reaction::EnforceHealthFloor {
                        target,
                        floor: *floor,
                    },
                );
                Applied::Listener { listener }
            }
            Self::Taunt => Self::grant(game, target, |s| s.taunt += 1),
            Self::Charge => Self::grant(game, target, |s| s.charge += 1),
            Self::Stealth => Self::grant(game, target, |s| s.stealth += 1),
            Self::DivineShield => Self::grant(game, target, |s| s.divine_shield += 1),
            Self::Windfury => Self::grant(game, target, |s| s.windfury += 1),
            Self::Immune => Self::grant(game, target, |s| s.immune += 1),
            Self::CantAttack => Self::grant(game, target, |s| s.cant_attack += 1),
            Self::SpellDamage { amount } => match game.owner_of(target) {
                Some(player) => {
                    game.player_mut(player).spell_damage += amount;
                    Applied::Amount { amount: *amount }
                }
                None => Applied::None,
            },
            Self::ManaChange {
                amount,
                minimum,
                conditions,
            } => match game.owner_of(target) {
                Some(player) => {
                    let filter =
                        game.install_mana_filter(player, *amount, *minimum, conditions.clone());
                    Applied::ManaFilter { filter }
                }
                None => Applied::None,
            },
        }
    }

    /// Revert a previous apply on the same target.
    ///
    /// The undo record must be the one that apply returned for this
    /// (action, target) pair; a mismatch is an authoring bug.
    pub fn revert(&self, game: &mut Game, _actor: EntityId, target: EntityId, applied: &Applied) {
        match (self, applied) {
            // A `None` record means nothing was applied to begin with.
            (_, Applied::None) => {}

            // Listener and aura grants are released even if the target has
            // since left play; they live outside the character.
            (Self::MinimumHealth { .. }, Applied::Listener { listener }) => {
                game.dispatcher.unsubscribe(*listener);
            }
            (Self::ManaChange { .. }, Applied::ManaFilter { filter }) => {
                game.remove_mana_filter(*filter);
            }
            (Self::Give { .. }, Applied::Auras { auras }) => {
                for id in auras {
                    game.detach_aura(*id);
                }
            }

            // A character that no longer exists has nothing to restore.
            (_, _) if game.character(target).is_none() => {}

            (Self::ChangeAttack { .. }, Applied::Amount { amount })
            | (Self::SetAttack { .. }, Applied::Amount { amount }) => {
                if let Some(ch) = game.character_mut(target) {
                    ch.attack_delta -= amount;
                }
            }
            (Self::ChangeHealth { .. }, Applied::Amount { amount }) => {
                if let Some(ch) = game.character_mut(target) {
                    if *amount > 0 {
                        ch.health_delta -= amount;
                        if ch.health > ch.max_health() {
                            ch.health = ch.max_health();
                        }
                    } else {
                        if ch.max_health() == ch.health {
                            ch.health -= amount;
                        }
                        ch.health_delta -= amount;
                    }
                }
            }
            (Self::Taunt, Applied::Granted) => Self::release(game, target, |s| &mut s.taunt),
            (Self::Charge, Applied::Granted) => Self::release(game, target, |s| &mut s.charge),
            (Self::Stealth, Applied::Granted) => Self::release(game, target, |s| &mut s.stealth),
            (Self::DivineShield, Applied::Granted) => {
                Self::release(game, target, |s| &mut s.divine_shield)
            }
            (Self::Windfury, Applied::Granted) => Self::release(game, target, |s| &mut s.windfury),
            (Self::Immune, Applied::Granted) => Self::release(game, target, |s| &mut s.immune),
            (Self::CantAttack, Applied::Granted) => {
                Self::release(game, target, |s| &mut s.cant_attack)
            }
            (Self::SpellDamage { .. }, Applied::Amount { amount }) => {
                if let Some(player) = game.owner_of(target) {
                    game.player_mut(player).spell_damage -= amount;
                }
            }

            _ => revert_mismatch(self, target),
        }
    }

    fn grant(
        game: &mut Game,
        target: EntityId,
        bump: impl FnOnce(&mut StatusCounters),
    ) -> Applied {
        match game.character_mut(target) {
            Some(ch) => {
                bump(&mut ch.status);
                Applied::Granted
            }
            None => Applied::None,
        }
    }

    fn release(
        game: &mut Game,
        target: EntityId,
        counter: impl FnOnce(&mut StatusCounters) -> &mut u32,
    ) {
        if let Some(ch) = game.character_mut(target) {
            let c = counter(&mut ch.status);
            *c = c.saturating_sub(1);
        }
    }

    fn apply_summon(
        &self,
        game: &mut Game,
        actor: EntityId,
        target: EntityId,
        card: &CardQuery,
        count: u32,
    ) {
        let Some(player) = game.owner_of(target) else {
            return;
        };
        let Some(card) = card.resolve(game, player) else {
            return;
        };

        // Placement follows the originator: a surviving minion summons to
        // its right, a dying one summons into its old slot, and later
        // summons move to the left of their originator.
        let actor_minion = game
            .character(actor)
            .filter(|c| c.is_minion() && c.owner == player)
            .map(|c| (c.removed, c.last_index));

        let mut index = match actor_minion {
            Some((true, last_index)) => last_index,
            Some((false, _)) => game
                .board_index(actor)
                .map_or_else(|| game.player(player).board.len(), |i| i + 1),
            None => game.player(player).board.len(),
        };

        for _ in 0..count {
            game.summon_minion(player, &card, index);
            if let Some((removed, last_index)) = actor_minion {
                index = if removed {
                    last_index
                } else {
                    game.board_index(actor).unwrap_or(last_index)
                };
            } else {
                index = game.player(player).board.len();
            }
        }
    }
}

fn revert_mismatch(action: &Action, target: EntityId) {
    debug_assert!(
        false,
        "revert of {action:?} on {target} without matching apply"
    );
    tracing::warn!(?action, %target, "revert without matching apply; ignoring");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Card;
    use crate::core::PlayerId;

    fn minion(game: &mut Game, name: &str, attack: i32, health: i32) -> EntityId {
        let card = Card::minion(name, 1, attack, health);
        let index = game.player(PlayerId::new(0)).board.len();
        game.summon_minion(PlayerId::new(0), &card, index).unwrap()
    }

    #[test]
    fn test_change_attack_apply_revert() {
        let mut game = Game::new(1);
        let id = minion(&mut game, "Bear", 3, 3);

        let action = Action::ChangeAttack {
            amount: Amount::fixed(2),
        };
        let record = action.apply(&mut game, id, id);
        assert_eq!(game.character(id).unwrap().attack(), 5);

        action.revert(&mut game, id, id, &record);
        assert_eq!(game.character(id).unwrap().attack(), 3);
    }

    #[test]
    fn test_set_attack_stores_actual_diff() {
        let mut game = Game::new(1);
        let id = minion(&mut game, "Bear", 3, 3);

        let action = Action::SetAttack { attack: 5 };
        let record = action.apply(&mut game, id, id);
        assert_eq!(record, Applied::Amount { amount: 2 });
        assert_eq!(game.character(id).unwrap().attack(), 5);

        action.revert(&mut game, id, id, &record);
        assert_eq!(game.character(id).unwrap().attack(), 3);
    }

    #[test]
    fn test_change_health_heals_on_grant_and_clamps_on_revert() {
        let mut game = Game::new(1);
        let id = minion(&mut game, "Yeti", 4, 5);

        let action = Action::ChangeHealth {
            amount: Amount::fixed(2),
        };
        let record = action.apply(&mut game, id, id);
        {
            let ch = game.character(id).unwrap();
            assert_eq!(ch.max_health(), 7);
            assert_eq!(ch.health, 7);
        }

        // Take damage, then revert the grant: health clamps to new max.
        game.deal_damage(None, id, 1);
        action.revert(&mut game, id, id, &record);
        let ch = game.character(id).unwrap();
        assert_eq!(ch.max_health(), 5);
        assert_eq!(ch.health, 5);
    }

    #[test]
    fn test_change_health_negative_revert_heals_if_undamaged() {
        let mut game = Game::new(1);
        let id = minion(&mut game, "Yeti", 4, 5);

        let action = Action::ChangeHealth {
            amount: Amount::fixed(-2),
        };
        let record = action.apply(&mut game, id, id);
        {
            let ch = game.character(id).unwrap();
            assert_eq!(ch.max_health(), 3);
            assert_eq!(ch.health, 3);
        }

        action.revert(&mut game, id, id, &record);
        let ch = game.character(id).unwrap();
        assert_eq!(ch.max_health(), 5);
        assert_eq!(ch.health, 5);
    }

    #[test]
    fn test_amount_multiplier_resolves_at_apply_time() {
        let mut game = Game::new(1);
        let a = minion(&mut game, "A", 1, 1);
        let _b = minion(&mut game, "B", 1, 1);
        let _c = minion(&mut game, "C", 1, 1);

        let action = Action::ChangeAttack {
            amount: Amount::per(1, Selector::friendly_minions()),
        };
        let record = action.apply(&mut game, a, a);
        // Three friendly minions at apply time.
        assert_eq!(record, Applied::Amount { amount: 3 });
        assert_eq!(game.character(a).unwrap().attack(), 4);

        // Later board changes do not affect the stored inverse.
        let _d = minion(&mut game, "D", 1, 1);
        action.revert(&mut game, a, a, &record);
        assert_eq!(game.character(a).unwrap().attack(), 1);
    }

    #[test]
    fn test_status_grants_stack_and_release() {
        let mut game = Game::new(1);
        let id = minion(&mut game, "Guard", 1, 1);

        let r1 = Action::Taunt.apply(&mut game, id, id);
        let r2 = Action::Taunt.apply(&mut game, id, id);
        assert_eq!(game.character(id).unwrap().status.taunt, 2);

        Action::Taunt.revert(&mut game, id, id, &r1);
        assert_eq!(game.character(id).unwrap().status.taunt, 1);
        Action::Taunt.revert(&mut game, id, id, &r2);
        assert_eq!(game.character(id).unwrap().status.taunt, 0);
    }

    #[test]
    fn test_minimum_health_listener_pairing() {
        let mut game = Game::new(1);
        let id = minion(&mut game, "Tough", 1, 7);

        let action = Action::MinimumHealth { floor: 1 };
        let record = action.apply(&mut game, id, id);

        game.deal_damage(None, id, 100);
        assert_eq!(game.character(id).unwrap().health, 1);

        action.revert(&mut game, id, id, &record);
        game.deal_damage(None, id, 100);
        assert!(game.character(id).is_none());
    }

    #[test]
    fn test_revert_on_missing_target_is_noop() {
        let mut game = Game::new(1);
        let id = minion(&mut game, "Gone", 2, 2);

        let action = Action::ChangeAttack {
            amount: Amount::fixed(2),
        };
        let record = action.apply(&mut game, id, id);
        game.kill(id);
        // Target left play; revert drops silently.
        action.revert(&mut game, id, id, &record);
    }

    #[test]
    fn test_summon_miss_is_noop() {
        let mut game = Game::new(1);
        let id = minion(&mut game, "Caller", 1, 1);

        let action = Action::Summon {
            card: CardQuery::named("NoSuchCard"),
            count: 1,
        };
        action.apply(&mut game, id, id);
        assert_eq!(game.player(PlayerId::new(0)).board.len(), 1);
    }

    #[test]
    fn test_multi_summon_moves_left_of_originator() {
        let mut game = Game::new(1);
        game.library.register(Card::minion("Whelp", 1, 1, 1));
        let a = minion(&mut game, "A", 1, 1);
        let b = minion(&mut game, "B", 1, 1);

        let action = Action::Summon {
            card: CardQuery::named("Whelp"),
            count: 2,
        };
        action.apply(&mut game, a, a);

        let board = &game.player(PlayerId::new(0)).board;
        let names: Vec<_> = board
            .iter()
            .map(|&id| game.character(id).unwrap().card_name.clone())
            .collect();
        // First whelp lands right of A, second moves left of A.
        assert_eq!(names, vec!["Whelp", "A", "Whelp", "B"]);
        let _ = b;
    }

    #[test]
    fn test_chance_is_seed_deterministic() {
        let run = |seed: u64| {
            let mut game = Game::new(seed);
            let id = minion(&mut game, "Coin", 1, 30);
            let action = Action::Chance {
                action: Box::new(Action::Damage { amount: 1 }),
                one_in: 2,
            };
            for _ in 0..8 {
                action.apply(&mut game, id, id);
            }
            game.character(id).unwrap().health
        };
        assert_eq!(run(5), run(5));
    }

    #[test]
    fn test_mana_change_install_and_remove() {
        let mut game = Game::new(1);
        let p = PlayerId::new(0);
        let hero = game.player(p).hero;

        let action = Action::ManaChange {
            amount: 2,
            minimum: 1,
            conditions: vec![CardCondition::IsMinionCard],
        };
        let record = action.apply(&mut game, hero, hero);

        let yeti = Card::minion("Yeti", 4, 4, 5);
        let axe = Card::weapon("Axe", 2, 3, 2);
        assert_eq!(game.player(p).effective_cost(&yeti), 2);
        assert_eq!(game.player(p).effective_cost(&axe), 2);

        action.revert(&mut game, hero, hero, &record);
        assert_eq!(game.player(p).effective_cost(&yeti), 4);
    }

    #[test]
    fn test_serialization_kind_form() {
        let action = Action::Summon {
            card: CardQuery::named("Whelp"),
            count: 2,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["kind"], "summon");
        assert_eq!(json["card"]["kind"], "named");

        let back: Action = serde_json::from_value(json).unwrap();
        assert_eq!(action, back);
    }

    #[test]
    fn test_classification() {
        assert!(Action::Taunt.is_reversible());
        assert!(Action::Taunt.requires_minion());
        assert!(!Action::Kill.is_reversible());
        assert!(Action::SetAttack { attack: 5 }.is_reversible());
        assert!(!Action::SetAttack { attack: 5 }.requires_minion());
    }
}

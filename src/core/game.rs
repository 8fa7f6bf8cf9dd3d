//! The game state and the engine's orchestration layer.
//!
//! `Game` owns the two players, the character arena, the event dispatcher
//! and the aura and effect registries. All mutation goes through it: the
//! controller plays cards and advances turns, the engine fires events and
//! maintains auras. Firing is synchronous and re-entrant; a death caused
//! by an aura refresh may fire deathrattles that attach new auras before
//! the outer refresh returns.
//!
//! Randomness flows exclusively through the owned [`GameRng`], so two
//! games constructed with the same seed and driven by the same calls
//! produce identical states.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardKind, CardLibrary};
use crate::events::{Dispatcher, EventKind, GameEvent, Reaction};
use crate::tags::{
    Aura, AuraId, AuraInstance, AuraState, Effect, EffectId, EffectInstance, EffectState,
    EventFilter,
};

use super::entity::{Character, CharacterKind, EntityId, PlayerId};
use super::player::{ManaFilter, Player, HAND_LIMIT, MAX_MANA};
use super::rng::GameRng;

const HERO_HEALTH: i32 = 30;

/// Full game state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Game {
    pub players: [Player; 2],
    characters: FxHashMap<u32, Character>,
    pub dispatcher: Dispatcher,
    pub auras: crate::tags::AuraRegistry,
    pub effects: crate::tags::EffectRegistry,
    pub library: CardLibrary,
    pub rng: GameRng,
    pub current_player: PlayerId,
    next_entity: u32,
    next_filter: u32,
    /// Queued targets for directed pickers, consumed in order.
    directed_choices: VecDeque<EntityId>,
    /// Nesting depth of in-progress aura diffs; both transient fields are
    /// empty whenever the state is quiescent enough to save.
    #[serde(skip)]
    refresh_depth: u32,
    #[serde(skip)]
    pending_deaths: Vec<EntityId>,
}

impl Game {
    /// Create a game with two fresh heroes and the given RNG seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut characters = FxHashMap::default();
        let hero0 = EntityId(0);
        let hero1 = EntityId(1);
        characters.insert(
            hero0.0,
            Character::hero(hero0, "Hero", PlayerId::new(0), HERO_HEALTH),
        );
        characters.insert(
            hero1.0,
            Character::hero(hero1, "Hero", PlayerId::new(1), HERO_HEALTH),
        );

        Self {
            players: [
                Player::new(PlayerId::new(0), hero0),
                Player::new(PlayerId::new(1), hero1),
            ],
            characters,
            dispatcher: Dispatcher::new(),
            auras: crate::tags::AuraRegistry::new(),
            effects: crate::tags::EffectRegistry::new(),
            library: CardLibrary::new(),
            rng: GameRng::new(seed),
            current_player: PlayerId::new(0),
            next_entity: 2,
            next_filter: 0,
            directed_choices: VecDeque::new(),
            refresh_depth: 0,
            pending_deaths: Vec::new(),
        }
    }

    // === Lookups ===

    #[must_use]
    pub fn character(&self, id: EntityId) -> Option<&Character> {
        self.characters.get(&id.0)
    }

    pub fn character_mut(&mut self, id: EntityId) -> Option<&mut Character> {
        self.characters.get_mut(&id.0)
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.index()]
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id.index()]
    }

    /// Controller of an entity, if it still exists.
    #[must_use]
    pub fn owner_of(&self, id: EntityId) -> Option<PlayerId> {
        self.character(id).map(|c| c.owner)
    }

    /// Board position of a minion on its controller's row.
    #[must_use]
    pub fn board_index(&self, id: EntityId) -> Option<usize> {
        let owner = self.owner_of(id)?;
        self.player(owner).board_index(id)
    }

    /// Whether either hero is at or below zero health.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.players
            .iter()
            .any(|p| self.character(p.hero).is_some_and(|h| h.health <= 0))
    }

    // === Directed choices ===

    /// Queue a target for the next directed picker.
    pub fn push_choice(&mut self, target: EntityId) {
        self.directed_choices.push_back(target);
    }

    /// Consume the next queued directed choice.
    pub fn next_choice(&mut self) -> Option<EntityId> {
        self.directed_choices.pop_front()
    }

    // === Events ===

    /// Fire an event through the dispatcher.
    ///
    /// The matching listener set is snapshotted before any reaction runs;
    /// listeners unregistered by an earlier reaction are skipped.
    pub fn fire_event(&mut self, event: GameEvent) {
        tracing::trace!(kind = %event.kind, "event");
        let snapshot = self.dispatcher.matching(event.kind);
        for listener in snapshot {
            if !self.dispatcher.is_subscribed(listener.id) {
                continue;
            }
            match listener.reaction {
                Reaction::RefreshAura { aura } => self.refresh_aura(aura),
                Reaction::ExpireAura { aura } => self.expire_aura(aura, &event),
                Reaction::FireEffect { effect } => self.fire_effect(effect, &event),
                Reaction::EnforceHealthFloor { target, floor } => {
                    self.enforce_health_floor(target, floor, &event);
                }
            }
        }
    }

    fn filter_matches(&self, filter: &EventFilter, owner: EntityId, event: &GameEvent) -> bool {
        if filter.kind != event.kind {
            return false;
        }
        if filter.friendly_only {
            let Some(owner_player) = self.owner_of(owner) else {
                return false;
            };
            if event.player != Some(owner_player) {
                return false;
            }
        }
        if let Some(condition) = &filter.condition {
            let subject = event.target.or(event.source).unwrap_or(owner);
            if !condition.matches(self, owner, subject) {
                return false;
            }
        }
        true
    }

    // === Auras ===

    /// Attach an aura to an owner and apply it to its initial match-set.
    pub fn attach_aura(&mut self, owner: EntityId, aura: Aura) -> AuraId {
        let id = self.auras.next_id();
        let listener = self
            .dispatcher
            .subscribe(None, Reaction::RefreshAura { aura: id });
        let expiry_listener = aura
            .expiry()
            .map(|f| self.dispatcher.subscribe(Some(f.kind), Reaction::ExpireAura { aura: id }));

        self.auras.insert(AuraInstance {
            id,
            owner,
            aura,
            state: AuraState::Attached,
            applied: Vec::new(),
            listener,
            expiry_listener,
        });
        tracing::debug!(aura = %id, owner = %owner, "aura attached");
        self.refresh_aura(id);
        id
    }

    /// Detach an aura, reverting every tracked application.
    pub fn detach_aura(&mut self, id: AuraId) {
        let Some(mut instance) = self.auras.remove(id) else {
            return;
        };
        instance.state = AuraState::Detached;
        self.dispatcher.unsubscribe(instance.listener);
        if let Some(listener) = instance.expiry_listener {
            self.dispatcher.unsubscribe(listener);
        }

        let action = instance.aura.action().clone();
        for applied in instance.applied.drain(..) {
            action.revert(self, instance.owner, applied.target, &applied.record);
        }
        tracing::debug!(aura = %id, owner = %instance.owner, "aura detached");
    }

    /// Re-resolve an aura's match-set and apply the diff.
    ///
    /// Entities matched both before and after keep their original undo
    /// record untouched; only newcomers and leavers are acted on.
    pub fn refresh_aura(&mut self, id: AuraId) {
        let Some(instance) = self.auras.get(id) else {
            return;
        };
        if instance.state != AuraState::Attached {
            return;
        }
        let owner = instance.owner;
        let aura = instance.aura.clone();

        // An aura whose owner left play detaches instead of refreshing.
        if self.character(owner).map_or(true, |c| c.removed) {
            self.detach_aura(id);
            return;
        }

        let fresh = aura.selector().match_set(self, owner);
        let mut old = match self.auras.get_mut(id) {
            Some(inst) => std::mem::take(&mut inst.applied),
            None => return,
        };

        // Deaths caused by the diff (health reductions below one) wait in
        // `pending_deaths` until the tracked set is written back.
        self.refresh_depth += 1;
        let mut next = Vec::with_capacity(fresh.len());
        for target in fresh {
            if let Some(pos) = old.iter().position(|a| a.target == target) {
                next.push(old.remove(pos));
            } else {
                let record = aura.action().apply(self, owner, target);
                next.push(crate::tags::AppliedTo { target, record });
            }
        }
        for leaver in old {
            aura.action().revert(self, owner, leaver.target, &leaver.record);
        }

        match self.auras.get_mut(id) {
            Some(inst) => inst.applied = next,
            // Detached re-entrantly while we were diffing; roll back.
            None => {
                for applied in next {
                    aura.action().revert(self, owner, applied.target, &applied.record);
                }
            }
        }
        self.refresh_depth -= 1;
        if self.refresh_depth == 0 {
            self.drain_pending_deaths();
        }
    }

    fn expire_aura(&mut self, id: AuraId, event: &GameEvent) {
        let Some(instance) = self.auras.get(id) else {
            return;
        };
        let owner = instance.owner;
        let expired = instance
            .aura
            .expiry()
            .is_some_and(|f| self.filter_matches(f, owner, event));
        if expired {
            tracing::debug!(aura = %id, "aura expired");
            self.detach_aura(id);
        }
    }

    // === Effects ===

    /// Bind an effect to an owner.
    ///
    /// Triggered effects get a dispatcher hook and a handle; deathrattles
    /// are stored on the owning character. A battlecry granted after its
    /// owner entered play has no moment left to fire at.
    pub fn grant_effect(&mut self, owner: EntityId, effect: Effect) -> Option<EffectId> {
        match &effect {
            Effect::Triggered { trigger, .. } => {
                let id = self.effects.next_id();
                let listener = self
                    .dispatcher
                    .subscribe(Some(trigger.kind), Reaction::FireEffect { effect: id });
                self.effects.insert(EffectInstance {
                    id,
                    owner,
                    effect,
                    state: EffectState::Bound,
                    listener,
                });
                tracing::debug!(effect = %id, owner = %owner, "effect bound");
                Some(id)
            }
            Effect::Deathrattle { .. } => {
                if let Some(ch) = self.character_mut(owner) {
                    ch.deathrattles.push(effect);
                }
                None
            }
            Effect::Battlecry { .. } => {
                tracing::warn!(owner = %owner, "battlecry granted after entry; ignored");
                None
            }
        }
    }

    /// Release a triggered effect's binding.
    pub fn unbind_effect(&mut self, id: EffectId) {
        if let Some(instance) = self.effects.remove(id) {
            self.dispatcher.unsubscribe(instance.listener);
            tracing::debug!(effect = %id, owner = %instance.owner, "effect unbound");
        }
    }

    fn fire_effect(&mut self, id: EffectId, event: &GameEvent) {
        let Some(instance) = self.effects.get(id) else {
            return;
        };
        let owner = instance.owner;
        let effect = instance.effect.clone();
        let Some(trigger) = effect.trigger() else {
            return;
        };
        if !self.filter_matches(trigger, owner, event) {
            return;
        }

        let targets = effect.selector().resolve(self, owner);
        for target in targets {
            effect.action().apply(self, owner, target);
        }
    }

    fn enforce_health_floor(&mut self, target: EntityId, floor: i32, event: &GameEvent) {
        if event.target != Some(target) {
            return;
        }
        if let Some(ch) = self.character_mut(target) {
            if !ch.removed && ch.health < floor {
                ch.health = floor;
            }
        }
    }

    // === Mana filters ===

    /// Install a cost modifier; returns its handle.
    pub fn install_mana_filter(
        &mut self,
        player: PlayerId,
        amount: i32,
        minimum: i32,
        conditions: Vec<crate::tags::CardCondition>,
    ) -> u32 {
        let id = self.next_filter;
        self.next_filter += 1;
        self.player_mut(player).mana_filters.push(ManaFilter {
            id,
            amount,
            minimum,
            conditions,
        });
        id
    }

    /// Remove a cost modifier by handle, whichever player holds it.
    ///
    /// Handles are game-unique, so lookup does not need the target that
    /// installed the filter; the target may already have left play.
    pub fn remove_mana_filter(&mut self, id: u32) {
        for player in &mut self.players {
            if let Some(pos) = player.mana_filters.iter().position(|f| f.id == id) {
                player.mana_filters.remove(pos);
                return;
            }
        }
        tracing::warn!(filter = id, "unknown mana filter");
    }

    // === Entities entering and leaving play ===

    fn alloc_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }

    /// Put a minion from a card onto a player's board row.
    ///
    /// Returns `None` when the card is not a minion or the row is full.
    /// Battlecries fire, then auras and triggered effects bind, then the
    /// summon events go out.
    pub fn summon_minion(
        &mut self,
        player: PlayerId,
        card: &Card,
        index: usize,
    ) -> Option<EntityId> {
        let CardKind::Minion {
            attack,
            health,
            subtype,
        } = card.kind
        else {
            tracing::warn!(card = %card.name, "summon of a non-minion card");
            return None;
        };
        if self.player(player).board_full() {
            tracing::debug!(card = %card.name, %player, "board full; summon dropped");
            return None;
        }

        let id = self.alloc_entity();
        let mut ch = Character::minion(id, &card.name, player, attack, health);
        ch.subtype = subtype;
        ch.deathrattles = card.deathrattles.clone();
        self.characters.insert(id.0, ch);

        let row = &mut self.player_mut(player).board;
        let index = index.min(row.len());
        row.insert(index, id);

        self.enter_play(id, card, true);
        self.fire_event(
            GameEvent::new(EventKind::MinionSummoned)
                .with_source(id)
                .with_player(player)
                .with_card(&card.name),
        );
        self.fire_event(GameEvent::new(EventKind::BoardChanged).with_player(player));
        Some(id)
    }

    /// Equip a weapon from a card, destroying any currently equipped one.
    pub fn equip_weapon(&mut self, player: PlayerId, card: &Card) -> Option<EntityId> {
        let CardKind::Weapon { attack, durability } = card.kind else {
            tracing::warn!(card = %card.name, "equip of a non-weapon card");
            return None;
        };

        if let Some(old) = self.player(player).weapon {
            self.destroy_weapon_silent(player, old);
        }

        let id = self.alloc_entity();
        let mut ch = Character::weapon(id, &card.name, player, attack, durability);
        ch.deathrattles = card.deathrattles.clone();
        self.characters.insert(id.0, ch);
        self.player_mut(player).weapon = Some(id);

        self.enter_play(id, card, true);
        self.fire_event(GameEvent::new(EventKind::BoardChanged).with_player(player));
        Some(id)
    }

    /// Replace a minion in place; the replacement fires no battlecry and
    /// arrives undamaged.
    pub fn transform(&mut self, target: EntityId, card: &Card) -> Option<EntityId> {
        let CardKind::Minion {
            attack,
            health,
            subtype,
        } = card.kind
        else {
            tracing::warn!(card = %card.name, "transform into a non-minion card");
            return None;
        };
        let (player, index) = {
            let ch = self.character(target)?;
            if !ch.is_minion() || ch.removed {
                return None;
            }
            (ch.owner, self.board_index(target)?)
        };

        self.detach_all_for(target);
        self.characters.remove(&target.0);

        let id = self.alloc_entity();
        let mut ch = Character::minion(id, &card.name, player, attack, health);
        ch.subtype = subtype;
        ch.deathrattles = card.deathrattles.clone();
        self.characters.insert(id.0, ch);
        self.player_mut(player).board[index] = id;

        self.enter_play(id, card, false);
        self.fire_event(GameEvent::new(EventKind::BoardChanged).with_player(player));
        Some(id)
    }

    fn enter_play(&mut self, id: EntityId, card: &Card, battlecries: bool) {
        if battlecries {
            for battlecry in &card.battlecries {
                let targets = battlecry.selector().resolve(self, id);
                for target in targets {
                    battlecry.action().apply(self, id, target);
                }
            }
        }
        for aura in &card.auras {
            self.attach_aura(id, aura.clone());
        }
        for effect in &card.effects {
            self.grant_effect(id, effect.clone());
        }
    }

    /// Release every aura, effect and listener bound to an entity.
    fn detach_all_for(&mut self, owner: EntityId) {
        for id in self.auras.for_owner(owner) {
            self.detach_aura(id);
        }
        for id in self.effects.for_owner(owner) {
            self.unbind_effect(id);
        }
    }

    fn destroy_weapon_silent(&mut self, player: PlayerId, weapon: EntityId) {
        self.detach_all_for(weapon);
        if let Some(ch) = self.characters.remove(&weapon.0) {
            if let Some(card) = self.library.get(&ch.card_name).cloned() {
                self.player_mut(player).graveyard.push(card);
            }
        }
        self.player_mut(player).weapon = None;
    }

    // === Damage, healing, death ===

    /// Deal damage, honoring immunity, divine shield and hero armor.
    ///
    /// Fires `CharacterDamaged` before checking for lethal, so health
    /// floors installed by minimum-health grants see the drop first.
    pub fn deal_damage(&mut self, source: Option<EntityId>, target: EntityId, amount: i32) {
        if amount <= 0 {
            return;
        }
        let (dealt, owner) = {
            let Some(ch) = self.characters.get_mut(&target.0) else {
                return;
            };
            if ch.status.immune > 0 {
                return;
            }
            if ch.is_minion() && ch.status.divine_shield > 0 {
                // The shield absorbs the whole instance.
                ch.status.divine_shield -= 1;
                return;
            }
            let mut dealt = amount;
            if ch.armor > 0 {
                let absorbed = ch.armor.min(dealt);
                ch.armor -= absorbed;
                dealt -= absorbed;
            }
            ch.health -= dealt;
            (dealt, ch.owner)
        };
        if dealt == 0 {
            return;
        }

        let mut event = GameEvent::for_amount(EventKind::CharacterDamaged, target, dealt)
            .with_player(owner);
        if let Some(source) = source {
            event = event.with_source(source);
        }
        self.fire_event(event);

        let lethal = self
            .character(target)
            .is_some_and(|c| c.health <= 0 && !c.is_hero());
        if lethal {
            self.kill(target);
        }
    }

    /// Mark a minion whose maximum health dropped to zero or below.
    ///
    /// Outside an aura diff the minion dies immediately. Inside one the
    /// death is deferred until the diff completes, so the kill's events
    /// see a consistent tracked set.
    pub(crate) fn flag_lethal(&mut self, target: EntityId) {
        if self.refresh_depth == 0 {
            self.kill(target);
        } else if !self.pending_deaths.contains(&target) {
            self.pending_deaths.push(target);
        }
    }

    fn drain_pending_deaths(&mut self) {
        while let Some(target) = self.pending_deaths.pop() {
            self.kill(target);
        }
    }

    /// Heal up to the target's maximum health.
    pub fn heal(&mut self, source: EntityId, target: EntityId, amount: i32) {
        if amount <= 0 {
            return;
        }
        let (healed, owner) = {
            let Some(ch) = self.characters.get_mut(&target.0) else {
                return;
            };
            let before = ch.health;
            ch.health = (ch.health + amount).min(ch.max_health());
            (ch.health - before, ch.owner)
        };
        if healed == 0 {
            return;
        }
        self.fire_event(
            GameEvent::for_amount(EventKind::CharacterHealed, target, healed)
                .with_source(source)
                .with_player(owner),
        );
    }

    /// Destroy an entity.
    ///
    /// The character is taken off the board but kept in the arena while
    /// its deathrattles resolve, so their selectors see the board as it
    /// stood at the instant of death and summon placement can use the
    /// final position.
    pub fn kill(&mut self, target: EntityId) {
        let (owner, kind, name, rattles) = {
            let Some(ch) = self.characters.get_mut(&target.0) else {
                return;
            };
            if ch.removed || ch.is_hero() {
                return;
            }
            ch.removed = true;
            (
                ch.owner,
                ch.kind,
                ch.card_name.clone(),
                ch.deathrattles.clone(),
            )
        };

        match kind {
            CharacterKind::Minion => {
                if let Some(index) = self.player(owner).board_index(target) {
                    if let Some(ch) = self.characters.get_mut(&target.0) {
                        ch.last_index = index;
                    }
                    self.player_mut(owner).board.remove(index);
                }
            }
            CharacterKind::Weapon => {
                self.player_mut(owner).weapon = None;
            }
            CharacterKind::Hero => unreachable!(),
        }

        self.detach_all_for(target);

        for rattle in rattles {
            let targets = rattle.selector().resolve(self, target);
            for t in targets {
                rattle.action().apply(self, target, t);
            }
        }

        if let Some(card) = self.library.get(&name).cloned() {
            self.player_mut(owner).graveyard.push(card);
        }
        self.characters.remove(&target.0);

        if kind == CharacterKind::Minion {
            self.fire_event(
                GameEvent::new(EventKind::MinionDied)
                    .with_source(target)
                    .with_player(owner)
                    .with_card(name),
            );
        }
        self.fire_event(GameEvent::new(EventKind::BoardChanged).with_player(owner));
    }

    /// Strip an entity of its own auras, triggered effects and
    /// deathrattles. Buffs applied *to* it by others' auras stay tracked
    /// by those auras.
    pub fn silence(&mut self, target: EntityId) {
        self.detach_all_for(target);
        if let Some(ch) = self.character_mut(target) {
            ch.deathrattles.clear();
        }
        tracing::debug!(%target, "silenced");
    }

    /// Return a minion to its owner's hand; the card burns if the hand is
    /// full.
    pub fn bounce(&mut self, target: EntityId) {
        let (owner, name) = {
            let Some(ch) = self.character(target) else {
                return;
            };
            if !ch.is_minion() || ch.removed {
                return;
            }
            (ch.owner, ch.card_name.clone())
        };

        if let Some(index) = self.player(owner).board_index(target) {
            self.player_mut(owner).board.remove(index);
        }
        self.detach_all_for(target);
        self.characters.remove(&target.0);

        if let Some(card) = self.library.get(&name).cloned() {
            let p = self.player_mut(owner);
            if p.hand.len() < HAND_LIMIT {
                p.hand.push(card);
            } else {
                p.graveyard.push(card);
            }
        }
        self.fire_event(GameEvent::new(EventKind::BoardChanged).with_player(owner));
    }

    // === Cards and turns ===

    /// Draw the top card of the deck; burns it if the hand is full.
    pub fn draw_card(&mut self, player: PlayerId) {
        let Some(card) = self.player_mut(player).deck.pop() else {
            return;
        };
        let name = card.name.clone();
        let p = self.player_mut(player);
        if p.hand.len() < HAND_LIMIT {
            p.hand.push(card);
        } else {
            tracing::debug!(card = %name, %player, "hand full; card burned");
            p.graveyard.push(card);
        }
        self.fire_event(GameEvent::for_card(EventKind::CardDrawn, player, name));
    }

    /// Discard a uniformly random card from the hand.
    pub fn discard_random(&mut self, player: PlayerId) {
        let len = self.player(player).hand.len();
        let Some(index) = self.rng.pick_index(len) else {
            return;
        };
        let card = self.player_mut(player).hand.remove(index);
        self.player_mut(player).graveyard.push(card);
    }

    /// Add a card to the hand; burns it if the hand is full.
    pub fn add_to_hand(&mut self, player: PlayerId, card: Card) {
        let p = self.player_mut(player);
        if p.hand.len() < HAND_LIMIT {
            p.hand.push(card);
        } else {
            p.graveyard.push(card);
        }
    }

    /// Play a card from the hand by index.
    ///
    /// Pays the filtered cost, charges overload, fires `CardPlayed`
    /// before the card resolves, then resolves it. Returns false if the
    /// index is invalid or the player cannot pay.
    pub fn play_card(&mut self, player: PlayerId, hand_index: usize) -> bool {
        let Some(card) = self.player(player).hand.get(hand_index).cloned() else {
            return false;
        };
        let cost = self.player(player).effective_cost(&card);
        if self.player(player).mana < cost {
            return false;
        }
        if card.is_minion() && self.player(player).board_full() {
            return false;
        }

        let p = self.player_mut(player);
        p.hand.remove(hand_index);
        p.mana -= cost;
        p.overload_pending += card.overload;

        self.fire_event(GameEvent::for_card(EventKind::CardPlayed, player, &card.name));

        match &card.kind {
            CardKind::Minion { .. } => {
                let index = self.player(player).board.len();
                self.summon_minion(player, &card, index);
            }
            CardKind::Weapon { .. } => {
                self.equip_weapon(player, &card);
            }
            CardKind::Spell { action, selector } => {
                let hero = self.player(player).hero;
                let action = action.boosted(self.player(player).spell_damage);
                let targets = selector.resolve(self, hero);
                for target in targets {
                    action.apply(self, hero, target);
                }
                self.player_mut(player).graveyard.push(card);
            }
        }
        true
    }

    /// Start a player's turn: grow mana, lock overload, thaw, fire
    /// `TurnStarted`.
    pub fn begin_turn(&mut self, player: PlayerId) {
        self.current_player = player;
        let p = self.player_mut(player);
        p.max_mana = (p.max_mana + 1).min(MAX_MANA);
        p.overload_locked = p.overload_pending;
        p.overload_pending = 0;
        p.mana = p.max_mana - p.overload_locked;

        let mut thaw: Vec<EntityId> = vec![self.player(player).hero];
        thaw.extend(self.player(player).board.iter().copied());
        for id in thaw {
            if let Some(ch) = self.character_mut(id) {
                ch.status.frozen = 0;
            }
        }

        self.fire_event(GameEvent::for_player(EventKind::TurnStarted, player));
    }

    /// End a player's turn, firing `TurnEnded`.
    pub fn end_turn(&mut self, player: PlayerId) {
        self.fire_event(GameEvent::for_player(EventKind::TurnEnded, player));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::{Action, Amount, Selector};

    fn p0() -> PlayerId {
        PlayerId::new(0)
    }

    fn summon(game: &mut Game, card: &Card) -> EntityId {
        let index = game.player(p0()).board.len();
        game.summon_minion(p0(), card, index).unwrap()
    }

    #[test]
    fn test_summon_and_board_order() {
        let mut game = Game::new(1);
        let a = summon(&mut game, &Card::minion("A", 1, 1, 1));
        let b = summon(&mut game, &Card::minion("B", 1, 1, 1));
        let c = game
            .summon_minion(p0(), &Card::minion("C", 1, 1, 1), 1)
            .unwrap();

        assert_eq!(game.player(p0()).board.to_vec(), vec![a, c, b]);
        assert_eq!(game.board_index(c), Some(1));
    }

    #[test]
    fn test_board_cap() {
        let mut game = Game::new(1);
        for _ in 0..7 {
            summon(&mut game, &Card::minion("W", 0, 1, 1));
        }
        assert!(game
            .summon_minion(p0(), &Card::minion("W", 0, 1, 1), 0)
            .is_none());
        assert_eq!(game.player(p0()).board.len(), 7);
    }

    #[test]
    fn test_damage_divine_shield_and_armor() {
        let mut game = Game::new(1);
        let m = summon(&mut game, &Card::minion("Shielded", 1, 1, 3));
        game.character_mut(m).unwrap().status.divine_shield = 1;

        // The shield absorbs the whole instance.
        game.deal_damage(None, m, 5);
        let ch = game.character(m).unwrap();
        assert_eq!(ch.health, 3);
        assert_eq!(ch.status.divine_shield, 0);

        game.deal_damage(None, m, 2);
        assert_eq!(game.character(m).unwrap().health, 1);

        // Hero armor absorbs before health.
        let hero = game.player(p0()).hero;
        game.character_mut(hero).unwrap().armor = 3;
        game.deal_damage(None, hero, 5);
        let h = game.character(hero).unwrap();
        assert_eq!(h.armor, 0);
        assert_eq!(h.health, 28);
    }

    #[test]
    fn test_lethal_damage_kills() {
        let mut game = Game::new(1);
        let m = summon(&mut game, &Card::minion("Frail", 1, 1, 2));
        game.deal_damage(None, m, 2);
        assert!(game.character(m).is_none());
        assert!(game.player(p0()).board.is_empty());
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut game = Game::new(1);
        let m = summon(&mut game, &Card::minion("Tank", 1, 1, 5));
        game.deal_damage(None, m, 3);
        let hero = game.player(p0()).hero;
        game.heal(hero, m, 10);
        assert_eq!(game.character(m).unwrap().health, 5);
    }

    #[test]
    fn test_aura_attach_detach_neutrality() {
        let mut game = Game::new(1);
        let a = summon(&mut game, &Card::minion("A", 1, 2, 2));
        let b = summon(&mut game, &Card::minion("B", 1, 3, 3));

        let aura = Aura::new(
            Action::ChangeAttack {
                amount: Amount::fixed(2),
            },
            Selector::friendly_minions(),
        );
        let id = game.attach_aura(a, aura);
        assert_eq!(game.character(a).unwrap().attack(), 4);
        assert_eq!(game.character(b).unwrap().attack(), 5);

        game.detach_aura(id);
        assert_eq!(game.character(a).unwrap().attack(), 2);
        assert_eq!(game.character(b).unwrap().attack(), 3);
    }

    #[test]
    fn test_aura_tracks_newcomers_and_leavers() {
        let mut game = Game::new(1);
        let holder = summon(&mut game, &Card::minion("Holder", 1, 1, 4));
        let aura = Aura::new(
            Action::ChangeAttack {
                amount: Amount::fixed(1),
            },
            Selector::friendly_minions(),
        );
        game.attach_aura(holder, aura);

        // A newcomer gets the buff on the summon event.
        let late = summon(&mut game, &Card::minion("Late", 1, 2, 2));
        assert_eq!(game.character(late).unwrap().attack(), 3);

        // A leaver loses it; the tracked set follows the board.
        game.kill(late);
        assert_eq!(game.character(holder).unwrap().attack(), 2);
    }

    #[test]
    fn test_aura_dies_with_owner() {
        let mut game = Game::new(1);
        let holder = summon(&mut game, &Card::minion("Holder", 1, 1, 1));
        let other = summon(&mut game, &Card::minion("Other", 1, 2, 2));
        let aura = Aura::new(
            Action::ChangeAttack {
                amount: Amount::fixed(5),
            },
            Selector::friendly_minions(),
        );
        game.attach_aura(holder, aura);
        assert_eq!(game.character(other).unwrap().attack(), 7);

        game.kill(holder);
        assert_eq!(game.character(other).unwrap().attack(), 2);
        assert!(game.auras.is_empty());
    }

    #[test]
    fn test_aura_until_expires_on_event() {
        let mut game = Game::new(1);
        let m = summon(&mut game, &Card::minion("Buffed", 1, 2, 2));
        let aura = Aura::until(
            Action::ChangeAttack {
                amount: Amount::fixed(3),
            },
            Selector::SelfOnly,
            EventFilter::on(EventKind::TurnEnded),
        );
        game.attach_aura(m, aura);
        assert_eq!(game.character(m).unwrap().attack(), 5);

        game.end_turn(p0());
        assert_eq!(game.character(m).unwrap().attack(), 2);
        assert!(game.auras.is_empty());
    }

    #[test]
    fn test_deathrattle_sees_board_at_death() {
        let mut game = Game::new(1);
        let left = summon(&mut game, &Card::minion("Left", 1, 1, 9));
        let card = Card::minion("Rattler", 1, 1, 1).with_deathrattle(
            Action::Damage { amount: 2 },
            Selector::Adjacent { condition: None },
        );
        let mid = summon(&mut game, &card);
        let right = summon(&mut game, &Card::minion("Right", 1, 1, 9));

        game.kill(mid);
        // Old neighbors took the hit even though the rattler left the row.
        assert_eq!(game.character(left).unwrap().health, 7);
        assert_eq!(game.character(right).unwrap().health, 7);
    }

    #[test]
    fn test_deathrattle_summon_fills_old_slot() {
        let mut game = Game::new(1);
        game.library.register(Card::minion("Ghost", 1, 1, 1));
        let a = summon(&mut game, &Card::minion("A", 1, 1, 1));
        let card = Card::minion("Host", 1, 1, 1).with_deathrattle(
            Action::Summon {
                card: crate::tags::CardQuery::named("Ghost"),
                count: 1,
            },
            Selector::friendly_hero(),
        );
        let host = summon(&mut game, &card);
        let b = summon(&mut game, &Card::minion("B", 1, 1, 1));

        game.kill(host);
        let names: Vec<_> = game
            .player(p0())
            .board
            .iter()
            .map(|&id| game.character(id).unwrap().card_name.clone())
            .collect();
        assert_eq!(names, vec!["A", "Ghost", "B"]);
        let _ = (a, b);
    }

    #[test]
    fn test_triggered_effect_fires_on_matching_event() {
        let mut game = Game::new(1);
        let card = Card::minion("Pinger", 2, 1, 4).with_effect(Effect::triggered(
            EventFilter::on(EventKind::TurnEnded).friendly(),
            Action::Damage { amount: 1 },
            Selector::enemy_hero(),
        ));
        summon(&mut game, &card);
        let enemy_hero = game.player(p0().opponent()).hero;

        game.end_turn(p0());
        assert_eq!(game.character(enemy_hero).unwrap().health, 29);

        // The opponent's turn end does not match the friendly filter.
        game.end_turn(p0().opponent());
        assert_eq!(game.character(enemy_hero).unwrap().health, 29);
    }

    #[test]
    fn test_silence_strips_own_tags_only() {
        let mut game = Game::new(1);
        let buffer = summon(&mut game, &Card::minion("Buffer", 1, 1, 4));
        let card = Card::minion("Loud", 1, 2, 2)
            .with_deathrattle(Action::Draw { count: 1 }, Selector::friendly_hero())
            .with_aura(Aura::new(
                Action::ChangeAttack {
                    amount: Amount::fixed(1),
                },
                Selector::friendly_minions(),
            ));
        let loud = summon(&mut game, &card);
        assert_eq!(game.character(buffer).unwrap().attack(), 2);

        // An outside buff applied to the minion.
        let outside = Aura::new(
            Action::ChangeAttack {
                amount: Amount::fixed(3),
            },
            Selector::friendly_minions(),
        );
        game.attach_aura(buffer, outside);

        game.silence(loud);
        let ch = game.character(loud).unwrap();
        assert!(ch.deathrattles.is_empty());
        // Own aura gone, outside buff kept.
        assert_eq!(game.character(buffer).unwrap().attack(), 4);
        assert_eq!(ch.attack(), 5);
    }

    #[test]
    fn test_bounce_returns_card_to_hand() {
        let mut game = Game::new(1);
        game.library.register(Card::minion("Yoyo", 2, 2, 3));
        let m = summon(&mut game, &Card::minion("Yoyo", 2, 2, 3));

        game.bounce(m);
        assert!(game.character(m).is_none());
        assert!(game.player(p0()).board.is_empty());
        assert_eq!(game.player(p0()).hand.len(), 1);
        assert_eq!(game.player(p0()).hand[0].name, "Yoyo");
    }

    #[test]
    fn test_transform_keeps_slot_and_skips_battlecry() {
        let mut game = Game::new(1);
        let a = summon(&mut game, &Card::minion("A", 1, 1, 1));
        let old = summon(&mut game, &Card::minion("Old", 1, 5, 5));
        let b = summon(&mut game, &Card::minion("B", 1, 1, 1));

        let sheep = Card::minion("Sheep", 1, 1, 1).with_battlecry(
            Action::Damage { amount: 5 },
            Selector::friendly_hero(),
        );
        let new = game.transform(old, &sheep).unwrap();

        assert!(game.character(old).is_none());
        assert_eq!(game.board_index(new), Some(1));
        // No battlecry on transform.
        let hero = game.player(p0()).hero;
        assert_eq!(game.character(hero).unwrap().health, 30);
        let _ = (a, b);
    }

    #[test]
    fn test_play_card_pays_cost_and_fires_before_resolution() {
        let mut game = Game::new(1);
        let p = p0();
        game.player_mut(p).max_mana = 4;
        game.player_mut(p).mana = 4;
        game.player_mut(p).hand.push(Card::minion("Yeti", 4, 4, 5));

        assert!(game.play_card(p, 0));
        assert_eq!(game.player(p).mana, 0);
        assert_eq!(game.player(p).board.len(), 1);

        game.player_mut(p).hand.push(Card::minion("Yeti", 4, 4, 5));
        assert!(!game.play_card(p, 0));
    }

    #[test]
    fn test_play_spell_resolves_and_goes_to_graveyard() {
        let mut game = Game::new(1);
        let m = summon(&mut game, &Card::minion("Victim", 1, 1, 5));
        let p = p0();
        game.player_mut(p).max_mana = 2;
        game.player_mut(p).mana = 2;
        game.player_mut(p).hand.push(Card::spell(
            "Bolt",
            2,
            Action::Damage { amount: 3 },
            Selector::friendly_minions(),
        ));

        assert!(game.play_card(p, 0));
        assert_eq!(game.character(m).unwrap().health, 2);
        assert_eq!(game.player(p).graveyard.len(), 1);
    }

    #[test]
    fn test_spell_damage_boosts_damage_spells() {
        let mut game = Game::new(1);
        let victim = summon(&mut game, &Card::minion("Victim", 1, 1, 9));
        let wand = summon(&mut game, &Card::minion("Wand", 1, 1, 9));
        let hero = game.player(p0()).hero;

        let boost = Action::SpellDamage { amount: 1 };
        let record = boost.apply(&mut game, hero, wand);

        let p = p0();
        game.player_mut(p).max_mana = 4;
        game.player_mut(p).mana = 4;
        let bolt = Card::spell(
            "Bolt",
            2,
            Action::Damage { amount: 3 },
            Selector::friendly_minions(),
        );
        game.player_mut(p).hand.push(bolt.clone());

        // 3 base + 1 spell damage.
        assert!(game.play_card(p, 0));
        assert_eq!(game.character(victim).unwrap().health, 5);

        // Reverting the grant restores the unboosted amount.
        boost.revert(&mut game, hero, wand, &record);
        game.player_mut(p).hand.push(bolt);
        assert!(game.play_card(p, 0));
        assert_eq!(game.character(victim).unwrap().health, 2);
    }

    #[test]
    fn test_health_reduction_to_zero_kills() {
        let mut game = Game::new(1);
        let m = summon(&mut game, &Card::minion("Frail", 1, 1, 2));
        let hero = game.player(p0()).hero;

        Action::ChangeHealth {
            amount: Amount::fixed(-2),
        }
        .apply(&mut game, hero, m);

        assert!(game.character(m).is_none());
        assert!(game.player(p0()).board.is_empty());
    }

    #[test]
    fn test_health_reduction_aura_kills_small_minions() {
        let mut game = Game::new(1);
        let tough = summon(&mut game, &Card::minion("Tough", 1, 2, 5));
        let frail = summon(&mut game, &Card::minion("Frail", 1, 1, 2));
        let holder = summon(&mut game, &Card::minion("Holder", 1, 1, 5));

        game.attach_aura(
            holder,
            Aura::new(
                Action::ChangeHealth {
                    amount: Amount::fixed(-2),
                },
                Selector::friendly_minions(),
            ),
        );

        // The reduction is lethal for the small minion only.
        assert!(game.character(frail).is_none());
        assert_eq!(game.character(tough).unwrap().max_health(), 3);
        assert_eq!(game.character(holder).unwrap().max_health(), 3);

        // Survivors heal back to base when the holder leaves.
        game.kill(holder);
        assert_eq!(game.character(tough).unwrap().health, 5);
    }

    #[test]
    fn test_overload_locks_next_turn_mana() {
        let mut game = Game::new(1);
        let p = p0();
        game.player_mut(p).max_mana = 3;
        game.player_mut(p).mana = 3;
        game.player_mut(p)
            .hand
            .push(Card::minion("Devil", 1, 3, 1).with_overload(2));

        assert!(game.play_card(p, 0));
        assert_eq!(game.player(p).overload_pending, 2);
        assert!(game.player(p).has_overload());

        game.begin_turn(p);
        assert_eq!(game.player(p).max_mana, 4);
        assert_eq!(game.player(p).overload_locked, 2);
        assert_eq!(game.player(p).mana, 2);

        game.begin_turn(p);
        assert_eq!(game.player(p).overload_locked, 0);
        assert_eq!(game.player(p).mana, 5);
    }

    #[test]
    fn test_begin_turn_thaws() {
        let mut game = Game::new(1);
        let m = summon(&mut game, &Card::minion("Cold", 1, 1, 1));
        game.character_mut(m).unwrap().status.frozen = 1;

        game.begin_turn(p0());
        assert_eq!(game.character(m).unwrap().status.frozen, 0);
    }

    #[test]
    fn test_draw_and_burn() {
        let mut game = Game::new(1);
        let p = p0();
        for i in 0..12 {
            game.player_mut(p).deck.push(Card::minion(format!("C{i}"), 1, 1, 1));
        }
        for _ in 0..12 {
            game.draw_card(p);
        }
        assert_eq!(game.player(p).hand.len(), 10);
        assert_eq!(game.player(p).graveyard.len(), 2);
        // Drawing from an empty deck is a no-op.
        game.draw_card(p);
        assert_eq!(game.player(p).hand.len(), 10);
    }

    #[test]
    fn test_equip_replaces_weapon() {
        let mut game = Game::new(1);
        let p = p0();
        let first = game.equip_weapon(p, &Card::weapon("Axe", 2, 3, 2)).unwrap();
        let second = game
            .equip_weapon(p, &Card::weapon("Hammer", 3, 2, 4))
            .unwrap();

        assert!(game.character(first).is_none());
        assert_eq!(game.player(p).weapon, Some(second));
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut game = Game::new(7);
        let holder = summon(&mut game, &Card::minion("Holder", 1, 1, 4));
        game.attach_aura(
            holder,
            Aura::new(
                Action::ChangeAttack {
                    amount: Amount::fixed(2),
                },
                Selector::friendly_minions(),
            ),
        );

        let json = serde_json::to_string(&game).unwrap();
        let back: Game = serde_json::from_str(&json).unwrap();

        assert_eq!(back.character(holder).unwrap().attack(), 3);
        assert_eq!(back.auras.len(), 1);
        assert_eq!(back.dispatcher.len(), game.dispatcher.len());
    }
}

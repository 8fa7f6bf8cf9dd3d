//! Scenario tests for aura tracking across board changes.

use emberstone::{
    Action, Amount, Aura, Card, Condition, Effect, EventFilter, EventKind, Game, PlayerId,
    Selector,
};

fn p0() -> PlayerId {
    PlayerId::new(0)
}

fn summon(game: &mut Game, card: &Card) -> emberstone::EntityId {
    let index = game.player(p0()).board.len();
    game.summon_minion(p0(), card, index).unwrap()
}

fn attack_of(game: &Game, id: emberstone::EntityId) -> i32 {
    game.character(id).unwrap().attack()
}

#[test]
fn test_adjacency_aura_follows_the_board() {
    let mut game = Game::new(1);
    let a = summon(&mut game, &Card::minion("A", 1, 1, 5));
    let holder_card = Card::minion("Holder", 2, 2, 5).with_aura(Aura::new(
        Action::ChangeAttack {
            amount: Amount::fixed(1),
        },
        Selector::Adjacent { condition: None },
    ));
    let holder = summon(&mut game, &holder_card);
    let b = summon(&mut game, &Card::minion("B", 1, 1, 5));
    let c = summon(&mut game, &Card::minion("C", 1, 1, 5));

    // [A, Holder, B, C]: only the direct neighbors are buffed.
    assert_eq!(attack_of(&game, a), 2);
    assert_eq!(attack_of(&game, b), 2);
    assert_eq!(attack_of(&game, c), 1);

    // B dies: C slides next to the holder and inherits the buff.
    game.kill(b);
    assert_eq!(attack_of(&game, a), 2);
    assert_eq!(attack_of(&game, c), 2);

    // The holder dies: everything reverts to base.
    game.kill(holder);
    assert_eq!(attack_of(&game, a), 1);
    assert_eq!(attack_of(&game, c), 1);
    assert!(game.auras.is_empty());
}

#[test]
fn test_adjacency_aura_at_the_edge_buffs_one_neighbor() {
    let mut game = Game::new(1);
    let holder_card = Card::minion("Holder", 2, 2, 5).with_aura(Aura::new(
        Action::ChangeAttack {
            amount: Amount::fixed(2),
        },
        Selector::Adjacent { condition: None },
    ));
    let holder = summon(&mut game, &holder_card);
    let a = summon(&mut game, &Card::minion("A", 1, 1, 5));
    let b = summon(&mut game, &Card::minion("B", 1, 1, 5));

    // [Holder, A, B]: only A sits next to the holder.
    assert_eq!(attack_of(&game, a), 3);
    assert_eq!(attack_of(&game, b), 1);
    assert_eq!(attack_of(&game, holder), 2);
}

#[test]
fn test_overload_gated_effect_fires_once_per_qualifying_play() {
    let mut game = Game::new(1);
    let card = Card::minion("Watcher", 2, 1, 6).with_effect(Effect::triggered(
        EventFilter::on(EventKind::CardPlayed)
            .friendly()
            .when(Condition::OwnerHasOverload),
        Action::ChangeAttack {
            amount: Amount::fixed(1),
        },
        Selector::SelfOnly,
    ));
    let watcher = summon(&mut game, &card);

    let p = p0();
    game.player_mut(p).max_mana = 10;
    game.player_mut(p).mana = 10;
    game.player_mut(p).overload_pending = 1;
    game.player_mut(p).hand.push(Card::minion("Wisp", 0, 1, 1));
    game.player_mut(p).hand.push(Card::minion("Wisp", 0, 1, 1));

    // Two qualifying plays in one turn apply the action twice.
    assert!(game.play_card(p, 0));
    assert!(game.play_card(p, 0));
    assert_eq!(attack_of(&game, watcher), 3);

    // Without overload the filter rejects.
    game.player_mut(p).overload_pending = 0;
    game.player_mut(p).hand.push(Card::minion("Wisp", 0, 1, 1));
    assert!(game.play_card(p, 0));
    assert_eq!(attack_of(&game, watcher), 3);
}

#[test]
fn test_refresh_never_double_applies() {
    let mut game = Game::new(1);
    let holder = summon(&mut game, &Card::minion("Holder", 1, 1, 5));
    let other = summon(&mut game, &Card::minion("Other", 1, 2, 5));
    game.attach_aura(
        holder,
        Aura::new(
            Action::ChangeAttack {
                amount: Amount::fixed(2),
            },
            Selector::friendly_minions(),
        ),
    );
    assert_eq!(attack_of(&game, other), 4);

    // Many refresh-triggering events; a stable match keeps its record.
    for _ in 0..5 {
        game.end_turn(p0());
        game.begin_turn(p0());
    }
    assert_eq!(attack_of(&game, other), 4);
}

#[test]
fn test_independent_auras_stack_and_detach_separately() {
    let mut game = Game::new(1);
    let m = summon(&mut game, &Card::minion("Target", 1, 1, 5));
    let buff = |n| {
        Aura::new(
            Action::ChangeAttack {
                amount: Amount::fixed(n),
            },
            Selector::friendly_minions(),
        )
    };
    let first = game.attach_aura(m, buff(1));
    let second = game.attach_aura(m, buff(2));
    assert_eq!(attack_of(&game, m), 4);

    game.detach_aura(first);
    assert_eq!(attack_of(&game, m), 3);
    game.detach_aura(second);
    assert_eq!(attack_of(&game, m), 1);
}

#[test]
fn test_conditional_aura_tracks_the_condition() {
    let mut game = Game::new(1);
    let holder = summon(&mut game, &Card::minion("Holder", 1, 1, 10));
    let frail = summon(&mut game, &Card::minion("Frail", 1, 1, 10));
    game.attach_aura(
        holder,
        Aura::new(
            Action::ChangeAttack {
                amount: Amount::fixed(3),
            },
            Selector::Minions {
                side: emberstone::Side::Friendly,
                condition: Some(Condition::IsDamaged),
                picker: None,
            },
        ),
    );
    // Nothing is damaged yet.
    assert_eq!(attack_of(&game, frail), 1);

    // Damage pulls the minion into the match-set.
    game.deal_damage(None, frail, 2);
    assert_eq!(attack_of(&game, frail), 4);

    // Healing back to full drops it out again.
    game.heal(holder, frail, 2);
    assert_eq!(attack_of(&game, frail), 1);
}

#[test]
fn test_taunt_grants_stack_across_auras() {
    let mut game = Game::new(1);
    let m = summon(&mut game, &Card::minion("Wall", 1, 1, 5));
    let taunt_aura = || Aura::new(Action::Taunt, Selector::friendly_minions());

    let first = game.attach_aura(m, taunt_aura());
    let _second = game.attach_aura(m, taunt_aura());
    assert_eq!(game.character(m).unwrap().status.taunt, 2);

    // Removing one grant leaves the other intact.
    game.detach_aura(first);
    assert_eq!(game.character(m).unwrap().status.taunt, 1);
}

#[test]
fn test_until_aura_is_a_one_turn_buff() {
    let mut game = Game::new(1);
    let m = summon(&mut game, &Card::minion("Berserk", 1, 2, 2));
    game.attach_aura(
        m,
        Aura::until(
            Action::ChangeAttack {
                amount: Amount::fixed(4),
            },
            Selector::SelfOnly,
            EventFilter::on(EventKind::TurnEnded),
        ),
    );
    assert_eq!(attack_of(&game, m), 6);

    game.end_turn(p0());
    assert_eq!(attack_of(&game, m), 2);
    assert!(game.auras.is_empty());
}

#[test]
fn test_overload_condition_gates_a_trigger() {
    let mut game = Game::new(1);
    let card = Card::minion("Spirit", 2, 2, 4).with_effect(Effect::triggered(
        EventFilter::on(EventKind::TurnStarted)
            .friendly()
            .when(Condition::OwnerHasOverload),
        Action::Damage { amount: 2 },
        Selector::enemy_hero(),
    ));
    summon(&mut game, &card);
    let enemy_hero = game.player(p0().opponent()).hero;

    // No overload: the trigger filter rejects.
    game.begin_turn(p0());
    assert_eq!(game.character(enemy_hero).unwrap().health, 30);

    // Charge overload, then start the next turn with crystals locked.
    game.player_mut(p0()).overload_pending = 2;
    game.begin_turn(p0());
    assert_eq!(game.character(enemy_hero).unwrap().health, 28);

    // Overload clears the turn after; the trigger goes quiet again.
    game.begin_turn(p0());
    assert_eq!(game.character(enemy_hero).unwrap().health, 28);
}

#[test]
fn test_cost_discount_aura_releases_dead_members() {
    let mut game = Game::new(1);
    let holder = summon(&mut game, &Card::minion("Anchor", 1, 1, 5));
    let mate = summon(&mut game, &Card::minion("Mate", 1, 1, 2));
    game.attach_aura(
        holder,
        Aura::new(
            Action::ManaChange {
                amount: 2,
                minimum: 0,
                conditions: vec![],
            },
            Selector::friendly_minions(),
        ),
    );

    // One filter per matched minion.
    let yeti = Card::minion("Yeti", 4, 4, 5);
    assert_eq!(game.player(p0()).effective_cost(&yeti), 0);

    // A member's death takes its filter with it, even though the member
    // is gone from the arena by the time the aura re-diffs.
    game.kill(mate);
    assert_eq!(game.player(p0()).effective_cost(&yeti), 2);

    game.kill(holder);
    assert_eq!(game.player(p0()).effective_cost(&yeti), 4);
}

#[test]
fn test_give_action_grants_and_revokes_auras() {
    let mut game = Game::new(1);
    let m = summon(&mut game, &Card::minion("Blessed", 1, 1, 5));
    let hero = game.player(p0()).hero;

    // A spell-style grant: give the minion a buff aura of its own.
    let give = Action::Give {
        auras: vec![Aura::new(
            Action::ChangeAttack {
                amount: Amount::fixed(2),
            },
            Selector::SelfOnly,
        )],
    };
    let record = give.apply(&mut game, hero, m);
    assert_eq!(attack_of(&game, m), 3);

    give.revert(&mut game, hero, m, &record);
    assert_eq!(attack_of(&game, m), 1);
    assert!(game.auras.is_empty());
}

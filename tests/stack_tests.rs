//! Stack and priority integration tests.
//!
//! Spells, activated abilities and triggered abilities going onto the stack,
//! responses, last-in-first-out resolution, counters and fizzles.

mod common;

use ccg_session::core::{ActionKind, Seat, StackItemId, Step};
use ccg_session::error::ErrorCode;
use ccg_session::session::ActionResult;
use ccg_session::triggers::GameEvent;
use ccg_session::zones::Zone;
use ccg_session::{InstanceId, Target};
use common::*;
use smallvec::smallvec;

fn cast(table: &mut Table, seat: Seat, card: InstanceId, target: Target) -> ActionResult {
    table
        .act(
            seat,
            ActionKind::PlayCard {
                card,
                targets: smallvec![target],
            },
        )
        .unwrap()
}

fn pushed(result: &ActionResult) -> StackItemId {
    result
        .events
        .iter()
        .find_map(|event| match event {
            GameEvent::StackItemPushed { item, .. } => Some(*item),
            _ => None,
        })
        .expect("nothing was pushed")
}

// =============================================================================
// Resolution order
// =============================================================================

/// Items resolve last in, first out, one per pair of passes.
#[test]
fn test_lifo_resolution() {
    let mut table = Table::new(vec![BOLT; 20], vec![GRUNT; 20]);
    table.set_mana(Seat::First, 2);
    let hand = table.zone(Seat::First, Zone::Hand);

    let at_opponent = pushed(&cast(&mut table, Seat::First, hand[0], Target::Player(Seat::Second)));
    assert_eq!(table.session.priority_seat(), Seat::First);
    let at_self = pushed(&cast(&mut table, Seat::First, hand[1], Target::Player(Seat::First)));
    assert_eq!(table.session.stack.len(), 2);

    table.pass();
    let result = table.pass();
    assert!(result.events.contains(&GameEvent::StackItemResolved { item: at_self }));
    assert_eq!(table.health(Seat::First), 17);
    assert_eq!(table.health(Seat::Second), 20);
    // The active seat gets priority back after each resolution.
    assert_eq!(table.session.priority_seat(), Seat::First);

    table.pass();
    let result = table.pass();
    assert!(result.events.contains(&GameEvent::StackItemResolved { item: at_opponent }));
    assert_eq!(table.health(Seat::Second), 17);
    assert!(table.session.stack.is_empty());
    assert_eq!(table.session.step, Step::Main1);
}

/// A spell goes to the graveyard as it is cast.
#[test]
fn test_spell_card_leaves_hand_on_cast() {
    let mut table = Table::new(vec![BOLT; 20], vec![GRUNT; 20]);
    let bolt = table.in_hand(Seat::First, BOLT);
    cast(&mut table, Seat::First, bolt, Target::Player(Seat::Second));

    assert!(table.zone(Seat::First, Zone::Graveyard).contains(&bolt));
    assert_eq!(table.session.stack.top().map(|item| item.source), Some(bolt));
}

/// Permanents wait for an empty stack.
#[test]
fn test_permanent_needs_empty_stack() {
    let mut table = Table::new(standard_deck(), vec![GRUNT; 20]);
    table.set_mana(Seat::First, 3);
    let bolt = table.in_hand(Seat::First, BOLT);
    cast(&mut table, Seat::First, bolt, Target::Player(Seat::Second));

    let grunt = table.in_hand(Seat::First, GRUNT);
    let err = table
        .act(
            Seat::First,
            ActionKind::PlayCard {
                card: grunt,
                targets: smallvec![],
            },
        )
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidAction);
}

// =============================================================================
// Responses
// =============================================================================

/// The opponent responds with a counter; the countered spell never resolves.
#[test]
fn test_counter_spell() {
    let mut table = Table::new(vec![BOLT; 20], vec![NEGATE; 20]);
    table.set_mana(Seat::Second, 1);
    let bolt = table.in_hand(Seat::First, BOLT);
    let bolt_item = pushed(&cast(&mut table, Seat::First, bolt, Target::Player(Seat::Second)));

    table.pass();
    assert_eq!(table.session.priority_seat(), Seat::Second);
    let negate = table.in_hand(Seat::Second, NEGATE);
    let negate_item = pushed(&cast(&mut table, Seat::Second, negate, Target::StackItem(bolt_item)));
    assert_eq!(table.session.priority_seat(), Seat::Second);

    table.pass();
    let result = table.pass();
    assert!(result.events.contains(&GameEvent::StackItemCountered {
        item: bolt_item,
        by: negate_item
    }));
    assert!(table.session.stack.is_empty());
    assert_eq!(table.health(Seat::Second), 20);
    assert_eq!(table.session.players[Seat::Second].resources.mana, 0);
}

/// An effect whose target left the board fizzles; the item still resolves.
#[test]
fn test_fizzle_when_target_gone() {
    let mut table = Table::new(vec![BOLT; 20], vec![GRUNT; 20]);
    table.set_mana(Seat::First, 2);
    let grunt = table.summon(Seat::Second, GRUNT);
    let hand = table.zone(Seat::First, Zone::Hand);

    let first = pushed(&cast(&mut table, Seat::First, hand[0], Target::Card(grunt)));
    cast(&mut table, Seat::First, hand[1], Target::Card(grunt));

    table.pass();
    let result = table.pass();
    assert!(result.events.iter().any(|e| matches!(e, GameEvent::CreatureDied { card, .. } if *card == grunt)));
    assert!(table.zone(Seat::Second, Zone::Graveyard).contains(&grunt));

    table.pass();
    let result = table.pass();
    assert!(result
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::EffectFizzled { item, .. } if *item == first)));
    assert!(result.events.contains(&GameEvent::StackItemResolved { item: first }));
    assert_eq!(table.health(Seat::Second), 20);
}

// =============================================================================
// Abilities
// =============================================================================

/// A tap ability pays, taps and uses the stack like a spell.
#[test]
fn test_activated_ability() {
    let mut table = Table::new(vec![SHAMAN; 20], vec![GRUNT; 20]);
    let shaman = table.summon(Seat::First, SHAMAN);
    let ping = ActionKind::ActivateAbility {
        source: shaman,
        ability: 0,
        targets: smallvec![Target::Player(Seat::Second)],
    };

    table.act(Seat::First, ping.clone()).unwrap();
    assert!(table.session.cards.get(shaman).unwrap().tapped);
    assert_eq!(table.session.players[Seat::First].resources.mana, 1);

    let err = table.act(Seat::First, ping).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidAction);

    table.pass();
    table.pass();
    assert_eq!(table.health(Seat::Second), 19);
}

/// A dies trigger is put on the stack by a follow-up and then resolves.
#[test]
fn test_dies_trigger() {
    let mut table = Table::new(vec![BOLT; 20], vec![MYSTIC; 20]);
    let mystic = table.summon(Seat::Second, MYSTIC);
    let hand_before = table.zone(Seat::Second, Zone::Hand).len();
    let bolt = table.in_hand(Seat::First, BOLT);
    cast(&mut table, Seat::First, bolt, Target::Card(mystic));

    table.pass();
    let result = table.pass();
    assert_eq!(result.follow_ups.len(), 1);
    let follow_up = &result.follow_ups[0];
    assert!(follow_up.action.is_system());
    assert_eq!(follow_up.action.player, table.b);
    assert_eq!(
        follow_up.action.kind,
        ActionKind::PutTrigger {
            source: mystic,
            trigger: 0
        }
    );
    assert_eq!(table.session.stack.len(), 1);
    assert_eq!(table.session.priority_seat(), Seat::Second);

    table.pass();
    table.pass();
    assert!(table.session.stack.is_empty());
    assert_eq!(table.zone(Seat::Second, Zone::Hand).len(), hand_before + 1);
}

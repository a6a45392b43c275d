//! Turn and step state machine.
//!
//! Steps advance only along the edges of `Step::next`. Untap, upkeep, draw
//! and cleanup are automatic: the engine performs their turn-based actions
//! and moves on. Every other step opens a priority window starting with
//! the active seat (the defending seat in `combat_block`), and the step
//! ends when both seats pass in succession with an empty stack.
//!
//! The turn number grows by one every time the active seat changes.
//!
//! ## Ending the turn early
//!
//! `EndTurn` sets `Session::ending_turn`; the remaining steps are still
//! entered one edge at a time but none opens a priority window. Cleanup
//! clears the flag.

use chrono::{DateTime, Utc};

use crate::combat::{damage, CombatPhase, CombatState};
use crate::core::{Action, ActionKind, InstanceId, Seat, SeatMap, Session, SessionStatus, Step};
use crate::effects::{modifier, EffectResolver, ModifierKind};
use crate::error::{GameError, Result};
use crate::stack::PassOutcome;
use crate::triggers::GameEvent;
use crate::zones::{Zone, ZonePosition};

use super::mulligan::OpeningHands;

/// What entering a step leads to.
enum Flow {
    /// A priority window opens for this seat.
    Priority(Seat),
    /// Automatic step: keep going.
    Continue,
    /// Stop and wait (follow-ups queued, or the game is over).
    Halt,
}

/// Move the session to `to`, rejecting anything but the next step.
pub fn transition(session: &mut Session, to: Step) -> Result<GameEvent> {
    let from = session.step;
    if !from.can_advance_to(to) {
        return Err(GameError::invalid_state(format!("illegal step transition {from} -> {to}")));
    }
    session.step = to;
    Ok(GameEvent::StepChanged { from, to })
}

/// Deal opening hands and run turn 1 up to its first priority window, or
/// open the mulligan window first when the rules ask for one.
pub fn start_game(session: &mut Session, now: DateTime<Utc>) -> Result<Vec<GameEvent>> {
    if session.status != SessionStatus::Waiting {
        return Err(GameError::invalid_action("session already started"));
    }
    session.status = SessionStatus::InProgress;
    session.started_at = Some(now);
    session.last_update_at = now;

    let mut events = Vec::new();
    let hand_size = session.config.rules.starting_hand_size;
    for seat in Seat::ALL {
        for _ in 0..hand_size {
            if session.players[seat].zones.top_of_deck().is_none() {
                break;
            }
            events.push(session.draw(seat)?);
        }
    }

    session.turn = 1;
    session.active = Seat::First;
    session.step = Step::Untap;
    if session.config.rules.mulligan {
        session.opening = Some(OpeningHands::new());
        session.stack.give_priority(Seat::First);
        tracing::info!(session = %session.id, "game started, opening hands pending");
    } else {
        tracing::info!(session = %session.id, "game started");
        events.extend(begin_first_turn(session)?);
    }
    let (holder, step) = (session.priority_seat(), session.step);
    session.timer.hand_over(holder, step, now);
    Ok(events)
}

/// Enter turn 1's untap and run to its first priority window.
pub(super) fn begin_first_turn(session: &mut Session) -> Result<Vec<GameEvent>> {
    let mut events = vec![GameEvent::TurnStarted {
        turn: session.turn,
        active: session.active,
    }];
    let flow = enter(session, &mut events)?;
    settle(session, flow, &mut events)?;
    Ok(events)
}

/// Priority window closed with an empty stack: go to the next window.
pub fn advance(session: &mut Session) -> Result<Vec<GameEvent>> {
    let mut events = Vec::new();
    run(session, &mut events)?;
    Ok(events)
}

/// `seat` passes priority.
pub fn pass_priority(session: &mut Session, seat: Seat) -> Result<Vec<GameEvent>> {
    let mut events = vec![GameEvent::PriorityPassed { seat }];

    // Passing on an empty stack declares nothing.
    if session.stack.is_empty() {
        if let Some(combat) = session.combat.as_mut() {
            match session.step {
                Step::CombatAttack if seat == combat.attacking => combat.attackers_declared = true,
                Step::CombatBlock if seat == combat.defending => combat.blockers_declared = true,
                _ => {}
            }
        }
    }

    match session.stack.pass(seat) {
        PassOutcome::Handed(_) => {}
        PassOutcome::AllPassed if !session.stack.is_empty() => {
            events.extend(EffectResolver::resolve_top(session)?);
            session.stack.give_priority(session.active);
        }
        PassOutcome::AllPassed => run(session, &mut events)?,
    }
    Ok(events)
}

pub fn validate_end_turn(session: &Session, seat: Seat) -> Result<()> {
    if seat != session.active {
        return Err(GameError::invalid_action("only the active seat can end the turn"));
    }
    if !session.stack.is_empty() {
        return Err(GameError::invalid_action("cannot end the turn with items on the stack"));
    }
    let attacking = session.combat.as_ref().is_some_and(CombatState::has_attackers);
    if attacking && matches!(session.step, Step::CombatAttack | Step::CombatBlock | Step::CombatDamage) {
        return Err(GameError::invalid_action("cannot end the turn with attackers in combat"));
    }
    if session.step == Step::Cleanup {
        return Err(GameError::invalid_action("the turn is already ending"));
    }
    Ok(())
}

/// Walk the rest of the turn without priority windows.
pub fn end_turn(session: &mut Session) -> Result<Vec<GameEvent>> {
    session.ending_turn = true;
    advance(session)
}

pub fn validate_discard(session: &Session, seat: Seat, card: InstanceId) -> Result<()> {
    if session.step != Step::Cleanup || seat != session.active {
        return Err(GameError::invalid_action("discards happen in the active seat's cleanup"));
    }
    if !session.players[seat].zones.contains(Zone::Hand, card) {
        return Err(GameError::InvalidZoneTransition {
            card: card.to_string(),
            from: Zone::Hand.to_string(),
        });
    }
    Ok(())
}

/// Forced discard from the active hand during cleanup.
pub fn discard(session: &mut Session, card: InstanceId) -> Result<Vec<GameEvent>> {
    Ok(vec![session.move_card(card, Zone::Graveyard, ZonePosition::Top)?])
}

/// Finish cleanup after forced discards, then run into the next turn.
pub fn finish_cleanup(session: &mut Session) -> Result<Vec<GameEvent>> {
    if session.step != Step::Cleanup {
        return Err(GameError::invalid_action("not in cleanup"));
    }
    let mut events = Vec::new();
    let flow = finish_turn(session, &mut events)?;
    settle(session, flow, &mut events)?;
    Ok(events)
}

fn settle(session: &mut Session, flow: Flow, events: &mut Vec<GameEvent>) -> Result<()> {
    match flow {
        Flow::Priority(seat) => {
            session.stack.give_priority(seat);
            Ok(())
        }
        Flow::Continue => run(session, events),
        Flow::Halt => Ok(()),
    }
}

/// Advance step by step until a window opens or something halts the turn.
fn run(session: &mut Session, events: &mut Vec<GameEvent>) -> Result<()> {
    loop {
        let next = session.step.next();
        events.push(transition(session, next)?);
        match enter(session, events)? {
            Flow::Priority(seat) => {
                session.stack.give_priority(seat);
                return Ok(());
            }
            Flow::Halt => return Ok(()),
            Flow::Continue => {}
        }
    }
}

fn window(session: &Session, seat: Seat) -> Flow {
    if session.ending_turn {
        Flow::Continue
    } else {
        Flow::Priority(seat)
    }
}

fn set_combat_phase(session: &mut Session, phase: CombatPhase) {
    if let Some(combat) = session.combat.as_mut() {
        combat.phase = phase;
    }
}

/// Perform the turn-based actions of the step just entered.
fn enter(session: &mut Session, events: &mut Vec<GameEvent>) -> Result<Flow> {
    let active = session.active;
    let flow = match session.step {
        Step::Untap => {
            untap(session, events);
            Flow::Continue
        }
        Step::Upkeep => Flow::Continue,
        Step::Draw => {
            draw(session, events)?;
            Flow::Continue
        }
        Step::Main1 | Step::End => window(session, active),
        Step::CombatBegin => {
            session.combat = Some(CombatState::new(active));
            window(session, active)
        }
        Step::CombatAttack => {
            set_combat_phase(session, CombatPhase::DeclareAttackers);
            window(session, active)
        }
        Step::CombatBlock => {
            set_combat_phase(session, CombatPhase::DeclareBlockers);
            match session.combat.as_ref() {
                Some(combat) if combat.has_attackers() => window(session, combat.defending),
                _ => Flow::Continue,
            }
        }
        Step::CombatDamage => {
            set_combat_phase(session, CombatPhase::Damage);
            events.extend(damage::resolve(session)?);
            combat_window(session)
        }
        Step::CombatEnd => {
            set_combat_phase(session, CombatPhase::End);
            events.extend(damage::bury_casualties(session)?);
            combat_window(session)
        }
        Step::Main2 => {
            session.combat = None;
            window(session, active)
        }
        Step::Cleanup => cleanup(session, events)?,
    };
    Ok(flow)
}

/// Damage and end-of-combat windows open only when something attacked.
fn combat_window(session: &Session) -> Flow {
    if session.combat.as_ref().is_some_and(CombatState::attack_declared) {
        window(session, session.active)
    } else {
        Flow::Continue
    }
}

fn untap(session: &mut Session, events: &mut Vec<GameEvent>) {
    let active = session.active;

    let mut expired = 0;
    session.cards.for_each_mut(|card| {
        let removed = modifier::remove_expired(&mut card.modifiers);
        if removed > 0 {
            card.refresh_stats();
            expired += removed;
        }
    });
    for (_, player) in session.players.iter_mut() {
        expired += modifier::remove_expired(&mut player.modifiers);
    }
    if expired > 0 {
        events.push(GameEvent::ModifiersExpired {
            count: u32::try_from(expired).unwrap_or(u32::MAX),
        });
    }

    let mut untapped = 0;
    session.cards.for_each_mut(|card| {
        if card.zone == Zone::Board && card.controller == active && card.tapped {
            card.tapped = false;
            untapped += 1;
        }
    });
    events.push(GameEvent::PermanentsUntapped {
        seat: active,
        count: untapped,
    });

    let (per_turn, max_mana) = (session.config.rules.mana_per_turn, session.config.rules.max_mana);
    let player = &mut session.players[active];
    let extra = modifier::total(&player.modifiers, ModifierKind::ExtraMana).max(0);
    player.resources.start_turn(per_turn, max_mana);
    player.resources.gain_mana(u32::try_from(extra).unwrap_or(u32::MAX));
    events.push(GameEvent::ManaGained {
        seat: active,
        amount: player.resources.mana,
    });
}

fn draw(session: &mut Session, events: &mut Vec<GameEvent>) -> Result<()> {
    let active = session.active;
    let rules = &session.config.rules;
    if session.turn == 1 && active == Seat::First && !rules.first_player_draws {
        return Ok(());
    }
    let extra = modifier::total(&session.players[active].modifiers, ModifierKind::ExtraDraw).max(0);
    let count = rules.draw_per_turn.saturating_add(u32::try_from(extra).unwrap_or(u32::MAX));

    for _ in 0..count {
        let event = session.draw(active)?;
        let decked = matches!(event, GameEvent::DeckedOut { .. });
        events.push(event);
        if decked {
            tracing::info!(session = %session.id, seat = %active, "decked out");
            break;
        }
    }
    Ok(())
}

fn cleanup(session: &mut Session, events: &mut Vec<GameEvent>) -> Result<Flow> {
    let active = session.active;
    let max = session.config.rules.max_hand_size;
    let hand = session.players[active].zones.cards(Zone::Hand);

    if hand.len() > max {
        let excess = hand.len() - max;
        let newest: Vec<InstanceId> = hand.iter().rev().take(excess).copied().collect();
        let player = session.player_id(active);
        for card in newest {
            session
                .pending
                .push_back(Action::system(player, ActionKind::ForcedDiscard { card }));
        }
        session.pending.push_back(Action::system(player, ActionKind::FinishCleanup));
        return Ok(Flow::Halt);
    }
    finish_turn(session, events)
}

/// End-of-turn bookkeeping and hand-over to the other seat.
fn finish_turn(session: &mut Session, events: &mut Vec<GameEvent>) -> Result<Flow> {
    session.cards.for_each_mut(|card| {
        card.damage = 0;
        modifier::tick_all(&mut card.modifiers);
    });
    for (_, player) in session.players.iter_mut() {
        modifier::tick_all(&mut player.modifiers);
    }
    session.counters = SeatMap::default();
    session.ending_turn = false;
    session.combat = None;

    let max_turns = session.config.rules.max_turns;
    if max_turns > 0 && session.turn >= max_turns {
        session.turn_limit_reached = true;
        tracing::info!(session = %session.id, turn = session.turn, "turn limit reached");
        return Ok(Flow::Halt);
    }

    session.active = session.active.opponent();
    session.turn += 1;
    events.push(GameEvent::TurnStarted {
        turn: session.turn,
        active: session.active,
    });
    tracing::info!(session = %session.id, turn = session.turn, active = %session.active, "turn started");
    Ok(Flow::Continue)
}

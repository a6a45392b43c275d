//! Action processing pipeline.
//!
//! [`Pipeline::submit`] is the only way a session changes. Each action goes
//! through the same stages:
//!
//! 1. session-level gate: faulted, status, seat, clock, opening window,
//!    priority, caps
//! 2. kind-specific validation, read only
//! 3. apply on the live session with a clone kept as the rollback point
//! 4. state-based checks, invariant check, trigger collection, win/loss
//! 5. log entry, clock hand-over
//!
//! System follow-ups queued during stage 4 (forced discards, triggered
//! abilities, cleanup) are drained through the same stages before `submit`
//! returns. A rejected action leaves the session exactly as it was; an
//! `InvalidGameState` raised anywhere after stage 2 also faults the session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::CardKind;
use crate::combat::{declare, CasualtyCause};
use crate::core::{
    Action, ActionId, ActionKind, ActionOrigin, InstanceId, LogEntry, PlayerId, Seat, Session,
    SessionStatus, Step,
};
use crate::effects::{targeting, EffectSpec, Target, TargetSpec, Targets};
use crate::error::{GameError, Result};
use crate::resources::Cost;
use crate::rules::{mulligan, outcome, turn, ForfeitReason, GameResult};
use crate::stack::StackItemKind;
use crate::triggers::{self, GameEvent};
use crate::zones::{Zone, ZonePosition};

/// What a committed submission did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub action_id: ActionId,
    /// Log position of the submitted action.
    pub sequence: u64,
    /// Events of the submitted action (the applied state delta).
    pub events: Vec<GameEvent>,
    /// System follow-ups processed before returning, in order.
    pub follow_ups: Vec<LogEntry>,
    pub status: SessionStatus,
    pub winner: Option<PlayerId>,
    pub result: Option<GameResult>,
}

impl ActionResult {
    /// Every event of the submission, follow-ups included.
    pub fn all_events(&self) -> impl Iterator<Item = &GameEvent> {
        self.events
            .iter()
            .chain(self.follow_ups.iter().flat_map(|entry| entry.events.iter()))
    }
}

/// The serialized action pipeline.
pub struct Pipeline;

impl Pipeline {
    /// Validate and apply one action, then drain its follow-ups.
    pub fn submit(session: &mut Session, action: Action, now: DateTime<Utc>) -> Result<ActionResult> {
        let entry = Self::commit(session, action, now)?;

        let mut follow_ups = Vec::new();
        while let Some(next) = session.pending.pop_front() {
            let kind = next.kind.name();
            match Self::commit(session, next, now) {
                Ok(entry) => follow_ups.push(entry),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    // The engine queued something its own rules refuse.
                    session.faulted = true;
                    tracing::error!(session = %session.id, action = kind, error = %err, "follow-up rejected, session faulted");
                    return Err(GameError::invalid_state(format!("engine follow-up {kind} rejected: {err}")));
                }
            }
        }

        Ok(ActionResult {
            action_id: entry.action.id,
            sequence: entry.sequence,
            events: entry.events,
            follow_ups,
            status: session.status,
            winner: session.winner(),
            result: session.result,
        })
    }

    /// Run one action through every stage and log it.
    fn commit(session: &mut Session, mut action: Action, now: DateTime<Utc>) -> Result<LogEntry> {
        let seat = match Self::validate(session, &action, now) {
            Ok(seat) => seat,
            Err(err) => {
                tracing::warn!(
                    session = %session.id,
                    player = %action.player,
                    action = action.kind.name(),
                    error = %err,
                    "action rejected"
                );
                return Err(err);
            }
        };
        if action.issued_at.is_none() {
            action.issued_at = Some(now);
        }
        let (turn, step) = (session.turn, session.step);

        let snapshot = session.clone();
        let events = match Self::apply(session, seat, &action, now) {
            Ok(events) => events,
            Err(err) => {
                *session = snapshot;
                if err.is_fatal() {
                    session.faulted = true;
                    tracing::error!(
                        session = %session.id,
                        action = action.kind.name(),
                        error = %err,
                        "invariant violated, session faulted"
                    );
                } else {
                    tracing::warn!(session = %session.id, action = action.kind.name(), error = %err, "action rolled back");
                }
                return Err(err);
            }
        };

        let sequence = session.log.len() as u64 + 1;
        let entry = LogEntry {
            sequence,
            action,
            turn,
            step,
            events,
            applied_at: now,
        };
        session.log.push_back(entry.clone());
        session.last_update_at = now;
        tracing::debug!(
            session = %session.id,
            action = entry.action.kind.name(),
            sequence,
            turn = session.turn,
            step = %session.step,
            "action applied"
        );
        Ok(entry)
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Stages 1 and 2. Returns the acting seat.
    pub fn validate(session: &Session, action: &Action, now: DateTime<Utc>) -> Result<Seat> {
        if session.faulted {
            return Err(GameError::invalid_state("session is faulted"));
        }
        if session.status != SessionStatus::InProgress {
            return Err(GameError::invalid_action(format!(
                "session is {:?}, not in progress",
                session.status
            )));
        }
        let seat = session.seat_of(action.player)?;
        let from_player = action.origin == ActionOrigin::Player;

        if from_player {
            if action.kind.is_system_only() {
                return Err(GameError::invalid_action(format!(
                    "{} is generated by the engine",
                    action.kind.name()
                )));
            }
            if let Some(kind) = session.timer.expired_for(seat, now) {
                return Err(GameError::Timeout(format!("{seat} exceeded its {kind:?} clock")));
            }
            if !session.pending.is_empty() {
                return Err(GameError::invalid_action("follow-up actions are still pending"));
            }
        }
        if session.opening.is_some() && !action.kind.allowed_before_first_turn() {
            return Err(GameError::invalid_action("opening hands are still being decided"));
        }
        if action.kind.needs_priority() && session.priority_seat() != seat {
            return Err(GameError::invalid_action(format!("{seat} does not hold priority")));
        }
        session.counters[seat].check(&action.kind, &session.config.limits)?;

        match &action.kind {
            ActionKind::PassPriority | ActionKind::Concede | ActionKind::Forfeit { .. } => Ok(()),
            ActionKind::EndTurn => turn::validate_end_turn(session, seat),
            ActionKind::PlayCard { card, targets } => validate_play(session, seat, *card, targets),
            ActionKind::ActivateAbility {
                source,
                ability,
                targets,
            } => validate_activation(session, seat, *source, *ability, targets),
            ActionKind::DeclareAttackers { attackers } => declare::validate_attackers(session, seat, attackers),
            ActionKind::DeclareBlockers { blocks } => declare::validate_blockers(session, seat, blocks),
            ActionKind::AssignDamage {
                attacker,
                assignments,
            } => declare::validate_assignment(session, seat, *attacker, assignments),
            ActionKind::PauseClock => session.timer.check_pause(seat, now),
            ActionKind::ResumeClock => session.timer.check_resume(seat),
            ActionKind::Mulligan => mulligan::validate_mulligan(session, seat),
            ActionKind::KeepHand => mulligan::validate_keep(session, seat),
            ActionKind::ForcedDiscard { card } => turn::validate_discard(session, seat, *card),
            ActionKind::FinishCleanup => {
                if session.step == Step::Cleanup {
                    Ok(())
                } else {
                    Err(GameError::invalid_action("not in cleanup"))
                }
            }
            ActionKind::PutTrigger { source, trigger } => trigger_effects(session, *source, *trigger).map(|_| ()),
        }?;
        Ok(seat)
    }

    // =========================================================================
    // Apply
    // =========================================================================

    /// Stages 3 and 4 on the live session. Any error is rolled back by the caller.
    fn apply(session: &mut Session, seat: Seat, action: &Action, now: DateTime<Utc>) -> Result<Vec<GameEvent>> {
        let mut events = match &action.kind {
            ActionKind::PassPriority => turn::pass_priority(session, seat)?,
            ActionKind::EndTurn => turn::end_turn(session)?,
            ActionKind::PlayCard { card, targets } => play_card(session, seat, *card, targets)?,
            ActionKind::ActivateAbility {
                source,
                ability,
                targets,
            } => activate(session, seat, *source, *ability, targets)?,
            ActionKind::DeclareAttackers { attackers } => {
                let events = declare::apply_attackers(session, seat, attackers)?;
                session.stack.reset_passes();
                events
            }
            ActionKind::DeclareBlockers { blocks } => {
                let events = declare::apply_blockers(session, seat, blocks)?;
                session.stack.reset_passes();
                events
            }
            ActionKind::AssignDamage {
                attacker,
                assignments,
            } => {
                let events = declare::apply_assignment(session, *attacker, assignments)?;
                session.stack.reset_passes();
                events
            }
            ActionKind::Concede => forfeit(session, seat, ForfeitReason::Conceded),
            ActionKind::Forfeit { reason } => forfeit(session, seat, *reason),
            ActionKind::PauseClock => {
                session.timer.pause(seat, now)?;
                vec![GameEvent::ClockPaused { seat }]
            }
            ActionKind::ResumeClock => {
                session.timer.resume(seat, now)?;
                vec![GameEvent::ClockResumed { seat }]
            }
            ActionKind::Mulligan => mulligan::mulligan(session, seat)?,
            ActionKind::KeepHand => mulligan::keep(session, seat)?,
            ActionKind::ForcedDiscard { card } => turn::discard(session, *card)?,
            ActionKind::FinishCleanup => turn::finish_cleanup(session)?,
            ActionKind::PutTrigger { source, trigger } => {
                let effects = trigger_effects(session, *source, *trigger)?;
                let item = session.stack.push(
                    StackItemKind::Ability,
                    *source,
                    seat,
                    TargetSpec::None,
                    Targets::new(),
                    effects,
                );
                vec![GameEvent::StackItemPushed {
                    item,
                    kind: StackItemKind::Ability,
                    source: *source,
                    controller: seat,
                }]
            }
        };

        events.extend(state_based(session)?);
        session.counters[seat].record(&action.kind);
        session.check_invariants()?;

        for follow_up in triggers::collect(session, &events) {
            session.pending.push_back(follow_up);
        }
        if session.is_in_progress() {
            if let Some(result) = outcome::evaluate(session, now) {
                tracing::info!(session = %session.id, ?result, "game finished");
                events.push(GameEvent::GameEnded { result });
            }
        }
        if session.is_in_progress() {
            let (holder, step) = (session.priority_seat(), session.step);
            session.timer.hand_over(holder, step, now);
        }
        Ok(events)
    }
}

// =============================================================================
// Kind-specific rules
// =============================================================================

fn validate_play(session: &Session, seat: Seat, card: InstanceId, targets: &[Target]) -> Result<()> {
    let instance = session.cards.require(card)?;
    if instance.owner != seat || instance.zone != Zone::Hand {
        return Err(GameError::InvalidZoneTransition {
            card: card.to_string(),
            from: format!("{seat}'s hand"),
        });
    }
    let definition = session
        .definition(instance.card_id)
        .ok_or_else(|| GameError::invalid_state(format!("no definition for {}", instance.card_id)))?;

    if definition.kind.is_permanent() {
        if seat != session.active || !session.step.is_main() || !session.stack.is_empty() {
            return Err(GameError::invalid_action(
                "permanents are played by the active seat in a main step with an empty stack",
            ));
        }
        let cap = session.config.rules.max_board_creatures;
        if definition.kind == CardKind::Creature && session.creatures_on_board(seat) >= cap {
            return Err(GameError::invalid_action(format!("board already holds {cap} creatures")));
        }
    }
    targeting::validate(session, definition.target, targets)?;
    session.players[seat].resources.check(definition.cost)
}

fn play_card(session: &mut Session, seat: Seat, card: InstanceId, targets: &Targets) -> Result<Vec<GameEvent>> {
    let card_id = session.cards.require(card)?.card_id;
    let definition = session
        .definition(card_id)
        .cloned()
        .ok_or_else(|| GameError::invalid_state(format!("no definition for {card_id}")))?;

    let mut events = vec![pay(session, seat, definition.cost)?];
    if definition.kind.is_permanent() {
        events.push(session.move_card(card, Zone::Board, ZonePosition::Top)?);
        session.cards.require_mut(card)?.controller = seat;
        session.stack.reset_passes();
    } else {
        events.push(session.move_card(card, Zone::Graveyard, ZonePosition::Top)?);
        let item = session.stack.push(
            StackItemKind::Spell,
            card,
            seat,
            definition.target,
            targets.clone(),
            definition.effects,
        );
        events.push(GameEvent::StackItemPushed {
            item,
            kind: StackItemKind::Spell,
            source: card,
            controller: seat,
        });
    }
    Ok(events)
}

fn validate_activation(
    session: &Session,
    seat: Seat,
    source: InstanceId,
    ability: usize,
    targets: &[Target],
) -> Result<()> {
    let instance = session.cards.require(source)?;
    if !session.is_in_play(source) || instance.controller != seat {
        return Err(GameError::invalid_action(format!("{source} is not on {seat}'s board")));
    }
    let definition = session
        .definition(instance.card_id)
        .ok_or_else(|| GameError::invalid_state(format!("no definition for {}", instance.card_id)))?;
    let activated = definition
        .abilities
        .get(ability)
        .ok_or_else(|| GameError::not_found(format!("ability {ability} of {source}")))?;

    if activated.tap {
        if instance.tapped {
            return Err(GameError::invalid_action(format!("{source} is tapped")));
        }
        if instance.is_creature() && instance.is_summoning_sick(session.turn) {
            return Err(GameError::invalid_action(format!("{source} has summoning sickness")));
        }
    }
    targeting::validate(session, activated.target, targets)?;
    session.players[seat].resources.check(activated.cost)
}

fn activate(
    session: &mut Session,
    seat: Seat,
    source: InstanceId,
    ability: usize,
    targets: &Targets,
) -> Result<Vec<GameEvent>> {
    let card_id = session.cards.require(source)?.card_id;
    let activated = session
        .definition(card_id)
        .and_then(|def| def.abilities.get(ability))
        .cloned()
        .ok_or_else(|| GameError::invalid_state(format!("ability {ability} of {source} vanished")))?;

    let mut events = vec![pay(session, seat, activated.cost)?];
    if activated.tap {
        session.cards.require_mut(source)?.tapped = true;
        events.push(GameEvent::CardTapped { card: source });
    }
    let item = session.stack.push(
        StackItemKind::Ability,
        source,
        seat,
        activated.target,
        targets.clone(),
        activated.effects,
    );
    events.push(GameEvent::StackItemPushed {
        item,
        kind: StackItemKind::Ability,
        source,
        controller: seat,
    });
    Ok(events)
}

fn pay(session: &mut Session, seat: Seat, cost: Cost) -> Result<GameEvent> {
    session.players[seat].resources.pay(cost)?;
    Ok(GameEvent::ResourcesPaid {
        seat,
        mana: cost.mana,
        energy: cost.energy,
    })
}

fn forfeit(session: &mut Session, seat: Seat, reason: ForfeitReason) -> Vec<GameEvent> {
    session.players[seat].forfeit = Some(reason);
    vec![GameEvent::Conceded { seat, reason }]
}

fn trigger_effects(session: &Session, source: InstanceId, trigger: usize) -> Result<Vec<EffectSpec>> {
    let card_id = session.cards.require(source)?.card_id;
    session
        .definition(card_id)
        .and_then(|def| def.triggers.get(trigger))
        .map(|t| t.effects.clone())
        .ok_or_else(|| GameError::not_found(format!("trigger {trigger} of {source}")))
}

/// Creatures with lethal marked damage die, in combat or not. Combat
/// casualties are left for the end of combat.
fn state_based(session: &mut Session) -> Result<Vec<GameEvent>> {
    let doomed: Vec<(InstanceId, Seat)> = session
        .cards
        .iter()
        .filter(|card| card.zone == Zone::Board && card.is_creature() && card.has_lethal_damage())
        .filter(|card| {
            session
                .combat
                .as_ref()
                .map_or(true, |combat| !combat.is_casualty(card.id))
        })
        .map(|card| (card.id, card.owner))
        .collect();

    let mut events = Vec::new();
    for (card, owner) in doomed {
        events.push(session.move_card(card, Zone::Graveyard, ZonePosition::Top)?);
        events.push(GameEvent::CreatureDied {
            card,
            owner,
            cause: CasualtyCause::StateBased,
        });
    }
    Ok(events)
}

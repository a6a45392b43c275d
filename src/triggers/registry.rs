//! Matching events against triggered abilities.
//!
//! After every committed action the pipeline hands its events to
//! [`collect`], which returns one system `PutTrigger` follow-up per matching
//! triggered ability. The follow-ups are queued on the session and
//! processed before the next client action is accepted.
//!
//! ## Ordering
//!
//! The active seat's triggers are queued first, so the non-active seat's
//! triggers end up on top of the stack and resolve first.

use crate::cards::TriggerCondition;
use crate::core::{Action, ActionKind, InstanceId, Seat, Session};

use super::event::GameEvent;

/// One triggered ability ready to be put on the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingTrigger {
    pub controller: Seat,
    pub source: InstanceId,
    pub trigger: usize,
}

/// Triggered abilities matched by `events`, in queueing order.
#[must_use]
pub fn matching(session: &Session, events: &[GameEvent]) -> Vec<PendingTrigger> {
    let mut found = Vec::new();
    for event in events {
        match event {
            GameEvent::CardMoved { .. } => {
                if let Some(card) = event.entered_board() {
                    push_matches(session, card, TriggerCondition::EntersBoard, None, &mut found);
                }
            }
            GameEvent::CreatureDied { card, owner, .. } => {
                push_matches(session, *card, TriggerCondition::Dies, Some(*owner), &mut found);
            }
            GameEvent::AttackersDeclared { attackers, .. } => {
                for &card in attackers {
                    push_matches(session, card, TriggerCondition::Attacks, None, &mut found);
                }
            }
            _ => {}
        }
    }
    let active = session.active;
    found.sort_by_key(|t| t.controller != active);
    found
}

fn push_matches(
    session: &Session,
    card: InstanceId,
    condition: TriggerCondition,
    controller: Option<Seat>,
    found: &mut Vec<PendingTrigger>,
) {
    let Some(instance) = session.cards.get(card) else {
        return;
    };
    let Some(definition) = session.definition(instance.card_id) else {
        return;
    };
    let controller = controller.unwrap_or(instance.controller);
    for (index, trigger) in definition.triggers.iter().enumerate() {
        if trigger.on == condition {
            found.push(PendingTrigger {
                controller,
                source: card,
                trigger: index,
            });
        }
    }
}

/// System follow-up actions for the triggers matched by `events`.
#[must_use]
pub fn collect(session: &Session, events: &[GameEvent]) -> Vec<Action> {
    matching(session, events)
        .into_iter()
        .map(|pending| {
            Action::system(
                session.player_id(pending.controller),
                ActionKind::PutTrigger {
                    source: pending.source,
                    trigger: pending.trigger,
                },
            )
        })
        .collect()
}

//! Attacker, blocker and damage-order declarations.
//!
//! Each declaration has a `validate_*` half that reads the session and a
//! matching `apply_*` half that mutates it. The pipeline runs validation
//! before taking its rollback snapshot.

use crate::cards::Keyword;
use crate::core::{InstanceId, Seat, Session, Step};
use crate::error::{GameError, Result};
use crate::triggers::GameEvent;
use crate::zones::Zone;

use super::damage::{blocker_snapshots, check_split};
use super::state::{Block, CombatState, DamageAssignment};

fn combat(session: &Session) -> Result<&CombatState> {
    session
        .combat
        .as_ref()
        .ok_or_else(|| GameError::invalid_action("no combat in progress"))
}

fn combat_mut(session: &mut Session) -> Result<&mut CombatState> {
    session
        .combat
        .as_mut()
        .ok_or_else(|| GameError::invalid_state("combat state missing"))
}

fn require_untapped_creature(session: &Session, card: InstanceId, seat: Seat) -> Result<()> {
    let instance = session.cards.require(card)?;
    if instance.zone != Zone::Board || !instance.is_creature() {
        return Err(GameError::invalid_target(format!("{card} is not a creature on the board")));
    }
    if instance.controller != seat {
        return Err(GameError::invalid_target(format!("{card} is not controlled by {seat}")));
    }
    if instance.tapped {
        return Err(GameError::invalid_target(format!("{card} is tapped")));
    }
    Ok(())
}

fn reject_duplicates(cards: impl Iterator<Item = InstanceId>) -> Result<()> {
    let mut seen = Vec::new();
    for card in cards {
        if seen.contains(&card) {
            return Err(GameError::invalid_action(format!("{card} declared twice")));
        }
        seen.push(card);
    }
    Ok(())
}

pub fn validate_attackers(session: &Session, seat: Seat, attackers: &[InstanceId]) -> Result<()> {
    if session.step != Step::CombatAttack || seat != session.active {
        return Err(GameError::invalid_action(
            "attackers are declared by the active seat in the declare attackers step",
        ));
    }
    if combat(session)?.attackers_declared {
        return Err(GameError::invalid_action("attackers already declared this combat"));
    }
    reject_duplicates(attackers.iter().copied())?;

    for &card in attackers {
        require_untapped_creature(session, card, seat)?;
        if session.cards.require(card)?.is_summoning_sick(session.turn) {
            return Err(GameError::invalid_target(format!("{card} has summoning sickness")));
        }
    }
    Ok(())
}

pub fn apply_attackers(session: &mut Session, seat: Seat, attackers: &[InstanceId]) -> Result<Vec<GameEvent>> {
    let mut events = Vec::new();
    let mut declared = Vec::with_capacity(attackers.len());

    for &card in attackers {
        let instance = session.cards.require_mut(card)?;
        if !instance.has_keyword(Keyword::Vigilance) {
            instance.tapped = true;
            events.push(GameEvent::CardTapped { card });
        }
        declared.push(instance.clone());
    }

    let combat = combat_mut(session)?;
    for instance in &declared {
        combat.add_attacker(instance);
    }
    combat.attackers_declared = true;

    events.push(GameEvent::AttackersDeclared {
        seat,
        attackers: attackers.to_vec(),
    });
    Ok(events)
}

pub fn validate_blockers(session: &Session, seat: Seat, blocks: &[Block]) -> Result<()> {
    let combat = combat(session)?;
    if session.step != Step::CombatBlock || seat != combat.defending {
        return Err(GameError::invalid_action(
            "blockers are declared by the defending seat in the declare blockers step",
        ));
    }
    if combat.blockers_declared {
        return Err(GameError::invalid_action("blockers already declared this combat"));
    }
    reject_duplicates(blocks.iter().map(|b| b.blocker))?;

    for block in blocks {
        require_untapped_creature(session, block.blocker, seat)?;
        if !combat.is_attacking(block.attacker) {
            return Err(GameError::invalid_target(format!("{} is not attacking", block.attacker)));
        }
    }
    Ok(())
}

pub fn apply_blockers(session: &mut Session, seat: Seat, blocks: &[Block]) -> Result<Vec<GameEvent>> {
    let mut declared = Vec::with_capacity(blocks.len());
    for block in blocks {
        declared.push((session.cards.require(block.blocker)?.clone(), block.attacker));
    }

    let combat = combat_mut(session)?;
    for (blocker, attacker) in &declared {
        combat.add_block(blocker, *attacker);
    }
    combat.blockers_declared = true;

    Ok(vec![GameEvent::BlockersDeclared {
        seat,
        blocks: blocks.to_vec(),
    }])
}

pub fn validate_assignment(
    session: &Session,
    seat: Seat,
    attacker: InstanceId,
    assignments: &[DamageAssignment],
) -> Result<()> {
    let combat = combat(session)?;
    if session.step != Step::CombatBlock || seat != combat.attacking {
        return Err(GameError::invalid_action(
            "damage order is chosen by the attacking seat in the declare blockers step",
        ));
    }
    if !combat.blockers_declared {
        return Err(GameError::invalid_action("blockers are not declared yet"));
    }
    let snap = combat
        .creatures
        .get(&attacker)
        .filter(|_| combat.is_attacking(attacker))
        .ok_or_else(|| GameError::invalid_target(format!("{attacker} is not attacking")))?;
    let blockers = blocker_snapshots(combat, attacker);
    if blockers.is_empty() {
        return Err(GameError::invalid_target(format!("{attacker} is not blocked")));
    }
    check_split(snap, &blockers, combat.defending, assignments)
}

pub fn apply_assignment(
    session: &mut Session,
    attacker: InstanceId,
    assignments: &[DamageAssignment],
) -> Result<Vec<GameEvent>> {
    combat_mut(session)?.set_split(attacker, assignments.to_vec());
    Ok(vec![GameEvent::DamageAssignmentOrdered { attacker }])
}

//! Combat damage.
//!
//! ## Sub-steps
//!
//! Damage is dealt in at most two sub-steps. The first-strike sub-step runs
//! only when some combatant has first strike or double strike; the regular
//! sub-step always runs and involves every combatant without first strike
//! plus double strikers. Each sub-step plans every hit from one snapshot of
//! the combatants and only then applies them, so damage within a sub-step
//! is simultaneous.
//!
//! ## Assignment
//!
//! A blocked attacker assigns its power over its blockers in order, each
//! blocker receiving lethal damage (its remaining toughness, or 1 with
//! deathtouch) before the next receives anything. The excess goes to the
//! defending player with trample, otherwise to the last blocker. The
//! attacking seat may submit its own split; it is honored only if it still
//! satisfies these rules when damage is dealt.

use crate::cards::Keyword;
use crate::core::{InstanceId, Seat, Session};
use crate::error::{GameError, Result};
use crate::triggers::GameEvent;
use crate::zones::{Zone, ZonePosition};

use super::state::{
    Casualty, CasualtyCause, CombatCreature, CombatState, DamageAssignment, DamageRecipient,
    DamageRecord,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Strike {
    First,
    Regular,
}

impl Strike {
    fn deals(self, creature: &CombatCreature) -> bool {
        match self {
            Strike::First => creature.keywords.strikes_first(),
            Strike::Regular => creature.keywords.strikes_regular(),
        }
    }
}

/// Damage `attacker` must assign to `blocker` before moving on.
#[must_use]
pub fn lethal_damage(attacker: &CombatCreature, blocker: &CombatCreature) -> u32 {
    let remaining = blocker.remaining_toughness();
    if remaining == 0 {
        0
    } else if attacker.keywords.has(Keyword::Deathtouch) {
        1
    } else {
        u32::try_from(remaining).unwrap_or(u32::MAX)
    }
}

/// The split the engine uses when the attacking seat gave none.
#[must_use]
pub fn default_split(
    attacker: &CombatCreature,
    blockers: &[(InstanceId, CombatCreature)],
    defender: Seat,
) -> Vec<DamageAssignment> {
    let mut remaining = attacker.strength();
    let mut split: Vec<DamageAssignment> = Vec::new();

    for (id, blocker) in blockers {
        if remaining == 0 {
            break;
        }
        let amount = lethal_damage(attacker, blocker).min(remaining);
        if amount > 0 {
            split.push(DamageAssignment::to_card(*id, amount));
            remaining -= amount;
        }
    }

    if remaining > 0 {
        if attacker.keywords.has(Keyword::Trample) {
            split.push(DamageAssignment::to_player(defender, remaining));
        } else if let Some((last, _)) = blockers.last() {
            match split.last_mut() {
                Some(entry) if entry.to == DamageRecipient::Card(*last) => entry.amount += remaining,
                _ => split.push(DamageAssignment::to_card(*last, remaining)),
            }
        }
    }
    split
}

/// Check an explicit split against the assignment rules.
pub fn check_split(
    attacker: &CombatCreature,
    blockers: &[(InstanceId, CombatCreature)],
    defender: Seat,
    split: &[DamageAssignment],
) -> Result<()> {
    let total: u64 = split.iter().map(|a| u64::from(a.amount)).sum();
    if total != u64::from(attacker.strength()) {
        return Err(GameError::invalid_action(format!(
            "split assigns {total} damage but the attacker has power {}",
            attacker.strength()
        )));
    }

    let mut seen: Vec<InstanceId> = Vec::new();
    let mut player_seen = false;
    let mut short = false;

    for assignment in split {
        if short {
            return Err(GameError::invalid_action(
                "each blocker must be assigned lethal damage before the next",
            ));
        }
        match assignment.to {
            DamageRecipient::Card(id) => {
                let (_, blocker) = blockers.iter().find(|(b, _)| *b == id).ok_or_else(|| {
                    GameError::invalid_target(format!("{id} is not blocking this attacker"))
                })?;
                if seen.contains(&id) || player_seen {
                    return Err(GameError::invalid_action(format!("{id} assigned twice")));
                }
                seen.push(id);
                if assignment.amount < lethal_damage(attacker, blocker) {
                    short = true;
                }
            }
            DamageRecipient::Player(seat) => {
                if seat != defender {
                    return Err(GameError::invalid_target("damage can only go to the defending player"));
                }
                if !attacker.keywords.has(Keyword::Trample) {
                    return Err(GameError::invalid_action(
                        "only a trampling attacker assigns damage to the player",
                    ));
                }
                if player_seen || seen.len() != blockers.len() {
                    return Err(GameError::invalid_action(
                        "every blocker must be assigned lethal damage before the player",
                    ));
                }
                player_seen = true;
            }
        }
    }
    Ok(())
}

/// Remaining blockers of `attacker` with their snapshots.
#[must_use]
pub fn blocker_snapshots(combat: &CombatState, attacker: InstanceId) -> Vec<(InstanceId, CombatCreature)> {
    combat
        .blockers_of(attacker)
        .iter()
        .filter_map(|id| combat.creatures.get(id).map(|snap| (*id, *snap)))
        .collect()
}

/// Deal all combat damage. Called on entering the combat damage step.
pub fn resolve(session: &mut Session) -> Result<Vec<GameEvent>> {
    let mut events = Vec::new();
    refresh(session);

    let Some(combat) = session.combat.as_ref() else {
        return Ok(events);
    };
    if !combat.has_attackers() {
        return Ok(events);
    }

    let first_strike = combat
        .creatures
        .values()
        .any(|snap| snap.keywords.strikes_first());
    if first_strike {
        sub_step(session, Strike::First, &mut events)?;
        refresh(session);
    }
    sub_step(session, Strike::Regular, &mut events)?;
    Ok(events)
}

/// Re-read every combatant from the store; drop those no longer on the board.
fn refresh(session: &mut Session) {
    let Some(mut combat) = session.combat.take() else {
        return;
    };
    let ids: Vec<InstanceId> = combat.creatures.keys().copied().collect();
    for id in ids {
        match session.cards.get(id) {
            Some(card) if card.zone == Zone::Board && card.is_creature() => {
                combat.creatures.insert(id, CombatCreature::snapshot(card));
            }
            _ => combat.remove(id),
        }
    }
    session.combat = Some(combat);
}

fn plan(combat: &CombatState, strike: Strike) -> Vec<DamageRecord> {
    let first_strike = strike == Strike::First;
    let mut hits = Vec::new();
    let mut hit = |source: InstanceId, target: DamageRecipient, amount: u32| {
        if amount > 0 {
            hits.push(DamageRecord {
                source,
                target,
                amount,
                first_strike,
            });
        }
    };

    for &attacker in &combat.attackers {
        let Some(snap) = combat.creatures.get(&attacker) else {
            continue;
        };
        if !strike.deals(snap) {
            continue;
        }
        match combat.block_of(attacker) {
            None => hit(attacker, DamageRecipient::Player(combat.defending), snap.strength()),
            Some(entry) => {
                let blockers = blocker_snapshots(combat, attacker);
                let split = entry
                    .split
                    .as_ref()
                    .filter(|split| check_split(snap, &blockers, combat.defending, split).is_ok())
                    .cloned()
                    .unwrap_or_else(|| default_split(snap, &blockers, combat.defending));
                for assignment in split {
                    hit(attacker, assignment.to, assignment.amount);
                }
            }
        }
    }

    for entry in &combat.blocks {
        if !combat.in_combat(entry.attacker) {
            continue;
        }
        for &blocker in &entry.blockers {
            let Some(snap) = combat.creatures.get(&blocker) else {
                continue;
            };
            if strike.deals(snap) {
                hit(blocker, DamageRecipient::Card(entry.attacker), snap.strength());
            }
        }
    }
    hits
}

fn sub_step(session: &mut Session, strike: Strike, events: &mut Vec<GameEvent>) -> Result<()> {
    let Some(mut combat) = session.combat.take() else {
        return Ok(());
    };
    let hits = plan(&combat, strike);
    let mut deathtouched: Vec<InstanceId> = Vec::new();

    for record in &hits {
        let deathtouch = combat
            .creatures
            .get(&record.source)
            .is_some_and(|snap| snap.keywords.has(Keyword::Deathtouch));

        match record.target {
            DamageRecipient::Player(seat) => {
                let resources = &mut session.players[seat].resources;
                resources.take_damage(record.amount);
                events.push(GameEvent::DamageDealt {
                    source: Some(record.source),
                    target: record.target,
                    amount: record.amount,
                    combat: true,
                });
                events.push(GameEvent::HealthChanged {
                    seat,
                    delta: -i64::from(record.amount),
                    health: resources.health,
                });
            }
            DamageRecipient::Card(id) => {
                if let Some(card) = session.cards.get_mut(id) {
                    card.damage += i64::from(record.amount);
                }
                if deathtouch {
                    deathtouched.push(id);
                }
                events.push(GameEvent::DamageDealt {
                    source: Some(record.source),
                    target: record.target,
                    amount: record.amount,
                    combat: true,
                });
            }
        }
        combat.damage.push(*record);
    }

    let ids: Vec<InstanceId> = combat.creatures.keys().copied().collect();
    for id in ids {
        let Some(card) = session.cards.get(id) else {
            continue;
        };
        let dies = card.has_lethal_damage()
            || (deathtouched.contains(&id) && !card.has_keyword(Keyword::Indestructible));
        if dies {
            combat.casualties.push(Casualty {
                card: id,
                cause: CasualtyCause::Damage,
            });
            combat.remove(id);
        }
    }

    tracing::debug!(
        first_strike = strike == Strike::First,
        hits = hits.len(),
        casualties = combat.casualties.len(),
        "combat damage dealt"
    );
    session.combat = Some(combat);
    Ok(())
}

/// Move combat casualties still on the board to their graveyards.
pub fn bury_casualties(session: &mut Session) -> Result<Vec<GameEvent>> {
    let casualties = session
        .combat
        .as_ref()
        .map(|c| c.casualties.clone())
        .unwrap_or_default();

    let mut events = Vec::new();
    for casualty in casualties {
        let card = session.cards.require(casualty.card)?;
        if card.zone != Zone::Board {
            continue;
        }
        let owner = card.owner;
        events.push(session.move_card(casualty.card, Zone::Graveyard, ZonePosition::Top)?);
        events.push(GameEvent::CreatureDied {
            card: casualty.card,
            owner,
            cause: casualty.cause,
        });
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Keywords;

    fn snap(power: i64, toughness: i64, keywords: Keywords) -> CombatCreature {
        CombatCreature {
            controller: Seat::First,
            power,
            toughness,
            damage: 0,
            keywords,
        }
    }

    fn two_blockers() -> Vec<(InstanceId, CombatCreature)> {
        vec![
            (InstanceId(10), snap(3, 2, Keywords::none())),
            (InstanceId(11), snap(3, 2, Keywords::none())),
        ]
    }

    #[test]
    fn test_default_split_excess_to_last_blocker() {
        let attacker = snap(5, 4, Keywords::none());
        let split = default_split(&attacker, &two_blockers(), Seat::Second);
        assert_eq!(
            split,
            vec![
                DamageAssignment::to_card(InstanceId(10), 2),
                DamageAssignment::to_card(InstanceId(11), 3),
            ]
        );
    }

    #[test]
    fn test_default_split_trample_excess_to_player() {
        let attacker = snap(5, 4, Keywords::none().with(Keyword::Trample));
        let split = default_split(&attacker, &two_blockers(), Seat::Second);
        assert_eq!(split.last(), Some(&DamageAssignment::to_player(Seat::Second, 1)));
    }

    #[test]
    fn test_deathtouch_lethal_is_one() {
        let attacker = snap(3, 1, Keywords::none().with(Keyword::Deathtouch));
        let blocker = snap(1, 5, Keywords::none());
        assert_eq!(lethal_damage(&attacker, &blocker), 1);
    }

    #[test]
    fn test_check_split_requires_lethal_in_order() {
        let attacker = snap(4, 4, Keywords::none());
        let bad = [
            DamageAssignment::to_card(InstanceId(10), 1),
            DamageAssignment::to_card(InstanceId(11), 3),
        ];
        assert!(check_split(&attacker, &two_blockers(), Seat::Second, &bad).is_err());

        let reversed = [
            DamageAssignment::to_card(InstanceId(11), 2),
            DamageAssignment::to_card(InstanceId(10), 2),
        ];
        assert!(check_split(&attacker, &two_blockers(), Seat::Second, &reversed).is_ok());
    }

    #[test]
    fn test_check_split_total_must_match_power() {
        let attacker = snap(5, 4, Keywords::none());
        let split = [
            DamageAssignment::to_card(InstanceId(10), 2),
            DamageAssignment::to_card(InstanceId(11), 2),
        ];
        assert!(check_split(&attacker, &two_blockers(), Seat::Second, &split).is_err());
    }

    #[test]
    fn test_check_split_player_needs_trample() {
        let split = [
            DamageAssignment::to_card(InstanceId(10), 2),
            DamageAssignment::to_card(InstanceId(11), 2),
            DamageAssignment::to_player(Seat::Second, 1),
        ];
        let plain = snap(5, 4, Keywords::none());
        assert!(check_split(&plain, &two_blockers(), Seat::Second, &split).is_err());

        let trampler = snap(5, 4, Keywords::none().with(Keyword::Trample));
        assert!(check_split(&trampler, &two_blockers(), Seat::Second, &split).is_ok());
        assert!(check_split(&trampler, &two_blockers(), Seat::First, &split).is_err());
    }

    #[test]
    fn test_first_strike_only_in_first_step() {
        let striker = snap(2, 2, Keywords::none().with(Keyword::FirstStrike));
        let double = snap(2, 2, Keywords::none().with(Keyword::DoubleStrike));
        let plain = snap(2, 2, Keywords::none());

        assert!(Strike::First.deals(&striker));
        assert!(!Strike::Regular.deals(&striker));
        assert!(Strike::First.deals(&double) && Strike::Regular.deals(&double));
        assert!(!Strike::First.deals(&plain) && Strike::Regular.deals(&plain));
    }
}

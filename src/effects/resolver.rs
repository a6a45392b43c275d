//! Effect resolution: executing a stack item against the session.
//!
//! The `EffectResolver` pops the top stack item and applies each of its
//! effects to the recipients it names. Chosen targets are re-checked first;
//! an effect whose recipient became illegal, or is the wrong kind of object
//! for the effect, fizzles and the remaining effects still apply.

use smallvec::smallvec;

use crate::cards::Keyword;
use crate::combat::{CasualtyCause, DamageRecipient};
use crate::core::{Session, StackItemId};
use crate::error::{GameError, Result};
use crate::stack::StackItem;
use crate::triggers::GameEvent;
use crate::zones::{Zone, ZonePosition};

use super::effect::{Effect, Recipient};
use super::modifier::{Modifier, ModifierKind};
use super::targeting::{self, Target, Targets};

/// Result of applying one effect to one recipient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveResult {
    Applied,
    /// Nothing happened; the reason is reported to clients.
    Fizzled(String),
}

/// Resolves stack items.
pub struct EffectResolver;

impl EffectResolver {
    /// Pop the top stack item and resolve it fully.
    pub fn resolve_top(session: &mut Session) -> Result<Vec<GameEvent>> {
        let item = session
            .stack
            .pop()
            .ok_or_else(|| GameError::invalid_state("resolving an empty stack"))?;
        let mut events = Vec::new();

        for spec in &item.effects {
            let recipients: Targets = match spec.recipient {
                Recipient::Target => item.targets.clone(),
                Recipient::Controller => smallvec![Target::Player(item.controller)],
                Recipient::Opponent => smallvec![Target::Player(item.controller.opponent())],
                Recipient::Source => smallvec![Target::Card(item.source)],
            };
            if recipients.is_empty() {
                events.push(fizzled(item.id, &spec.effect, "no target chosen"));
                continue;
            }

            for target in recipients {
                if spec.recipient == Recipient::Target && !targeting::is_legal(session, item.target, target) {
                    events.push(fizzled(item.id, &spec.effect, &format!("{target} is no longer a legal target")));
                    continue;
                }
                if let ResolveResult::Fizzled(reason) =
                    Self::apply(session, &item, &spec.effect, target, &mut events)?
                {
                    events.push(fizzled(item.id, &spec.effect, &reason));
                }
            }
        }

        tracing::debug!(item = %item.id, source = %item.source, events = events.len(), "stack item resolved");
        events.push(GameEvent::StackItemResolved { item: item.id });
        Ok(events)
    }

    /// Apply one effect to one recipient.
    pub fn apply(
        session: &mut Session,
        item: &StackItem,
        effect: &Effect,
        target: Target,
        events: &mut Vec<GameEvent>,
    ) -> Result<ResolveResult> {
        let max_life = session.config.rules.max_life;
        let creature = matches!(target, Target::Card(id) if is_creature_on_board(session, id));
        let permanent = matches!(target, Target::Card(id) if zone_of(session, id) == Some(Zone::Board));

        match (effect, target) {
            (Effect::Damage { amount }, Target::Player(seat)) => {
                let resources = &mut session.players[seat].resources;
                resources.take_damage(*amount);
                events.push(GameEvent::DamageDealt {
                    source: Some(item.source),
                    target: DamageRecipient::Player(seat),
                    amount: *amount,
                    combat: false,
                });
                events.push(GameEvent::HealthChanged {
                    seat,
                    delta: -i64::from(*amount),
                    health: resources.health,
                });
            }
            (Effect::Damage { amount }, Target::Card(id)) if creature => {
                session.cards.require_mut(id)?.damage += i64::from(*amount);
                events.push(GameEvent::DamageDealt {
                    source: Some(item.source),
                    target: DamageRecipient::Card(id),
                    amount: *amount,
                    combat: false,
                });
            }
            (Effect::Heal { amount }, Target::Player(seat)) => {
                let resources = &mut session.players[seat].resources;
                let healed = resources.heal(*amount, max_life);
                events.push(GameEvent::HealthChanged {
                    seat,
                    delta: healed,
                    health: resources.health,
                });
            }
            (Effect::Heal { amount }, Target::Card(id)) if creature => {
                let card = session.cards.require_mut(id)?;
                let healed = card.damage.min(i64::from(*amount));
                card.damage -= healed;
                events.push(GameEvent::DamageHealed { card: id, amount: healed });
            }
            (Effect::Draw { count }, Target::Player(seat)) => {
                for _ in 0..*count {
                    let event = session.draw(seat)?;
                    let decked = matches!(event, GameEvent::DeckedOut { .. });
                    events.push(event);
                    if decked {
                        break;
                    }
                }
            }
            (Effect::GainMana { amount }, Target::Player(seat)) => {
                session.players[seat].resources.gain_mana(*amount);
                events.push(GameEvent::ManaGained { seat, amount: *amount });
            }
            (Effect::GainEnergy { amount }, Target::Player(seat)) => {
                session.players[seat].resources.gain_energy(*amount);
                events.push(GameEvent::EnergyGained { seat, amount: *amount });
            }
            (Effect::Pump { power, toughness, duration }, Target::Card(id)) if creature => {
                let card = session.cards.require_mut(id)?;
                for (kind, value) in [(ModifierKind::Power, *power), (ModifierKind::Toughness, *toughness)] {
                    if value != 0 {
                        let modifier = Modifier::new(kind, value, *duration);
                        card.add_modifier(modifier);
                        events.push(GameEvent::ModifierAdded { target, modifier });
                    }
                }
            }
            (Effect::Grant { keyword, duration }, Target::Card(id)) if creature => {
                let modifier = Modifier::new(ModifierKind::Grant(*keyword), 1, *duration);
                session.cards.require_mut(id)?.add_modifier(modifier);
                events.push(GameEvent::ModifierAdded { target, modifier });
            }
            (Effect::AddCounters { counter, amount }, Target::Card(id)) if permanent => {
                session.cards.require_mut(id)?.add_counters(counter, *amount);
                events.push(GameEvent::CountersChanged {
                    card: id,
                    counter: counter.clone(),
                    amount: *amount,
                });
            }
            (Effect::Destroy, Target::Card(id)) if permanent => {
                let card = session.cards.require(id)?;
                if card.has_keyword(Keyword::Indestructible) {
                    return Ok(ResolveResult::Fizzled(format!("{id} is indestructible")));
                }
                let (owner, was_creature) = (card.owner, card.is_creature());
                events.push(session.move_card(id, Zone::Graveyard, ZonePosition::Top)?);
                if was_creature {
                    events.push(GameEvent::CreatureDied {
                        card: id,
                        owner,
                        cause: CasualtyCause::Destruction,
                    });
                }
            }
            (Effect::Bounce, Target::Card(id)) if permanent => {
                events.push(session.move_card(id, Zone::Hand, ZonePosition::Top)?);
            }
            (Effect::Exile, Target::Card(id))
                if matches!(zone_of(session, id), Some(Zone::Board | Zone::Graveyard)) =>
            {
                events.push(session.move_card(id, Zone::Exile, ZonePosition::Top)?);
            }
            (Effect::Counter, Target::StackItem(id)) => return Ok(counter(session, id, item.id, events)),
            (Effect::PlayerModifier { kind, value, duration }, Target::Player(seat)) if kind.is_player_modifier() => {
                let modifier = Modifier::new(*kind, *value, *duration);
                session.players[seat].modifiers.push(modifier);
                events.push(GameEvent::ModifierAdded { target, modifier });
            }
            _ => {
                return Ok(ResolveResult::Fizzled(format!(
                    "{} cannot apply to {target}",
                    effect.name()
                )))
            }
        }
        Ok(ResolveResult::Applied)
    }
}

fn counter(session: &mut Session, target: StackItemId, by: StackItemId, events: &mut Vec<GameEvent>) -> ResolveResult {
    match session.stack.remove(target) {
        Some(_) => {
            events.push(GameEvent::StackItemCountered { item: target, by });
            ResolveResult::Applied
        }
        None => ResolveResult::Fizzled(format!("{target} already left the stack")),
    }
}

fn zone_of(session: &Session, card: crate::core::InstanceId) -> Option<Zone> {
    session.cards.get(card).map(|c| c.zone)
}

fn is_creature_on_board(session: &Session, card: crate::core::InstanceId) -> bool {
    session
        .cards
        .get(card)
        .is_some_and(|c| c.zone == Zone::Board && c.is_creature())
}

fn fizzled(item: StackItemId, effect: &Effect, reason: &str) -> GameEvent {
    GameEvent::EffectFizzled {
        item,
        effect: effect.name().to_string(),
        reason: reason.to_string(),
    }
}

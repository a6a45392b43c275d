//! Redacted per-player projection of a session.
//!
//! A client never sees the full session. [`PlayerView::build`] shows the
//! requesting seat its own hand in full, the opponent's hand and both decks
//! only as counts, and everything public (boards, graveyards, exiles, the
//! stack, combat) to both seats alike.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::{CardId, Keywords};
use crate::combat::CombatState;
use crate::core::{InstanceId, Phase, PlayerId, Seat, Session, SessionId, SessionStatus, Step};
use crate::effects::Modifier;
use crate::rules::GameResult;
use crate::stack::StackItem;
use crate::zones::Zone;

use super::timer::ClockReading;

/// A visible card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub id: InstanceId,
    pub card_id: CardId,
    pub name: String,
    pub owner: Seat,
    pub controller: Seat,
    pub tapped: bool,
    pub power: Option<i64>,
    pub toughness: Option<i64>,
    pub damage: i64,
    /// Sorted by counter name.
    pub counters: Vec<(String, i64)>,
    pub keywords: Keywords,
    pub summoning_sick: bool,
    /// Died in combat and waits on the board for the end of combat.
    pub casualty: bool,
}

/// Zones every seat may inspect.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicZones {
    pub board: Vec<CardView>,
    pub graveyard: Vec<CardView>,
    pub exile: Vec<CardView>,
    pub hand_count: usize,
    pub deck_count: usize,
}

/// One seat as seen by the viewer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatView {
    pub player: PlayerId,
    pub seat: Seat,
    pub health: i64,
    pub mana: u32,
    pub mana_cap: u32,
    pub energy: u32,
    pub modifiers: Vec<Modifier>,
    pub zones: PublicZones,
    /// The hand itself, present only in the viewer's own seat.
    pub hand: Option<Vec<CardView>>,
}

/// What the viewer may do right now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub has_priority: bool,
    pub can_mulligan: bool,
    pub can_play_cards: bool,
    pub can_activate: bool,
    pub can_attack: bool,
    pub can_block: bool,
    pub can_concede: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub session: SessionId,
    pub status: SessionStatus,
    pub faulted: bool,
    pub turn: u32,
    pub step: Step,
    pub phase: Phase,
    pub active: PlayerId,
    pub priority: PlayerId,
    pub you: SeatView,
    pub opponent: SeatView,
    /// Bottom to top.
    pub stack: Vec<StackItem>,
    pub combat: Option<CombatState>,
    pub winner: Option<PlayerId>,
    pub result: Option<GameResult>,
    pub permissions: Permissions,
    pub clock: ClockReading,
}

impl PlayerView {
    /// The projection of `session` for `seat`.
    #[must_use]
    pub fn build(session: &Session, seat: Seat, now: DateTime<Utc>) -> Self {
        Self {
            session: session.id,
            status: session.status,
            faulted: session.faulted,
            turn: session.turn,
            step: session.step,
            phase: if session.opening.is_some() {
                Phase::Mulligan
            } else {
                session.step.phase()
            },
            active: session.player_id(session.active),
            priority: session.player_id(session.priority_seat()),
            you: seat_view(session, seat, true),
            opponent: seat_view(session, seat.opponent(), false),
            stack: session.stack.iter().cloned().collect(),
            combat: session.combat.clone(),
            winner: session.winner(),
            result: session.result,
            permissions: permissions(session, seat),
            clock: session.timer.reading(seat, now),
        }
    }
}

fn card_view(session: &Session, id: InstanceId) -> Option<CardView> {
    let card = session.cards.get(id)?;
    let name = session
        .definition(card.card_id)
        .map(|def| def.name.clone())
        .unwrap_or_default();
    let mut counters: Vec<(String, i64)> = card
        .counters
        .iter()
        .map(|(name, value)| (name.clone(), *value))
        .collect();
    counters.sort();

    Some(CardView {
        id,
        card_id: card.card_id,
        name,
        owner: card.owner,
        controller: card.controller,
        tapped: card.tapped,
        power: card.power,
        toughness: card.toughness,
        damage: card.damage,
        counters,
        keywords: card.keywords(),
        summoning_sick: card.zone == Zone::Board && card.is_summoning_sick(session.turn),
        casualty: card.zone == Zone::Board && !session.is_in_play(id),
    })
}

fn zone_views(session: &Session, seat: Seat, zone: Zone) -> Vec<CardView> {
    session.players[seat]
        .zones
        .cards(zone)
        .iter()
        .filter_map(|&id| card_view(session, id))
        .collect()
}

fn seat_view(session: &Session, seat: Seat, own: bool) -> SeatView {
    let player = &session.players[seat];
    SeatView {
        player: player.id,
        seat,
        health: player.resources.health,
        mana: player.resources.mana,
        mana_cap: player.resources.mana_cap,
        energy: player.resources.energy,
        modifiers: player.modifiers.clone(),
        zones: PublicZones {
            board: zone_views(session, seat, Zone::Board),
            graveyard: zone_views(session, seat, Zone::Graveyard),
            exile: zone_views(session, seat, Zone::Exile),
            hand_count: player.zones.count(Zone::Hand),
            deck_count: player.zones.count(Zone::Deck),
        },
        hand: own.then(|| zone_views(session, seat, Zone::Hand)),
    }
}

fn permissions(session: &Session, seat: Seat) -> Permissions {
    let live = session.is_in_progress() && !session.faulted;
    let has_priority = live && session.pending.is_empty() && session.priority_seat() == seat;
    let can_mulligan = has_priority
        && session.opening.as_ref().is_some_and(|opening| {
            !opening.has_kept(seat)
                && opening.next_hand_size(seat, session.config.rules.starting_hand_size) > 0
        });
    let playing = has_priority && session.opening.is_none();
    let combat = session.combat.as_ref();

    let can_attack = has_priority
        && session.step == Step::CombatAttack
        && combat.is_some_and(|c| c.attacking == seat && !c.attackers_declared);
    let can_block = has_priority
        && session.step == Step::CombatBlock
        && combat.is_some_and(|c| c.defending == seat && c.has_attackers() && !c.blockers_declared);

    Permissions {
        has_priority,
        can_mulligan,
        can_play_cards: playing && has_playable_card(session, seat),
        can_activate: playing && has_usable_ability(session, seat),
        can_attack,
        can_block,
        can_concede: live,
    }
}

/// Some permanent in play has an affordable ability it can use now.
fn has_usable_ability(session: &Session, seat: Seat) -> bool {
    let resources = &session.players[seat].resources;
    session
        .cards
        .iter()
        .filter(|card| card.controller == seat && session.is_in_play(card.id))
        .any(|card| {
            let ready = !card.tapped && !(card.is_creature() && card.is_summoning_sick(session.turn));
            session.definition(card.card_id).is_some_and(|def| {
                def.abilities
                    .iter()
                    .any(|ability| (!ability.tap || ready) && resources.check(ability.cost).is_ok())
            })
        })
}

/// Some card in hand is affordable and its timing allows it now.
fn has_playable_card(session: &Session, seat: Seat) -> bool {
    let player = &session.players[seat];
    let sorcery_speed = seat == session.active && session.step.is_main() && session.stack.is_empty();

    player.zones.cards(Zone::Hand).iter().any(|&id| {
        session
            .cards
            .get(id)
            .and_then(|card| session.definition(card.card_id))
            .is_some_and(|def| {
                player.resources.check(def.cost).is_ok() && (!def.kind.is_permanent() || sorcery_speed)
            })
    })
}

//! The session aggregate.
//!
//! ## Session
//!
//! Everything one game needs lives in one [`Session`] value:
//! - turn, step, active seat, priority (held by the stack)
//! - per-seat [`PlayerState`]: resources, zone ledger, player modifiers
//! - the card instance store and the card definitions in play
//! - the stack, the combat state and the follow-up queue
//! - the action log, the timer, the result and lifecycle timestamps
//!
//! Collections are `im` persistent structures, so cloning a session is
//! cheap; the pipeline clones before applying an action and restores the
//! clone if applying fails. The session is mutated only through the
//! pipeline.

use chrono::{DateTime, Utc};
use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};

use super::action::{Action, LogEntry};
use super::config::EngineConfig;
use super::entity::{InstanceId, SessionId};
use super::phase::{Step, TurnNumbering};
use super::player::{PlayerId, Seat, SeatMap};
use crate::cards::{CardDefinition, CardId, InstanceStore};
use crate::combat::CombatState;
use crate::effects::Modifier;
use crate::error::{GameError, Result};
use crate::resources::Resources;
use crate::rules::{ForfeitReason, GameResult, OpeningHands, TurnCounters};
use crate::session::GameTimer;
use crate::stack::PriorityStack;
use crate::triggers::GameEvent;
use crate::zones::{Zone, ZoneLedger, ZonePosition};

/// Session lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Waiting,
    InProgress,
    Finished,
}

/// One seat's side of the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub resources: Resources,
    pub zones: ZoneLedger,
    /// Timed player modifiers (extra draws, extra mana).
    pub modifiers: Vec<Modifier>,
    /// A required draw found an empty deck.
    pub decked: bool,
    pub forfeit: Option<ForfeitReason>,
    /// Every instance dealt to this seat, sorted.
    pub dealt: Vec<InstanceId>,
}

/// A seated player and the deck they brought, top card first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeatSetup {
    pub player: PlayerId,
    pub deck: Vec<CardId>,
}

impl SeatSetup {
    #[must_use]
    pub fn new(player: PlayerId, deck: Vec<CardId>) -> Self {
        Self { player, deck }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub status: SessionStatus,
    /// Set when an internal invariant broke. A faulted session accepts nothing.
    pub faulted: bool,

    // === Turn ===
    pub turn: u32,
    pub turn_numbering: TurnNumbering,
    pub step: Step,
    pub active: Seat,
    /// Walking the rest of the turn without priority windows.
    pub ending_turn: bool,
    /// Opening hands still being decided. Turn 1 has not begun.
    pub opening: Option<OpeningHands>,
    pub turn_limit_reached: bool,

    // === Game objects ===
    pub players: SeatMap<PlayerState>,
    pub cards: InstanceStore,
    pub definitions: OrdMap<CardId, CardDefinition>,
    pub stack: PriorityStack,
    pub combat: Option<CombatState>,
    pub counters: SeatMap<TurnCounters>,

    // === Pipeline ===
    pub log: Vector<LogEntry>,
    /// System follow-ups waiting to run, oldest first.
    pub pending: Vector<Action>,
    pub result: Option<GameResult>,

    pub timer: GameTimer,
    pub config: EngineConfig,

    pub started_at: Option<DateTime<Utc>>,
    pub last_update_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Build a session with both decks dealt (no cards drawn yet).
    ///
    /// Each deck lists card ids top first. Every id must have a definition.
    pub fn new(
        id: SessionId,
        config: EngineConfig,
        first: SeatSetup,
        second: SeatSetup,
        definitions: impl IntoIterator<Item = CardDefinition>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        config.validate()?;
        if first.player == second.player {
            return Err(GameError::invalid_action("a player cannot sit in both seats"));
        }
        let definitions: OrdMap<CardId, CardDefinition> =
            definitions.into_iter().map(|def| (def.id, def)).collect();

        let mut cards = InstanceStore::new();
        let mut seat_state = |seat: Seat, setup: &SeatSetup| -> Result<PlayerState> {
            let mut zones = ZoneLedger::new();
            let mut dealt = Vec::with_capacity(setup.deck.len());
            // Deal bottom-up so the first listed card ends on top.
            for card_id in setup.deck.iter().rev() {
                let definition = definitions
                    .get(card_id)
                    .ok_or_else(|| GameError::not_found(card_id))?;
                let instance = cards.create(definition, seat, Zone::Deck);
                zones.place(instance, Zone::Deck, ZonePosition::Top);
                dealt.push(instance);
            }
            dealt.sort_unstable();
            Ok(PlayerState {
                id: setup.player,
                resources: Resources::new(config.rules.starting_life),
                zones,
                modifiers: Vec::new(),
                decked: false,
                forfeit: None,
                dealt,
            })
        };
        let first_state = seat_state(Seat::First, &first)?;
        let second_state = seat_state(Seat::Second, &second)?;
        let timer = GameTimer::new(&config.timer);

        Ok(Self {
            id,
            status: SessionStatus::Waiting,
            faulted: false,
            turn: 1,
            turn_numbering: TurnNumbering::default(),
            step: Step::Untap,
            active: Seat::First,
            ending_turn: false,
            opening: None,
            turn_limit_reached: false,
            players: SeatMap::from_pair(first_state, second_state),
            cards,
            definitions,
            stack: PriorityStack::new(Seat::First),
            combat: None,
            counters: SeatMap::default(),
            log: Vector::new(),
            pending: Vector::new(),
            result: None,
            timer,
            config,
            started_at: None,
            last_update_at: now,
            finished_at: None,
        })
    }

    // === Lookup ===

    /// Seat of a player, `NotFound` if the player is not seated here.
    pub fn seat_of(&self, player: PlayerId) -> Result<Seat> {
        self.players
            .iter()
            .find(|(_, state)| state.id == player)
            .map(|(seat, _)| seat)
            .ok_or_else(|| GameError::not_found(player))
    }

    #[must_use]
    pub fn player_id(&self, seat: Seat) -> PlayerId {
        self.players[seat].id
    }

    #[must_use]
    pub fn definition(&self, card: CardId) -> Option<&CardDefinition> {
        self.definitions.get(&card)
    }

    /// Seat holding priority.
    #[must_use]
    pub fn priority_seat(&self) -> Seat {
        self.stack.holder()
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.status == SessionStatus::InProgress
    }

    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.result.and_then(|r| r.winner())
    }

    /// On the board and not a combat casualty waiting to be buried.
    #[must_use]
    pub fn is_in_play(&self, card: InstanceId) -> bool {
        self.cards.get(card).is_some_and(|c| c.zone == Zone::Board)
            && !self.combat.as_ref().is_some_and(|combat| combat.is_casualty(card))
    }

    /// Creatures `seat` controls on the board.
    #[must_use]
    pub fn creatures_on_board(&self, seat: Seat) -> usize {
        self.cards.on_board(seat).filter(|c| c.is_creature()).count()
    }

    // === Zone moves ===

    /// Move a card to `to` within its owner's ledger.
    ///
    /// Leaving the board resets the instance and takes it out of combat;
    /// entering the board records the turn for summoning sickness.
    pub fn move_card(&mut self, card: InstanceId, to: Zone, position: ZonePosition) -> Result<GameEvent> {
        let instance = self.cards.require(card)?;
        let (from, owner, card_id) = (instance.zone, instance.owner, instance.card_id);

        self.players[owner].zones.move_card(card, from, to, position)?;

        let turn = self.turn;
        let instance = self.cards.require_mut(card)?;
        if from == Zone::Board && to != Zone::Board {
            instance.reset_for_zone_change();
            if let Some(combat) = self.combat.as_mut() {
                combat.remove(card);
            }
        }
        instance.zone = to;
        if to == Zone::Board && from != Zone::Board {
            instance.entered_turn = Some(turn);
        }

        Ok(GameEvent::CardMoved {
            card,
            card_id,
            owner,
            from,
            to,
        })
    }

    /// Draw one card for `seat`. An empty deck marks the seat decked out.
    pub fn draw(&mut self, seat: Seat) -> Result<GameEvent> {
        match self.players[seat].zones.top_of_deck() {
            Some(card) => self.move_card(card, Zone::Hand, ZonePosition::Top),
            None => {
                self.players[seat].decked = true;
                Ok(GameEvent::DeckedOut { seat })
            }
        }
    }

    // === Invariants ===

    /// Check the structural invariants of the whole session.
    pub fn check_invariants(&self) -> Result<()> {
        let mut total = 0;
        for (seat, player) in self.players.iter() {
            let mut held: Vec<InstanceId> = player.zones.all_cards().collect();
            held.sort_unstable();
            if held != player.dealt {
                return Err(GameError::invalid_state(format!(
                    "{seat} holds {} cards but was dealt {}",
                    held.len(),
                    player.dealt.len()
                )));
            }
            for zone in Zone::ALL {
                for &card in player.zones.cards(zone) {
                    let instance = self.cards.require(card).map_err(|_| {
                        GameError::invalid_state(format!("{card} is in a ledger but not in the store"))
                    })?;
                    if instance.zone != zone || instance.owner != seat {
                        return Err(GameError::invalid_state(format!(
                            "{card} is listed in {seat}'s {zone} but records {} of {}",
                            instance.zone, instance.owner
                        )));
                    }
                }
            }
            total += player.dealt.len();
        }

        if total != self.cards.len() {
            return Err(GameError::invalid_state("instance store and ledgers disagree"));
        }
        if let Some(card) = self.cards.iter().find(|c| c.damage < 0) {
            return Err(GameError::invalid_state(format!("{} has negative damage", card.id)));
        }
        if self.turn == 0 {
            return Err(GameError::invalid_state("turn number below 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definitions() -> Vec<CardDefinition> {
        vec![
            CardDefinition::creature(CardId::new(1), "Grunt", 1, 3, 2),
            CardDefinition::spell(CardId::new(2), "Spark", 1),
        ]
    }

    fn session() -> Session {
        let a = SeatSetup::new(PlayerId::generate(), vec![CardId::new(1), CardId::new(2), CardId::new(1)]);
        let b = SeatSetup::new(PlayerId::generate(), vec![CardId::new(2), CardId::new(2)]);
        Session::new(SessionId::generate(), EngineConfig::default(), a, b, definitions(), Utc::now()).unwrap()
    }

    #[test]
    fn test_session_new_deals_decks() {
        let session = session();
        assert_eq!(session.status, SessionStatus::Waiting);
        assert_eq!(session.cards.len(), 5);
        assert_eq!(session.players[Seat::First].zones.count(Zone::Deck), 3);
        assert_eq!(session.players[Seat::Second].resources.health, 20);
        session.check_invariants().unwrap();
    }

    #[test]
    fn test_first_listed_card_is_on_top() {
        let a = SeatSetup::new(PlayerId::generate(), vec![CardId::new(1), CardId::new(2), CardId::new(2)]);
        let b = SeatSetup::new(PlayerId::generate(), vec![CardId::new(2), CardId::new(1)]);
        let mut session =
            Session::new(SessionId::generate(), EngineConfig::default(), a, b, definitions(), Utc::now()).unwrap();

        match session.draw(Seat::First).unwrap() {
            GameEvent::CardMoved { card_id, to, .. } => {
                assert_eq!(card_id, CardId::new(1));
                assert_eq!(to, Zone::Hand);
            }
            other => panic!("unexpected event {other:?}"),
        }
        match session.draw(Seat::Second).unwrap() {
            GameEvent::CardMoved { card_id, .. } => assert_eq!(card_id, CardId::new(2)),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_unknown_card_rejected() {
        let a = SeatSetup::new(PlayerId::generate(), vec![CardId::new(99)]);
        let b = SeatSetup::new(PlayerId::generate(), vec![]);
        let err = Session::new(SessionId::generate(), EngineConfig::default(), a, b, definitions(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, GameError::NotFound(_)));
    }

    #[test]
    fn test_draw_from_empty_deck_decks_out() {
        let mut session = session();
        session.draw(Seat::Second).unwrap();
        session.draw(Seat::Second).unwrap();
        assert_eq!(session.draw(Seat::Second).unwrap(), GameEvent::DeckedOut { seat: Seat::Second });
        assert!(session.players[Seat::Second].decked);
    }

    #[test]
    fn test_move_card_tracks_zone_and_entry_turn() {
        let mut session = session();
        session.draw(Seat::First).unwrap();
        let card = session.players[Seat::First].zones.cards(Zone::Hand)[0];

        session.move_card(card, Zone::Board, ZonePosition::Top).unwrap();
        let instance = session.cards.get(card).unwrap();
        assert_eq!(instance.zone, Zone::Board);
        assert_eq!(instance.entered_turn, Some(1));
        session.check_invariants().unwrap();

        session.cards.get_mut(card).unwrap().damage = 1;
        session.move_card(card, Zone::Graveyard, ZonePosition::Top).unwrap();
        let instance = session.cards.get(card).unwrap();
        assert_eq!(instance.damage, 0);
        assert_eq!(instance.entered_turn, None);
        session.check_invariants().unwrap();
    }

    #[test]
    fn test_invariants_catch_mismatched_zone() {
        let mut session = session();
        let card = session.players[Seat::First].zones.top_of_deck().unwrap();
        session.cards.get_mut(card).unwrap().zone = Zone::Hand;
        assert!(matches!(
            session.check_invariants(),
            Err(GameError::InvalidGameState(_))
        ));
    }

    #[test]
    fn test_seat_of_unknown_player() {
        let session = session();
        assert!(matches!(session.seat_of(PlayerId::generate()), Err(GameError::NotFound(_))));
        let first = session.player_id(Seat::First);
        assert_eq!(session.seat_of(first).unwrap(), Seat::First);
    }
}

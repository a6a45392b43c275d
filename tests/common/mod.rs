//! Shared fixtures for the integration tests.
//!
//! A fixed catalog of small cards and a `Table` that drives one session
//! through the pipeline with a fixed time.

#![allow(dead_code)]

use ccg_session::cards::{ActivatedAbility, CardDefinition, CardId, CardRegistry, DeckId, Keyword, TriggerCondition, TriggeredAbility};
use ccg_session::core::{
    Action, ActionKind, EngineConfig, InstanceId, PlayerId, Seat, SeatSetup, Session, SessionId, Step,
};
use ccg_session::effects::{Effect, Recipient, TargetSpec};
use ccg_session::error::Result;
use ccg_session::resources::Cost;
use ccg_session::rules::turn;
use ccg_session::session::{ActionResult, Pipeline};
use ccg_session::zones::{Zone, ZonePosition};
use chrono::{DateTime, TimeZone, Utc};

pub const GRUNT: CardId = CardId::new(1);
pub const BOLT: CardId = CardId::new(2);
pub const NEGATE: CardId = CardId::new(3);
pub const OGRE: CardId = CardId::new(4);
pub const GUARD: CardId = CardId::new(5);
pub const STRIKER: CardId = CardId::new(6);
pub const TRAMPLER: CardId = CardId::new(7);
pub const MYSTIC: CardId = CardId::new(8);
pub const BEAR: CardId = CardId::new(9);
pub const WALL: CardId = CardId::new(10);
pub const SHAMAN: CardId = CardId::new(11);
pub const VIPER: CardId = CardId::new(12);
pub const DUELIST: CardId = CardId::new(13);
pub const SENTRY: CardId = CardId::new(14);
pub const RECALL: CardId = CardId::new(15);
pub const GROWTH: CardId = CardId::new(16);

pub const STANDARD_DECK: DeckId = DeckId::new(1);

pub fn definitions() -> Vec<CardDefinition> {
    vec![
        CardDefinition::creature(GRUNT, "Grunt", 1, 3, 2),
        CardDefinition::spell(BOLT, "Bolt", 1)
            .with_target(TargetSpec::CreatureOrPlayer)
            .with_effect(Effect::damage(3), Recipient::Target),
        CardDefinition::spell(NEGATE, "Negate", 1)
            .with_target(TargetSpec::StackItem)
            .with_effect(Effect::Counter, Recipient::Target),
        CardDefinition::creature(OGRE, "Ogre", 1, 5, 4),
        CardDefinition::creature(GUARD, "Guard", 1, 3, 2),
        CardDefinition::creature(STRIKER, "Striker", 1, 2, 1).with_keyword(Keyword::FirstStrike),
        CardDefinition::creature(TRAMPLER, "Trampler", 1, 4, 4).with_keyword(Keyword::Trample),
        CardDefinition::creature(MYSTIC, "Mystic", 1, 1, 1).with_trigger(
            TriggeredAbility::new(TriggerCondition::Dies).with_effect(Effect::draw(1), Recipient::Controller),
        ),
        CardDefinition::creature(BEAR, "Bear", 2, 2, 2),
        CardDefinition::creature(WALL, "Wall", 1, 0, 6).with_keyword(Keyword::Indestructible),
        CardDefinition::creature(SHAMAN, "Shaman", 1, 1, 1).with_ability(
            ActivatedAbility::new("Ping", Cost::free())
                .tapping()
                .with_target(TargetSpec::CreatureOrPlayer)
                .with_effect(Effect::damage(1), Recipient::Target),
        ),
        CardDefinition::creature(VIPER, "Viper", 1, 1, 1).with_keyword(Keyword::Deathtouch),
        CardDefinition::creature(DUELIST, "Duelist", 1, 2, 2).with_keyword(Keyword::DoubleStrike),
        CardDefinition::creature(SENTRY, "Sentry", 1, 2, 3).with_keyword(Keyword::Vigilance),
        CardDefinition::spell(RECALL, "Recall", 1)
            .with_target(TargetSpec::Creature)
            .with_effect(Effect::Bounce, Recipient::Target),
        CardDefinition::spell(GROWTH, "Growth", 1)
            .with_target(TargetSpec::Creature)
            .with_effect(Effect::pump(3, 3), Recipient::Target),
    ]
}

pub fn catalog() -> CardRegistry {
    let mut registry = CardRegistry::new();
    for definition in definitions() {
        registry.register(definition).unwrap();
    }
    registry.add_deck(STANDARD_DECK, None, standard_deck()).unwrap();
    registry
}

/// Twenty cards cycling through the whole catalog.
pub fn standard_deck() -> Vec<CardId> {
    definitions().iter().map(|d| d.id).cycle().take(20).collect()
}

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
}

/// One started session driven directly through the pipeline.
pub struct Table {
    pub session: Session,
    pub a: PlayerId,
    pub b: PlayerId,
    pub now: DateTime<Utc>,
}

impl Table {
    /// Decks are listed top first and dealt unshuffled. Clocks are off.
    pub fn new(deck_a: Vec<CardId>, deck_b: Vec<CardId>) -> Self {
        Self::with_config(deck_a, deck_b, EngineConfig::default().without_clocks())
    }

    pub fn with_config(deck_a: Vec<CardId>, deck_b: Vec<CardId>, config: EngineConfig) -> Self {
        let (a, b) = (PlayerId::generate(), PlayerId::generate());
        let now = epoch();
        let mut session = Session::new(
            SessionId::generate(),
            config,
            SeatSetup::new(a, deck_a),
            SeatSetup::new(b, deck_b),
            definitions(),
            now,
        )
        .unwrap();
        turn::start_game(&mut session, now).unwrap();
        Self { session, a, b, now }
    }

    /// Opening hands are decided in a mulligan window.
    pub fn with_mulligan(deck_a: Vec<CardId>, deck_b: Vec<CardId>) -> Self {
        Self::with_config(deck_a, deck_b, EngineConfig::default().without_clocks().with_mulligan(true))
    }

    /// Both decks are twenty grunts.
    pub fn grunts() -> Self {
        Self::new(vec![GRUNT; 20], vec![GRUNT; 20])
    }

    pub fn player(&self, seat: Seat) -> PlayerId {
        self.session.player_id(seat)
    }

    pub fn act(&mut self, seat: Seat, kind: ActionKind) -> Result<ActionResult> {
        let action = Action::player(self.player(seat), kind);
        Pipeline::submit(&mut self.session, action, self.now)
    }

    /// Pass with whoever holds priority.
    pub fn pass(&mut self) -> ActionResult {
        let holder = self.session.priority_seat();
        self.act(holder, ActionKind::PassPriority).unwrap()
    }

    /// Pass until the session reaches `step` (of any turn).
    pub fn pass_until(&mut self, step: Step) {
        for _ in 0..200 {
            if self.session.step == step {
                return;
            }
            self.pass();
        }
        panic!("never reached {step}");
    }

    pub fn end_turn(&mut self) -> ActionResult {
        let active = self.session.active;
        self.act(active, ActionKind::EndTurn).unwrap()
    }

    pub fn zone(&self, seat: Seat, zone: Zone) -> Vec<InstanceId> {
        self.session.players[seat].zones.cards(zone).iter().copied().collect()
    }

    /// First card of a definition in a seat's hand.
    pub fn in_hand(&self, seat: Seat, card: CardId) -> InstanceId {
        self.find(seat, Zone::Hand, card)
            .unwrap_or_else(|| panic!("{card} not in {seat}'s hand"))
    }

    pub fn find(&self, seat: Seat, zone: Zone, card: CardId) -> Option<InstanceId> {
        self.zone(seat, zone)
            .into_iter()
            .find(|&id| self.session.cards.get(id).is_some_and(|c| c.card_id == card))
    }

    /// Put a card of `card` from hand or deck straight onto the board,
    /// ready to attack or block.
    pub fn summon(&mut self, seat: Seat, card: CardId) -> InstanceId {
        let id = self
            .find(seat, Zone::Hand, card)
            .or_else(|| self.find(seat, Zone::Deck, card))
            .unwrap_or_else(|| panic!("{seat} has no {card} left"));
        self.session.move_card(id, Zone::Board, ZonePosition::Top).unwrap();
        self.session.cards.get_mut(id).unwrap().entered_turn = Some(0);
        id
    }

    pub fn health(&self, seat: Seat) -> i64 {
        self.session.players[seat].resources.health
    }

    pub fn set_mana(&mut self, seat: Seat, mana: u32) {
        let resources = &mut self.session.players[seat].resources;
        resources.mana_cap = resources.mana_cap.max(mana);
        resources.mana = mana;
    }
}

//! Session manager: the table of live sessions and its locking discipline.
//!
//! ## Concurrency
//!
//! A `RwLock` guards the table itself and is held only long enough to find
//! or insert an entry. Each session then sits behind its own `FairMutex`,
//! which is the session's critical section: at most one action is ever
//! applied to a session at a time, waiting submitters are served in FIFO
//! order, and sessions never contend with each other once looked up.
//!
//! Every committed change is written to the [`SessionStore`] before the
//! session lock is released.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{FairMutex, RwLock};
use rustc_hash::FxHashMap;

use crate::cards::{CardCatalog, CardDefinition, CardId, DeckId};
use crate::core::{
    Action, ActionKind, Clock, EngineConfig, GameRng, PlayerId, Seat, SeatSetup, Session, SessionId,
    SessionStatus,
};
use crate::error::{GameError, Result};
use crate::rules::{turn, ForfeitReason};

use super::pipeline::{ActionResult, Pipeline};
use super::store::{Lobby, SessionRecord, SessionStore};
use super::timer::ExpiryKind;
use super::view::PlayerView;

type Entry = Arc<FairMutex<SessionRecord>>;

/// Injected clock actions are capped per session per sweep.
const MAX_ENFORCEMENTS: usize = 4;

pub struct SessionManager<S, C, K> {
    store: S,
    catalog: C,
    clock: K,
    config: EngineConfig,
    sessions: RwLock<FxHashMap<SessionId, Entry>>,
}

impl<S: SessionStore, C: CardCatalog, K: Clock> SessionManager<S, C, K> {
    pub fn new(store: S, catalog: C, clock: K, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            catalog,
            clock,
            config,
            sessions: RwLock::new(FxHashMap::default()),
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Sessions currently held in memory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    // === Lifecycle ===

    /// Open a session with `player` in the first seat.
    pub fn create(&self, player: PlayerId, deck: DeckId) -> Result<SessionId> {
        let id = SessionId::generate();
        let mut cards = self.resolve_deck(player, deck)?;
        GameRng::new(id.seed()).for_seat(Seat::First).shuffle(&mut cards);

        let lobby = Lobby {
            id,
            creator: player,
            deck: cards,
            created_at: self.clock.now(),
        };
        let record = SessionRecord::Waiting(lobby);
        self.store.save(id, record.encode()?)?;
        self.sessions.write().insert(id, Arc::new(FairMutex::new(record)));

        tracing::info!(session = %id, player = %player, "session created");
        Ok(id)
    }

    /// Seat `player` second, deal both decks and start turn 1.
    pub fn join(&self, id: SessionId, player: PlayerId, deck: DeckId) -> Result<PlayerView> {
        let entry = self.entry(id)?;
        let mut record = entry.lock();
        let SessionRecord::Waiting(lobby) = &*record else {
            return Err(GameError::invalid_action(format!("session {id} already started")));
        };
        if lobby.creator == player {
            return Err(GameError::invalid_action("cannot join your own session"));
        }

        let mut cards = self.resolve_deck(player, deck)?;
        GameRng::new(id.seed()).for_seat(Seat::Second).shuffle(&mut cards);
        let definitions = self.definitions(lobby.deck.iter().chain(cards.iter()))?;

        let now = self.clock.now();
        let mut session = Session::new(
            id,
            self.config.clone(),
            SeatSetup::new(lobby.creator, lobby.deck.clone()),
            SeatSetup::new(player, cards),
            definitions,
            now,
        )?;
        turn::start_game(&mut session, now)?;
        session.check_invariants()?;

        let view = PlayerView::build(&session, Seat::Second, now);
        let live = SessionRecord::Live(session);
        self.store.save(id, live.encode()?)?;
        *record = live;

        tracing::info!(session = %id, player = %player, "session joined, game started");
        Ok(view)
    }

    /// Run one action through the session's pipeline.
    pub fn submit(&self, id: SessionId, action: Action) -> Result<ActionResult> {
        let entry = self.entry(id)?;
        let mut record = entry.lock();
        let now = self.clock.now();
        self.submit_locked(&mut record, action, now)
    }

    /// Redacted view of the session for `player`.
    pub fn view(&self, id: SessionId, player: PlayerId) -> Result<PlayerView> {
        let entry = self.entry(id)?;
        let record = entry.lock();
        match &*record {
            SessionRecord::Live(session) => {
                let seat = session.seat_of(player)?;
                Ok(PlayerView::build(session, seat, self.clock.now()))
            }
            SessionRecord::Waiting(lobby) if lobby.creator == player => {
                Err(GameError::invalid_action(format!("session {id} is waiting for a second player")))
            }
            SessionRecord::Waiting(_) => Err(GameError::not_found(player)),
        }
    }

    /// Disconnect-derived forfeit of `player`.
    pub fn forfeit(&self, id: SessionId, player: PlayerId) -> Result<ActionResult> {
        let action = Action::system(
            player,
            ActionKind::Forfeit {
                reason: ForfeitReason::Disconnected,
            },
        );
        self.submit(id, action)
    }

    /// Inject the system action for every expired clock.
    ///
    /// A turn stint that ran out passes priority (or keeps the opening
    /// hand), an exhausted pause budget resumes the clock and an exhausted
    /// game clock forfeits the game.
    pub fn enforce_clocks(&self) -> Vec<(SessionId, ActionResult)> {
        let mut applied = Vec::new();
        for (id, entry) in self.entries() {
            let mut record = entry.lock();
            for _ in 0..MAX_ENFORCEMENTS {
                let now = self.clock.now();
                let SessionRecord::Live(session) = &*record else {
                    break;
                };
                if !session.is_in_progress() || session.faulted {
                    break;
                }
                let Some(expiry) = session.timer.expired(now) else {
                    break;
                };
                let player = session.player_id(expiry.seat);
                let kind = match expiry.kind {
                    ExpiryKind::Turn if session.opening.is_some() => ActionKind::KeepHand,
                    ExpiryKind::Turn => ActionKind::PassPriority,
                    ExpiryKind::Pause => ActionKind::ResumeClock,
                    ExpiryKind::Game => ActionKind::Forfeit {
                        reason: ForfeitReason::Timeout,
                    },
                };
                tracing::warn!(session = %id, player = %player, action = kind.name(), ?expiry, "clock expired");

                match self.submit_locked(&mut record, Action::system(player, kind), now) {
                    Ok(result) => applied.push((id, result)),
                    Err(err) => {
                        tracing::warn!(session = %id, error = %err, "clock enforcement rejected");
                        break;
                    }
                }
            }
        }
        applied
    }

    /// Forfeit the seat holding priority in every game that has gone
    /// without a committed action for longer than the inactivity timeout.
    pub fn expire_inactive(&self) -> Vec<(SessionId, ActionResult)> {
        let timeout = self.config.session.inactivity_timeout;
        if timeout == 0 {
            return Vec::new();
        }
        let mut applied = Vec::new();
        for (id, entry) in self.entries() {
            let mut record = entry.lock();
            let now = self.clock.now();
            let SessionRecord::Live(session) = &*record else {
                continue;
            };
            if !session.is_in_progress() || session.faulted {
                continue;
            }
            let idle = elapsed_secs(session.last_update_at, now);
            if idle <= timeout {
                continue;
            }
            let player = session.player_id(session.priority_seat());
            tracing::warn!(session = %id, player = %player, idle, "session inactive");

            let kind = ActionKind::Forfeit {
                reason: ForfeitReason::Inactive,
            };
            match self.submit_locked(&mut record, Action::system(player, kind), now) {
                Ok(result) => applied.push((id, result)),
                Err(err) => tracing::warn!(session = %id, error = %err, "inactivity forfeit rejected"),
            }
        }
        applied
    }

    /// Drop finished sessions past retention and lobbies nobody joined.
    pub fn purge_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let retention = self.config.session.retention;
        let waiting_timeout = self.config.session.waiting_timeout;

        let mut expired = Vec::new();
        for (id, entry) in self.entries() {
            let record = entry.lock();
            let stale = match &*record {
                SessionRecord::Waiting(lobby) => elapsed_secs(lobby.created_at, now) >= waiting_timeout,
                SessionRecord::Live(session) => match (session.status, session.finished_at) {
                    (SessionStatus::Finished, Some(at)) => elapsed_secs(at, now) >= retention,
                    _ => false,
                },
            };
            if stale {
                expired.push(id);
            }
        }

        for &id in &expired {
            self.store.delete(id)?;
            self.sessions.write().remove(&id);
            tracing::info!(session = %id, "session purged");
        }
        Ok(expired.len())
    }

    /// Bring a stored session into memory. A no-op when already loaded.
    pub fn load(&self, id: SessionId) -> Result<()> {
        self.entry(id).map(|_| ())
    }

    /// Copy of the full record, for persistence checks and operators.
    pub fn snapshot(&self, id: SessionId) -> Result<SessionRecord> {
        Ok(self.entry(id)?.lock().clone())
    }

    // === Internals ===

    fn submit_locked(&self, record: &mut SessionRecord, action: Action, now: DateTime<Utc>) -> Result<ActionResult> {
        let id = record.id();
        let SessionRecord::Live(session) = record else {
            return Err(GameError::invalid_action(format!("session {id} has not started")));
        };
        let outcome = Pipeline::submit(session, action, now);
        // Rejections leave the session untouched; faults must be persisted.
        if outcome.as_ref().map_or_else(GameError::is_fatal, |_| true) {
            self.store.save(id, record.encode()?)?;
        }
        outcome
    }

    fn entries(&self) -> Vec<(SessionId, Entry)> {
        self.sessions
            .read()
            .iter()
            .map(|(id, entry)| (*id, Arc::clone(entry)))
            .collect()
    }

    /// The session's entry, loading it from the store if needed.
    fn entry(&self, id: SessionId) -> Result<Entry> {
        if let Some(entry) = self.sessions.read().get(&id) {
            return Ok(Arc::clone(entry));
        }
        let bytes = self.store.load(id)?.ok_or_else(|| GameError::not_found(id))?;
        let record = SessionRecord::decode(&bytes)?;
        if record.id() != id {
            return Err(GameError::Persistence(format!("record stored under {id} belongs to {}", record.id())));
        }
        let entry = Arc::clone(
            self.sessions
                .write()
                .entry(id)
                .or_insert_with(|| Arc::new(FairMutex::new(record))),
        );
        tracing::debug!(session = %id, "session loaded from store");
        Ok(entry)
    }

    fn resolve_deck(&self, player: PlayerId, deck: DeckId) -> Result<Vec<CardId>> {
        let cards = self
            .catalog
            .deck(player, deck)
            .ok_or_else(|| GameError::not_found(deck))?;
        if cards.is_empty() {
            return Err(GameError::invalid_action(format!("{deck} is empty")));
        }
        Ok(cards)
    }

    fn definitions<'a>(&self, cards: impl Iterator<Item = &'a CardId>) -> Result<Vec<CardDefinition>> {
        let mut ids: Vec<CardId> = cards.copied().collect();
        ids.sort_unstable();
        ids.dedup();
        ids.into_iter()
            .map(|id| self.catalog.definition(id).ok_or_else(|| GameError::not_found(id)))
            .collect()
    }
}

fn elapsed_secs(since: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    u64::try_from((now - since).num_seconds()).unwrap_or(0)
}

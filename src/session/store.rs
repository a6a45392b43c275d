//! Persistence boundary.
//!
//! The engine writes one opaque record per session id. [`SessionRecord`]
//! is what goes into the record: a lobby still waiting for its second
//! player, or a live session. Records are bincode-encoded; the store only
//! ever sees bytes.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::core::{PlayerId, Session, SessionId, SessionStatus};
use crate::error::{GameError, Result};

/// A session created by one player and waiting for the other.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lobby {
    pub id: SessionId,
    pub creator: PlayerId,
    /// Already shuffled, top first.
    pub deck: Vec<CardId>,
    pub created_at: DateTime<Utc>,
}

/// Everything persisted for one session id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionRecord {
    Waiting(Lobby),
    Live(Session),
}

impl SessionRecord {
    #[must_use]
    pub fn id(&self) -> SessionId {
        match self {
            SessionRecord::Waiting(lobby) => lobby.id,
            SessionRecord::Live(session) => session.id,
        }
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        match self {
            SessionRecord::Waiting(_) => SessionStatus::Waiting,
            SessionRecord::Live(session) => session.status,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| GameError::Persistence(format!("encode {}: {e}", self.id())))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| GameError::Persistence(format!("decode: {e}")))
    }
}

/// Storage for encoded session records.
///
/// The manager is the only writer for a session id while it holds that
/// session's lock; implementations need no locking of their own beyond
/// what makes them `Sync`.
pub trait SessionStore: Send + Sync {
    fn load(&self, id: SessionId) -> Result<Option<Vec<u8>>>;
    fn save(&self, id: SessionId, bytes: Vec<u8>) -> Result<()>;
    fn delete(&self, id: SessionId) -> Result<()>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<FxHashMap<SessionId, Vec<u8>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self, id: SessionId) -> Result<Option<Vec<u8>>> {
        Ok(self.records.lock().get(&id).cloned())
    }

    fn save(&self, id: SessionId, bytes: Vec<u8>) -> Result<()> {
        self.records.lock().insert(id, bytes);
        Ok(())
    }

    fn delete(&self, id: SessionId) -> Result<()> {
        self.records.lock().remove(&id);
        Ok(())
    }
}

impl<S: SessionStore + ?Sized> SessionStore for std::sync::Arc<S> {
    fn load(&self, id: SessionId) -> Result<Option<Vec<u8>>> {
        (**self).load(id)
    }

    fn save(&self, id: SessionId, bytes: Vec<u8>) -> Result<()> {
        (**self).save(id, bytes)
    }

    fn delete(&self, id: SessionId) -> Result<()> {
        (**self).delete(id)
    }
}

//! Session plumbing around the rules core.
//!
//! ## Key Components
//!
//! - [`Pipeline`]: validates, applies and logs one action at a time
//! - [`GameTimer`]: per-seat clocks, pause budget, expiry detection
//! - [`PlayerView`]: the redacted projection sent to one client
//! - [`SessionStore`] / [`SessionRecord`]: the persistence boundary
//! - [`SessionManager`]: the session table, per-session locking, lifecycle
//!
//! ## Example
//!
//! ```
//! use ccg_session::cards::{CardDefinition, CardId, CardRegistry, DeckId};
//! use ccg_session::core::{Action, ActionKind, EngineConfig, PlayerId, SystemClock};
//! use ccg_session::session::{MemoryStore, SessionManager};
//!
//! let mut catalog = CardRegistry::new();
//! catalog.register(CardDefinition::creature(CardId::new(1), "Bear", 2, 2, 2)).unwrap();
//! catalog.add_deck(DeckId::new(1), None, vec![CardId::new(1); 20]).unwrap();
//!
//! let manager = SessionManager::new(MemoryStore::new(), catalog, SystemClock, EngineConfig::default()).unwrap();
//! let (alice, bob) = (PlayerId::generate(), PlayerId::generate());
//! let id = manager.create(alice, DeckId::new(1)).unwrap();
//! manager.join(id, bob, DeckId::new(1)).unwrap();
//!
//! let result = manager.submit(id, Action::player(alice, ActionKind::PassPriority)).unwrap();
//! assert_eq!(result.sequence, 1);
//! assert!(manager.view(id, bob).unwrap().permissions.has_priority);
//! ```

mod manager;
mod pipeline;
mod store;
mod timer;
mod view;

pub use manager::SessionManager;
pub use pipeline::{ActionResult, Pipeline};
pub use store::{Lobby, MemoryStore, SessionRecord, SessionStore};
pub use timer::{ClockReading, Expiry, ExpiryKind, GameTimer, PlayerClock};
pub use view::{CardView, Permissions, PlayerView, PublicZones, SeatView};

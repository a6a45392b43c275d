//! Core session types: identifiers, seats, configuration, steps, clocks,
//! actions and the session aggregate.
//!
//! Everything else in the crate builds on these. The session itself is
//! plain data; the rules that move it forward live in `rules`, `combat`
//! and `effects`, and the only way in from outside is the `session`
//! pipeline.

pub mod action;
pub mod clock;
pub mod config;
pub mod entity;
pub mod phase;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{Action, ActionKind, ActionOrigin, LogEntry};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ActionLimits, EngineConfig, RulesConfig, SessionConfig, TimerConfig};
pub use entity::{ActionId, InstanceId, SessionId, StackItemId};
pub use phase::{Phase, Step, TurnNumbering};
pub use player::{PlayerId, Seat, SeatMap};
pub use rng::GameRng;
pub use state::{PlayerState, SeatSetup, Session, SessionStatus};

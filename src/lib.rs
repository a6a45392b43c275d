//! # ccg-session
//!
//! Authoritative session engine for a two-player trading card game.
//!
//! ## Design Principles
//!
//! 1. **One writer per session**: every change goes through the action
//!    pipeline, one action at a time, behind the session's own lock.
//!
//! 2. **All or nothing**: an action is validated before anything changes,
//!    and a failure while applying restores the pre-action snapshot.
//!
//! 3. **Ids, not pointers**: cards, zones and players refer to each other by
//!    id, so a session clones, snapshots and serializes as plain data.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: zone lists, the instance arena, the
//!   stack and the action log are `im` collections, so the rollback
//!   snapshot the pipeline takes before each action is O(1).
//!
//! - **Closed vocabularies**: actions, effects, events and errors are
//!   tagged enums dispatched through single match tables.
//!
//! ## Modules
//!
//! - `core`: ids, seats, configuration, steps, clocks, actions, the session
//! - `zones`: per-seat zone ledgers
//! - `cards`: card definitions, keywords, the instance store, the catalog
//! - `resources`: health, mana and energy
//! - `effects`: effect vocabulary, targeting, the effect resolver
//! - `triggers`: game events and triggered abilities
//! - `stack`: the stack and the priority window
//! - `combat`: declarations, damage assignment, casualties
//! - `rules`: the turn machine, opening hands, action caps, win/loss evaluation
//! - `session`: the pipeline, timer, redacted views, persistence, manager

pub mod cards;
pub mod combat;
pub mod core;
pub mod effects;
pub mod error;
pub mod resources;
pub mod rules;
pub mod session;
pub mod stack;
pub mod triggers;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionKind, ActionOrigin, Clock, EngineConfig, InstanceId, ManualClock, PlayerId, Seat,
    Session, SessionId, SessionStatus, Step, SystemClock,
};

pub use crate::cards::{CardCatalog, CardDefinition, CardId, CardRegistry, DeckId, Keyword};

pub use crate::combat::{Block, DamageAssignment};

pub use crate::effects::{Effect, Recipient, Target, TargetSpec};

pub use crate::error::{ErrorCode, GameError, Result};

pub use crate::rules::{GameResult, LossReason};

pub use crate::session::{ActionResult, MemoryStore, Pipeline, PlayerView, SessionManager};

pub use crate::triggers::GameEvent;

pub use crate::zones::Zone;

//! Events and triggered abilities.
//!
//! ## Key Components
//!
//! - [`GameEvent`]: closed set of things that can happen during an action
//! - [`collect`]: turns an action's events into `PutTrigger` follow-ups
//!
//! Triggered abilities are declared on card definitions
//! (`CardDefinition::triggers`); there is no separate trigger registration
//! step, since every card a session can see is dealt at creation.

mod event;
mod registry;

pub use event::GameEvent;
pub use registry::{collect, matching, PendingTrigger};

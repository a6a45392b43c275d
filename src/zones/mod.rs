//! Zone system: where every dealt card currently is.
//!
//! Each seat owns one `ZoneLedger` with five ordered lists (deck, hand,
//! board, graveyard, exile). The ledger is pure data plus the move contract;
//! keeping `CardInstance::zone` in step with it is the session's job.

pub mod ledger;

pub use ledger::{Zone, ZoneLedger, ZonePosition};

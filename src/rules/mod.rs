//! Game rules: the turn machine, action limits and win/loss evaluation.
//!
//! - `turn`: step transitions, priority windows, turn-based actions
//! - `limits`: per-turn action caps
//! - `mulligan`: the opening hand window
//! - `outcome`: loss conditions and the final result
//!
//! The pipeline calls into these; none of them validate who is asking.

mod limits;
pub mod mulligan;
pub mod outcome;
pub mod turn;

pub use limits::TurnCounters;
pub use mulligan::OpeningHands;
pub use outcome::{DrawReason, ForfeitReason, GameResult, LossReason};

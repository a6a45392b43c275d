//! Resource ledger: health, mana and energy per seat.

pub mod ledger;

pub use ledger::{Cost, Resources};

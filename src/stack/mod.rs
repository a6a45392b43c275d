//! Stack and priority.
//!
//! Spell cards and activated or triggered abilities wait on a LIFO stack
//! until both seats pass priority in succession; the top item then resolves
//! in full before anything below it is touched. Permanents do not use the
//! stack: playing a creature or artifact puts it on the board immediately.
//!
//! Resolving an item needs the whole session (effects reach zones, cards
//! and resources), so resolution lives in `effects::resolver`; this module
//! owns the ordering and the priority window.

mod priority;

pub use priority::{PassOutcome, PriorityStack, StackItem, StackItemKind};

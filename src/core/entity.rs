//! Identifiers for session-scoped objects.
//!
//! ## ID Layout
//!
//! - `SessionId`, `ActionId`: random v4 UUIDs, globally unique.
//! - `InstanceId`: per-session counter, allocated when a card is dealt.
//! - `StackItemId`: per-session counter, allocated on every push.
//!
//! Counter ids are never reused within a session, so a stale id in a
//! client request can only ever miss, never hit a different object.
//!
//! ```
//! use ccg_session::core::{InstanceId, StackItemId};
//!
//! let card = InstanceId::new(7);
//! assert_eq!(card.raw(), 7);
//! assert_eq!(card.to_string(), "Instance(7)");
//! assert_eq!(StackItemId::new(2).to_string(), "StackItem(2)");
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Runtime identity of one dealt card, distinct from its definition id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

impl InstanceId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Instance({})", self.0)
    }
}

/// Identity of one pushed spell or ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StackItemId(pub u32);

impl StackItemId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for StackItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StackItem({})", self.0)
    }
}

/// Unique session identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Allocate a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Seed for the session's deterministic shuffle.
    #[must_use]
    pub fn seed(self) -> u64 {
        let raw = self.0.as_u128();
        (raw as u64) ^ ((raw >> 64) as u64)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier of a submitted action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub Uuid);

impl ActionId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_ordering() {
        assert!(InstanceId(3) < InstanceId(10));
        assert_eq!(InstanceId::new(5).raw(), 5);
    }

    #[test]
    fn test_session_seed_is_stable() {
        let id = SessionId(Uuid::from_u128(0x0000_0000_0000_0001_0000_0000_0000_0003));
        assert_eq!(id.seed(), 2); // 3 ^ 1
        assert_eq!(id.seed(), id.seed());
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(SessionId::generate(), SessionId::generate());
        assert_ne!(ActionId::generate(), ActionId::generate());
    }

    #[test]
    fn test_serialization() {
        let id = InstanceId(123);
        let json = serde_json::to_string(&id).unwrap();
        let back: InstanceId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}

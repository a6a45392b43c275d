//! Timed modifiers on players and card instances.
//!
//! ## Expiry
//!
//! `duration` counts turn boundaries. It is decremented exactly once per
//! turn, when cleanup finishes, and a modifier at zero is removed in the
//! following untap step. Nothing expires while a stack item is waiting, so
//! an item resolving in the same window always sees the modifier.
//! `None` means permanent.

use serde::{Deserialize, Serialize};

use crate::cards::Keyword;

/// What a modifier changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKind {
    /// Creature power delta.
    Power,
    /// Creature toughness delta.
    Toughness,
    /// Grants a keyword; `value` is ignored.
    Grant(Keyword),
    /// Extra cards in the player's draw step.
    ExtraDraw,
    /// Extra mana at the player's turn start.
    ExtraMana,
}

impl ModifierKind {
    /// Whether this modifier applies to players rather than creatures.
    #[must_use]
    pub const fn is_player_modifier(self) -> bool {
        matches!(self, ModifierKind::ExtraDraw | ModifierKind::ExtraMana)
    }
}

/// `{type, value, duration}` modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifier {
    pub kind: ModifierKind,
    pub value: i64,
    pub duration: Option<u32>,
}

impl Modifier {
    #[must_use]
    pub const fn new(kind: ModifierKind, value: i64, duration: Option<u32>) -> Self {
        Self {
            kind,
            value,
            duration,
        }
    }

    /// Lasts until the end of the current turn.
    #[must_use]
    pub const fn until_end_of_turn(kind: ModifierKind, value: i64) -> Self {
        Self::new(kind, value, Some(1))
    }

    #[must_use]
    pub const fn is_expired(&self) -> bool {
        matches!(self.duration, Some(0))
    }

    /// One turn boundary passed.
    pub fn tick(&mut self) {
        if let Some(turns) = self.duration.as_mut() {
            *turns = turns.saturating_sub(1);
        }
    }
}

/// Tick every modifier in a list.
pub fn tick_all(modifiers: &mut [Modifier]) {
    modifiers.iter_mut().for_each(Modifier::tick);
}

/// Drop expired modifiers. Returns how many were removed.
pub fn remove_expired(modifiers: &mut Vec<Modifier>) -> usize {
    let before = modifiers.len();
    modifiers.retain(|m| !m.is_expired());
    before - modifiers.len()
}

/// Sum of `value` over modifiers of one kind.
pub fn total(modifiers: &[Modifier], kind: ModifierKind) -> i64 {
    modifiers
        .iter()
        .filter(|m| m.kind == kind)
        .map(|m| m.value)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_until_end_of_turn_lifecycle() {
        let mut mods = vec![
            Modifier::until_end_of_turn(ModifierKind::Power, 3),
            Modifier::new(ModifierKind::Toughness, 1, None),
            Modifier::new(ModifierKind::ExtraDraw, 1, Some(2)),
        ];

        tick_all(&mut mods);
        assert!(mods[0].is_expired());
        assert_eq!(total(&mods, ModifierKind::Power), 3); // still present until untap

        assert_eq!(remove_expired(&mut mods), 1);
        assert_eq!(mods.len(), 2);

        tick_all(&mut mods);
        assert_eq!(remove_expired(&mut mods), 1);
        assert_eq!(mods, vec![Modifier::new(ModifierKind::Toughness, 1, None)]);
    }

    #[test]
    fn test_player_modifier_kinds() {
        assert!(ModifierKind::ExtraMana.is_player_modifier());
        assert!(!ModifierKind::Grant(Keyword::Haste).is_player_modifier());
    }
}

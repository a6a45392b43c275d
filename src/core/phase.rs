//! Turn structure: detailed steps and the coarse phases they belong to.
//!
//! ## Legal edges
//!
//! ```text
//! untap → upkeep → draw → main1 → combat_begin → combat_attack
//!   → combat_block → combat_damage → combat_end → main2 → end → cleanup
//!   → untap (of the other seat)
//! ```
//!
//! `Step::next` is the only successor of every step; any other transition is
//! rejected by `Step::can_advance_to`.
//!
//! ```
//! use ccg_session::core::Step;
//!
//! assert_eq!(Step::CombatDamage.next(), Step::CombatEnd);
//! assert!(!Step::CombatDamage.can_advance_to(Step::Draw));
//! ```

use serde::{Deserialize, Serialize};

/// Detailed step within a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Untap,
    Upkeep,
    Draw,
    Main1,
    CombatBegin,
    CombatAttack,
    CombatBlock,
    CombatDamage,
    CombatEnd,
    Main2,
    End,
    Cleanup,
}

impl Step {
    /// The single legal successor.
    #[must_use]
    pub const fn next(self) -> Step {
        match self {
            Step::Untap => Step::Upkeep,
            Step::Upkeep => Step::Draw,
            Step::Draw => Step::Main1,
            Step::Main1 => Step::CombatBegin,
            Step::CombatBegin => Step::CombatAttack,
            Step::CombatAttack => Step::CombatBlock,
            Step::CombatBlock => Step::CombatDamage,
            Step::CombatDamage => Step::CombatEnd,
            Step::CombatEnd => Step::Main2,
            Step::Main2 => Step::End,
            Step::End => Step::Cleanup,
            Step::Cleanup => Step::Untap,
        }
    }

    #[must_use]
    pub fn can_advance_to(self, to: Step) -> bool {
        self.next() == to
    }

    /// Steps the engine runs through without opening a priority window.
    #[must_use]
    pub const fn is_automatic(self) -> bool {
        matches!(self, Step::Untap | Step::Upkeep | Step::Draw | Step::Cleanup)
    }

    #[must_use]
    pub const fn is_main(self) -> bool {
        matches!(self, Step::Main1 | Step::Main2)
    }

    #[must_use]
    pub const fn is_combat(self) -> bool {
        matches!(
            self,
            Step::CombatBegin
                | Step::CombatAttack
                | Step::CombatBlock
                | Step::CombatDamage
                | Step::CombatEnd
        )
    }

    #[must_use]
    pub const fn phase(self) -> Phase {
        match self {
            Step::Untap | Step::Upkeep | Step::Draw => Phase::Beginning,
            Step::Main1 | Step::Main2 => Phase::Main,
            Step::CombatBegin
            | Step::CombatAttack
            | Step::CombatBlock
            | Step::CombatDamage
            | Step::CombatEnd => Phase::Combat,
            Step::End | Step::Cleanup => Phase::End,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Step::Untap => "untap",
            Step::Upkeep => "upkeep",
            Step::Draw => "draw",
            Step::Main1 => "main1",
            Step::CombatBegin => "combat_begin",
            Step::CombatAttack => "combat_attack",
            Step::CombatBlock => "combat_block",
            Step::CombatDamage => "combat_damage",
            Step::CombatEnd => "combat_end",
            Step::Main2 => "main2",
            Step::End => "end",
            Step::Cleanup => "cleanup",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Coarse phase reported to clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Opening hands are being decided; no step has been entered yet.
    Mulligan,
    Beginning,
    Main,
    Combat,
    End,
}

/// How the turn counter advances. Stored on every session so a replay of
/// its action log reproduces the same turn numbers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnNumbering {
    /// +1 every time the active seat changes.
    #[default]
    PerPlayerTurn,
}

//! Per-turn action caps.

use serde::{Deserialize, Serialize};

use crate::core::{ActionKind, ActionLimits};
use crate::error::{GameError, Result};

/// What one seat has done this turn. Cleared when cleanup finishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnCounters {
    pub actions: u32,
    pub cards_played: u32,
    pub attacks: u32,
}

impl TurnCounters {
    /// Reject `kind` if it would exceed a cap.
    pub fn check(&self, kind: &ActionKind, limits: &ActionLimits) -> Result<()> {
        if !kind.counts_toward_limit() {
            return Ok(());
        }
        if self.actions >= limits.max_actions_per_turn {
            return Err(GameError::invalid_action(format!(
                "action limit of {} per turn reached",
                limits.max_actions_per_turn
            )));
        }
        match kind {
            ActionKind::PlayCard { .. } if self.cards_played >= limits.max_cards_played_per_turn => {
                Err(GameError::invalid_action(format!(
                    "card limit of {} per turn reached",
                    limits.max_cards_played_per_turn
                )))
            }
            ActionKind::DeclareAttackers { attackers }
                if self.attacks.saturating_add(attacker_count(attackers)) > limits.max_attacks_per_turn =>
            {
                Err(GameError::invalid_action(format!(
                    "attack limit of {} per turn exceeded",
                    limits.max_attacks_per_turn
                )))
            }
            _ => Ok(()),
        }
    }

    /// Count a committed action.
    pub fn record(&mut self, kind: &ActionKind) {
        if !kind.counts_toward_limit() {
            return;
        }
        self.actions += 1;
        match kind {
            ActionKind::PlayCard { .. } => self.cards_played += 1,
            ActionKind::DeclareAttackers { attackers } => {
                self.attacks = self.attacks.saturating_add(attacker_count(attackers));
            }
            _ => {}
        }
    }
}

fn attacker_count<T>(attackers: &[T]) -> u32 {
    u32::try_from(attackers.len()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::InstanceId;
    use crate::effects::Targets;

    fn play() -> ActionKind {
        ActionKind::PlayCard {
            card: InstanceId(1),
            targets: Targets::new(),
        }
    }

    #[test]
    fn test_card_cap() {
        let limits = ActionLimits {
            max_cards_played_per_turn: 1,
            ..ActionLimits::default()
        };
        let mut counters = TurnCounters::default();
        counters.check(&play(), &limits).unwrap();
        counters.record(&play());
        assert!(counters.check(&play(), &limits).is_err());
    }

    #[test]
    fn test_pass_is_never_capped() {
        let limits = ActionLimits {
            max_actions_per_turn: 0,
            ..ActionLimits::default()
        };
        let mut counters = TurnCounters::default();
        counters.check(&ActionKind::PassPriority, &limits).unwrap();
        counters.record(&ActionKind::PassPriority);
        assert_eq!(counters.actions, 0);
        assert!(counters.check(&play(), &limits).is_err());
    }

    #[test]
    fn test_attack_cap_counts_attackers() {
        let limits = ActionLimits {
            max_attacks_per_turn: 2,
            ..ActionLimits::default()
        };
        let counters = TurnCounters::default();
        let three = ActionKind::DeclareAttackers {
            attackers: vec![InstanceId(1), InstanceId(2), InstanceId(3)],
        };
        assert!(counters.check(&three, &limits).is_err());
    }

    #[test]
    fn test_attack_count_saturates() {
        assert_eq!(attacker_count(&[InstanceId(1), InstanceId(2)]), 2);
        let mut counters = TurnCounters {
            attacks: u32::MAX - 1,
            ..TurnCounters::default()
        };
        let two = ActionKind::DeclareAttackers {
            attackers: vec![InstanceId(1), InstanceId(2)],
        };
        assert!(counters.check(&two, &ActionLimits::default()).is_err());
        counters.record(&two);
        assert_eq!(counters.attacks, u32::MAX);
    }
}

//! Per-seat resource ledger: health, mana and energy.
//!
//! ## Rules
//!
//! - Spending more than the current balance fails with
//!   `InsufficientResources` and deducts nothing.
//! - Gains are unconditional.
//! - At the start of each of its turns a seat's mana cap grows by the
//!   configured step (up to the maximum) and mana refills to the cap.
//! - Energy and health persist across turns. Healing clamps at the maximum
//!   life; damage may take health below zero.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// A cost in mana and energy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cost {
    pub mana: u32,
    pub energy: u32,
}

impl Cost {
    #[must_use]
    pub const fn free() -> Self {
        Self { mana: 0, energy: 0 }
    }

    #[must_use]
    pub const fn mana(mana: u32) -> Self {
        Self { mana, energy: 0 }
    }

    #[must_use]
    pub const fn energy(energy: u32) -> Self {
        Self { mana: 0, energy }
    }
}

/// One seat's counters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resources {
    pub health: i64,
    pub mana: u32,
    pub mana_cap: u32,
    pub energy: u32,
    /// Mana spent since the last refill.
    pub mana_spent: u32,
}

impl Resources {
    #[must_use]
    pub fn new(health: i64) -> Self {
        Self {
            health,
            ..Self::default()
        }
    }

    pub fn spend_mana(&mut self, amount: u32) -> Result<()> {
        if amount > self.mana {
            return Err(GameError::InsufficientResources {
                resource: "mana",
                needed: amount,
                available: self.mana,
            });
        }
        self.mana -= amount;
        self.mana_spent += amount;
        Ok(())
    }

    pub fn spend_energy(&mut self, amount: u32) -> Result<()> {
        if amount > self.energy {
            return Err(GameError::InsufficientResources {
                resource: "energy",
                needed: amount,
                available: self.energy,
            });
        }
        self.energy -= amount;
        Ok(())
    }

    /// Check a cost without paying it.
    pub fn check(&self, cost: Cost) -> Result<()> {
        if cost.mana > self.mana {
            return Err(GameError::InsufficientResources {
                resource: "mana",
                needed: cost.mana,
                available: self.mana,
            });
        }
        if cost.energy > self.energy {
            return Err(GameError::InsufficientResources {
                resource: "energy",
                needed: cost.energy,
                available: self.energy,
            });
        }
        Ok(())
    }

    /// Pay a whole cost or nothing.
    pub fn pay(&mut self, cost: Cost) -> Result<()> {
        self.check(cost)?;
        self.spend_mana(cost.mana)?;
        self.spend_energy(cost.energy)
    }

    pub fn gain_mana(&mut self, amount: u32) {
        self.mana = self.mana.saturating_add(amount);
    }

    pub fn gain_energy(&mut self, amount: u32) {
        self.energy = self.energy.saturating_add(amount);
    }

    /// Mana back to the cap.
    pub fn refill(&mut self) {
        self.mana = self.mana_cap;
        self.mana_spent = 0;
    }

    /// Turn-start growth: raise the cap by `step` (bounded by `max`), then refill.
    pub fn start_turn(&mut self, step: u32, max: u32) {
        self.mana_cap = self.mana_cap.saturating_add(step).min(max);
        self.refill();
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.health -= i64::from(amount);
    }

    /// Heal, clamped at `max_life`. Returns the amount actually healed.
    pub fn heal(&mut self, amount: u32, max_life: i64) -> i64 {
        let before = self.health;
        self.health = (self.health + i64::from(amount)).min(max_life.max(before));
        self.health - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spend_within_balance() {
        let mut res = Resources::new(20);
        res.start_turn(1, 10);
        assert_eq!(res.mana, 1);

        res.spend_mana(1).unwrap();
        assert_eq!(res.mana, 0);
        assert_eq!(res.mana_spent, 1);
    }

    #[test]
    fn test_overspend_deducts_nothing() {
        let mut res = Resources::new(20);
        res.mana = 2;
        res.energy = 1;

        let err = res.pay(Cost { mana: 2, energy: 3 }).unwrap_err();
        assert!(matches!(err, GameError::InsufficientResources { resource: "energy", .. }));
        assert_eq!(res.mana, 2);
        assert_eq!(res.energy, 1);

        assert!(res.spend_mana(3).is_err());
        assert_eq!(res.mana, 2);
    }

    #[test]
    fn test_cap_growth_is_bounded() {
        let mut res = Resources::new(20);
        for _ in 0..15 {
            res.start_turn(1, 10);
        }
        assert_eq!(res.mana_cap, 10);
        assert_eq!(res.mana, 10);
    }

    #[test]
    fn test_heal_clamps() {
        let mut res = Resources::new(18);
        assert_eq!(res.heal(5, 20), 2);
        assert_eq!(res.health, 20);

        res.take_damage(25);
        assert_eq!(res.health, -5);
    }
}

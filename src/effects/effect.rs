//! Effect definitions.
//!
//! Effects are the closed vocabulary card text compiles to. A card or
//! ability carries a list of [`EffectSpec`]s, each pairing an effect with
//! the [`Recipient`] it applies to.
//!
//! ## Player effects
//!
//! `Damage`, `Heal`, `Draw`, `GainMana`, `GainEnergy`, `PlayerModifier`
//!
//! ## Creature / permanent effects
//!
//! `Damage`, `Heal`, `Pump`, `Grant`, `AddCounters`, `Destroy`, `Bounce`,
//! `Exile`
//!
//! ## Stack effects
//!
//! `Counter`
//!
//! An effect whose recipient is of the wrong kind fizzles instead of failing
//! the whole stack item.

use serde::{Deserialize, Serialize};

use crate::cards::Keyword;

use super::modifier::ModifierKind;

/// An atomic game effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Damage to a player (health) or creature (marked damage).
    Damage { amount: u32 },

    /// Restore health to a player or remove marked damage from a creature.
    Heal { amount: u32 },

    /// Draw cards. Drawing from an empty deck decks the player out.
    Draw { count: u32 },

    GainMana { amount: u32 },

    GainEnergy { amount: u32 },

    /// Power/toughness change on a creature.
    Pump {
        power: i64,
        toughness: i64,
        duration: Option<u32>,
    },

    /// Grant a keyword to a creature.
    Grant {
        keyword: Keyword,
        duration: Option<u32>,
    },

    /// Named counters; `"+1/+1"` and `"-1/-1"` change stats.
    AddCounters { counter: String, amount: i64 },

    /// Permanent to its owner's graveyard (unless indestructible).
    Destroy,

    /// Permanent back to its owner's hand.
    Bounce,

    /// Card to its owner's exile.
    Exile,

    /// Remove a stack item without running its effects.
    Counter,

    /// Timed modifier on a player (extra draws, extra mana).
    PlayerModifier {
        kind: ModifierKind,
        value: i64,
        duration: Option<u32>,
    },
}

impl Effect {
    #[must_use]
    pub const fn damage(amount: u32) -> Self {
        Self::Damage { amount }
    }

    #[must_use]
    pub const fn heal(amount: u32) -> Self {
        Self::Heal { amount }
    }

    #[must_use]
    pub const fn draw(count: u32) -> Self {
        Self::Draw { count }
    }

    /// Until-end-of-turn pump.
    #[must_use]
    pub const fn pump(power: i64, toughness: i64) -> Self {
        Self::Pump {
            power,
            toughness,
            duration: Some(1),
        }
    }

    #[must_use]
    pub fn counters(counter: impl Into<String>, amount: i64) -> Self {
        Self::AddCounters {
            counter: counter.into(),
            amount,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Effect::Damage { .. } => "damage",
            Effect::Heal { .. } => "heal",
            Effect::Draw { .. } => "draw",
            Effect::GainMana { .. } => "gain_mana",
            Effect::GainEnergy { .. } => "gain_energy",
            Effect::Pump { .. } => "pump",
            Effect::Grant { .. } => "grant",
            Effect::AddCounters { .. } => "add_counters",
            Effect::Destroy => "destroy",
            Effect::Bounce => "bounce",
            Effect::Exile => "exile",
            Effect::Counter => "counter",
            Effect::PlayerModifier { .. } => "player_modifier",
        }
    }
}

/// Who an effect applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recipient {
    /// Every chosen target of the card or ability.
    Target,
    /// The controller of the source.
    Controller,
    /// The controller's opponent.
    Opponent,
    /// The source card itself.
    Source,
}

/// An effect bound to its recipient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSpec {
    pub effect: Effect,
    pub recipient: Recipient,
}

impl EffectSpec {
    #[must_use]
    pub const fn new(effect: Effect, recipient: Recipient) -> Self {
        Self { effect, recipient }
    }

    #[must_use]
    pub const fn on_target(effect: Effect) -> Self {
        Self::new(effect, Recipient::Target)
    }

    #[must_use]
    pub const fn on_controller(effect: Effect) -> Self {
        Self::new(effect, Recipient::Controller)
    }

    #[must_use]
    pub const fn on_opponent(effect: Effect) -> Self {
        Self::new(effect, Recipient::Opponent)
    }

    #[must_use]
    pub const fn on_source(effect: Effect) -> Self {
        Self::new(effect, Recipient::Source)
    }
}

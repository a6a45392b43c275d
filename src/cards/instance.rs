//! Card instances - runtime card state.
//!
//! `CardInstance` represents one dealt card during a session: where it is,
//! whether it is tapped, its current stats, damage, counters and modifiers.
//! The definition it was dealt from is never mutated.
//!
//! ## Stats
//!
//! Current power/toughness are derived, never edited directly:
//! printed value + `"+1/+1"` counters - `"-1/-1"` counters + modifiers.
//! Call `refresh_stats` after changing any input.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::definition::{CardDefinition, CardId};
use super::keywords::{Keyword, Keywords};
use crate::core::{InstanceId, Seat};
use crate::effects::modifier::{self, Modifier, ModifierKind};
use crate::zones::Zone;

pub const PLUS_COUNTER: &str = "+1/+1";
pub const MINUS_COUNTER: &str = "-1/-1";

/// A card instance in a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    pub id: InstanceId,
    pub card_id: CardId,
    /// Seat that was dealt this card. Its ledger always holds the id.
    pub owner: Seat,
    /// Seat currently controlling it.
    pub controller: Seat,
    pub zone: Zone,
    pub tapped: bool,
    /// Printed stats, `None` unless a creature.
    pub base_power: Option<i64>,
    pub base_toughness: Option<i64>,
    pub power: Option<i64>,
    pub toughness: Option<i64>,
    pub base_keywords: Keywords,
    /// Marked damage, reset at cleanup and when leaving the board.
    pub damage: i64,
    pub counters: FxHashMap<String, i64>,
    pub modifiers: Vec<Modifier>,
    /// Turn the card last entered the board.
    pub entered_turn: Option<u32>,
}

impl CardInstance {
    #[must_use]
    pub fn new(id: InstanceId, definition: &CardDefinition, owner: Seat, zone: Zone) -> Self {
        Self {
            id,
            card_id: definition.id,
            owner,
            controller: owner,
            zone,
            tapped: false,
            base_power: definition.power,
            base_toughness: definition.toughness,
            power: definition.power,
            toughness: definition.toughness,
            base_keywords: definition.keywords,
            damage: 0,
            counters: FxHashMap::default(),
            modifiers: Vec::new(),
            entered_turn: None,
        }
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.base_toughness.is_some()
    }

    /// Printed keywords plus granted ones.
    #[must_use]
    pub fn keywords(&self) -> Keywords {
        self.modifiers
            .iter()
            .filter_map(|m| match m.kind {
                ModifierKind::Grant(keyword) => Some(keyword),
                _ => None,
            })
            .fold(self.base_keywords, Keywords::with)
    }

    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords().has(keyword)
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> i64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn add_counters(&mut self, name: &str, amount: i64) {
        let value = self.counter(name) + amount;
        if value == 0 {
            self.counters.remove(name);
        } else {
            self.counters.insert(name.to_string(), value);
        }
        self.refresh_stats();
    }

    pub fn add_modifier(&mut self, modifier: Modifier) {
        self.modifiers.push(modifier);
        self.refresh_stats();
    }

    /// Recompute current power/toughness from their inputs.
    pub fn refresh_stats(&mut self) {
        let counters = self.counter(PLUS_COUNTER) - self.counter(MINUS_COUNTER);
        self.power = self
            .base_power
            .map(|p| p + counters + modifier::total(&self.modifiers, ModifierKind::Power));
        self.toughness = self
            .base_toughness
            .map(|t| t + counters + modifier::total(&self.modifiers, ModifierKind::Toughness));
    }

    /// Damage still needed to kill this creature (0 when already lethal).
    #[must_use]
    pub fn lethal_remaining(&self) -> i64 {
        self.toughness.map_or(0, |t| (t - self.damage).max(0))
    }

    /// Marked damage is lethal and nothing prevents death.
    #[must_use]
    pub fn has_lethal_damage(&self) -> bool {
        match self.toughness {
            Some(toughness) => self.damage >= toughness && !self.has_keyword(Keyword::Indestructible),
            None => false,
        }
    }

    /// Entered the board this turn and lacks haste.
    #[must_use]
    pub fn is_summoning_sick(&self, turn: u32) -> bool {
        self.entered_turn == Some(turn) && !self.has_keyword(Keyword::Haste)
    }

    /// Forget everything tied to the card's time on the board.
    pub fn reset_for_zone_change(&mut self) {
        self.tapped = false;
        self.damage = 0;
        self.counters.clear();
        self.modifiers.clear();
        self.entered_turn = None;
        self.controller = self.owner;
        self.refresh_stats();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bear() -> CardInstance {
        let def = CardDefinition::creature(CardId::new(1), "Bear", 2, 2, 2);
        CardInstance::new(InstanceId(10), &def, Seat::First, Zone::Board)
    }

    #[test]
    fn test_card_instance_new() {
        let instance = bear();
        assert_eq!(instance.id, InstanceId(10));
        assert_eq!(instance.controller, Seat::First);
        assert_eq!(instance.power, Some(2));
        assert!(instance.is_creature());
    }

    #[test]
    fn test_counters_and_modifiers_change_stats() {
        let mut card = bear();
        card.add_counters(PLUS_COUNTER, 2);
        card.add_modifier(Modifier::until_end_of_turn(ModifierKind::Power, 1));

        assert_eq!(card.power, Some(5)); // 2 + 2 + 1
        assert_eq!(card.toughness, Some(4));

        card.add_counters(PLUS_COUNTER, -2);
        assert!(card.counters.is_empty());
        assert_eq!(card.toughness, Some(2));
    }

    #[test]
    fn test_lethal_damage() {
        let mut card = bear();
        card.damage = 1;
        assert_eq!(card.lethal_remaining(), 1);
        assert!(!card.has_lethal_damage());

        card.damage = 2;
        assert!(card.has_lethal_damage());

        card.add_modifier(Modifier::new(
            ModifierKind::Grant(Keyword::Indestructible),
            0,
            None,
        ));
        assert!(!card.has_lethal_damage());
    }

    #[test]
    fn test_summoning_sickness() {
        let mut card = bear();
        card.entered_turn = Some(3);
        assert!(card.is_summoning_sick(3));
        assert!(!card.is_summoning_sick(4));

        card.add_modifier(Modifier::until_end_of_turn(ModifierKind::Grant(Keyword::Haste), 0));
        assert!(!card.is_summoning_sick(3));
    }

    #[test]
    fn test_reset_for_zone_change() {
        let mut card = bear();
        card.tapped = true;
        card.damage = 1;
        card.controller = Seat::Second;
        card.add_counters(PLUS_COUNTER, 1);

        card.reset_for_zone_change();

        assert!(!card.tapped);
        assert_eq!(card.damage, 0);
        assert_eq!(card.controller, Seat::First);
        assert_eq!(card.power, Some(2));
    }
}

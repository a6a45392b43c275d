//! Card definitions - static card data supplied by the catalog.
//!
//! `CardDefinition` holds the immutable properties of a card: kind, cost,
//! printed stats and keywords, and what it does. Instance-specific data
//! (damage, counters, zone) lives in `CardInstance`.
//!
//! ## Kinds
//!
//! - `Creature` and `Artifact` are permanents: playing one puts it on the
//!   board at once, at sorcery speed.
//! - `Spell` goes on the stack when cast (at any time its controller holds
//!   priority) and to the graveyard; its effects run when the item resolves.

use serde::{Deserialize, Serialize};

use crate::effects::{Effect, EffectSpec, Recipient, TargetSpec};
use crate::resources::Cost;

use super::keywords::{Keyword, Keywords};

/// Unique identifier for a card definition.
///
/// This identifies the "type" of card (e.g., "Lightning Bolt"),
/// not a specific instance in a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Creature,
    Spell,
    Artifact,
}

impl CardKind {
    /// Whether the card stays on the board once played.
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        matches!(self, CardKind::Creature | CardKind::Artifact)
    }
}

/// An ability a permanent's controller may activate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivatedAbility {
    pub name: String,
    pub cost: Cost,
    /// Activation taps the source.
    pub tap: bool,
    pub target: TargetSpec,
    pub effects: Vec<EffectSpec>,
}

impl ActivatedAbility {
    pub fn new(name: impl Into<String>, cost: Cost) -> Self {
        Self {
            name: name.into(),
            cost,
            tap: false,
            target: TargetSpec::None,
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn tapping(mut self) -> Self {
        self.tap = true;
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: TargetSpec) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect, recipient: Recipient) -> Self {
        self.effects.push(EffectSpec::new(effect, recipient));
        self
    }
}

/// When a triggered ability fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerCondition {
    /// The card entered its controller's board.
    EntersBoard,
    /// The creature went from the board to the graveyard.
    Dies,
    /// The creature was declared as an attacker.
    Attacks,
}

/// A triggered ability. Triggers never choose targets; their effects go to
/// the controller, the opponent or the source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredAbility {
    pub on: TriggerCondition,
    pub effects: Vec<EffectSpec>,
}

impl TriggeredAbility {
    #[must_use]
    pub fn new(on: TriggerCondition) -> Self {
        Self {
            on,
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect, recipient: Recipient) -> Self {
        self.effects.push(EffectSpec::new(effect, recipient));
        self
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use ccg_session::cards::{CardDefinition, CardId, Keyword};
/// use ccg_session::effects::{Effect, Recipient, TargetSpec};
///
/// let bear = CardDefinition::creature(CardId::new(1), "Grizzly", 2, 2, 2)
///     .with_keyword(Keyword::Trample);
/// assert_eq!(bear.power, Some(2));
///
/// let bolt = CardDefinition::spell(CardId::new(2), "Bolt", 1)
///     .with_target(TargetSpec::CreatureOrPlayer)
///     .with_effect(Effect::damage(3), Recipient::Target);
/// assert_eq!(bolt.effects.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: CardId,
    pub name: String,
    pub kind: CardKind,
    pub cost: Cost,
    pub power: Option<i64>,
    pub toughness: Option<i64>,
    pub keywords: Keywords,
    /// What the card targets when cast.
    pub target: TargetSpec,
    /// What a spell does on resolution.
    pub effects: Vec<EffectSpec>,
    pub abilities: Vec<ActivatedAbility>,
    pub triggers: Vec<TriggeredAbility>,
}

impl CardDefinition {
    fn base(id: CardId, name: impl Into<String>, kind: CardKind, mana: u32) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            cost: Cost::mana(mana),
            power: None,
            toughness: None,
            keywords: Keywords::none(),
            target: TargetSpec::None,
            effects: Vec::new(),
            abilities: Vec::new(),
            triggers: Vec::new(),
        }
    }

    /// A creature with printed power and toughness.
    #[must_use]
    pub fn creature(id: CardId, name: impl Into<String>, mana: u32, power: i64, toughness: i64) -> Self {
        Self {
            power: Some(power),
            toughness: Some(toughness),
            ..Self::base(id, name, CardKind::Creature, mana)
        }
    }

    #[must_use]
    pub fn spell(id: CardId, name: impl Into<String>, mana: u32) -> Self {
        Self::base(id, name, CardKind::Spell, mana)
    }

    #[must_use]
    pub fn artifact(id: CardId, name: impl Into<String>, mana: u32) -> Self {
        Self::base(id, name, CardKind::Artifact, mana)
    }

    #[must_use]
    pub fn with_cost(mut self, cost: Cost) -> Self {
        self.cost = cost;
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keywords = self.keywords.with(keyword);
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: TargetSpec) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect, recipient: Recipient) -> Self {
        self.effects.push(EffectSpec::new(effect, recipient));
        self
    }

    #[must_use]
    pub fn with_ability(mut self, ability: ActivatedAbility) -> Self {
        self.abilities.push(ability);
        self
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: TriggeredAbility) -> Self {
        self.triggers.push(trigger);
        self
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.kind == CardKind::Creature
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_id() {
        let id = CardId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "Card(42)");
    }

    #[test]
    fn test_creature_builder() {
        let card = CardDefinition::creature(CardId::new(1), "Knight", 3, 2, 2)
            .with_keyword(Keyword::FirstStrike)
            .with_trigger(
                TriggeredAbility::new(TriggerCondition::EntersBoard)
                    .with_effect(Effect::heal(2), Recipient::Controller),
            );

        assert!(card.is_creature());
        assert!(card.kind.is_permanent());
        assert_eq!(card.cost, Cost::mana(3));
        assert!(card.keywords.has(Keyword::FirstStrike));
        assert_eq!(card.triggers[0].on, TriggerCondition::EntersBoard);
    }

    #[test]
    fn test_spell_has_no_stats() {
        let card = CardDefinition::spell(CardId::new(2), "Counterspell", 2)
            .with_target(TargetSpec::StackItem)
            .with_effect(Effect::Counter, Recipient::Target);

        assert!(!card.kind.is_permanent());
        assert_eq!(card.power, None);
        assert_eq!(card.target.required(), 1);
    }

    #[test]
    fn test_ability_builder() {
        let ability = ActivatedAbility::new("Ping", Cost::energy(1))
            .tapping()
            .with_target(TargetSpec::CreatureOrPlayer)
            .with_effect(Effect::damage(1), Recipient::Target);

        assert!(ability.tap);
        assert_eq!(ability.cost.energy, 1);
    }

    #[test]
    fn test_card_definition_serialization() {
        let card = CardDefinition::creature(CardId::new(1), "Test", 1, 3, 2);
        let json = serde_json::to_string(&card).unwrap();
        let back: CardDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(card, back);
    }
}

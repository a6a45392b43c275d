//! Combat bookkeeping.
//!
//! A [`CombatState`] exists only while the turn is inside the combat steps.
//! It records who attacks and who blocks, snapshots of the combatants, the
//! damage dealt and the creatures that died. Everything it does is folded
//! into the card store and the resource ledgers as it happens; dropping the
//! state at the end of combat loses nothing.

use im::OrdMap;
use serde::{Deserialize, Serialize};

use crate::cards::{CardInstance, Keywords};
use crate::core::{InstanceId, Seat};

/// Combat sub-step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatPhase {
    Begin,
    DeclareAttackers,
    DeclareBlockers,
    Damage,
    End,
}

/// One blocker assigned to one attacker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub blocker: InstanceId,
    pub attacker: InstanceId,
}

impl Block {
    #[must_use]
    pub const fn new(blocker: InstanceId, attacker: InstanceId) -> Self {
        Self { blocker, attacker }
    }
}

/// Who receives damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageRecipient {
    Player(Seat),
    Card(InstanceId),
}

/// One entry of an attacker's damage split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DamageAssignment {
    pub to: DamageRecipient,
    pub amount: u32,
}

impl DamageAssignment {
    #[must_use]
    pub const fn to_card(card: InstanceId, amount: u32) -> Self {
        Self {
            to: DamageRecipient::Card(card),
            amount,
        }
    }

    #[must_use]
    pub const fn to_player(seat: Seat, amount: u32) -> Self {
        Self {
            to: DamageRecipient::Player(seat),
            amount,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CasualtyCause {
    /// Lethal combat damage.
    Damage,
    /// A destroy effect.
    Destruction,
    /// Lethal damage found by the state-based check.
    StateBased,
}

/// Combat-relevant view of a creature, refreshed before each damage sub-step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatCreature {
    pub controller: Seat,
    pub power: i64,
    pub toughness: i64,
    pub damage: i64,
    pub keywords: Keywords,
}

impl CombatCreature {
    #[must_use]
    pub fn snapshot(card: &CardInstance) -> Self {
        Self {
            controller: card.controller,
            power: card.power.unwrap_or(0),
            toughness: card.toughness.unwrap_or(0),
            damage: card.damage,
            keywords: card.keywords(),
        }
    }

    /// Damage this creature deals, never negative.
    #[must_use]
    pub fn strength(&self) -> u32 {
        u32::try_from(self.power.max(0)).unwrap_or(u32::MAX)
    }

    /// Damage still needed to make this creature's damage lethal.
    #[must_use]
    pub fn remaining_toughness(&self) -> i64 {
        (self.toughness - self.damage).max(0)
    }
}

/// Blockers of one attacker, in the order they were declared.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockAssignment {
    pub attacker: InstanceId,
    pub blockers: Vec<InstanceId>,
    /// Explicit damage split chosen by the attacking seat.
    pub split: Option<Vec<DamageAssignment>>,
}

/// Damage dealt by one combatant in one sub-step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRecord {
    pub source: InstanceId,
    pub target: DamageRecipient,
    pub amount: u32,
    pub first_strike: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Casualty {
    pub card: InstanceId,
    pub cause: CasualtyCause,
}

/// State of the current combat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatState {
    pub phase: CombatPhase,
    pub attacking: Seat,
    pub defending: Seat,
    pub attackers_declared: bool,
    pub blockers_declared: bool,
    /// Every attacker as declared, including those since removed.
    pub declared: Vec<InstanceId>,
    /// Attackers still in combat, in declaration order.
    pub attackers: Vec<InstanceId>,
    /// Snapshots of every creature still in combat.
    pub creatures: OrdMap<InstanceId, CombatCreature>,
    /// Entries stay after their blockers leave: the attacker remains blocked.
    pub blocks: Vec<BlockAssignment>,
    pub damage: Vec<DamageRecord>,
    pub casualties: Vec<Casualty>,
}

impl CombatState {
    #[must_use]
    pub fn new(attacking: Seat) -> Self {
        Self {
            phase: CombatPhase::Begin,
            attacking,
            defending: attacking.opponent(),
            attackers_declared: false,
            blockers_declared: false,
            declared: Vec::new(),
            attackers: Vec::new(),
            creatures: OrdMap::new(),
            blocks: Vec::new(),
            damage: Vec::new(),
            casualties: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_attacking(&self, card: InstanceId) -> bool {
        self.attackers.contains(&card)
    }

    #[must_use]
    pub fn in_combat(&self, card: InstanceId) -> bool {
        self.creatures.contains_key(&card)
    }

    #[must_use]
    pub fn is_casualty(&self, card: InstanceId) -> bool {
        self.casualties.iter().any(|c| c.card == card)
    }

    #[must_use]
    pub fn has_attackers(&self) -> bool {
        !self.attackers.is_empty()
    }

    /// Whether anything attacked this combat.
    #[must_use]
    pub fn attack_declared(&self) -> bool {
        !self.declared.is_empty()
    }

    /// Block entry of an attacker, if it was blocked.
    #[must_use]
    pub fn block_of(&self, attacker: InstanceId) -> Option<&BlockAssignment> {
        self.blocks.iter().find(|b| b.attacker == attacker)
    }

    fn block_of_mut(&mut self, attacker: InstanceId) -> Option<&mut BlockAssignment> {
        self.blocks.iter_mut().find(|b| b.attacker == attacker)
    }

    #[must_use]
    pub fn is_blocked(&self, attacker: InstanceId) -> bool {
        self.block_of(attacker).is_some()
    }

    /// Remaining blockers of an attacker, in declaration order.
    #[must_use]
    pub fn blockers_of(&self, attacker: InstanceId) -> &[InstanceId] {
        self.block_of(attacker).map_or(&[], |b| b.blockers.as_slice())
    }

    /// The attacker a creature is blocking.
    #[must_use]
    pub fn blocking(&self, blocker: InstanceId) -> Option<InstanceId> {
        self.blocks
            .iter()
            .find(|b| b.blockers.contains(&blocker))
            .map(|b| b.attacker)
    }

    pub fn add_attacker(&mut self, card: &CardInstance) {
        self.declared.push(card.id);
        self.attackers.push(card.id);
        self.creatures.insert(card.id, CombatCreature::snapshot(card));
    }

    pub fn add_block(&mut self, blocker: &CardInstance, attacker: InstanceId) {
        self.creatures.insert(blocker.id, CombatCreature::snapshot(blocker));
        match self.block_of_mut(attacker) {
            Some(entry) => entry.blockers.push(blocker.id),
            None => self.blocks.push(BlockAssignment {
                attacker,
                blockers: vec![blocker.id],
                split: None,
            }),
        }
    }

    /// Record an explicit damage split for an attacker.
    pub fn set_split(&mut self, attacker: InstanceId, split: Vec<DamageAssignment>) {
        if let Some(entry) = self.block_of_mut(attacker) {
            entry.split = Some(split);
        }
    }

    /// Take a creature out of combat. An attacker it was blocking stays blocked.
    pub fn remove(&mut self, card: InstanceId) {
        self.creatures.remove(&card);
        self.attackers.retain(|&a| a != card);
        self.blocks.retain(|b| b.attacker != card);
        for entry in &mut self.blocks {
            entry.blockers.retain(|&b| b != card);
        }
    }

    /// Every combatant still in combat: attackers first, then blockers.
    #[must_use]
    pub fn combatants(&self) -> Vec<InstanceId> {
        let mut all = self.attackers.clone();
        for entry in &self.blocks {
            all.extend(entry.blockers.iter().copied());
        }
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardId};
    use crate::zones::Zone;

    fn creature(id: u32, owner: Seat) -> CardInstance {
        let def = CardDefinition::creature(CardId::new(1), "Grunt", 1, 2, 2);
        CardInstance::new(InstanceId(id), &def, owner, Zone::Board)
    }

    #[test]
    fn test_new_combat() {
        let combat = CombatState::new(Seat::Second);
        assert_eq!(combat.defending, Seat::First);
        assert_eq!(combat.phase, CombatPhase::Begin);
        assert!(!combat.has_attackers());
    }

    #[test]
    fn test_blocks_keep_declaration_order() {
        let mut combat = CombatState::new(Seat::First);
        combat.add_attacker(&creature(1, Seat::First));
        combat.add_block(&creature(5, Seat::Second), InstanceId(1));
        combat.add_block(&creature(4, Seat::Second), InstanceId(1));

        assert_eq!(combat.blockers_of(InstanceId(1)), &[InstanceId(5), InstanceId(4)]);
        assert_eq!(combat.blocking(InstanceId(4)), Some(InstanceId(1)));
        assert_eq!(combat.combatants().len(), 3);
    }

    #[test]
    fn test_removed_blocker_leaves_attacker_blocked() {
        let mut combat = CombatState::new(Seat::First);
        combat.add_attacker(&creature(1, Seat::First));
        combat.add_block(&creature(5, Seat::Second), InstanceId(1));

        combat.remove(InstanceId(5));
        assert!(combat.is_blocked(InstanceId(1)));
        assert!(combat.blockers_of(InstanceId(1)).is_empty());
        assert!(!combat.in_combat(InstanceId(5)));
    }

    #[test]
    fn test_removed_attacker_leaves_combat() {
        let mut combat = CombatState::new(Seat::First);
        combat.add_attacker(&creature(1, Seat::First));
        combat.add_block(&creature(5, Seat::Second), InstanceId(1));

        combat.remove(InstanceId(1));
        assert!(!combat.is_attacking(InstanceId(1)));
        assert!(combat.blocks.is_empty());
        assert!(combat.attack_declared());
    }
}

//! Priority-based stack resolution.
//!
//! Spells and abilities are pushed onto a stack and resolve in LIFO order.
//! Seats pass priority alternately; two consecutive passes resolve the top
//! item, or close the step when the stack is empty.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::{InstanceId, Seat, StackItemId};
use crate::effects::{EffectSpec, TargetSpec, Targets};

/// Spell or ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackItemKind {
    Spell,
    Ability,
}

/// An entry on the stack. `effects` is the item's payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackItem {
    pub id: StackItemId,
    pub kind: StackItemKind,
    pub source: InstanceId,
    pub controller: Seat,
    /// Re-checked against `targets` on resolution.
    pub target: TargetSpec,
    pub targets: Targets,
    pub effects: Vec<EffectSpec>,
}

/// Outcome of a priority pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassOutcome {
    /// Priority moved to the other seat.
    Handed(Seat),
    /// Both seats passed in succession.
    AllPassed,
}

/// The stack plus the priority window around it.
///
/// 1. An item is pushed; its controller keeps priority.
/// 2. Seats pass alternately.
/// 3. Two passes in a row: the top item resolves (or the step ends when
///    the stack is empty).
/// 4. After a resolution the active seat receives priority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityStack {
    /// Index 0 = bottom, last = top.
    items: Vector<StackItem>,
    holder: Seat,
    consecutive_passes: u8,
    next_id: u32,
}

impl PriorityStack {
    /// Empty stack with priority at `holder`.
    #[must_use]
    pub fn new(holder: Seat) -> Self {
        Self {
            items: Vector::new(),
            holder,
            consecutive_passes: 0,
            next_id: 1,
        }
    }

    /// Seat currently holding priority.
    #[must_use]
    pub fn holder(&self) -> Seat {
        self.holder
    }

    #[must_use]
    pub fn consecutive_passes(&self) -> u8 {
        self.consecutive_passes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn top(&self) -> Option<&StackItem> {
        self.items.last()
    }

    #[must_use]
    pub fn contains(&self, id: StackItemId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    #[must_use]
    pub fn get(&self, id: StackItemId) -> Option<&StackItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Items bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &StackItem> {
        self.items.iter()
    }

    /// Push an item. Its controller keeps priority and the pass count resets.
    pub fn push(
        &mut self,
        kind: StackItemKind,
        source: InstanceId,
        controller: Seat,
        target: TargetSpec,
        targets: Targets,
        effects: Vec<EffectSpec>,
    ) -> StackItemId {
        let id = StackItemId::new(self.next_id);
        self.next_id += 1;

        self.items.push_back(StackItem {
            id,
            kind,
            source,
            controller,
            target,
            targets,
            effects,
        });

        self.consecutive_passes = 0;
        self.holder = controller;
        id
    }

    /// `seat` passes. The caller has already checked that it holds priority.
    pub fn pass(&mut self, seat: Seat) -> PassOutcome {
        self.consecutive_passes = self.consecutive_passes.saturating_add(1);
        if self.consecutive_passes >= 2 {
            PassOutcome::AllPassed
        } else {
            self.holder = seat.opponent();
            PassOutcome::Handed(self.holder)
        }
    }

    /// Remove the top item for resolution.
    pub fn pop(&mut self) -> Option<StackItem> {
        self.items.pop_back()
    }

    /// Remove an item from anywhere in the stack (countering).
    pub fn remove(&mut self, id: StackItemId) -> Option<StackItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Give priority to `seat` with a fresh pass count.
    pub fn give_priority(&mut self, seat: Seat) {
        self.holder = seat;
        self.consecutive_passes = 0;
    }

    /// Holder took a non-pass action: the pass sequence starts over.
    pub fn reset_passes(&mut self) {
        self.consecutive_passes = 0;
    }

    /// Drop every item (session end).
    pub fn clear(&mut self) {
        self.items.clear();
        self.consecutive_passes = 0;
    }
}

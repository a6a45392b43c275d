//! Card instance store: the arena of every instance in a session.
//!
//! Keyed by `InstanceId` in an `im::OrdMap`, so iteration order is stable
//! (deterministic event order) and snapshots are cheap. Instances are
//! created when a deck is dealt and never removed: graveyard and exile keep
//! the instance with its zone updated.

use im::OrdMap;
use serde::{Deserialize, Serialize};

use super::definition::CardDefinition;
use super::instance::CardInstance;
use crate::core::{InstanceId, Seat};
use crate::error::{GameError, Result};
use crate::zones::Zone;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceStore {
    cards: OrdMap<InstanceId, CardInstance>,
    next_id: u32,
}

impl Default for InstanceStore {
    fn default() -> Self {
        Self {
            cards: OrdMap::new(),
            next_id: 1,
        }
    }
}

impl InstanceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new instance of `definition` for `owner`.
    pub fn create(&mut self, definition: &CardDefinition, owner: Seat, zone: Zone) -> InstanceId {
        let id = InstanceId::new(self.next_id);
        self.next_id += 1;
        self.cards.insert(id, CardInstance::new(id, definition, owner, zone));
        id
    }

    #[must_use]
    pub fn get(&self, id: InstanceId) -> Option<&CardInstance> {
        self.cards.get(&id)
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut CardInstance> {
        self.cards.get_mut(&id)
    }

    /// Lookup that reports a missing instance as `NotFound`.
    pub fn require(&self, id: InstanceId) -> Result<&CardInstance> {
        self.get(id).ok_or_else(|| GameError::not_found(id))
    }

    pub fn require_mut(&mut self, id: InstanceId) -> Result<&mut CardInstance> {
        self.get_mut(id).ok_or_else(|| GameError::not_found(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardInstance> {
        self.cards.values()
    }

    /// Apply `f` to every instance.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut CardInstance)) {
        let ids: Vec<InstanceId> = self.cards.keys().copied().collect();
        for id in ids {
            if let Some(card) = self.cards.get_mut(&id) {
                f(card);
            }
        }
    }

    /// Instances on the board controlled by `seat`.
    pub fn on_board(&self, seat: Seat) -> impl Iterator<Item = &CardInstance> {
        self.cards
            .values()
            .filter(move |c| c.zone == Zone::Board && c.controller == seat)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardId;

    #[test]
    fn test_ids_are_sequential_and_stable() {
        let def = CardDefinition::creature(CardId::new(1), "Bear", 2, 2, 2);
        let mut store = InstanceStore::new();

        let a = store.create(&def, Seat::First, Zone::Deck);
        let b = store.create(&def, Seat::Second, Zone::Deck);

        assert_eq!(a, InstanceId(1));
        assert_eq!(b, InstanceId(2));
        assert_eq!(store.len(), 2);
        assert_eq!(store.require(b).unwrap().owner, Seat::Second);
        assert!(matches!(store.require(InstanceId(9)), Err(GameError::NotFound(_))));
    }

    #[test]
    fn test_on_board_filters_by_controller() {
        let def = CardDefinition::creature(CardId::new(1), "Bear", 2, 2, 2);
        let mut store = InstanceStore::new();
        let a = store.create(&def, Seat::First, Zone::Board);
        store.create(&def, Seat::First, Zone::Hand);
        store.create(&def, Seat::Second, Zone::Board);

        let mine: Vec<_> = store.on_board(Seat::First).map(|c| c.id).collect();
        assert_eq!(mine, vec![a]);
    }
}

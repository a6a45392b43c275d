//! Catalog boundary: card definitions and decks.
//!
//! The engine only ever reads the catalog, and only when a session is
//! created and joined; from then on a session carries its own copy of the
//! definitions it needs. `CardRegistry` is the in-memory catalog used by
//! embedders that load definitions themselves, and by tests.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::definition::{CardDefinition, CardId};
use crate::core::PlayerId;
use crate::error::{GameError, Result};

/// Identifier of a deck in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeckId(pub u32);

impl DeckId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for DeckId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Deck({})", self.0)
    }
}

/// Read-only view of the catalog service.
pub trait CardCatalog: Send + Sync {
    /// The definition of one card.
    fn definition(&self, id: CardId) -> Option<CardDefinition>;

    /// The ordered card list of a deck `player` may use. Index 0 is the top.
    fn deck(&self, player: PlayerId, deck: DeckId) -> Option<Vec<CardId>>;
}

#[derive(Clone, Debug)]
struct DeckEntry {
    owner: Option<PlayerId>,
    cards: Vec<CardId>,
}

/// In-memory catalog.
///
/// ## Example
///
/// ```
/// use ccg_session::cards::{CardCatalog, CardDefinition, CardId, CardRegistry, DeckId};
/// use ccg_session::core::PlayerId;
///
/// let mut registry = CardRegistry::new();
/// registry.register(CardDefinition::creature(CardId::new(1), "Bear", 2, 2, 2)).unwrap();
/// registry.add_deck(DeckId::new(1), None, vec![CardId::new(1); 20]).unwrap();
///
/// let deck = registry.deck(PlayerId::generate(), DeckId::new(1)).unwrap();
/// assert_eq!(deck.len(), 20);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, CardDefinition>,
    decks: FxHashMap<DeckId, DeckEntry>,
}

impl CardRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card definition. Ids must be unique.
    pub fn register(&mut self, card: CardDefinition) -> Result<()> {
        if self.cards.contains_key(&card.id) {
            return Err(GameError::invalid_action(format!("{} already registered", card.id)));
        }
        self.cards.insert(card.id, card);
        Ok(())
    }

    /// Register a deck. `owner: None` makes it usable by anyone.
    /// Every card must already be registered.
    pub fn add_deck(&mut self, id: DeckId, owner: Option<PlayerId>, cards: Vec<CardId>) -> Result<()> {
        if let Some(missing) = cards.iter().find(|c| !self.cards.contains_key(c)) {
            return Err(GameError::not_found(missing));
        }
        self.decks.insert(id, DeckEntry { owner, cards });
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&CardDefinition> {
        self.cards.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.values()
    }
}

impl CardCatalog for CardRegistry {
    fn definition(&self, id: CardId) -> Option<CardDefinition> {
        self.cards.get(&id).cloned()
    }

    fn deck(&self, player: PlayerId, deck: DeckId) -> Option<Vec<CardId>> {
        let entry = self.decks.get(&deck)?;
        match entry.owner {
            Some(owner) if owner != player => None,
            _ => Some(entry.cards.clone()),
        }
    }
}

//! Per-seat zone ledger.
//!
//! A `ZoneLedger` owns the five ordered card lists of one seat. Every card a
//! seat was dealt sits in exactly one of them at all times; cards never move
//! into another seat's ledger (control changes are recorded on the instance,
//! not by moving ids between ledgers).
//!
//! Lists are `im::Vector`s so cloning a whole session for a rollback
//! snapshot stays cheap. Index 0 is the bottom; the last element is the top
//! (of the deck) or the newest card (of the hand).

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::{GameRng, InstanceId};
use crate::error::{GameError, Result};

/// A named container of cards for one seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Deck,
    Hand,
    Board,
    Graveyard,
    Exile,
}

impl Zone {
    pub const ALL: [Zone; 5] = [Zone::Deck, Zone::Hand, Zone::Board, Zone::Graveyard, Zone::Exile];

    /// Whether both seats may see which cards are in this zone.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Zone::Board | Zone::Graveyard | Zone::Exile)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Zone::Deck => "deck",
            Zone::Hand => "hand",
            Zone::Board => "board",
            Zone::Graveyard => "graveyard",
            Zone::Exile => "exile",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Position for inserting a card into a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// Top of the zone (end of the list).
    Top,
    /// Bottom of the zone (start of the list).
    Bottom,
    /// Insert at specific index (0 = bottom), clamped to the zone size.
    Index(usize),
}

/// The five zones of one seat.
///
/// ## Usage
///
/// ```
/// use ccg_session::core::InstanceId;
/// use ccg_session::zones::{Zone, ZoneLedger, ZonePosition};
///
/// let mut ledger = ZoneLedger::new();
/// ledger.place(InstanceId(1), Zone::Deck, ZonePosition::Top);
/// ledger.place(InstanceId(2), Zone::Deck, ZonePosition::Top);
///
/// assert_eq!(ledger.draw(), Some(InstanceId(2)));
/// assert_eq!(ledger.zone_of(InstanceId(2)), Some(Zone::Hand));
///
/// // Moving out of the wrong zone is rejected.
/// assert!(ledger.move_card(InstanceId(1), Zone::Hand, Zone::Board, ZonePosition::Top).is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneLedger {
    deck: Vector<InstanceId>,
    hand: Vector<InstanceId>,
    board: Vector<InstanceId>,
    graveyard: Vector<InstanceId>,
    exile: Vector<InstanceId>,
}

impl ZoneLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cards in a zone, bottom first.
    #[must_use]
    pub fn cards(&self, zone: Zone) -> &Vector<InstanceId> {
        match zone {
            Zone::Deck => &self.deck,
            Zone::Hand => &self.hand,
            Zone::Board => &self.board,
            Zone::Graveyard => &self.graveyard,
            Zone::Exile => &self.exile,
        }
    }

    fn cards_mut(&mut self, zone: Zone) -> &mut Vector<InstanceId> {
        match zone {
            Zone::Deck => &mut self.deck,
            Zone::Hand => &mut self.hand,
            Zone::Board => &mut self.board,
            Zone::Graveyard => &mut self.graveyard,
            Zone::Exile => &mut self.exile,
        }
    }

    #[must_use]
    pub fn count(&self, zone: Zone) -> usize {
        self.cards(zone).len()
    }

    #[must_use]
    pub fn contains(&self, zone: Zone, card: InstanceId) -> bool {
        self.cards(zone).iter().any(|&c| c == card)
    }

    /// The zone holding `card`, if this ledger holds it at all.
    #[must_use]
    pub fn zone_of(&self, card: InstanceId) -> Option<Zone> {
        Zone::ALL.into_iter().find(|&zone| self.contains(zone, card))
    }

    /// Top card of the deck.
    #[must_use]
    pub fn top_of_deck(&self) -> Option<InstanceId> {
        self.deck.last().copied()
    }

    /// Put a card into a zone. Used only when dealing.
    pub fn place(&mut self, card: InstanceId, zone: Zone, position: ZonePosition) {
        insert_at(self.cards_mut(zone), card, position);
    }

    /// Move a card between two of this seat's zones.
    ///
    /// Fails with `InvalidZoneTransition` (and changes nothing) if the card
    /// is not currently in `from`.
    pub fn move_card(
        &mut self,
        card: InstanceId,
        from: Zone,
        to: Zone,
        position: ZonePosition,
    ) -> Result<()> {
        let source = self.cards_mut(from);
        let index = source
            .iter()
            .position(|&c| c == card)
            .ok_or_else(|| GameError::InvalidZoneTransition {
                card: card.to_string(),
                from: from.to_string(),
            })?;
        source.remove(index);
        insert_at(self.cards_mut(to), card, position);
        Ok(())
    }

    /// Move the top of the deck to the hand. `None` when the deck is empty.
    pub fn draw(&mut self) -> Option<InstanceId> {
        let card = self.deck.pop_back()?;
        self.hand.push_back(card);
        Some(card)
    }

    /// Reorder the deck with `rng`.
    pub fn shuffle_deck(&mut self, rng: &mut GameRng) {
        let mut cards: Vec<InstanceId> = self.deck.iter().copied().collect();
        rng.shuffle(&mut cards);
        self.deck = cards.into_iter().collect();
    }

    /// Every card held by this ledger, zone by zone.
    pub fn all_cards(&self) -> impl Iterator<Item = InstanceId> + '_ {
        Zone::ALL
            .into_iter()
            .flat_map(move |zone| self.cards(zone).iter().copied())
    }

    #[must_use]
    pub fn total(&self) -> usize {
        Zone::ALL.into_iter().map(|zone| self.count(zone)).sum()
    }
}

fn insert_at(list: &mut Vector<InstanceId>, card: InstanceId, position: ZonePosition) {
    match position {
        ZonePosition::Top => list.push_back(card),
        ZonePosition::Bottom => list.push_front(card),
        ZonePosition::Index(i) => {
            let index = i.min(list.len());
            list.insert(index, card);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with_deck(ids: &[u32]) -> ZoneLedger {
        let mut ledger = ZoneLedger::new();
        for &id in ids {
            ledger.place(InstanceId(id), Zone::Deck, ZonePosition::Top);
        }
        ledger
    }

    #[test]
    fn test_draw_takes_top() {
        let mut ledger = ledger_with_deck(&[1, 2, 3]);

        assert_eq!(ledger.top_of_deck(), Some(InstanceId(3)));
        assert_eq!(ledger.draw(), Some(InstanceId(3)));
        assert_eq!(ledger.count(Zone::Deck), 2);
        assert_eq!(ledger.count(Zone::Hand), 1);
    }

    #[test]
    fn test_draw_from_empty_deck() {
        let mut ledger = ZoneLedger::new();
        assert_eq!(ledger.draw(), None);
        assert_eq!(ledger.total(), 0);
    }

    #[test]
    fn test_shuffle_deck_is_seeded() {
        let ids: Vec<u32> = (1..=12).collect();
        let mut a = ledger_with_deck(&ids);
        let mut b = ledger_with_deck(&ids);
        let before = a.clone();

        a.shuffle_deck(&mut GameRng::new(9));
        b.shuffle_deck(&mut GameRng::new(9));
        assert_eq!(a, b);
        assert_ne!(a, before);
        assert_eq!(a.count(Zone::Deck), 12);
    }

    #[test]
    fn test_move_between_zones() {
        let mut ledger = ledger_with_deck(&[1, 2]);
        ledger.draw();

        ledger
            .move_card(InstanceId(2), Zone::Hand, Zone::Board, ZonePosition::Top)
            .unwrap();
        assert_eq!(ledger.zone_of(InstanceId(2)), Some(Zone::Board));

        ledger
            .move_card(InstanceId(2), Zone::Board, Zone::Graveyard, ZonePosition::Top)
            .unwrap();
        assert_eq!(ledger.zone_of(InstanceId(2)), Some(Zone::Graveyard));
        assert_eq!(ledger.total(), 2);
    }

    #[test]
    fn test_move_from_wrong_zone_changes_nothing() {
        let mut ledger = ledger_with_deck(&[1, 2]);
        let before = ledger.clone();

        let err = ledger
            .move_card(InstanceId(1), Zone::Hand, Zone::Board, ZonePosition::Top)
            .unwrap_err();

        assert!(matches!(err, GameError::InvalidZoneTransition { .. }));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_positions() {
        let mut ledger = ledger_with_deck(&[1, 2]);
        ledger.place(InstanceId(9), Zone::Deck, ZonePosition::Bottom);
        ledger.place(InstanceId(5), Zone::Deck, ZonePosition::Index(1));
        ledger.place(InstanceId(7), Zone::Deck, ZonePosition::Index(99));

        let order: Vec<_> = ledger.cards(Zone::Deck).iter().map(|c| c.raw()).collect();
        assert_eq!(order, vec![9, 5, 1, 2, 7]);
    }

    #[test]
    fn test_all_cards_covers_every_zone() {
        let mut ledger = ledger_with_deck(&[1, 2, 3, 4]);
        ledger.draw();
        ledger.draw();
        ledger
            .move_card(InstanceId(4), Zone::Hand, Zone::Exile, ZonePosition::Top)
            .unwrap();

        let mut all: Vec<_> = ledger.all_cards().map(|c| c.raw()).collect();
        all.sort_unstable();
        assert_eq!(all, vec![1, 2, 3, 4]);
    }
}

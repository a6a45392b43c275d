//! Opening hand decisions.
//!
//! With `rules.mulligan` on, the game opens with both hands dealt and a
//! decision window before turn 1's untap. The first seat decides first and
//! may mulligan any number of times; keeping hands the decision to the
//! second seat, and turn 1 begins once both have kept.
//!
//! A mulligan puts the whole hand back, reshuffles the deck from the seat's
//! stream forked by the mulligan count, and draws one card fewer than the
//! previous hand. A seat cannot mulligan down to an empty hand.

use serde::{Deserialize, Serialize};

use crate::core::{GameRng, Seat, SeatMap, Session};
use crate::error::{GameError, Result};
use crate::triggers::GameEvent;
use crate::zones::{Zone, ZonePosition};

use super::turn;

/// Progress of the opening window.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHands {
    mulligans: SeatMap<u32>,
    kept: SeatMap<bool>,
}

impl OpeningHands {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mulligans(&self, seat: Seat) -> u32 {
        self.mulligans[seat]
    }

    #[must_use]
    pub fn has_kept(&self, seat: Seat) -> bool {
        self.kept[seat]
    }

    /// Hand size after one more mulligan.
    #[must_use]
    pub fn next_hand_size(&self, seat: Seat, starting: usize) -> usize {
        let taken = usize::try_from(self.mulligans[seat]).unwrap_or(usize::MAX);
        starting.saturating_sub(taken.saturating_add(1))
    }
}

fn opening(session: &Session) -> Result<&OpeningHands> {
    session
        .opening
        .as_ref()
        .ok_or_else(|| GameError::invalid_action("opening hands are already decided"))
}

pub fn validate_mulligan(session: &Session, seat: Seat) -> Result<()> {
    let opening = opening(session)?;
    if opening.has_kept(seat) {
        return Err(GameError::invalid_action(format!("{seat} already kept its hand")));
    }
    if opening.next_hand_size(seat, session.config.rules.starting_hand_size) == 0 {
        return Err(GameError::invalid_action("cannot mulligan to an empty hand"));
    }
    Ok(())
}

pub fn validate_keep(session: &Session, seat: Seat) -> Result<()> {
    if opening(session)?.has_kept(seat) {
        return Err(GameError::invalid_action(format!("{seat} already kept its hand")));
    }
    Ok(())
}

/// Shuffle the hand back and draw a smaller one. Priority stays put.
pub fn mulligan(session: &mut Session, seat: Seat) -> Result<Vec<GameEvent>> {
    let starting = session.config.rules.starting_hand_size;
    let opening = session
        .opening
        .as_mut()
        .ok_or_else(|| GameError::invalid_state("mulligan outside the opening window"))?;
    let hand_size = opening.next_hand_size(seat, starting);
    opening.mulligans[seat] += 1;
    let round = opening.mulligans[seat];

    let hand: Vec<_> = session.players[seat].zones.cards(Zone::Hand).iter().copied().collect();
    for card in hand {
        session.move_card(card, Zone::Deck, ZonePosition::Top)?;
    }
    let mut rng = GameRng::new(session.id.seed()).for_seat(seat).fork(round);
    session.players[seat].zones.shuffle_deck(&mut rng);

    let mut events = vec![GameEvent::MulliganTaken {
        seat,
        mulligans: round,
        hand_size,
    }];
    for _ in 0..hand_size {
        if session.players[seat].zones.top_of_deck().is_none() {
            break;
        }
        events.push(session.draw(seat)?);
    }
    tracing::debug!(session = %session.id, seat = %seat, round, hand_size, "mulligan taken");
    Ok(events)
}

/// Keep the hand. The second keep starts turn 1.
pub fn keep(session: &mut Session, seat: Seat) -> Result<Vec<GameEvent>> {
    let opening = session
        .opening
        .as_mut()
        .ok_or_else(|| GameError::invalid_state("keep outside the opening window"))?;
    opening.kept[seat] = true;
    let both_kept = Seat::ALL.into_iter().all(|s| opening.kept[s]);

    let mut events = vec![GameEvent::HandKept {
        seat,
        hand_size: session.players[seat].zones.count(Zone::Hand),
    }];
    if both_kept {
        session.opening = None;
        events.extend(turn::begin_first_turn(session)?);
    } else {
        session.stack.give_priority(seat.opponent());
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_hand_size_shrinks_to_zero() {
        let mut opening = OpeningHands::new();
        assert_eq!(opening.next_hand_size(Seat::First, 7), 6);

        opening.mulligans[Seat::First] = 6;
        assert_eq!(opening.next_hand_size(Seat::First, 7), 0);
        assert_eq!(opening.next_hand_size(Seat::Second, 7), 6);
    }

    #[test]
    fn test_fresh_window_has_no_keeps() {
        let opening = OpeningHands::new();
        assert!(Seat::ALL.into_iter().all(|seat| !opening.has_kept(seat)));
        assert_eq!(opening.mulligans(Seat::Second), 0);
    }
}

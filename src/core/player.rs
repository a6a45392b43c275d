//! Player identification and per-seat data storage.
//!
//! ## PlayerId
//!
//! Identity supplied (and vouched for) by the auth service.
//!
//! ## Seat
//!
//! The engine-internal index of a player inside a session. A session always
//! has exactly two seats; `First` takes the first turn.
//!
//! ## SeatMap
//!
//! Fixed-size per-seat storage, indexable by `Seat`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};
use uuid::Uuid;

/// Player identity from the auth service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Allocate a random id (tests and tooling).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player({})", self.0)
    }
}

/// One of the two seats at the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    /// Both seats in turn order.
    pub const ALL: [Seat; 2] = [Seat::First, Seat::Second];

    #[must_use]
    pub const fn opponent(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }
}

impl std::fmt::Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Seat::First => f.write_str("first seat"),
            Seat::Second => f.write_str("second seat"),
        }
    }
}

/// Per-seat data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use ccg_session::core::{Seat, SeatMap};
///
/// let mut life: SeatMap<i64> = SeatMap::new(|_| 20);
/// life[Seat::Second] -= 3;
/// assert_eq!(life[Seat::First], 20);
/// assert_eq!(life[Seat::Second], 17);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatMap<T> {
    data: [T; 2],
}

impl<T> SeatMap<T> {
    /// Build with a factory that receives each seat.
    pub fn new(mut factory: impl FnMut(Seat) -> T) -> Self {
        Self {
            data: [factory(Seat::First), factory(Seat::Second)],
        }
    }

    /// Build from explicit values in seat order.
    pub fn from_pair(first: T, second: T) -> Self {
        Self {
            data: [first, second],
        }
    }

    #[must_use]
    pub fn get(&self, seat: Seat) -> &T {
        &self.data[seat.index()]
    }

    pub fn get_mut(&mut self, seat: Seat) -> &mut T {
        &mut self.data[seat.index()]
    }

    /// Iterate over (Seat, &T) pairs in turn order.
    pub fn iter(&self) -> impl Iterator<Item = (Seat, &T)> {
        Seat::ALL.into_iter().zip(self.data.iter())
    }

    /// Iterate over (Seat, &mut T) pairs in turn order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Seat, &mut T)> {
        Seat::ALL.into_iter().zip(self.data.iter_mut())
    }

    /// Seats whose value matches the predicate.
    pub fn seats_where(&self, predicate: impl Fn(&T) -> bool) -> Vec<Seat> {
        self.iter()
            .filter(|(_, value)| predicate(value))
            .map(|(seat, _)| seat)
            .collect()
    }
}

impl<T: Default> Default for SeatMap<T> {
    fn default() -> Self {
        Self::new(|_| T::default())
    }
}

impl<T> Index<Seat> for SeatMap<T> {
    type Output = T;

    fn index(&self, seat: Seat) -> &Self::Output {
        self.get(seat)
    }
}

impl<T> IndexMut<Seat> for SeatMap<T> {
    fn index_mut(&mut self, seat: Seat) -> &mut Self::Output {
        self.get_mut(seat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_opponent() {
        assert_eq!(Seat::First.opponent(), Seat::Second);
        assert_eq!(Seat::Second.opponent(), Seat::First);
        assert_eq!(Seat::Second.index(), 1);
    }

    #[test]
    fn test_seat_map_new() {
        let map: SeatMap<usize> = SeatMap::new(|seat| seat.index() * 10);
        assert_eq!(map[Seat::First], 0);
        assert_eq!(map[Seat::Second], 10);
    }

    #[test]
    fn test_seat_map_mutation_and_iter() {
        let mut map: SeatMap<i64> = SeatMap::default();
        map[Seat::Second] = 5;

        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs, vec![(Seat::First, &0), (Seat::Second, &5)]);
        assert_eq!(map.seats_where(|v| *v > 0), vec![Seat::Second]);
    }

    #[test]
    fn test_seat_serialization() {
        let json = serde_json::to_string(&Seat::Second).unwrap();
        assert_eq!(json, "\"second\"");

        let map = SeatMap::from_pair(1, 2);
        let json = serde_json::to_string(&map).unwrap();
        let back: SeatMap<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(map, back);
    }
}

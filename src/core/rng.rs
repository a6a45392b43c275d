//! Deterministic random number generation for deck shuffling.
//!
//! ## Key Features
//!
//! - **Deterministic**: the same session seed always shuffles the same way,
//!   so a session can be replayed from its id and action log.
//! - **Per-seat streams**: each seat's deck is shuffled from its own stream,
//!   so the order one seat receives never depends on the other's deck size.
//!
//! ```
//! use ccg_session::core::{GameRng, Seat};
//!
//! let mut a = GameRng::new(42).for_seat(Seat::First);
//! let mut b = GameRng::new(42).for_seat(Seat::First);
//! let mut deck_a = vec![1, 2, 3, 4, 5, 6, 7, 8];
//! let mut deck_b = deck_a.clone();
//! a.shuffle(&mut deck_a);
//! b.shuffle(&mut deck_b);
//! assert_eq!(deck_a, deck_b);
//! ```

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::player::Seat;

/// Deterministic RNG backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Independent stream for one seat.
    #[must_use]
    pub fn for_seat(&self, seat: Seat) -> Self {
        let offset = (seat.index() as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Self::new(self.seed.wrapping_add(offset))
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Independent stream for the `round`th reshuffle of the same deck.
    #[must_use]
    pub fn fork(&self, round: u32) -> Self {
        Self::new(self.seed ^ u64::from(round).wrapping_mul(0xD1B5_4A32_D192_ED03))
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shuffled(mut rng: GameRng) -> Vec<u32> {
        let mut data: Vec<u32> = (1..=20).collect();
        rng.shuffle(&mut data);
        data
    }

    #[test]
    fn test_determinism() {
        assert_eq!(shuffled(GameRng::new(42)), shuffled(GameRng::new(42)));
    }

    #[test]
    fn test_seat_streams_differ() {
        let rng = GameRng::new(42);
        let first = rng.for_seat(Seat::First);
        let second = rng.for_seat(Seat::Second);

        assert_ne!(first.seed(), second.seed());
        assert_ne!(shuffled(first), shuffled(second));
    }

    #[test]
    fn test_fork_rounds_differ() {
        let rng = GameRng::new(42).for_seat(Seat::First);
        assert_eq!(rng.fork(0).seed(), rng.seed());
        assert_eq!(shuffled(rng.fork(1)), shuffled(rng.fork(1)));
        assert_ne!(shuffled(rng.fork(1)), shuffled(rng.fork(2)));
    }

    #[test]
    fn test_shuffle_keeps_elements() {
        let mut data = shuffled(GameRng::new(7));
        let original: Vec<u32> = (1..=20).collect();

        assert_ne!(data, original); // 20! orderings, identity is vanishingly unlikely
        data.sort_unstable();
        assert_eq!(data, original);
    }
}

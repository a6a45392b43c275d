//! Combat keywords.
//!
//! A card's printed keywords live on its definition; effects can grant more
//! for a duration through instance modifiers. `Keywords` is a small bitset
//! so both can be merged with a single `union`.

use serde::{Deserialize, Serialize};

/// A keyword with rules meaning to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keyword {
    /// Deals combat damage in the first-strike sub-step.
    FirstStrike,
    /// Deals combat damage in both sub-steps.
    DoubleStrike,
    /// Any nonzero damage it deals is lethal.
    Deathtouch,
    /// Never dies from damage or destroy effects.
    Indestructible,
    /// Excess combat damage over lethal carries to the defending player.
    Trample,
    /// Does not tap to attack.
    Vigilance,
    /// May attack the turn it enters the board.
    Haste,
}

impl Keyword {
    pub const ALL: [Keyword; 7] = [
        Keyword::FirstStrike,
        Keyword::DoubleStrike,
        Keyword::Deathtouch,
        Keyword::Indestructible,
        Keyword::Trample,
        Keyword::Vigilance,
        Keyword::Haste,
    ];

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of keywords.
///
/// ```
/// use ccg_session::cards::{Keyword, Keywords};
///
/// let kw = Keywords::none().with(Keyword::Trample).with(Keyword::Deathtouch);
/// assert!(kw.has(Keyword::Trample));
/// assert!(!kw.has(Keyword::Vigilance));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Keywords(u8);

impl Keywords {
    #[must_use]
    pub const fn none() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn with(self, keyword: Keyword) -> Self {
        Self(self.0 | keyword.bit())
    }

    #[must_use]
    pub const fn has(self, keyword: Keyword) -> bool {
        self.0 & keyword.bit() != 0
    }

    #[must_use]
    pub const fn union(self, other: Keywords) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Deals damage in the first-strike sub-step.
    #[must_use]
    pub const fn strikes_first(self) -> bool {
        self.has(Keyword::FirstStrike) || self.has(Keyword::DoubleStrike)
    }

    /// Deals damage in the regular sub-step.
    #[must_use]
    pub const fn strikes_regular(self) -> bool {
        !self.has(Keyword::FirstStrike) || self.has(Keyword::DoubleStrike)
    }

    pub fn iter(self) -> impl Iterator<Item = Keyword> {
        Keyword::ALL.into_iter().filter(move |&k| self.has(k))
    }
}

impl FromIterator<Keyword> for Keywords {
    fn from_iter<I: IntoIterator<Item = Keyword>>(iter: I) -> Self {
        iter.into_iter().fold(Keywords::none(), Keywords::with)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strike_steps() {
        let plain = Keywords::none();
        assert!(!plain.strikes_first());
        assert!(plain.strikes_regular());

        let first = Keywords::none().with(Keyword::FirstStrike);
        assert!(first.strikes_first());
        assert!(!first.strikes_regular());

        let double = Keywords::none().with(Keyword::DoubleStrike);
        assert!(double.strikes_first());
        assert!(double.strikes_regular());
    }

    #[test]
    fn test_union_and_iter() {
        let a = Keywords::none().with(Keyword::Haste);
        let b: Keywords = [Keyword::Trample, Keyword::Haste].into_iter().collect();
        let merged = a.union(b);

        let listed: Vec<_> = merged.iter().collect();
        assert_eq!(listed, vec![Keyword::Trample, Keyword::Haste]);
        assert!(Keywords::none().is_empty());
    }
}

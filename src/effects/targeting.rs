//! Targeting rules.
//!
//! A card or ability declares one [`TargetSpec`]; the player supplies the
//! concrete [`Target`]s with the action. Targets are validated when the item
//! is cast and re-checked when it resolves. A target that became illegal in
//! between makes the effects aimed at it fizzle.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{InstanceId, Seat, Session, StackItemId};
use crate::error::{GameError, Result};

/// What a card or ability may target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSpec {
    /// No chosen target.
    #[default]
    None,
    /// Either player.
    Player,
    /// A creature on either board.
    Creature,
    /// Any card on either board.
    Permanent,
    /// A creature on either board or either player.
    CreatureOrPlayer,
    /// A spell or ability on the stack.
    StackItem,
}

impl TargetSpec {
    /// Number of targets the action must supply.
    #[must_use]
    pub const fn required(self) -> usize {
        match self {
            TargetSpec::None => 0,
            _ => 1,
        }
    }
}

/// A concrete target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Player(Seat),
    Card(InstanceId),
    StackItem(StackItemId),
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Player(seat) => write!(f, "{seat}"),
            Target::Card(id) => write!(f, "{id}"),
            Target::StackItem(id) => write!(f, "{id}"),
        }
    }
}

/// Chosen targets. SmallVec keeps the common 0-2 targets inline.
pub type Targets = SmallVec<[Target; 2]>;

/// Whether `target` is currently legal for `spec`.
#[must_use]
pub fn is_legal(session: &Session, spec: TargetSpec, target: Target) -> bool {
    match (spec, target) {
        (TargetSpec::None, _) => false,
        (TargetSpec::Player | TargetSpec::CreatureOrPlayer, Target::Player(_)) => true,
        (TargetSpec::Creature | TargetSpec::CreatureOrPlayer, Target::Card(id)) => {
            session.is_in_play(id) && session.cards.get(id).is_some_and(|card| card.is_creature())
        }
        (TargetSpec::Permanent, Target::Card(id)) => session.is_in_play(id),
        (TargetSpec::StackItem, Target::StackItem(id)) => session.stack.contains(id),
        _ => false,
    }
}

/// Validate the targets supplied with a cast or activation.
pub fn validate(session: &Session, spec: TargetSpec, targets: &[Target]) -> Result<()> {
    if targets.len() != spec.required() {
        return Err(GameError::invalid_target(format!(
            "expected {} target(s), got {}",
            spec.required(),
            targets.len()
        )));
    }
    for &target in targets {
        if let Target::Card(id) = target {
            if session.cards.get(id).is_none() {
                return Err(GameError::not_found(id));
            }
        }
        if !is_legal(session, spec, target) {
            return Err(GameError::invalid_target(format!(
                "{target} is not a legal {spec:?} target"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_counts() {
        assert_eq!(TargetSpec::None.required(), 0);
        assert_eq!(TargetSpec::CreatureOrPlayer.required(), 1);
    }

    #[test]
    fn test_target_json() {
        let json = serde_json::to_string(&Target::Player(Seat::Second)).unwrap();
        assert_eq!(json, r#"{"player":"second"}"#);
        let back: Target = serde_json::from_str(r#"{"card":4}"#).unwrap();
        assert_eq!(back, Target::Card(InstanceId(4)));
    }
}

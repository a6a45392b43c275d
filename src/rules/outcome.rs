//! Win/loss evaluation.
//!
//! Runs after every committed action. Checks each seat in order (health at
//! or below zero, decked out, conceded or forfeited), collects every losing
//! seat and decides the result: two losers is a draw, one loser hands the
//! game to the other seat. Reaching the turn limit with nobody losing is
//! also a draw.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{PlayerId, Seat, Session, SessionStatus};

/// Why a seat left the game voluntarily or was removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForfeitReason {
    Conceded,
    Timeout,
    Disconnected,
    /// Nothing was committed for longer than the inactivity timeout.
    Inactive,
}

/// Why the losing seat lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossReason {
    HealthDepleted,
    DeckedOut,
    Conceded,
    Timeout,
    Disconnected,
    Inactive,
}

impl From<ForfeitReason> for LossReason {
    fn from(reason: ForfeitReason) -> Self {
        match reason {
            ForfeitReason::Conceded => LossReason::Conceded,
            ForfeitReason::Timeout => LossReason::Timeout,
            ForfeitReason::Disconnected => LossReason::Disconnected,
            ForfeitReason::Inactive => LossReason::Inactive,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawReason {
    /// Both seats met a loss condition after the same action.
    MutualLoss,
    TurnLimit,
}

/// Final result of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    Winner { player: PlayerId, reason: LossReason },
    Draw { reason: DrawReason },
}

impl GameResult {
    /// The winning player, `None` for a draw.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        match self {
            GameResult::Winner { player, .. } => Some(*player),
            GameResult::Draw { .. } => None,
        }
    }

    #[must_use]
    pub fn is_draw(&self) -> bool {
        matches!(self, GameResult::Draw { .. })
    }
}

/// First loss condition met by `seat`, if any.
#[must_use]
pub fn loss_reason(session: &Session, seat: Seat) -> Option<LossReason> {
    let player = &session.players[seat];
    if player.resources.health <= 0 {
        Some(LossReason::HealthDepleted)
    } else if player.decked {
        Some(LossReason::DeckedOut)
    } else {
        player.forfeit.map(LossReason::from)
    }
}

/// The result the current state implies, without applying it.
#[must_use]
pub fn check(session: &Session) -> Option<GameResult> {
    let losers: Vec<(Seat, LossReason)> = Seat::ALL
        .into_iter()
        .filter_map(|seat| loss_reason(session, seat).map(|reason| (seat, reason)))
        .collect();

    match losers.as_slice() {
        [] if session.turn_limit_reached => Some(GameResult::Draw {
            reason: DrawReason::TurnLimit,
        }),
        [] => None,
        [(seat, reason)] => Some(GameResult::Winner {
            player: session.player_id(seat.opponent()),
            reason: *reason,
        }),
        _ => Some(GameResult::Draw {
            reason: DrawReason::MutualLoss,
        }),
    }
}

/// Evaluate and, on a terminal state, finish the session.
///
/// On an already finished session this returns the stored result and
/// changes nothing.
pub fn evaluate(session: &mut Session, now: DateTime<Utc>) -> Option<GameResult> {
    if session.status == SessionStatus::Finished {
        return session.result;
    }
    let result = check(session)?;
    finish(session, result, now);
    Some(result)
}

/// Mark the session finished with `result`.
pub fn finish(session: &mut Session, result: GameResult, now: DateTime<Utc>) {
    session.status = SessionStatus::Finished;
    session.result = Some(result);
    session.finished_at = Some(now);
    session.stack.clear();
    session.combat = None;
    session.pending.clear();
    session.opening = None;
    session.ending_turn = false;
    session.timer.stop(now);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forfeit_maps_to_loss_reason() {
        assert_eq!(LossReason::from(ForfeitReason::Timeout), LossReason::Timeout);
        assert_eq!(LossReason::from(ForfeitReason::Conceded), LossReason::Conceded);
        assert_eq!(LossReason::from(ForfeitReason::Inactive), LossReason::Inactive);
    }

    #[test]
    fn test_result_winner() {
        let player = PlayerId::generate();
        let won = GameResult::Winner {
            player,
            reason: LossReason::DeckedOut,
        };
        assert_eq!(won.winner(), Some(player));
        assert!(!won.is_draw());

        let drawn = GameResult::Draw {
            reason: DrawReason::MutualLoss,
        };
        assert_eq!(drawn.winner(), None);
        assert!(drawn.is_draw());
    }

    #[test]
    fn test_result_json_shape() {
        let json = serde_json::to_value(GameResult::Draw {
            reason: DrawReason::TurnLimit,
        })
        .unwrap();
        assert_eq!(json["draw"]["reason"], "turn_limit");
    }
}

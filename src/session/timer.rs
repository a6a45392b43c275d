//! Per-seat game clocks.
//!
//! The seat holding priority is on the clock. Each uninterrupted stretch of
//! holding priority in one step is a *stint*; a stint longer than the turn
//! limit expires, and all stints together count against the game limit.
//! A seat may pause its clock; paused time is charged to its pause budget
//! instead.
//!
//! The timer never acts on its own. [`GameTimer::expired`] reports the first
//! expired clock and the session manager injects the matching system action
//! through the pipeline.
//!
//! All durations are milliseconds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{Seat, SeatMap, Step, TimerConfig};
use crate::error::{GameError, Result};

/// Which limit ran out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryKind {
    /// The current stint exceeded the turn limit.
    Turn,
    /// Total time used exceeded the game limit.
    Game,
    /// The pause budget is exhausted.
    Pause,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Expiry {
    pub seat: Seat,
    pub kind: ExpiryKind,
}

/// One seat's clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerClock {
    /// Banked time on the clock, excluding the running stint.
    pub time_used: i64,
    pub stint_started: Option<DateTime<Utc>>,
    pub pause_used: i64,
    pub paused_since: Option<DateTime<Utc>>,
}

impl PlayerClock {
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused_since.is_some()
    }

    /// Length of the running stint.
    #[must_use]
    pub fn stint(&self, now: DateTime<Utc>) -> i64 {
        self.stint_started
            .map_or(0, |start| (now - start).num_milliseconds().max(0))
    }

    /// Total time on the clock including the running stint.
    #[must_use]
    pub fn used(&self, now: DateTime<Utc>) -> i64 {
        self.time_used + self.stint(now)
    }

    /// Pause time used including the running pause.
    #[must_use]
    pub fn paused(&self, now: DateTime<Utc>) -> i64 {
        self.pause_used
            + self
                .paused_since
                .map_or(0, |since| (now - since).num_milliseconds().max(0))
    }

    fn bank(&mut self, now: DateTime<Utc>) {
        self.time_used += self.stint(now);
        self.stint_started = None;
    }
}

/// Remaining time for one seat, for client views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockReading {
    pub on_clock: bool,
    pub paused: bool,
    /// `None` when the limit is disabled.
    pub turn_remaining: Option<i64>,
    pub game_remaining: Option<i64>,
    pub pause_remaining: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTimer {
    pub clocks: SeatMap<PlayerClock>,
    pub started_at: Option<DateTime<Utc>>,
    /// Seat on the clock and the step its stint began in.
    holder: Option<(Seat, Step)>,
    turn_time_limit: i64,
    game_time_limit: i64,
    max_pause_time: i64,
}

fn millis(seconds: u64) -> i64 {
    i64::try_from(seconds.saturating_mul(1000)).unwrap_or(i64::MAX)
}

fn remaining(limit: i64, used: i64) -> Option<i64> {
    (limit > 0).then(|| (limit - used).max(0))
}

impl GameTimer {
    #[must_use]
    pub fn new(config: &TimerConfig) -> Self {
        Self {
            clocks: SeatMap::default(),
            started_at: None,
            holder: None,
            turn_time_limit: millis(config.turn_time_limit),
            game_time_limit: millis(config.game_time_limit),
            max_pause_time: millis(config.max_pause_time),
        }
    }

    /// Seat currently on the clock.
    #[must_use]
    pub fn holder(&self) -> Option<Seat> {
        self.holder.map(|(seat, _)| seat)
    }

    /// Put `seat` on the clock for `step`.
    ///
    /// Keeps the running stint when the same seat keeps priority in the same
    /// step; otherwise banks the previous stint and starts a new one.
    pub fn hand_over(&mut self, seat: Seat, step: Step, now: DateTime<Utc>) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
        if self.holder == Some((seat, step)) {
            return;
        }
        if let Some((previous, _)) = self.holder {
            self.clocks[previous].bank(now);
        }
        self.holder = Some((seat, step));
        let clock = &mut self.clocks[seat];
        if !clock.is_paused() {
            clock.stint_started = Some(now);
        }
    }

    /// Stop every clock (game over).
    pub fn stop(&mut self, now: DateTime<Utc>) {
        for (_, clock) in self.clocks.iter_mut() {
            clock.bank(now);
            if let Some(since) = clock.paused_since.take() {
                clock.pause_used += (now - since).num_milliseconds().max(0);
            }
        }
        self.holder = None;
    }

    /// Check whether `seat` may pause right now.
    pub fn check_pause(&self, seat: Seat, now: DateTime<Utc>) -> Result<()> {
        let clock = &self.clocks[seat];
        if clock.is_paused() {
            return Err(GameError::invalid_action("clock is already paused"));
        }
        if self.max_pause_time > 0 && clock.paused(now) >= self.max_pause_time {
            return Err(GameError::invalid_action("pause budget exhausted"));
        }
        Ok(())
    }

    pub fn pause(&mut self, seat: Seat, now: DateTime<Utc>) -> Result<()> {
        self.check_pause(seat, now)?;
        let clock = &mut self.clocks[seat];
        clock.bank(now);
        clock.paused_since = Some(now);
        Ok(())
    }

    pub fn check_resume(&self, seat: Seat) -> Result<()> {
        if self.clocks[seat].is_paused() {
            Ok(())
        } else {
            Err(GameError::invalid_action("clock is not paused"))
        }
    }

    pub fn resume(&mut self, seat: Seat, now: DateTime<Utc>) -> Result<()> {
        self.check_resume(seat)?;
        let on_clock = self.holder() == Some(seat);
        let clock = &mut self.clocks[seat];
        if let Some(since) = clock.paused_since.take() {
            clock.pause_used += (now - since).num_milliseconds().max(0);
        }
        if on_clock {
            clock.stint_started = Some(now);
        }
        Ok(())
    }

    /// First expired clock, game limit before pause before turn. Read only.
    #[must_use]
    pub fn expired(&self, now: DateTime<Utc>) -> Option<Expiry> {
        let kinds = [ExpiryKind::Game, ExpiryKind::Pause, ExpiryKind::Turn];
        kinds.into_iter().find_map(|kind| {
            Seat::ALL
                .into_iter()
                .find(|&seat| self.is_expired(seat, kind, now))
                .map(|seat| Expiry { seat, kind })
        })
    }

    /// Expiry affecting one seat.
    #[must_use]
    pub fn expired_for(&self, seat: Seat, now: DateTime<Utc>) -> Option<ExpiryKind> {
        [ExpiryKind::Game, ExpiryKind::Pause, ExpiryKind::Turn]
            .into_iter()
            .find(|&kind| self.is_expired(seat, kind, now))
    }

    fn is_expired(&self, seat: Seat, kind: ExpiryKind, now: DateTime<Utc>) -> bool {
        let clock = &self.clocks[seat];
        match kind {
            ExpiryKind::Game => self.game_time_limit > 0 && clock.used(now) > self.game_time_limit,
            ExpiryKind::Pause => {
                self.max_pause_time > 0 && clock.is_paused() && clock.paused(now) > self.max_pause_time
            }
            ExpiryKind::Turn => {
                self.turn_time_limit > 0
                    && self.holder() == Some(seat)
                    && clock.stint_started.is_some()
                    && clock.stint(now) > self.turn_time_limit
            }
        }
    }

    #[must_use]
    pub fn reading(&self, seat: Seat, now: DateTime<Utc>) -> ClockReading {
        let clock = &self.clocks[seat];
        let on_clock = self.holder() == Some(seat);
        ClockReading {
            on_clock,
            paused: clock.is_paused(),
            turn_remaining: if on_clock {
                remaining(self.turn_time_limit, clock.stint(now))
            } else {
                remaining(self.turn_time_limit, 0)
            },
            game_remaining: remaining(self.game_time_limit, clock.used(now)),
            pause_remaining: remaining(self.max_pause_time, clock.paused(now)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(seconds)
    }

    fn timer() -> GameTimer {
        GameTimer::new(&TimerConfig {
            turn_time_limit: 60,
            game_time_limit: 100,
            max_pause_time: 30,
        })
    }

    #[test]
    fn test_stint_expires_after_turn_limit() {
        let mut timer = timer();
        timer.hand_over(Seat::First, Step::Main1, t(0));
        assert_eq!(timer.expired(t(60)), None);
        assert_eq!(
            timer.expired(t(61)),
            Some(Expiry {
                seat: Seat::First,
                kind: ExpiryKind::Turn
            })
        );
    }

    #[test]
    fn test_same_holder_same_step_keeps_stint() {
        let mut timer = timer();
        timer.hand_over(Seat::First, Step::Main1, t(0));
        timer.hand_over(Seat::First, Step::Main1, t(50));
        assert!(timer.expired(t(61)).is_some());

        timer.hand_over(Seat::First, Step::CombatBegin, t(61));
        assert_eq!(timer.expired(t(62)), None);
        assert_eq!(timer.clocks[Seat::First].time_used, 61_000);
    }

    #[test]
    fn test_game_limit_counts_banked_time() {
        let mut timer = timer();
        timer.hand_over(Seat::First, Step::Main1, t(0));
        timer.hand_over(Seat::Second, Step::Main1, t(55));
        timer.hand_over(Seat::First, Step::Main1, t(60));
        timer.hand_over(Seat::Second, Step::End, t(110));
        assert_eq!(timer.clocks[Seat::First].time_used, 105_000);
        assert_eq!(
            timer.expired(t(110)),
            Some(Expiry {
                seat: Seat::First,
                kind: ExpiryKind::Game
            })
        );
    }

    #[test]
    fn test_paused_time_goes_to_pause_budget() {
        let mut timer = timer();
        timer.hand_over(Seat::First, Step::Main1, t(0));
        timer.pause(Seat::First, t(10)).unwrap();
        assert!(timer.pause(Seat::First, t(11)).is_err());

        // Paused holder is not charged turn time
        assert_eq!(timer.expired(t(25)), None);
        timer.resume(Seat::First, t(30)).unwrap();
        let clock = timer.clocks[Seat::First];
        assert_eq!(clock.time_used, 10_000);
        assert_eq!(clock.pause_used, 20_000);
        assert!(timer.resume(Seat::First, t(31)).is_err());
    }

    #[test]
    fn test_pause_budget_expiry() {
        let mut timer = timer();
        timer.hand_over(Seat::First, Step::Main1, t(0));
        timer.pause(Seat::Second, t(0)).unwrap();
        assert_eq!(
            timer.expired(t(31)),
            Some(Expiry {
                seat: Seat::Second,
                kind: ExpiryKind::Pause
            })
        );
    }

    #[test]
    fn test_zero_disables_limits() {
        let mut timer = GameTimer::new(&TimerConfig {
            turn_time_limit: 0,
            game_time_limit: 0,
            max_pause_time: 0,
        });
        timer.hand_over(Seat::First, Step::Main1, t(0));
        assert_eq!(timer.expired(t(100_000)), None);
        assert_eq!(timer.reading(Seat::First, t(5)).game_remaining, None);
    }

    #[test]
    fn test_stop_banks_everything() {
        let mut timer = timer();
        timer.hand_over(Seat::Second, Step::Main1, t(0));
        timer.stop(t(20));
        assert_eq!(timer.holder(), None);
        assert_eq!(timer.clocks[Seat::Second].time_used, 20_000);
        assert_eq!(timer.expired(t(1000)), None);
    }
}

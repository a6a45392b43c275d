//! Engine configuration.
//!
//! Embedders configure the engine once and every session created by a
//! manager inherits a copy (the copy is persisted with the session, so a
//! config change never alters games already in flight).
//!
//! - `RulesConfig`: life, hand, mana, board and turn limits
//! - `ActionLimits`: per-turn caps enforced by the pipeline
//! - `TimerConfig`: clock limits in seconds (0 disables a limit)
//! - `SessionConfig`: retention of finished, abandoned and idle sessions
//!
//! Every section deserializes with defaults, so a partial document only
//! overrides what it names:
//!
//! ```
//! use ccg_session::core::EngineConfig;
//!
//! let config: EngineConfig = serde_json::from_str(r#"{"rules": {"starting_life": 30}}"#).unwrap();
//! assert_eq!(config.rules.starting_life, 30);
//! assert_eq!(config.rules.max_hand_size, 10);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Game rule parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub starting_life: i64,
    pub max_life: i64,
    pub starting_hand_size: usize,
    pub max_hand_size: usize,
    pub draw_per_turn: u32,
    /// Whether the first seat draws on turn 1.
    pub first_player_draws: bool,
    pub max_mana: u32,
    /// Mana cap growth at the start of each of a seat's turns.
    pub mana_per_turn: u32,
    pub max_board_creatures: usize,
    /// The game is a draw once the turn number would exceed this.
    pub max_turns: u32,
    /// Open the game with a mulligan window before turn 1.
    pub mulligan: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            starting_life: 20,
            max_life: 999,
            starting_hand_size: 7,
            max_hand_size: 10,
            draw_per_turn: 1,
            first_player_draws: false,
            max_mana: 10,
            mana_per_turn: 1,
            max_board_creatures: 5,
            max_turns: 50,
            mulligan: false,
        }
    }
}

/// Per-turn caps on what one player may do.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionLimits {
    /// Capped actions per turn (passing, ending the turn, conceding and
    /// clock actions never count).
    pub max_actions_per_turn: u32,
    pub max_cards_played_per_turn: u32,
    /// Attackers declared per turn.
    pub max_attacks_per_turn: u32,
}

impl Default for ActionLimits {
    fn default() -> Self {
        Self {
            max_actions_per_turn: 20,
            max_cards_played_per_turn: 3,
            max_attacks_per_turn: 5,
        }
    }
}

/// Clock limits, in seconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Longest uninterrupted priority stint.
    pub turn_time_limit: u64,
    /// Total time a seat may spend holding priority over the game.
    pub game_time_limit: u64,
    /// Total pause budget per seat.
    pub max_pause_time: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            turn_time_limit: 60,
            game_time_limit: 1800,
            max_pause_time: 300,
        }
    }
}

/// Session lifecycle parameters, in seconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long a finished session stays loadable.
    pub retention: u64,
    /// How long a session may wait for its second player.
    pub waiting_timeout: u64,
    /// How long a game in progress may go without a committed action
    /// before the seat holding priority forfeits. 0 disables.
    pub inactivity_timeout: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            retention: 3600,
            waiting_timeout: 3600,
            inactivity_timeout: 300,
        }
    }
}

/// Complete engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rules: RulesConfig,
    pub limits: ActionLimits,
    pub timer: TimerConfig,
    pub session: SessionConfig,
}

impl EngineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rules(mut self, rules: RulesConfig) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn with_limits(mut self, limits: ActionLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn with_timer(mut self, timer: TimerConfig) -> Self {
        self.timer = timer;
        self
    }

    #[must_use]
    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    #[must_use]
    pub fn with_starting_life(mut self, life: i64) -> Self {
        self.rules.starting_life = life;
        self
    }

    #[must_use]
    pub fn with_starting_hand_size(mut self, size: usize) -> Self {
        self.rules.starting_hand_size = size;
        self
    }

    #[must_use]
    pub fn with_max_hand_size(mut self, size: usize) -> Self {
        self.rules.max_hand_size = size;
        self
    }

    #[must_use]
    pub fn with_max_turns(mut self, turns: u32) -> Self {
        self.rules.max_turns = turns;
        self
    }

    #[must_use]
    pub fn with_mulligan(mut self, enabled: bool) -> Self {
        self.rules.mulligan = enabled;
        self
    }

    #[must_use]
    pub fn with_inactivity_timeout(mut self, seconds: u64) -> Self {
        self.session.inactivity_timeout = seconds;
        self
    }

    /// Disable every clock limit.
    #[must_use]
    pub fn without_clocks(mut self) -> Self {
        self.timer = TimerConfig {
            turn_time_limit: 0,
            game_time_limit: 0,
            max_pause_time: 0,
        };
        self
    }

    /// Reject configurations no game could be played under.
    pub fn validate(&self) -> Result<()> {
        let rules = &self.rules;
        if rules.starting_life <= 0 {
            return Err(GameError::invalid_action("starting_life must be positive"));
        }
        if rules.max_life < rules.starting_life {
            return Err(GameError::invalid_action("max_life is below starting_life"));
        }
        if rules.max_hand_size == 0 {
            return Err(GameError::invalid_action("max_hand_size must be positive"));
        }
        if rules.max_mana == 0 {
            return Err(GameError::invalid_action("max_mana must be positive"));
        }
        if rules.max_turns == 0 {
            return Err(GameError::invalid_action("max_turns must be positive"));
        }
        Ok(())
    }
}

//! Error taxonomy for the session engine.
//!
//! Every rejection carries a stable machine-readable [`ErrorCode`] and a
//! human-readable reason (the `Display` output).
//!
//! ## Recoverable vs fatal
//!
//! `InvalidAction`, `InvalidTarget`, `InsufficientResources` and
//! `InvalidZoneTransition` reject a single action and leave the session
//! untouched. `InvalidGameState` means an internal invariant broke; the
//! session that raised it is marked faulted and accepts no further actions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GameError>;

/// Errors produced by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    /// Wrong step, priority or action type for this moment.
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// A chosen target is not legal for the card or ability.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// Not enough mana or energy to pay a cost.
    #[error("insufficient resources: need {needed} {resource}, have {available}")]
    InsufficientResources {
        resource: &'static str,
        needed: u32,
        available: u32,
    },

    /// A card was moved out of a zone it is not in.
    #[error("card {card} is not in {from}")]
    InvalidZoneTransition { card: String, from: String },

    /// An internal invariant is broken. Always fatal to the session.
    #[error("invalid game state: {0}")]
    InvalidGameState(String),

    /// Unknown session, player, card or stack item.
    #[error("not found: {0}")]
    NotFound(String),

    /// The acting player has exceeded a clock.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Encoding or storage of a session record failed.
    #[error("persistence error: {0}")]
    Persistence(String),
}

/// Machine-readable error codes exposed to clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidAction,
    InvalidTarget,
    InsufficientResources,
    InvalidGameState,
    NotFound,
    Timeout,
    PersistenceError,
}

impl ErrorCode {
    /// The wire representation, e.g. `"INVALID_ACTION"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidAction => "INVALID_ACTION",
            ErrorCode::InvalidTarget => "INVALID_TARGET",
            ErrorCode::InsufficientResources => "INSUFFICIENT_RESOURCES",
            ErrorCode::InvalidGameState => "INVALID_GAME_STATE",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::PersistenceError => "PERSISTENCE_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GameError {
    /// Shorthand for [`GameError::InvalidAction`].
    pub fn invalid_action(reason: impl Into<String>) -> Self {
        Self::InvalidAction(reason.into())
    }

    /// Shorthand for [`GameError::InvalidTarget`].
    pub fn invalid_target(reason: impl Into<String>) -> Self {
        Self::InvalidTarget(reason.into())
    }

    /// Shorthand for [`GameError::InvalidGameState`].
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidGameState(reason.into())
    }

    /// Shorthand for [`GameError::NotFound`].
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::NotFound(what.to_string())
    }

    /// Machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            GameError::InvalidAction(_) | GameError::InvalidZoneTransition { .. } => {
                ErrorCode::InvalidAction
            }
            GameError::InvalidTarget(_) => ErrorCode::InvalidTarget,
            GameError::InsufficientResources { .. } => ErrorCode::InsufficientResources,
            GameError::InvalidGameState(_) => ErrorCode::InvalidGameState,
            GameError::NotFound(_) => ErrorCode::NotFound,
            GameError::Timeout(_) => ErrorCode::Timeout,
            GameError::Persistence(_) => ErrorCode::PersistenceError,
        }
    }

    /// HTTP-style status for the API layer.
    ///
    /// 409 for illegal-in-this-state, 422 for bad targets or costs,
    /// 404 for unknown ids, 500 for fatal faults.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self.code() {
            ErrorCode::InvalidAction | ErrorCode::Timeout => 409,
            ErrorCode::InvalidTarget | ErrorCode::InsufficientResources => 422,
            ErrorCode::NotFound => 404,
            ErrorCode::InvalidGameState | ErrorCode::PersistenceError => 500,
        }
    }

    /// True when the session that produced this error is no longer usable.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, GameError::InvalidGameState(_))
    }
}

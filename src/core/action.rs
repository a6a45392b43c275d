//! Actions and the action log.
//!
//! Every change to a session is an [`Action`]: a closed, tagged set of
//! kinds dispatched through one validation/apply table in the pipeline.
//! Clients submit player actions; the engine itself generates system
//! actions (forced discards, triggered abilities, cleanup, timeouts) and
//! runs them through the same pipeline.
//!
//! ## Example
//!
//! ```
//! use ccg_session::core::{Action, ActionKind, PlayerId};
//!
//! let player = PlayerId::generate();
//! let pass = Action::player(player, ActionKind::PassPriority);
//! assert!(!pass.kind.is_system_only());
//!
//! let json = serde_json::to_value(&pass.kind).unwrap();
//! assert_eq!(json, "pass_priority");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{ActionId, InstanceId};
use super::phase::Step;
use super::player::PlayerId;
use crate::combat::{Block, DamageAssignment};
use crate::effects::Targets;
use crate::rules::ForfeitReason;
use crate::triggers::GameEvent;

/// Where an action came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOrigin {
    Player,
    System,
}

/// The closed set of action kinds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    PassPriority,
    EndTurn,
    PlayCard {
        card: InstanceId,
        targets: Targets,
    },
    ActivateAbility {
        source: InstanceId,
        ability: usize,
        targets: Targets,
    },
    DeclareAttackers {
        attackers: Vec<InstanceId>,
    },
    DeclareBlockers {
        blocks: Vec<Block>,
    },
    /// Damage order for one multiply blocked attacker.
    AssignDamage {
        attacker: InstanceId,
        assignments: Vec<DamageAssignment>,
    },
    Concede,
    PauseClock,
    ResumeClock,
    /// Return the opening hand, reshuffle and draw one card fewer.
    Mulligan,
    /// Keep the opening hand.
    KeepHand,

    // System only
    ForcedDiscard {
        card: InstanceId,
    },
    FinishCleanup,
    PutTrigger {
        source: InstanceId,
        trigger: usize,
    },
    Forfeit {
        reason: ForfeitReason,
    },
}

impl ActionKind {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            ActionKind::PassPriority => "pass_priority",
            ActionKind::EndTurn => "end_turn",
            ActionKind::PlayCard { .. } => "play_card",
            ActionKind::ActivateAbility { .. } => "activate_ability",
            ActionKind::DeclareAttackers { .. } => "declare_attackers",
            ActionKind::DeclareBlockers { .. } => "declare_blockers",
            ActionKind::AssignDamage { .. } => "assign_damage",
            ActionKind::Concede => "concede",
            ActionKind::PauseClock => "pause_clock",
            ActionKind::ResumeClock => "resume_clock",
            ActionKind::Mulligan => "mulligan",
            ActionKind::KeepHand => "keep_hand",
            ActionKind::ForcedDiscard { .. } => "forced_discard",
            ActionKind::FinishCleanup => "finish_cleanup",
            ActionKind::PutTrigger { .. } => "put_trigger",
            ActionKind::Forfeit { .. } => "forfeit",
        }
    }

    /// Kinds a client may never submit.
    #[must_use]
    pub const fn is_system_only(&self) -> bool {
        matches!(
            self,
            ActionKind::ForcedDiscard { .. }
                | ActionKind::FinishCleanup
                | ActionKind::PutTrigger { .. }
                | ActionKind::Forfeit { .. }
        )
    }

    /// Kinds that need the acting seat to hold priority.
    #[must_use]
    pub const fn needs_priority(&self) -> bool {
        matches!(
            self,
            ActionKind::PassPriority
                | ActionKind::EndTurn
                | ActionKind::PlayCard { .. }
                | ActionKind::ActivateAbility { .. }
                | ActionKind::DeclareAttackers { .. }
                | ActionKind::DeclareBlockers { .. }
                | ActionKind::AssignDamage { .. }
                | ActionKind::Mulligan
                | ActionKind::KeepHand
        )
    }

    /// Kinds allowed while opening hands are being decided.
    #[must_use]
    pub const fn allowed_before_first_turn(&self) -> bool {
        matches!(
            self,
            ActionKind::Mulligan
                | ActionKind::KeepHand
                | ActionKind::Concede
                | ActionKind::PauseClock
                | ActionKind::ResumeClock
                | ActionKind::Forfeit { .. }
        )
    }

    /// Passing, ending the turn, conceding, clock control and system
    /// actions are never capped.
    #[must_use]
    pub const fn counts_toward_limit(&self) -> bool {
        matches!(
            self,
            ActionKind::PlayCard { .. }
                | ActionKind::ActivateAbility { .. }
                | ActionKind::DeclareAttackers { .. }
                | ActionKind::DeclareBlockers { .. }
                | ActionKind::AssignDamage { .. }
        )
    }
}

/// One action submitted to a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    /// Player the action is taken for. Supplied by the auth layer and trusted.
    pub player: PlayerId,
    pub origin: ActionOrigin,
    pub kind: ActionKind,
    pub issued_at: Option<DateTime<Utc>>,
}

impl Action {
    /// A client action.
    #[must_use]
    pub fn player(player: PlayerId, kind: ActionKind) -> Self {
        Self {
            id: ActionId::generate(),
            player,
            origin: ActionOrigin::Player,
            kind,
            issued_at: None,
        }
    }

    /// An engine-generated action taken on behalf of `player`.
    #[must_use]
    pub fn system(player: PlayerId, kind: ActionKind) -> Self {
        Self {
            origin: ActionOrigin::System,
            ..Self::player(player, kind)
        }
    }

    #[must_use]
    pub fn issued_at(mut self, at: DateTime<Utc>) -> Self {
        self.issued_at = Some(at);
        self
    }

    #[must_use]
    pub fn is_system(&self) -> bool {
        self.origin == ActionOrigin::System
    }
}

/// A committed action with the events it produced.
///
/// Only applied actions are logged; rejected ones leave no trace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Position in the session's log, starting at 1.
    pub sequence: u64,
    pub action: Action,
    /// Turn and step in which the action was accepted.
    pub turn: u32,
    pub step: Step,
    pub events: Vec<GameEvent>,
    pub applied_at: DateTime<Utc>,
}

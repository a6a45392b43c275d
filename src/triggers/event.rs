//! Game events.
//!
//! Every committed action produces the list of events it caused. The list is
//! returned to the client as the action's applied effects, stored in the
//! action log, and scanned for triggered abilities.

use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::combat::{Block, CasualtyCause, DamageRecipient};
use crate::core::{InstanceId, Seat, StackItemId, Step};
use crate::effects::{Modifier, Target};
use crate::rules::{ForfeitReason, GameResult};
use crate::stack::StackItemKind;
use crate::zones::Zone;

/// Something that happened during an action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEvent {
    TurnStarted {
        turn: u32,
        active: Seat,
    },
    StepChanged {
        from: Step,
        to: Step,
    },
    PriorityPassed {
        seat: Seat,
    },
    PermanentsUntapped {
        seat: Seat,
        count: u32,
    },
    CardMoved {
        card: InstanceId,
        card_id: CardId,
        owner: Seat,
        from: Zone,
        to: Zone,
    },
    /// A required draw found an empty deck.
    DeckedOut {
        seat: Seat,
    },
    ResourcesPaid {
        seat: Seat,
        mana: u32,
        energy: u32,
    },
    ManaGained {
        seat: Seat,
        amount: u32,
    },
    EnergyGained {
        seat: Seat,
        amount: u32,
    },
    HealthChanged {
        seat: Seat,
        delta: i64,
        health: i64,
    },
    DamageDealt {
        source: Option<InstanceId>,
        target: DamageRecipient,
        amount: u32,
        combat: bool,
    },
    DamageHealed {
        card: InstanceId,
        amount: i64,
    },
    CountersChanged {
        card: InstanceId,
        counter: String,
        amount: i64,
    },
    ModifierAdded {
        target: Target,
        modifier: Modifier,
    },
    ModifiersExpired {
        count: u32,
    },
    CardTapped {
        card: InstanceId,
    },
    StackItemPushed {
        item: StackItemId,
        kind: StackItemKind,
        source: InstanceId,
        controller: Seat,
    },
    StackItemResolved {
        item: StackItemId,
    },
    /// Removed from the stack without running its effects.
    StackItemCountered {
        item: StackItemId,
        by: StackItemId,
    },
    /// One effect of a resolving item had no legal recipient.
    EffectFizzled {
        item: StackItemId,
        effect: String,
        reason: String,
    },
    AttackersDeclared {
        seat: Seat,
        attackers: Vec<InstanceId>,
    },
    BlockersDeclared {
        seat: Seat,
        blocks: Vec<Block>,
    },
    DamageAssignmentOrdered {
        attacker: InstanceId,
    },
    CreatureDied {
        card: InstanceId,
        owner: Seat,
        cause: CasualtyCause,
    },
    /// The seat returned its hand and drew `hand_size` cards.
    MulliganTaken {
        seat: Seat,
        mulligans: u32,
        hand_size: usize,
    },
    HandKept {
        seat: Seat,
        hand_size: usize,
    },
    ClockPaused {
        seat: Seat,
    },
    ClockResumed {
        seat: Seat,
    },
    Conceded {
        seat: Seat,
        reason: ForfeitReason,
    },
    GameEnded {
        result: GameResult,
    },
}

impl GameEvent {
    /// Card entering the board, if this event is one.
    #[must_use]
    pub fn entered_board(&self) -> Option<InstanceId> {
        match self {
            GameEvent::CardMoved {
                card,
                to: Zone::Board,
                from,
                ..
            } if *from != Zone::Board => Some(*card),
            _ => None,
        }
    }
}

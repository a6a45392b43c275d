//! Combat resolution.
//!
//! Combat is a state machine nested in the turn: `combat_begin` opens it,
//! the active seat declares attackers in `combat_attack`, the defending seat
//! declares blockers in `combat_block` (where the attacking seat may also
//! fix the damage order of a multiply blocked attacker), damage is dealt on
//! entering `combat_damage`, and casualties go to the graveyard on entering
//! `combat_end`.
//!
//! ## Key Components
//!
//! - [`CombatState`]: attackers, blocks, snapshots, damage log, casualties
//! - `declare`: validation and application of the three declarations
//! - `damage`: assignment rules and the simultaneous damage sub-steps

pub mod damage;
pub mod declare;
mod state;

pub use state::{
    Block, BlockAssignment, Casualty, CasualtyCause, CombatCreature, CombatPhase, CombatState,
    DamageAssignment, DamageRecipient, DamageRecord,
};

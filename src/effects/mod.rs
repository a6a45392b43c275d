//! Effect system for card abilities.
//!
//! Effects are the building blocks of card text:
//! - `Effect` / `EffectSpec`: the closed effect vocabulary and its recipients
//! - `TargetSpec` / `Target`: what may be targeted and what was chosen
//! - `Modifier`: timed stat, keyword and player modifiers
//! - `EffectResolver`: executes a stack item on the session
//!
//! There is no rules-text interpreter: a card's behavior is exactly the
//! list of effect specs on its definition.

mod effect;
pub mod modifier;
mod resolver;
pub mod targeting;

pub use effect::{Effect, EffectSpec, Recipient};
pub use modifier::{Modifier, ModifierKind};
pub use resolver::{EffectResolver, ResolveResult};
pub use targeting::{Target, TargetSpec, Targets};

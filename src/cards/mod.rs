//! Card system: definitions, keywords, instances, the instance store and
//! the catalog boundary.
//!
//! ## Key Types
//!
//! - `CardId`: identifier for card definitions
//! - `CardDefinition`: immutable card data from the catalog
//! - `CardInstance`: runtime state of one dealt card
//! - `InstanceStore`: arena of every instance in a session
//! - `CardCatalog` / `CardRegistry`: where definitions and decks come from

pub mod definition;
pub mod instance;
pub mod keywords;
pub mod registry;
pub mod store;

pub use definition::{
    ActivatedAbility, CardDefinition, CardId, CardKind, TriggerCondition, TriggeredAbility,
};
pub use instance::{CardInstance, MINUS_COUNTER, PLUS_COUNTER};
pub use keywords::{Keyword, Keywords};
pub use registry::{CardCatalog, CardRegistry, DeckId};
pub use store::InstanceStore;

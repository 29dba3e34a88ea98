//! stat_core - Derived stat recomputation for Alien RPG sheets
//!
//! This library provides:
//! - StatAccumulator: modifier deltas summed from active gear and armor
//! - SupplyTotals: armor rating and consumables summed from active items
//! - prepare_actor: the full derive pass over an actor
//!
//! # Quick Start
//!
//! ```rust
//! use stat_core::prelude::*;
//! use sheet_core::{Actor, ActorKind, Attribute, CharacterSheet};
//!
//! let sheet = CharacterSheet::default().with_attribute(Attribute::Strength, 4);
//! let actor = Actor::new("a1", "Ripley", ActorKind::Character(sheet));
//! let prepared = prepare_actor(&actor);
//! assert_eq!(prepared.sheet().unwrap().header.health.max, 4);
//! ```

pub mod aggregator;
pub mod prelude;
pub mod resolver;
pub mod supplies;

pub use aggregator::StatAccumulator;
pub use resolver::{prepare_actor, prepare_in_place, resolve_sheet};
pub use supplies::SupplyTotals;

//! roll_core - Dice, panic and supply rules for Alien RPG sheets
//!
//! This library provides:
//! - Dice pools: base and stress dice with push, returned as values
//! - Panic: `1d6 + stress` resolution with onset, escalation and trauma
//! - Supply checks: stress-die depletion of consumable item stacks
//! - Host ports: actor store, chat log, modifier dialog
//! - SheetActions: the handlers sheet buttons call
//!
//! # Quick Start
//!
//! ```rust
//! use roll_core::dice::{DicePool, RollKind, ScriptedDice};
//! use roll_core::config::DiceRules;
//!
//! let dice = ScriptedDice::constant(6);
//! let roll = DicePool::new(RollKind::Character, "Agility", 5, 0)
//!     .roll(&dice, &DiceRules::default())
//!     .resolve();
//! assert_eq!(roll.report.sixes, 5);
//! ```

pub mod actions;
pub mod chat;
pub mod config;
pub mod dialog;
pub mod dice;
pub mod locks;
pub mod memory;
pub mod panic;
pub mod store;
pub mod supply;
pub mod visibility;

pub use actions::{
    AbilityRoll, AcidRoll, AcidSource, DiceSource, MeterButton, PanicRoll, SheetActions,
    SupplyCheck, TrackStep,
};
pub use config::{ConfigError, RulesConfig};
pub use dice::{DicePool, DieRoller, PushError, ResolvedRoll, RollKind, RolledPool};
pub use panic::{resolve_panic, PanicOutcome, PanicSubject, PanicTier};
pub use store::{ActorStore, StoreError};
pub use visibility::{Audience, RollMode, Visibility};

use sheet_core::{ActorId, ItemId};
use thiserror::Error;

/// Error from a sheet action
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Actor not found: {0}")]
    ActorNotFound(ActorId),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Table(#[from] tables_core::RollError),
    #[error(transparent)]
    Push(#[from] PushError),
    /// Item stacks were written but a later write failed; nothing is rolled back
    #[error("Actor '{actor}': item(s) {items:?} were updated before a write failed: {source}")]
    PartialUpdate {
        actor: ActorId,
        items: Vec<ItemId>,
        #[source]
        source: StoreError,
    },
}

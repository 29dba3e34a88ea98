//! sheet_core - Typed actor and item model for Alien RPG sheets
//!
//! This library provides:
//! - Actor: one of five kinds (character, synthetic, vehicle, creature, territory)
//! - Item: gear, armor, weapons and other owned documents
//! - Typed patches: the only way roll handlers write back to a sheet
//! - Roll data: the flattened view roll formulas and macros read

pub mod actor;
pub mod item;
pub mod patch;
pub mod roll_data;
pub mod types;
pub mod value;

pub use actor::{
    Actor, ActorId, ActorKind, AttributeScore, CharacterSheet, Consumables, Gauge, General,
    Header, Meter, PanicTrack, RawSheet, SkillScore, TokenPrototype, TrackScore,
    PLACEHOLDER_TOKEN_IMG,
};
pub use item::{Item, ItemId, ItemKind, ModifierMap};
pub use patch::{ActorPatch, ItemPatch, PatchError};
pub use roll_data::{roll_data, slugify};
pub use types::{Attribute, Consumable, Skill, Track};
pub use value::{LooseInt, ValueField};

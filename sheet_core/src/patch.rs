//! Typed field updates
//!
//! Every write the roll engine makes to an actor or item is one of these
//! variants. Applying a patch never mutates its input; it returns the
//! updated record so stores can swap it in atomically.

use crate::actor::{Actor, ActorId};
use crate::item::Item;
use crate::types::{Consumable, Track};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PatchError {
    #[error("Actor '{actor}' of type {kind} has no {field} field")]
    MissingField {
        actor: ActorId,
        kind: &'static str,
        field: &'static str,
    },
}

/// A single-field update to an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorPatch {
    StressValue(i64),
    HealthValue(i64),
    TrackValue(Track, i64),
    PanicLastRoll(i64),
    Consumable(Consumable, i64),
}

impl ActorPatch {
    fn field(&self) -> &'static str {
        match self {
            ActorPatch::StressValue(_) => "header.stress.value",
            ActorPatch::HealthValue(_) => "header.health.value",
            ActorPatch::TrackValue(..) => "general.<track>.value",
            ActorPatch::PanicLastRoll(_) => "general.panic.lastRoll",
            ActorPatch::Consumable(..) => "consumables.<supply>.value",
        }
    }

    /// Return a copy of `actor` with this patch applied
    pub fn apply(&self, actor: &Actor) -> Result<Actor, PatchError> {
        let mut updated = actor.clone();
        self.apply_in_place(&mut updated)?;
        Ok(updated)
    }

    pub fn apply_in_place(&self, actor: &mut Actor) -> Result<(), PatchError> {
        let kind = actor.kind.type_name();
        let field = self.field();
        let Some(sheet) = actor.kind.sheet_mut() else {
            return Err(PatchError::MissingField {
                actor: actor.id.clone(),
                kind,
                field,
            });
        };

        match *self {
            ActorPatch::StressValue(v) => sheet.header.stress.value = v,
            ActorPatch::HealthValue(v) => sheet.header.health.value = v,
            ActorPatch::TrackValue(track, v) => sheet.general.track_mut(track).value = v,
            ActorPatch::PanicLastRoll(v) => sheet.general.panic.last_roll = v,
            ActorPatch::Consumable(consumable, v) => sheet.consumables.set(consumable, v),
        }
        Ok(())
    }
}

/// A single-field update to an owned item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemPatch {
    Supply(Consumable, i64),
    Active(bool),
}

impl ItemPatch {
    pub fn apply(&self, item: &Item) -> Item {
        let mut updated = item.clone();
        self.apply_in_place(&mut updated);
        updated
    }

    pub fn apply_in_place(&self, item: &mut Item) {
        match self {
            ItemPatch::Supply(consumable, v) => {
                item.set_attribute(consumable.item_attribute_key(), Value::from(*v))
            }
            ItemPatch::Active(active) => item.active = *active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ActorKind, CharacterSheet, RawSheet};
    use crate::item::ItemKind;

    #[test]
    fn test_apply_returns_new_record() {
        let actor = Actor::new("a1", "Hicks", ActorKind::Character(CharacterSheet::default()));
        let updated = ActorPatch::StressValue(3).apply(&actor).unwrap();

        assert_eq!(actor.sheet().unwrap().header.stress.value, 0);
        assert_eq!(updated.sheet().unwrap().header.stress.value, 3);
    }

    #[test]
    fn test_track_and_supply_patches() {
        let mut actor = Actor::new("a1", "Hicks", ActorKind::Character(CharacterSheet::default()));
        ActorPatch::TrackValue(Track::Panic, 2).apply_in_place(&mut actor).unwrap();
        ActorPatch::PanicLastRoll(9).apply_in_place(&mut actor).unwrap();
        ActorPatch::Consumable(Consumable::Air, 5).apply_in_place(&mut actor).unwrap();

        let sheet = actor.sheet().unwrap();
        assert_eq!(sheet.general.panic.track.value, 2);
        assert_eq!(sheet.general.panic.last_roll, 9);
        assert_eq!(sheet.consumables.air.value, 5);
    }

    #[test]
    fn test_patch_on_vehicle_fails() {
        let actor = Actor::new("v1", "Cheyenne", ActorKind::Vehicle(RawSheet::default()));
        let err = ActorPatch::HealthValue(1).apply(&actor).unwrap_err();
        assert!(matches!(err, PatchError::MissingField { kind: "vehicles", .. }));
    }

    #[test]
    fn test_item_supply_patch() {
        let item = Item::new("i1", "Water Canteen", ItemKind::Other("item".into()))
            .with_supply(Consumable::Water, 4);
        let updated = ItemPatch::Supply(Consumable::Water, 2).apply(&item);
        assert_eq!(item.supply(Consumable::Water), Some(4));
        assert_eq!(updated.supply(Consumable::Water), Some(2));
    }
}

//! Derived stat resolution - full recompute of every derived sheet field
//!
//! Order within a pass:
//! 1. Aggregate modifiers from active items
//! 2. Attribute mods (base + item deltas)
//! 3. Skill mods (base + linked attribute mod + item deltas); needs step 2
//! 4. Health/stress mods, health ceiling, calculatedMax mirrors
//! 5. Armor and consumable totals

use crate::aggregator::StatAccumulator;
use crate::supplies::SupplyTotals;
use sheet_core::{Actor, ActorKind, Attribute, CharacterSheet, Consumable, Item, Track};

/// Tracks whose `calculatedMax` mirrors `max` for every sheet kind
const MIRRORED_TRACKS: &[Track] = &[
    Track::Radiation,
    Track::Xp,
    Track::Starving,
    Track::Dehydrated,
    Track::Exhausted,
    Track::Freezing,
];

/// Recompute derived data and return the updated actor (immutable API)
pub fn prepare_actor(actor: &Actor) -> Actor {
    let mut prepared = actor.clone();
    prepare_in_place(&mut prepared);
    prepared
}

/// Recompute derived data directly on the actor's in-memory state
///
/// Idempotent: running it twice on unchanged items yields identical data.
pub fn prepare_in_place(actor: &mut Actor) {
    tracing::debug!(actor = %actor.id, kind = actor.kind.type_name(), "Preparing derived data");
    match &mut actor.kind {
        ActorKind::Character(sheet) => resolve_sheet(sheet, &actor.items, true),
        ActorKind::Synthetic(sheet) => resolve_sheet(sheet, &actor.items, false),
        // Vehicles, creatures and territories carry no derived fields yet
        ActorKind::Vehicle(_) | ActorKind::Creature(_) | ActorKind::Territory(_) => {}
    }
}

/// Resolve a character or synthetic sheet against its items
pub fn resolve_sheet(sheet: &mut CharacterSheet, items: &[Item], is_character: bool) {
    let acc = StatAccumulator::from_items(items);
    apply_accumulator(sheet, &acc, is_character);

    let totals = SupplyTotals::from_items(items);
    apply_totals(sheet, &totals);
}

/// Write accumulated modifiers into the sheet's derived fields
pub fn apply_accumulator(sheet: &mut CharacterSheet, acc: &StatAccumulator, is_character: bool) {
    for (attribute, score) in sheet.attributes.iter_mut() {
        score.modifier = score.value.int().saturating_add(acc.attribute(*attribute));
        score.label = attribute.to_string();
    }

    let attributes = &sheet.attributes;
    for (skill, score) in sheet.skills.iter_mut() {
        let linked = attributes.get(&score.ability).map(|a| a.modifier).unwrap_or(0);
        score.modifier = score
            .value
            .int()
            .saturating_add(linked)
            .saturating_add(acc.skill(*skill));
        score.label = skill.to_string();
    }

    sheet.header.health.modifier = acc.health;
    if is_character {
        sheet.header.stress.modifier = acc.stress;
    }

    sheet.header.health.max = sheet
        .attributes
        .get(&Attribute::Strength)
        .map(|s| s.value.int())
        .unwrap_or(0);

    for track in MIRRORED_TRACKS {
        let score = sheet.general.track_mut(*track);
        score.calculated_max = score.max;
    }
    if is_character {
        let panic = &mut sheet.general.panic.track;
        panic.calculated_max = panic.max;
    }
}

/// Overwrite armor and consumable values with freshly summed totals
pub fn apply_totals(sheet: &mut CharacterSheet, totals: &SupplyTotals) {
    sheet.general.armor.value = totals.armor;
    for consumable in Consumable::all() {
        sheet.consumables.set(*consumable, totals.get(*consumable));
    }
}

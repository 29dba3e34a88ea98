//! StatAccumulator - Collects item modifiers before they are applied to a sheet

use serde::{Deserialize, Serialize};
use sheet_core::{Attribute, Item, ItemKind, Skill, ValueField};
use std::collections::BTreeMap;

/// Keys armor may modify, a narrower list than gear accepts
const ARMOR_ATTRIBUTE_KEYS: &[&str] = &["agl"];
const ARMOR_SKILL_KEYS: &[&str] = &["heavyMach", "closeCbt", "survival"];

/// Accumulates modifier deltas from every active item an actor owns
///
/// Entries exist for every attribute and skill from construction, so reads
/// never miss. All deltas are integers; unreadable values count as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatAccumulator {
    pub attributes: BTreeMap<Attribute, i64>,
    pub skills: BTreeMap<Skill, i64>,
    /// Bonus to health, carried on gear as an attribute modifier
    pub health: i64,
    /// Bonus to stress, carried on gear as an attribute modifier
    pub stress: i64,
}

impl Default for StatAccumulator {
    fn default() -> Self {
        StatAccumulator {
            attributes: Attribute::all().iter().map(|a| (*a, 0)).collect(),
            skills: Skill::all().iter().map(|s| (*s, 0)).collect(),
            health: 0,
            stress: 0,
        }
    }
}

impl StatAccumulator {
    /// Create a new empty accumulator
    pub fn new() -> Self {
        StatAccumulator::default()
    }

    /// Aggregate an ordered item collection
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a Item>) -> Self {
        let mut acc = StatAccumulator::new();
        for item in items {
            acc.apply_item(item);
        }
        acc
    }

    /// Add one item's modifiers; inactive items and other item types contribute nothing
    pub fn apply_item(&mut self, item: &Item) {
        if !item.active {
            return;
        }

        match &item.kind {
            ItemKind::Gear { attributes, skills } => {
                for (key, field) in attributes {
                    let value = read_delta(item, key, field);
                    self.apply_attribute_key(key, value);
                }
                for (key, field) in skills {
                    let value = read_delta(item, key, field);
                    self.apply_skill_key(key, value);
                }
            }
            ItemKind::Armor { modifiers } => {
                for (key, field) in modifiers {
                    let value = read_delta(item, key, field);
                    self.apply_armor_key(key, value);
                }
            }
            ItemKind::Weapon | ItemKind::Other(_) => {}
        }
    }

    /// Apply a gear attribute modifier by document key. Returns false for keys
    /// outside the allow-list (`str`, `agl`, `emp`, `wit`, `health`, `stress`).
    pub fn apply_attribute_key(&mut self, key: &str, value: i64) -> bool {
        match key {
            "health" => self.health = self.health.saturating_add(value),
            "stress" => self.stress = self.stress.saturating_add(value),
            _ => match Attribute::from_key(key) {
                Some(attribute) => add(self.attributes.entry(attribute).or_insert(0), value),
                None => return false,
            },
        }
        true
    }

    /// Apply a gear skill modifier by document key
    pub fn apply_skill_key(&mut self, key: &str, value: i64) -> bool {
        match Skill::from_key(key) {
            Some(skill) => {
                add(self.skills.entry(skill).or_insert(0), value);
                true
            }
            None => false,
        }
    }

    /// Apply an armor modifier; armor reaches only agility and three skills
    pub fn apply_armor_key(&mut self, key: &str, value: i64) -> bool {
        if ARMOR_ATTRIBUTE_KEYS.contains(&key) {
            self.apply_attribute_key(key, value)
        } else if ARMOR_SKILL_KEYS.contains(&key) {
            self.apply_skill_key(key, value)
        } else {
            false
        }
    }

    /// Summed delta for an attribute
    pub fn attribute(&self, attribute: Attribute) -> i64 {
        self.attributes.get(&attribute).copied().unwrap_or(0)
    }

    /// Summed delta for a skill
    pub fn skill(&self, skill: Skill) -> i64 {
        self.skills.get(&skill).copied().unwrap_or(0)
    }
}

/// Sums saturate so oversized item data cannot abort a derive pass
fn add(total: &mut i64, value: i64) {
    *total = total.saturating_add(value);
}

fn read_delta(item: &Item, key: &str, field: &ValueField) -> i64 {
    match field.value.try_int() {
        Some(v) => v,
        None => {
            tracing::debug!(
                item = %item.id,
                key,
                "Unreadable modifier value {:?}, counting as 0",
                field.value.0
            );
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sheet_core::ModifierMap;

    fn modifiers(entries: &[(&str, i64)]) -> ModifierMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), ValueField::new(*v)))
            .collect()
    }

    fn gear(id: &str, attrs: &[(&str, i64)], skills: &[(&str, i64)]) -> Item {
        Item::new(
            id,
            id,
            ItemKind::Gear {
                attributes: modifiers(attrs),
                skills: modifiers(skills),
            },
        )
    }

    fn armor(id: &str, mods: &[(&str, i64)]) -> Item {
        Item::new(id, id, ItemKind::Armor { modifiers: modifiers(mods) })
    }

    #[test]
    fn test_empty_accumulator_has_all_entries() {
        let acc = StatAccumulator::new();
        assert_eq!(acc.attributes.len(), 4);
        assert_eq!(acc.skills.len(), 12);
        assert!(acc.attributes.values().all(|v| *v == 0));
    }

    #[test]
    fn test_gear_modifiers_sum() {
        let items = vec![
            gear("a", &[("str", 2), ("health", 1)], &[("stamina", 1)]),
            gear("b", &[("str", 1), ("stress", -1)], &[("stamina", 2), ("comtech", 1)]),
        ];
        let acc = StatAccumulator::from_items(&items);

        assert_eq!(acc.attribute(Attribute::Strength), 3);
        assert_eq!(acc.health, 1);
        assert_eq!(acc.stress, -1);
        assert_eq!(acc.skill(Skill::Stamina), 3);
        assert_eq!(acc.skill(Skill::Comtech), 1);
    }

    #[test]
    fn test_oversized_modifiers_saturate() {
        let items = vec![
            gear("a", &[("str", i64::MAX), ("stress", i64::MAX)], &[("stamina", i64::MAX)]),
            gear("b", &[("str", i64::MAX), ("stress", i64::MAX)], &[("stamina", i64::MAX)]),
        ];
        let acc = StatAccumulator::from_items(&items);
        assert_eq!(acc.attribute(Attribute::Strength), i64::MAX);
        assert_eq!(acc.stress, i64::MAX);
        assert_eq!(acc.skill(Skill::Stamina), i64::MAX);
    }

    #[test]
    fn test_inactive_items_ignored() {
        let items = vec![
            gear("a", &[("wit", 2)], &[]),
            gear("b", &[("wit", 5)], &[]).with_active(false),
        ];
        let acc = StatAccumulator::from_items(&items);
        assert_eq!(acc.attribute(Attribute::Wits), 2);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let mut acc = StatAccumulator::new();
        assert!(!acc.apply_attribute_key("luck", 4));
        assert!(!acc.apply_skill_key("hacking", 4));
        assert_eq!(acc, StatAccumulator::new());
    }

    #[test]
    fn test_armor_allow_list_is_narrow() {
        let items = vec![armor(
            "m3",
            &[("agl", -1), ("str", 2), ("heavyMach", 1), ("closeCbt", 1), ("survival", 1), ("stamina", 3)],
        )];
        let acc = StatAccumulator::from_items(&items);

        assert_eq!(acc.attribute(Attribute::Agility), -1);
        assert_eq!(acc.attribute(Attribute::Strength), 0);
        assert_eq!(acc.skill(Skill::HeavyMach), 1);
        assert_eq!(acc.skill(Skill::CloseCbt), 1);
        assert_eq!(acc.skill(Skill::Survival), 1);
        assert_eq!(acc.skill(Skill::Stamina), 0);
    }

    #[test]
    fn test_non_numeric_values_fail_closed() {
        let item: Item = serde_json::from_value(serde_json::json!({
            "id": "x",
            "name": "Cursed Trinket",
            "type": "item",
            "header": { "active": true },
            "modifiers": {
                "attributes": { "str": { "value": "lots" }, "agl": { "value": 1 } },
                "skills": { "mobility": { "value": null } }
            }
        }))
        .unwrap();
        let acc = StatAccumulator::from_items([&item]);

        assert_eq!(acc.attribute(Attribute::Strength), 0);
        assert_eq!(acc.attribute(Attribute::Agility), 1);
        assert_eq!(acc.skill(Skill::Mobility), 0);
    }

    #[test]
    fn test_weapons_contribute_nothing() {
        let acc = StatAccumulator::from_items([&Item::new("w", "Flamer", ItemKind::Weapon)]);
        assert_eq!(acc, StatAccumulator::new());
    }

    proptest! {
        #[test]
        fn prop_attribute_sum_matches_active_items(
            deltas in proptest::collection::vec((-5i64..=5, any::<bool>()), 0..12)
        ) {
            let items: Vec<Item> = deltas
                .iter()
                .enumerate()
                .map(|(i, (d, active))| gear(&format!("g{}", i), &[("emp", *d)], &[]).with_active(*active))
                .collect();

            let expected: i64 = deltas.iter().filter(|(_, active)| *active).map(|(d, _)| d).sum();
            let acc = StatAccumulator::from_items(&items);
            prop_assert_eq!(acc.attribute(Attribute::Empathy), expected);
        }
    }
}

//! Supply totals - actor-level armor and consumables summed from items

use serde::{Deserialize, Serialize};
use sheet_core::item::ARMOR_RATING_KEY;
use sheet_core::{Consumable, Item};

/// Per-category totals over all active items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SupplyTotals {
    pub armor: i64,
    pub air: i64,
    pub food: i64,
    pub power: i64,
    pub water: i64,
}

impl SupplyTotals {
    /// Sum every active item's `armorrating`, `water`, `food`, `airsupply` and `power`
    ///
    /// Each item/category read stands alone: a missing or malformed value
    /// contributes zero without affecting any other item or category.
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a Item>) -> Self {
        let mut totals = SupplyTotals::default();
        for item in items {
            if !item.active {
                continue;
            }
            totals.armor = totals.armor.saturating_add(read_attribute(item, ARMOR_RATING_KEY));
            for consumable in Consumable::all() {
                let amount = read_attribute(item, consumable.item_attribute_key());
                let total = totals.get_mut(*consumable);
                *total = total.saturating_add(amount);
            }
        }
        totals
    }

    pub fn get(&self, consumable: Consumable) -> i64 {
        match consumable {
            Consumable::Air => self.air,
            Consumable::Food => self.food,
            Consumable::Power => self.power,
            Consumable::Water => self.water,
        }
    }

    fn get_mut(&mut self, consumable: Consumable) -> &mut i64 {
        match consumable {
            Consumable::Air => &mut self.air,
            Consumable::Food => &mut self.food,
            Consumable::Power => &mut self.power,
            Consumable::Water => &mut self.water,
        }
    }
}

fn read_attribute(item: &Item, key: &str) -> i64 {
    let Some(raw) = item.attribute(key) else {
        return 0;
    };
    match raw.try_int() {
        Some(v) => v,
        None if raw.0.is_null() => 0,
        None => {
            tracing::debug!(item = %item.id, key, "Unreadable supply value {:?}, counting as 0", raw.0);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sheet_core::ItemKind;

    fn stack(id: &str) -> Item {
        Item::new(id, id, ItemKind::Other("item".into()))
    }

    #[test]
    fn test_totals_sum_active_items() {
        let items = vec![
            stack("tank").with_supply(Consumable::Air, 3),
            stack("tank2").with_supply(Consumable::Air, 2).with_supply(Consumable::Power, 1),
            stack("armor").with_attribute(ARMOR_RATING_KEY, 4),
            stack("stored").with_supply(Consumable::Air, 9).with_active(false),
        ];
        let totals = SupplyTotals::from_items(&items);

        assert_eq!(totals.air, 5);
        assert_eq!(totals.power, 1);
        assert_eq!(totals.armor, 4);
        assert_eq!(totals.food, 0);
    }

    #[test]
    fn test_malformed_category_isolated() {
        let items = vec![
            stack("rations")
                .with_attribute("food", "spoiled")
                .with_supply(Consumable::Water, 2),
            stack("more").with_supply(Consumable::Food, 1),
        ];
        let mut broken = stack("broken");
        broken.attributes.insert("water".into(), json!("not an object"));

        let mut all = items.clone();
        all.push(broken);
        let totals = SupplyTotals::from_items(&all);

        assert_eq!(totals.food, 1);
        assert_eq!(totals.water, 2);
    }

    #[test]
    fn test_oversized_totals_saturate() {
        let items = vec![
            stack("a").with_supply(Consumable::Food, i64::MAX).with_attribute(ARMOR_RATING_KEY, i64::MAX),
            stack("b").with_supply(Consumable::Food, i64::MAX).with_attribute(ARMOR_RATING_KEY, i64::MAX),
            stack("c").with_supply(Consumable::Water, 1),
        ];
        let totals = SupplyTotals::from_items(&items);

        assert_eq!(totals.food, i64::MAX);
        assert_eq!(totals.armor, i64::MAX);
        assert_eq!(totals.water, 1);
    }

    #[test]
    fn test_totals_idempotent() {
        let items = vec![
            stack("a").with_supply(Consumable::Water, 2),
            stack("b").with_supply(Consumable::Water, 3),
        ];
        assert_eq!(SupplyTotals::from_items(&items), SupplyTotals::from_items(&items));
    }
}

//! Flattened roll-data view used by macros and roll formulas

use crate::actor::{Actor, ActorKind};
use serde_json::{Map, Value};

/// Build the roll-data map for an actor
///
/// With `shorthand` enabled, the `attributes`, `header` and `general` sections
/// (plus `skills` for characters and synthetics) are lifted to top-level
/// `key -> value` entries. Keys already present at the top level win.
/// Owned items are exposed under `items`, keyed by the strict slug of their name.
pub fn roll_data(actor: &Actor, shorthand: bool) -> Map<String, Value> {
    let mut data = match sheet_value(&actor.kind) {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    if shorthand {
        let mut sections = vec!["attributes", "header", "general"];
        if actor.kind.sheet().is_some() {
            sections.push("skills");
        }
        for section in sections {
            lift_section(&mut data, section);
        }
    }

    let mut items = Map::new();
    for item in &actor.items {
        // Skill-granting items are not addressable from roll formulas
        if item.grants_skill() {
            continue;
        }
        if let Ok(value) = serde_json::to_value(item) {
            items.insert(slugify(&item.name), value);
        }
    }
    data.insert("items".to_string(), Value::Object(items));

    data
}

fn sheet_value(kind: &ActorKind) -> Value {
    let result = match kind {
        ActorKind::Character(sheet) | ActorKind::Synthetic(sheet) => serde_json::to_value(sheet),
        ActorKind::Vehicle(raw) | ActorKind::Creature(raw) | ActorKind::Territory(raw) => {
            serde_json::to_value(raw)
        }
    };
    result.unwrap_or(Value::Null)
}

fn lift_section(data: &mut Map<String, Value>, section: &str) {
    let Some(Value::Object(entries)) = data.remove(section) else {
        return;
    };
    for (key, entry) in entries {
        if data.contains_key(&key) {
            continue;
        }
        let value = entry.get("value").cloned().unwrap_or(Value::Null);
        data.insert(key, value);
    }
}

/// Strict slug: whitespace runs become `-`, lowercase, only `[a-z0-9-]` kept
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = false;
    for c in name.chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        if c == '-' {
            if !last_dash {
                slug.push('-');
            }
            last_dash = true;
            continue;
        }
        last_dash = false;
        for lower in c.to_lowercase() {
            slug.push(lower);
        }
    }
    slug.retain(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{CharacterSheet, RawSheet};
    use crate::item::{Item, ItemKind};
    use crate::types::{Attribute, Skill};
    use serde_json::json;

    fn ripley() -> Actor {
        let sheet = CharacterSheet::default()
            .with_attribute(Attribute::Strength, 3)
            .with_skill(Skill::Piloting, 2);
        Actor::new("a1", "Ripley", ActorKind::Character(sheet))
            .with_item(Item::new("i1", "M41A Pulse Rifle", ItemKind::Weapon))
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("M41A Pulse Rifle"), "m41a-pulse-rifle");
        assert_eq!(slugify("Flare  -  Gun!"), "flare-gun");
        assert_eq!(slugify("Seegson's Tracker"), "seegsons-tracker");
    }

    #[test]
    fn test_shorthand_flattens_sections() {
        let data = roll_data(&ripley(), true);
        assert_eq!(data["str"], json!(3));
        assert_eq!(data["piloting"], json!(2));
        assert_eq!(data["stress"], json!(0));
        assert!(!data.contains_key("attributes"));
        assert!(!data.contains_key("skills"));
        assert!(data["items"].get("m41a-pulse-rifle").is_some());
    }

    #[test]
    fn test_items_keyed_by_top_level_skill_flag() {
        let mut talent = Item::new("t1", "Zero-G Training", ItemKind::Other("talent".into()));
        talent.extra.insert("skill".into(), json!("mobility"));
        let tracker = Item::new("i2", "Motion Tracker", ItemKind::Other("item".into()))
            .with_attribute("skill", 1);

        let data = roll_data(&ripley().with_item(talent).with_item(tracker), true);
        let items = data["items"].as_object().unwrap();

        assert!(!items.contains_key("zero-g-training"));
        assert_eq!(items["motion-tracker"]["attributes"]["skill"]["value"], json!(1));
    }

    #[test]
    fn test_without_shorthand_keeps_sections() {
        let data = roll_data(&ripley(), false);
        assert_eq!(data["attributes"]["str"]["value"], json!(3));
        assert!(!data.contains_key("str"));
    }

    #[test]
    fn test_raw_sheet_lifts_present_sections_only() {
        let mut raw = Map::new();
        raw.insert("attributes".into(), json!({ "speed": { "value": 2 } }));
        let actor = Actor::new("c1", "Drone", ActorKind::Creature(RawSheet(raw)));
        let data = roll_data(&actor, true);
        assert_eq!(data["speed"], json!(2));
        assert!(data["items"].as_object().unwrap().is_empty());
    }
}

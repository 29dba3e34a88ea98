use crate::types::Consumable;
use crate::value::{LooseInt, ValueField};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Item attribute key for the armor rating granted by worn gear
pub const ARMOR_RATING_KEY: &str = "armorrating";

/// Identifier of an owned item
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId(s.to_string())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw modifier entries keyed as the document stores them
///
/// Keys are kept verbatim; the aggregator decides which ones count.
pub type ModifierMap = BTreeMap<String, ValueField>;

/// What an item is, with the modifier shape that type carries
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    /// General gear (`type = item`): nested attribute and skill modifiers
    Gear {
        attributes: ModifierMap,
        skills: ModifierMap,
    },
    /// Worn armor: a flat modifier map
    Armor { modifiers: ModifierMap },
    Weapon,
    /// Talents, agendas, injuries and anything else the host defines
    Other(String),
}

impl ItemKind {
    pub fn type_name(&self) -> &str {
        match self {
            ItemKind::Gear { .. } => "item",
            ItemKind::Armor { .. } => "armor",
            ItemKind::Weapon => "weapon",
            ItemKind::Other(name) => name,
        }
    }
}

/// An owned item as seen by the sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ItemRecord", into = "ItemRecord")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    /// Whether the item's modifiers and supplies count toward the actor
    pub active: bool,
    /// Flat attributes (`armorrating`, `water`, `airsupply`, weapon stats, ...)
    pub attributes: Map<String, Value>,
    /// Remaining top-level document fields, kept as the host stored them
    pub extra: Map<String, Value>,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ItemKind) -> Self {
        Item {
            id: ItemId(id.into()),
            name: name.into(),
            kind,
            active: true,
            attributes: Map::new(),
            extra: Map::new(),
        }
    }

    /// Builder: set the active flag
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Builder: set a `{ value }` attribute
    pub fn with_attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set_attribute(key, value.into());
        self
    }

    /// Builder: set the stack size for a supply
    pub fn with_supply(self, consumable: Consumable, value: i64) -> Self {
        self.with_attribute(consumable.item_attribute_key(), value)
    }

    /// Read `attributes.<key>.value`; `None` when the attribute is missing or not an object
    pub fn attribute(&self, key: &str) -> Option<LooseInt> {
        let field = self.attributes.get(key)?.as_object()?;
        Some(LooseInt(field.get("value").cloned().unwrap_or(Value::Null)))
    }

    /// Write `attributes.<key>.value`, keeping sibling fields of that attribute
    pub fn set_attribute(&mut self, key: &str, value: Value) {
        match self.attributes.get_mut(key).and_then(Value::as_object_mut) {
            Some(field) => {
                field.insert("value".to_string(), value);
            }
            None => {
                let mut field = Map::new();
                field.insert("value".to_string(), value);
                self.attributes.insert(key.to_string(), Value::Object(field));
            }
        }
    }

    /// Whether the document marks this item as granting a skill (a truthy
    /// top-level `skill` field)
    pub fn grants_skill(&self) -> bool {
        match self.extra.get("skill") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        }
    }

    /// Remaining stack of a supply this item provides, if it provides one
    pub fn supply(&self, consumable: Consumable) -> Option<i64> {
        self.attribute(consumable.item_attribute_key()).map(|v| v.int())
    }

    pub fn armor_rating(&self) -> Option<i64> {
        self.attribute(ARMOR_RATING_KEY).map(|v| v.int())
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "══ {} ══", self.name)?;
        write!(f, "{}", self.kind.type_name())?;
        if !self.active {
            write!(f, " (inactive)")?;
        }

        let modifiers: Vec<(&String, &ValueField)> = match &self.kind {
            ItemKind::Gear { attributes, skills } => attributes.iter().chain(skills.iter()).collect(),
            ItemKind::Armor { modifiers } => modifiers.iter().collect(),
            _ => Vec::new(),
        };
        let nonzero: Vec<_> = modifiers.into_iter().filter(|(_, v)| v.int() != 0).collect();
        if !nonzero.is_empty() {
            writeln!(f)?;
            writeln!(f)?;
            write!(f, "Modifiers")?;
            for (key, field) in nonzero {
                write!(f, "\n  {:+} {}", field.int(), key)?;
            }
        }

        Ok(())
    }
}

// ============================================================================
// Document record
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ItemHeader {
    #[serde(default)]
    active: bool,
}

/// Item as the host document stores it, before type-specific parsing
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ItemRecord {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    header: ItemHeader,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    modifiers: Value,
    #[serde(default)]
    attributes: Map<String, Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Read a `{ key: { value } }` object; non-object entries become null values
fn modifier_map(value: Option<&Value>) -> ModifierMap {
    let Some(Value::Object(entries)) = value else {
        return ModifierMap::new();
    };
    entries
        .iter()
        .map(|(key, entry)| {
            let raw = entry.get("value").cloned().unwrap_or(Value::Null);
            (key.clone(), ValueField { value: LooseInt(raw) })
        })
        .collect()
}

fn modifier_value(map: &ModifierMap) -> Value {
    Value::Object(
        map.iter()
            .map(|(key, field)| {
                let mut entry = Map::new();
                entry.insert("value".to_string(), field.value.0.clone());
                (key.clone(), Value::Object(entry))
            })
            .collect(),
    )
}

impl From<ItemRecord> for Item {
    fn from(record: ItemRecord) -> Self {
        let kind = match record.item_type.as_str() {
            "item" => ItemKind::Gear {
                attributes: modifier_map(record.modifiers.get("attributes")),
                skills: modifier_map(record.modifiers.get("skills")),
            },
            "armor" => ItemKind::Armor {
                modifiers: modifier_map(Some(&record.modifiers)),
            },
            "weapon" => ItemKind::Weapon,
            other => ItemKind::Other(other.to_string()),
        };

        Item {
            id: ItemId(record.id),
            name: record.name,
            kind,
            active: record.header.active,
            attributes: record.attributes,
            extra: record.extra,
        }
    }
}

impl From<Item> for ItemRecord {
    fn from(item: Item) -> Self {
        let item_type = item.kind.type_name().to_string();
        let modifiers = match &item.kind {
            ItemKind::Gear { attributes, skills } => {
                let mut nested = Map::new();
                nested.insert("attributes".to_string(), modifier_value(attributes));
                nested.insert("skills".to_string(), modifier_value(skills));
                Value::Object(nested)
            }
            ItemKind::Armor { modifiers } => modifier_value(modifiers),
            _ => Value::Null,
        };

        ItemRecord {
            id: item.id.0,
            name: item.name,
            item_type,
            header: ItemHeader {
                active: item.active,
            },
            modifiers,
            attributes: item.attributes,
            extra: item.extra,
        }
    }
}

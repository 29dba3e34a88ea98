use crate::item::{Item, ItemId};
use crate::types::{Attribute, Consumable, Skill, Track};
use crate::value::LooseInt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of an actor in the host store
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub String);

impl From<&str> for ActorId {
    fn from(s: &str) -> Self {
        ActorId(s.to_string())
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An actor: one of five kinds, plus its ordered item collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub img: String,
    #[serde(flatten)]
    pub kind: ActorKind,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub token: TokenPrototype,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ActorKind) -> Self {
        Actor {
            id: ActorId(id.into()),
            name: name.into(),
            img: String::new(),
            kind,
            items: Vec::new(),
            token: TokenPrototype::default(),
        }
    }

    /// Builder: append an owned item
    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|i| &i.id == id)
    }

    pub fn item_mut(&mut self, id: &ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| &i.id == id)
    }

    pub fn sheet(&self) -> Option<&CharacterSheet> {
        self.kind.sheet()
    }

    /// Copy the actor portrait onto a token still showing the placeholder image
    ///
    /// Returns whether the token changed.
    pub fn sync_token_image(&mut self) -> bool {
        if self.token.img == PLACEHOLDER_TOKEN_IMG && self.token.img != self.img {
            self.token.img = self.img.clone();
            return true;
        }
        false
    }

    pub fn sheet_mut(&mut self) -> Option<&mut CharacterSheet> {
        self.kind.sheet_mut()
    }
}

/// Actor kind with its kind-specific sheet data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ActorKind {
    Character(CharacterSheet),
    Synthetic(CharacterSheet),
    #[serde(rename = "vehicles", alias = "vehicle")]
    Vehicle(RawSheet),
    Creature(RawSheet),
    Territory(RawSheet),
}

impl ActorKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ActorKind::Character(_) => "character",
            ActorKind::Synthetic(_) => "synthetic",
            ActorKind::Vehicle(_) => "vehicles",
            ActorKind::Creature(_) => "creature",
            ActorKind::Territory(_) => "territory",
        }
    }

    /// Attribute/skill sheet shared by characters and synthetics
    pub fn sheet(&self) -> Option<&CharacterSheet> {
        match self {
            ActorKind::Character(sheet) | ActorKind::Synthetic(sheet) => Some(sheet),
            _ => None,
        }
    }

    pub fn sheet_mut(&mut self) -> Option<&mut CharacterSheet> {
        match self {
            ActorKind::Character(sheet) | ActorKind::Synthetic(sheet) => Some(sheet),
            _ => None,
        }
    }

    pub fn is_character(&self) -> bool {
        matches!(self, ActorKind::Character(_))
    }

    /// Whether this actor rolls stress: characters always, synthetics only when flagged
    pub fn uses_stress(&self) -> bool {
        match self {
            ActorKind::Character(_) => true,
            ActorKind::Synthetic(sheet) => sheet.header.synth_stress,
            _ => false,
        }
    }
}

/// Sheet data for kinds with no derived stats, kept as the host stored it
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSheet(pub Map<String, Value>);

/// Prototype token settings relevant to rolling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPrototype {
    /// -1 hostile, 0 neutral, 1 friendly
    #[serde(default)]
    pub disposition: i64,
    #[serde(default = "placeholder_img")]
    pub img: String,
}

/// Image the host gives tokens that have none of their own
pub const PLACEHOLDER_TOKEN_IMG: &str = "icons/svg/mystery-man.svg";

fn placeholder_img() -> String {
    PLACEHOLDER_TOKEN_IMG.to_string()
}

impl Default for TokenPrototype {
    fn default() -> Self {
        TokenPrototype {
            disposition: 0,
            img: placeholder_img(),
        }
    }
}

impl TokenPrototype {
    pub fn is_hostile(&self) -> bool {
        self.disposition == -1
    }
}

// ============================================================================
// Character / synthetic sheet
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSheet {
    pub attributes: BTreeMap<Attribute, AttributeScore>,
    pub skills: BTreeMap<Skill, SkillScore>,
    #[serde(default)]
    pub header: Header,
    #[serde(default)]
    pub general: General,
    #[serde(default)]
    pub consumables: Consumables,
}

impl Default for CharacterSheet {
    fn default() -> Self {
        CharacterSheet {
            attributes: Attribute::all()
                .iter()
                .map(|a| (*a, AttributeScore::new(0)))
                .collect(),
            skills: Skill::all()
                .iter()
                .map(|s| (*s, SkillScore::new(0, s.default_attribute())))
                .collect(),
            header: Header::default(),
            general: General::default(),
            consumables: Consumables::default(),
        }
    }
}

impl CharacterSheet {
    /// Builder: set an attribute's base value
    pub fn with_attribute(mut self, attribute: Attribute, value: i64) -> Self {
        self.attributes
            .entry(attribute)
            .or_insert_with(|| AttributeScore::new(0))
            .value = LooseInt::new(value);
        self
    }

    /// Builder: set a skill's base value, keeping its attribute link
    pub fn with_skill(mut self, skill: Skill, value: i64) -> Self {
        self.skills
            .entry(skill)
            .or_insert_with(|| SkillScore::new(0, skill.default_attribute()))
            .value = LooseInt::new(value);
        self
    }

    /// Derived modifier of an attribute (zero when the attribute is absent)
    pub fn attribute_mod(&self, attribute: Attribute) -> i64 {
        self.attributes.get(&attribute).map(|a| a.modifier).unwrap_or(0)
    }

    pub fn skill_mod(&self, skill: Skill) -> i64 {
        self.skills.get(&skill).map(|s| s.modifier).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeScore {
    #[serde(default)]
    pub value: LooseInt,
    #[serde(rename = "mod", default)]
    pub modifier: i64,
    #[serde(default)]
    pub label: String,
}

impl AttributeScore {
    pub fn new(value: i64) -> Self {
        AttributeScore {
            value: LooseInt::new(value),
            modifier: 0,
            label: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillScore {
    #[serde(default)]
    pub value: LooseInt,
    #[serde(rename = "mod", default)]
    pub modifier: i64,
    /// Attribute whose modifier feeds this skill
    pub ability: Attribute,
    #[serde(default)]
    pub label: String,
}

impl SkillScore {
    pub fn new(value: i64, ability: Attribute) -> Self {
        SkillScore {
            value: LooseInt::new(value),
            modifier: 0,
            ability,
            label: String::new(),
        }
    }
}

/// A current/maximum pair with an item-derived modifier
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Meter {
    #[serde(default)]
    pub value: i64,
    #[serde(default)]
    pub max: i64,
    #[serde(rename = "mod", default)]
    pub modifier: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub health: Meter,
    #[serde(default)]
    pub stress: Meter,
    /// Synthetic opted into human-style stress and panic
    #[serde(rename = "synthstress", default)]
    pub synth_stress: bool,
}

/// A capped track: value, configured max, and the display mirror of max
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackScore {
    #[serde(default)]
    pub value: i64,
    #[serde(default)]
    pub max: i64,
    #[serde(rename = "calculatedMax", default)]
    pub calculated_max: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PanicTrack {
    #[serde(flatten)]
    pub track: TrackScore,
    /// Last panic roll total, or the escalated panic level
    #[serde(rename = "lastRoll", default)]
    pub last_roll: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Gauge {
    #[serde(default)]
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct General {
    #[serde(default)]
    pub armor: Gauge,
    #[serde(default)]
    pub radiation: TrackScore,
    #[serde(default)]
    pub xp: TrackScore,
    #[serde(default)]
    pub starving: TrackScore,
    #[serde(default)]
    pub dehydrated: TrackScore,
    #[serde(default)]
    pub exhausted: TrackScore,
    #[serde(default)]
    pub freezing: TrackScore,
    #[serde(default)]
    pub panic: PanicTrack,
}

impl General {
    pub fn track(&self, track: Track) -> &TrackScore {
        match track {
            Track::Radiation => &self.radiation,
            Track::Xp => &self.xp,
            Track::Starving => &self.starving,
            Track::Dehydrated => &self.dehydrated,
            Track::Exhausted => &self.exhausted,
            Track::Freezing => &self.freezing,
            Track::Panic => &self.panic.track,
        }
    }

    pub fn track_mut(&mut self, track: Track) -> &mut TrackScore {
        match track {
            Track::Radiation => &mut self.radiation,
            Track::Xp => &mut self.xp,
            Track::Starving => &mut self.starving,
            Track::Dehydrated => &mut self.dehydrated,
            Track::Exhausted => &mut self.exhausted,
            Track::Freezing => &mut self.freezing,
            Track::Panic => &mut self.panic.track,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Consumables {
    #[serde(default)]
    pub air: Gauge,
    #[serde(default)]
    pub food: Gauge,
    #[serde(default)]
    pub power: Gauge,
    #[serde(default)]
    pub water: Gauge,
}

impl Consumables {
    pub fn get(&self, consumable: Consumable) -> i64 {
        match consumable {
            Consumable::Air => self.air.value,
            Consumable::Food => self.food.value,
            Consumable::Power => self.power.value,
            Consumable::Water => self.water.value,
        }
    }

    pub fn set(&mut self, consumable: Consumable, value: i64) {
        let gauge = match consumable {
            Consumable::Air => &mut self.air,
            Consumable::Food => &mut self.food,
            Consumable::Power => &mut self.power,
            Consumable::Water => &mut self.water,
        };
        gauge.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sync_token_image() {
        let mut actor = Actor::new("a1", "Bishop", ActorKind::Synthetic(CharacterSheet::default()));
        actor.img = "portraits/bishop.webp".to_string();
        assert!(actor.sync_token_image());
        assert_eq!(actor.token.img, "portraits/bishop.webp");
        assert!(!actor.sync_token_image());

        let mut custom = Actor::new("a2", "Hicks", ActorKind::Character(CharacterSheet::default()));
        custom.token.img = "tokens/hicks.png".to_string();
        assert!(!custom.sync_token_image());
    }

    #[test]
    fn test_parse_character() {
        let actor: Actor = serde_json::from_value(json!({
            "id": "a1",
            "name": "Ripley",
            "type": "character",
            "data": {
                "attributes": {
                    "str": { "value": 3 },
                    "agl": { "value": "4" },
                    "wit": { "value": 5 },
                    "emp": { "value": 2 }
                },
                "skills": {
                    "rangedCbt": { "value": 2, "ability": "agl" }
                },
                "header": { "stress": { "value": 2 } },
                "general": { "panic": { "value": 1, "max": 4, "lastRoll": 8 } }
            },
            "token": { "disposition": -1 }
        }))
        .unwrap();

        let sheet = actor.sheet().unwrap();
        assert_eq!(sheet.attributes[&Attribute::Agility].value.int(), 4);
        assert_eq!(sheet.skills[&Skill::RangedCbt].ability, Attribute::Agility);
        assert_eq!(sheet.header.stress.value, 2);
        assert_eq!(sheet.general.panic.track.value, 1);
        assert_eq!(sheet.general.panic.last_roll, 8);
        assert!(actor.token.is_hostile());
        assert!(actor.kind.uses_stress());
    }

    #[test]
    fn test_synthetic_stress_flag() {
        let mut sheet = CharacterSheet::default();
        assert!(!ActorKind::Synthetic(sheet.clone()).uses_stress());
        sheet.header.synth_stress = true;
        assert!(ActorKind::Synthetic(sheet).uses_stress());
    }

    #[test]
    fn test_vehicle_accepts_both_type_names() {
        let a: Actor = serde_json::from_value(json!({ "id": "v1", "type": "vehicles", "data": {} })).unwrap();
        let b: Actor = serde_json::from_value(json!({ "id": "v2", "type": "vehicle", "data": { "hull": 4 } })).unwrap();
        assert!(matches!(a.kind, ActorKind::Vehicle(_)));
        assert!(matches!(b.kind, ActorKind::Vehicle(_)));
        assert!(!b.kind.uses_stress());
    }

    #[test]
    fn test_consumables_by_key() {
        let mut c = Consumables::default();
        c.set(Consumable::Power, 3);
        assert_eq!(c.get(Consumable::Power), 3);
        assert_eq!(c.get(Consumable::Air), 0);
    }

    #[test]
    fn test_default_sheet_links_skills() {
        let sheet = CharacterSheet::default().with_skill(Skill::Comtech, 2);
        assert_eq!(sheet.skills.len(), 12);
        assert_eq!(sheet.skills[&Skill::Comtech].ability, Attribute::Wits);
        assert_eq!(sheet.skills[&Skill::Comtech].value.int(), 2);
    }
}

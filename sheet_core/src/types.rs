use serde::{Deserialize, Serialize};
use std::fmt;

/// The four core attributes every character and synthetic carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attribute {
    #[serde(rename = "str")]
    Strength,
    #[serde(rename = "agl")]
    Agility,
    #[serde(rename = "wit")]
    Wits,
    #[serde(rename = "emp")]
    Empathy,
}

impl Attribute {
    pub fn all() -> &'static [Attribute] {
        &[
            Attribute::Strength,
            Attribute::Agility,
            Attribute::Wits,
            Attribute::Empathy,
        ]
    }

    /// Sheet key used by the host document (`str`, `agl`, ...)
    pub fn key(&self) -> &'static str {
        match self {
            Attribute::Strength => "str",
            Attribute::Agility => "agl",
            Attribute::Wits => "wit",
            Attribute::Empathy => "emp",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Attribute::all().iter().copied().find(|a| a.key() == key)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Strength => write!(f, "Strength"),
            Attribute::Agility => write!(f, "Agility"),
            Attribute::Wits => write!(f, "Wits"),
            Attribute::Empathy => write!(f, "Empathy"),
        }
    }
}

/// The twelve skills, each linked to one attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Skill {
    HeavyMach,
    CloseCbt,
    Stamina,
    RangedCbt,
    Mobility,
    Piloting,
    Command,
    Manipulation,
    MedicalAid,
    Observation,
    Survival,
    Comtech,
}

impl Skill {
    pub fn all() -> &'static [Skill] {
        &[
            Skill::HeavyMach,
            Skill::CloseCbt,
            Skill::Stamina,
            Skill::RangedCbt,
            Skill::Mobility,
            Skill::Piloting,
            Skill::Command,
            Skill::Manipulation,
            Skill::MedicalAid,
            Skill::Observation,
            Skill::Survival,
            Skill::Comtech,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            Skill::HeavyMach => "heavyMach",
            Skill::CloseCbt => "closeCbt",
            Skill::Stamina => "stamina",
            Skill::RangedCbt => "rangedCbt",
            Skill::Mobility => "mobility",
            Skill::Piloting => "piloting",
            Skill::Command => "command",
            Skill::Manipulation => "manipulation",
            Skill::MedicalAid => "medicalAid",
            Skill::Observation => "observation",
            Skill::Survival => "survival",
            Skill::Comtech => "comtech",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Skill::all().iter().copied().find(|s| s.key() == key)
    }

    /// Attribute a freshly created sheet links this skill to
    pub fn default_attribute(&self) -> Attribute {
        match self {
            Skill::HeavyMach | Skill::CloseCbt | Skill::Stamina => Attribute::Strength,
            Skill::RangedCbt | Skill::Mobility | Skill::Piloting => Attribute::Agility,
            Skill::Observation | Skill::Survival | Skill::Comtech => Attribute::Wits,
            Skill::Command | Skill::Manipulation | Skill::MedicalAid => Attribute::Empathy,
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Skill::HeavyMach => "Heavy Machinery",
            Skill::CloseCbt => "Close Combat",
            Skill::Stamina => "Stamina",
            Skill::RangedCbt => "Ranged Combat",
            Skill::Mobility => "Mobility",
            Skill::Piloting => "Piloting",
            Skill::Command => "Command",
            Skill::Manipulation => "Manipulation",
            Skill::MedicalAid => "Medical Aid",
            Skill::Observation => "Observation",
            Skill::Survival => "Survival",
            Skill::Comtech => "Comtech",
        };
        write!(f, "{}", name)
    }
}

/// Supplies tracked per actor and per item stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consumable {
    Air,
    Food,
    Power,
    Water,
}

impl Consumable {
    pub fn all() -> &'static [Consumable] {
        &[
            Consumable::Air,
            Consumable::Food,
            Consumable::Power,
            Consumable::Water,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            Consumable::Air => "air",
            Consumable::Food => "food",
            Consumable::Power => "power",
            Consumable::Water => "water",
        }
    }

    /// Item attribute holding this supply (air is stored as `airsupply`)
    pub fn item_attribute_key(&self) -> &'static str {
        match self {
            Consumable::Air => "airsupply",
            other => other.key(),
        }
    }
}

impl fmt::Display for Consumable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Consumable::Air => write!(f, "Air"),
            Consumable::Food => write!(f, "Food"),
            Consumable::Power => write!(f, "Power"),
            Consumable::Water => write!(f, "Water"),
        }
    }
}

/// Capped tracks under `general` whose maximum is mirrored every derive pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    Radiation,
    Xp,
    Starving,
    Dehydrated,
    Exhausted,
    Freezing,
    Panic,
}

impl Track {
    pub fn all() -> &'static [Track] {
        &[
            Track::Radiation,
            Track::Xp,
            Track::Starving,
            Track::Dehydrated,
            Track::Exhausted,
            Track::Freezing,
            Track::Panic,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            Track::Radiation => "radiation",
            Track::Xp => "xp",
            Track::Starving => "starving",
            Track::Dehydrated => "dehydrated",
            Track::Exhausted => "exhausted",
            Track::Freezing => "freezing",
            Track::Panic => "panic",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Track::Radiation => "Radiation",
            Track::Xp => "Experience",
            Track::Starving => "Starving",
            Track::Dehydrated => "Dehydrated",
            Track::Exhausted => "Exhausted",
            Track::Freezing => "Freezing",
            Track::Panic => "Panic",
        };
        write!(f, "{}", name)
    }
}

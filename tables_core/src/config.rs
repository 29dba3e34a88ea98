use serde::Deserialize;

/// TOML configuration for a roll table file
#[derive(Debug, Deserialize)]
pub struct TableFileConfig {
    pub table: TableConfig,
    #[serde(default)]
    pub entries: Vec<EntryConfig>,
}

/// Configuration for the table itself
#[derive(Debug, Deserialize)]
pub struct TableConfig {
    pub id: String,
    /// Display name used for lookups by name; defaults to the id
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Number of dice rolled per draw
    #[serde(default = "default_dice")]
    pub dice: u32,
    /// Faces per die
    #[serde(default = "default_faces")]
    pub faces: u32,
}

fn default_dice() -> u32 {
    1
}

fn default_faces() -> u32 {
    6
}

/// Configuration for a single table entry
#[derive(Debug, Deserialize)]
pub struct EntryConfig {
    pub range: RangeConfig,
    pub text: String,
    /// Optional localization key for the entry
    #[serde(default)]
    pub key: Option<String>,
}

/// Range can be a single total or an inclusive `[min, max]`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RangeConfig {
    Single(i64),
    Range([i64; 2]),
}

impl RangeConfig {
    pub fn min(&self) -> i64 {
        match self {
            RangeConfig::Single(v) => *v,
            RangeConfig::Range([min, _]) => *min,
        }
    }

    pub fn max(&self) -> i64 {
        match self {
            RangeConfig::Single(v) => *v,
            RangeConfig::Range([_, max]) => *max,
        }
    }
}

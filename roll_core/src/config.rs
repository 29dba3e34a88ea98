//! Rules and table settings

use crate::visibility::RollMode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Tunable rules, loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default)]
    pub dice: DiceRules,
    #[serde(default)]
    pub panic: PanicRules,
    #[serde(default)]
    pub supply: SupplyRules,
    #[serde(default)]
    pub sheet: SheetSettings,
    #[serde(default)]
    pub tracks: TrackRules,
}

impl RulesConfig {
    /// Load rules from a TOML file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let rules: RulesConfig = toml::from_str(content)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, face) in [
            ("dice.success_face", self.dice.success_face),
            ("dice.panic_face", self.dice.panic_face),
        ] {
            if !(1..=6).contains(&face) {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be a d6 face, got {}",
                    name, face
                )));
            }
        }
        if self.dice.success_face == self.dice.panic_face {
            return Err(ConfigError::ValidationError(
                "dice.success_face and dice.panic_face must differ".to_string(),
            ));
        }
        if self.panic.trauma_threshold < self.panic.onset_threshold {
            return Err(ConfigError::ValidationError(format!(
                "panic.trauma_threshold ({}) is below panic.onset_threshold ({})",
                self.panic.trauma_threshold, self.panic.onset_threshold
            )));
        }
        if self.tracks.default_max < 0 {
            return Err(ConfigError::ValidationError(
                "tracks.default_max cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiceRules {
    /// Face counted as a success on either pool
    #[serde(default = "default_success_face")]
    pub success_face: u8,
    /// Stress die face that forces a panic check and the supply depletion signal
    #[serde(default = "default_panic_face")]
    pub panic_face: u8,
    #[serde(default = "default_max_pushes")]
    pub max_pushes: u32,
}

impl Default for DiceRules {
    fn default() -> Self {
        DiceRules {
            success_face: 6,
            panic_face: 1,
            max_pushes: 1,
        }
    }
}

fn default_success_face() -> u8 {
    6
}
fn default_panic_face() -> u8 {
    1
}
fn default_max_pushes() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanicRules {
    /// Total at which an unpanicked actor starts to panic
    #[serde(default = "default_onset_threshold")]
    pub onset_threshold: i64,
    /// Total or level at which the panic leaves a permanent trauma
    #[serde(default = "default_trauma_threshold")]
    pub trauma_threshold: i64,
    /// Display name of the table narrating panic levels
    #[serde(default = "default_table_name")]
    pub table_name: String,
}

impl Default for PanicRules {
    fn default() -> Self {
        PanicRules {
            onset_threshold: 7,
            trauma_threshold: 13,
            table_name: default_table_name(),
        }
    }
}

fn default_onset_threshold() -> i64 {
    7
}
fn default_trauma_threshold() -> i64 {
    13
}
fn default_table_name() -> String {
    "Panic Table".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplyRules {
    /// Spread a depletion across stacks instead of charging the first one
    #[serde(default)]
    pub carry_depletion: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetSettings {
    /// Flatten attributes, header, general and skills to top-level roll data keys
    #[serde(default = "default_true")]
    pub macro_shorthand: bool,
    #[serde(default)]
    pub roll_mode: RollMode,
    /// Copy actor portraits onto placeholder tokens
    #[serde(default = "default_true")]
    pub default_token_settings: bool,
}

impl Default for SheetSettings {
    fn default() -> Self {
        SheetSettings {
            macro_shorthand: true,
            roll_mode: RollMode::PublicRoll,
            default_token_settings: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRules {
    /// Checkbox ceiling for tracks that carry no max of their own
    #[serde(default = "default_track_max")]
    pub default_max: i64,
}

impl Default for TrackRules {
    fn default() -> Self {
        TrackRules { default_max: 4 }
    }
}

fn default_track_max() -> i64 {
    4
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_uses_defaults() {
        let rules = RulesConfig::parse("").unwrap();
        assert_eq!(rules, RulesConfig::default());
        assert_eq!(rules.dice.success_face, 6);
        assert_eq!(rules.panic.table_name, "Panic Table");
        assert!(!rules.supply.carry_depletion);
        assert_eq!(rules.tracks.default_max, 4);
    }

    #[test]
    fn test_partial_override() {
        let toml = r#"
[panic]
onset_threshold = 8

[supply]
carry_depletion = true

[sheet]
roll_mode = "blindroll"
"#;
        let rules = RulesConfig::parse(toml).unwrap();
        assert_eq!(rules.panic.onset_threshold, 8);
        assert_eq!(rules.panic.trauma_threshold, 13);
        assert!(rules.supply.carry_depletion);
        assert_eq!(rules.sheet.roll_mode, RollMode::BlindRoll);
        assert!(rules.sheet.macro_shorthand);
    }

    #[test]
    fn test_rejects_bad_faces() {
        let err = RulesConfig::parse("[dice]\nsuccess_face = 7\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));

        let err = RulesConfig::parse("[dice]\nsuccess_face = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let err = RulesConfig::parse("[panic]\ntrauma_threshold = 5\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[dice]\nmax_pushes = 2\n").unwrap();
        let rules = RulesConfig::load_from_path(file.path()).unwrap();
        assert_eq!(rules.dice.max_pushes, 2);
    }

    #[test]
    fn test_missing_file() {
        let err = RulesConfig::load_from_path(Path::new("/nonexistent/rules.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}

//! Roll modifier dialog port
//!
//! A dialog is a request the host answers once: either confirmed with the
//! raw field values the user typed, or cancelled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sheet_core::value::parse_leading_int;

/// Dialog layout the host should render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogTemplate {
    /// Modifier and stress modifier fields
    RollAll,
    /// Modifier field only
    RollBase,
    /// Stress modifier for panic rolls
    RollStress,
    /// Damage field for creature acid rolls
    CreatureDamage,
}

impl DialogTemplate {
    pub fn path(&self) -> &'static str {
        match self {
            DialogTemplate::RollAll => "templates/dialog/roll-all-dialog.html",
            DialogTemplate::RollBase => "templates/dialog/roll-base-dialog.html",
            DialogTemplate::RollStress => "templates/dialog/roll-stress-dialog.html",
            DialogTemplate::CreatureDamage => "templates/dialog/roll-base-xeno-dialog.html",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogRequest {
    /// Label of the roll, used in the dialog title
    pub label: String,
    pub template: DialogTemplate,
}

/// Field values exactly as typed; absent fields are `None`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogValues {
    pub modifier: Option<String>,
    pub stress_mod: Option<String>,
    pub damage: Option<String>,
}

impl DialogValues {
    pub fn modifier(value: impl Into<String>) -> Self {
        DialogValues {
            modifier: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn with_stress_mod(mut self, value: impl Into<String>) -> Self {
        self.stress_mod = Some(value.into());
        self
    }

    pub fn damage(value: impl Into<String>) -> Self {
        DialogValues {
            damage: Some(value.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogResponse {
    Confirmed(DialogValues),
    Cancelled,
}

/// Numeric roll modifiers parsed from a dialog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollModifiers {
    pub modifier: i64,
    pub stress_mod: i64,
}

impl RollModifiers {
    /// Missing or unparseable fields count as zero
    pub fn from_values(values: &DialogValues) -> Self {
        RollModifiers {
            modifier: lenient(values.modifier.as_deref()),
            stress_mod: lenient(values.stress_mod.as_deref()),
        }
    }
}

/// Damage added to a creature acid roll
pub fn damage_bonus(values: &DialogValues) -> i64 {
    lenient(values.damage.as_deref())
}

fn lenient(field: Option<&str>) -> i64 {
    field.and_then(parse_leading_int).unwrap_or(0)
}

/// Host dialog that collects roll modifiers
#[async_trait]
pub trait ModifierPrompt: Send + Sync {
    async fn request(&self, request: DialogRequest) -> DialogResponse;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_parse() {
        let values = DialogValues::modifier("2").with_stress_mod("-1");
        assert_eq!(
            RollModifiers::from_values(&values),
            RollModifiers {
                modifier: 2,
                stress_mod: -1
            }
        );

        let junk = DialogValues::modifier("lots").with_stress_mod("");
        assert_eq!(RollModifiers::from_values(&junk), RollModifiers::default());
        assert_eq!(
            RollModifiers::from_values(&DialogValues::default()),
            RollModifiers::default()
        );
    }

    #[test]
    fn test_leading_digits() {
        let values = DialogValues::modifier("3 dice");
        assert_eq!(RollModifiers::from_values(&values).modifier, 3);
        assert_eq!(damage_bonus(&DialogValues::damage("+2")), 2);
    }
}

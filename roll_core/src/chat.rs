//! Chat log port and message content

use crate::dice::{PoolReport, ResolvedRoll, RollKind, RolledPool};
use crate::panic::PanicOutcome;
use crate::visibility::Visibility;
use serde::{Deserialize, Serialize};
use sheet_core::{ActorId, Consumable};
use std::fmt;
use tables_core::TableDraw;

/// Dice shown on a roll card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollCard {
    pub kind: RollKind,
    pub label: String,
    pub base: Vec<u8>,
    pub stress: Vec<u8>,
    pub pushes: u32,
    pub report: PoolReport,
    /// Whether the card offers a push button
    pub pushable: bool,
}

impl RollCard {
    pub fn rolled(roll: &RolledPool, pushable: bool) -> Self {
        RollCard {
            kind: roll.kind(),
            label: roll.label().to_string(),
            base: roll.base().to_vec(),
            stress: roll.stress().to_vec(),
            pushes: roll.pushes(),
            report: roll.report(),
            pushable,
        }
    }

    pub fn resolved(roll: &ResolvedRoll) -> Self {
        RollCard {
            kind: roll.kind,
            label: roll.label.clone(),
            base: roll.base.clone(),
            stress: roll.stress.clone(),
            pushes: roll.pushes,
            report: roll.report,
            pushable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanicCard {
    pub outcome: PanicOutcome,
    pub formula: String,
    pub table_description: String,
    /// Narrative for the displayed level
    pub narrative: String,
    pub announce_level: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatContent {
    Roll(RollCard),
    Panic(PanicCard),
    /// What a player sees of their own blind panic roll
    PanicHidden { modifier: i64 },
    PanicOver,
    /// GM notice that a creature's acid blood splashed
    AcidBlood,
    CreatureAttack {
        table: String,
        description: String,
        draw: TableDraw,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub speaker: ActorId,
    pub visibility: Visibility,
    pub content: ChatContent,
}

/// User-facing notifications for guarded actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Warning {
    /// Supply check on an empty consumable
    NoSupplies(Consumable),
    /// Supply rolled ones but no item holds any of it
    NoSupplyStack(Consumable),
    /// Armor roll with no armor dice
    NoArmor,
}

impl Warning {
    pub fn key(&self) -> &'static str {
        match self {
            Warning::NoSupplies(_) | Warning::NoSupplyStack(_) => "ALIENRPG.NoSupplys",
            Warning::NoArmor => "ALIENRPG.NoArmor",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NoSupplies(c) => write!(f, "No {} left", c),
            Warning::NoSupplyStack(c) => write!(f, "No item holds any {}", c),
            Warning::NoArmor => write!(f, "No armor to roll"),
        }
    }
}

/// Chat log and notification surface of the host
#[async_trait::async_trait]
pub trait ChatSink: Send + Sync {
    async fn post(&self, message: ChatMessage);

    fn warn(&self, warning: Warning);
}

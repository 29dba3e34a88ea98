//! Panic Resolver
//!
//! A panic roll is `1d6 + stress`. The resolver is pure: it takes the rolled
//! die and the actor's panic state and returns every transition as data.

use crate::config::PanicRules;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Panic state of the actor making the roll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanicSubject {
    Character { panic_value: i64, last_roll: i64 },
    /// Flagged synthetic: rolls against a zeroed state that is never saved
    Synthetic,
}

/// Narrative bucket for a panic level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanicTier {
    KeepingItTogether,
    NervousTwitch,
    Tremble,
    DropItem,
    Freeze,
    SeekCover,
    Scream,
    Flee,
    Frenzy,
    Catatonic,
}

impl PanicTier {
    pub fn for_level(level: i64) -> Self {
        match level {
            i64::MIN..=6 => PanicTier::KeepingItTogether,
            7 => PanicTier::NervousTwitch,
            8 => PanicTier::Tremble,
            9 => PanicTier::DropItem,
            10 => PanicTier::Freeze,
            11 => PanicTier::SeekCover,
            12 => PanicTier::Scream,
            13 => PanicTier::Flee,
            14 => PanicTier::Frenzy,
            _ => PanicTier::Catatonic,
        }
    }

    /// Localization key of the tier's narrative text
    pub fn key(&self) -> &'static str {
        match self {
            PanicTier::KeepingItTogether => "ALIENRPG.Panic1",
            PanicTier::NervousTwitch => "ALIENRPG.Panic7",
            PanicTier::Tremble => "ALIENRPG.Panic8",
            PanicTier::DropItem => "ALIENRPG.Panic9",
            PanicTier::Freeze => "ALIENRPG.Panic10",
            PanicTier::SeekCover => "ALIENRPG.Panic11",
            PanicTier::Scream => "ALIENRPG.Panic12",
            PanicTier::Flee => "ALIENRPG.Panic13",
            PanicTier::Frenzy => "ALIENRPG.Panic14",
            PanicTier::Catatonic => "ALIENRPG.Panic15",
        }
    }
}

impl fmt::Display for PanicTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PanicTier::KeepingItTogether => "Keeping It Together",
            PanicTier::NervousTwitch => "Nervous Twitch",
            PanicTier::Tremble => "Tremble",
            PanicTier::DropItem => "Drop Item",
            PanicTier::Freeze => "Freeze",
            PanicTier::SeekCover => "Seek Cover",
            PanicTier::Scream => "Scream",
            PanicTier::Flee => "Flee",
            PanicTier::Frenzy => "Frenzy",
            PanicTier::Catatonic => "Catatonic",
        };
        write!(f, "{}", name)
    }
}

/// Everything a panic roll decided
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanicOutcome {
    pub die: u8,
    pub modifier: i64,
    pub total: i64,
    /// Displayed panic level: the total, or the escalated level
    pub level: i64,
    /// Actor starts panicking: bump the panic track and show the terror marker
    pub onset: bool,
    /// Panic was already active and this roll escalated it
    pub escalated: bool,
    pub trauma: bool,
    pub tier: PanicTier,
    /// New `lastRoll` to persist, if any
    pub last_roll: Option<i64>,
}

impl PanicOutcome {
    /// Roll formula as shown in the chat log
    pub fn formula(&self) -> String {
        if self.modifier < 0 {
            format!("1d6{}", self.modifier)
        } else {
            format!("1d6+{}", self.modifier)
        }
    }

    /// Whether the chat card should announce "you are at panic level N"
    pub fn announces_level(&self, rules: &PanicRules) -> bool {
        self.escalated || self.total >= rules.onset_threshold
    }
}

/// Resolve a panic roll
///
/// `modifier` is the full stress modifier for characters; synthetics roll
/// the bare die.
pub fn resolve_panic(subject: PanicSubject, die: u8, modifier: i64, rules: &PanicRules) -> PanicOutcome {
    let (modifier, panic_value, last_roll, persist) = match subject {
        PanicSubject::Character {
            panic_value,
            last_roll,
        } => (modifier, panic_value, last_roll, true),
        PanicSubject::Synthetic => (0, 0, 0, false),
    };
    let total = i64::from(die).saturating_add(modifier);

    let onset = persist && panic_value == 0 && total >= rules.onset_threshold;
    let escalated = persist && panic_value != 0 && total < last_roll;

    let (level, last_roll) = if escalated {
        let level = last_roll.saturating_add(1);
        (level, Some(level))
    } else {
        (total, persist.then_some(total))
    };
    let trauma = total >= rules.trauma_threshold || level >= rules.trauma_threshold;

    if onset {
        tracing::info!(total, "Panic onset");
    }
    if escalated {
        tracing::info!(total, level, "Panic escalated");
    }
    if trauma {
        tracing::info!(total, level, "Panic left a permanent trauma");
    }

    PanicOutcome {
        die,
        modifier,
        total,
        level,
        onset,
        escalated,
        trauma,
        tier: PanicTier::for_level(level),
        last_roll,
    }
}

//! Who sees a roll in the chat log

use serde::{Deserialize, Serialize};
use std::fmt;

/// Core roll mode setting of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollMode {
    #[default]
    PublicRoll,
    GmRoll,
    BlindRoll,
    SelfRoll,
}

/// Recipients of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Audience {
    Everyone,
    GmOnly,
    SelfAndGm,
    SelfOnly,
}

/// Audience plus whether the content is hidden from the roller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    pub audience: Audience,
    pub blind: bool,
}

impl Visibility {
    pub fn public() -> Self {
        Visibility {
            audience: Audience::Everyone,
            blind: false,
        }
    }

    /// Public message whose dice are hidden, used for hostile tokens
    pub fn blind_public() -> Self {
        Visibility {
            audience: Audience::Everyone,
            blind: true,
        }
    }

    pub fn gm_blind() -> Self {
        Visibility {
            audience: Audience::GmOnly,
            blind: true,
        }
    }

    pub fn self_only() -> Self {
        Visibility {
            audience: Audience::SelfOnly,
            blind: false,
        }
    }
}

impl RollMode {
    pub fn key(&self) -> &'static str {
        match self {
            RollMode::PublicRoll => "publicroll",
            RollMode::GmRoll => "gmroll",
            RollMode::BlindRoll => "blindroll",
            RollMode::SelfRoll => "selfroll",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "publicroll" | "roll" => Some(RollMode::PublicRoll),
            "gmroll" => Some(RollMode::GmRoll),
            "blindroll" => Some(RollMode::BlindRoll),
            "selfroll" => Some(RollMode::SelfRoll),
            _ => None,
        }
    }

    pub fn visibility(&self) -> Visibility {
        let audience = match self {
            RollMode::PublicRoll => Audience::Everyone,
            RollMode::GmRoll | RollMode::BlindRoll => Audience::GmOnly,
            RollMode::SelfRoll => Audience::SelfAndGm,
        };
        Visibility {
            audience,
            blind: *self == RollMode::BlindRoll,
        }
    }

    /// A blind roll by a player still tells them a roll happened
    pub fn needs_self_notice(&self, roller_is_gm: bool) -> bool {
        *self == RollMode::BlindRoll && !roller_is_gm
    }
}

impl fmt::Display for RollMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

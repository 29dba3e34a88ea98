//! Dice Pool Roller
//!
//! Two pools of d6: base (action) dice and stress dice. A pool moves through
//! `DicePool` (idle) to `RolledPool` (rolled, optionally pushed) to
//! `ResolvedRoll` (final). Every step returns a new value; nothing is kept
//! between calls.

use crate::config::DiceRules;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sheet_core::ActorKind;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use thiserror::Error;

/// Source of d6 results
pub trait DieRoller: Send + Sync {
    /// Roll one six-sided die, 1..=6
    fn d6(&self) -> u8;
}

/// Die roller backed by any `rand` generator
pub struct RngDice<R> {
    rng: Mutex<R>,
}

impl<R: Rng + Send> RngDice<R> {
    pub fn new(rng: R) -> Self {
        RngDice {
            rng: Mutex::new(rng),
        }
    }
}

impl<R: Rng + Send> DieRoller for RngDice<R> {
    fn d6(&self) -> u8 {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        rng.gen_range(1..=6)
    }
}

/// Die roller returning a fixed sequence of faces, cycling when exhausted
#[derive(Debug)]
pub struct ScriptedDice {
    faces: Vec<u8>,
    index: AtomicUsize,
}

impl ScriptedDice {
    /// Faces outside 1..=6 are clamped; an empty script always rolls 1
    pub fn new(faces: Vec<u8>) -> Self {
        let faces = if faces.is_empty() { vec![1] } else { faces };
        ScriptedDice {
            faces: faces.into_iter().map(|f| f.clamp(1, 6)).collect(),
            index: AtomicUsize::new(0),
        }
    }

    pub fn constant(face: u8) -> Self {
        Self::new(vec![face])
    }

    /// How many dice have been rolled so far
    pub fn rolled(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }
}

impl DieRoller for ScriptedDice {
    fn d6(&self) -> u8 {
        let idx = self.index.fetch_add(1, Ordering::SeqCst);
        self.faces[idx % self.faces.len()]
    }
}

/// What kind of roll a pool is, which decides its presentation and panic rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollKind {
    Character,
    Synthetic,
    Creature,
    Vehicle,
    Territory,
    Supply,
    Armor,
}

impl RollKind {
    /// Roll kind for an ability roll; flagged synthetics roll like humans
    pub fn for_actor(kind: &ActorKind) -> Self {
        match kind {
            ActorKind::Character(_) => RollKind::Character,
            ActorKind::Synthetic(sheet) if sheet.header.synth_stress => RollKind::Character,
            ActorKind::Synthetic(_) => RollKind::Synthetic,
            ActorKind::Creature(_) => RollKind::Creature,
            ActorKind::Vehicle(_) => RollKind::Vehicle,
            ActorKind::Territory(_) => RollKind::Territory,
        }
    }

    /// Stress ones only force a panic check on rolls that carry real stress
    pub fn can_panic(&self) -> bool {
        !matches!(self, RollKind::Supply | RollKind::Armor)
    }
}

impl fmt::Display for RollKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RollKind::Character => "character",
            RollKind::Synthetic => "synthetic",
            RollKind::Creature => "creature",
            RollKind::Vehicle => "vehicle",
            RollKind::Territory => "territory",
            RollKind::Supply => "supply",
            RollKind::Armor => "armor",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushError {
    #[error("This roll cannot be pushed")]
    Locked,
    #[error("Roll already pushed {max} time(s)")]
    PushLimit { max: u32 },
    #[error("A stress die showed the panic face; the roll cannot be pushed")]
    PanicShown,
}

/// A pool ready to roll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DicePool {
    pub kind: RollKind,
    pub label: String,
    base: u32,
    stress: u32,
    locked: bool,
    blind: bool,
}

impl DicePool {
    /// Negative pool sizes count as zero dice
    pub fn new(kind: RollKind, label: impl Into<String>, base: i64, stress: i64) -> Self {
        DicePool {
            kind,
            label: label.into(),
            base: pool_size(base),
            stress: pool_size(stress),
            locked: false,
            blind: false,
        }
    }

    /// Forbid pushing this roll
    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn with_lock(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn blind(mut self, blind: bool) -> Self {
        self.blind = blind;
        self
    }

    pub fn base_size(&self) -> u32 {
        self.base
    }

    pub fn stress_size(&self) -> u32 {
        self.stress
    }

    pub fn roll(self, dice: &dyn DieRoller, rules: &DiceRules) -> RolledPool {
        let base: Vec<u8> = (0..self.base).map(|_| dice.d6()).collect();
        let stress: Vec<u8> = (0..self.stress).map(|_| dice.d6()).collect();
        tracing::debug!(
            label = %self.label,
            kind = %self.kind,
            ?base,
            ?stress,
            "Rolled dice pool"
        );

        RolledPool {
            report: PoolReport::count(&base, &stress, self.kind, rules),
            pool: self,
            base,
            stress,
            pushes: 0,
        }
    }
}

fn pool_size(n: i64) -> u32 {
    u32::try_from(n.max(0)).unwrap_or(u32::MAX)
}

/// Counts a caller reads off a roll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolReport {
    pub base_sixes: u32,
    pub stress_sixes: u32,
    /// Successes over both pools
    pub sixes: u32,
    /// Stress dice showing the panic face; the supply depletion signal
    pub stress_ones: u32,
    /// Whether the roller must make a panic roll
    pub panic: bool,
}

impl PoolReport {
    fn count(base: &[u8], stress: &[u8], kind: RollKind, rules: &DiceRules) -> Self {
        let faces = |dice: &[u8], face: u8| dice.iter().filter(|d| **d == face).count() as u32;
        let base_sixes = faces(base, rules.success_face);
        let stress_sixes = faces(stress, rules.success_face);
        let stress_ones = faces(stress, rules.panic_face);

        PoolReport {
            base_sixes,
            stress_sixes,
            sixes: base_sixes + stress_sixes,
            stress_ones,
            panic: stress_ones > 0 && kind.can_panic(),
        }
    }
}

/// A rolled pool, pushed zero or more times
///
/// Not `Clone`: pushing consumes the pool, so each state is pushed at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct RolledPool {
    pool: DicePool,
    base: Vec<u8>,
    stress: Vec<u8>,
    pushes: u32,
    report: PoolReport,
}

impl RolledPool {
    pub fn kind(&self) -> RollKind {
        self.pool.kind
    }

    pub fn label(&self) -> &str {
        &self.pool.label
    }

    pub fn is_blind(&self) -> bool {
        self.pool.blind
    }

    pub fn base(&self) -> &[u8] {
        &self.base
    }

    pub fn stress(&self) -> &[u8] {
        &self.stress
    }

    pub fn pushes(&self) -> u32 {
        self.pushes
    }

    pub fn report(&self) -> PoolReport {
        self.report
    }

    /// Why this roll cannot be pushed, if it cannot
    pub fn push_blocker(&self, rules: &DiceRules) -> Option<PushError> {
        if self.pool.locked {
            Some(PushError::Locked)
        } else if self.pushes >= rules.max_pushes {
            Some(PushError::PushLimit {
                max: rules.max_pushes,
            })
        } else if self.stress.contains(&rules.panic_face) {
            Some(PushError::PanicShown)
        } else {
            None
        }
    }

    pub fn can_push(&self, rules: &DiceRules) -> bool {
        self.push_blocker(rules).is_none()
    }

    /// Reroll failed base dice and add one stress die
    ///
    /// Consumes the roll, so a roll can only ever be pushed from its latest
    /// state. Stress dice already rolled keep their faces.
    ///
    /// ```compile_fail
    /// use roll_core::config::DiceRules;
    /// use roll_core::dice::{DicePool, RollKind, ScriptedDice};
    ///
    /// let dice = ScriptedDice::constant(3);
    /// let rules = DiceRules::default();
    /// let rolled = DicePool::new(RollKind::Character, "Wits", 2, 0).roll(&dice, &rules);
    /// let first = rolled.push(&dice, &rules);
    /// let again = rolled.push(&dice, &rules);
    /// ```
    pub fn push(self, dice: &dyn DieRoller, rules: &DiceRules) -> Result<RolledPool, PushError> {
        if let Some(blocker) = self.push_blocker(rules) {
            return Err(blocker);
        }

        let base: Vec<u8> = self
            .base
            .iter()
            .map(|d| if *d == rules.success_face { *d } else { dice.d6() })
            .collect();
        let mut stress = self.stress;
        stress.push(dice.d6());

        let mut pool = self.pool;
        pool.stress += 1;
        tracing::debug!(label = %pool.label, ?base, ?stress, "Pushed dice pool");

        Ok(RolledPool {
            report: PoolReport::count(&base, &stress, pool.kind, rules),
            pool,
            base,
            stress,
            pushes: self.pushes + 1,
        })
    }

    /// Close the roll; no further pushes
    pub fn resolve(self) -> ResolvedRoll {
        ResolvedRoll {
            kind: self.pool.kind,
            label: self.pool.label,
            blind: self.pool.blind,
            base: self.base,
            stress: self.stress,
            pushes: self.pushes,
            report: self.report,
        }
    }
}

/// Final result of a roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRoll {
    pub kind: RollKind,
    pub label: String,
    pub blind: bool,
    pub base: Vec<u8>,
    pub stress: Vec<u8>,
    pub pushes: u32,
    pub report: PoolReport,
}

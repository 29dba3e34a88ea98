//! Sheet action handlers
//!
//! Each handler is one logical pass over one actor: read a snapshot, roll,
//! then write typed patches in order. Mutating handlers hold the actor's turn
//! in [`ActorLocks`] for the whole pass.

use crate::chat::{ChatContent, ChatMessage, ChatSink, PanicCard, RollCard, Warning};
use crate::config::RulesConfig;
use crate::dialog::{
    damage_bonus, DialogRequest, DialogResponse, DialogTemplate, ModifierPrompt, RollModifiers,
};
use crate::dice::{DicePool, DieRoller, ResolvedRoll, RollKind, RolledPool};
use crate::locks::ActorLocks;
use crate::panic::{resolve_panic, PanicOutcome, PanicSubject};
use crate::store::{ActorStore, TokenEffect};
use crate::supply::{plan_depletion, supply_stacks, DepletionPlan};
use crate::visibility::Visibility;
use crate::ActionError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sheet_core::{
    Actor, ActorId, ActorKind, ActorPatch, Attribute, Consumable, ItemPatch, Skill, Track,
};
use std::sync::Arc;
use tables_core::{RollError, TableDraw, TableRegistry};

/// Where an ability roll takes its base dice from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiceSource {
    Attribute(Attribute),
    Skill(Skill),
    /// A number printed on the sheet, e.g. a creature or vehicle stat
    Fixed(i64),
}

/// An ability roll as a sheet button describes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityRoll {
    pub label: String,
    pub source: DiceSource,
    pub modifiers: RollModifiers,
    /// Armor roll: no stress dice, never pushable, needs at least one die
    pub armor: bool,
}

impl AbilityRoll {
    pub fn attribute(attribute: Attribute) -> Self {
        Self::new(attribute.to_string(), DiceSource::Attribute(attribute))
    }

    pub fn skill(skill: Skill) -> Self {
        Self::new(skill.to_string(), DiceSource::Skill(skill))
    }

    pub fn fixed(label: impl Into<String>, dice: i64) -> Self {
        Self::new(label, DiceSource::Fixed(dice))
    }

    pub fn armor(rating: i64) -> Self {
        AbilityRoll {
            armor: true,
            ..Self::new("Armor", DiceSource::Fixed(rating))
        }
    }

    pub fn with_modifiers(mut self, modifiers: RollModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    fn new(label: impl Into<String>, source: DiceSource) -> Self {
        AbilityRoll {
            label: label.into(),
            source,
            modifiers: RollModifiers::default(),
            armor: false,
        }
    }
}

/// Stress and health +/- buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeterButton {
    MinusStress,
    PlusStress,
    MinusHealth,
    PlusHealth,
}

impl MeterButton {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "minusStress" => Some(MeterButton::MinusStress),
            "plusStress" => Some(MeterButton::PlusStress),
            "minusHealth" => Some(MeterButton::MinusHealth),
            "plusHealth" => Some(MeterButton::PlusHealth),
            _ => None,
        }
    }
}

/// Checkbox track click (increment) or context click (decrement)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackStep {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcidSource {
    /// The creature has no acid dice: tell the GM about the splash
    Splash,
    Dice(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcidRoll {
    pub label: String,
    pub source: AcidSource,
    pub armor: bool,
}

/// A panic roll and the narrative it produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanicRoll {
    pub outcome: PanicOutcome,
    pub narrative: String,
}

/// Result of a supply check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplyCheck {
    /// Nothing left to check; no dice were rolled
    Empty,
    Rolled {
        roll: ResolvedRoll,
        depletion: Option<DepletionPlan>,
    },
}

/// Action handlers bound to sheet buttons
pub struct SheetActions {
    store: Arc<dyn ActorStore>,
    chat: Arc<dyn ChatSink>,
    prompt: Arc<dyn ModifierPrompt>,
    dice: Arc<dyn DieRoller>,
    tables: TableRegistry,
    rules: RulesConfig,
    roller_is_gm: bool,
    locks: ActorLocks,
}

impl SheetActions {
    pub fn new(
        store: Arc<dyn ActorStore>,
        chat: Arc<dyn ChatSink>,
        prompt: Arc<dyn ModifierPrompt>,
        dice: Arc<dyn DieRoller>,
        tables: TableRegistry,
    ) -> Self {
        SheetActions {
            store,
            chat,
            prompt,
            dice,
            tables,
            rules: RulesConfig::default(),
            roller_is_gm: false,
            locks: ActorLocks::new(),
        }
    }

    pub fn with_rules(mut self, rules: RulesConfig) -> Self {
        self.rules = rules;
        self
    }

    /// Whether the user triggering actions is the GM
    pub fn with_gm_roller(mut self, is_gm: bool) -> Self {
        self.roller_is_gm = is_gm;
        self
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// Actor snapshot with derived stats recomputed
    pub fn prepared_actor(&self, id: &ActorId) -> Result<Actor, ActionError> {
        let mut actor = self
            .store
            .actor(id)
            .ok_or_else(|| ActionError::ActorNotFound(id.clone()))?;
        stat_core::prepare_in_place(&mut actor);
        if self.rules.sheet.default_token_settings && actor.sync_token_image() {
            tracing::debug!(actor = %id, "Token image set from actor portrait");
        }
        Ok(actor)
    }

    /// Flattened data roll formulas and macros read
    pub fn roll_data(&self, id: &ActorId) -> Result<Map<String, Value>, ActionError> {
        let actor = self.prepared_actor(id)?;
        Ok(sheet_core::roll_data(&actor, self.rules.sheet.macro_shorthand))
    }

    /// Roll an ability, skill or armor pool
    ///
    /// Returns `None` when the roll is guarded off. The returned pool can be
    /// passed to [`push_roll`](Self::push_roll) while it is still pushable.
    pub async fn roll_ability(
        &self,
        id: &ActorId,
        request: AbilityRoll,
    ) -> Result<Option<RolledPool>, ActionError> {
        let _turn = self.locks.acquire(id).await;
        let actor = self.prepared_actor(id)?;
        let sheet = actor.sheet();

        let base = match request.source {
            DiceSource::Attribute(a) => sheet.map_or(0, |s| s.attribute_mod(a)),
            DiceSource::Skill(s) => sheet.map_or(0, |sh| sh.skill_mod(s)),
            DiceSource::Fixed(n) => n,
        }
        .saturating_add(request.modifiers.modifier);

        let pool = if request.armor {
            if base < 1 {
                self.chat.warn(Warning::NoArmor);
                return Ok(None);
            }
            DicePool::new(RollKind::Armor, "Armor", base, 0).locked()
        } else {
            let stress = match &actor.kind {
                ActorKind::Character(sheet) => {
                    sheet.header.stress.value.saturating_add(request.modifiers.stress_mod)
                }
                _ => 0,
            };
            DicePool::new(RollKind::for_actor(&actor.kind), request.label, base, stress)
                .with_lock(!actor.kind.uses_stress())
        };

        let rolled = pool
            .blind(actor.token.is_hostile())
            .roll(self.dice.as_ref(), &self.rules.dice);
        self.post_rolled(id, &rolled).await;
        Ok(Some(rolled))
    }

    /// Push a roll: reroll failed base dice, add a stress die, and raise stress
    ///
    /// Takes the roll by value so the same state cannot be pushed twice. A
    /// refused push drops the roll; check [`RolledPool::can_push`] first to
    /// keep it.
    pub async fn push_roll(
        &self,
        id: &ActorId,
        roll: RolledPool,
    ) -> Result<RolledPool, ActionError> {
        let _turn = self.locks.acquire(id).await;
        let actor = self.prepared_actor(id)?;
        let pushed = roll.push(self.dice.as_ref(), &self.rules.dice)?;

        if actor.kind.uses_stress() {
            if let Some(sheet) = actor.sheet() {
                let stress = sheet.header.stress.value.saturating_add(1);
                self.store
                    .update_actor(id, ActorPatch::StressValue(stress))
                    .await?;
            }
        }

        self.post_rolled(id, &pushed).await;
        Ok(pushed)
    }

    /// Close a roll so it can no longer be pushed
    pub fn resolve_roll(&self, roll: RolledPool) -> ResolvedRoll {
        let resolved = roll.resolve();
        tracing::debug!(
            label = %resolved.label,
            sixes = resolved.report.sixes,
            pushes = resolved.pushes,
            "Resolved roll"
        );
        resolved
    }

    /// Ask for modifiers first; cancelling rolls nothing
    pub async fn roll_ability_with_dialog(
        &self,
        id: &ActorId,
        request: AbilityRoll,
    ) -> Result<Option<RolledPool>, ActionError> {
        let actor = self
            .store
            .actor(id)
            .ok_or_else(|| ActionError::ActorNotFound(id.clone()))?;
        let template = if actor.kind.is_character() && !request.armor {
            DialogTemplate::RollAll
        } else {
            DialogTemplate::RollBase
        };

        let Some(modifiers) = self.ask(&request.label, template).await else {
            return Ok(None);
        };
        self.roll_ability(id, request.with_modifiers(modifiers))
            .await
    }

    /// Roll `1d6 + stress` on the panic table
    ///
    /// Returns `None` for actors that never panic.
    pub async fn roll_panic(
        &self,
        id: &ActorId,
        modifiers: RollModifiers,
    ) -> Result<Option<PanicRoll>, ActionError> {
        let _turn = self.locks.acquire(id).await;
        let actor = self.prepared_actor(id)?;

        let (subject, modifier) = match &actor.kind {
            ActorKind::Character(sheet) => (
                PanicSubject::Character {
                    panic_value: sheet.general.panic.track.value,
                    last_roll: sheet.general.panic.last_roll,
                },
                [
                    modifiers.modifier,
                    modifiers.stress_mod,
                    sheet.header.stress.modifier,
                ]
                .into_iter()
                .fold(sheet.header.stress.value, i64::saturating_add),
            ),
            ActorKind::Synthetic(sheet) if sheet.header.synth_stress => (PanicSubject::Synthetic, 0),
            other => {
                tracing::debug!(actor = %id, kind = other.type_name(), "Actor cannot panic");
                return Ok(None);
            }
        };

        let outcome = resolve_panic(subject, self.dice.d6(), modifier, &self.rules.panic);
        if outcome.onset {
            self.raise_panic(&actor).await?;
        }
        if let Some(last_roll) = outcome.last_roll {
            self.store
                .update_actor(id, ActorPatch::PanicLastRoll(last_roll))
                .await?;
        }

        let table = self.tables.get_by_name(&self.rules.panic.table_name);
        let narrative = table
            .and_then(|t| t.lookup(outcome.level))
            .map(|entry| entry.text.clone())
            .unwrap_or_else(|| outcome.tier.key().to_string());

        let mode = self.rules.sheet.roll_mode;
        if mode.needs_self_notice(self.roller_is_gm) {
            self.post(
                id,
                Visibility::self_only(),
                ChatContent::PanicHidden {
                    modifier: modifiers.modifier + modifiers.stress_mod,
                },
            )
            .await;
        }
        self.post(
            id,
            mode.visibility(),
            ChatContent::Panic(PanicCard {
                formula: outcome.formula(),
                table_description: table.map(|t| t.description.clone()).unwrap_or_default(),
                narrative: narrative.clone(),
                announce_level: outcome.announces_level(&self.rules.panic),
                outcome: outcome.clone(),
            }),
        )
        .await;

        Ok(Some(PanicRoll { outcome, narrative }))
    }

    pub async fn roll_panic_with_dialog(&self, id: &ActorId) -> Result<Option<PanicRoll>, ActionError> {
        match self.ask("Panic", DialogTemplate::RollStress).await {
            Some(modifiers) => self.roll_panic(id, modifiers).await,
            None => Ok(None),
        }
    }

    pub async fn stress_change(&self, id: &ActorId, button: MeterButton) -> Result<(), ActionError> {
        let _turn = self.locks.acquire(id).await;
        let actor = self.prepared_actor(id)?;
        let Some(sheet) = actor.sheet() else {
            tracing::debug!(actor = %id, "No stress or health meters on this actor");
            return Ok(());
        };

        let header = &sheet.header;
        let patch = match button {
            MeterButton::MinusStress => ActorPatch::StressValue(header.stress.value - 1),
            MeterButton::PlusStress => ActorPatch::StressValue(header.stress.value + 1),
            MeterButton::MinusHealth => ActorPatch::HealthValue(header.health.value - 1),
            MeterButton::PlusHealth => ActorPatch::HealthValue(header.health.value + 1),
        };
        self.store.update_actor(id, patch).await?;
        Ok(())
    }

    /// Step a checkbox track within `[0, max]` and return the new level
    ///
    /// `max` falls back to the configured default. Stepping the panic track
    /// down also ends an active panic.
    pub async fn adjust_track(
        &self,
        id: &ActorId,
        track: Track,
        step: TrackStep,
        max: Option<i64>,
    ) -> Result<i64, ActionError> {
        let _turn = self.locks.acquire(id).await;
        let actor = self.prepared_actor(id)?;
        let current = actor.sheet().map_or(0, |s| s.general.track(track).value);
        let max = max.unwrap_or(self.rules.tracks.default_max).max(0);

        let level = match step {
            TrackStep::Increment => (current + 1).clamp(0, max),
            TrackStep::Decrement => (current - 1).clamp(0, max),
        };
        self.store
            .update_actor(id, ActorPatch::TrackValue(track, level))
            .await?;

        if step == TrackStep::Decrement && track == Track::Panic {
            self.end_panic_for(&actor).await?;
        }
        Ok(level)
    }

    /// Start a panic: bump the panic track and mark every active token
    pub async fn cause_panic(&self, id: &ActorId) -> Result<(), ActionError> {
        let _turn = self.locks.acquire(id).await;
        let actor = self.prepared_actor(id)?;
        self.raise_panic(&actor).await
    }

    /// End a character's panic; returns whether one was active
    pub async fn end_panic(&self, id: &ActorId) -> Result<bool, ActionError> {
        let _turn = self.locks.acquire(id).await;
        let actor = self.prepared_actor(id)?;
        self.end_panic_for(&actor).await
    }

    /// Roll a supply check and deplete the stacks that pay for it
    pub async fn consumables_check(
        &self,
        id: &ActorId,
        consumable: Consumable,
    ) -> Result<SupplyCheck, ActionError> {
        let _turn = self.locks.acquire(id).await;
        let actor = self.prepared_actor(id)?;
        let aggregate = actor.sheet().map_or(0, |s| s.consumables.get(consumable));

        if aggregate <= 0 {
            tracing::debug!(actor = %id, %consumable, "Supply check with nothing left");
            self.chat.warn(Warning::NoSupplies(consumable));
            return Ok(SupplyCheck::Empty);
        }

        let roll = DicePool::new(RollKind::Supply, consumable.to_string(), 0, aggregate)
            .locked()
            .blind(actor.token.is_hostile())
            .roll(self.dice.as_ref(), &self.rules.dice)
            .resolve();
        self.post_resolved(id, &roll).await;

        let signal = i64::from(roll.report.stress_ones);
        if signal == 0 {
            return Ok(SupplyCheck::Rolled {
                roll,
                depletion: None,
            });
        }

        let stacks = supply_stacks(&actor, consumable);
        let Some(plan) = plan_depletion(
            consumable,
            &stacks,
            aggregate,
            signal,
            self.rules.supply.carry_depletion,
        ) else {
            tracing::warn!(actor = %id, %consumable, aggregate, "No item stack holds this supply");
            self.chat.warn(Warning::NoSupplyStack(consumable));
            return Ok(SupplyCheck::Rolled {
                roll,
                depletion: None,
            });
        };

        self.apply_depletion(id, &plan).await?;
        tracing::info!(
            actor = %id,
            %consumable,
            amount = plan.amount(),
            remaining = plan.aggregate_to,
            "Supply depleted"
        );
        Ok(SupplyCheck::Rolled {
            roll,
            depletion: Some(plan),
        })
    }

    /// Creature acid blood: either a GM notice or a damage-modified roll
    pub async fn creature_acid_roll(
        &self,
        id: &ActorId,
        request: AcidRoll,
    ) -> Result<Option<ResolvedRoll>, ActionError> {
        let actor = self
            .store
            .actor(id)
            .ok_or_else(|| ActionError::ActorNotFound(id.clone()))?;

        let base = match request.source {
            AcidSource::Splash => {
                self.post(id, Visibility::gm_blind(), ChatContent::AcidBlood)
                    .await;
                return Ok(None);
            }
            AcidSource::Dice(n) => n,
        };
        if request.armor && base < 1 {
            self.chat.warn(Warning::NoArmor);
            return Ok(None);
        }
        let label = if request.armor {
            "Armor".to_string()
        } else {
            request.label
        };

        let values = match self
            .prompt
            .request(DialogRequest {
                label: label.clone(),
                template: DialogTemplate::CreatureDamage,
            })
            .await
        {
            DialogResponse::Confirmed(values) => values,
            DialogResponse::Cancelled => return Ok(None),
        };

        let roll = DicePool::new(RollKind::Creature, label, base + damage_bonus(&values), 0)
            .locked()
            .blind(actor.token.is_hostile())
            .roll(self.dice.as_ref(), &self.rules.dice)
            .resolve();
        self.post_resolved(id, &roll).await;
        Ok(Some(roll))
    }

    /// Roll 1d6 on a creature's attack table
    pub async fn creature_attack_roll(
        &self,
        id: &ActorId,
        table_name: &str,
    ) -> Result<TableDraw, ActionError> {
        if self.store.actor(id).is_none() {
            return Err(ActionError::ActorNotFound(id.clone()));
        }
        let table = self
            .tables
            .get_by_name(table_name)
            .or_else(|| self.tables.get(table_name))
            .ok_or_else(|| RollError::UnknownTable(table_name.to_string()))?;

        let draw = table.draw_with(vec![u32::from(self.dice.d6())], 0);
        self.post(
            id,
            Visibility::public(),
            ChatContent::CreatureAttack {
                table: table.name.clone(),
                description: table.description.clone(),
                draw: draw.clone(),
            },
        )
        .await;
        Ok(draw)
    }

    async fn ask(&self, label: &str, template: DialogTemplate) -> Option<RollModifiers> {
        let request = DialogRequest {
            label: label.to_string(),
            template,
        };
        match self.prompt.request(request).await {
            DialogResponse::Confirmed(values) => Some(RollModifiers::from_values(&values)),
            DialogResponse::Cancelled => {
                tracing::debug!(label, "Roll dialog cancelled");
                None
            }
        }
    }

    async fn raise_panic(&self, actor: &Actor) -> Result<(), ActionError> {
        let value = actor.sheet().map_or(0, |s| s.general.panic.track.value);
        self.store
            .update_actor(&actor.id, ActorPatch::TrackValue(Track::Panic, value + 1))
            .await?;
        for token in self.store.active_tokens(&actor.id) {
            self.store
                .toggle_effect(&token, TokenEffect::Terrified, true)
                .await?;
        }
        tracing::info!(actor = %actor.id, level = value + 1, "Panic started");
        Ok(())
    }

    async fn end_panic_for(&self, actor: &Actor) -> Result<bool, ActionError> {
        let ActorKind::Character(sheet) = &actor.kind else {
            return Ok(false);
        };
        if sheet.general.panic.last_roll <= 0 {
            return Ok(false);
        }

        self.store
            .update_actor(&actor.id, ActorPatch::PanicLastRoll(0))
            .await?;
        for token in self.store.active_tokens(&actor.id) {
            self.store
                .toggle_effect(&token, TokenEffect::Terrified, false)
                .await?;
        }
        self.post(&actor.id, Visibility::public(), ChatContent::PanicOver)
            .await;
        tracing::info!(actor = %actor.id, "Panic ended");
        Ok(true)
    }

    /// Item stacks first, then the actor total, each awaited in turn
    async fn apply_depletion(&self, id: &ActorId, plan: &DepletionPlan) -> Result<(), ActionError> {
        let mut written = Vec::new();
        for draw in &plan.stacks {
            let result = self
                .store
                .update_item(id, &draw.item, ItemPatch::Supply(plan.consumable, draw.to))
                .await;
            if let Err(source) = result {
                if written.is_empty() {
                    return Err(source.into());
                }
                return Err(ActionError::PartialUpdate {
                    actor: id.clone(),
                    items: written,
                    source,
                });
            }
            written.push(draw.item.clone());
        }

        self.store
            .update_actor(id, ActorPatch::Consumable(plan.consumable, plan.aggregate_to))
            .await
            .map_err(|source| ActionError::PartialUpdate {
                actor: id.clone(),
                items: written,
                source,
            })
    }

    async fn post_rolled(&self, id: &ActorId, roll: &RolledPool) {
        let card = RollCard::rolled(roll, roll.can_push(&self.rules.dice));
        self.post(id, roll_visibility(roll.is_blind()), ChatContent::Roll(card))
            .await;
    }

    async fn post_resolved(&self, id: &ActorId, roll: &ResolvedRoll) {
        let card = RollCard::resolved(roll);
        self.post(id, roll_visibility(roll.blind), ChatContent::Roll(card))
            .await;
    }

    async fn post(&self, id: &ActorId, visibility: Visibility, content: ChatContent) {
        self.chat
            .post(ChatMessage {
                speaker: id.clone(),
                visibility,
                content,
            })
            .await;
    }
}

fn roll_visibility(blind: bool) -> Visibility {
    if blind {
        Visibility::blind_public()
    } else {
        Visibility::public()
    }
}

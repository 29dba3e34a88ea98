//! In-memory host ports for development and testing
//!
//! The store runs the derive pass after every write, the way the host
//! re-prepares an actor when its data changes.

use crate::chat::{ChatMessage, ChatSink, Warning};
use crate::dialog::{DialogRequest, DialogResponse, ModifierPrompt};
use crate::store::{ActorStore, StoreError, TokenEffect, TokenId};
use async_trait::async_trait;
use sheet_core::{Actor, ActorId, ActorPatch, ItemId, ItemPatch};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Actor store held in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    actors: RwLock<HashMap<ActorId, Actor>>,
    tokens: RwLock<HashMap<ActorId, Vec<TokenId>>>,
    effects: Mutex<HashSet<(TokenId, TokenEffect)>>,
    reject_actor_updates: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an actor, deriving its stats first
    pub fn insert(&self, mut actor: Actor) {
        stat_core::prepare_in_place(&mut actor);
        self.actors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(actor.id.clone(), actor);
    }

    /// Place a token for an actor on the active scene
    pub fn place_token(&self, actor: &ActorId, token: impl Into<String>) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(actor.clone())
            .or_default()
            .push(TokenId(token.into()));
    }

    pub fn has_effect(&self, token: &TokenId, effect: TokenEffect) -> bool {
        lock(&self.effects).contains(&(token.clone(), effect))
    }

    /// Make every later actor update fail, leaving item updates working
    pub fn reject_actor_updates(&self, reject: bool) {
        self.reject_actor_updates.store(reject, Ordering::SeqCst);
    }

    fn modify<F>(&self, id: &ActorId, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Actor) -> Result<(), StoreError>,
    {
        let mut actors = self.actors.write().unwrap_or_else(PoisonError::into_inner);
        let actor = actors
            .get_mut(id)
            .ok_or_else(|| StoreError::ActorNotFound(id.clone()))?;
        let mut updated = actor.clone();
        f(&mut updated)?;
        stat_core::prepare_in_place(&mut updated);
        *actor = updated;
        Ok(())
    }
}

#[async_trait]
impl ActorStore for MemoryStore {
    fn actor(&self, id: &ActorId) -> Option<Actor> {
        self.actors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn active_tokens(&self, id: &ActorId) -> Vec<TokenId> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    async fn update_actor(&self, id: &ActorId, patch: ActorPatch) -> Result<(), StoreError> {
        if self.reject_actor_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected(format!("{:?}", patch)));
        }
        self.modify(id, |actor| patch.apply_in_place(actor).map_err(StoreError::from))
    }

    async fn update_item(
        &self,
        actor: &ActorId,
        item: &ItemId,
        patch: ItemPatch,
    ) -> Result<(), StoreError> {
        self.modify(actor, |a| {
            let target = a.item_mut(item).ok_or_else(|| StoreError::ItemNotFound {
                actor: actor.clone(),
                item: item.clone(),
            })?;
            patch.apply_in_place(target);
            Ok(())
        })
    }

    async fn toggle_effect(
        &self,
        token: &TokenId,
        effect: TokenEffect,
        active: bool,
    ) -> Result<(), StoreError> {
        let mut effects = lock(&self.effects);
        if active {
            effects.insert((token.clone(), effect));
        } else {
            effects.remove(&(token.clone(), effect));
        }
        Ok(())
    }
}

/// Chat log that keeps every message and warning
#[derive(Debug, Default)]
pub struct MemoryChat {
    messages: Mutex<Vec<ChatMessage>>,
    warnings: Mutex<Vec<Warning>>,
}

impl MemoryChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        lock(&self.messages).clone()
    }

    pub fn warnings(&self) -> Vec<Warning> {
        lock(&self.warnings).clone()
    }
}

#[async_trait]
impl ChatSink for MemoryChat {
    async fn post(&self, message: ChatMessage) {
        lock(&self.messages).push(message);
    }

    fn warn(&self, warning: Warning) {
        tracing::warn!(%warning, "User notification");
        lock(&self.warnings).push(warning);
    }
}

/// Dialog that answers from a queue of canned responses
///
/// Once the queue is empty every request is cancelled.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    responses: Mutex<VecDeque<DialogResponse>>,
    requests: Mutex<Vec<DialogRequest>>,
}

impl ScriptedPrompt {
    pub fn new(responses: impl IntoIterator<Item = DialogResponse>) -> Self {
        ScriptedPrompt {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, response: DialogResponse) {
        lock(&self.responses).push_back(response);
    }

    /// Requests seen so far
    pub fn requests(&self) -> Vec<DialogRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl ModifierPrompt for ScriptedPrompt {
    async fn request(&self, request: DialogRequest) -> DialogResponse {
        lock(&self.requests).push(request);
        lock(&self.responses)
            .pop_front()
            .unwrap_or(DialogResponse::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheet_core::{ActorKind, CharacterSheet, Consumable, Item, ItemKind};

    fn tank() -> Item {
        Item::new(
            "tank",
            "Air Tank",
            ItemKind::Gear {
                attributes: Default::default(),
                skills: Default::default(),
            },
        )
        .with_supply(Consumable::Air, 4)
    }

    #[tokio::test]
    async fn test_insert_derives_totals() {
        let store = MemoryStore::new();
        let actor = Actor::new("a1", "Dallas", ActorKind::Character(CharacterSheet::default()))
            .with_item(tank());
        store.insert(actor);

        let stored = store.actor(&ActorId::from("a1")).unwrap();
        assert_eq!(stored.sheet().unwrap().consumables.air.value, 4);
    }

    #[tokio::test]
    async fn test_item_update_rederives() {
        let store = MemoryStore::new();
        let id = ActorId::from("a1");
        store.insert(
            Actor::new("a1", "Dallas", ActorKind::Character(CharacterSheet::default()))
                .with_item(tank()),
        );

        store
            .update_item(&id, &ItemId::from("tank"), ItemPatch::Supply(Consumable::Air, 1))
            .await
            .unwrap();
        let stored = store.actor(&id).unwrap();
        assert_eq!(stored.sheet().unwrap().consumables.air.value, 1);
    }

    #[tokio::test]
    async fn test_missing_targets() {
        let store = MemoryStore::new();
        let err = store
            .update_actor(&ActorId::from("ghost"), ActorPatch::StressValue(1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ActorNotFound(_)));

        store.insert(Actor::new(
            "a1",
            "Dallas",
            ActorKind::Character(CharacterSheet::default()),
        ));
        let err = store
            .update_item(
                &ActorId::from("a1"),
                &ItemId::from("nope"),
                ItemPatch::Active(false),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ItemNotFound { .. }));
    }

    #[tokio::test]
    async fn test_scripted_prompt_runs_dry() {
        let prompt = ScriptedPrompt::new([DialogResponse::Cancelled]);
        let req = DialogRequest {
            label: "Wits".to_string(),
            template: crate::dialog::DialogTemplate::RollBase,
        };
        assert_eq!(prompt.request(req.clone()).await, DialogResponse::Cancelled);
        assert_eq!(prompt.request(req).await, DialogResponse::Cancelled);
        assert_eq!(prompt.requests().len(), 2);
    }
}

//! Host actor store port

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sheet_core::{Actor, ActorId, ActorPatch, ItemId, ItemPatch, PatchError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Actor not found: {0}")]
    ActorNotFound(ActorId),
    #[error("Item '{item}' not found on actor '{actor}'")]
    ItemNotFound { actor: ActorId, item: ItemId },
    #[error(transparent)]
    Patch(#[from] PatchError),
    #[error("Update rejected: {0}")]
    Rejected(String),
}

/// Identifier of a placed token
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(pub String);

/// Status overlays the engine puts on tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenEffect {
    Terrified,
}

impl TokenEffect {
    pub fn icon(&self) -> &'static str {
        match self {
            TokenEffect::Terrified => "icons/svg/terror.svg",
        }
    }
}

/// Actor and item persistence owned by the host
///
/// Reads are synchronous snapshots. Each update changes one field and is
/// atomic on its own; there is no multi-field transaction.
#[async_trait]
pub trait ActorStore: Send + Sync {
    fn actor(&self, id: &ActorId) -> Option<Actor>;

    /// Tokens of this actor placed on the active scene
    fn active_tokens(&self, id: &ActorId) -> Vec<TokenId>;

    async fn update_actor(&self, id: &ActorId, patch: ActorPatch) -> Result<(), StoreError>;

    async fn update_item(
        &self,
        actor: &ActorId,
        item: &ItemId,
        patch: ItemPatch,
    ) -> Result<(), StoreError>;

    async fn toggle_effect(
        &self,
        token: &TokenId,
        effect: TokenEffect,
        active: bool,
    ) -> Result<(), StoreError>;
}

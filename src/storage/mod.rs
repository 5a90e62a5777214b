//! Storage collaborator contract
//!
//! The backing store is the source of truth for generated fields (`id`,
//! timestamps) and is expected to scope every call to the row owner.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Item, ItemId, ItemPatch, NewItem, OwnerId};

/// Durable item storage
#[async_trait]
pub trait ItemStorage: Send + Sync {
    /// All items owned by `owner`, newest first
    async fn list(&self, owner: OwnerId) -> Result<Vec<Item>>;

    /// Persist a new item and return the canonical record
    async fn insert(&self, item: NewItem) -> Result<Item>;

    /// Apply `patch` to item `id` and return the canonical record
    async fn patch(&self, id: ItemId, patch: &ItemPatch) -> Result<Item>;

    /// Delete item `id`. Deleting an absent row is not an error.
    async fn remove(&self, id: ItemId) -> Result<()>;
}

//! [`ItemStorage`] backed by a PostgREST table

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::auth::SessionProvider;
use crate::error::{Error, Result};
use crate::model::{Item, ItemId, ItemPatch, NewItem, OwnerId};
use crate::postgrest::{PostgrestClient, TableSchema};
use crate::storage::ItemStorage;

/// Stores items in one table, acting as the signed-in user
pub struct PostgrestStorage {
    client: PostgrestClient,
    schema: TableSchema,
    session: Arc<dyn SessionProvider>,
}

impl PostgrestStorage {
    pub fn new(
        client: PostgrestClient,
        schema: TableSchema,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            client,
            schema,
            session,
        }
    }

    fn token(&self) -> Result<String> {
        self.session.access_token().ok_or(Error::Unauthenticated)
    }

    fn single(&self, rows: Vec<Value>, id: Option<ItemId>) -> Result<Item> {
        let mut items = self.schema.decode(rows)?;
        match (items.pop(), id) {
            (Some(item), _) if items.is_empty() => Ok(item),
            (Some(_), _) => Err(Error::persistence(format!(
                "{} returned more than one row",
                self.client.table()
            ))),
            (None, Some(id)) => Err(Error::NotFound(id)),
            (None, None) => Err(Error::persistence(format!(
                "{} returned no row after insert",
                self.client.table()
            ))),
        }
    }
}

#[async_trait]
impl ItemStorage for PostgrestStorage {
    async fn list(&self, owner: OwnerId) -> Result<Vec<Item>> {
        let token = self.token()?;
        let rows = self
            .client
            .select("*")
            .eq("user_id", owner)
            .order("created_at", false)
            .auth(&token)
            .execute::<Value>()
            .await?;
        tracing::debug!(table = self.client.table(), rows = rows.len(), "listed rows");
        self.schema.decode(rows)
    }

    async fn insert(&self, item: NewItem) -> Result<Item> {
        let token = self.token()?;
        let body = self.schema.insert_body(&item)?;
        let mut query = self.client.insert(&body)?;
        let rows = query.auth(&token).execute::<Value>().await?;
        self.single(rows, None)
    }

    async fn patch(&self, id: ItemId, patch: &ItemPatch) -> Result<Item> {
        let token = self.token()?;
        let body = self.schema.patch_body(patch)?;
        let mut query = self.client.update(&body)?;
        let rows = query
            .eq("id", id)
            .auth(&token)
            .execute::<Value>()
            .await?;
        self.single(rows, Some(id))
    }

    async fn remove(&self, id: ItemId) -> Result<()> {
        let token = self.token()?;
        self.client
            .delete()
            .eq("id", id)
            .auth(&token)
            .execute_no_return()
            .await
    }
}

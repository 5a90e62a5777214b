//! Session-scoped item cache with confirm-then-apply mutations
//!
//! # Invariants
//! - Every mutation makes exactly one storage call, and the cache changes
//!   only after that call succeeds, or after storage reports the item gone.
//! - The cache always holds the canonical record returned by storage, never
//!   the caller's draft or patch.
//! - Locks are never held across a storage await. Concurrent mutations of
//!   one item resolve as last-completing-response-wins.
//! - Notification failures never affect the result of a mutation.

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::task::JoinHandle;

use crate::auth::SessionProvider;
use crate::error::{Error, Result};
use crate::model::{Item, ItemDraft, ItemId, ItemKind, ItemPatch, OwnerId};
use crate::notify::{DeliveryOutcome, Dispatcher, NotificationPolicy, Transition};
use crate::status::{Classification, ExpiryStats, ItemFilter, TaskStats};
use crate::storage::ItemStorage;

/// An item paired with its status at a given instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemView {
    pub item: Item,
    /// `None` when the item has no target date
    pub classification: Option<Classification>,
}

/// Owns the current user's items for the session
pub struct ItemStore {
    storage: Arc<dyn ItemStorage>,
    session: Arc<dyn SessionProvider>,
    policy: NotificationPolicy,
    dispatcher: Option<Dispatcher>,
    items: RwLock<Vec<Item>>,
    pending: Mutex<Vec<JoinHandle<DeliveryOutcome>>>,
}

impl ItemStore {
    /// Store without notifications
    pub fn new(storage: Arc<dyn ItemStorage>, session: Arc<dyn SessionProvider>) -> Self {
        Self {
            storage,
            session,
            policy: NotificationPolicy::default(),
            dispatcher: None,
            items: RwLock::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Evaluate `policy` after creates and completions and hand eligible
    /// requests to `dispatcher`
    pub fn with_notifications(mut self, policy: NotificationPolicy, dispatcher: Dispatcher) -> Self {
        self.policy = policy;
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Replace the cache with the owner's items from storage, newest first.
    ///
    /// On failure the cache is left as it was.
    pub async fn load(&self) -> Result<usize> {
        let owner = self.owner()?;
        let mut items = self.storage.list(owner).await.map_err(|err| {
            tracing::warn!(error = %err, "failed to fetch items");
            Error::fetch(err)
        })?;
        for item in &items {
            item.validate().map_err(Error::fetch)?;
        }
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let count = items.len();
        *self.write() = items;
        tracing::debug!(%owner, count, "items loaded");
        Ok(count)
    }

    /// Persist a new item and prepend the canonical record to the cache
    pub async fn create(&self, draft: ItemDraft) -> Result<Item> {
        draft.validate()?;
        let owner = self.owner()?;

        let item = self
            .storage
            .insert(draft.into_new_item(owner))
            .await
            .map_err(|err| storage_failure("create", err))?;
        item.validate().map_err(Error::persistence)?;

        self.write().insert(0, item.clone());
        tracing::debug!(item_id = %item.id, "item created");

        self.notify(Transition::Created, &item);
        Ok(item)
    }

    /// Persist `patch` and replace the cached record with the canonical one.
    ///
    /// When storage no longer has the item, it is evicted from the cache and
    /// [`Error::NotFound`] is returned.
    pub async fn update(&self, id: ItemId, patch: ItemPatch) -> Result<Item> {
        patch.validate()?;
        self.owner()?;
        if self.get(id).is_none() {
            return Err(Error::NotFound(id));
        }

        let item = match self.storage.patch(id, &patch).await {
            Ok(item) => item,
            Err(Error::NotFound(missing)) if missing == id => {
                self.write().retain(|cached| cached.id != id);
                tracing::debug!(item_id = %id, "item gone from storage, evicted");
                return Err(Error::NotFound(id));
            }
            Err(err) => return Err(storage_failure("update", err)),
        };
        item.validate().map_err(Error::persistence)?;
        if item.id != id {
            return Err(Error::persistence(format!(
                "update of {} returned item {}",
                id, item.id
            )));
        }

        match self.write().iter_mut().find(|cached| cached.id == id) {
            Some(cached) => *cached = item.clone(),
            None => tracing::debug!(item_id = %id, "item deleted while update was in flight"),
        }
        tracing::debug!(item_id = %id, "item updated");
        Ok(item)
    }

    /// Delete an item. Returns whether a cached record was removed; an id
    /// that is already gone locally is not an error.
    pub async fn delete(&self, id: ItemId) -> Result<bool> {
        self.owner()?;
        self.storage
            .remove(id)
            .await
            .map_err(|err| storage_failure("delete", err))?;

        let mut items = self.write();
        let before = items.len();
        items.retain(|cached| cached.id != id);
        let removed = items.len() != before;
        tracing::debug!(item_id = %id, removed, "item deleted");
        Ok(removed)
    }

    /// Flip `completed` on a task.
    ///
    /// A false-to-true transition is offered to the notification policy
    /// with the pre-toggle snapshot; un-completing never notifies.
    pub async fn toggle_complete(&self, id: ItemId) -> Result<Item> {
        let snapshot = self.get(id).ok_or(Error::NotFound(id))?;
        let ItemKind::Task { completed, .. } = snapshot.kind else {
            return Err(Error::validation(format!(
                "item {} does not track completion",
                id
            )));
        };

        let updated = self.update(id, ItemPatch::completed(!completed)).await?;
        if !completed {
            self.notify(Transition::Completed, &snapshot);
        }
        Ok(updated)
    }

    /// Snapshot of the cached items, newest first
    pub fn items(&self) -> Vec<Item> {
        self.read().clone()
    }

    pub fn get(&self, id: ItemId) -> Option<Item> {
        self.read().iter().find(|item| item.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Items with their status recomputed at `now`
    pub fn views<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Vec<ItemView> {
        self.read()
            .iter()
            .map(|item| ItemView {
                item: item.clone(),
                classification: item.classify(now),
            })
            .collect()
    }

    pub fn filtered(&self, filter: ItemFilter) -> Vec<Item> {
        self.read()
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect()
    }

    pub fn task_stats<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> TaskStats {
        TaskStats::tally(self.read().iter(), now)
    }

    pub fn expiry_stats<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> ExpiryStats {
        ExpiryStats::tally(self.read().iter(), now)
    }

    /// Number of notification tasks still held by the store
    pub fn pending_notifications(&self) -> usize {
        self.pending().len()
    }

    /// Wait for every held notification task and return their outcomes.
    ///
    /// Tasks that had already finished when a later notification was
    /// spawned are released at that point and not reported here.
    pub async fn settle_notifications(&self) -> Vec<DeliveryOutcome> {
        let handles = std::mem::take(&mut *self.pending());
        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            let outcome = handle.await.unwrap_or_else(|err| {
                tracing::warn!(error = %err, "notification task did not finish");
                DeliveryOutcome::Failed {
                    reason: err.to_string(),
                }
            });
            outcomes.push(outcome);
        }
        outcomes
    }

    fn notify(&self, transition: Transition, item: &Item) {
        let Some(dispatcher) = &self.dispatcher else {
            return;
        };
        if let Some(request) = self.policy.decide(transition, item) {
            if let Some(handle) = dispatcher.spawn(request) {
                let mut pending = self.pending();
                pending.retain(|held| !held.is_finished());
                pending.push(handle);
            }
        }
    }

    fn owner(&self) -> Result<OwnerId> {
        self.session.owner_id().ok_or(Error::Unauthenticated)
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Item>> {
        self.items.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Item>> {
        self.items.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn pending(&self) -> MutexGuard<'_, Vec<JoinHandle<DeliveryOutcome>>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Storage failures become persistence errors unless the caller is at fault
fn storage_failure(operation: &'static str, err: Error) -> Error {
    if err.is_caller_error() {
        return err;
    }
    tracing::warn!(operation, error = %err, "storage call failed");
    Error::persistence(err)
}

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use uuid::Uuid;

use taskmaster::auth::{Session, SessionProvider};
use taskmaster::error::{Error, Result};
use taskmaster::model::{DraftKind, Item, ItemId, ItemKind, ItemPatch, NewItem, OwnerId};
use taskmaster::notify::{Delivery, Dispatcher, NotificationPolicy, NotificationTransport};
use taskmaster::storage::ItemStorage;
use taskmaster::store::ItemStore;

pub const RECIPIENT: &str = "+15550100";

/// In-memory storage that assigns ids and timestamps like the real backend
#[derive(Default)]
pub struct MemoryStorage {
    rows: Mutex<Vec<Item>>,
    calls: AtomicUsize,
    fail: AtomicBool,
    clock: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of storage calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every following call fail until reset
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn rows(&self) -> Vec<Item> {
        self.rows.lock().unwrap().clone()
    }

    /// Seed a row directly, bypassing the call counter
    pub fn seed(&self, item: Item) {
        self.rows.lock().unwrap().push(item);
    }

    /// Remove a row directly, as another client would
    pub fn forget(&self, id: ItemId) {
        self.rows.lock().unwrap().retain(|row| row.id != id);
    }

    fn tick(&self) -> DateTime<Utc> {
        let n = self.clock.fetch_add(1, Ordering::SeqCst) as i64;
        base_time() + Duration::seconds(n + 1)
    }

    fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Api {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ItemStorage for MemoryStorage {
    async fn list(&self, owner: OwnerId) -> Result<Vec<Item>> {
        self.enter()?;
        let mut items: Vec<Item> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|item| item.owner_id == owner)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn insert(&self, item: NewItem) -> Result<Item> {
        self.enter()?;
        let now = self.tick();
        let kind = match item.kind {
            DraftKind::Task { priority } => ItemKind::Task {
                completed: false,
                priority,
            },
            DraftKind::Medicine { barcode } => ItemKind::Medicine { barcode },
        };
        let stored = Item {
            id: ItemId::new_v4(),
            owner_id: item.owner_id,
            title: item.title,
            description: item.description,
            target_date: item.target_date,
            created_at: now,
            updated_at: now,
            kind,
        };
        self.rows.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn patch(&self, id: ItemId, patch: &ItemPatch) -> Result<Item> {
        self.enter()?;
        let now = self.tick();
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(Error::NotFound(id))?;

        if let Some(title) = &patch.title {
            row.title = title.clone();
        }
        if let Some(description) = &patch.description {
            row.description = description.clone();
        }
        if let Some(date) = patch.target_date {
            row.target_date = date;
        }
        match &mut row.kind {
            ItemKind::Task {
                completed,
                priority,
            } => {
                if let Some(value) = patch.completed {
                    *completed = value;
                }
                if let Some(value) = patch.priority {
                    *priority = value;
                }
            }
            ItemKind::Medicine { barcode } => {
                if let Some(value) = &patch.barcode {
                    *barcode = value.clone();
                }
            }
        }
        row.updated_at = now;
        Ok(row.clone())
    }

    async fn remove(&self, id: ItemId) -> Result<()> {
        self.enter()?;
        self.rows.lock().unwrap().retain(|row| row.id != id);
        Ok(())
    }
}

/// Storage whose patches carrying `held_title` wait until another patch has
/// completed, so responses arrive in the opposite order of the calls
pub struct GatedStorage {
    inner: Arc<MemoryStorage>,
    gate: Notify,
    held_title: String,
}

impl GatedStorage {
    pub fn new(inner: Arc<MemoryStorage>, held_title: &str) -> Arc<Self> {
        Arc::new(Self {
            inner,
            gate: Notify::new(),
            held_title: held_title.to_string(),
        })
    }
}

#[async_trait]
impl ItemStorage for GatedStorage {
    async fn list(&self, owner: OwnerId) -> Result<Vec<Item>> {
        self.inner.list(owner).await
    }

    async fn insert(&self, item: NewItem) -> Result<Item> {
        self.inner.insert(item).await
    }

    async fn patch(&self, id: ItemId, patch: &ItemPatch) -> Result<Item> {
        if patch.title.as_deref() == Some(self.held_title.as_str()) {
            self.gate.notified().await;
            return self.inner.patch(id, patch).await;
        }
        let result = self.inner.patch(id, patch).await;
        self.gate.notify_one();
        result
    }

    async fn remove(&self, id: ItemId) -> Result<()> {
        self.inner.remove(id).await
    }
}

/// Transport that records every delivery attempt
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        let transport = Self::default();
        transport.fail.store(true, Ordering::SeqCst);
        Arc::new(transport)
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    async fn deliver(&self, to: &str, body: &str) -> Result<Delivery> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::notification("gateway timeout"));
        }
        Ok(Delivery {
            message_id: Some(format!("SM{}", self.sent.lock().unwrap().len())),
        })
    }
}

pub fn base_time() -> DateTime<Utc> {
    "2024-05-01T08:00:00Z".parse().unwrap()
}

pub fn owner() -> OwnerId {
    OwnerId(Uuid::from_u128(0x5eed))
}

pub fn session() -> Arc<dyn SessionProvider> {
    Arc::new(Session::without_expiry("user-token".to_string(), owner()))
}

/// Store wired to fakes, notifying `RECIPIENT`
pub fn store_with(
    storage: Arc<MemoryStorage>,
    transport: Arc<RecordingTransport>,
) -> ItemStore {
    ItemStore::new(storage, session()).with_notifications(
        NotificationPolicy::new(Some(RECIPIENT.to_string())),
        Dispatcher::new(transport),
    )
}

//! Task and medicine tracker core
//!
//! Tracks a user's tasks and medicines on top of a Supabase project. Items
//! live in PostgREST tables, the signed-in user comes from a session
//! provider, and high-priority task events are relayed as SMS through an
//! edge function.
//!
//! The interesting part is the item lifecycle:
//! - [`status`] derives safe / expiring-soon / expired from a target date,
//! - [`store::ItemStore`] mutates the cached collection only after storage
//!   confirms each write,
//! - [`notify`] decides which transitions send a message and delivers it
//!   without ever failing the mutation that triggered it.

pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod functions;
pub mod model;
pub mod notify;
pub mod postgrest;
pub mod status;
pub mod storage;
pub mod store;

use reqwest::Client;
use std::sync::Arc;

use crate::auth::SessionProvider;
use crate::config::TrackerConfig;
use crate::error::Result;
use crate::functions::FunctionsClient;
use crate::notify::{Dispatcher, EdgeFunctionTransport, NotificationPolicy, NotificationTransport};
use crate::postgrest::{PostgrestClient, PostgrestStorage, TableSchema};
use crate::store::ItemStore;

/// The main entry point: wires the backend collaborators into item stores
pub struct TaskMaster {
    config: TrackerConfig,
    http_client: Client,
    session: Arc<dyn SessionProvider>,
}

impl TaskMaster {
    /// Create a new client acting on behalf of `session`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use taskmaster::{auth::SharedSession, config::TrackerConfig, TaskMaster};
    ///
    /// # async fn run() -> taskmaster::error::Result<()> {
    /// let config = TrackerConfig::new("https://your-project-url.supabase.co", "your-anon-key")?;
    /// let session = Arc::new(SharedSession::default());
    /// let client = TaskMaster::new(config, session)?;
    /// let tasks = client.tasks();
    /// tasks.load().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: TrackerConfig, session: Arc<dyn SessionProvider>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(Self {
            config,
            http_client,
            session,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Client for the project's edge functions
    pub fn functions(&self) -> FunctionsClient {
        FunctionsClient::new(
            &self.config.base_url(),
            &self.config.anon_key,
            self.http_client.clone(),
        )
        .with_timeout(self.config.options.request_timeout)
    }

    /// Store over the tasks table, notifying through the SMS edge function as
    /// the signed-in user
    pub fn tasks(&self) -> ItemStore {
        let transport = EdgeFunctionTransport::new(
            self.functions(),
            &self.config.options.notification_function,
        )
        .with_session(self.session.clone());
        self.tasks_with_transport(Arc::new(transport))
    }

    /// Store over the tasks table with a caller-chosen notification transport
    pub fn tasks_with_transport(&self, transport: Arc<dyn NotificationTransport>) -> ItemStore {
        let policy = NotificationPolicy::new(self.config.options.notification_recipient.clone());
        self.store(&self.config.options.tasks_table, TableSchema::Tasks)
            .with_notifications(policy, Dispatcher::new(transport))
    }

    /// Store over the medicines table. Medicines never notify.
    pub fn medicines(&self) -> ItemStore {
        self.store(&self.config.options.medicines_table, TableSchema::Medicines)
    }

    fn store(&self, table: &str, schema: TableSchema) -> ItemStore {
        let client = PostgrestClient::new(
            &self.config.base_url(),
            &self.config.anon_key,
            table,
            self.http_client.clone(),
        )
        .with_timeout(self.config.options.request_timeout);
        let storage = PostgrestStorage::new(client, schema, self.session.clone());
        ItemStore::new(Arc::new(storage), self.session.clone())
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::auth::{Session, SessionProvider, SharedSession};
    pub use crate::config::{ClientOptions, TrackerConfig};
    pub use crate::error::{Error, Result};
    pub use crate::model::{Item, ItemDraft, ItemId, ItemKind, ItemPatch, OwnerId, Priority};
    pub use crate::status::{classify, Classification, Status};
    pub use crate::store::ItemStore;
    pub use crate::TaskMaster;
}

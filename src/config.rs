//! Configuration options for the taskmaster client

use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};

/// Environment variable holding the SMS recipient for task notifications
pub const NOTIFY_TO_ENV: &str = "TASKMASTER_NOTIFY_TO";

/// Configuration options for the taskmaster client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Table holding task rows
    pub tasks_table: String,

    /// Table holding medicine rows
    pub medicines_table: String,

    /// Edge function that relays SMS notifications
    pub notification_function: String,

    /// Phone number that receives task notifications.
    /// `None` disables notifications entirely.
    pub notification_recipient: Option<String>,

    /// The request timeout
    pub request_timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            tasks_table: "tasks".to_string(),
            medicines_table: "medicines".to_string(),
            notification_function: "send-sms-notification".to_string(),
            notification_recipient: None,
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ClientOptions {
    /// Set the tasks table
    pub fn with_tasks_table(mut self, value: &str) -> Self {
        self.tasks_table = value.to_string();
        self
    }

    /// Set the medicines table
    pub fn with_medicines_table(mut self, value: &str) -> Self {
        self.medicines_table = value.to_string();
        self
    }

    /// Set the notification edge function name
    pub fn with_notification_function(mut self, value: &str) -> Self {
        self.notification_function = value.to_string();
        self
    }

    /// Set the notification recipient
    pub fn with_notification_recipient(mut self, value: Option<&str>) -> Self {
        self.notification_recipient = value.map(str::to_string);
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }
}

/// Project endpoint and key plus client options
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub url: Url,
    pub anon_key: String,
    pub options: ClientOptions,
}

impl TrackerConfig {
    /// Creates a new configuration, validating the URL and key.
    pub fn new(url_str: &str, anon_key: &str) -> Result<Self> {
        let url = Url::parse(url_str)?;
        if anon_key.trim().is_empty() {
            return Err(Error::config("anon_key cannot be empty"));
        }
        Ok(Self {
            url,
            anon_key: anon_key.to_string(),
            options: ClientOptions::default(),
        })
    }

    /// Reads `SUPABASE_URL`, `SUPABASE_ANON_KEY` and the optional
    /// `TASKMASTER_NOTIFY_TO` from the environment.
    pub fn from_env() -> Result<Self> {
        let url_str = std::env::var("SUPABASE_URL")
            .map_err(|_| Error::config("SUPABASE_URL environment variable not found"))?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| Error::config("SUPABASE_ANON_KEY environment variable not found"))?;
        let recipient = std::env::var(NOTIFY_TO_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty());

        let config = Self::new(&url_str, &anon_key)?;
        let options = config
            .options
            .clone()
            .with_notification_recipient(recipient.as_deref());
        Ok(config.with_options(options))
    }

    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Project URL without a trailing slash, for joining service paths
    pub fn base_url(&self) -> String {
        self.url.as_str().trim_end_matches('/').to_string()
    }
}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::SessionProvider;
use crate::error::{Error, Result};
use crate::fetch::CLIENT_INFO;
use crate::functions::FunctionsClient;

/// Default Twilio REST endpoint
pub const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Acknowledgement from a transport
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Provider-assigned message id, when the provider returns one
    pub message_id: Option<String>,
}

/// Delivers a text message to a recipient
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn deliver(&self, to: &str, body: &str) -> Result<Delivery>;
}

/// Relays messages through the `send-sms-notification` edge function
pub struct EdgeFunctionTransport {
    functions: FunctionsClient,
    function_name: String,
    session: Option<Arc<dyn SessionProvider>>,
}

#[derive(Serialize)]
struct SmsInvocation<'a> {
    to: &'a str,
    message: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SmsReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message_sid: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl EdgeFunctionTransport {
    pub fn new(functions: FunctionsClient, function_name: &str) -> Self {
        Self {
            functions,
            function_name: function_name.to_string(),
            session: None,
        }
    }

    /// Invoke the function as the signed-in user instead of with the anon key
    pub fn with_session(mut self, session: Arc<dyn SessionProvider>) -> Self {
        self.session = Some(session);
        self
    }
}

#[async_trait]
impl NotificationTransport for EdgeFunctionTransport {
    async fn deliver(&self, to: &str, body: &str) -> Result<Delivery> {
        let token = self
            .session
            .as_ref()
            .and_then(|session| session.access_token());
        let reply: SmsReply = self
            .functions
            .invoke(
                &self.function_name,
                &SmsInvocation { to, message: body },
                token.as_deref(),
            )
            .await
            .map_err(Error::notification)?;

        match reply {
            SmsReply {
                error: Some(error), ..
            } => Err(Error::notification(error)),
            SmsReply {
                success: true,
                message_sid,
                ..
            } => Ok(Delivery {
                message_id: message_sid,
            }),
            _ => Err(Error::notification(format!(
                "{} did not report success",
                self.function_name
            ))),
        }
    }
}

/// Twilio account used by [`TwilioTransport`]
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender phone number
    pub from_number: String,
    /// API base URL, overridable for testing
    pub api_base: String,
    pub request_timeout: Option<Duration>,
}

impl TwilioConfig {
    pub fn new(account_sid: &str, auth_token: &str, from_number: &str) -> Result<Self> {
        for (name, value) in [
            ("account_sid", account_sid),
            ("auth_token", auth_token),
            ("from_number", from_number),
        ] {
            if value.trim().is_empty() {
                return Err(Error::config(format!("Twilio {} cannot be empty", name)));
            }
        }
        Ok(Self {
            account_sid: account_sid.to_string(),
            auth_token: auth_token.to_string(),
            from_number: from_number.to_string(),
            api_base: TWILIO_API_BASE.to_string(),
            request_timeout: Some(Duration::from_secs(30)),
        })
    }

    /// Reads `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN` and `TWILIO_PHONE_NUMBER`.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            std::env::var(name)
                .map_err(|_| Error::config(format!("{} environment variable not found", name)))
        };
        Self::new(
            &var("TWILIO_ACCOUNT_SID")?,
            &var("TWILIO_AUTH_TOKEN")?,
            &var("TWILIO_PHONE_NUMBER")?,
        )
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }
}

/// Sends SMS directly through the Twilio Messages API
pub struct TwilioTransport {
    config: TwilioConfig,
    client: Client,
}

#[derive(Deserialize)]
struct TwilioMessage {
    sid: Option<String>,
}

impl TwilioTransport {
    pub fn new(config: TwilioConfig, client: Client) -> Self {
        Self { config, client }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base, self.config.account_sid
        )
    }
}

#[async_trait]
impl NotificationTransport for TwilioTransport {
    async fn deliver(&self, to: &str, body: &str) -> Result<Delivery> {
        let form = [
            ("To", to),
            ("From", self.config.from_number.as_str()),
            ("Body", body),
        ];
        let mut request = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .header("X-Client-Info", CLIENT_INFO)
            .form(&form);
        if let Some(timeout) = self.config.request_timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(Error::notification)?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::notification(format!(
                "Twilio API error {}: {}",
                status.as_u16(),
                text
            )));
        }

        let message: TwilioMessage = response.json().await.map_err(Error::notification)?;
        Ok(Delivery {
            message_id: message.sid,
        })
    }
}

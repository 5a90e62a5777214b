//! Edge Functions client

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::fetch::Fetch;

/// Client for Supabase Edge Functions
#[derive(Clone)]
pub struct FunctionsClient {
    /// The base URL for the Supabase project
    url: String,

    /// The anonymous API key for the Supabase project
    key: String,

    /// HTTP client
    client: Client,

    /// Per-request timeout
    timeout: Option<Duration>,
}

impl FunctionsClient {
    /// Create a new FunctionsClient
    pub fn new(url: &str, key: &str, client: Client) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            client,
            timeout: None,
        }
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the URL of an edge function
    fn get_url(&self, function_name: &str) -> String {
        format!("{}/functions/v1/{}", self.url, function_name)
    }

    /// Invoke an edge function with a JSON body and decode its JSON reply.
    ///
    /// `authorization` overrides the anonymous key as bearer token.
    pub async fn invoke<T: Serialize, R: DeserializeOwned>(
        &self,
        function_name: &str,
        body: &T,
        authorization: Option<&str>,
    ) -> Result<R> {
        let url = self.get_url(function_name);

        let result = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .bearer_auth(authorization.unwrap_or(&self.key))
            .timeout(self.timeout)
            .json(body)?
            .execute::<R>()
            .await;

        result.map_err(|err| match err {
            Error::Api { status, message } => Error::Api {
                status,
                message: format!("function {} failed: {}", function_name, message),
            },
            other => other,
        })
    }
}

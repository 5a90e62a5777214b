//! Request builder for PostgrestClient

use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::fetch::FetchBuilder;
use crate::postgrest::PostgrestClient;

/// What PostgREST should send back from a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnOption {
    /// Return the affected rows
    Representation,

    /// Return no body
    Minimal,
}

impl ReturnOption {
    /// Value of the `Prefer` header
    pub fn as_prefer(&self) -> &'static str {
        match self {
            ReturnOption::Representation => "return=representation",
            ReturnOption::Minimal => "return=minimal",
        }
    }
}

/// A single request against a table: filters, ordering, body and auth
pub struct TableQuery<'a> {
    table: &'a PostgrestClient,
    method: Method,
    params: Vec<(String, String)>,
    body: Option<Value>,
    returning: Option<ReturnOption>,
    token: Option<String>,
}

impl<'a> TableQuery<'a> {
    pub(crate) fn new(table: &'a PostgrestClient, method: Method) -> Self {
        Self {
            table,
            method,
            params: Vec::new(),
            body: None,
            returning: None,
            token: None,
        }
    }

    pub(crate) fn param(&mut self, key: &str, value: &str) -> &mut Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    pub(crate) fn body<T: Serialize>(&mut self, values: &T) -> Result<&mut Self> {
        self.body = Some(serde_json::to_value(values)?);
        Ok(self)
    }

    pub(crate) fn returning(&mut self, option: ReturnOption) -> &mut Self {
        self.returning = Some(option);
        self
    }

    /// Filter rows where column equals a value
    pub fn eq<T: ToString>(&mut self, column: &str, value: T) -> &mut Self {
        let filter = format!("eq.{}", value.to_string());
        self.param(column, &filter)
    }

    /// Order the results by a column
    pub fn order(&mut self, column: &str, ascending: bool) -> &mut Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.param("order", &format!("{}.{}", column, direction))
    }

    /// Run the request as the given user instead of the anonymous key
    pub fn auth(&mut self, token: &str) -> &mut Self {
        self.token = Some(token.to_string());
        self
    }

    /// Query parameters in the order they were added
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    fn fetch(&self) -> Result<FetchBuilder<'_>> {
        let url = self.table.get_url();
        let mut fetch = FetchBuilder::new(&self.table.client, &url, self.method.clone())
            .header("apikey", &self.table.key)
            .bearer_auth(self.token.as_deref().unwrap_or(&self.table.key))
            .timeout(self.table.timeout);

        if let Some(option) = self.returning {
            fetch = fetch.header("Prefer", option.as_prefer());
        }
        for (key, value) in &self.params {
            fetch = fetch.query_pair(key, value);
        }
        if let Some(body) = &self.body {
            fetch = fetch.json(body)?;
        }
        Ok(fetch)
    }

    /// Execute the request and deserialize the returned rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<Vec<R>> {
        self.fetch()?.execute::<Vec<R>>().await
    }

    /// Execute the request without reading a body
    pub async fn execute_no_return(&self) -> Result<()> {
        self.fetch()?.execute_empty().await
    }
}

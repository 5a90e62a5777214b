//! Item storage over the PostgREST API
//!
//! [`PostgrestClient`] builds table requests; [`PostgrestStorage`] maps the
//! `tasks` and `medicines` row shapes onto [`crate::model::Item`] and
//! implements [`crate::storage::ItemStorage`].

mod query;
mod rows;
mod storage;

use reqwest::{Client, Method};
use serde::Serialize;
use std::time::Duration;

use crate::error::Result;

pub use query::*;
pub use rows::TableSchema;
pub use storage::PostgrestStorage;

/// Client for one PostgREST table
#[derive(Clone)]
pub struct PostgrestClient {
    /// The base URL for the Supabase project
    url: String,

    /// The anonymous API key for the Supabase project
    key: String,

    /// The table or view name
    table: String,

    /// HTTP client
    client: Client,

    /// Per-request timeout
    timeout: Option<Duration>,
}

impl PostgrestClient {
    /// Create a new PostgrestClient
    pub fn new(url: &str, key: &str, table: &str, client: Client) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            table: table.to_string(),
            client,
            timeout: None,
        }
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Get the URL for REST API requests on this table
    fn get_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url, self.table)
    }

    /// Select specific columns from the table
    pub fn select(&self, columns: &str) -> TableQuery<'_> {
        let mut query = TableQuery::new(self, Method::GET);
        query.param("select", columns);
        query
    }

    /// Insert a row, returning its representation
    pub fn insert<T: Serialize>(&self, values: &T) -> Result<TableQuery<'_>> {
        let mut query = TableQuery::new(self, Method::POST);
        query.body(values)?.returning(ReturnOption::Representation);
        Ok(query)
    }

    /// Update rows matched by the filters added to the returned query
    pub fn update<T: Serialize>(&self, values: &T) -> Result<TableQuery<'_>> {
        let mut query = TableQuery::new(self, Method::PATCH);
        query.body(values)?.returning(ReturnOption::Representation);
        Ok(query)
    }

    /// Delete rows matched by the filters added to the returned query
    pub fn delete(&self) -> TableQuery<'_> {
        let mut query = TableQuery::new(self, Method::DELETE);
        query.returning(ReturnOption::Minimal);
        query
    }
}

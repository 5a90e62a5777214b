//! Error handling for the taskmaster core

use std::fmt;
use thiserror::Error;

use crate::model::ItemId;

/// Unified error type for item lifecycle operations and their collaborators
#[derive(Error, Debug)]
pub enum Error {
    /// Bad caller input, rejected before any I/O
    #[error("Validation error: {0}")]
    Validation(String),

    /// The storage collaborator failed a write; local state was left unchanged
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The storage collaborator failed a read; local state was left unchanged
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The operation referenced an item that is not present
    #[error("Item not found: {0}")]
    NotFound(ItemId),

    /// The notification transport failed
    #[error("Notification error: {0}")]
    Notification(String),

    /// No user session is active
    #[error("No active session")]
    Unauthenticated,

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A backend answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or error message
        message: String,
    },

    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new persistence error
    pub fn persistence<T: fmt::Display>(msg: T) -> Self {
        Error::Persistence(msg.to_string())
    }

    /// Create a new fetch error
    pub fn fetch<T: fmt::Display>(msg: T) -> Self {
        Error::Fetch(msg.to_string())
    }

    /// Create a new notification error
    pub fn notification<T: fmt::Display>(msg: T) -> Self {
        Error::Notification(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Whether the error was caused by the caller rather than a collaborator
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::NotFound(_) | Error::Unauthenticated
        )
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

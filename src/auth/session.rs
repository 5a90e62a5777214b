//! Session data handed over by the sign-in flow

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::model::OwnerId;

/// Session data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The access token
    pub access_token: String,

    /// The signed-in user
    pub user_id: OwnerId,

    /// The expiry timestamp, in unix seconds
    pub expires_at: Option<i64>,
}

impl Session {
    /// Create a session that expires `expires_in` seconds from now
    pub fn new(access_token: String, user_id: OwnerId, expires_in: i64) -> Self {
        Self {
            access_token,
            user_id,
            expires_at: Some(unix_now() + expires_in),
        }
    }

    /// Create a session without an expiry, e.g. for service tokens
    pub fn without_expiry(access_token: String, user_id: OwnerId) -> Self {
        Self {
            access_token,
            user_id,
            expires_at: None,
        }
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => unix_now() >= expires_at,
            None => false,
        }
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs() as i64
}

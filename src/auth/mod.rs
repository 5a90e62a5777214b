//! Session collaborator: who the current user is
//!
//! The core never signs users in itself. It only asks a [`SessionProvider`]
//! for the current owner and access token; with no owner it performs no
//! operations.

mod session;

use std::sync::RwLock;

use crate::model::OwnerId;

pub use session::*;

/// Supplies the identity of the active user
pub trait SessionProvider: Send + Sync {
    /// Owner of the active session, or `None` when signed out
    fn owner_id(&self) -> Option<OwnerId>;

    /// Bearer token for backend calls made on behalf of the user
    fn access_token(&self) -> Option<String>;
}

impl SessionProvider for Session {
    fn owner_id(&self) -> Option<OwnerId> {
        (!self.is_expired()).then_some(self.user_id)
    }

    fn access_token(&self) -> Option<String> {
        (!self.is_expired()).then(|| self.access_token.clone())
    }
}

/// Session slot that can be swapped on sign-in and cleared on sign-out
#[derive(Debug, Default)]
pub struct SharedSession {
    current: RwLock<Option<Session>>,
}

impl SharedSession {
    pub fn new(session: Option<Session>) -> Self {
        Self {
            current: RwLock::new(session),
        }
    }

    /// Replace the active session
    pub fn sign_in(&self, session: Session) {
        tracing::debug!(user_id = %session.user_id, "session replaced");
        *self.write() = Some(session);
    }

    /// Drop the active session
    pub fn sign_out(&self) {
        tracing::debug!("session cleared");
        *self.write() = None;
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<Session>> {
        self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<Session>> {
        self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionProvider for SharedSession {
    fn owner_id(&self) -> Option<OwnerId> {
        self.read().as_ref().and_then(|session| session.owner_id())
    }

    fn access_token(&self) -> Option<String> {
        self.read().as_ref().and_then(|session| session.access_token())
    }
}

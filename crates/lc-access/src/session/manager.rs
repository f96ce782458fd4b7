//! Session Manager
//!
//! Creates, reads, and destroys the session held in a [`ClientStorage`].
//! The session is read from storage on every call and never cached.

use tracing::{debug, info, warn};

use super::entity::{decode_user, Session, User};
use super::storage::ClientStorage;
use crate::shared::error::{AccessError, Result};

/// Storage keys for the two session entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKeys {
    pub token: String,
    pub user: String,
}

impl Default for SessionKeys {
    fn default() -> Self {
        Self {
            token: "token".to_string(),
            user: "user".to_string(),
        }
    }
}

pub struct SessionManager<S> {
    storage: S,
    keys: SessionKeys,
}

impl<S: ClientStorage> SessionManager<S> {
    pub fn new(storage: S) -> Self {
        Self::with_keys(storage, SessionKeys::default())
    }

    pub fn with_keys(storage: S, keys: SessionKeys) -> Self {
        Self { storage, keys }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    /// Persist a new session. Replaces any existing one.
    pub fn login(&self, token: &str, user: &User) -> Result<Session> {
        let session = Session::new(token, user.clone())
            .ok_or_else(|| AccessError::validation("token must not be empty"))?;

        let user_json = serde_json::to_string(user)?;
        self.storage.set(&self.keys.token, &session.token)?;
        self.storage.set(&self.keys.user, &user_json)?;

        info!(
            user_id = %user.id,
            role = user.role_text().unwrap_or(""),
            "Session created"
        );
        Ok(session)
    }

    /// Remove both session entries
    pub fn logout(&self) -> Result<()> {
        self.storage.remove(&self.keys.token)?;
        self.storage.remove(&self.keys.user)?;
        info!("Session destroyed");
        Ok(())
    }

    /// Current session, if storage holds a non-empty token and a well-formed user.
    pub fn current(&self) -> Option<Session> {
        let token = self.read(&self.keys.token)?;
        let raw_user = self.read(&self.keys.user)?;
        let user = decode_user(&raw_user)?;

        let session = Session::new(token, user);
        if session.is_none() {
            debug!("Stored token is blank");
        }
        session
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Session storage read failed");
                None
            }
        }
    }
}

//! Authenticated session, mirrored between memory and a durable cache.

pub mod kv;

pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};

use crate::error::SessionError;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

pub const TOKEN_KEY: &str = "auth_token";
pub const IDENTITY_KEY: &str = "user_data";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Identity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            display_name: None,
        }
    }

    fn is_well_formed(&self) -> bool {
        !self.username.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: Identity,
    pub token: String,
}

/// Owns the current session. The in-memory copy only ever changes while the
/// write lock is held and after the durable store has accepted the change,
/// so readers never see the two disagree.
pub struct SessionStore {
    kv: Box<dyn KeyValueStore>,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Rebuild the session from durable state. Partial or malformed state
    /// means "signed out".
    pub fn open(kv: impl KeyValueStore + 'static) -> Self {
        let restored = restore(&kv);
        Self {
            kv: Box::new(kv),
            current: RwLock::new(restored),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.current().map(|session| session.token)
    }

    pub fn login(&self, identity: Identity, token: &str) -> Result<Session, SessionError> {
        if !identity.is_well_formed() {
            return Err(SessionError::InvalidIdentity);
        }
        let token = token.trim();
        if token.is_empty() {
            return Err(SessionError::InvalidToken);
        }

        let encoded = serde_json::to_string(&identity)
            .map_err(|e| SessionError::Store(format!("failed to encode identity: {e}")))?;

        let mut current = self
            .current
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        self.kv
            .commit(&[(TOKEN_KEY, token), (IDENTITY_KEY, &encoded)], &[])?;

        let session = Session {
            identity,
            token: token.to_string(),
        };
        *current = Some(session.clone());
        tracing::info!(user = %session.identity.username, "session.login");
        Ok(session)
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        let mut current = self
            .current
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        self.kv.commit(&[], &[TOKEN_KEY, IDENTITY_KEY])?;
        if let Some(previous) = current.take() {
            tracing::info!(user = %previous.identity.username, "session.logout");
        }
        Ok(())
    }
}

fn restore(kv: &dyn KeyValueStore) -> Option<Session> {
    let read = |key: &str| match kv.get(key) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(key, error = %err, "session.restore.unreadable");
            None
        }
    };

    let token = read(TOKEN_KEY)?;
    let raw_identity = read(IDENTITY_KEY)?;

    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    let identity: Identity = match serde_json::from_str(&raw_identity) {
        Ok(identity) => identity,
        Err(err) => {
            tracing::warn!(error = %err, "session.restore.malformed_identity");
            return None;
        }
    };
    if !identity.is_well_formed() {
        return None;
    }

    Some(Session {
        identity,
        token: token.to_string(),
    })
}

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::storage::{KeyValueStore, StorageResult};

/// Storage key for the bearer token
pub const TOKEN_KEY: &str = "token";
/// Storage key for the username
pub const USER_KEY: &str = "user";
/// Storage key for the comma-joined role list
pub const ROLES_KEY: &str = "roles";

/// Separator used when persisting roles
const ROLE_SEPARATOR: char = ',';

/// A logged-in user as issued by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Session {
    pub token: String,
    pub username: String,
    pub roles: Vec<String>,
}

impl Session {
    pub fn new(token: impl Into<String>, username: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
            roles,
        }
    }

    /// Roles in their persisted form, e.g. `user,admin`
    pub fn roles_joined(&self) -> String {
        join_roles(&self.roles)
    }
}

pub fn join_roles(roles: &[String]) -> String {
    roles.join(&ROLE_SEPARATOR.to_string())
}

pub fn split_roles(raw: &str) -> Vec<String> {
    raw.split(ROLE_SEPARATOR)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

/// Login state as seen by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum SessionState {
    LoggedOut,
    LoggedIn,
}

impl SessionState {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, SessionState::LoggedIn)
    }
}

/// Owns the persisted session. All reads go straight to the backing store,
/// so a new value is visible immediately after `save` or `clear`.
///
/// Logged-in state is decided by token presence alone. A token stored
/// without a username still counts as logged in and is still sent on
/// requests; `describe` then renders blanks for the missing parts.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Open the store and derive the initial state from what is already persisted
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let store = Self { storage };
        match store.state() {
            SessionState::LoggedIn => info!(user = %store.read(USER_KEY).unwrap_or_default(), "Restored saved session"),
            SessionState::LoggedOut => debug!("No saved session"),
        }
        store
    }

    /// Persist a session, overwriting every field of any previous one
    pub fn save(&self, session: &Session) -> StorageResult<()> {
        self.storage.set(TOKEN_KEY, &session.token)?;
        self.storage.set(USER_KEY, &session.username)?;
        self.storage.set(ROLES_KEY, &session.roles_joined())?;
        info!(user = %session.username, roles = %session.roles_joined(), "Session saved");
        Ok(())
    }

    /// Remove all session keys. Safe to call when already logged out.
    pub fn clear(&self) -> StorageResult<()> {
        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(USER_KEY)?;
        self.storage.remove(ROLES_KEY)?;
        info!("Session cleared");
        Ok(())
    }

    /// Get the bearer token, if any. An empty token counts as absent.
    pub fn current_token(&self) -> Option<String> {
        self.read(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_token().is_some()
    }

    pub fn state(&self) -> SessionState {
        if self.is_logged_in() {
            SessionState::LoggedIn
        } else {
            SessionState::LoggedOut
        }
    }

    /// Stored username, if any
    pub fn username(&self) -> Option<String> {
        self.read(USER_KEY)
    }

    /// Stored roles, empty when none were saved
    pub fn roles(&self) -> Vec<String> {
        self.read(ROLES_KEY).map(|r| split_roles(&r)).unwrap_or_default()
    }

    /// Read back the full session. Missing username or roles come back empty.
    pub fn session(&self) -> Option<Session> {
        let token = self.current_token()?;
        Some(Session {
            token,
            username: self.username().unwrap_or_default(),
            roles: self.roles(),
        })
    }

    /// One-line summary for display, empty when logged out
    pub fn describe(&self) -> String {
        if !self.is_logged_in() {
            return String::new();
        }
        format!(
            "User: {} ({})",
            self.username().unwrap_or_default(),
            self.read(ROLES_KEY).unwrap_or_default()
        )
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = key, error = %e, "Failed to read session storage");
                None
            }
        }
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state())
            .finish()
    }
}

//! Authentication module for managing the user session and login credentials.
//!
//! This module provides:
//! - `SessionStore`: Single source of truth for the cached bearer token and
//!   user identity, backed by a persistent `KeyValueStore`
//! - `Credential`: Username/password pair used for one login exchange
//!
//! Sessions never expire locally. They end only on an explicit logout.

pub mod credentials;
pub mod session;

pub use credentials::Credential;
pub use session::{Session, SessionState, SessionStore};

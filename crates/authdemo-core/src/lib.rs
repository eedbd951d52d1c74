//! Core library for authdemo.
//!
//! Logs a user in against the demo API, keeps the resulting bearer token in a
//! persistent key-value store, and attaches it to later protected requests.
//!
//! - `auth`: `SessionStore`, `Session`, `Credential`
//! - `api`: `ApiClient`, the transport seam and the `ApiError` taxonomy
//! - `storage`: key-value backends (memory, file, OS keychain)
//! - `models`: wire shapes and status notices
//! - `config`: persisted settings with environment overrides

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod storage;

pub use api::{ApiClient, ApiError, ApiErrorKind, ApiResult};
pub use auth::{Credential, Session, SessionState, SessionStore};
pub use config::{Config, StorageMode};
pub use models::{DemoEndpoint, Notice, Severity};

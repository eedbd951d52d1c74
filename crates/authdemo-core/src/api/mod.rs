//! REST API client module for the demo authentication server.
//!
//! This module provides the `ApiClient` for logging in and calling the demo
//! endpoints, the `HttpTransport` seam it sends requests through, and the
//! `ApiError` taxonomy every failure is normalised into.
//!
//! Protected endpoints use bearer token authentication. The token is read
//! from the `SessionStore` on every call and is never refreshed.

pub mod client;
pub mod error;
pub mod transport;

pub use client::ApiClient;
pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

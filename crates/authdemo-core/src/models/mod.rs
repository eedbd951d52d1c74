//! Data models for the demo API.
//!
//! - `LoginResponse`, `DemoInfo`: success bodies returned by the server
//! - `DemoEndpoint`: the demo resources and whether each needs a token
//! - `Notice`, `Severity`: status text for the presentation layer

pub mod demo;
pub mod notice;

pub use demo::{DemoEndpoint, DemoInfo, LoginResponse};
pub use notice::{Notice, Severity};

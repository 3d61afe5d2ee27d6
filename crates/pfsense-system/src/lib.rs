//! System endpoints and data models for the pfSense REST API.
//!
//! Shell command execution, v1 access tokens, API version information and
//! local user management (v1).

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::SystemApi;
pub use models::{ApiVersion, CommandOutput, User, UserDelete, UserRequest};

/// Convenient result alias that reuses the shared pfSense error type.
pub type Result<T> = pfsense_core::Result<T>;

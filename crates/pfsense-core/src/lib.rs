//! # pfsense-core
//!
//! Core types and the request engine for the pfSense REST management API.
//!
//! This crate provides configuration, error handling, the response envelope and
//! the blocking HTTP client that every resource crate builds on.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy and HTTP status classification
//! - [`config`] - Validated client configuration and config-file loading
//! - [`envelope`] - The uniform `{status, code, return, message, data}` response shape
//! - [`normalize`] - String-or-list field normalization for domain models
//! - [`query`] - Query parameter builder
//! - [`client`] - The blocking request engine and JWT acquisition

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod normalize;
pub mod query;

// Re-export commonly used types
pub use client::PfSenseClient;
pub use config::{load_client_config, AuthMode, ClientConfig, ClientConfigBuilder, ConfigFile};
pub use envelope::{ApiResponse, ResponseCode, ResponseData};
pub use error::{Error, HttpFailure, Result};
pub use normalize::{AddressList, DelimitedList, DetailList};
pub use query::QueryParams;
pub use reqwest::Method;

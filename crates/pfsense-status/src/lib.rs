//! Status endpoints and data models for the pfSense REST API.
//!
//! Provides DHCP lease listing (v2) with paging and sorting, plus system,
//! CARP and gateway status (v1).

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::StatusApi;
pub use models::{
    CarpStatus, CarpUpdate, DhcpLease, DhcpLeaseQuery, GatewayStatus, SortOrder, SystemStatus,
};

/// Convenient result alias that reuses the shared pfSense error type.
pub type Result<T> = pfsense_core::Result<T>;

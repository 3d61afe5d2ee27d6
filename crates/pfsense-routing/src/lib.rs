//! Routing endpoints and data models for the pfSense REST API.
//!
//! Gateways, gateway details, static routes and applying routing changes (v1).

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::RoutingApi;
pub use models::{
    DeleteRequest, Gateway, GatewayDetail, GatewayProtocol, GatewayRequest, StaticRoute,
    StaticRouteRequest,
};

/// Convenient result alias that reuses the shared pfSense error type.
pub type Result<T> = pfsense_core::Result<T>;

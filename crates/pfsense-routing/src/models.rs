//! Routing models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Address family of a gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayProtocol {
    /// IPv4
    #[default]
    Inet,
    /// IPv6
    Inet6,
}

/// A configured gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gateway {
    /// Gateway name.
    pub name: String,
    /// Interface the gateway lives on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    /// Address family.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipprotocol: Option<GatewayProtocol>,
    /// Gateway address, or `dynamic`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    /// Monitor address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitor: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descr: Option<String>,
    /// Remaining fields as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload for creating or updating a gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayRequest {
    /// Gateway index; required for updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Gateway name.
    pub name: String,
    /// Interface.
    pub interface: String,
    /// Address family.
    pub ipprotocol: GatewayProtocol,
    /// Gateway address.
    pub gateway: String,
    /// Monitor address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descr: Option<String>,
    /// Weight for load balancing groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u8>,
    /// Create the gateway disabled.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    /// Whether to apply immediately.
    pub apply: bool,
}

impl GatewayRequest {
    /// An IPv4 gateway that is applied immediately.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        interface: impl Into<String>,
        gateway: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            interface: interface.into(),
            ipprotocol: GatewayProtocol::default(),
            gateway: gateway.into(),
            monitor: None,
            descr: None,
            weight: None,
            disabled: false,
            apply: true,
        }
    }
}

/// Runtime details of a gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayDetail {
    /// Gateway name.
    pub name: Option<String>,
    /// Gateway address.
    pub gateway: Option<String>,
    /// Monitor address.
    pub monitor: Option<String>,
    /// Source address.
    pub source: Option<String>,
    /// Round trip time.
    pub delay: Option<String>,
    /// Round trip deviation.
    pub stddev: Option<String>,
    /// Packet loss.
    pub loss: Option<String>,
    /// State.
    pub status: Option<String>,
    /// Detail state.
    pub substatus: Option<String>,
}

/// A static route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticRoute {
    /// Route index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Destination network in CIDR notation.
    pub network: String,
    /// Gateway name.
    pub gateway: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descr: Option<String>,
}

/// Payload for creating or updating a static route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticRouteRequest {
    /// Route index; required for updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Destination network.
    pub network: String,
    /// Gateway name.
    pub gateway: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descr: Option<String>,
    /// Create the route disabled.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    /// Whether to apply immediately.
    pub apply: bool,
}

impl StaticRouteRequest {
    /// A route to `network` via `gateway`, applied immediately.
    #[must_use]
    pub fn new(network: impl Into<String>, gateway: impl Into<String>) -> Self {
        Self {
            id: None,
            network: network.into(),
            gateway: gateway.into(),
            descr: None,
            disabled: false,
            apply: true,
        }
    }
}

/// Payload for deleting a gateway or static route by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteRequest {
    /// Index of the object.
    pub id: u64,
    /// Whether to apply immediately.
    pub apply: bool,
}

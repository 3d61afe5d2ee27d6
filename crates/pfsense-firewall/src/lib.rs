//! Firewall endpoints and data models for the pfSense REST API.
//!
//! Covers firewall aliases (v2, including bulk operations and apply), alias
//! entries, firewall rules, NAT port forwards and virtual IPs (v1).

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::FirewallApi;
pub use models::{
    AliasEntryCreate, AliasEntryDelete, AliasId, AliasType, FirewallAlias, FirewallAliasCreate,
    FirewallAliasUpdate, FirewallApplyStatus, FirewallRule, FirewallRuleDelete,
    FirewallRuleListParams, FirewallRuleRequest, IndexedDelete, IpProtocol, PortForward,
    PortForwardRequest, RuleAction, VirtualIp, VirtualIpMode, VirtualIpRequest,
};

/// Convenient result alias that reuses the shared pfSense error type.
pub type Result<T> = pfsense_core::Result<T>;

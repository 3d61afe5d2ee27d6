//! Firewall alias and rule models.
//!
//! Request models validate themselves on construction, so a value that exists
//! is a value the API will accept structurally.

use pfsense_core::{AddressList, DetailList, QueryParams};
use serde::de::{Deserializer, Error as DeError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use validator::{Validate, ValidationError};

/// Longest alias name pfSense accepts.
pub const MAX_ALIAS_NAME_LEN: usize = 31;

/// Kind of firewall alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AliasType {
    /// Hosts (addresses or FQDNs)
    Host,
    /// Networks in CIDR notation
    Network,
    /// Ports or port ranges
    Port,
    /// A URL returning a list of entries
    Url,
}

impl AliasType {
    /// Wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Network => "network",
            Self::Port => "port",
            Self::Url => "url",
        }
    }
}

impl fmt::Display for AliasType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies an alias either by its numeric id or by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AliasId {
    /// Numeric id assigned by pfSense
    Index(u64),
    /// Alias name
    Name(String),
}

impl AliasId {
    /// Query parameters selecting this alias (`id=` or `name=`).
    #[must_use]
    pub fn to_query(&self) -> QueryParams {
        match self {
            Self::Index(index) => QueryParams::new().with("id", index),
            Self::Name(name) => QueryParams::new().with("name", name),
        }
    }
}

impl From<u64> for AliasId {
    fn from(index: u64) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for AliasId {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for AliasId {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl fmt::Display for AliasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// A firewall alias as returned by read operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirewallAlias {
    /// Numeric id (v2 only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Alias name.
    pub name: String,
    /// Alias kind.
    #[serde(rename = "type")]
    pub alias_type: AliasType,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descr: Option<String>,
    /// Entries.
    #[serde(default)]
    pub address: AddressList,
    /// Per-entry descriptions.
    #[serde(default)]
    pub detail: DetailList,
}

fn validate_alias_name(name: &str) -> Result<(), ValidationError> {
    let well_formed = !name.is_empty()
        && name.len() <= MAX_ALIAS_NAME_LEN
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !well_formed {
        return Err(ValidationError::new("alias_name").with_message(
            format!(
                "alias name must be 1 to {MAX_ALIAS_NAME_LEN} characters of letters, digits or underscores"
            )
            .into(),
        ));
    }
    if name.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("alias_name")
            .with_message("alias name cannot be purely numeric".into()));
    }
    Ok(())
}

fn check_detail_count(address: &AddressList, detail: &DetailList) -> Result<(), ValidationError> {
    if detail.len() > address.len() {
        return Err(ValidationError::new("detail_count").with_message(
            format!(
                "{} details given for {} addresses",
                detail.len(),
                address.len()
            )
            .into(),
        ));
    }
    Ok(())
}

fn validate_alias_details(alias: &FirewallAliasCreate) -> Result<(), ValidationError> {
    check_detail_count(&alias.address, &alias.detail)
}

fn validate_entry_details(entry: &AliasEntryCreate) -> Result<(), ValidationError> {
    check_detail_count(&entry.address, &entry.detail)
}

/// Payload for creating an alias.
///
/// `address` and `detail` accept either a list or a single delimited string
/// (space separated addresses, `||` separated details).
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[validate(schema(function = "validate_alias_details"))]
pub struct FirewallAliasCreate {
    #[validate(custom(function = "validate_alias_name"))]
    name: String,
    #[serde(rename = "type")]
    alias_type: AliasType,
    #[serde(skip_serializing_if = "Option::is_none")]
    descr: Option<String>,
    address: AddressList,
    detail: DetailList,
    #[serde(skip_serializing_if = "Option::is_none")]
    apply: Option<bool>,
}

impl FirewallAliasCreate {
    /// Build and validate an alias payload.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name is malformed or there are more
    /// details than addresses.
    pub fn new(
        name: impl Into<String>,
        alias_type: AliasType,
        address: impl Into<AddressList>,
        detail: impl Into<DetailList>,
    ) -> crate::Result<Self> {
        let alias = Self {
            name: name.into(),
            alias_type,
            descr: None,
            address: address.into(),
            detail: detail.into(),
            apply: None,
        };
        alias.validate()?;
        Ok(alias)
    }

    /// Set the description.
    #[must_use]
    pub fn with_descr(mut self, descr: impl Into<String>) -> Self {
        self.descr = Some(descr.into());
        self
    }

    /// Ask pfSense to apply the change immediately.
    #[must_use]
    pub const fn with_apply(mut self, apply: bool) -> Self {
        self.apply = Some(apply);
        self
    }

    /// Alias name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alias kind.
    #[must_use]
    pub const fn alias_type(&self) -> AliasType {
        self.alias_type
    }

    /// Description, if set.
    #[must_use]
    pub fn descr(&self) -> Option<&str> {
        self.descr.as_deref()
    }

    /// Normalized entries.
    #[must_use]
    pub const fn address(&self) -> &AddressList {
        &self.address
    }

    /// Normalized entry descriptions.
    #[must_use]
    pub const fn detail(&self) -> &DetailList {
        &self.detail
    }
}

/// Payload for updating an alias: the full alias plus its identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirewallAliasUpdate {
    /// Alias to modify.
    pub id: AliasId,
    /// New alias contents.
    #[serde(flatten)]
    pub alias: FirewallAliasCreate,
}

impl FirewallAliasUpdate {
    /// Pair an identifier with new alias contents.
    #[must_use]
    pub fn new(id: impl Into<AliasId>, alias: FirewallAliasCreate) -> Self {
        Self {
            id: id.into(),
            alias,
        }
    }
}

/// Pending-change state of the firewall filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallApplyStatus {
    /// Whether all changes have been applied.
    #[serde(default)]
    pub applied: bool,
    /// Subsystems with changes still pending.
    #[serde(default)]
    pub pending_subsystems: Vec<String>,
}

/// Payload for adding entries to an existing alias.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[validate(schema(function = "validate_entry_details"))]
pub struct AliasEntryCreate {
    #[validate(custom(function = "validate_alias_name"))]
    name: String,
    address: AddressList,
    detail: DetailList,
    apply: bool,
}

impl AliasEntryCreate {
    /// Build and validate an entry payload. Changes are applied by default.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the alias name is malformed or there are
    /// more details than addresses.
    pub fn new(
        name: impl Into<String>,
        address: impl Into<AddressList>,
        detail: impl Into<DetailList>,
    ) -> crate::Result<Self> {
        let entry = Self {
            name: name.into(),
            address: address.into(),
            detail: detail.into(),
            apply: true,
        };
        entry.validate()?;
        Ok(entry)
    }

    /// Whether to apply immediately.
    #[must_use]
    pub const fn with_apply(mut self, apply: bool) -> Self {
        self.apply = apply;
        self
    }

    /// Normalized entries.
    #[must_use]
    pub const fn address(&self) -> &AddressList {
        &self.address
    }
}

/// Payload for removing entries from an existing alias.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AliasEntryDelete {
    /// Alias name.
    pub name: String,
    /// Entries to remove.
    pub address: AddressList,
    /// Whether to apply immediately.
    pub apply: bool,
}

impl AliasEntryDelete {
    /// Remove `address` entries from alias `name`, applying immediately.
    #[must_use]
    pub fn new(name: impl Into<String>, address: impl Into<AddressList>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            apply: true,
        }
    }
}

/// What a rule does with matching traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    /// Allow
    Pass,
    /// Drop silently
    Block,
    /// Drop and signal the sender
    Reject,
}

impl RuleAction {
    /// Wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Block => "block",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address family a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpProtocol {
    /// IPv4
    #[default]
    Inet,
    /// IPv6
    Inet6,
    /// IPv4 and IPv6
    Inet46,
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string or number tracker, got {other}"
        ))),
    }
}

/// A firewall rule as returned by the v1 API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirewallRule {
    /// Rule tracker id.
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub tracker: Option<String>,
    /// Rule action.
    #[serde(rename = "type")]
    pub action: RuleAction,
    /// Interface the rule is bound to.
    pub interface: String,
    /// Address family.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipprotocol: Option<IpProtocol>,
    /// Protocol (`tcp`, `udp`, `any`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descr: Option<String>,
    /// Remaining fields (source, destination, timestamps, ...) as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload for creating or replacing a firewall rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirewallRuleRequest {
    /// Tracker of the rule to replace; required for updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker: Option<String>,
    /// Rule action.
    #[serde(rename = "type")]
    pub action: RuleAction,
    /// Interface.
    pub interface: String,
    /// Address family.
    pub ipprotocol: IpProtocol,
    /// Protocol.
    pub protocol: String,
    /// Source address, alias or `any`.
    pub src: String,
    /// Source port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srcport: Option<String>,
    /// Destination address, alias or `any`.
    pub dst: String,
    /// Destination port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dstport: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descr: Option<String>,
    /// Create the rule disabled.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    /// Log matching packets.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub log: bool,
    /// Place the rule at the top of the interface's list.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub top: bool,
    /// Whether to apply immediately.
    pub apply: bool,
}

impl FirewallRuleRequest {
    /// An IPv4, any-protocol rule that is applied immediately.
    #[must_use]
    pub fn new(
        action: RuleAction,
        interface: impl Into<String>,
        src: impl Into<String>,
        dst: impl Into<String>,
    ) -> Self {
        Self {
            tracker: None,
            action,
            interface: interface.into(),
            ipprotocol: IpProtocol::default(),
            protocol: "any".to_string(),
            src: src.into(),
            srcport: None,
            dst: dst.into(),
            dstport: None,
            descr: None,
            disabled: false,
            log: false,
            top: false,
            apply: true,
        }
    }
}

/// Payload for deleting a firewall rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirewallRuleDelete {
    /// Tracker of the rule.
    pub tracker: String,
    /// Whether to apply immediately.
    pub apply: bool,
}

/// Query parameters for listing firewall rules.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FirewallRuleListParams {
    /// Filter by interface.
    pub interface: Option<String>,
    /// Filter by action.
    pub action: Option<RuleAction>,
    /// Filter by tracker.
    pub tracker: Option<String>,
}

impl FirewallRuleListParams {
    /// Convert to URL query pairs.
    #[must_use]
    pub fn to_query(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params.push_opt("interface", self.interface.as_ref());
        params.push_opt("type", self.action);
        params.push_opt("tracker", self.tracker.as_ref());
        params
    }
}

/// Payload for deleting a NAT port forward or virtual IP by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexedDelete {
    /// Index of the object.
    pub id: u64,
    /// Whether to apply immediately.
    pub apply: bool,
}

/// A NAT port forward as returned by the v1 API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortForward {
    /// Interface the forward listens on.
    pub interface: String,
    /// Protocol (`tcp`, `udp`, `tcp/udp`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Internal address traffic is redirected to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Internal port or range.
    #[serde(
        rename = "local-port",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub local_port: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descr: Option<String>,
    /// Remaining fields (source, destination, associated rule, ...) as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload for creating or replacing a NAT port forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortForwardRequest {
    /// Index of the forward to replace; required for updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Interface.
    pub interface: String,
    /// Protocol.
    pub protocol: String,
    /// Source address, alias or `any`.
    pub src: String,
    /// Source port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srcport: Option<String>,
    /// Destination address, alias or `any`.
    pub dst: String,
    /// External port or range.
    pub dstport: String,
    /// Internal address.
    pub target: String,
    /// Internal port or range.
    #[serde(rename = "local-port")]
    pub local_port: String,
    /// NAT reflection mode (`enable`, `disable`, `purenat`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub natreflection: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descr: Option<String>,
    /// Create the forward disabled.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    /// Place the forward at the top of the list.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub top: bool,
    /// Whether to apply immediately.
    pub apply: bool,
}

impl PortForwardRequest {
    /// Forward `dstport` on `interface` from anywhere to `target:local_port`,
    /// applied immediately.
    #[must_use]
    pub fn new(
        interface: impl Into<String>,
        protocol: impl Into<String>,
        dstport: impl Into<String>,
        target: impl Into<String>,
        local_port: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            interface: interface.into(),
            protocol: protocol.into(),
            src: "any".to_string(),
            srcport: None,
            dst: "any".to_string(),
            dstport: dstport.into(),
            target: target.into(),
            local_port: local_port.into(),
            natreflection: None,
            descr: None,
            disabled: false,
            top: false,
            apply: true,
        }
    }
}

/// Kind of virtual IP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VirtualIpMode {
    /// Additional address on an interface
    IpAlias,
    /// CARP shared address
    Carp,
    /// Proxy ARP address
    ProxyArp,
    /// Address routed to the firewall
    Other,
}

/// A virtual IP as returned by the v1 API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualIp {
    /// Virtual IP kind.
    pub mode: VirtualIpMode,
    /// Interface the address lives on.
    pub interface: String,
    /// Address.
    pub subnet: String,
    /// Prefix length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_bits: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descr: Option<String>,
    /// Remaining fields (vhid, advskew, uniqid, ...) as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload for creating or replacing a virtual IP.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VirtualIpRequest {
    /// Index of the virtual IP to replace; required for updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Virtual IP kind.
    pub mode: VirtualIpMode,
    /// Interface.
    pub interface: String,
    /// Address in CIDR notation.
    pub subnet: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descr: Option<String>,
    /// Mode-specific settings such as CARP `vhid`, `advskew` or `password`.
    #[serde(flatten)]
    pub settings: Map<String, Value>,
    /// Whether to apply immediately.
    pub apply: bool,
}

impl VirtualIpRequest {
    /// A virtual IP with no mode-specific settings, applied immediately.
    #[must_use]
    pub fn new(mode: VirtualIpMode, interface: impl Into<String>, subnet: impl Into<String>) -> Self {
        Self {
            id: None,
            mode,
            interface: interface.into(),
            subnet: subnet.into(),
            descr: None,
            settings: Map::new(),
            apply: true,
        }
    }

    /// Add a mode-specific setting.
    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }
}

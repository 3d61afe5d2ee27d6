//! Status models.

use chrono::{DateTime, NaiveDateTime, Utc};
use pfsense_core::QueryParams;
use serde::de::{Deserializer, Error as DeError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// pfSense's own lease timestamp format.
const LEASE_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

fn lease_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("n/a") {
        return Ok(None);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(raw, LEASE_TIME_FORMAT)
        .map(|naive| Some(naive.and_utc()))
        .map_err(|err| D::Error::custom(format!("invalid lease timestamp `{raw}`: {err}")))
}

/// A DHCP lease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DhcpLease {
    /// Leased address.
    pub ip: String,
    /// Client MAC address.
    pub mac: String,
    /// Client hostname.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Interface the lease was handed out on.
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    /// Lease start.
    #[serde(
        default,
        deserialize_with = "lease_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub start: Option<DateTime<Utc>>,
    /// Lease end.
    #[serde(
        default,
        deserialize_with = "lease_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub end: Option<DateTime<Utc>>,
    /// Lease kind (`active`, `static`, `expired`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_status: Option<String>,
    /// Whether the client currently answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online_status: Option<String>,
    /// Description of a static mapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descr: Option<String>,
    /// Lease state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Sort direction for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending
    #[default]
    #[serde(rename = "SORT_ASC")]
    Ascending,
    /// Descending
    #[serde(rename = "SORT_DESC")]
    Descending,
}

impl SortOrder {
    /// Wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "SORT_ASC",
            Self::Descending => "SORT_DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paging, sorting and filtering for [`crate::StatusApi::dhcp_leases`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DhcpLeaseQuery {
    /// Maximum number of leases.
    pub limit: Option<u32>,
    /// Number of leases to skip.
    pub offset: Option<u32>,
    /// Fields to sort by, in priority order.
    pub sort_by: Vec<String>,
    /// Sort direction.
    pub sort_order: Option<SortOrder>,
    /// Equality filters on lease fields.
    pub filters: Vec<(String, String)>,
}

impl DhcpLeaseQuery {
    /// Set the page size.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the page offset.
    #[must_use]
    pub const fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Add a sort field.
    #[must_use]
    pub fn sort_by(mut self, field: impl Into<String>) -> Self {
        self.sort_by.push(field.into());
        self
    }

    /// Set the sort direction.
    #[must_use]
    pub const fn sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = Some(order);
        self
    }

    /// Only return leases whose `field` equals `value`.
    #[must_use]
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    /// Convert to URL query pairs.
    #[must_use]
    pub fn to_query(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params.push_opt("limit", self.limit);
        params.push_opt("offset", self.offset);
        for field in &self.sort_by {
            params.push("sort_by", field);
        }
        params.push_opt("sort_order", self.sort_order);
        for (field, value) in &self.filters {
            params.push(field.as_str(), value);
        }
        params
    }
}

/// Hardware and resource summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemStatus {
    /// Platform name.
    pub system_platform: Option<String>,
    /// Serial number.
    pub system_serial: Option<String>,
    /// Netgate device id.
    pub system_netgate_id: Option<String>,
    /// BIOS vendor.
    pub bios_vendor: Option<String>,
    /// BIOS version.
    pub bios_version: Option<String>,
    /// BIOS release date.
    pub bios_date: Option<String>,
    /// CPU model string.
    pub cpu_model: Option<String>,
    /// Kernel page-table isolation.
    pub kernel_pti: Option<bool>,
    /// MDS mitigation state.
    pub mds_mitigation: Option<String>,
    /// Temperature in Celsius.
    pub temp_c: Option<f64>,
    /// Temperature in Fahrenheit.
    pub temp_f: Option<f64>,
    /// 1, 5 and 15 minute load averages.
    pub load_avg: Vec<f64>,
    /// Number of CPUs.
    pub cpu_count: Option<u32>,
    /// mbuf usage ratio.
    pub mbuf_usage: Option<f64>,
    /// Memory usage ratio.
    pub mem_usage: Option<f64>,
    /// Swap usage ratio.
    pub swap_usage: Option<f64>,
    /// Disk usage ratio.
    pub disk_usage: Option<f64>,
}

/// CARP (high availability) state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarpStatus {
    /// CARP enabled.
    pub enable: bool,
    /// Maintenance mode active.
    pub maintenance_mode: bool,
    /// Virtual IPs as returned.
    pub vips: Vec<Value>,
}

/// Payload for changing CARP state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CarpUpdate {
    /// Enable or disable CARP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    /// Enter or leave maintenance mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_mode: Option<bool>,
}

/// Live gateway monitoring state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayStatus {
    /// Gateway name.
    pub name: Option<String>,
    /// Source address used for monitoring.
    pub srcip: Option<String>,
    /// Monitored address.
    pub monitorip: Option<String>,
    /// Round trip time.
    pub delay: Option<String>,
    /// Round trip deviation.
    pub stddev: Option<String>,
    /// Packet loss.
    pub loss: Option<String>,
    /// Overall state (`online`, `down`, ...).
    pub status: Option<String>,
    /// Detail state.
    pub substatus: Option<String>,
}

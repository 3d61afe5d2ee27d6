//! Status endpoints.

use crate::models::{
    CarpStatus, CarpUpdate, DhcpLease, DhcpLeaseQuery, GatewayStatus, SystemStatus,
};
use crate::Result;
use pfsense_core::{Method, PfSenseClient, QueryParams};
use tracing::debug;

const DHCP_LEASES_PATH: &str = "/api/v2/status/dhcp_server/leases";
const SYSTEM_STATUS_PATH: &str = "/api/v1/status/system";
const CARP_STATUS_PATH: &str = "/api/v1/status/carp";
const GATEWAY_STATUS_PATH: &str = "/api/v1/status/gateway";

/// Status operations over a shared [`PfSenseClient`].
#[derive(Debug, Clone, Copy)]
pub struct StatusApi<'a> {
    client: &'a PfSenseClient,
}

impl<'a> StatusApi<'a> {
    /// Wrap a client.
    #[must_use]
    pub const fn new(client: &'a PfSenseClient) -> Self {
        Self { client }
    }

    /// List DHCP leases. An empty or `null` payload yields no leases.
    pub fn dhcp_leases(&self, query: &DhcpLeaseQuery) -> Result<Vec<DhcpLease>> {
        debug!(limit = ?query.limit, offset = ?query.offset, "listing DHCP leases");
        self.client
            .request_list(Method::GET, DHCP_LEASES_PATH, None::<&()>, &query.to_query())
    }

    /// Hardware and resource summary.
    pub fn system(&self) -> Result<SystemStatus> {
        self.client.request_json(
            Method::GET,
            SYSTEM_STATUS_PATH,
            None::<&()>,
            &QueryParams::new(),
        )
    }

    /// CARP state.
    pub fn carp(&self) -> Result<CarpStatus> {
        self.client
            .request_json(Method::GET, CARP_STATUS_PATH, None::<&()>, &QueryParams::new())
    }

    /// Change CARP state.
    pub fn update_carp(&self, update: &CarpUpdate) -> Result<CarpStatus> {
        self.client
            .request_json(Method::PUT, CARP_STATUS_PATH, Some(update), &QueryParams::new())
    }

    /// Gateway monitoring state.
    pub fn gateways(&self) -> Result<Vec<GatewayStatus>> {
        self.client.request_list(
            Method::GET,
            GATEWAY_STATUS_PATH,
            None::<&()>,
            &QueryParams::new(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SortOrder;
    use pfsense_core::{ClientConfig, Error};
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn envelope(data: Value) -> Value {
        json!({
            "status": "ok",
            "code": 200,
            "return": 0,
            "message": "Success",
            "data": data
        })
    }

    fn test_client(uri: &str) -> PfSenseClient {
        PfSenseClient::new(ClientConfig::jwt(uri, "test_jwt_token").unwrap()).unwrap()
    }

    async fn blocking<F, T>(f: F) -> T
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        tokio::task::spawn_blocking(f).await.unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn dhcp_leases_with_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DHCP_LEASES_PATH))
            .and(query_param("limit", "10"))
            .and(query_param("offset", "5"))
            .and(query_param("sort_order", "SORT_DESC"))
            .and(query_param("sort_by", "hostname"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([{
                "ip": "192.168.1.10",
                "mac": "00:1A:2B:3C:4D:5E",
                "hostname": "Device1",
                "if": "LAN",
                "start": "2025-01-01T12:00:00Z",
                "end": "2025-01-02T12:00:00Z",
                "active_status": "static",
                "online_status": "active/online",
                "descr": "Friendly name for Device1"
            }]))))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        let leases = blocking(move || {
            let query = DhcpLeaseQuery::default()
                .limit(10)
                .offset(5)
                .sort_by("hostname")
                .sort_by("ip")
                .sort_order(SortOrder::Descending);
            StatusApi::new(&test_client(&uri)).dhcp_leases(&query)
        })
        .await
        .unwrap();

        assert_eq!(leases.len(), 1);
        assert_eq!(leases[0].ip, "192.168.1.10");
        assert_eq!(leases[0].active_status.as_deref(), Some("static"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn dhcp_leases_null_or_empty_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DHCP_LEASES_PATH))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(Value::Null)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(DHCP_LEASES_PATH))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
            .mount(&server)
            .await;

        let uri = server.uri();
        let (from_null, from_empty) = blocking(move || {
            let client = test_client(&uri);
            let api = StatusApi::new(&client);
            (
                api.dhcp_leases(&DhcpLeaseQuery::default().limit(1)).unwrap(),
                api.dhcp_leases(&DhcpLeaseQuery::default().limit(2)).unwrap(),
            )
        })
        .await;

        assert!(from_null.is_empty());
        assert!(from_empty.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn malformed_lease_is_validation_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DHCP_LEASES_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(envelope(json!([{"hostname": "x"}]))),
            )
            .mount(&server)
            .await;

        let uri = server.uri();
        let err = blocking(move || {
            StatusApi::new(&test_client(&uri)).dhcp_leases(&DhcpLeaseQuery::default())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, Error::ValidationError { .. }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn system_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SYSTEM_STATUS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "system_platform": "Netgate pfSense Plus",
                "cpu_model": "Intel(R) Xeon(R) D-2123IT CPU @ 2.20GHz",
                "kernel_pti": false,
                "temp_c": 41.5,
                "load_avg": [0.12, 0.2, 0.31],
                "cpu_count": 8,
                "mem_usage": 0.21
            }))))
            .mount(&server)
            .await;

        let uri = server.uri();
        let status = blocking(move || StatusApi::new(&test_client(&uri)).system())
            .await
            .unwrap();

        assert_eq!(status.system_platform.as_deref(), Some("Netgate pfSense Plus"));
        assert_eq!(status.cpu_count, Some(8));
        assert_eq!(status.load_avg.len(), 3);
        assert_eq!(status.disk_usage, None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn carp_read_and_update() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(CARP_STATUS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "enable": true, "maintenance_mode": false, "vips": []
            }))))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(CARP_STATUS_PATH))
            .and(body_json(json!({"enable": true, "maintenance_mode": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "enable": true, "maintenance_mode": true
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        let (before, after) = blocking(move || {
            let client = test_client(&uri);
            let api = StatusApi::new(&client);
            let before = api.carp().unwrap();
            let after = api
                .update_carp(&CarpUpdate {
                    enable: Some(true),
                    maintenance_mode: Some(true),
                })
                .unwrap();
            (before, after)
        })
        .await;

        assert!(before.enable && !before.maintenance_mode);
        assert!(after.maintenance_mode);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn gateway_status_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(GATEWAY_STATUS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
                {"name": "WAN_DHCP", "monitorip": "1.1.1.1", "delay": "3.1ms", "loss": "0.0%", "status": "online"}
            ]))))
            .mount(&server)
            .await;

        let uri = server.uri();
        let gateways = blocking(move || StatusApi::new(&test_client(&uri)).gateways())
            .await
            .unwrap();

        assert_eq!(gateways.len(), 1);
        assert_eq!(gateways[0].status.as_deref(), Some("online"));
    }
}

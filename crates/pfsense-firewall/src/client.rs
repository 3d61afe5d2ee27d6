//! Firewall endpoints.

use crate::models::{
    AliasEntryCreate, AliasEntryDelete, AliasId, FirewallAlias, FirewallAliasCreate,
    FirewallAliasUpdate, FirewallApplyStatus, FirewallRule, FirewallRuleDelete,
    FirewallRuleListParams, FirewallRuleRequest, IndexedDelete, PortForward, PortForwardRequest,
    VirtualIp, VirtualIpRequest,
};
use crate::Result;
use pfsense_core::{ApiResponse, Method, PfSenseClient, QueryParams};
use serde_json::json;
use tracing::debug;

const ALIAS_PATH: &str = "/api/v2/firewall/alias";
const ALIASES_PATH: &str = "/api/v2/firewall/aliases";
const APPLY_PATH: &str = "/api/v2/firewall/apply";
const ALIAS_ENTRY_PATH: &str = "/api/v1/firewall/alias/entry";
const RULE_PATH: &str = "/api/v1/firewall/rule";
const PORT_FORWARD_PATH: &str = "/api/v1/firewall/nat/port_forward";
const VIRTUAL_IP_PATH: &str = "/api/v1/firewall/virtual_ip";

/// Firewall operations over a shared [`PfSenseClient`].
#[derive(Debug, Clone, Copy)]
pub struct FirewallApi<'a> {
    client: &'a PfSenseClient,
}

impl<'a> FirewallApi<'a> {
    /// Wrap a client.
    #[must_use]
    pub const fn new(client: &'a PfSenseClient) -> Self {
        Self { client }
    }

    /// List all aliases.
    pub fn list_aliases(&self) -> Result<Vec<FirewallAlias>> {
        self.client
            .request_list(Method::GET, ALIASES_PATH, None::<&()>, &QueryParams::new())
    }

    /// Fetch one alias by id or name.
    pub fn get_alias(&self, id: impl Into<AliasId>) -> Result<FirewallAlias> {
        let id = id.into();
        self.client
            .request_json(Method::GET, ALIAS_PATH, None::<&()>, &id.to_query())
    }

    /// Create an alias.
    pub fn create_alias(&self, alias: &FirewallAliasCreate) -> Result<FirewallAlias> {
        debug!(name = alias.name(), "creating firewall alias");
        self.client
            .request_json(Method::POST, ALIAS_PATH, Some(alias), &QueryParams::new())
    }

    /// Modify an existing alias.
    pub fn update_alias(&self, update: &FirewallAliasUpdate) -> Result<FirewallAlias> {
        self.client
            .request_json(Method::PATCH, ALIAS_PATH, Some(update), &QueryParams::new())
    }

    /// Delete one alias by id or name.
    pub fn delete_alias(&self, id: impl Into<AliasId>, apply: bool) -> Result<ApiResponse> {
        let params = id.into().to_query().with("apply", apply);
        self.client.delete(ALIAS_PATH, &params)
    }

    /// Replace the whole alias set.
    pub fn replace_aliases(&self, aliases: &[FirewallAliasUpdate]) -> Result<Vec<FirewallAlias>> {
        self.client
            .request_list(Method::PUT, ALIASES_PATH, Some(aliases), &QueryParams::new())
    }

    /// Delete several aliases by name.
    pub fn delete_aliases(&self, names: &[&str]) -> Result<ApiResponse> {
        self.client.request(
            Method::DELETE,
            ALIASES_PATH,
            Some(&json!({ "names": names })),
            &QueryParams::new(),
        )
    }

    /// Whether changes are waiting to be applied.
    pub fn apply_status(&self) -> Result<FirewallApplyStatus> {
        self.client
            .request_json(Method::GET, APPLY_PATH, None::<&()>, &QueryParams::new())
    }

    /// Apply pending firewall changes.
    pub fn apply(&self) -> Result<FirewallApplyStatus> {
        self.client
            .request_json(Method::POST, APPLY_PATH, None::<&()>, &QueryParams::new())
    }

    /// Add entries to an existing alias.
    pub fn add_alias_entries(&self, entry: &AliasEntryCreate) -> Result<ApiResponse> {
        self.client.post(ALIAS_ENTRY_PATH, entry)
    }

    /// Remove entries from an existing alias.
    pub fn delete_alias_entries(&self, entry: &AliasEntryDelete) -> Result<ApiResponse> {
        self.client
            .request(Method::DELETE, ALIAS_ENTRY_PATH, Some(entry), &QueryParams::new())
    }

    /// List firewall rules, optionally filtered.
    pub fn list_rules(&self, params: &FirewallRuleListParams) -> Result<Vec<FirewallRule>> {
        self.client
            .request_list(Method::GET, RULE_PATH, None::<&()>, &params.to_query())
    }

    /// Create a firewall rule.
    pub fn create_rule(&self, rule: &FirewallRuleRequest) -> Result<FirewallRule> {
        self.client
            .request_json(Method::POST, RULE_PATH, Some(rule), &QueryParams::new())
    }

    /// Replace the rule identified by `rule.tracker`.
    pub fn update_rule(&self, rule: &FirewallRuleRequest) -> Result<FirewallRule> {
        self.client
            .request_json(Method::PUT, RULE_PATH, Some(rule), &QueryParams::new())
    }

    /// Delete a firewall rule.
    pub fn delete_rule(&self, rule: &FirewallRuleDelete) -> Result<ApiResponse> {
        self.client
            .request(Method::DELETE, RULE_PATH, Some(rule), &QueryParams::new())
    }

    /// List NAT port forwards matching the given field filters.
    pub fn list_port_forwards(&self, filters: &QueryParams) -> Result<Vec<PortForward>> {
        self.client
            .request_list(Method::GET, PORT_FORWARD_PATH, None::<&()>, filters)
    }

    /// Create a NAT port forward.
    pub fn create_port_forward(&self, forward: &PortForwardRequest) -> Result<PortForward> {
        debug!(interface = %forward.interface, dstport = %forward.dstport, "creating port forward");
        self.client.request_json(
            Method::POST,
            PORT_FORWARD_PATH,
            Some(forward),
            &QueryParams::new(),
        )
    }

    /// Replace the port forward identified by `forward.id`.
    pub fn update_port_forward(&self, forward: &PortForwardRequest) -> Result<PortForward> {
        self.client.request_json(
            Method::PUT,
            PORT_FORWARD_PATH,
            Some(forward),
            &QueryParams::new(),
        )
    }

    /// Delete a port forward.
    pub fn delete_port_forward(&self, request: &IndexedDelete) -> Result<ApiResponse> {
        self.client.request(
            Method::DELETE,
            PORT_FORWARD_PATH,
            Some(request),
            &QueryParams::new(),
        )
    }

    /// List virtual IPs matching the given field filters.
    pub fn list_virtual_ips(&self, filters: &QueryParams) -> Result<Vec<VirtualIp>> {
        self.client
            .request_list(Method::GET, VIRTUAL_IP_PATH, None::<&()>, filters)
    }

    /// Create a virtual IP.
    pub fn create_virtual_ip(&self, vip: &VirtualIpRequest) -> Result<VirtualIp> {
        debug!(subnet = %vip.subnet, "creating virtual IP");
        self.client
            .request_json(Method::POST, VIRTUAL_IP_PATH, Some(vip), &QueryParams::new())
    }

    /// Replace the virtual IP identified by `vip.id`.
    pub fn update_virtual_ip(&self, vip: &VirtualIpRequest) -> Result<VirtualIp> {
        self.client
            .request_json(Method::PUT, VIRTUAL_IP_PATH, Some(vip), &QueryParams::new())
    }

    /// Delete a virtual IP.
    pub fn delete_virtual_ip(&self, request: &IndexedDelete) -> Result<ApiResponse> {
        self.client.request(
            Method::DELETE,
            VIRTUAL_IP_PATH,
            Some(request),
            &QueryParams::new(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AliasType, RuleAction, VirtualIpMode};
    use pfsense_core::{ClientConfig, Error};
    use serde_json::Value;
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
        PfSenseClient::new(ClientConfig::api_token(uri, "cid", "ctok").unwrap()).unwrap()
    }

    async fn blocking<F, T>(f: F) -> T
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        tokio::task::spawn_blocking(f).await.unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn list_aliases_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ALIASES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
                {"id": 0, "name": "dns", "type": "host", "address": "1.1.1.1 8.8.8.8"},
                {"id": 1, "name": "web", "type": "port", "address": ["80", "443"]}
            ]))))
            .mount(&server)
            .await;

        let uri = server.uri();
        let aliases = blocking(move || FirewallApi::new(&test_client(&uri)).list_aliases())
            .await
            .unwrap();

        assert_eq!(aliases.len(), 2);
        assert_eq!(aliases[0].address.as_slice(), ["1.1.1.1", "8.8.8.8"]);
        assert_eq!(aliases[1].alias_type, AliasType::Port);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn get_alias_by_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ALIAS_PATH))
            .and(query_param("name", "dns"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!(
                {"id": 0, "name": "dns", "type": "host", "address": ["1.1.1.1"]}
            ))))
            .mount(&server)
            .await;

        let uri = server.uri();
        let alias = blocking(move || FirewallApi::new(&test_client(&uri)).get_alias("dns"))
            .await
            .unwrap();
        assert_eq!(alias.id, Some(0));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn create_alias_sends_normalized_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ALIAS_PATH))
            .and(body_json(json!({
                "name": "dns",
                "type": "host",
                "address": ["1.1.1.1", "2.2.2.2"],
                "detail": ["a", "b"],
                "apply": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "id": 5, "name": "dns", "type": "host",
                "address": ["1.1.1.1", "2.2.2.2"], "detail": ["a", "b"]
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        let created = blocking(move || {
            let alias = FirewallAliasCreate::new("dns", AliasType::Host, "1.1.1.1 2.2.2.2", "a||b")
                .unwrap()
                .with_apply(true);
            FirewallApi::new(&test_client(&uri)).create_alias(&alias)
        })
        .await
        .unwrap();

        assert_eq!(created.id, Some(5));
        assert_eq!(created.detail.as_slice(), ["a", "b"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn create_alias_rejected_by_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ALIAS_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "status": "bad request", "code": 400, "return": 4030,
                "message": "Alias name already exists", "data": []
            })))
            .mount(&server)
            .await;

        let uri = server.uri();
        let err = blocking(move || {
            let alias =
                FirewallAliasCreate::new("dns", AliasType::Host, "1.1.1.1", Vec::<String>::new())
                    .unwrap();
            FirewallApi::new(&test_client(&uri)).create_alias(&alias)
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::ValidationError { .. }));
        assert!(err
            .response()
            .is_some_and(|r| r.body.contains("Alias name already exists")));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_alias_uses_query() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(ALIAS_PATH))
            .and(query_param("id", "7"))
            .and(query_param("apply", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({}))))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        blocking(move || FirewallApi::new(&test_client(&uri)).delete_alias(7_u64, true))
            .await
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn bulk_delete_sends_names() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(ALIASES_PATH))
            .and(body_json(json!({"names": ["a", "b"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        blocking(move || FirewallApi::new(&test_client(&uri)).delete_aliases(&["a", "b"]))
            .await
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn apply_status_and_apply() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(APPLY_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "applied": false, "pending_subsystems": ["aliases"]
            }))))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(APPLY_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(envelope(json!({"applied": true}))),
            )
            .mount(&server)
            .await;

        let uri = server.uri();
        let (pending, applied) = blocking(move || {
            let client = test_client(&uri);
            let api = FirewallApi::new(&client);
            (api.apply_status().unwrap(), api.apply().unwrap())
        })
        .await;

        assert!(!pending.applied);
        assert_eq!(pending.pending_subsystems, vec!["aliases".to_string()]);
        assert!(applied.applied);
        assert!(applied.pending_subsystems.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn alias_entries_use_v1_paths() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ALIAS_ENTRY_PATH))
            .and(body_json(json!({
                "name": "dns", "address": ["9.9.9.9"], "detail": ["quad9"], "apply": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(ALIAS_ENTRY_PATH))
            .and(body_json(json!({"name": "dns", "address": ["9.9.9.9"], "apply": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        blocking(move || {
            let client = test_client(&uri);
            let api = FirewallApi::new(&client);
            let entry = AliasEntryCreate::new("dns", "9.9.9.9", "quad9").unwrap();
            api.add_alias_entries(&entry).unwrap();
            api.delete_alias_entries(&AliasEntryDelete::new("dns", "9.9.9.9"))
                .unwrap();
        })
        .await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn list_rules_with_interface_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RULE_PATH))
            .and(query_param("interface", "wan"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
                {"tracker": 1_595_612_345_u64, "type": "block", "interface": "wan"}
            ]))))
            .mount(&server)
            .await;

        let uri = server.uri();
        let rules = blocking(move || {
            let params = FirewallRuleListParams {
                interface: Some("wan".to_string()),
                ..FirewallRuleListParams::default()
            };
            FirewallApi::new(&test_client(&uri)).list_rules(&params)
        })
        .await
        .unwrap();

        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].action, RuleAction::Block);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_rule_sends_tracker_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(RULE_PATH))
            .and(body_json(json!({"tracker": "42", "apply": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        blocking(move || {
            FirewallApi::new(&test_client(&uri)).delete_rule(&FirewallRuleDelete {
                tracker: "42".to_string(),
                apply: false,
            })
        })
        .await
        .unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn port_forward_lifecycle() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PORT_FORWARD_PATH))
            .and(query_param("interface", "wan"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
                {"interface": "wan", "protocol": "tcp", "target": "192.168.1.20", "local-port": "443"}
            ]))))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(PORT_FORWARD_PATH))
            .and(body_json(json!({
                "interface": "wan",
                "protocol": "tcp",
                "src": "any",
                "dst": "any",
                "dstport": "8443",
                "target": "192.168.1.20",
                "local-port": "443",
                "apply": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "interface": "wan", "protocol": "tcp", "target": "192.168.1.20", "local-port": "443"
            }))))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(PORT_FORWARD_PATH))
            .and(body_json(json!({"id": 0, "apply": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        let (listed, created) = blocking(move || {
            let client = test_client(&uri);
            let api = FirewallApi::new(&client);
            let listed = api
                .list_port_forwards(&QueryParams::new().with("interface", "wan"))
                .unwrap();
            let created = api
                .create_port_forward(&PortForwardRequest::new(
                    "wan",
                    "tcp",
                    "8443",
                    "192.168.1.20",
                    "443",
                ))
                .unwrap();
            api.delete_port_forward(&IndexedDelete { id: 0, apply: true })
                .unwrap();
            (listed, created)
        })
        .await;

        assert_eq!(listed.len(), 1);
        assert_eq!(created.target.as_deref(), Some("192.168.1.20"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn virtual_ip_update_and_delete() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(VIRTUAL_IP_PATH))
            .and(body_json(json!({
                "id": 1,
                "mode": "ipalias",
                "interface": "wan",
                "subnet": "203.0.113.10/32",
                "descr": "mail",
                "apply": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "mode": "ipalias", "interface": "wan", "subnet": "203.0.113.10", "subnet_bits": "32", "descr": "mail"
            }))))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(VIRTUAL_IP_PATH))
            .and(body_json(json!({"id": 1, "apply": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        let updated = blocking(move || {
            let client = test_client(&uri);
            let api = FirewallApi::new(&client);
            let mut vip = VirtualIpRequest::new(VirtualIpMode::IpAlias, "wan", "203.0.113.10/32");
            vip.id = Some(1);
            vip.descr = Some("mail".to_string());
            let updated = api.update_virtual_ip(&vip).unwrap();
            api.delete_virtual_ip(&IndexedDelete { id: 1, apply: false })
                .unwrap();
            updated
        })
        .await;

        assert_eq!(updated.mode, VirtualIpMode::IpAlias);
        assert_eq!(updated.subnet_bits.as_deref(), Some("32"));
    }
}

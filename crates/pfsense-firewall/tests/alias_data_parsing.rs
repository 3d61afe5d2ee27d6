//! Integration tests for parsing alias responses.
//!
//! These tests validate that recorded alias listings decode through the
//! envelope into normalized alias models.

use pfsense_core::ApiResponse;
use pfsense_firewall::{AliasType, FirewallAlias};
use std::fs;
use std::path::PathBuf;

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_alias_list_fixture() -> String {
    let fixture_path = fixtures_dir().join("alias_list_response.json");
    fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read alias list fixture at {}: {}",
            fixture_path.display(),
            e
        )
    })
}

#[test]
fn test_deserialize_alias_list() {
    let json_data = load_alias_list_fixture();

    let response: ApiResponse = serde_json::from_str(&json_data)
        .unwrap_or_else(|e| panic!("Failed to deserialize alias envelope: {e}"));
    let aliases: Vec<FirewallAlias> = response.into_models().unwrap();

    assert_eq!(aliases.len(), 2, "Expected 2 aliases in test data");

    let dns = &aliases[0];
    assert_eq!(dns.name, "dns_servers");
    assert_eq!(dns.alias_type, AliasType::Host);
    assert_eq!(dns.descr.as_deref(), Some("Public resolvers"));
    assert_eq!(dns.address.as_slice(), ["1.1.1.1", "8.8.8.8"]);
    assert_eq!(dns.detail.as_slice(), ["cloudflare", "google"]);
}

#[test]
fn test_delimited_and_list_forms_agree() {
    let json_data = load_alias_list_fixture();
    let response: ApiResponse = serde_json::from_str(&json_data).unwrap();
    let aliases: Vec<FirewallAlias> = response.into_models().unwrap();

    let ports = &aliases[1];
    assert_eq!(ports.alias_type, AliasType::Port);
    assert_eq!(ports.address.as_slice(), ["80", "443", "8080"]);
    assert_eq!(ports.detail.as_slice(), ["http", "https", "alt"]);

    let reencoded = serde_json::to_value(ports).unwrap();
    let reparsed: FirewallAlias = serde_json::from_value(reencoded).unwrap();
    assert_eq!(&reparsed, ports);
}

//! Routing endpoints.

use crate::models::{
    DeleteRequest, Gateway, GatewayDetail, GatewayRequest, StaticRoute, StaticRouteRequest,
};
use crate::Result;
use pfsense_core::{ApiResponse, Method, PfSenseClient, QueryParams};
use tracing::debug;

const GATEWAY_PATH: &str = "/api/v1/routing/gateway";
const GATEWAY_DETAIL_PATH: &str = "/api/v1/routing/gateway/detail";
const STATIC_ROUTE_PATH: &str = "/api/v1/routing/static_route";
const APPLY_PATH: &str = "/api/v1/routing/apply";

/// Routing operations over a shared [`PfSenseClient`].
#[derive(Debug, Clone, Copy)]
pub struct RoutingApi<'a> {
    client: &'a PfSenseClient,
}

impl<'a> RoutingApi<'a> {
    /// Wrap a client.
    #[must_use]
    pub const fn new(client: &'a PfSenseClient) -> Self {
        Self { client }
    }

    /// List gateways matching the given field filters.
    pub fn list_gateways(&self, filters: &QueryParams) -> Result<Vec<Gateway>> {
        self.client
            .request_list(Method::GET, GATEWAY_PATH, None::<&()>, filters)
    }

    /// Create a gateway.
    pub fn create_gateway(&self, gateway: &GatewayRequest) -> Result<Gateway> {
        debug!(name = %gateway.name, "creating gateway");
        self.client
            .request_json(Method::POST, GATEWAY_PATH, Some(gateway), &QueryParams::new())
    }

    /// Update the gateway identified by `gateway.id`.
    pub fn update_gateway(&self, gateway: &GatewayRequest) -> Result<Gateway> {
        self.client
            .request_json(Method::PUT, GATEWAY_PATH, Some(gateway), &QueryParams::new())
    }

    /// Delete a gateway.
    pub fn delete_gateway(&self, request: &DeleteRequest) -> Result<ApiResponse> {
        self.client
            .request(Method::DELETE, GATEWAY_PATH, Some(request), &QueryParams::new())
    }

    /// Runtime details of gateways matching the given field filters.
    pub fn gateway_details(&self, filters: &QueryParams) -> Result<Vec<GatewayDetail>> {
        self.client
            .request_list(Method::GET, GATEWAY_DETAIL_PATH, None::<&()>, filters)
    }

    /// List static routes matching the given field filters.
    pub fn list_static_routes(&self, filters: &QueryParams) -> Result<Vec<StaticRoute>> {
        self.client
            .request_list(Method::GET, STATIC_ROUTE_PATH, None::<&()>, filters)
    }

    /// Create a static route.
    pub fn create_static_route(&self, route: &StaticRouteRequest) -> Result<StaticRoute> {
        debug!(network = %route.network, "creating static route");
        self.client.request_json(
            Method::POST,
            STATIC_ROUTE_PATH,
            Some(route),
            &QueryParams::new(),
        )
    }

    /// Update the static route identified by `route.id`.
    pub fn update_static_route(&self, route: &StaticRouteRequest) -> Result<StaticRoute> {
        self.client.request_json(
            Method::PUT,
            STATIC_ROUTE_PATH,
            Some(route),
            &QueryParams::new(),
        )
    }

    /// Delete a static route.
    pub fn delete_static_route(&self, request: &DeleteRequest) -> Result<ApiResponse> {
        self.client.request(
            Method::DELETE,
            STATIC_ROUTE_PATH,
            Some(request),
            &QueryParams::new(),
        )
    }

    /// Apply pending routing changes.
    pub fn apply(&self) -> Result<ApiResponse> {
        self.client.request(
            Method::POST,
            APPLY_PATH,
            None::<&()>,
            &QueryParams::new(),
        )
    }
}

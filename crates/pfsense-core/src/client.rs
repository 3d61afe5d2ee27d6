//! Blocking request engine for the pfSense REST API.
//!
//! [`PfSenseClient`] owns the validated configuration and the HTTP clients,
//! turns `(method, path, payload, params)` into a request, and classifies the
//! reply into an [`ApiResponse`] or one of the typed [`Error`] variants.

use crate::config::{AuthMode, ClientConfig};
use crate::envelope::ApiResponse;
use crate::error::{map_status_to_error, HttpFailure};
use crate::query::QueryParams;
use crate::{Error, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::redirect::Policy;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const USER_AGENT: &str = concat!("pfsense-core/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REDIRECTS: usize = 10;

/// Path of the v2 JWT login endpoint.
pub const JWT_AUTH_PATH: &str = "/api/v2/auth/jwt";

/// Blocking pfSense API client.
///
/// Cloning is cheap; clones share the HTTP connection pools and the configuration,
/// including its JWT.
#[derive(Clone)]
pub struct PfSenseClient {
    http: Client,
    redirecting_http: Client,
    base_url: String,
    config: Arc<ClientConfig>,
}

impl fmt::Debug for PfSenseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PfSenseClient")
            .field("base_url", &self.base_url)
            .field("mode", &self.config.mode())
            .finish_non_exhaustive()
    }
}

impl PfSenseClient {
    /// Create a client from a validated configuration.
    ///
    /// No network I/O happens here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the base URL cannot be derived or the
    /// HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = config.base_url()?;

        if !config.verify_ssl() {
            warn!(
                host = %config.hostname(),
                "TLS certificate verification is disabled"
            );
        }

        let http = build_http(&config, Policy::none())?;
        let redirecting_http = build_http(&config, Policy::limited(MAX_REDIRECTS))?;

        Ok(Self {
            http,
            redirecting_http,
            base_url,
            config: Arc::new(config),
        })
    }

    /// Base URL every relative path is joined onto.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The configuration this client was built from.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve a path: `/`-prefixed paths are joined onto the base URL, anything
    /// else must already be an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the result is not a valid URL.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        if path.starts_with('/') {
            Ok(Url::parse(&format!("{}{path}", self.base_url))?)
        } else {
            Url::parse(path).map_err(|err| {
                Error::InvalidRequest(format!(
                    "`{path}` is neither a relative path nor an absolute URL: {err}"
                ))
            })
        }
    }

    /// Value of the `Authorization` header sent with API calls, if any.
    ///
    /// `jwt` mode yields `Bearer <jwt>`, `api_token` mode yields
    /// `<client_id> <client_token>`. `local` mode yields a bearer header only
    /// after a JWT was acquired; until then requests carry basic auth.
    #[must_use]
    pub fn authorization_header(&self) -> Option<String> {
        match self.config.mode() {
            AuthMode::ApiToken => match (self.config.client_id(), self.config.client_token()) {
                (Some(id), Some(token)) => Some(format!("{id} {}", token.expose_secret())),
                _ => None,
            },
            AuthMode::Jwt | AuthMode::Local => {
                self.current_jwt().map(|token| format!("Bearer {token}"))
            }
        }
    }

    /// Replace the configuration's JWT. The last write wins.
    pub fn set_jwt(&self, token: impl Into<String>) {
        self.config.set_jwt_token(token);
    }

    fn current_jwt(&self) -> Option<String> {
        self.config
            .jwt_token()
            .map(|token| token.expose_secret().to_string())
    }

    /// Perform a call and return the decoded envelope.
    ///
    /// For `GET` the payload is flattened into the query string; for every
    /// other verb it is sent as a JSON body. Explicit `params` replace
    /// payload-derived query keys of the same name. Redirects are not followed.
    ///
    /// # Errors
    ///
    /// * [`Error::AuthenticationError`] on HTTP 401
    /// * [`Error::ValidationError`] on HTTP 400 or a payload that cannot be
    ///   placed in the query string
    /// * [`Error::ApiError`] on any other non-2xx status or an unparseable body
    /// * a transport variant if the request could not be completed
    pub fn request<B>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&B>,
        params: &QueryParams,
    ) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        debug!(%method, path, "sending pfSense API request");
        let response = self
            .prepare(&self.http, method, path, payload, params)?
            .send()?;
        Self::handle_response(response)
    }

    /// Perform a call and convert the envelope's `data` into `R`.
    ///
    /// # Errors
    ///
    /// As [`PfSenseClient::request`], plus [`Error::ValidationError`] if the
    /// payload does not fit `R`.
    pub fn request_json<B, R>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&B>,
        params: &QueryParams,
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.request(method, path, payload, params)?.into_model()
    }

    /// Perform a call and convert the envelope's `data` into a list of `R`.
    ///
    /// # Errors
    ///
    /// As [`PfSenseClient::request_json`].
    pub fn request_list<B, R>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&B>,
        params: &QueryParams,
    ) -> Result<Vec<R>>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.request(method, path, payload, params)?.into_models()
    }

    /// `GET` with query parameters.
    ///
    /// # Errors
    ///
    /// As [`PfSenseClient::request`].
    pub fn get(&self, path: &str, params: &QueryParams) -> Result<ApiResponse> {
        self.request(Method::GET, path, None::<&()>, params)
    }

    /// `POST` with a JSON body.
    ///
    /// # Errors
    ///
    /// As [`PfSenseClient::request`].
    pub fn post<B>(&self, path: &str, payload: &B) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(payload), &QueryParams::new())
    }

    /// `PUT` with a JSON body.
    ///
    /// # Errors
    ///
    /// As [`PfSenseClient::request`].
    pub fn put<B>(&self, path: &str, payload: &B) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, Some(payload), &QueryParams::new())
    }

    /// `PATCH` with a JSON body.
    ///
    /// # Errors
    ///
    /// As [`PfSenseClient::request`].
    pub fn patch<B>(&self, path: &str, payload: &B) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        self.request(Method::PATCH, path, Some(payload), &QueryParams::new())
    }

    /// `DELETE` with query parameters.
    ///
    /// # Errors
    ///
    /// As [`PfSenseClient::request`].
    pub fn delete(&self, path: &str, params: &QueryParams) -> Result<ApiResponse> {
        self.request(Method::DELETE, path, None::<&()>, params)
    }

    /// Perform a call and hand back the transport response untouched.
    ///
    /// The status is not classified and the body is not parsed. Redirects are
    /// followed only when `follow_redirects` is set.
    ///
    /// # Errors
    ///
    /// Returns a transport variant if the request could not be completed, or
    /// [`Error::InvalidRequest`]/[`Error::ValidationError`] if it could not be
    /// built.
    pub fn call_raw<B>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&B>,
        params: &QueryParams,
        follow_redirects: bool,
    ) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        let http = if follow_redirects {
            &self.redirecting_http
        } else {
            &self.http
        };
        debug!(%method, path, follow_redirects, "sending raw pfSense request");
        Ok(self.prepare(http, method, path, payload, params)?.send()?)
    }

    /// Obtain a JWT from the v2 login endpoint and use it for later calls.
    ///
    /// # Errors
    ///
    /// See [`PfSenseClient::authenticate_jwt_at`].
    pub fn authenticate_jwt(&self) -> Result<SecretString> {
        self.authenticate_jwt_at(JWT_AUTH_PATH)
    }

    /// Obtain a JWT by POSTing the configured username and password to `path`,
    /// both as HTTP basic auth and as a JSON `{username, password}` body.
    ///
    /// The exchange never carries the mode's own `Authorization` header. On
    /// success the token replaces the configuration's JWT and is sent as
    /// `Bearer` on subsequent calls.
    ///
    /// # Errors
    ///
    /// * [`Error::ConfigError`] if no username or password is configured
    /// * [`Error::AuthenticationError`] on HTTP 401 or if the reply has no
    ///   `data.token`
    /// * any other error [`PfSenseClient::request`] can return
    pub fn authenticate_jwt_at(&self, path: &str) -> Result<SecretString> {
        let username = self.config.username().filter(|u| !u.is_empty());
        let password = self
            .config
            .password()
            .filter(|p| !p.expose_secret().is_empty());
        let (Some(username), Some(password)) = (username, password) else {
            return Err(Error::ConfigError(
                "Username and password are required for JWT authentication".to_string(),
            ));
        };

        debug!(path, "requesting JWT");
        let response = self
            .http
            .post(self.url_for(path)?)
            .basic_auth(username, Some(password.expose_secret()))
            .json(&json!({
                "username": username,
                "password": password.expose_secret(),
            }))
            .send()?;
        let envelope = Self::handle_response(response)?;

        let token = envelope
            .data
            .get("token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or_else(|| Error::AuthenticationError {
                message: "No token returned in JWT auth response".to_string(),
                response: None,
            })?;

        self.set_jwt(token.clone());
        info!(username, path, "acquired JWT");

        Ok(SecretString::from(token))
    }

    fn prepare<B>(
        &self,
        http: &Client,
        method: Method,
        path: &str,
        payload: Option<&B>,
        params: &QueryParams,
    ) -> Result<RequestBuilder>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url_for(path)?;
        let payload = payload
            .map(serde_json::to_value)
            .transpose()
            .map_err(|err| Error::validation(format!("Failed to serialize request payload: {err}")))?;

        let is_get = method == Method::GET;
        let mut request = http.request(method, url);

        if is_get {
            let query = match &payload {
                Some(value) => QueryParams::from_payload(value)?.merged_with(params),
                None => params.clone(),
            };
            if !query.is_empty() {
                request = request.query(query.pairs());
            }
        } else {
            if !params.is_empty() {
                request = request.query(params.pairs());
            }
            if let Some(body) = &payload {
                request = request.json(body);
            }
        }

        Ok(self.authorize(request))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        if let Some(value) = self.authorization_header() {
            return request.header(AUTHORIZATION, value);
        }
        match (
            self.config.mode(),
            self.config.username(),
            self.config.password(),
        ) {
            (AuthMode::Local, Some(username), Some(password)) => {
                request.basic_auth(username, Some(password.expose_secret()))
            }
            _ => request,
        }
    }

    fn handle_response(response: Response) -> Result<ApiResponse> {
        let status = response.status();
        let body = response.text()?;
        debug!(status = status.as_u16(), "received pfSense API response");
        parse_response(status, body)
    }
}

/// Classify a reply: non-2xx statuses are errors before any parsing happens,
/// 2xx bodies must decode into an envelope.
fn parse_response(status: StatusCode, body: String) -> Result<ApiResponse> {
    if !status.is_success() {
        return Err(map_status_to_error(status, body));
    }

    match serde_json::from_str(&body) {
        Ok(envelope) => Ok(envelope),
        Err(err) => Err(Error::ApiError {
            message: format!("Failed to parse API response: {err}"),
            response: Some(HttpFailure::new(status.as_u16(), body)),
        }),
    }
}

fn build_http(config: &ClientConfig, redirect: Policy) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .cookie_store(true)
        .timeout(config.timeout())
        .connect_timeout(CONNECT_TIMEOUT)
        .redirect(redirect)
        .danger_accept_invalid_certs(!config.verify_ssl())
        .build()
        .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))
}

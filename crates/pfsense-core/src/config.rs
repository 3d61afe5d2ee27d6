//! Configuration structures for pfSense clients.
//!
//! A [`ClientConfig`] is validated exactly once, when it is built. Only the
//! JWT changes afterwards, when a client acquires a fresh token. The credential
//! fields that must be present depend on the selected [`AuthMode`].

use crate::Error;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use url::Url;
use validator::{Validate, ValidationError};

/// Default HTTPS port, omitted from the derived base URL.
pub const DEFAULT_PORT: u16 = 443;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Authentication scheme used for API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// HTTP basic auth with a local username and password
    #[default]
    Local,
    /// `Authorization: Bearer <jwt>`
    Jwt,
    /// `Authorization: <client_id> <client_token>`
    ApiToken,
}

impl AuthMode {
    /// Returns the wire name of the mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Jwt => "jwt",
            Self::ApiToken => "api_token",
        }
    }
}

impl FromStr for AuthMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "local" => Ok(Self::Local),
            "jwt" => Ok(Self::Jwt),
            "api_token" => Ok(Self::ApiToken),
            _ => Err(Error::ConfigError(format!(
                "Unknown authentication mode `{s}` (expected local, jwt or api_token)"
            ))),
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared, replaceable JWT. Last write wins.
#[derive(Debug)]
struct TokenSlot(Arc<RwLock<Option<SecretString>>>);

impl TokenSlot {
    fn new(token: Option<SecretString>) -> Self {
        Self(Arc::new(RwLock::new(token)))
    }

    fn get(&self) -> Option<SecretString> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|token| SecretString::from(token.expose_secret().to_string()))
    }

    fn set(&self, token: SecretString) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    fn is_present(&self) -> bool {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|token| !token.expose_secret().is_empty())
    }
}

/// Validated configuration for a pfSense client instance.
///
/// Build one with [`ClientConfig::builder`], one of the per-mode shortcuts,
/// or from a [`ConfigFile`].
#[derive(Debug, Validate)]
#[validate(schema(function = "validate_credentials"))]
pub struct ClientConfig {
    #[validate(custom(function = "validate_hostname"))]
    hostname: String,
    port: u16,
    mode: AuthMode,
    username: Option<String>,
    password: Option<SecretString>,
    jwt: TokenSlot,
    client_id: Option<String>,
    client_token: Option<SecretString>,
    verify_ssl: bool,
    #[validate(range(min = 1, max = 300))]
    timeout_secs: u64,
}

impl ClientConfig {
    /// Start building a configuration for the given host.
    #[must_use]
    pub fn builder(hostname: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder::new(hostname)
    }

    /// Configuration for `local` mode (HTTP basic auth).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the host or either credential is empty.
    pub fn local(
        hostname: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, Error> {
        Self::builder(hostname)
            .mode(AuthMode::Local)
            .credentials(username, password)
            .build()
    }

    /// Configuration for `jwt` mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the host or token is empty.
    pub fn jwt(hostname: impl Into<String>, token: impl Into<String>) -> Result<Self, Error> {
        Self::builder(hostname).mode(AuthMode::Jwt).jwt(token).build()
    }

    /// Configuration for `api_token` mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the host, client id or token is empty.
    pub fn api_token(
        hostname: impl Into<String>,
        client_id: impl Into<String>,
        client_token: impl Into<String>,
    ) -> Result<Self, Error> {
        Self::builder(hostname)
            .mode(AuthMode::ApiToken)
            .client_id(client_id)
            .client_token(client_token)
            .build()
    }

    /// Host name or address, as configured.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Configured port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Selected authentication mode.
    #[must_use]
    pub const fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Username for basic auth and JWT acquisition.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Password for basic auth and JWT acquisition.
    #[must_use]
    pub const fn password(&self) -> Option<&SecretString> {
        self.password.as_ref()
    }

    /// Current JWT: the configured one, or the most recently acquired one.
    #[must_use]
    pub fn jwt_token(&self) -> Option<SecretString> {
        self.jwt.get()
    }

    /// Replace the JWT. Visible to every client sharing this configuration.
    pub fn set_jwt_token(&self, token: impl Into<String>) {
        self.jwt.set(SecretString::from(token.into()));
    }

    /// API client id.
    #[must_use]
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// API client token.
    #[must_use]
    pub const fn client_token(&self) -> Option<&SecretString> {
        self.client_token.as_ref()
    }

    /// Whether TLS certificates are verified.
    #[must_use]
    pub const fn verify_ssl(&self) -> bool {
        self.verify_ssl
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Derive the scheme-qualified base URL, without a trailing slash.
    ///
    /// `https://` is assumed unless the host names its own scheme. The port is
    /// appended only when it differs from 443 and the host carries none.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the host cannot form a URL.
    pub fn base_url(&self) -> Result<String, Error> {
        derive_base_url(&self.hostname, self.port)
    }
}

fn derive_base_url(hostname: &str, port: u16) -> Result<String, Error> {
    let host = hostname.trim().trim_end_matches('/');
    let candidate = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    };

    let url = Url::parse(&candidate)
        .map_err(|err| Error::ConfigError(format!("Invalid hostname `{hostname}`: {err}")))?;
    let host_str = url
        .host_str()
        .ok_or_else(|| Error::ConfigError(format!("Hostname `{hostname}` has no host part")))?;

    let mut base = format!("{}://{host_str}", url.scheme());
    match url.port() {
        Some(explicit) => base.push_str(&format!(":{explicit}")),
        None if port != DEFAULT_PORT => base.push_str(&format!(":{port}")),
        None => {}
    }
    base.push_str(url.path().trim_end_matches('/'));

    Ok(base)
}

fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

fn is_secret_present(value: Option<&SecretString>) -> bool {
    value.is_some_and(|v| !v.expose_secret().is_empty())
}

fn credential_error(message: &'static str) -> ValidationError {
    ValidationError::new("credentials").with_message(message.into())
}

fn validate_hostname(hostname: &str) -> Result<(), ValidationError> {
    if hostname.trim().is_empty() {
        return Err(ValidationError::new("hostname").with_message("hostname is required".into()));
    }
    derive_base_url(hostname, DEFAULT_PORT)
        .map(|_| ())
        .map_err(|_| ValidationError::new("hostname").with_message("hostname is not a valid host".into()))
}

fn validate_credentials(config: &ClientConfig) -> Result<(), ValidationError> {
    match config.mode {
        AuthMode::Local => {
            if !is_present(config.username.as_deref()) || !is_secret_present(config.password.as_ref())
            {
                return Err(credential_error(
                    "Authentication mode is set to local but username or password are missing",
                ));
            }
        }
        AuthMode::Jwt => {
            if !config.jwt.is_present() {
                return Err(credential_error(
                    "Authentication mode is set to jwt but no jwt token was provided",
                ));
            }
        }
        AuthMode::ApiToken => {
            if !is_present(config.client_id.as_deref())
                || !is_secret_present(config.client_token.as_ref())
            {
                return Err(credential_error(
                    "Authentication mode is set to api_token but client_id or client_token are missing",
                ));
            }
        }
    }
    Ok(())
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    hostname: String,
    port: u16,
    mode: AuthMode,
    username: Option<String>,
    password: Option<String>,
    jwt: Option<String>,
    client_id: Option<String>,
    client_token: Option<String>,
    verify_ssl: bool,
    timeout_secs: u64,
}

impl ClientConfigBuilder {
    /// Create a builder with default port, mode, TLS and timeout settings.
    #[must_use]
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            port: DEFAULT_PORT,
            mode: AuthMode::default(),
            username: None,
            password: None,
            jwt: None,
            client_id: None,
            client_token: None,
            verify_ssl: true,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the authentication mode.
    #[must_use]
    pub const fn mode(mut self, mode: AuthMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the username.
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the password.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set username and password together.
    #[must_use]
    pub fn credentials(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username(username).password(password)
    }

    /// Set the JWT.
    #[must_use]
    pub fn jwt(mut self, token: impl Into<String>) -> Self {
        self.jwt = Some(token.into());
        self
    }

    /// Set the API client id.
    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set the API client token.
    #[must_use]
    pub fn client_token(mut self, client_token: impl Into<String>) -> Self {
        self.client_token = Some(client_token.into());
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the host is unusable, the timeout is
    /// out of range, or the mode's credentials are missing.
    pub fn build(self) -> Result<ClientConfig, Error> {
        let config = ClientConfig {
            hostname: self.hostname,
            port: self.port,
            mode: self.mode,
            username: self.username,
            password: self.password.map(SecretString::from),
            jwt: TokenSlot::new(self.jwt.map(SecretString::from)),
            client_id: self.client_id,
            client_token: self.client_token.map(SecretString::from),
            verify_ssl: self.verify_ssl,
            timeout_secs: self.timeout_secs,
        };

        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_mode() -> String {
    AuthMode::Local.as_str().to_string()
}

const fn default_verify_ssl() -> bool {
    true
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// On-disk JSON configuration.
///
/// ```json
/// {
///     "username": "me",
///     "password": "mysupersecretpassword",
///     "hostname": "example.com",
///     "port": 8443
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Host name or address
    #[serde(alias = "host")]
    pub hostname: String,
    /// Port (default 443)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Authentication mode string (default `local`)
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Username
    #[serde(default)]
    pub username: Option<String>,
    /// Password
    #[serde(default)]
    pub password: Option<String>,
    /// JWT
    #[serde(default)]
    pub jwt: Option<String>,
    /// API client id
    #[serde(default)]
    pub client_id: Option<String>,
    /// API client token
    #[serde(default)]
    pub client_token: Option<String>,
    /// Verify TLS certificates (default true)
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
    /// Request timeout in seconds (default 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout: u64,
}

impl TryFrom<ConfigFile> for ClientConfig {
    type Error = Error;

    fn try_from(file: ConfigFile) -> Result<Self, Error> {
        let mut builder = ClientConfigBuilder::new(file.hostname)
            .port(file.port)
            .mode(file.mode.parse()?)
            .verify_ssl(file.verify_ssl)
            .timeout(file.timeout);

        if let Some(username) = file.username {
            builder = builder.username(username);
        }
        if let Some(password) = file.password {
            builder = builder.password(password);
        }
        if let Some(jwt) = file.jwt {
            builder = builder.jwt(jwt);
        }
        if let Some(client_id) = file.client_id {
            builder = builder.client_id(client_id);
        }
        if let Some(client_token) = file.client_token {
            builder = builder.client_token(client_token);
        }

        builder.build()
    }
}

/// Load and validate a client configuration from a JSON file.
///
/// A leading `~/` is expanded to the user's home directory.
///
/// # Errors
///
/// Returns [`Error::ConfigNotFound`] if the file does not exist, and
/// [`Error::ConfigError`] if it cannot be read, parsed or validated.
pub fn load_client_config(path: impl AsRef<Path>) -> Result<ClientConfig, Error> {
    let path = expand_home(path.as_ref());
    if !path.exists() {
        return Err(Error::ConfigNotFound(path.display().to_string()));
    }

    let contents = std::fs::read_to_string(&path).map_err(|err| {
        Error::ConfigError(format!("Failed to read config file {}: {err}", path.display()))
    })?;
    let file: ConfigFile = serde_json::from_str(&contents).map_err(|err| {
        Error::ConfigError(format!("Invalid config file {}: {err}", path.display()))
    })?;

    ClientConfig::try_from(file)
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => std::env::var_os("HOME")
            .map_or_else(|| path.to_path_buf(), |home| PathBuf::from(home).join(rest)),
        Err(_) => path.to_path_buf(),
    }
}

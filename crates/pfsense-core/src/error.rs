//! Error types for pfSense API operations.
//!
//! Every failure a caller can observe falls into one of a small set of classes:
//! configuration, authentication, validation, generic API failures, and
//! transport failures propagated from the HTTP layer.

use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

/// Main error type for pfSense operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid or incomplete client settings
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Configuration file does not exist
    #[error("Config file {0} does not exist")]
    ConfigNotFound(String),

    /// HTTP 401, or a JWT exchange that returned no token
    #[error("Authentication error: {message}")]
    AuthenticationError {
        /// Error message
        message: String,
        /// Original HTTP response, when one was received
        response: Option<HttpFailure>,
    },

    /// HTTP 400, or a payload that could not be converted into a domain model
    #[error("Validation error: {message}")]
    ValidationError {
        /// Error message, including field-level detail where available
        message: String,
        /// Original HTTP response, when one was received
        response: Option<HttpFailure>,
    },

    /// Any other non-2xx response, or an unparseable success response
    #[error("API error: {message}")]
    ApiError {
        /// Error message
        message: String,
        /// Original HTTP response, when one was received
        response: Option<HttpFailure>,
    },

    /// The caller asked for something that cannot be turned into a request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Operation timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Connection could not be established (DNS, refused, TLS handshake)
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Any other transport failure
    #[error("HTTP request failed: {0}")]
    HttpError(String),
}

/// Specialized result type for pfSense operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Status and raw body of a response that was classified as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFailure {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
}

impl HttpFailure {
    /// Capture a failed response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.body)
    }
}

impl Error {
    /// Build a [`Error::ValidationError`] without an attached response.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            response: None,
        }
    }

    /// Build a [`Error::ApiError`] without an attached response.
    #[must_use]
    pub fn api(message: impl Into<String>) -> Self {
        Self::ApiError {
            message: message.into(),
            response: None,
        }
    }

    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::ConfigNotFound(_) => "CONFIG_NOT_FOUND",
            Self::AuthenticationError { .. } => "AUTHENTICATION_ERROR",
            Self::ValidationError { .. } => "VALIDATION_ERROR",
            Self::ApiError { .. } => "API_ERROR",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Timeout(_) => "TIMEOUT",
            Self::ConnectionFailed(_) => "CONNECTION_FAILED",
            Self::HttpError(_) => "HTTP_ERROR",
        }
    }

    /// The HTTP response attached to this error, if any.
    #[must_use]
    pub fn response(&self) -> Option<&HttpFailure> {
        match self {
            Self::AuthenticationError { response, .. }
            | Self::ValidationError { response, .. }
            | Self::ApiError { response, .. } => response.as_ref(),
            _ => None,
        }
    }

    /// HTTP status of the attached response, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.response().map(|failure| failure.status)
    }

    /// Returns true if the error came from the transport rather than the API.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::ConnectionFailed(_) | Self::HttpError(_)
        )
    }
}

/// Classify a non-2xx response.
///
/// 401 is an authentication failure, 400 a validation failure, and everything
/// else a generic API error. The status and raw body are kept for diagnostics.
#[must_use]
pub fn map_status_to_error(status: StatusCode, body: String) -> Error {
    let response = Some(HttpFailure::new(status.as_u16(), body));
    match status {
        StatusCode::UNAUTHORIZED => Error::AuthenticationError {
            message: "Authentication failed (401)".to_string(),
            response,
        },
        StatusCode::BAD_REQUEST => Error::ValidationError {
            message: "Request validation failed (400)".to_string(),
            response,
        },
        status => Error::ApiError {
            message: format!("API request failed with status {status}"),
            response,
        },
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::validation(err.to_string())
    }
}

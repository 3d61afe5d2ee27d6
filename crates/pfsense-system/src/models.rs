//! System models.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Output of a shell command run on the appliance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    /// Combined command output.
    #[serde(alias = "cmd_output", default)]
    pub output: String,
}

/// Installed and available API package versions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiVersion {
    /// Installed version.
    pub current_api_version: Option<String>,
    /// Newest published version.
    pub latest_api_version: Option<String>,
    /// Release date of the newest version.
    pub latest_api_version_datetime: Option<String>,
    /// Whether an update is available.
    pub update_available: bool,
}

/// A local user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Login name.
    pub name: String,
    /// Full name or description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descr: Option<String>,
    /// `user` or `system`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Assigned privileges.
    #[serde(rename = "priv", default)]
    pub privileges: Vec<String>,
    /// Remaining fields (uid, expiry, keys, ...) as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// The raw password is only ever revealed when the payload is serialized.
fn expose_password<S>(password: &Option<SecretString>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match password {
        Some(secret) => serializer.serialize_str(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

/// Payload for creating or updating a user.
#[derive(Debug, Serialize)]
pub struct UserRequest {
    /// Login name.
    pub username: String,
    /// Password; required on create, optional on update.
    #[serde(
        serialize_with = "expose_password",
        skip_serializing_if = "Option::is_none"
    )]
    pub password: Option<SecretString>,
    /// Full name or description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descr: Option<String>,
    /// Expiry date (`MM/DD/YYYY`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    /// SSH authorized keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorizedkeys: Option<String>,
    /// Privileges to grant.
    #[serde(rename = "priv", skip_serializing_if = "Vec::is_empty")]
    pub privileges: Vec<String>,
    /// Create the account disabled.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

impl UserRequest {
    /// A new enabled account.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Some(SecretString::from(password.into())),
            descr: None,
            expires: None,
            authorizedkeys: None,
            privileges: Vec::new(),
            disabled: false,
        }
    }

    /// An update that leaves the password unchanged.
    #[must_use]
    pub fn update(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: None,
            descr: None,
            expires: None,
            authorizedkeys: None,
            privileges: Vec::new(),
            disabled: false,
        }
    }
}

/// Payload for deleting a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDelete {
    /// Login name.
    pub username: String,
}

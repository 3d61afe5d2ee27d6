//! System endpoints.

use crate::models::{ApiVersion, CommandOutput, User, UserDelete, UserRequest};
use crate::Result;
use pfsense_core::{ApiResponse, Method, PfSenseClient, QueryParams};
use secrecy::SecretString;
use serde_json::json;
use tracing::debug;

const COMMAND_PROMPT_PATH: &str = "/api/v1/diagnostics/command_prompt";
const ACCESS_TOKEN_PATH: &str = "/api/v1/access_token";
const API_VERSION_PATH: &str = "/api/v1/system/api/version";
const USER_PATH: &str = "/api/v1/user";

/// System operations over a shared [`PfSenseClient`].
#[derive(Debug, Clone, Copy)]
pub struct SystemApi<'a> {
    client: &'a PfSenseClient,
}

impl<'a> SystemApi<'a> {
    /// Wrap a client.
    #[must_use]
    pub const fn new(client: &'a PfSenseClient) -> Self {
        Self { client }
    }

    /// Run `shell_cmd` on the appliance and return its output.
    pub fn execute_shell_command(&self, shell_cmd: &str) -> Result<CommandOutput> {
        debug!(len = shell_cmd.len(), "executing shell command on appliance");
        self.client.request_json(
            Method::POST,
            COMMAND_PROMPT_PATH,
            Some(&json!({ "shell_cmd": shell_cmd })),
            &QueryParams::new(),
        )
    }

    /// Exchange the configured credentials for a v1 access token.
    ///
    /// The token is also stored on the client for later calls.
    pub fn request_access_token(&self) -> Result<SecretString> {
        self.client.authenticate_jwt_at(ACCESS_TOKEN_PATH)
    }

    /// Installed and latest API package version.
    pub fn api_version(&self) -> Result<ApiVersion> {
        self.client.request_json(
            Method::GET,
            API_VERSION_PATH,
            None::<&()>,
            &QueryParams::new(),
        )
    }

    /// List users matching the given field filters.
    pub fn list_users(&self, filters: &QueryParams) -> Result<Vec<User>> {
        self.client
            .request_list(Method::GET, USER_PATH, None::<&()>, filters)
    }

    /// Create a user.
    pub fn create_user(&self, user: &UserRequest) -> Result<User> {
        debug!(username = %user.username, "creating user");
        self.client
            .request_json(Method::POST, USER_PATH, Some(user), &QueryParams::new())
    }

    /// Update an existing user.
    pub fn update_user(&self, user: &UserRequest) -> Result<User> {
        self.client
            .request_json(Method::PUT, USER_PATH, Some(user), &QueryParams::new())
    }

    /// Delete a user by login name.
    pub fn delete_user(&self, username: &str) -> Result<ApiResponse> {
        let request = UserDelete {
            username: username.to_string(),
        };
        self.client
            .request(Method::DELETE, USER_PATH, Some(&request), &QueryParams::new())
    }
}

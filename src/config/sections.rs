use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where the panel REST backend lives.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct BackendConfig {
    /// Base URL without trailing slash, e.g. `https://school.example/api`.
    pub base_url: String,
}

impl BackendConfig {
    /// Joins the base URL and an absolute path.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Transport settings shared by every outgoing request.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ClientConfig {
    #[serde(default = "default_timeout_in_ms")]
    pub timeout_in_ms: u64,
}

fn default_timeout_in_ms() -> u64 {
    10_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            timeout_in_ms: default_timeout_in_ms(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct RefreshConfig {
    #[serde(default = "default_refresh_path")]
    pub path: String,
    /// Share one in-flight refresh between concurrent 401s.
    #[serde(default)]
    pub coalesce: bool,
}

fn default_refresh_path() -> String {
    "/auth/refresh-token".to_string()
}

impl Default for RefreshConfig {
    fn default() -> Self {
        RefreshConfig {
            path: default_refresh_path(),
            coalesce: false,
        }
    }
}

/// Backend endpoints for sign-in and sign-out.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct AuthEndpointsConfig {
    #[serde(default = "default_login_endpoint")]
    pub login_path: String,
    #[serde(default = "default_logout_endpoint")]
    pub logout_path: String,
}

fn default_login_endpoint() -> String {
    "/auth/login".to_string()
}

fn default_logout_endpoint() -> String {
    "/auth/logout".to_string()
}

impl Default for AuthEndpointsConfig {
    fn default() -> Self {
        AuthEndpointsConfig {
            login_path: default_login_endpoint(),
            logout_path: default_logout_endpoint(),
        }
    }
}

/// Navigation targets used by the route guard.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct GuardConfig {
    #[serde(default = "default_login_view")]
    pub login_path: String,
    #[serde(default = "default_unauthorized_view")]
    pub unauthorized_path: String,
}

fn default_login_view() -> String {
    "/login".to_string()
}

fn default_unauthorized_view() -> String {
    "/unauthorized".to_string()
}

impl Default for GuardConfig {
    fn default() -> Self {
        GuardConfig {
            login_path: default_login_view(),
            unauthorized_path: default_unauthorized_view(),
        }
    }
}

use std::time::Duration;

use serde::Deserialize;

/// Connection settings for the external execution engine.
#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    /// Base URL of the engine API. Default: "http://localhost:2358".
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Header carrying the API token. Default: "X-Auth-Token".
    #[serde(default = "default_auth_header")]
    pub auth_header: String,
    /// API token, sent only when set.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Timeout for a single HTTP request. Default: 10000.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Process/thread cap applied to every job. Default: 60.
    #[serde(default = "default_max_processes")]
    pub max_processes: u32,
}

fn default_base_url() -> String {
    "http://localhost:2358".into()
}
fn default_auth_header() -> String {
    "X-Auth-Token".into()
}
fn default_request_timeout_ms() -> u64 {
    10_000
}
fn default_max_processes() -> u32 {
    60
}

impl EngineConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Build an absolute URL for an API path such as `/submissions/batch`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_header: default_auth_header(),
            auth_token: None,
            request_timeout_ms: default_request_timeout_ms(),
            max_processes: default_max_processes(),
        }
    }
}

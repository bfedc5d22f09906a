use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of a running site for `--server` commands (env:
    /// `MODULAR_SERVER_URL`)
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Bearer token for the admin API
    #[serde(default)]
    pub admin_token: Option<String>,
}

fn default_server_url() -> String {
    crate::setup::DEFAULT_SITE_URL.into()
}

fn default_timeout_secs() -> u64 {
    crate::client::DEFAULT_TIMEOUT_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            timeout_secs: default_timeout_secs(),
            admin_token: None,
        }
    }
}

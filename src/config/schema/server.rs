use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Gateway host (default: 127.0.0.1)
    #[serde(default = "default_host")]
    pub host: String,
    /// Gateway port (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allow binding to a non-loopback address without a setup token
    #[serde(default)]
    pub allow_public_bind: bool,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_body_limit_bytes() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allow_public_bind: false,
            request_timeout_secs: default_request_timeout_secs(),
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

impl ServerConfig {
    pub fn is_loopback(&self) -> bool {
        let host = self.host.trim().trim_start_matches('[').trim_end_matches(']');
        host.eq_ignore_ascii_case("localhost")
            || host
                .parse::<std::net::IpAddr>()
                .is_ok_and(|ip| ip.is_loopback())
    }
}

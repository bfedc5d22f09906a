use serde::{Deserialize, Serialize};

/// Outgoing mail settings (env: `SMTP_HOST`, `SMTP_PORT`, `SMTP_USER`,
/// `SMTP_PASSWORD`, `SMTP_FROM`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
}

fn default_port() -> u16 {
    587
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_port(),
            user: None,
            password: None,
            from: None,
        }
    }
}

impl SmtpConfig {
    pub fn is_configured(&self) -> bool {
        self.host.as_deref().is_some_and(|h| !h.trim().is_empty())
    }
}

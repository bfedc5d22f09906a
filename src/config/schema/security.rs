use serde::{Deserialize, Serialize};

use crate::install::DEFAULT_HASH_ROUNDS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Session signing secret (env: `JWT_SECRET`). Generated at install time
    /// when unset.
    #[serde(default)]
    pub jwt_secret: Option<String>,
    /// env: `NEXTAUTH_SECRET`
    #[serde(default)]
    pub nextauth_secret: Option<String>,
    /// Password hashing cost (env: `BCRYPT_ROUNDS`)
    #[serde(default = "default_hash_rounds")]
    pub hash_rounds: u32,
    /// env: `SESSION_TIMEOUT`
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,
    /// Seal secrets in config.toml with the local key file
    #[serde(default = "default_true")]
    pub encrypt_secrets: bool,
}

fn default_hash_rounds() -> u32 {
    DEFAULT_HASH_ROUNDS
}

fn default_session_timeout_secs() -> u64 {
    86_400
}

fn default_true() -> bool {
    true
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            nextauth_secret: None,
            hash_rounds: default_hash_rounds(),
            session_timeout_secs: default_session_timeout_secs(),
            encrypt_secrets: true,
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::install::DEFAULT_PROBE_TIMEOUT_SECS;
use crate::setup::DEFAULT_MIN_PASSWORD_LENGTH;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupConfig {
    /// Where `install.toml` and the key file live (default: `<config dir>/data`,
    /// env: `MODULAR_DATA_DIR`). `~` is expanded.
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default)]
    pub require_password_confirmation: bool,
    #[serde(default)]
    pub require_database_test: bool,
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
    /// Probe the database again before writing the installation
    #[serde(default)]
    pub verify_database_on_install: bool,
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    /// Shared secret required in `X-Setup-Token` (env: `MODULAR_SETUP_TOKEN`)
    #[serde(default)]
    pub token: Option<String>,
}

fn default_min_password_length() -> usize {
    DEFAULT_MIN_PASSWORD_LENGTH
}

fn default_probe_timeout_secs() -> u64 {
    DEFAULT_PROBE_TIMEOUT_SECS
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            require_password_confirmation: false,
            require_database_test: false,
            min_password_length: default_min_password_length(),
            verify_database_on_install: false,
            probe_timeout_secs: default_probe_timeout_secs(),
            token: None,
        }
    }
}

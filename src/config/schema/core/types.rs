use super::super::{
    ClientConfig, DatabaseConfig, ObservabilityConfig, SecurityConfig, ServerConfig, SetupConfig,
    SmtpConfig,
};
use crate::error::ConfigError;
use crate::setup::{SetupData, ValidationProfile};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub(super) const CONFIG_DIR_NAME: &str = ".modular";
pub(super) const CONFIG_FILE_NAME: &str = "config.toml";
const DATA_DIR_NAME: &str = "data";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub security: SecurityConfig,

    #[serde(default)]
    pub smtp: SmtpConfig,

    #[serde(default)]
    pub setup: SetupConfig,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
        let config_dir = home.join(CONFIG_DIR_NAME);

        Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
            database: DatabaseConfig::default(),
            server: ServerConfig::default(),
            security: SecurityConfig::default(),
            smtp: SmtpConfig::default(),
            setup: SetupConfig::default(),
            client: ClientConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    /// Installation data directory: `setup.data_dir` with `~` expanded, or
    /// `data/` next to config.toml.
    pub fn data_dir(&self) -> PathBuf {
        match self.setup.data_dir.as_deref().map(str::trim) {
            Some(dir) if !dir.is_empty() => PathBuf::from(shellexpand::tilde(dir).into_owned()),
            _ => self.config_dir.join(DATA_DIR_NAME),
        }
    }

    pub fn validation_profile(&self) -> ValidationProfile {
        ValidationProfile {
            require_password_confirmation: self.setup.require_password_confirmation,
            require_database_test: self.setup.require_database_test,
            min_password_length: self.setup.min_password_length,
        }
    }

    /// Wizard draft prefilled from the configured database.
    pub fn setup_defaults(&self) -> SetupData {
        let mut data = SetupData::default();
        data.database.uri.clone_from(&self.database.uri);
        data.database.name.clone_from(&self.database.name);
        data
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: String| Err(ConfigError::Validation(msg));
        if self.server.port == 0 {
            return fail("server.port must be non-zero".into());
        }
        if self.server.body_limit_bytes == 0 {
            return fail("server.body_limit_bytes must be non-zero".into());
        }
        if self.security.hash_rounds == 0 {
            return fail("security.hash_rounds must be at least 1".into());
        }
        if self.setup.min_password_length < crate::setup::DEFAULT_MIN_PASSWORD_LENGTH {
            return fail(format!(
                "setup.min_password_length must be at least {}",
                crate::setup::DEFAULT_MIN_PASSWORD_LENGTH
            ));
        }
        if self.setup.probe_timeout_secs == 0 {
            return fail("setup.probe_timeout_secs must be non-zero".into());
        }
        if self.observability.level().is_none() {
            return fail(format!(
                "observability.log_level \"{}\" is not a tracing level",
                self.observability.log_level
            ));
        }
        if crate::client::parse_base_url(&self.client.server_url).is_err() {
            return fail(format!(
                "client.server_url \"{}\" is not an http(s) URL",
                self.client.server_url
            ));
        }
        Ok(())
    }
}

use super::Config;
use super::types::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::Path;

impl Config {
    /// Load `~/.modular/config.toml`, creating it with defaults on first run,
    /// then apply environment overrides and validate.
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let mut config = Self::load_or_init_in(&home.join(CONFIG_DIR_NAME))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Same as [`load_or_init`](Self::load_or_init) for an explicit config
    /// directory, without environment overrides.
    pub fn load_or_init_in(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).context("Failed to create config directory")?;
        }

        if config_path.exists() {
            let contents =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            let mut config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            config.config_dir = config_dir.to_path_buf();
            config.config_path.clone_from(&config_path);

            if config.open_secrets_in_place()? {
                config.save()?;
            }
            Ok(config)
        } else {
            let config = Self {
                config_dir: config_dir.to_path_buf(),
                config_path,
                ..Self::default()
            };
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let persisted = self.config_for_persistence()?;
        let toml_str = toml::to_string_pretty(&persisted).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}

use serde::{Deserialize, Serialize};

use crate::setup::{DEFAULT_DATABASE_NAME, DEFAULT_DATABASE_URI};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Prefilled into the wizard's database step (env: `MONGODB_URI`)
    #[serde(default = "default_uri")]
    pub uri: String,
    /// env: `MONGODB_DB`
    #[serde(default = "default_name")]
    pub name: String,
}

fn default_uri() -> String {
    DEFAULT_DATABASE_URI.into()
}

fn default_name() -> String {
    DEFAULT_DATABASE_NAME.into()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            name: default_name(),
        }
    }
}

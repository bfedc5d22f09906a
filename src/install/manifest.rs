use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::InstallError;

pub const MANIFEST_FILE: &str = "install.toml";
pub const MANIFEST_VERSION: u32 = 1;

/// Record of a completed installation, stored as `install.toml` in the data
/// directory. Its presence is what "installed" means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallManifest {
    pub version: u32,
    pub installed_at: DateTime<Utc>,
    pub site: SiteManifest,
    pub admin: AdminManifest,
    pub database: DatabaseManifest,
    pub security: SecurityManifest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteManifest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    pub language: String,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminManifest {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// PHC string (`$argon2id$...`).
    pub password_hash: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseManifest {
    /// Sealed with the data directory's secret key.
    pub uri: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityManifest {
    /// Sealed; generated at install time when no secret is configured.
    pub jwt_secret: String,
}

impl InstallManifest {
    pub async fn load(path: &Path) -> Result<Option<Self>, InstallError> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        toml::from_str(&raw)
            .map(Some)
            .map_err(|e| InstallError::Storage(format!("{}: {e}", path.display())))
    }

    /// Write to a sibling temp file, then rename over `path`.
    pub async fn write_atomic(&self, path: &Path) -> Result<(), InstallError> {
        let encoded =
            toml::to_string_pretty(self).map_err(|e| InstallError::Storage(e.to_string()))?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension(format!("toml.{}.tmp", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&tmp, encoded).await?;
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

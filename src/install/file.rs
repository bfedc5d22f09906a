use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHasher, Version};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::manifest::{
    AdminManifest, DatabaseManifest, InstallManifest, MANIFEST_FILE, MANIFEST_VERSION,
    SecurityManifest, SiteManifest,
};
use super::probe::{DEFAULT_PROBE_TIMEOUT_SECS, ProbeReport, probe_database, redact_uri};
use super::{InstallFuture, InstallReceipt, Installer};
use crate::config::Config;
use crate::error::InstallError;
use crate::security::{SecretStore, generate_secret};
use crate::setup::{DEFAULT_MIN_PASSWORD_LENGTH, SetupData, ValidationProfile, validate_all};

pub const DEFAULT_HASH_ROUNDS: u32 = 2;
const ADMIN_ROLE: &str = "admin";

/// Installs into a data directory on the local filesystem.
pub struct FileInstaller {
    data_dir: PathBuf,
    hash_rounds: u32,
    jwt_secret: Option<String>,
    verify_database: bool,
    probe_timeout: Duration,
    min_password_length: usize,
    installed: AtomicBool,
    lock: Mutex<()>,
}

impl FileInstaller {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            hash_rounds: DEFAULT_HASH_ROUNDS,
            jwt_secret: None,
            verify_database: false,
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
            installed: AtomicBool::new(false),
            lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.data_dir())
            .with_hash_rounds(config.security.hash_rounds)
            .with_jwt_secret(config.security.jwt_secret.clone())
            .with_database_verification(config.setup.verify_database_on_install)
            .with_probe_timeout(Duration::from_secs(config.setup.probe_timeout_secs))
            .with_min_password_length(config.setup.min_password_length)
    }

    /// Argon2 time cost.
    pub fn with_hash_rounds(mut self, rounds: u32) -> Self {
        self.hash_rounds = rounds.max(1);
        self
    }

    pub fn with_jwt_secret(mut self, secret: Option<String>) -> Self {
        self.jwt_secret = secret.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn with_database_verification(mut self, verify: bool) -> Self {
        self.verify_database = verify;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_min_password_length(mut self, length: usize) -> Self {
        self.min_password_length = length.max(1);
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.data_dir.join(MANIFEST_FILE)
    }

    /// Open the stored database URI.
    pub async fn database_uri(&self) -> Result<Option<String>, InstallError> {
        let Some(manifest) = InstallManifest::load(&self.manifest_path()).await? else {
            return Ok(None);
        };
        let store = self.secret_store()?;
        store
            .open(&manifest.database.uri)
            .map(Some)
            .map_err(|e| InstallError::Storage(e.to_string()))
    }

    fn secret_store(&self) -> Result<SecretStore, InstallError> {
        SecretStore::open_or_create(&self.data_dir).map_err(|e| InstallError::Storage(e.to_string()))
    }

    /// Confirmation is enforced only when the payload carries it.
    fn profile_for(&self, data: &SetupData) -> ValidationProfile {
        ValidationProfile {
            require_password_confirmation: data.admin.confirm_password.is_some(),
            require_database_test: false,
            min_password_length: self.min_password_length,
        }
    }

    async fn manifest_exists(&self) -> Result<bool, InstallError> {
        if self.installed.load(Ordering::Acquire) {
            return Ok(true);
        }
        let exists = tokio::fs::try_exists(self.manifest_path()).await?;
        if exists {
            self.installed.store(true, Ordering::Release);
        }
        Ok(exists)
    }

    async fn install_locked(&self, data: &SetupData) -> Result<InstallReceipt, InstallError> {
        if self.manifest_exists().await? {
            warn!("installation rejected: site is already installed");
            return Err(InstallError::AlreadyInstalled);
        }

        let errors = validate_all(data, &self.profile_for(data));
        if !errors.is_empty() {
            warn!(
                fields = ?errors.keys().collect::<Vec<_>>(),
                "installation rejected: invalid payload"
            );
            return Err(InstallError::Invalid(errors));
        }

        let uri = data.database.uri.trim();
        if self.verify_database {
            let report = probe_database(uri, self.probe_timeout).await?;
            debug!(host = %report.host, port = report.port, "database reachable");
        }

        let password_hash = hash_password(
            Zeroizing::new(data.admin.password.clone()),
            self.hash_rounds,
        )
        .await?;

        let store = self.secret_store()?;
        let seal = |value: &str| {
            store
                .seal(value)
                .map_err(|e| InstallError::Storage(e.to_string()))
        };
        let jwt_secret = Zeroizing::new(
            self.jwt_secret
                .clone()
                .unwrap_or_else(|| generate_secret(32)),
        );

        let site = &data.site;
        let manifest = InstallManifest {
            version: MANIFEST_VERSION,
            installed_at: Utc::now(),
            site: SiteManifest {
                title: site.title.trim().to_string(),
                description: site.description.trim().to_string(),
                url: site.url.trim().trim_end_matches('/').to_string(),
                language: site.language_or_default().to_string(),
                timezone: site.timezone_or_default().to_string(),
            },
            admin: AdminManifest {
                id: uuid::Uuid::new_v4().to_string(),
                username: data.admin.username.trim().to_string(),
                email: data.admin.email.trim().to_lowercase(),
                first_name: data.admin.first_name.trim().to_string(),
                last_name: data.admin.last_name.trim().to_string(),
                password_hash,
                roles: vec![ADMIN_ROLE.to_string()],
            },
            database: DatabaseManifest {
                uri: seal(uri)?,
                name: data.database.name.trim().to_string(),
            },
            security: SecurityManifest {
                jwt_secret: seal(&jwt_secret)?,
            },
        };
        manifest.write_atomic(&self.manifest_path()).await?;
        self.installed.store(true, Ordering::Release);

        info!(
            site = %manifest.site.title,
            admin = %manifest.admin.username,
            database = %redact_uri(uri),
            "site installed"
        );
        Ok(InstallReceipt {
            installed_at: manifest.installed_at,
            site_title: manifest.site.title,
            site_url: manifest.site.url,
            admin_username: manifest.admin.username,
            database_name: manifest.database.name,
        })
    }
}

impl Installer for FileInstaller {
    fn is_installed(&self) -> InstallFuture<'_, bool> {
        Box::pin(self.manifest_exists())
    }

    fn probe_database<'a>(&'a self, uri: &'a str) -> InstallFuture<'a, ProbeReport> {
        Box::pin(probe_database(uri, self.probe_timeout))
    }

    fn install<'a>(&'a self, data: &'a SetupData) -> InstallFuture<'a, InstallReceipt> {
        Box::pin(async move {
            let _guard = self.lock.lock().await;
            self.install_locked(data).await
        })
    }

    fn manifest(&self) -> InstallFuture<'_, Option<InstallManifest>> {
        Box::pin(async move { InstallManifest::load(&self.manifest_path()).await })
    }
}

async fn hash_password(password: Zeroizing<String>, rounds: u32) -> Result<String, InstallError> {
    tokio::task::spawn_blocking(move || {
        let params = Params::new(Params::DEFAULT_M_COST, rounds, Params::DEFAULT_P_COST, None)
            .map_err(|e| InstallError::Storage(format!("invalid hash parameters: {e}")))?;
        let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| InstallError::Storage(format!("password hash failed: {e}")))
    })
    .await
    .map_err(|e| InstallError::Storage(format!("password hashing task failed: {e}")))?
}

//! Server-side installation: turns a validated [`SetupData`] into an
//! installed site.

mod file;
mod local;
mod manifest;
mod probe;

pub use file::{DEFAULT_HASH_ROUNDS, FileInstaller};
pub use local::LocalSetupApi;
pub(crate) use local::rejection;
pub use manifest::{
    AdminManifest, DatabaseManifest, InstallManifest, MANIFEST_FILE, MANIFEST_VERSION,
    SecurityManifest, SiteManifest,
};
pub use probe::{
    DEFAULT_MONGODB_PORT, DEFAULT_PROBE_TIMEOUT_SECS, MongoTarget, ProbeReport, parse_mongodb_uri,
    probe_database, redact_uri,
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;

use crate::error::InstallError;
use crate::setup::SetupData;

pub type InstallFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, InstallError>> + Send + 'a>>;

/// Summary handed back to the caller after a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallReceipt {
    pub installed_at: DateTime<Utc>,
    pub site_title: String,
    pub site_url: String,
    pub admin_username: String,
    pub database_name: String,
}

impl InstallReceipt {
    pub fn message(&self) -> String {
        format!(
            "Installed {} at {}; sign in as {}",
            self.site_title, self.site_url, self.admin_username
        )
    }
}

pub trait Installer: Send + Sync {
    fn is_installed(&self) -> InstallFuture<'_, bool>;

    fn probe_database<'a>(&'a self, uri: &'a str) -> InstallFuture<'a, ProbeReport>;

    fn install<'a>(&'a self, data: &'a SetupData) -> InstallFuture<'a, InstallReceipt>;

    /// The stored installation, if any.
    fn manifest(&self) -> InstallFuture<'_, Option<InstallManifest>>;
}

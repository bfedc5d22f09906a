use serde::{Deserialize, Serialize};

use super::data::SetupData;
use super::validation::ErrorMap;
use crate::client::ApiFuture;

/// Body of `POST /api/setup/install` and `POST /api/setup/test-database`
/// responses: `{ success, message?, errors? }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "ErrorMap::is_empty")]
    pub errors: ErrorMap,
}

impl SetupResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            errors: ErrorMap::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            errors: ErrorMap::new(),
        }
    }

    pub fn with_errors(mut self, errors: ErrorMap) -> Self {
        self.errors = errors;
        self
    }
}

/// Body of `POST /api/setup/test-database`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseTestRequest {
    pub uri: String,
}

/// Body of `GET /api/setup/check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationStatus {
    pub installed: bool,
}

/// The installation endpoints the wizard talks to.
///
/// Implemented over HTTP by [`crate::client::HttpSetupClient`] and in-process
/// by [`crate::install::LocalSetupApi`].
pub trait SetupApi: Send + Sync {
    fn install<'a>(&'a self, data: &'a SetupData) -> ApiFuture<'a, SetupResponse>;

    fn test_database<'a>(&'a self, uri: &'a str) -> ApiFuture<'a, SetupResponse>;

    fn check(&self) -> ApiFuture<'_, InstallationStatus>;
}

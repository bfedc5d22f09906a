use std::sync::Arc;

use super::Installer;
use crate::client::ApiFuture;
use crate::error::InstallError;
use crate::setup::{InstallationStatus, SetupApi, SetupData, SetupResponse};

/// Runs the wizard against an in-process [`Installer`], no server needed.
#[derive(Clone)]
pub struct LocalSetupApi {
    installer: Arc<dyn Installer>,
}

impl LocalSetupApi {
    pub fn new(installer: Arc<dyn Installer>) -> Self {
        Self { installer }
    }
}

impl SetupApi for LocalSetupApi {
    fn install<'a>(&'a self, data: &'a SetupData) -> ApiFuture<'a, SetupResponse> {
        Box::pin(async move {
            Ok(match self.installer.install(data).await {
                Ok(receipt) => SetupResponse::ok(receipt.message()),
                Err(e) => rejection(&e),
            })
        })
    }

    fn test_database<'a>(&'a self, uri: &'a str) -> ApiFuture<'a, SetupResponse> {
        Box::pin(async move {
            Ok(match self.installer.probe_database(uri).await {
                Ok(report) => SetupResponse::ok(report.message()),
                Err(e) => rejection(&e),
            })
        })
    }

    fn check(&self) -> ApiFuture<'_, InstallationStatus> {
        Box::pin(async move {
            let installed = self.installer.is_installed().await?;
            Ok(InstallationStatus { installed })
        })
    }
}

/// `{success:false}` body for a failed install or probe.
pub(crate) fn rejection(err: &InstallError) -> SetupResponse {
    match err {
        InstallError::Invalid(errors) => {
            SetupResponse::failure("Please correct the highlighted fields")
                .with_errors(errors.clone())
        }
        InstallError::AlreadyInstalled => SetupResponse::failure("Site is already installed"),
        InstallError::Database(message) => SetupResponse::failure(message.clone()),
        other => SetupResponse::failure(format!("Installation failed: {other}")),
    }
}

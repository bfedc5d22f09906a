use std::time::Duration;
use url::Url;

use super::{
    ApiFuture, DEFAULT_TIMEOUT_SECS, build_http_client, endpoint, error_message, expect_success,
    parse_base_url,
};
use crate::error::ClientError;
use crate::setup::{DatabaseTestRequest, InstallationStatus, SetupApi, SetupData, SetupResponse};

pub const SETUP_TOKEN_HEADER: &str = "X-Setup-Token";

/// `SetupApi` over HTTP against a running setup gateway.
pub struct HttpSetupClient {
    http: reqwest::Client,
    base_url: Url,
    setup_token: Option<String>,
}

impl HttpSetupClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            http: build_http_client(timeout)?,
            base_url: parse_base_url(base_url)?,
            setup_token: None,
        })
    }

    /// Send `X-Setup-Token` with installation and database-test requests.
    pub fn with_setup_token(mut self, token: Option<String>) -> Self {
        self.setup_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// POST a JSON body and read a `SetupResponse`.
    ///
    /// 4xx/5xx replies that still carry a `SetupResponse` body are returned
    /// as-is so the caller sees the server's message and field errors.
    async fn post_setup<B: serde::Serialize + Sync>(
        &self,
        path: &[&str],
        body: &B,
    ) -> Result<SetupResponse, ClientError> {
        let url = endpoint(&self.base_url, path)?;
        let mut request = self.http.post(url).json(body);
        if let Some(token) = &self.setup_token {
            request = request.header(SETUP_TOKEN_HEADER, token);
        }
        let resp = request.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        serde_json::from_slice::<SetupResponse>(&bytes).map_err(|_| ClientError::Status {
            status: status.as_u16(),
            message: error_message(&String::from_utf8_lossy(&bytes)),
        })
    }
}

impl SetupApi for HttpSetupClient {
    fn install<'a>(&'a self, data: &'a SetupData) -> ApiFuture<'a, SetupResponse> {
        Box::pin(async move {
            tracing::info!(server = %self.base_url, "submitting installation");
            self.post_setup(&["api", "setup", "install"], data)
                .await
        })
    }

    fn test_database<'a>(&'a self, uri: &'a str) -> ApiFuture<'a, SetupResponse> {
        Box::pin(async move {
            let body = DatabaseTestRequest {
                uri: uri.to_string(),
            };
            self.post_setup(&["api", "setup", "test-database"], &body)
                .await
        })
    }

    fn check(&self) -> ApiFuture<'_, InstallationStatus> {
        Box::pin(async move {
            let url = endpoint(&self.base_url, &["api", "setup", "check"])?;
            let resp = expect_success(self.http.get(url).send().await?).await?;
            Ok(resp.json::<InstallationStatus>().await?)
        })
    }
}

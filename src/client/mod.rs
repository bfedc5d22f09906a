//! HTTP clients for the setup endpoints and the admin API.

mod admin;
mod setup;

pub use admin::AdminClient;
pub use setup::{HttpSetupClient, SETUP_TOKEN_HEADER};

use reqwest::Response;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use url::Url;

use crate::error::ClientError;

/// Boxed future returned by every API trait method.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ClientError>> + Send + 'a>>;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_ERROR_BODY_CHARS: usize = 200;

pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let url = Url::parse(raw.trim()).map_err(|_| ClientError::InvalidBaseUrl(raw.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ClientError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(url)
}

/// Append path segments to `base`, percent-encoding each one.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ClientError::InvalidBaseUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ClientError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Pass 2xx responses through; turn anything else into `ClientError::Status`
/// carrying the server's `error`/`message` field or a truncated body.
pub(crate) async fn expect_success(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["error", "message"]
                .iter()
                .find_map(|k| v.get(k).and_then(serde_json::Value::as_str).map(String::from))
        });
    from_json.unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY_CHARS).collect())
}

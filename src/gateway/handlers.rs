use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};

use super::AppState;
use crate::client::SETUP_TOKEN_HEADER;
use crate::error::InstallError;
use crate::install::{redact_uri, rejection};
use crate::security::tokens_match;
use crate::setup::{DatabaseTestRequest, InstallationStatus, SetupData, SetupResponse};

impl IntoResponse for InstallError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::AlreadyInstalled => StatusCode::CONFLICT,
            Self::Database(_) | Self::Storage(_) | Self::Io(_) => {
                tracing::error!("installation failed: {self}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(rejection(&self))).into_response()
    }
}

fn bad_body(rejection: &JsonRejection) -> Response {
    tracing::warn!("setup request body rejected: {}", rejection.body_text());
    let body = SetupResponse::failure("Request body must be valid JSON");
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn page(rendered: anyhow::Result<String>) -> Response {
    match rendered {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("page render failed: {e:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Page unavailable").into_response()
        }
    }
}

/// GET /health — always public
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let installed = state.installer.is_installed().await.unwrap_or(false);
    Json(serde_json::json!({
        "status": "ok",
        "installed": installed,
    }))
}

/// GET /api/setup/check
pub(super) async fn handle_check(
    State(state): State<AppState>,
) -> Result<Json<InstallationStatus>, InstallError> {
    let installed = state.installer.is_installed().await?;
    Ok(Json(InstallationStatus { installed }))
}

/// Rejects the request unless it carries the configured `X-Setup-Token`.
fn require_setup_token(state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    let Some(expected) = state.setup_token.as_deref() else {
        return Ok(());
    };
    let provided = headers
        .get(SETUP_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if tokens_match(expected, provided) {
        return Ok(());
    }
    tracing::warn!("setup request with invalid setup token");
    let body = SetupResponse::failure("Invalid or missing setup token");
    Err((StatusCode::UNAUTHORIZED, Json(body)).into_response())
}

/// POST /api/setup/test-database — failures are reported in the body, not
/// the status code. Closed once the site is installed.
pub(super) async fn handle_test_database(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<DatabaseTestRequest>, JsonRejection>,
) -> Response {
    if let Err(resp) = require_setup_token(&state, &headers) {
        return resp;
    }
    match state.installer.is_installed().await {
        Ok(false) => {}
        Ok(true) => return InstallError::AlreadyInstalled.into_response(),
        Err(e) => return e.into_response(),
    }

    let Json(request) = match body {
        Ok(body) => body,
        Err(e) => return bad_body(&e),
    };

    tracing::debug!(uri = %redact_uri(&request.uri), "database test requested");
    let response = match state.installer.probe_database(&request.uri).await {
        Ok(report) => SetupResponse::ok(report.message()),
        Err(e) => rejection(&e),
    };
    Json(response).into_response()
}

/// POST /api/setup/install
pub(super) async fn handle_install(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<SetupData>, JsonRejection>,
) -> Response {
    if let Err(resp) = require_setup_token(&state, &headers) {
        return resp;
    }

    let Json(data) = match body {
        Ok(body) => body,
        Err(e) => return bad_body(&e),
    };

    match state.installer.install(&data).await {
        Ok(receipt) => Json(SetupResponse::ok(receipt.message())).into_response(),
        Err(e) => {
            if let Some(errors) = e.field_errors() {
                tracing::warn!(fields = errors.len(), "installation payload rejected");
            }
            e.into_response()
        }
    }
}

/// GET /setup
pub(super) async fn handle_setup_page(State(state): State<AppState>) -> Response {
    page(
        state
            .pages
            .render_setup(&state.setup_defaults, state.setup_token.is_some()),
    )
}

/// GET /
pub(super) async fn handle_home(State(state): State<AppState>) -> Response {
    match state.installer.manifest().await {
        Ok(Some(manifest)) => page(state.pages.render_home(&manifest)),
        Ok(None) => Redirect::temporary("/setup").into_response(),
        Err(e) => e.into_response(),
    }
}

pub(super) async fn handle_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "Not found"})),
    )
}

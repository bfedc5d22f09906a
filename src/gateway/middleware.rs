use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::AppState;

/// How the installation guard treats a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Health,
    SetupPage,
    SetupApi,
    /// Any other `/api/*` path
    Api,
    /// Any other page
    Page,
}

pub fn route_class(path: &str) -> RouteClass {
    let path = path.trim_end_matches('/');
    let under = |prefix: &str| path == prefix || path.starts_with(&format!("{prefix}/"));

    if path == "/health" {
        RouteClass::Health
    } else if under("/api/setup") {
        RouteClass::SetupApi
    } else if under("/api") {
        RouteClass::Api
    } else if under("/setup") {
        RouteClass::SetupPage
    } else {
        RouteClass::Page
    }
}

/// Keeps the site behind `/setup` until installed, and `/setup` out of
/// reach afterwards.
pub(super) async fn require_installation(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let class = route_class(req.uri().path());
    if matches!(class, RouteClass::Health | RouteClass::SetupApi) {
        return next.run(req).await;
    }

    let installed = match state.installer.is_installed().await {
        Ok(installed) => installed,
        Err(e) => {
            tracing::error!("installation state unreadable: {e}");
            let body = serde_json::json!({"error": "Installation state is unavailable"});
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
        }
    };

    match (installed, class) {
        (false, RouteClass::Api) => {
            let body = serde_json::json!({"error": "Site is not installed"});
            (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
        }
        (false, RouteClass::Page) => Redirect::temporary("/setup").into_response(),
        (true, RouteClass::SetupPage) => Redirect::temporary("/").into_response(),
        _ => next.run(req).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_paths() {
        assert_eq!(route_class("/health"), RouteClass::Health);
        assert_eq!(route_class("/setup"), RouteClass::SetupPage);
        assert_eq!(route_class("/setup/"), RouteClass::SetupPage);
        assert_eq!(route_class("/api/setup/install"), RouteClass::SetupApi);
        assert_eq!(route_class("/api/setup"), RouteClass::SetupApi);
        assert_eq!(route_class("/api/users"), RouteClass::Api);
        assert_eq!(route_class("/"), RouteClass::Page);
        assert_eq!(route_class("/blog/hello"), RouteClass::Page);
    }

    #[test]
    fn lookalike_prefixes_are_pages() {
        assert_eq!(route_class("/setup-guide"), RouteClass::Page);
        assert_eq!(route_class("/apiary"), RouteClass::Page);
        assert_eq!(route_class("/api/setupx"), RouteClass::Api);
    }
}

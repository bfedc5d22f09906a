//! Axum-based setup gateway: the installation API, the setup landing page
//! and the site home page, behind an installation guard.
//!
//! - Request body size limits (`server.body_limit_bytes`, 64KB default)
//! - Request timeouts (`server.request_timeout_secs`, 30s default)
//! - Optional `X-Setup-Token` gate on `POST /api/setup/install`

mod handlers;
mod middleware;
mod pages;

pub use middleware::{RouteClass, route_class};
pub use pages::Pages;

use handlers::{
    handle_check, handle_health, handle_home, handle_install, handle_not_found,
    handle_setup_page, handle_test_database,
};

use crate::config::{Config, ServerConfig};
use crate::install::{FileInstaller, Installer};
use crate::setup::SetupData;
use anyhow::{Context, Result};
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub installer: Arc<dyn Installer>,
    /// Required `X-Setup-Token` value for installs, when configured
    pub setup_token: Option<Arc<str>>,
    pub pages: Arc<Pages>,
    /// Draft shown on the setup page before the operator edits anything
    pub setup_defaults: Arc<SetupData>,
}

impl AppState {
    pub fn new(installer: Arc<dyn Installer>) -> Result<Self> {
        Ok(Self {
            installer,
            setup_token: None,
            pages: Arc::new(Pages::new()?),
            setup_defaults: Arc::new(SetupData::default()),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let installer = Arc::new(FileInstaller::from_config(config));
        let mut state = Self::new(installer)?.with_setup_token(config.setup.token.clone());
        state.setup_defaults = Arc::new(config.setup_defaults());
        Ok(state)
    }

    pub fn with_setup_token(mut self, token: Option<String>) -> Self {
        self.setup_token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .map(Arc::from);
        self
    }
}

/// Build the gateway router with the installation guard, body limit and
/// request timeout applied.
pub fn router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(handle_home))
        .route("/health", get(handle_health))
        .route("/setup", get(handle_setup_page))
        .route("/api/setup/check", get(handle_check))
        .route("/api/setup/test-database", post(handle_test_database))
        .route("/api/setup/install", post(handle_install))
        .fallback(handle_not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_installation,
        ))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(server.body_limit_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(server.request_timeout_secs),
        ))
}

/// Run the setup gateway on `server.host:server.port`.
pub async fn run_gateway(config: Config) -> Result<()> {
    // ── Security: refuse public bind without explicit opt-in ──
    if !config.server.is_loopback() && !config.server.allow_public_bind {
        anyhow::bail!(
            "Refusing to bind to {} — the setup gateway would be exposed before an admin exists.\n\
             Fix: use --host 127.0.0.1 (default), or set [server] allow_public_bind = true\n\
             together with [setup] token in config.toml.",
            config.server.host
        );
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server.host))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    run_gateway_with_listener(listener, config, shutdown_signal()).await
}

/// Run the setup gateway from a pre-bound listener until `shutdown` resolves.
pub async fn run_gateway_with_listener<F>(
    listener: tokio::net::TcpListener,
    config: Config,
    shutdown: F,
) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr()?;
    let state = AppState::from_config(&config)?;
    let installed = state.installer.is_installed().await?;

    if !config.server.is_loopback() && state.setup_token.is_none() && !installed {
        tracing::warn!(
            addr = %local_addr,
            "setup gateway is public and no setup token is configured"
        );
    }

    println!("◆ {}", t!("gateway.listening", addr = local_addr));
    println!("  GET  /health");
    println!("  GET  /setup");
    println!("  GET  /api/setup/check");
    println!("  POST /api/setup/test-database");
    println!("  POST /api/setup/install");
    if installed {
        println!("  ✓ {}", t!("gateway.installed"));
    } else if state.setup_token.is_some() {
        println!("  ✓ {}", t!("gateway.token_required"));
    } else {
        println!("  ! {}", t!("gateway.token_disabled"));
    }
    println!("  {}\n", t!("gateway.stop_hint"));

    tracing::info!(addr = %local_addr, installed, "setup gateway started");

    let app = router(state, &config.server);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("setup gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

use thiserror::Error;

use crate::setup::{ErrorMap, SetupStep};

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for the CMS tooling.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide how to surface a failure; binary code continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum CmsError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Setup wizard ─────────────────────────────────────────────────────
    #[error("setup: {0}")]
    Setup(#[from] SetupError),

    // ── Installer ────────────────────────────────────────────────────────
    #[error("install: {0}")]
    Install(#[from] InstallError),

    // ── HTTP clients ─────────────────────────────────────────────────────
    #[error("client: {0}")]
    Client(#[from] ClientError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("validation failed: {0}")]
    Validation(String),
}

// ─── Setup wizard errors ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("unknown field {section}.{field}")]
    UnknownField { section: String, field: String },

    #[error("cannot {action} from the {from} step")]
    InvalidTransition {
        from: SetupStep,
        action: &'static str,
    },
}

// ─── Installer errors ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("site is already installed")]
    AlreadyInstalled,

    #[error("installation payload is invalid ({} field error(s))", .0.len())]
    Invalid(ErrorMap),

    #[error("database check failed: {0}")]
    Database(String),

    #[error("storage failed: {0}")]
    Storage(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl InstallError {
    /// Field-keyed validation errors, when the failure carries any.
    pub fn field_errors(&self) -> Option<&ErrorMap> {
        match self {
            Self::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

// ─── HTTP client errors ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid base URL {0}")]
    InvalidBaseUrl(String),

    #[error("request rejected locally ({} field error(s))", .0.len())]
    Invalid(ErrorMap),

    #[error("local installer: {0}")]
    Installer(#[from] InstallError),
}

impl ClientError {
    pub fn field_errors(&self) -> Option<&ErrorMap> {
        match self {
            Self::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, CmsError>;

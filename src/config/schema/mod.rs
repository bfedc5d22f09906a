mod client;
mod core;
mod database;
mod observability;
mod security;
mod server;
mod setup;
mod smtp;

pub use client::ClientConfig;
pub use core::Config;
pub use database::DatabaseConfig;
pub use observability::ObservabilityConfig;
pub use security::SecurityConfig;
pub use server::ServerConfig;
pub use setup::SetupConfig;
pub use smtp::SmtpConfig;

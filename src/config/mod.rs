pub mod schema;

pub use schema::{
    ClientConfig, Config, DatabaseConfig, ObservabilityConfig, SecurityConfig, ServerConfig,
    SetupConfig, SmtpConfig,
};

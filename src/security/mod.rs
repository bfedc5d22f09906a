pub mod secrets;
pub mod tokens;

pub use secrets::{SecretError, SecretStore};
pub use tokens::{generate_secret, tokens_match};

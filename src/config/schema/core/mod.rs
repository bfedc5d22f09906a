mod env_overrides;
mod loader;
mod secrets;
#[cfg(test)]
mod test_env;
mod types;

pub use types::Config;

#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use modular_cms::app::dispatch::dispatch;
use modular_cms::{Cli, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_init()?;

    // Initialize logging
    let level = config.observability.level().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: Failed to set default subscriber: {e}");
    }

    dispatch(cli, config).await
}

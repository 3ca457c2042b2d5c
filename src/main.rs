//! Service entry point for the clipfetch bot.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use clipfetch::bot::{self, BotContext};
use clipfetch::config::Config;
use clipfetch::sweep;

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG overrides the default level.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;
    tokio::fs::create_dir_all(&config.download_dir)
        .await
        .with_context(|| {
            format!(
                "creating download directory {}",
                config.download_dir.display()
            )
        })?;

    info!(
        dir = %config.download_dir.display(),
        max_file_size = config.max_file_size,
        max_duration_secs = config.max_duration_secs,
        "clipfetch starting"
    );

    // Sweeps once immediately, then on the configured interval.
    let _sweeper = sweep::spawn(
        config.download_dir.clone(),
        config.sweep_interval,
        config.retention,
    );

    let ctx = Arc::new(BotContext::new(config));
    bot::run(ctx).await;

    info!("clipfetch stopped");
    Ok(())
}

//! NeuroPlay Daemon - asynchronous game-completion pipeline.
//!
//! Accepts gameplay submissions over HTTP, processes them on a worker pool
//! and exposes job status for polling.

use anyhow::Result;
use neuroplayd::config::{DaemonConfig, CONFIG_PATH};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("NeuroPlay daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::var("NEUROPLAY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(CONFIG_PATH));
    let config = DaemonConfig::load(&config_path)?;

    info!(
        workers = config.worker.workers,
        queue_capacity = config.intake.queue_capacity,
        "Pipeline configured"
    );

    neuroplayd::server::run(config).await
}

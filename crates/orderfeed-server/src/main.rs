//! Server binary for the order feed.
//!
//! Wires together configuration, the order store, the tick loop, and the
//! gateway, then serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `orderfeed-config.yaml` (or the path given as
//!    the first argument, or `ORDERFEED_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Create the feed controller and seed the store
//! 4. Start the ticker
//! 5. Start the gateway
//! 6. Wait for shutdown, then stop the ticker

mod error;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use orderfeed_core::{ConfigSource, FeedConfig, FeedController};
use orderfeed_gateway::{AppState, ServerConfig};
use tracing::{info, warn};

use crate::error::AppError;

/// Config file used when no path is given.
const DEFAULT_CONFIG_PATH: &str = "orderfeed-config.yaml";

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "ORDERFEED_CONFIG";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, logging, or the gateway fails.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Load configuration.
    let config_path = config_path(std::env::args().nth(1), std::env::var(CONFIG_ENV).ok());
    let (config, source) = FeedConfig::load_or_default(&config_path)?;

    // 2. Initialize structured logging.
    logging::init(&config.logging)?;

    info!("orderfeed-server starting");
    if source == ConfigSource::Defaults {
        warn!(path = %config_path.display(), "Config file not found, using defaults");
    }
    info!(
        path = %config_path.display(),
        host = config.server.host,
        port = config.server.port,
        tick_interval_ms = config.feed.tick_interval_ms,
        seed_count = config.feed.seed_count,
        "Configuration loaded"
    );

    // 3. Create the controller and seed the store.
    let controller = Arc::new(FeedController::from_settings(&config.feed));
    let seeded = controller.seed(config.feed.seed_count);
    info!(seeded, "Store ready");

    // 4. Start the ticker.
    let ticker = orderfeed_core::spawn_ticker(Arc::clone(&controller), config.feed.tick_interval());

    // 5. Start the gateway.
    let state = Arc::new(AppState::new(
        Arc::clone(&controller),
        config.server.allowed_origin.clone(),
    ));
    let server_config = ServerConfig::from(&config.server);
    let gateway =
        orderfeed_gateway::spawn_gateway(&server_config, state, shutdown_signal()).await?;
    info!(
        addr = %gateway.local_addr,
        origin = config.server.allowed_origin,
        "Order feed server started"
    );

    // 6. Serve until shutdown, then stop ticking.
    let served = gateway.task.await;
    ticker.abort();

    let status = controller.status();
    info!(
        orders = status.orders,
        ticks = status.ticks,
        "orderfeed-server stopped"
    );

    served??;
    Ok(())
}

/// Pick the config file: first CLI argument, then the environment, then
/// the default name in the working directory.
fn config_path(arg: Option<String>, env: Option<String>) -> PathBuf {
    arg.or(env)
        .filter(|p| !p.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Resolves on `Ctrl-C`. If the signal cannot be installed, never resolves.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Failed to listen for Ctrl-C, running until killed");
            std::future::pending::<()>().await;
        }
    }
}

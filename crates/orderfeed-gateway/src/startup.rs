//! Gateway startup helper for embedding in the server binary.
//!
//! Provides [`spawn_gateway`] which binds the listener eagerly and then
//! serves on a background Tokio task, so bind failures surface at
//! startup instead of inside the task.
//!
//! # Usage
//!
//! ```rust,ignore
//! use orderfeed_gateway::{spawn_gateway, AppState, ServerConfig};
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState::new(controller, "*"));
//! let gateway = spawn_gateway(&ServerConfig::default(), state, shutdown).await?;
//! // The server is now running on gateway.local_addr.
//! gateway.task.await??;
//! ```

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::server::{bind, serve, ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the gateway.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// A gateway running on a background task.
#[derive(Debug)]
pub struct GatewayHandle {
    /// The address actually bound. Differs from the config when port `0`
    /// was requested.
    pub local_addr: SocketAddr,
    /// The serving task. Completes after the shutdown future resolves.
    pub task: JoinHandle<Result<(), ServerError>>,
}

/// Bind the gateway and serve it on a background Tokio task.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the listener cannot be bound.
pub async fn spawn_gateway<F>(
    config: &ServerConfig,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<GatewayHandle, StartupError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = bind(config).await?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("local address unavailable: {e}")))?;

    let task = tokio::spawn(async move {
        let result = serve(listener, state, shutdown).await;
        if let Err(e) = &result {
            error!(error = %e, "Gateway server exited with error");
        }
        result
    });

    info!(%local_addr, "Gateway spawned on background task");

    Ok(GatewayHandle { local_addr, task })
}

//! Shared application state for the gateway.

use std::sync::Arc;

use orderfeed_core::FeedController;

/// State shared by every handler and `WebSocket` session.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The feed every session talks to.
    pub controller: Arc<FeedController>,
    /// Allowed CORS origin. `*` allows any origin.
    pub allowed_origin: String,
}

impl AppState {
    /// Create state over a running controller.
    pub fn new(controller: Arc<FeedController>, allowed_origin: impl Into<String>) -> Self {
        Self {
            controller,
            allowed_origin: allowed_origin.into(),
        }
    }
}

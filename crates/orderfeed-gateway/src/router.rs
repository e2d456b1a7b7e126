//! Axum router construction for the gateway.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS restricted to the configured origin.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Origin value that allows every origin.
pub const ANY_ORIGIN: &str = "*";

/// Build the complete Axum router for the gateway.
///
/// The router includes:
/// - `GET /ws` -- `WebSocket` feed session
/// - `GET /health` -- liveness probe
/// - `GET /api/status` -- feed counters
///
/// Any other path answers `404` with a JSON error body.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.allowed_origin);

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_feed))
        // REST API
        .route("/health", get(handlers::health))
        .route("/api/status", get(handlers::status))
        .fallback(handlers::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy for `origin`: `*` allows any origin, anything else is
/// matched exactly. An origin that is not a valid header value allows
/// no cross-origin access.
pub fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == ANY_ORIGIN {
        return cors.allow_origin(Any);
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => cors.allow_origin(AllowOrigin::list([value])),
        Err(e) => {
            warn!(origin, error = %e, "Invalid allowed origin, refusing cross-origin requests");
            cors
        }
    }
}

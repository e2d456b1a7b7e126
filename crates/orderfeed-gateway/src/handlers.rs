//! REST endpoint handlers for the gateway.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness probe |
//! | `GET` | `/api/status` | Order, connection, and tick counters |

use std::sync::Arc;

use axum::extract::State;
use axum::http::Uri;
use axum::Json;
use orderfeed_types::FeedStatus;
use serde_json::Value;

use crate::error::GatewayError;
use crate::state::AppState;

/// Liveness probe.
pub async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Current feed counters.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<FeedStatus> {
    Json(state.controller.status())
}

/// Fallback for unknown routes.
pub async fn not_found(uri: Uri) -> GatewayError {
    GatewayError::NotFound(uri.path().to_owned())
}

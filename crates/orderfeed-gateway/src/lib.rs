//! Gateway server for the order feed.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws`) speaking the feed's event protocol:
//!   clients send `getOrders`, and receive `orderUpdate` answers plus a
//!   `newOrder` hint every time the feed inserts an order
//! - **REST endpoints** for liveness (`/health`) and feed counters
//!   (`/api/status`)
//!
//! # Architecture
//!
//! Every session registers with the shared
//! [`FeedController`](orderfeed_core::FeedController) and holds its own
//! broadcast receiver. Queries are answered on the blocking thread pool
//! so a large sort never stalls the runtime, the ticker, or other
//! sessions.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::GatewayError;
pub use router::build_router;
pub use server::{bind, serve, start_server, ServerConfig, ServerError};
pub use startup::{spawn_gateway, GatewayHandle, StartupError};
pub use state::AppState;

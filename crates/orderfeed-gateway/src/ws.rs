//! `WebSocket` handler for the order feed protocol.
//!
//! Clients connect to `GET /ws` and exchange JSON text frames of the form
//! `{"event": ..., "data": ...}` (see [`FeedEvent`]):
//!
//! - a `getOrders` frame is answered with one `orderUpdate` frame
//! - every tick pushes a payload-free `newOrder` frame
//!
//! Each session holds its own [`broadcast::Receiver`]. A session that
//! falls behind still gets a single `newOrder`, since every signal means
//! the same thing. Malformed frames are logged and ignored; they never
//! end the session.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use orderfeed_core::{FeedController, FeedSignal};
use orderfeed_types::{ConnectionId, FeedEvent, QueryRequest, QueryResponse};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::state::AppState;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    ClientClosed,
    SendFailed,
    SocketError,
    FeedClosed,
}

impl SessionEnd {
    const fn as_str(self) -> &'static str {
        match self {
            Self::ClientClosed => "client closed",
            Self::SendFailed => "send failed",
            Self::SocketError => "socket error",
            Self::FeedClosed => "feed closed",
        }
    }
}

/// Upgrade an HTTP request to a `WebSocket` feed session.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_feed(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Handle the session lifecycle: register, serve, and always deregister.
async fn handle_ws(socket: WebSocket, state: Arc<AppState>) {
    let id = ConnectionId::new();
    let controller = Arc::clone(&state.controller);
    let rx = controller.on_connect(id);

    let end = run_session(socket, &controller, id, rx).await;

    debug!(connection = %id, reason = end.as_str(), "WebSocket session ended");
    controller.on_disconnect(id);
}

async fn run_session(
    mut socket: WebSocket,
    controller: &Arc<FeedController>,
    id: ConnectionId,
    mut rx: broadcast::Receiver<FeedSignal>,
) -> SessionEnd {
    loop {
        tokio::select! {
            // A tick inserted a new order.
            signal = rx.recv() => {
                match signal {
                    Ok(FeedSignal::NewOrder) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(connection = %id, skipped, "Session lagged, collapsing signals");
                    }
                    Err(RecvError::Closed) => return SessionEnd::FeedClosed,
                }
                if send_event(&mut socket, &FeedEvent::NewOrder).await.is_err() {
                    return SessionEnd::SendFailed;
                }
            }
            // Something arrived from the client.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let Some(request) = decode_request(id, text.as_str()) else {
                            continue;
                        };
                        let response = match answer(controller, id, request).await {
                            Ok(response) => response,
                            Err(e) => {
                                warn!(connection = %id, error = %e, "Query failed, no reply sent");
                                continue;
                            }
                        };
                        let reply = FeedEvent::OrderUpdate(response);
                        if send_event(&mut socket, &reply).await.is_err() {
                            return SessionEnd::SendFailed;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            return SessionEnd::SendFailed;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => return SessionEnd::ClientClosed,
                    Some(Ok(Message::Binary(_))) => {
                        debug!(connection = %id, "Ignoring binary frame");
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Err(e)) => {
                        debug!(connection = %id, error = %e, "WebSocket error");
                        return SessionEnd::SocketError;
                    }
                }
            }
        }
    }
}

/// Parse a client frame. Anything but a well-formed `getOrders` yields `None`.
fn decode_request(id: ConnectionId, text: &str) -> Option<QueryRequest> {
    match serde_json::from_str::<FeedEvent>(text) {
        Ok(FeedEvent::GetOrders(request)) => Some(request),
        Ok(other) => {
            warn!(connection = %id, event = other.name(), "Ignoring server-only event from client");
            None
        }
        Err(e) => {
            warn!(connection = %id, error = %e, "Ignoring malformed frame");
            None
        }
    }
}

/// Run one query on the blocking pool.
async fn answer(
    controller: &Arc<FeedController>,
    id: ConnectionId,
    request: QueryRequest,
) -> Result<QueryResponse, GatewayError> {
    let controller = Arc::clone(controller);
    let response =
        tokio::task::spawn_blocking(move || controller.handle_query(id, &request)).await?;
    Ok(response)
}

/// Encode an event into a text frame.
fn encode(event: &FeedEvent) -> Result<Message, GatewayError> {
    let json = serde_json::to_string(event)?;
    Ok(Message::Text(json.into()))
}

/// Send an event. An event that cannot be encoded is logged and dropped;
/// only a transport failure is an error.
async fn send_event(socket: &mut WebSocket, event: &FeedEvent) -> Result<(), axum::Error> {
    match encode(event) {
        Ok(msg) => socket.send(msg).await,
        Err(e) => {
            warn!(event = event.name(), error = %e, "Failed to encode event");
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decodes_get_orders() {
        let text = r#"{"event":"getOrders","data":{"startRow":0,"endRow":50,"sortModel":[{"colId":"price","sort":"desc"}]}}"#;
        let request = decode_request(ConnectionId::new(), text).unwrap();
        assert_eq!(request.end_row, 50);
        assert_eq!(request.sort_model.len(), 1);
    }

    #[test]
    fn rejects_garbage_and_server_events() {
        let id = ConnectionId::new();
        assert!(decode_request(id, "not json").is_none());
        assert!(decode_request(id, r#"{"event":"newOrder"}"#).is_none());
        assert!(decode_request(id, r#"{"event":"launchRockets","data":{}}"#).is_none());
    }

    #[test]
    fn new_order_frame_has_no_data() {
        let Message::Text(text) = encode(&FeedEvent::NewOrder).unwrap() else {
            return;
        };
        let json: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(json, serde_json::json!({ "event": "newOrder" }));
    }
}

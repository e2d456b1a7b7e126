//! Integration tests for the gateway endpoints.
//!
//! REST tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. The `WebSocket` tests bind an ephemeral port and
//! talk to the gateway through `tokio-tungstenite`.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use orderfeed_core::FeedController;
use orderfeed_gateway::{build_router, spawn_gateway, AppState, ServerConfig};
use orderfeed_store::{FactorySettings, OrderFactory, OrderStore};
use orderfeed_types::Order;
use rust_decimal_macros::dec;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn make_controller() -> Arc<FeedController> {
    controller_with_capacity(16)
}

fn controller_with_capacity(capacity: usize) -> Arc<FeedController> {
    let factory = OrderFactory::new(FactorySettings {
        rng_seed: Some(1),
        ..FactorySettings::default()
    });
    Arc::new(FeedController::new(Arc::new(OrderStore::new()), factory, capacity))
}

fn make_state(origin: &str) -> Arc<AppState> {
    Arc::new(AppState::new(make_controller(), origin))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Next text frame as JSON, skipping control frames.
async fn next_json(ws: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn send_json(ws: &mut Client, value: &Value) {
    ws.send(Message::text(value.to_string())).await.unwrap();
}

fn get_orders(start: i64, end: i64) -> Value {
    serde_json::json!({
        "event": "getOrders",
        "data": {
            "startRow": start,
            "endRow": end,
            "sortModel": [{ "colId": "price", "sort": "asc" }],
            "filterModel": {}
        }
    })
}

async fn wait_for_connections(controller: &FeedController, expected: usize) {
    for _ in 0..200 {
        if controller.connection_count() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(controller.connection_count(), expected);
}

// =========================================================================
// REST
// =========================================================================

#[tokio::test]
async fn test_health() {
    let router = build_router(make_state("*"));

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_status_reports_counters() {
    let state = make_state("*");
    state.controller.seed(5);
    state.controller.tick().unwrap();
    let router = build_router(Arc::clone(&state));

    let response = router
        .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["orders"], 6);
    assert_eq!(json["ticks"], 1);
    assert_eq!(json["connections"], 0);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let router = build_router(make_state("*"));

    let response = router
        .oneshot(Request::get("/api/nothing").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_cors_any_origin() {
    let router = build_router(make_state("*"));

    let response = router
        .oneshot(
            Request::get("/health")
                .header("origin", "http://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let allowed = response.headers().get("access-control-allow-origin").unwrap();
    assert_eq!(allowed, "*");
}

#[tokio::test]
async fn test_cors_exact_origin() {
    let state = make_state("http://localhost:3000");

    let response = build_router(Arc::clone(&state))
        .oneshot(
            Request::get("/health")
                .header("origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let allowed = response.headers().get("access-control-allow-origin").unwrap();
    assert_eq!(allowed, "http://localhost:3000");

    let response = build_router(state)
        .oneshot(
            Request::get("/health")
                .header("origin", "http://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.headers().get("access-control-allow-origin").is_none());
}

// =========================================================================
// WebSocket
// =========================================================================

#[tokio::test]
async fn test_ws_query_signal_and_disconnect() {
    let controller = make_controller();
    for price in [dec!(30), dec!(10), dec!(20)] {
        controller.store().insert(Order::new(price, Utc::now()));
    }
    let state = Arc::new(AppState::new(Arc::clone(&controller), "*"));
    let config = ServerConfig {
        host: String::from("127.0.0.1"),
        port: 0,
    };
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let gateway = spawn_gateway(&config, state, async move {
        let _ = stop_rx.await;
    })
    .await
    .unwrap();

    let url = format!("ws://{}/ws", gateway.local_addr);
    let (mut ws, _) = tokio_tungstenite::connect_async(url).await.unwrap();

    // Query: sorted ascending, first two rows, full count.
    send_json(&mut ws, &get_orders(0, 2)).await;
    let update = next_json(&mut ws).await;
    assert_eq!(update["event"], "orderUpdate");
    assert_eq!(update["data"]["lastRow"], 3);
    let prices: Vec<&Value> = update["data"]["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| &row["price"])
        .collect();
    assert_eq!(prices, vec![&serde_json::json!(10.0), &serde_json::json!(20.0)]);
    assert_eq!(controller.connection_count(), 1);

    // A tick pushes a payload-free newOrder.
    controller.tick().unwrap();
    let signal = next_json(&mut ws).await;
    assert_eq!(signal, serde_json::json!({ "event": "newOrder" }));

    // A malformed frame is ignored and the session keeps working.
    ws.send(Message::text("definitely not json")).await.unwrap();
    send_json(&mut ws, &get_orders(0, 100)).await;
    let update = next_json(&mut ws).await;
    assert_eq!(update["event"], "orderUpdate");
    assert_eq!(update["data"]["lastRow"], 4);
    assert_eq!(update["data"]["rows"].as_array().unwrap().len(), 4);

    ws.close(None).await.unwrap();
    wait_for_connections(&controller, 0).await;

    stop_tx.send(()).unwrap();
    gateway.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_ws_every_client_gets_the_signal() {
    let controller = make_controller();
    let state = Arc::new(AppState::new(Arc::clone(&controller), "*"));
    let config = ServerConfig {
        host: String::from("127.0.0.1"),
        port: 0,
    };
    let gateway = spawn_gateway(&config, state, std::future::pending::<()>())
        .await
        .unwrap();

    let url = format!("ws://{}/ws", gateway.local_addr);
    let (mut first, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();
    let (mut second, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();
    wait_for_connections(&controller, 2).await;

    controller.tick().unwrap();

    assert_eq!(next_json(&mut first).await["event"], "newOrder");
    assert_eq!(next_json(&mut second).await["event"], "newOrder");

    // Both sessions see the new order.
    send_json(&mut second, &get_orders(0, 10)).await;
    let update = next_json(&mut second).await;
    assert_eq!(update["data"]["lastRow"], 1);

    drop(first);
    wait_for_connections(&controller, 1).await;
    gateway.task.abort();
}

#[tokio::test]
async fn test_ws_lagged_session_still_gets_new_order() {
    let controller = controller_with_capacity(1);
    let state = Arc::new(AppState::new(Arc::clone(&controller), "*"));
    let config = ServerConfig {
        host: String::from("127.0.0.1"),
        port: 0,
    };
    let gateway = spawn_gateway(&config, state, std::future::pending::<()>())
        .await
        .unwrap();

    let url = format!("ws://{}/ws", gateway.local_addr);
    let (mut ws, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    wait_for_connections(&controller, 1).await;

    // No await between ticks: the session cannot drain its one-slot
    // channel, so it falls behind.
    for _ in 0..5 {
        controller.tick().unwrap();
    }

    assert_eq!(next_json(&mut ws).await["event"], "newOrder");
    let mut signals: u32 = 1;

    // The session is still serving queries and sees every order.
    send_json(&mut ws, &get_orders(0, 10)).await;
    let update = loop {
        let frame = next_json(&mut ws).await;
        if frame["event"] == "orderUpdate" {
            break frame;
        }
        assert_eq!(frame["event"], "newOrder");
        signals = signals.saturating_add(1);
    };
    assert_eq!(update["data"]["lastRow"], 5);
    assert!(signals < 5, "missed signals collapse, got {signals}");
    assert_eq!(controller.connection_count(), 1);

    gateway.task.abort();
}

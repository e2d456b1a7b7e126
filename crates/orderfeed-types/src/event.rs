//! Event envelopes exchanged over the client socket.
//!
//! Every text frame is a JSON object `{"event": <name>, "data": <payload>}`.
//! The `newOrder` signal carries no `data` at all: it only tells clients
//! that fresher data exists and they should query again.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::query::{QueryRequest, QueryResponse};

/// A named event travelling between a client and the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "data")]
#[ts(export, export_to = "bindings/")]
pub enum FeedEvent {
    /// Client asks for a page of orders.
    #[serde(rename = "getOrders")]
    GetOrders(QueryRequest),
    /// Server answers one `getOrders` request.
    #[serde(rename = "orderUpdate")]
    OrderUpdate(QueryResponse),
    /// Server tells every client that a new order was inserted.
    #[serde(rename = "newOrder")]
    NewOrder,
}

impl FeedEvent {
    /// The wire name of this event.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GetOrders(_) => "getOrders",
            Self::OrderUpdate(_) => "orderUpdate",
            Self::NewOrder => "newOrder",
        }
    }
}

/// Point-in-time counters describing the running feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FeedStatus {
    /// Orders currently held in the store.
    #[ts(type = "number")]
    pub orders: u64,
    /// Clients currently connected.
    #[ts(type = "number")]
    pub connections: u64,
    /// Ticks completed since startup.
    #[ts(type = "number")]
    pub ticks: u64,
}

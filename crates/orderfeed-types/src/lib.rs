//! Shared type definitions for the order feed.
//!
//! This crate is the single source of truth for the order record and the
//! wire types exchanged with grid clients. Wire types flow downstream to
//! `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for orders and connections
//! - [`order`] -- The immutable [`Order`] record and its [`OrderRow`] projection
//! - [`query`] -- Paging/sort/filter request and response payloads
//! - [`event`] -- Socket event envelope and feed status counters

pub mod event;
pub mod ids;
pub mod order;
pub mod query;

// Re-export all public types at crate root for convenience.
pub use event::{FeedEvent, FeedStatus};
pub use ids::{ConnectionId, OrderId};
pub use order::{Order, OrderRow, PRICE_SCALE};
pub use query::{FilterModel, QueryRequest, QueryResponse, SortModel};

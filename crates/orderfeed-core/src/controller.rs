//! The feed controller: store ownership, queries, ticks, and fan-out.
//!
//! [`FeedController`] sits between the connection layer and the data.
//! Each client query takes a store snapshot and runs it through
//! [`orderfeed_query::run_query`] with no lock held. Each tick inserts one
//! new order and only then broadcasts a payload-free [`FeedSignal::NewOrder`],
//! so a client can never be told about an order it cannot yet query.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Instant;

use chrono::{DateTime, Utc};
use orderfeed_store::{OrderFactory, OrderSource, OrderStore};
use orderfeed_types::{ConnectionId, FeedStatus, OrderId, QueryRequest, QueryResponse};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::FeedSettings;

/// Capacity of the broadcast channel when none is configured.
///
/// A subscriber that falls more than this many signals behind receives
/// [`broadcast::error::RecvError::Lagged`]; since every signal means the
/// same thing, the subscriber loses nothing by skipping ahead.
pub const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// Notification fanned out to every connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSignal {
    /// At least one new order has been inserted. Re-query to see it.
    NewOrder,
}

/// Errors that can occur during a tick.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The generator could not produce an order.
    #[error("order generation failed at {at}")]
    Generation {
        /// When the tick fired.
        at: DateTime<Utc>,
    },
}

/// What a successful tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// The order inserted by this tick.
    pub order_id: OrderId,
    /// Number of subscribers the signal reached.
    pub receivers: usize,
}

/// Orchestrates the order store, the query engine and client fan-out.
pub struct FeedController {
    store: Arc<OrderStore>,
    source: Mutex<Box<dyn OrderSource>>,
    tx: broadcast::Sender<FeedSignal>,
    connections: RwLock<BTreeSet<ConnectionId>>,
    ticks: AtomicU64,
}

impl FeedController {
    /// Create a controller over an existing store.
    pub fn new<S>(store: Arc<OrderStore>, source: S, broadcast_capacity: usize) -> Self
    where
        S: OrderSource + 'static,
    {
        let (tx, _) = broadcast::channel(broadcast_capacity.max(1));
        Self {
            store,
            source: Mutex::new(Box::new(source)),
            tx,
            connections: RwLock::new(BTreeSet::new()),
            ticks: AtomicU64::new(0),
        }
    }

    /// Create a controller with an empty store from feed settings.
    pub fn from_settings(settings: &FeedSettings) -> Self {
        Self::new(
            Arc::new(OrderStore::new()),
            OrderFactory::new(settings.factory_settings()),
            settings.broadcast_capacity,
        )
    }

    /// The underlying store.
    pub const fn store(&self) -> &Arc<OrderStore> {
        &self.store
    }

    /// Populate the store with `count` back-dated orders.
    ///
    /// Returns the number of orders inserted.
    pub fn seed(&self, count: usize) -> usize {
        info!(count, "Inserting seed orders into the store");
        let started = Instant::now();
        let now = Utc::now();

        let inserted = {
            let mut source = self.source();
            self.store.seed(count, || source.historical(now))
        };

        info!(
            inserted,
            total = self.store.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "Seed insertion complete"
        );
        inserted
    }

    /// Register a client and return its signal receiver.
    ///
    /// The receiver observes every signal broadcast after this call.
    pub fn on_connect(&self, id: ConnectionId) -> broadcast::Receiver<FeedSignal> {
        let rx = self.tx.subscribe();
        let total = {
            let mut connections = self.connections_mut();
            connections.insert(id);
            connections.len()
        };
        info!(connection = %id, connections = total, "Client connected");
        rx
    }

    /// Forget a client. Unknown ids are ignored.
    pub fn on_disconnect(&self, id: ConnectionId) {
        let (removed, total) = {
            let mut connections = self.connections_mut();
            let removed = connections.remove(&id);
            (removed, connections.len())
        };
        if removed {
            info!(connection = %id, connections = total, "Client disconnected");
        } else {
            debug!(connection = %id, "Disconnect for unknown client ignored");
        }
    }

    /// Answer one client's query against a fresh snapshot.
    pub fn handle_query(&self, id: ConnectionId, request: &QueryRequest) -> QueryResponse {
        let started = Instant::now();
        let snapshot = self.store.snapshot();
        let scanned = snapshot.len();

        let response = orderfeed_query::run_query(snapshot, request);

        debug!(
            connection = %id,
            start_row = request.start_row,
            end_row = request.end_row,
            filters = request.filter_model.len(),
            sort_keys = request.sort_model.len(),
            scanned,
            rows = response.rows.len(),
            total = response.total_matching_count,
            elapsed_us = started.elapsed().as_micros(),
            "Query answered"
        );
        response
    }

    /// Run one tick stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Generation`] if no order could be generated.
    /// Nothing is inserted or broadcast in that case.
    pub fn tick(&self) -> Result<TickOutcome, TickError> {
        self.tick_at(Utc::now())
    }

    /// Run one tick stamped with `now`.
    ///
    /// The new order is inserted before the signal is sent.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Generation`] if no order could be generated.
    pub fn tick_at(&self, now: DateTime<Utc>) -> Result<TickOutcome, TickError> {
        let order = self
            .source()
            .live(now)
            .ok_or(TickError::Generation { at: now })?;
        self.store.insert(order);

        let tick = self.ticks.fetch_add(1, Ordering::AcqRel).saturating_add(1);
        // send fails only when nobody is subscribed, which is normal.
        let receivers = self.tx.send(FeedSignal::NewOrder).unwrap_or(0);

        debug!(tick, order = %order.id(), price = %order.price(), receivers, "Broadcasted new order");
        Ok(TickOutcome {
            tick,
            order_id: order.id(),
            receivers,
        })
    }

    /// Number of connected clients.
    pub fn connection_count(&self) -> usize {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Current counters.
    pub fn status(&self) -> FeedStatus {
        FeedStatus {
            orders: to_u64(self.store.len()),
            connections: to_u64(self.connection_count()),
            ticks: self.ticks.load(Ordering::Acquire),
        }
    }

    fn source(&self) -> MutexGuard<'_, Box<dyn OrderSource>> {
        self.source.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn connections_mut(&self) -> std::sync::RwLockWriteGuard<'_, BTreeSet<ConnectionId>> {
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for FeedController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedController")
            .field("orders", &self.store.len())
            .field("connections", &self.connection_count())
            .field("ticks", &self.ticks.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

fn to_u64(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

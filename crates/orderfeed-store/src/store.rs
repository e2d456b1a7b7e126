//! The authoritative in-memory order table.
//!
//! [`OrderStore`] exposes exactly two ways in: [`insert`](OrderStore::insert)
//! and [`snapshot`](OrderStore::snapshot). There is no borrowing iterator,
//! so no caller can observe the table while a writer is halfway through
//! changing it.
//!
//! # Design
//!
//! - **Insert-only**: orders are never edited after insertion. An insert
//!   with an existing id replaces the old entry.
//! - **Copy-out reads**: a snapshot is an owned `Vec` copied under the
//!   read lock. Inserts after the call returns never show up in it.
//! - **Key order**: iteration follows [`OrderId`] order. Ids are UUID v7,
//!   so this is creation order for orders built with fresh ids.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use orderfeed_types::{Order, OrderId};
use tracing::debug;

/// Thread-safe table of every order the feed has produced.
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: RwLock<BTreeMap<OrderId, Order>>,
}

impl OrderStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            orders: RwLock::new(BTreeMap::new()),
        }
    }

    /// Insert an order keyed by its id, replacing any previous entry.
    pub fn insert(&self, order: Order) {
        self.write().insert(order.id(), order);
    }

    /// Copy out every order present at the moment of the call.
    pub fn snapshot(&self) -> Vec<Order> {
        self.read().values().copied().collect()
    }

    /// Number of orders currently stored.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the store holds no orders.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Look up a single order.
    pub fn get(&self, id: OrderId) -> Option<Order> {
        self.read().get(&id).copied()
    }

    /// Bulk-populate the store with `count` generated orders.
    ///
    /// Orders are generated before the write lock is taken, then inserted
    /// in one batch. Generator calls that return `None` are skipped.
    /// Returns the number of orders inserted.
    pub fn seed<F>(&self, count: usize, mut generate: F) -> usize
    where
        F: FnMut() -> Option<Order>,
    {
        let batch: Vec<Order> = (0..count).filter_map(|_| generate()).collect();
        let skipped = count.saturating_sub(batch.len());
        let inserted = batch.len();

        let mut orders = self.write();
        orders.extend(batch.into_iter().map(|order| (order.id(), order)));
        drop(orders);

        debug!(inserted, skipped, "Store seeded");
        inserted
    }

    // Poisoning is ignored: every mutation leaves the map consistent.
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<OrderId, Order>> {
        self.orders.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<OrderId, Order>> {
        self.orders.write().unwrap_or_else(PoisonError::into_inner)
    }
}

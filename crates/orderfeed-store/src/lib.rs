//! In-memory order storage for the order feed.
//!
//! # Modules
//!
//! - [`store`] -- [`OrderStore`], the thread-safe insert/snapshot table
//!   shared by the tick loop and every query handler.
//! - [`factory`] -- the [`OrderSource`] trait and [`OrderFactory`], the
//!   random order generator used for startup seeding and for each tick.
//!
//! # Usage
//!
//! ```
//! use chrono::Utc;
//! use orderfeed_store::{FactorySettings, OrderFactory, OrderSource, OrderStore};
//!
//! let store = OrderStore::new();
//! let mut factory = OrderFactory::new(FactorySettings {
//!     rng_seed: Some(7),
//!     ..FactorySettings::default()
//! });
//!
//! let now = Utc::now();
//! store.seed(100, || factory.historical(now));
//! assert_eq!(store.len(), 100);
//!
//! let page = store.snapshot();
//! assert_eq!(page.len(), 100);
//! ```

pub mod factory;
pub mod store;

// Re-export primary types at crate root.
pub use factory::{
    FactorySettings, OrderFactory, OrderSource, DEFAULT_MAX_PRICE, DEFAULT_SEED_WINDOW_MS,
};
pub use store::OrderStore;

//! Synthetic order generation.
//!
//! The feed has no upstream exchange: it invents orders. [`OrderSource`]
//! is the seam between the feed and whatever invents them; [`OrderFactory`]
//! is the random implementation. Startup seeding uses
//! [`OrderSource::historical`], which back-dates each order by a random
//! amount inside the configured window. Each tick uses
//! [`OrderSource::live`], stamped with the current time.

use chrono::{DateTime, Duration, Utc};
use orderfeed_types::Order;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default upper bound (exclusive) for generated prices.
pub const DEFAULT_MAX_PRICE: f64 = 1000.0;

/// Default back-dating window for seeded orders, about 115 days.
pub const DEFAULT_SEED_WINDOW_MS: u64 = 10_000_000_000;

/// Parameters for an [`OrderFactory`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorySettings {
    /// Prices are drawn uniformly from `[0, max_price)`.
    pub max_price: f64,
    /// Seeded timestamps fall within this many milliseconds before now.
    pub seed_window_ms: u64,
    /// Fixed RNG seed for reproducible data. `None` uses OS entropy.
    pub rng_seed: Option<u64>,
}

impl Default for FactorySettings {
    fn default() -> Self {
        Self {
            max_price: DEFAULT_MAX_PRICE,
            seed_window_ms: DEFAULT_SEED_WINDOW_MS,
            rng_seed: None,
        }
    }
}

/// Produces new orders for seeding and for ticks.
///
/// Both methods return `None` when no order can be produced; callers
/// skip that order rather than fail.
pub trait OrderSource: Send {
    /// An order stamped at `now`.
    fn live(&mut self, now: DateTime<Utc>) -> Option<Order>;

    /// An order stamped at some moment before `now`.
    fn historical(&mut self, now: DateTime<Utc>) -> Option<Order>;
}

/// Random order generator.
#[derive(Debug)]
pub struct OrderFactory {
    rng: StdRng,
    max_price: f64,
    seed_window_ms: u64,
}

impl OrderFactory {
    /// Build a factory from settings.
    pub fn new(settings: FactorySettings) -> Self {
        let rng = settings
            .rng_seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            rng,
            max_price: settings.max_price,
            seed_window_ms: settings.seed_window_ms,
        }
    }

    fn random_price(&mut self) -> f64 {
        if self.max_price > 0.0 {
            self.rng.random_range(0.0..self.max_price)
        } else {
            0.0
        }
    }
}

impl OrderSource for OrderFactory {
    /// An order with a random price, stamped at `now`.
    ///
    /// Returns `None` if the price cannot be represented.
    fn live(&mut self, now: DateTime<Utc>) -> Option<Order> {
        let price = self.random_price();
        Order::from_f64_price(price, now)
    }

    /// An order with a random price and a timestamp up to the seed window
    /// before `now`.
    ///
    /// Returns `None` if the back-dated timestamp is out of range.
    fn historical(&mut self, now: DateTime<Utc>) -> Option<Order> {
        let price = self.random_price();
        let offset_ms = if self.seed_window_ms == 0 {
            0
        } else {
            self.rng.random_range(0..self.seed_window_ms)
        };
        let offset = Duration::try_milliseconds(i64::try_from(offset_ms).ok()?)?;
        let timestamp = now.checked_sub_signed(offset)?;
        Order::from_f64_price(price, timestamp)
    }
}

impl Default for OrderFactory {
    fn default() -> Self {
        Self::new(FactorySettings::default())
    }
}

//! Feed orchestration for the order feed.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `orderfeed-config.yaml` into
//!   strongly-typed structs.
//! - [`controller`] -- [`FeedController`]: connection bookkeeping, query
//!   dispatch, ticks, and the `newOrder` broadcast channel.
//! - [`ticker`] -- The periodic task that drives [`FeedController::tick`].
//!
//! [`FeedController`]: controller::FeedController
//! [`FeedController::tick`]: controller::FeedController::tick

pub mod config;
pub mod controller;
pub mod ticker;

pub use config::{
    ConfigError, ConfigSource, FeedConfig, FeedSettings, LogFormat, LoggingConfig, ServerSettings,
};
pub use controller::{
    FeedController, FeedSignal, TickError, TickOutcome, DEFAULT_BROADCAST_CAPACITY,
};
pub use ticker::{run_ticker, spawn_ticker};

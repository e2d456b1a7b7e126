//! The order record and its wire projection.
//!
//! An [`Order`] is immutable once built: the constructor normalizes the
//! price to two fractional digits and the timestamp to millisecond
//! precision, and no setter exists. Updating the feed means creating new
//! orders, never editing old ones.

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::OrderId;

/// Number of fractional digits every stored price carries.
pub const PRICE_SCALE: u32 = 2;

/// Number of fractional-second digits kept on order timestamps.
pub const TIMESTAMP_SUBSEC_DIGITS: u16 = 3;

/// One tradable order held by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    price: Decimal,
    timestamp: DateTime<Utc>,
}

impl Order {
    /// Create an order with a fresh identifier.
    pub fn new(price: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self::with_id(OrderId::new(), price, timestamp)
    }

    /// Create an order with a caller-chosen identifier.
    ///
    /// The price is rounded half-up to [`PRICE_SCALE`] digits and always
    /// carries exactly that scale, so `20` is stored as `20.00`.
    pub fn with_id(id: OrderId, price: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            price: normalize_price(price),
            timestamp: timestamp.trunc_subsecs(TIMESTAMP_SUBSEC_DIGITS),
        }
    }

    /// Create an order from a raw floating point price.
    ///
    /// Returns `None` when the price is NaN or infinite.
    pub fn from_f64_price(price: f64, timestamp: DateTime<Utc>) -> Option<Self> {
        Decimal::from_f64(price).map(|p| Self::new(p, timestamp))
    }

    /// The order's identifier.
    pub const fn id(&self) -> OrderId {
        self.id
    }

    /// The normalized price.
    pub const fn price(&self) -> Decimal {
        self.price
    }

    /// The moment the order was created.
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

fn normalize_price(price: Decimal) -> Decimal {
    let mut rounded = price.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(PRICE_SCALE);
    rounded
}

/// An order as it appears in an `orderUpdate` payload.
///
/// `price` travels as a JSON number and `date` as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OrderRow {
    /// The order's identifier.
    pub id: OrderId,
    /// Price with two fractional digits.
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub price: Decimal,
    /// Creation time.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub date: DateTime<Utc>,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            price: order.price,
            date: order.timestamp,
        }
    }
}

impl From<Order> for OrderRow {
    fn from(order: Order) -> Self {
        Self::from(&order)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use super::*;

    fn at_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    #[test]
    fn whole_prices_gain_two_decimals() {
        let order = Order::new(dec!(20), at_noon());
        assert_eq!(order.price().to_string(), "20.00");
    }

    #[test]
    fn prices_round_half_up() {
        assert_eq!(Order::new(dec!(10.125), at_noon()).price(), dec!(10.13));
        assert_eq!(Order::new(dec!(10.124), at_noon()).price(), dec!(10.12));
        assert_eq!(Order::new(dec!(999.995), at_noon()).price(), dec!(1000.00));
    }

    #[test]
    fn float_prices_are_normalized() {
        let order = Order::from_f64_price(123.456_789, at_noon());
        assert_eq!(order.map(|o| o.price().to_string()), Some("123.46".to_owned()));
    }

    #[test]
    fn non_finite_float_prices_are_rejected() {
        assert!(Order::from_f64_price(f64::NAN, at_noon()).is_none());
        assert!(Order::from_f64_price(f64::INFINITY, at_noon()).is_none());
    }

    #[test]
    fn timestamps_keep_millisecond_precision() {
        let ts = at_noon() + chrono::Duration::nanoseconds(1_234_567);
        let order = Order::new(dec!(1), ts);
        assert_eq!(order.timestamp().timestamp_subsec_nanos(), 1_000_000);
    }

    #[test]
    fn row_serializes_price_as_number_and_date_as_millis() {
        let order = Order::new(dec!(30), at_noon());
        let json = serde_json::to_value(OrderRow::from(order)).unwrap_or_default();
        assert_eq!(json["price"], serde_json::json!(30.0));
        assert_eq!(json["date"], serde_json::json!(at_noon().timestamp_millis()));
        assert_eq!(json["id"], serde_json::json!(order.id().to_string()));
    }
}

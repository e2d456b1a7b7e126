//! Column name resolution.
//!
//! Clients address order fields by name. [`OrderField`] is the closed set
//! of names the engine understands; anything else resolves to `None`.

use chrono::{DateTime, SecondsFormat, Utc};
use orderfeed_types::{Order, OrderId};
use rust_decimal::Decimal;

/// A field of [`Order`] addressable from a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderField {
    /// The order id.
    Id,
    /// The order price.
    Price,
    /// The creation timestamp. Also addressable as `date`, its wire name.
    Timestamp,
}

impl OrderField {
    /// Resolve a column name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "price" => Some(Self::Price),
            "timestamp" | "date" => Some(Self::Timestamp),
            _ => None,
        }
    }

    /// Read this field from an order.
    pub const fn value_of(self, order: &Order) -> FieldValue {
        match self {
            Self::Id => FieldValue::Id(order.id()),
            Self::Price => FieldValue::Price(order.price()),
            Self::Timestamp => FieldValue::Timestamp(order.timestamp()),
        }
    }
}

/// The value of one field of one order.
///
/// Values of the same variant order naturally (id, then numeric, then
/// chronological). The engine never compares values of different fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldValue {
    /// Value of [`OrderField::Id`].
    Id(OrderId),
    /// Value of [`OrderField::Price`].
    Price(Decimal),
    /// Value of [`OrderField::Timestamp`].
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// The string form used by text operators.
    ///
    /// Ids render hyphenated, prices with their two stored decimals
    /// (`20.00`), timestamps as RFC 3339 with milliseconds.
    pub fn render(&self) -> String {
        match self {
            Self::Id(id) => id.to_string(),
            Self::Price(price) => price.to_string(),
            Self::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// The numeric value, for numeric fields only.
    pub const fn as_number(&self) -> Option<Decimal> {
        match self {
            Self::Price(price) => Some(*price),
            Self::Id(_) | Self::Timestamp(_) => None,
        }
    }
}

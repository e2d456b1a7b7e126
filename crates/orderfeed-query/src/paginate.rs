//! Row-range clamping.
//!
//! A requested `[start_row, end_row)` is clamped against the result size
//! `n`: first `end = min(end_row, n)`, then `start = min(start_row, end)`.
//! Negative bounds clamp to zero. The invariant `start <= end <= n` always
//! holds, so slicing can never go out of bounds.

use orderfeed_types::Order;

/// A clamped, always-valid row range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    /// First row (inclusive).
    pub start: usize,
    /// Last row (exclusive).
    pub end: usize,
}

impl PageBounds {
    /// Clamp a requested range against a result of `len` rows.
    pub fn clamp(start_row: i64, end_row: i64, len: usize) -> Self {
        let end = to_index(end_row).min(len);
        let start = to_index(start_row).min(end);
        Self { start, end }
    }

    /// Number of rows in the range.
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the range is empty.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn to_index(row: i64) -> usize {
    usize::try_from(row.max(0)).unwrap_or(usize::MAX)
}

/// Cut `orders` down to `bounds`.
pub fn paginate(mut orders: Vec<Order>, bounds: PageBounds) -> Vec<Order> {
    orders.truncate(bounds.end);
    if bounds.start > 0 {
        orders.drain(..bounds.start.min(orders.len()));
    }
    orders
}

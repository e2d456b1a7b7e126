//! Multi-key stable sort.

use core::cmp::Ordering;

use orderfeed_types::{Order, SortModel};

use crate::field::OrderField;

/// Sort direction. Only the token `asc` is ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

impl SortDirection {
    /// Parse a direction token. Anything but `asc` sorts descending.
    pub fn parse(token: &str) -> Self {
        if token == "asc" {
            Self::Ascending
        } else {
            Self::Descending
        }
    }
}

/// One compiled sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    field: Option<OrderField>,
    direction: SortDirection,
}

impl SortKey {
    /// Compile one entry of a sort model.
    pub fn compile(model: &SortModel) -> Self {
        Self {
            field: OrderField::parse(&model.col_id),
            direction: SortDirection::parse(&model.sort),
        }
    }

    /// Compare two orders on this key alone.
    ///
    /// An unresolved column compares every pair as equal.
    pub fn compare(&self, a: &Order, b: &Order) -> Ordering {
        let Some(field) = self.field else {
            return Ordering::Equal;
        };
        let cmp = field.value_of(a).cmp(&field.value_of(b));
        match self.direction {
            SortDirection::Ascending => cmp,
            SortDirection::Descending => cmp.reverse(),
        }
    }
}

/// Compile a sort model, primary key first.
pub fn compile_sort(model: &[SortModel]) -> Vec<SortKey> {
    model.iter().map(SortKey::compile).collect()
}

/// Compare two orders key by key; the first non-equal key decides.
pub fn compare_orders(keys: &[SortKey], a: &Order, b: &Order) -> Ordering {
    keys.iter()
        .map(|key| key.compare(a, b))
        .find(|cmp| cmp.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Sort in place. Orders equal on every key keep their relative order.
pub fn apply_sort(orders: &mut [Order], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }
    orders.sort_by(|a, b| compare_orders(keys, a, b));
}

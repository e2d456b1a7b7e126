//! Column filters.
//!
//! Each entry of a request's filter model compiles into one
//! [`FilterPredicate`]; an order passes when every predicate matches.
//!
//! | operator | passes when |
//! |---|---|
//! | `contains` | rendered value contains the operand, ignoring case |
//! | `equals` | rendered value equals the operand exactly |
//! | `greaterThan` | numeric value `>=` numeric operand |
//! | `lessThan` | numeric value `<=` numeric operand |
//! | anything else | always |
//!
//! Unknown operators pass every order. An unknown column fails every
//! known operator. A numeric operator fails on a non-numeric field or an
//! operand that does not parse as a number.
//!
//! Operands that fit a [`Decimal`] compare exactly. Any other valid number
//! (beyond `Decimal`'s magnitude or scale) compares as `f64`.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

use orderfeed_types::{FilterModel, Order};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::field::OrderField;

/// A filter operator token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Case-insensitive substring match.
    Contains,
    /// Exact string match.
    Equals,
    /// Inclusive lower bound.
    GreaterThan,
    /// Inclusive upper bound.
    LessThan,
    /// Any unrecognized token. Matches everything.
    Other,
}

impl FilterOperator {
    /// Parse an operator token. Unrecognized tokens become [`Self::Other`].
    pub fn parse(token: &str) -> Self {
        match token {
            "contains" => Self::Contains,
            "equals" => Self::Equals,
            "greaterThan" => Self::GreaterThan,
            "lessThan" => Self::LessThan,
            _ => Self::Other,
        }
    }
}

/// A parsed numeric operand.
#[derive(Debug, Clone, Copy, PartialEq)]
enum NumericOperand {
    Exact(Decimal),
    /// Outside `Decimal`'s range or precision.
    Wide(f64),
}

impl NumericOperand {
    /// Order `value` against this operand. `None` when incomparable (NaN).
    fn compare(self, value: Decimal) -> Option<Ordering> {
        match self {
            Self::Exact(bound) => Some(value.cmp(&bound)),
            Self::Wide(bound) => value.to_f64()?.partial_cmp(&bound),
        }
    }
}

/// One compiled column filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPredicate {
    field: Option<OrderField>,
    operator: FilterOperator,
    operand: String,
    operand_lower: String,
    operand_number: Option<NumericOperand>,
}

impl FilterPredicate {
    /// Compile the filter for `column`.
    pub fn compile(column: &str, model: &FilterModel) -> Self {
        let operator = FilterOperator::parse(&model.filter_type);
        Self {
            field: OrderField::parse(column),
            operator,
            operand_lower: model.filter.to_lowercase(),
            operand_number: parse_number(&model.filter),
            operand: model.filter.clone(),
        }
    }

    /// The operator this predicate applies.
    pub const fn operator(&self) -> FilterOperator {
        self.operator
    }

    /// Whether `order` satisfies this predicate.
    pub fn matches(&self, order: &Order) -> bool {
        if self.operator == FilterOperator::Other {
            return true;
        }
        let Some(field) = self.field else {
            return false;
        };
        let value = field.value_of(order);

        match self.operator {
            FilterOperator::Contains => value.render().to_lowercase().contains(&self.operand_lower),
            FilterOperator::Equals => value.render() == self.operand,
            FilterOperator::GreaterThan => matches!(
                self.compare_number(value.as_number()),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOperator::LessThan => matches!(
                self.compare_number(value.as_number()),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOperator::Other => true,
        }
    }

    fn compare_number(&self, value: Option<Decimal>) -> Option<Ordering> {
        self.operand_number?.compare(value?)
    }
}

/// Compile every entry of a filter model.
pub fn compile_filters(model: &BTreeMap<String, FilterModel>) -> Vec<FilterPredicate> {
    model
        .iter()
        .map(|(column, filter)| FilterPredicate::compile(column, filter))
        .collect()
}

/// Whether `order` satisfies all `filters`. An empty list matches everything.
pub fn matches_all(filters: &[FilterPredicate], order: &Order) -> bool {
    filters.iter().all(|f| f.matches(order))
}

/// Keep only the orders that satisfy all `filters`, preserving order.
pub fn apply_filters(orders: &mut Vec<Order>, filters: &[FilterPredicate]) {
    if filters.is_empty() {
        return;
    }
    orders.retain(|order| matches_all(filters, order));
}

/// Parse a numeric operand: plain decimal or scientific notation, falling
/// back to `f64` for numbers a `Decimal` cannot hold.
fn parse_number(text: &str) -> Option<NumericOperand> {
    let trimmed = text.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map(NumericOperand::Exact)
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().map(NumericOperand::Wide))
}

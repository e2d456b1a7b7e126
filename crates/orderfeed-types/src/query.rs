//! Paging, sorting and filtering request/response types.
//!
//! Field names follow the grid client's server-side row model:
//! `startRow`, `endRow`, `sortModel`, `filterModel` on the way in and
//! `rows`, `lastRow` on the way out.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::order::OrderRow;

/// One client's request for a page of orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct QueryRequest {
    /// First row of the page (inclusive, zero-based).
    #[serde(default)]
    #[ts(type = "number")]
    pub start_row: i64,
    /// End of the page (exclusive). May exceed the number of rows.
    #[serde(default)]
    #[ts(type = "number")]
    pub end_row: i64,
    /// Sort keys, primary first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub sort_model: Vec<SortModel>,
    /// Per-column filters, combined with logical AND.
    #[serde(default, deserialize_with = "null_as_default")]
    pub filter_model: BTreeMap<String, FilterModel>,
}

impl QueryRequest {
    /// A request for rows `[start_row, end_row)` with no sort or filter.
    pub fn page(start_row: i64, end_row: i64) -> Self {
        Self {
            start_row,
            end_row,
            ..Self::default()
        }
    }

    /// Append a sort key.
    #[must_use]
    pub fn sort_by(mut self, col_id: &str, sort: &str) -> Self {
        self.sort_model.push(SortModel {
            col_id: col_id.to_owned(),
            sort: sort.to_owned(),
        });
        self
    }

    /// Add or replace the filter on a column.
    #[must_use]
    pub fn filter(mut self, column: &str, filter_type: &str, operand: &str) -> Self {
        self.filter_model.insert(
            column.to_owned(),
            FilterModel {
                filter_type: filter_type.to_owned(),
                filter: operand.to_owned(),
                kind: None,
            },
        );
        self
    }
}

/// One sort key: a column and a direction token (`asc` or `desc`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SortModel {
    /// Column name.
    pub col_id: String,
    /// Direction token. Only `asc` means ascending.
    pub sort: String,
}

/// One column filter: an operator token and its operand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FilterModel {
    /// Operator token (`contains`, `equals`, `greaterThan`, `lessThan`).
    #[serde(rename = "type")]
    pub filter_type: String,
    /// Operand. Numbers sent by the client are kept in their text form.
    #[serde(default, deserialize_with = "operand_as_string")]
    pub filter: String,
    /// Grid filter family (`text`, `number`, `date`). Informational only.
    #[serde(rename = "filterType", default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub kind: Option<String>,
}

/// A page of orders plus the total number of matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct QueryResponse {
    /// The requested slice of matching orders.
    pub rows: Vec<OrderRow>,
    /// Number of orders that matched the filters, before paging.
    #[serde(rename = "lastRow")]
    #[ts(type = "number")]
    pub total_matching_count: u64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOperand {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

fn operand_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawOperand>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawOperand::Text(s)) => s,
        Some(RawOperand::Number(n)) => n.to_string(),
        Some(RawOperand::Flag(b)) => b.to_string(),
        None => String::new(),
    })
}

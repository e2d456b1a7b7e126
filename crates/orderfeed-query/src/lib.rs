//! Query engine for the order feed.
//!
//! [`run_query`] turns an owned snapshot of orders and a
//! [`QueryRequest`] into a [`QueryResponse`]. It is pure and synchronous:
//! no locks, no I/O, no suspension points. The work is bounded by the
//! snapshot size (`O(n * k)` to filter with `k` predicates, `O(n log n)`
//! to sort).
//!
//! # Pipeline
//!
//! 1. [`filter`] -- drop orders failing any column predicate
//! 2. [`sort`] -- stable multi-key sort
//! 3. [`paginate`] -- clamp the requested row range and slice
//!
//! The total match count is taken after filtering and before paging.
//!
//! Bad input never fails a query. Malformed operands make their predicate
//! false, out-of-range rows are clamped, and the worst outcome is an empty
//! or full page.

pub mod field;
pub mod filter;
pub mod paginate;
pub mod sort;

pub use field::{FieldValue, OrderField};
pub use filter::{FilterOperator, FilterPredicate};
pub use paginate::PageBounds;
pub use sort::{SortDirection, SortKey};

use orderfeed_types::{Order, OrderRow, QueryRequest, QueryResponse};

/// Run a request against a snapshot.
pub fn run_query(mut snapshot: Vec<Order>, request: &QueryRequest) -> QueryResponse {
    if !request.filter_model.is_empty() {
        let predicates = filter::compile_filters(&request.filter_model);
        filter::apply_filters(&mut snapshot, &predicates);
    }

    if !request.sort_model.is_empty() {
        let keys = sort::compile_sort(&request.sort_model);
        sort::apply_sort(&mut snapshot, &keys);
    }

    let total = snapshot.len();
    let bounds = PageBounds::clamp(request.start_row, request.end_row, total);
    let rows = paginate::paginate(snapshot, bounds)
        .iter()
        .map(OrderRow::from)
        .collect();

    QueryResponse {
        rows,
        total_matching_count: u64::try_from(total).unwrap_or(u64::MAX),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use orderfeed_types::OrderId;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;

    fn orders(prices: &[Decimal]) -> Vec<Order> {
        prices.iter().map(|p| Order::new(*p, Utc::now())).collect()
    }

    fn ids(rows: &[OrderRow]) -> Vec<OrderId> {
        rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn filter_sort_and_page_together() {
        let snapshot = orders(&[dec!(10.00), dec!(20.00), dec!(30.00)]);
        let (a, b, c) = match snapshot.as_slice() {
            [a, b, c] => (*a, *b, *c),
            _ => return,
        };
        let request = QueryRequest::page(0, 10)
            .filter("price", "greaterThan", "15")
            .sort_by("price", "desc");

        let response = run_query(snapshot, &request);

        assert_eq!(ids(&response.rows), vec![c.id(), b.id()]);
        assert_eq!(response.total_matching_count, 2);
        assert!(!ids(&response.rows).contains(&a.id()));
        assert_eq!(response.rows.first().map(|r| r.price), Some(dec!(30.00)));
    }

    #[test]
    fn inverted_range_returns_empty_page_with_full_count() {
        let snapshot = orders(&[dec!(1); 10]);
        let response = run_query(snapshot, &QueryRequest::page(5, 2));
        assert!(response.rows.is_empty());
        assert_eq!(response.total_matching_count, 10);
    }

    #[test]
    fn no_filter_no_sort_is_a_plain_slice() {
        let snapshot = orders(&[dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)]);
        let expected: Vec<OrderId> = snapshot.iter().skip(1).take(3).map(Order::id).collect();

        let response = run_query(snapshot, &QueryRequest::page(1, 4));

        assert_eq!(ids(&response.rows), expected);
        assert_eq!(response.total_matching_count, 5);
    }

    #[test]
    fn page_never_exceeds_requested_size() {
        let snapshot = orders(&[dec!(1); 25]);
        for (start, end) in [(0, 10), (20, 30), (-4, 3), (24, 25), (30, 40)] {
            let response = run_query(snapshot.clone(), &QueryRequest::page(start, end));
            let requested = usize::try_from((end - start).max(0)).unwrap_or(0);
            assert!(response.rows.len() <= requested);
            assert_eq!(response.total_matching_count, 25);
        }
    }

    #[test]
    fn count_reflects_filter_not_page() {
        let snapshot = orders(&[dec!(5), dec!(50), dec!(500), dec!(5000)]);
        let request = QueryRequest::page(0, 1).filter("price", "greaterThan", "10");
        let response = run_query(snapshot, &request);
        assert_eq!(response.rows.len(), 1);
        assert_eq!(response.total_matching_count, 3);
    }

    #[test]
    fn unknown_operator_returns_everything() {
        let snapshot = orders(&[dec!(1), dec!(2)]);
        let request = QueryRequest::page(0, 10).filter("nope", "inRange", "x");
        assert_eq!(run_query(snapshot, &request).total_matching_count, 2);
    }

    #[test]
    fn unknown_column_with_known_operator_returns_nothing() {
        let snapshot = orders(&[dec!(1), dec!(2)]);
        let request = QueryRequest::page(0, 10).filter("nope", "equals", "1.00");
        let response = run_query(snapshot, &request);
        assert!(response.rows.is_empty());
        assert_eq!(response.total_matching_count, 0);
    }

    #[test]
    fn malformed_operand_yields_empty_result_not_error() {
        let snapshot = orders(&[dec!(1), dec!(2)]);
        let request = QueryRequest::page(0, 10).filter("price", "lessThan", "abc");
        assert_eq!(run_query(snapshot, &request).total_matching_count, 0);
    }

    #[test]
    fn refiltering_a_result_is_a_no_op() {
        let snapshot = orders(&[dec!(3), dec!(14), dec!(23), dec!(35), dec!(43)]);
        let request = QueryRequest::page(0, 100).filter("price", "contains", "3.00");
        let first = run_query(snapshot.clone(), &request);

        let survivors: Vec<Order> = snapshot
            .into_iter()
            .filter(|o| ids(&first.rows).contains(&o.id()))
            .collect();
        let second = run_query(survivors, &request);

        assert_eq!(first, second);
    }

    #[test]
    fn response_serializes_to_wire_shape() {
        let snapshot = orders(&[dec!(12.5)]);
        let response = run_query(snapshot, &QueryRequest::page(0, 1));
        let json = serde_json::to_value(&response).unwrap_or_default();
        assert_eq!(json["lastRow"], 1);
        assert_eq!(json["rows"][0]["price"], serde_json::json!(12.5));
        assert!(json["rows"][0]["date"].is_i64());
    }
}

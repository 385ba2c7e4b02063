//! Order filtering for list views.
//!
//! Filters are pure predicates over already-loaded orders. All configured
//! predicates must match (logical AND); an empty filter matches everything.
//! Sorting is a separate step, see [`sort_newest_first`].

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Deserialize;

use crate::error::OrderError;
use crate::order::Order;

/// Raw filter parameters as they arrive from a query string.
///
/// Empty strings are treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    /// Inclusive start date (`YYYY-MM-DD` or RFC 3339).
    pub date_start: Option<String>,
    /// Inclusive end date; extended to the end of that day.
    pub date_end: Option<String>,
    /// Substring of the customer's mobile number.
    pub mobile: Option<String>,
    /// Substring of the order id or payment id, any case.
    #[serde(alias = "searchText")]
    pub search: Option<String>,
}

/// Inclusive `created_at` bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// A validated set of order predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    date_range: Option<DateRange>,
    mobile: Option<String>,
    search: Option<String>,
}

impl OrderFilter {
    /// Validate raw query parameters.
    ///
    /// A missing start bound defaults to the Unix epoch and a missing end
    /// bound to the end of the current day (`now`'s date).
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Validation`] if a date does not parse or the
    /// start lies after the end.
    pub fn from_query(query: &OrderQuery, now: DateTime<Utc>) -> Result<Self, OrderError> {
        let start = non_empty(query.date_start.as_deref());
        let end = non_empty(query.date_end.as_deref());

        let date_range = if start.is_some() || end.is_some() {
            let start = start
                .map(|s| parse_date(s, "dateStart"))
                .transpose()?
                .map_or(DateTime::UNIX_EPOCH, start_of_day);
            let end = end
                .map(|s| parse_date(s, "dateEnd"))
                .transpose()?
                .map_or_else(|| end_of_day(now.date_naive()), end_of_day);
            if start > end {
                return Err(OrderError::validation("dateStart must not be after dateEnd"));
            }
            Some(DateRange { start, end })
        } else {
            None
        };

        Ok(Self {
            date_range,
            mobile: non_empty(query.mobile.as_deref()).map(str::to_owned),
            search: non_empty(query.search.as_deref()).map(str::to_lowercase),
        })
    }

    /// Restrict to customers whose mobile contains `mobile` (case-sensitive).
    #[must_use]
    pub fn with_mobile(mut self, mobile: impl Into<String>) -> Self {
        self.mobile = Some(mobile.into());
        self
    }

    /// Restrict to orders whose order id or payment id contains `text`.
    #[must_use]
    pub fn with_search(mut self, text: &str) -> Self {
        self.search = Some(text.to_lowercase());
        self
    }

    #[must_use]
    pub const fn date_range(&self) -> Option<&DateRange> {
        self.date_range.as_ref()
    }

    #[must_use]
    pub fn mobile(&self) -> Option<&str> {
        self.mobile.as_deref()
    }

    /// The search text, already lowercased.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Whether `order` satisfies every configured predicate.
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(range) = &self.date_range
            && !range.contains(order.created_at)
        {
            return false;
        }
        if let Some(mobile) = &self.mobile
            && !order.customer.mobile.contains(mobile.as_str())
        {
            return false;
        }
        if let Some(search) = &self.search {
            let in_order_id = order.order_id.as_str().to_lowercase().contains(search.as_str());
            let in_payment_id = order
                .payment_id
                .as_deref()
                .is_some_and(|id| id.to_lowercase().contains(search.as_str()));
            if !in_order_id && !in_payment_id {
                return false;
            }
        }
        true
    }

    /// Keep the matching orders, preserving input order.
    pub fn apply<I>(&self, orders: I) -> Vec<Order>
    where
        I: IntoIterator<Item = Order>,
    {
        orders.into_iter().filter(|o| self.matches(o)).collect()
    }
}

/// Sort by `created_at`, newest first.
pub fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, OrderError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc).date_naive()))
        .map_err(|_| OrderError::validation(format!("{field} is not a valid date: {value:?}")))
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let last_milli = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    Utc.from_utc_datetime(&date.and_time(last_milli))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::order::fixtures::placed;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn order(id: &str, mobile: &str, created: &str) -> Order {
        let mut order = placed(id, at(created));
        order.customer.mobile = mobile.to_string();
        order
    }

    fn sample() -> Vec<Order> {
        vec![
            order("ORD-100", "9876543210", "2026-03-01T10:00:00Z"),
            order("ORD-101", "9123498765", "2026-03-05T23:59:59Z"),
            order("ORD-102", "9000000001", "2026-03-06T00:00:00Z"),
        ]
    }

    fn query(start: Option<&str>, end: Option<&str>, mobile: Option<&str>, search: Option<&str>) -> OrderQuery {
        OrderQuery {
            date_start: start.map(str::to_owned),
            date_end: end.map(str::to_owned),
            mobile: mobile.map(str::to_owned),
            search: search.map(str::to_owned),
        }
    }

    fn ids(orders: &[Order]) -> Vec<&str> {
        orders.iter().map(|o| o.order_id.as_str()).collect()
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = OrderFilter::from_query(&OrderQuery::default(), Utc::now()).unwrap();
        assert_eq!(filter.apply(sample()).len(), 3);
    }

    #[test]
    fn mobile_is_substring_match() {
        let filter = OrderFilter::default().with_mobile("98765");
        let result = filter.apply(sample());
        assert_eq!(ids(&result), vec!["ORD-100", "ORD-101"]);
        assert!(result.iter().all(|o| o.customer.mobile.contains("98765")));
    }

    #[test]
    fn end_date_covers_the_whole_day() {
        let now = at("2026-04-01T00:00:00Z");
        let filter = OrderFilter::from_query(&query(Some("2026-03-02"), Some("2026-03-05"), None, None), now).unwrap();
        assert_eq!(ids(&filter.apply(sample())), vec!["ORD-101"]);
    }

    #[test]
    fn missing_start_defaults_to_epoch() {
        let now = at("2026-04-01T00:00:00Z");
        let filter = OrderFilter::from_query(&query(None, Some("2026-03-01"), None, None), now).unwrap();
        assert_eq!(filter.date_range().unwrap().start, DateTime::UNIX_EPOCH);
        assert_eq!(ids(&filter.apply(sample())), vec!["ORD-100"]);
    }

    #[test]
    fn missing_end_defaults_to_end_of_today() {
        let now = at("2026-03-06T08:00:00Z");
        let filter = OrderFilter::from_query(&query(Some("2026-03-06"), None, None, None), now).unwrap();
        assert_eq!(filter.date_range().unwrap().end, at("2026-03-06T23:59:59.999Z"));
        assert_eq!(ids(&filter.apply(sample())), vec!["ORD-102"]);
    }

    #[test]
    fn date_range_narrows_mobile_results() {
        let now = at("2026-04-01T00:00:00Z");
        let mobile_only = OrderFilter::from_query(&query(None, None, Some("98765"), None), now).unwrap();
        let combined = OrderFilter::from_query(
            &query(Some("2026-03-02"), Some("2026-03-31"), Some("98765"), None),
            now,
        )
        .unwrap();

        let wide = mobile_only.apply(sample());
        let narrow = combined.apply(sample());
        assert!(narrow.len() <= wide.len());
        assert!(narrow.iter().all(|o| wide.contains(o)));
        assert_eq!(ids(&narrow), vec!["ORD-101"]);
    }

    #[test]
    fn search_matches_order_or_payment_id_case_insensitively() {
        let mut orders = sample();
        orders[2].payment_id = Some("pay_XyZ789".to_string());

        let by_order = OrderFilter::default().with_search("ord-10");
        assert_eq!(by_order.apply(orders.clone()).len(), 3);

        let by_payment = OrderFilter::default().with_search("xyz7");
        assert_eq!(ids(&by_payment.apply(orders)), vec!["ORD-102"]);
    }

    #[test]
    fn search_ignores_orders_without_payment_id() {
        let mut orders = sample();
        for o in &mut orders {
            o.payment_id = None;
        }
        assert!(OrderFilter::default().with_search("pay_").apply(orders).is_empty());
    }

    #[test]
    fn unparseable_date_is_a_validation_error() {
        let result = OrderFilter::from_query(&query(Some("03/01/2026"), None, None, None), Utc::now());
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }

    #[test]
    fn inverted_range_is_a_validation_error() {
        let result = OrderFilter::from_query(&query(Some("2026-03-05"), Some("2026-03-01"), None, None), Utc::now());
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }

    #[test]
    fn rfc3339_dates_are_accepted() {
        let filter = OrderFilter::from_query(
            &query(Some("2026-03-05T12:00:00+05:30"), Some("2026-03-05T12:00:00Z"), None, None),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(filter.date_range().unwrap().start, at("2026-03-05T00:00:00Z"));
    }

    #[test]
    fn blank_parameters_are_ignored() {
        let filter = OrderFilter::from_query(&query(Some(" "), Some(""), Some(""), Some("  ")), Utc::now()).unwrap();
        assert_eq!(filter, OrderFilter::default());
    }

    #[test]
    fn sort_puts_newest_first() {
        let mut orders = sample();
        orders[0].created_at += Duration::days(30);
        sort_newest_first(&mut orders);
        assert_eq!(ids(&orders), vec!["ORD-100", "ORD-102", "ORD-101"]);
    }
}

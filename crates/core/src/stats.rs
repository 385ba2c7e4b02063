//! Dashboard aggregates.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::order::Order;
use crate::types::{OrderStatus, Price};

/// Whether refunded orders count toward total sales.
///
/// Cancelled orders never count. Refunded orders were historically counted
/// (their money was received before it was returned); the default leaves
/// them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenuePolicy {
    IncludeRefunded,
    #[default]
    ExcludeRefunded,
}

impl RevenuePolicy {
    /// Whether an order in `status` contributes to revenue.
    #[must_use]
    pub const fn counts(self, status: OrderStatus) -> bool {
        match status {
            OrderStatus::Cancelled => false,
            OrderStatus::Refunded => matches!(self, Self::IncludeRefunded),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    pub date: NaiveDate,
    pub orders: u64,
    pub sales: Price,
}

/// Summary numbers for the dashboard landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_sales: Price,
    pub total_orders: u64,
    pub total_cancelled_orders: u64,
    pub total_cancelled_amount: Price,
    pub products_count: u64,
    /// One entry per status, in lifecycle order, zero counts included.
    pub status_breakdown: Vec<StatusCount>,
    /// Revenue per UTC day of `createdAt`, oldest first.
    pub sales_trend: Vec<DailySales>,
}

impl DashboardStats {
    pub fn compute<'a, I>(orders: I, products_count: u64, policy: RevenuePolicy) -> Self
    where
        I: IntoIterator<Item = &'a Order>,
    {
        let mut total_sales = Price::ZERO;
        let mut total_orders = 0_u64;
        let mut total_cancelled_orders = 0_u64;
        let mut total_cancelled_amount = Price::ZERO;
        let mut by_status = [0_u64; OrderStatus::ALL.len()];
        let mut by_day: BTreeMap<NaiveDate, (u64, Price)> = BTreeMap::new();

        for order in orders {
            total_orders += 1;
            if let Some(slot) = OrderStatus::ALL
                .iter()
                .position(|s| *s == order.status)
                .and_then(|i| by_status.get_mut(i))
            {
                *slot += 1;
            }

            if order.status == OrderStatus::Cancelled {
                total_cancelled_orders += 1;
                total_cancelled_amount = total_cancelled_amount + order.total_amount;
            }
            if policy.counts(order.status) {
                total_sales = total_sales + order.total_amount;
                let day = by_day
                    .entry(order.created_at.date_naive())
                    .or_insert((0, Price::ZERO));
                day.0 += 1;
                day.1 = day.1 + order.total_amount;
            }
        }

        Self {
            total_sales,
            total_orders,
            total_cancelled_orders,
            total_cancelled_amount,
            products_count,
            status_breakdown: OrderStatus::ALL
                .into_iter()
                .zip(by_status)
                .map(|(status, count)| StatusCount { status, count })
                .collect(),
            sales_trend: by_day
                .into_iter()
                .map(|(date, (orders, sales))| DailySales { date, orders, sales })
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::order::fixtures::{placed, with_status};

    fn sample() -> Vec<Order> {
        let now = Utc::now();
        vec![
            with_status(placed("ORD-1", now), OrderStatus::Delivered),
            with_status(placed("ORD-2", now), OrderStatus::Cancelled),
            with_status(placed("ORD-3", now - Duration::days(1)), OrderStatus::Refunded),
            placed("ORD-4", now - Duration::days(1)),
        ]
    }

    #[test]
    fn default_policy_excludes_refunded() {
        let stats = DashboardStats::compute(&sample(), 12, RevenuePolicy::default());
        assert_eq!(stats.total_orders, 4);
        assert_eq!(stats.total_sales, Price::from_rupees(1000));
        assert_eq!(stats.products_count, 12);
    }

    #[test]
    fn include_refunded_counts_refunds_as_sales() {
        let stats = DashboardStats::compute(&sample(), 0, RevenuePolicy::IncludeRefunded);
        assert_eq!(stats.total_sales, Price::from_rupees(1500));
    }

    #[test]
    fn cancelled_totals_only_count_cancelled() {
        let stats = DashboardStats::compute(&sample(), 0, RevenuePolicy::IncludeRefunded);
        assert_eq!(stats.total_cancelled_orders, 1);
        assert_eq!(stats.total_cancelled_amount, Price::from_rupees(500));
    }

    #[test]
    fn breakdown_lists_every_status() {
        let stats = DashboardStats::compute(&sample(), 0, RevenuePolicy::default());
        assert_eq!(stats.status_breakdown.len(), OrderStatus::ALL.len());
        let total: u64 = stats.status_breakdown.iter().map(|s| s.count).sum();
        assert_eq!(total, 4);
        let shipped = stats
            .status_breakdown
            .iter()
            .find(|s| s.status == OrderStatus::Shipped)
            .unwrap();
        assert_eq!(shipped.count, 0);
    }

    #[test]
    fn trend_is_oldest_first() {
        let stats = DashboardStats::compute(&sample(), 0, RevenuePolicy::default());
        assert_eq!(stats.sales_trend.len(), 2);
        assert!(stats.sales_trend[0].date < stats.sales_trend[1].date);
        assert_eq!(stats.sales_trend[0].sales, Price::from_rupees(500));
    }

    #[test]
    fn empty_store_is_all_zero() {
        let stats = DashboardStats::compute(&Vec::<Order>::new(), 0, RevenuePolicy::default());
        assert_eq!(stats.total_sales, Price::ZERO);
        assert!(stats.sales_trend.is_empty());
    }
}

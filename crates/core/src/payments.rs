//! Payment transactions derived from orders.
//!
//! There is no separate payments table: a transaction is an order that
//! either carries a gateway payment id or has left the `pending` payment
//! state (cash collected, or refunded).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseStatusError;
use crate::order::Order;
use crate::types::{OrderId, OrderStatus, PaymentStatus, Price};

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Paid through the gateway; the order has a payment id.
    Online,
    /// Paid on delivery.
    Cash,
}

impl PaymentMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Cash => "cash",
        }
    }

    /// Infer the method from what the order recorded.
    #[must_use]
    pub const fn of(order: &Order) -> Self {
        if order.payment_id.is_some() {
            Self::Online
        } else {
            Self::Cash
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "cash" => Ok(Self::Cash),
            _ => Err(ParseStatusError::new("payment method", s)),
        }
    }
}

/// One row of the payments view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub order_id: OrderId,
    pub payment_id: Option<String>,
    pub customer_name: String,
    pub amount: Price,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// The transaction for `order`, if it has any payment activity.
    #[must_use]
    pub fn from_order(order: &Order) -> Option<Self> {
        if order.payment_id.is_none() && order.payment_status == PaymentStatus::Pending {
            return None;
        }
        Some(Self {
            order_id: order.order_id.clone(),
            payment_id: order.payment_id.clone(),
            customer_name: order.customer.name.clone(),
            amount: order.total_amount,
            payment_status: order.payment_status,
            order_status: order.status,
            method: PaymentMethod::of(order),
            created_at: order.created_at,
        })
    }
}

/// Filters for the payments view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentFilter {
    pub method: Option<PaymentMethod>,
    /// Case-insensitive substring of the payment id.
    pub search: Option<String>,
}

impl PaymentFilter {
    #[must_use]
    pub fn matches(&self, txn: &Transaction) -> bool {
        if self.method.is_some_and(|m| m != txn.method) {
            return false;
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                txn.payment_id
                    .as_deref()
                    .is_some_and(|id| id.to_lowercase().contains(&needle))
            }
        }
    }
}

/// Transactions for `orders`, preserving input order.
pub fn transactions<'a, I>(orders: I, filter: &PaymentFilter) -> Vec<Transaction>
where
    I: IntoIterator<Item = &'a Order>,
{
    orders
        .into_iter()
        .filter_map(Transaction::from_order)
        .filter(|txn| filter.matches(txn))
        .collect()
}

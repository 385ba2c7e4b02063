//! The order document and its sub-records.
//!
//! An [`Order`] is created once by checkout (here: [`NewOrder::place`]) and is
//! afterwards only changed by [`crate::lifecycle`] and [`crate::cancellation`].
//! Customer details, line items and the total are fixed at placement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::OrderError;
use crate::types::{CancellationStatus, OrderId, OrderStatus, PaymentStatus, Price};

/// Customer contact details captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub mobile: String,
    pub address: String,
}

/// A single product line on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: u32,
    pub price: Price,
}

impl LineItem {
    /// `price × quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// A customer's request to cancel the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationRequest {
    pub requested: bool,
    pub status: CancellationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub requested_at: DateTime<Utc>,
}

impl CancellationRequest {
    /// Whether the request is open and waiting for an admin decision.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.requested && self.status == CancellationStatus::Pending
    }
}

/// Fulfillment milestones that carry a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Milestone {
    Packed,
    Shipped,
    Delivered,
}

impl Milestone {
    /// The milestone stamped when an order enters `status`, if any.
    #[must_use]
    pub const fn for_status(status: OrderStatus) -> Option<Self> {
        match status {
            OrderStatus::Packed => Some(Self::Packed),
            OrderStatus::Shipped => Some(Self::Shipped),
            OrderStatus::Delivered => Some(Self::Delivered),
            _ => None,
        }
    }
}

/// Milestone timestamps, set as the order moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneDates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packed_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipped_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_date: Option<DateTime<Utc>>,
}

impl MilestoneDates {
    #[must_use]
    pub const fn get(&self, milestone: Milestone) -> Option<DateTime<Utc>> {
        match milestone {
            Milestone::Packed => self.packed_date,
            Milestone::Shipped => self.shipped_date,
            Milestone::Delivered => self.delivered_date,
        }
    }

    /// Latest timestamp recorded for any milestone.
    #[must_use]
    pub fn latest(&self) -> Option<DateTime<Utc>> {
        [self.packed_date, self.shipped_date, self.delivered_date]
            .into_iter()
            .flatten()
            .max()
    }

    /// Record `milestone` at `at`, never earlier than a milestone already set.
    ///
    /// Returns the timestamp actually stored.
    pub fn stamp(&mut self, milestone: Milestone, at: DateTime<Utc>) -> DateTime<Utc> {
        let at = self.latest().map_or(at, |previous| previous.max(at));
        let slot = match milestone {
            Milestone::Packed => &mut self.packed_date,
            Milestone::Shipped => &mut self.shipped_date,
            Milestone::Delivered => &mut self.delivered_date,
        };
        *slot = Some(at);
        at
    }
}

/// The fields a conditional store update is keyed on.
///
/// Every mutation is written as "update this order if it is still in the
/// state I validated against", so two racing decisions cannot both apply.
/// `requested_at` tells a reopened request apart from the one that was read,
/// even when the status pair has come back to the same values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateGuard {
    pub status: OrderStatus,
    pub cancellation: Option<CancellationStatus>,
    pub requested_at: Option<DateTime<Utc>>,
}

/// A customer purchase tracked through fulfillment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub customer: Customer,
    pub products: Vec<LineItem>,
    pub total_amount: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_request: Option<CancellationRequest>,
    #[serde(default)]
    pub dates: MilestoneDates,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Sum of `price × quantity` over the line items.
    #[must_use]
    pub fn computed_total(&self) -> Price {
        self.products.iter().map(LineItem::subtotal).sum()
    }

    /// Whether `total_amount` matches the line items.
    #[must_use]
    pub fn has_consistent_total(&self) -> bool {
        self.computed_total() == self.total_amount
    }

    /// The open cancellation request, if there is one.
    #[must_use]
    pub fn pending_cancellation(&self) -> Option<&CancellationRequest> {
        self.cancellation_request
            .as_ref()
            .filter(|request| request.is_pending())
    }

    /// Current values of the fields a conditional update is keyed on.
    #[must_use]
    pub fn guard(&self) -> StateGuard {
        let request = self.cancellation_request.as_ref();
        StateGuard {
            status: self.status,
            cancellation: request.map(|r| r.status),
            requested_at: request.map(|r| r.requested_at),
        }
    }
}

/// Checkout input for a new order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub order_id: OrderId,
    pub customer: Customer,
    pub products: Vec<LineItem>,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
}

impl NewOrder {
    /// Validate the checkout input and build a `placed` order.
    ///
    /// The total is derived from the line items here and nowhere else.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Validation`] for an empty order id, a missing
    /// customer mobile, no line items, a zero quantity or a negative price.
    pub fn place(self, now: DateTime<Utc>) -> Result<Order, OrderError> {
        if self.order_id.as_str().trim().is_empty() {
            return Err(OrderError::validation("order id must not be empty"));
        }
        if self.customer.mobile.trim().is_empty() {
            return Err(OrderError::validation("customer mobile must not be empty"));
        }
        if self.products.is_empty() {
            return Err(OrderError::validation("order must contain at least one product"));
        }
        for item in &self.products {
            if item.quantity == 0 {
                return Err(OrderError::validation(format!(
                    "product {:?} has zero quantity",
                    item.name
                )));
            }
            if item.price.is_negative() {
                return Err(OrderError::validation(format!(
                    "product {:?} has a negative price",
                    item.name
                )));
            }
        }

        let total_amount = self.products.iter().map(LineItem::subtotal).sum();

        Ok(Order {
            order_id: self.order_id,
            status: OrderStatus::Placed,
            customer: self.customer,
            products: self.products,
            total_amount,
            payment_id: self.payment_id.filter(|id| !id.trim().is_empty()),
            payment_status: self.payment_status,
            cancellation_request: None,
            dates: MilestoneDates::default(),
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn customer(mobile: &str) -> Customer {
        Customer {
            name: "Asha Verma".to_string(),
            mobile: mobile.to_string(),
            address: "12 MG Road, Pune".to_string(),
        }
    }

    pub fn item(name: &str, quantity: u32, rupees: i64) -> LineItem {
        LineItem {
            name: name.to_string(),
            quantity,
            price: Price::from_rupees(rupees),
        }
    }

    /// A placed order for Rs 500 created at `now`.
    pub fn placed(order_id: &str, now: DateTime<Utc>) -> Order {
        NewOrder {
            order_id: OrderId::new(order_id),
            customer: customer("9876543210"),
            products: vec![item("Tea", 2, 150), item("Mug", 1, 200)],
            payment_id: Some(format!("pay_{order_id}")),
            payment_status: PaymentStatus::Success,
        }
        .place(now)
        .unwrap_or_else(|e| panic!("fixture order is valid: {e}"))
    }

    pub fn with_status(mut order: Order, status: OrderStatus) -> Order {
        order.status = status;
        order
    }

    pub fn with_request(mut order: Order, status: CancellationStatus) -> Order {
        order.cancellation_request = Some(CancellationRequest {
            requested: true,
            status,
            reason: Some("ordered by mistake".to_string()),
            requested_at: order.created_at,
        });
        order
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::fixtures::*;
    use super::*;

    #[test]
    fn place_derives_total_from_line_items() {
        let order = placed("ORD-1", Utc::now());
        assert_eq!(order.status, OrderStatus::Placed);
        assert_eq!(order.total_amount, Price::from_rupees(500));
        assert!(order.has_consistent_total());
        assert!(order.cancellation_request.is_none());
    }

    #[test]
    fn place_rejects_empty_products() {
        let result = NewOrder {
            order_id: OrderId::new("ORD-2"),
            customer: customer("9876543210"),
            products: vec![],
            payment_id: None,
            payment_status: PaymentStatus::Pending,
        }
        .place(Utc::now());
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }

    #[test]
    fn place_rejects_zero_quantity() {
        let result = NewOrder {
            order_id: OrderId::new("ORD-3"),
            customer: customer("9876543210"),
            products: vec![item("Tea", 0, 150)],
            payment_id: None,
            payment_status: PaymentStatus::Pending,
        }
        .place(Utc::now());
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }

    #[test]
    fn stamp_never_goes_backwards() {
        let now = Utc::now();
        let mut dates = MilestoneDates::default();
        dates.stamp(Milestone::Packed, now);

        let stored = dates.stamp(Milestone::Shipped, now - Duration::hours(1));
        assert_eq!(stored, now);
        assert!(dates.shipped_date.unwrap() >= dates.packed_date.unwrap());
    }

    #[test]
    fn pending_cancellation_requires_requested_flag() {
        let mut order = with_request(placed("ORD-4", Utc::now()), CancellationStatus::Pending);
        assert!(order.pending_cancellation().is_some());

        if let Some(request) = order.cancellation_request.as_mut() {
            request.requested = false;
        }
        assert!(order.pending_cancellation().is_none());
    }

    #[test]
    fn order_serializes_with_camel_case_fields() {
        let order = placed("ORD-5", Utc::now());
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["orderId"], "ORD-5");
        assert_eq!(json["status"], "placed");
        assert_eq!(json["paymentStatus"], "success");
        assert!(json.get("cancellationRequest").is_none());
    }
}

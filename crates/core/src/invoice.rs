//! Invoice data for a single order.
//!
//! Rendering (PDF, print) happens in the UI; this module only assembles the
//! numbers and labels an invoice shows.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::company::CompanyDetails;
use crate::error::OrderError;
use crate::order::{Customer, MilestoneDates, Order};
use crate::types::{OrderId, PaymentStatus, Price};

/// Shortest mobile fragment accepted for an invoice lookup.
pub const MIN_INVOICE_MOBILE_LEN: usize = 10;

/// Trim `mobile` and check it is long enough to look up invoices by.
///
/// # Errors
///
/// Returns [`OrderError::Validation`] if `mobile` is shorter than
/// [`MIN_INVOICE_MOBILE_LEN`] characters after trimming.
pub fn validate_invoice_mobile(mobile: &str) -> Result<&str, OrderError> {
    let mobile = mobile.trim();
    if mobile.chars().count() < MIN_INVOICE_MOBILE_LEN {
        return Err(OrderError::validation(format!(
            "mobile must have at least {MIN_INVOICE_MOBILE_LEN} digits"
        )));
    }
    Ok(mobile)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub name: String,
    pub quantity: u32,
    pub price: Price,
    pub line_total: Price,
}

/// Everything an invoice displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub invoice_number: String,
    pub order_id: OrderId,
    pub issued_at: DateTime<Utc>,
    pub company: CompanyDetails,
    pub customer: Customer,
    pub lines: Vec<InvoiceLine>,
    pub total_amount: Price,
    pub dates: MilestoneDates,
    pub refunded: bool,
}

impl Invoice {
    #[must_use]
    pub fn build(order: &Order, company: &CompanyDetails) -> Self {
        let lines = order
            .products
            .iter()
            .map(|item| InvoiceLine {
                name: item.name.clone(),
                quantity: item.quantity,
                price: item.price,
                line_total: item.subtotal(),
            })
            .collect();

        Self {
            invoice_number: format!("INV-{}", order.order_id),
            order_id: order.order_id.clone(),
            issued_at: order.created_at,
            company: company.clone(),
            customer: order.customer.clone(),
            lines,
            total_amount: order.total_amount,
            dates: order.dates,
            refunded: order.payment_status == PaymentStatus::Refunded,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::order::fixtures::placed;

    #[test]
    fn short_mobile_is_rejected() {
        assert!(matches!(
            validate_invoice_mobile("98765"),
            Err(OrderError::Validation(_))
        ));
        assert!(matches!(
            validate_invoice_mobile("   "),
            Err(OrderError::Validation(_))
        ));
    }

    #[test]
    fn mobile_is_trimmed() {
        assert_eq!(validate_invoice_mobile(" 9876543210 ").unwrap(), "9876543210");
    }

    #[test]
    fn invoice_carries_line_totals_and_refund_flag() {
        let mut order = placed("ORD-7", Utc::now());
        order.payment_status = PaymentStatus::Refunded;
        let company = CompanyDetails {
            name: "Chai Co".into(),
            ..CompanyDetails::default()
        };

        let invoice = Invoice::build(&order, &company);
        assert_eq!(invoice.invoice_number, "INV-ORD-7");
        assert_eq!(invoice.lines.first().unwrap().line_total, Price::from_rupees(300));
        assert_eq!(invoice.total_amount, Price::from_rupees(500));
        assert!(invoice.refunded);
        assert_eq!(invoice.company.name, "Chai Co");
    }
}

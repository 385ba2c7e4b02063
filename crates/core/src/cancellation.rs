//! Customer cancellation requests and the admin refund decision.
//!
//! ```text
//! none --request--> pending --approve--> approved   (order refunded)
//!                      |
//!                      +----reject----> rejected    (order untouched)
//!
//! approved | rejected --request--> pending          (customer asks again)
//! ```
//!
//! Approval bypasses the forward-only lifecycle: it moves the order straight
//! to `refunded` from any non-terminal status or from `cancelled`. A request
//! reopened after approval can only be rejected, since `approve` refuses an
//! order that is already refunded.

use chrono::{DateTime, Utc};

use crate::error::OrderError;
use crate::order::{CancellationRequest, Order};
use crate::types::{CancellationStatus, OrderStatus, PaymentStatus};

/// Open (or reopen) a cancellation request on behalf of the customer.
///
/// An approved request may always be reopened, whatever the order status.
///
/// # Errors
///
/// - [`OrderError::Validation`] if a request is already pending.
/// - [`OrderError::TerminalState`] if the order is delivered or refunded and
///   has no approved request to reopen.
pub fn request(
    order: &Order,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> Result<Order, OrderError> {
    if order.pending_cancellation().is_some() {
        return Err(OrderError::validation(
            "a cancellation request is already pending",
        ));
    }
    let reopening_approved = order
        .cancellation_request
        .as_ref()
        .is_some_and(|r| r.status == CancellationStatus::Approved);
    if !reopening_approved
        && matches!(order.status, OrderStatus::Delivered | OrderStatus::Refunded)
    {
        return Err(OrderError::TerminalState(order.status));
    }

    let mut updated = order.clone();
    updated.cancellation_request = Some(CancellationRequest {
        requested: true,
        status: CancellationStatus::Pending,
        reason: reason.filter(|r| !r.trim().is_empty()),
        requested_at: now,
    });
    updated.updated_at = now;
    Ok(updated)
}

/// Approve the pending request and refund the order.
///
/// # Errors
///
/// - [`OrderError::NoPendingRequest`] if there is no open request, including
///   a second approval of an already approved request.
/// - [`OrderError::TerminalState`] if the order was delivered or refunded in
///   the meantime.
pub fn approve(order: &Order, now: DateTime<Utc>) -> Result<Order, OrderError> {
    if order.pending_cancellation().is_none() {
        return Err(OrderError::NoPendingRequest);
    }
    if matches!(order.status, OrderStatus::Delivered | OrderStatus::Refunded) {
        return Err(OrderError::TerminalState(order.status));
    }

    let mut updated = order.clone();
    updated.status = OrderStatus::Refunded;
    updated.payment_status = PaymentStatus::Refunded;
    resolve(&mut updated, CancellationStatus::Approved);
    updated.updated_at = now;
    Ok(updated)
}

/// Reject the pending request; the order continues its normal lifecycle.
///
/// # Errors
///
/// Returns [`OrderError::NoPendingRequest`] if there is no open request.
pub fn reject(order: &Order, now: DateTime<Utc>) -> Result<Order, OrderError> {
    if order.pending_cancellation().is_none() {
        return Err(OrderError::NoPendingRequest);
    }

    let mut updated = order.clone();
    resolve(&mut updated, CancellationStatus::Rejected);
    updated.updated_at = now;
    Ok(updated)
}

fn resolve(order: &mut Order, outcome: CancellationStatus) {
    if let Some(request) = order.cancellation_request.as_mut() {
        request.status = outcome;
    }
}

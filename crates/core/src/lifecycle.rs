//! Fulfillment status state machine.
//!
//! ```text
//! placed -> confirmed -> packed -> shipped -> delivered
//!    \          \           \         \
//!     +----------+-----------+---------+--> cancelled
//! ```
//!
//! `delivered`, `cancelled` and `refunded` are terminal. `refunded` is only
//! reachable through an approved cancellation (see [`crate::cancellation`]),
//! never through [`apply_status`].

use chrono::{DateTime, Utc};

use crate::error::OrderError;
use crate::order::{Milestone, Order};
use crate::types::OrderStatus;

/// Statuses reachable in one step from `from`.
#[must_use]
pub const fn allowed_targets(from: OrderStatus) -> &'static [OrderStatus] {
    match from {
        OrderStatus::Placed => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
        OrderStatus::Confirmed => &[OrderStatus::Packed, OrderStatus::Cancelled],
        OrderStatus::Packed => &[OrderStatus::Shipped, OrderStatus::Cancelled],
        OrderStatus::Shipped => &[OrderStatus::Delivered, OrderStatus::Cancelled],
        OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Refunded => &[],
    }
}

/// Check a single status change against the transition table.
///
/// # Errors
///
/// - [`OrderError::TerminalState`] if `from` is terminal.
/// - [`OrderError::InvalidTransition`] for skips, backward moves, repeats and
///   any attempt to target `refunded` directly.
pub fn check_transition(from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
    if from.is_terminal() {
        return Err(OrderError::TerminalState(from));
    }
    if allowed_targets(from).contains(&to) {
        Ok(())
    } else {
        Err(OrderError::InvalidTransition { from, to })
    }
}

/// Move `order` to `target`, stamping the matching milestone date.
///
/// Returns the updated order; `order` itself is left untouched so a rejected
/// transition cannot leak a partial change.
///
/// # Errors
///
/// See [`check_transition`].
pub fn apply_status(
    order: &Order,
    target: OrderStatus,
    now: DateTime<Utc>,
) -> Result<Order, OrderError> {
    check_transition(order.status, target)?;

    let mut updated = order.clone();
    updated.status = target;
    if let Some(milestone) = Milestone::for_status(target) {
        updated.dates.stamp(milestone, now);
    }
    updated.updated_at = now;
    Ok(updated)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::order::fixtures::{placed, with_status};

    const FORWARD: [OrderStatus; 5] = [
        OrderStatus::Placed,
        OrderStatus::Confirmed,
        OrderStatus::Packed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    #[test]
    fn placed_reaches_only_confirmed_or_cancelled() {
        let reachable: Vec<_> = OrderStatus::ALL
            .into_iter()
            .filter(|to| check_transition(OrderStatus::Placed, *to).is_ok())
            .collect();
        assert_eq!(reachable, vec![OrderStatus::Confirmed, OrderStatus::Cancelled]);
    }

    #[test]
    fn placed_to_shipped_is_invalid() {
        let order = placed("ORD-1", Utc::now());
        let err = apply_status(&order, OrderStatus::Shipped, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Placed,
                to: OrderStatus::Shipped
            }
        );
    }

    #[test]
    fn forward_path_walks_to_delivered() {
        let start = Utc::now();
        let mut order = placed("ORD-2", start);
        for (step, target) in FORWARD.iter().skip(1).enumerate() {
            let at = start + Duration::minutes(i64::try_from(step).unwrap() + 1);
            order = apply_status(&order, *target, at).unwrap();
            assert_eq!(order.status, *target);
        }
        assert!(order.dates.packed_date.is_some());
        assert!(order.dates.shipped_date.is_some());
        assert!(order.dates.delivered_date.is_some());
    }

    #[test]
    fn backward_moves_are_invalid() {
        for (i, from) in FORWARD.iter().enumerate().take(4) {
            for to in FORWARD.iter().take(i + 1) {
                assert!(matches!(
                    check_transition(*from, *to),
                    Err(OrderError::InvalidTransition { .. })
                ));
            }
        }
    }

    #[test]
    fn every_non_terminal_status_can_cancel() {
        for from in FORWARD.iter().take(4) {
            assert!(check_transition(*from, OrderStatus::Cancelled).is_ok());
        }
    }

    #[test]
    fn terminal_statuses_reject_everything() {
        for from in [
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
            OrderStatus::Refunded,
        ] {
            for to in OrderStatus::ALL {
                assert_eq!(check_transition(from, to), Err(OrderError::TerminalState(from)));
            }
        }
    }

    #[test]
    fn refunded_is_not_a_lifecycle_target() {
        for from in FORWARD.iter().take(4) {
            assert!(matches!(
                check_transition(*from, OrderStatus::Refunded),
                Err(OrderError::InvalidTransition { .. })
            ));
        }
    }

    #[test]
    fn confirmed_then_shipped_fails_and_keeps_status() {
        let now = Utc::now();
        let order = placed("ORD-3", now);
        let confirmed = apply_status(&order, OrderStatus::Confirmed, now).unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);

        let result = apply_status(&confirmed, OrderStatus::Shipped, now);
        assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));
        assert_eq!(confirmed.status, OrderStatus::Confirmed);
        assert!(confirmed.dates.shipped_date.is_none());
    }

    #[test]
    fn shipped_date_is_not_before_packed_date() {
        let now = Utc::now();
        let order = with_status(placed("ORD-4", now), OrderStatus::Confirmed);
        let packed = apply_status(&order, OrderStatus::Packed, now).unwrap();

        // A clock that went backwards must not produce shipped < packed.
        let shipped = apply_status(&packed, OrderStatus::Shipped, now - Duration::seconds(30))
            .unwrap();
        assert!(shipped.dates.shipped_date.unwrap() >= shipped.dates.packed_date.unwrap());
    }

    #[test]
    fn cancel_does_not_stamp_milestones() {
        let now = Utc::now();
        let order = placed("ORD-5", now);
        let cancelled = apply_status(&order, OrderStatus::Cancelled, now).unwrap();
        assert_eq!(cancelled.dates, order.dates);
        assert_eq!(cancelled.updated_at, now);
    }
}

//! Errors raised by the order lifecycle.

use thiserror::Error;

use crate::types::{OrderId, OrderStatus};

/// Business rule violations for order mutations and queries.
///
/// None of these leave a partial update behind: the pure functions in this
/// crate only return a new order value on success.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// The requested status is not reachable from the current one.
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The order is closed; no further lifecycle change is allowed.
    #[error("order is {0} and can no longer change")]
    TerminalState(OrderStatus),

    /// A cancellation decision was made without an open request.
    #[error("order has no pending cancellation request")]
    NoPendingRequest,

    /// No order with this id exists.
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// Malformed input (filter dates, search terms, new orders).
    #[error("validation failed: {0}")]
    Validation(String),
}

impl OrderError {
    /// Shorthand for a [`OrderError::Validation`] error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Stable machine-readable error kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::TerminalState(_) => "terminal_state",
            Self::NoPendingRequest => "no_pending_request",
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation_error",
        }
    }
}

/// A status string that is not a member of its closed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseStatusError {
    kind: &'static str,
    value: String,
}

impl ParseStatusError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

impl From<ParseStatusError> for OrderError {
    fn from(err: ParseStatusError) -> Self {
        Self::Validation(err.to_string())
    }
}

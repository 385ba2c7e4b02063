//! Shopdesk Core - Order lifecycle domain library.
//!
//! This crate holds the parts of the admin backend that carry real rules:
//! - [`lifecycle`] - the fulfillment status state machine
//! - [`cancellation`] - the customer cancellation / admin refund workflow
//! - [`query`] - order filtering for list views
//! - [`stats`] - dashboard aggregates
//! - [`payments`] and [`invoice`] - read models derived from orders
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Every mutation takes an [`Order`] by reference and returns a
//! new value, so a failed validation never leaves a half-updated record behind.
//! Persisting the result is the caller's job (see `shopdesk-admin`).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cancellation;
pub mod company;
pub mod error;
pub mod invoice;
pub mod lifecycle;
pub mod order;
pub mod payments;
pub mod query;
pub mod stats;
pub mod types;

pub use company::CompanyDetails;
pub use error::{OrderError, ParseStatusError};
pub use order::{CancellationRequest, Customer, LineItem, MilestoneDates, NewOrder, Order, StateGuard};
pub use query::{OrderFilter, OrderQuery};
pub use stats::{DashboardStats, RevenuePolicy};
pub use types::*;

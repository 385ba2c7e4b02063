//! Order service: the lifecycle and refund operations plus read models.
//!
//! Every mutation follows the same loop: read the order, run the pure core
//! function against it, then write the result conditioned on the state that
//! was read. If the condition misses, someone else changed the order first;
//! the loop re-reads and re-validates, so the loser of a race sees the
//! business error (`NoPendingRequest`, `TerminalState`, ...) rather than a
//! silently overwritten order.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::instrument;

use shopdesk_core::invoice::{Invoice, validate_invoice_mobile};
use shopdesk_core::payments::{PaymentFilter, Transaction, transactions};
use shopdesk_core::{
    CompanyDetails, DashboardStats, NewOrder, Order, OrderError, OrderFilter, OrderId, OrderQuery,
    OrderStatus, RevenuePolicy, cancellation, lifecycle,
};

use crate::db::{CompanyStore, OrderStore, ProductStore, RepositoryError};

/// Attempts per mutation before giving up on a contended order.
const MAX_ATTEMPTS: usize = 3;

#[derive(Debug, Error)]
pub enum OrderServiceError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The conditional update kept missing.
    #[error("order {0} is being modified concurrently, try again")]
    Contention(OrderId),
}

/// Order operations over injected stores.
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    products: Arc<dyn ProductStore>,
    company: Arc<dyn CompanyStore>,
    revenue_policy: RevenuePolicy,
}

impl OrderService {
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrderStore>,
        products: Arc<dyn ProductStore>,
        company: Arc<dyn CompanyStore>,
        revenue_policy: RevenuePolicy,
    ) -> Self {
        Self {
            orders,
            products,
            company,
            revenue_policy,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Validate and store a new order.
    ///
    /// # Errors
    ///
    /// `Order(Validation)` for bad input, `Repository(Conflict)` for a
    /// duplicate order id.
    #[instrument(skip(self, new_order), fields(order_id = %new_order.order_id))]
    pub async fn place_order(&self, new_order: NewOrder) -> Result<Order, OrderServiceError> {
        let order = new_order.place(Utc::now())?;
        self.orders.insert(&order).await?;
        tracing::info!(total = %order.total_amount, "order placed");
        Ok(order)
    }

    /// Move an order one step along its lifecycle.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidTransition` or `TerminalState` from the core, or a
    /// repository failure.
    #[instrument(skip(self), fields(order_id = %order_id, target = %target))]
    pub async fn update_order_status(
        &self,
        order_id: &OrderId,
        target: OrderStatus,
    ) -> Result<Order, OrderServiceError> {
        self.mutate(order_id, "update_status", |order, now| {
            lifecycle::apply_status(order, target, now)
        })
        .await
    }

    /// Approve the pending cancellation request and refund the order.
    ///
    /// # Errors
    ///
    /// `NotFound`, `NoPendingRequest` or `TerminalState`.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn approve_cancellation(&self, order_id: &OrderId) -> Result<Order, OrderServiceError> {
        self.mutate(order_id, "approve_cancellation", cancellation::approve)
            .await
    }

    /// Reject the pending cancellation request.
    ///
    /// # Errors
    ///
    /// `NotFound` or `NoPendingRequest`.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn reject_cancellation(&self, order_id: &OrderId) -> Result<Order, OrderServiceError> {
        self.mutate(order_id, "reject_cancellation", cancellation::reject)
            .await
    }

    /// Open a cancellation request on the customer's behalf. An approved
    /// request can be reopened even though the order is refunded.
    ///
    /// # Errors
    ///
    /// `NotFound`, `TerminalState`, or `Validation` if one is already pending.
    #[instrument(skip(self, reason), fields(order_id = %order_id))]
    pub async fn request_cancellation(
        &self,
        order_id: &OrderId,
        reason: Option<String>,
    ) -> Result<Order, OrderServiceError> {
        self.mutate(order_id, "request_cancellation", move |order, now| {
            cancellation::request(order, reason.clone(), now)
        })
        .await
    }

    async fn mutate<F>(
        &self,
        order_id: &OrderId,
        operation: &'static str,
        apply: F,
    ) -> Result<Order, OrderServiceError>
    where
        F: Fn(&Order, DateTime<Utc>) -> Result<Order, OrderError> + Send + Sync,
    {
        for attempt in 1..=MAX_ATTEMPTS {
            let current = self
                .orders
                .get(order_id)
                .await?
                .ok_or_else(|| OrderError::NotFound(order_id.clone()))?;

            let updated = apply(&current, Utc::now()).inspect_err(|e| {
                tracing::info!(operation, code = e.code(), error = %e, "order change rejected");
            })?;

            if self.orders.update_if(current.guard(), &updated).await? {
                tracing::info!(
                    operation,
                    from = %current.status,
                    to = %updated.status,
                    payment_status = %updated.payment_status,
                    "order updated"
                );
                return Ok(updated);
            }

            tracing::warn!(operation, attempt, "order changed underneath us, retrying");
        }

        Err(OrderServiceError::Contention(order_id.clone()))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// # Errors
    ///
    /// `NotFound` if there is no such order.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: &OrderId) -> Result<Order, OrderServiceError> {
        self.orders
            .get(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(order_id.clone()).into())
    }

    /// Orders matching the raw query parameters, newest first.
    ///
    /// # Errors
    ///
    /// `Validation` for malformed or inverted dates.
    #[instrument(skip(self))]
    pub async fn query_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, OrderServiceError> {
        let filter = OrderFilter::from_query(query, Utc::now())?;
        let orders = self.orders.find(&filter).await?;
        tracing::debug!(count = orders.len(), "orders queried");
        Ok(orders)
    }

    /// # Errors
    ///
    /// Repository failures only.
    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, OrderServiceError> {
        let orders = self.orders.find(&OrderFilter::default()).await?;
        let products_count = self.products.count().await?;
        Ok(DashboardStats::compute(
            &orders,
            products_count,
            self.revenue_policy,
        ))
    }

    /// Payment transactions, newest first.
    ///
    /// # Errors
    ///
    /// Repository failures only.
    #[instrument(skip(self))]
    pub async fn payment_transactions(
        &self,
        filter: &PaymentFilter,
    ) -> Result<Vec<Transaction>, OrderServiceError> {
        let orders = self.orders.find(&OrderFilter::default()).await?;
        Ok(transactions(&orders, filter))
    }

    /// Invoices for every order placed from `mobile`, newest first.
    ///
    /// # Errors
    ///
    /// `Validation` if `mobile` is too short to search by.
    #[instrument(skip(self))]
    pub async fn invoices_for_mobile(&self, mobile: &str) -> Result<Vec<Invoice>, OrderServiceError> {
        let mobile = validate_invoice_mobile(mobile)?;
        let orders = self
            .orders
            .find(&OrderFilter::default().with_mobile(mobile))
            .await?;
        let company = self.company().await?;
        Ok(orders
            .iter()
            .map(|order| Invoice::build(order, &company))
            .collect())
    }

    // =========================================================================
    // Company details
    // =========================================================================

    /// The stored company record, or an empty one if none was saved yet.
    ///
    /// # Errors
    ///
    /// Repository failures only.
    pub async fn company(&self) -> Result<CompanyDetails, OrderServiceError> {
        Ok(self.company.get().await?.unwrap_or_default())
    }

    /// Normalize and save the company record.
    ///
    /// # Errors
    ///
    /// `Validation` for a malformed GST number.
    #[instrument(skip(self, details))]
    pub async fn update_company(
        &self,
        details: CompanyDetails,
    ) -> Result<CompanyDetails, OrderServiceError> {
        let details = details.normalized()?;
        let saved = self.company.upsert(&details).await?;
        tracing::info!(name = %saved.name, "company details updated");
        Ok(saved)
    }
}

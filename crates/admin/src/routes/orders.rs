//! Order listing, detail and lifecycle actions.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use shopdesk_core::{Order, OrderError, OrderId, OrderQuery, OrderStatus, lifecycle};

use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// An order plus the statuses the admin UI may offer next.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub allowed_transitions: &'static [OrderStatus],
    pub cancellation_pending: bool,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            allowed_transitions: lifecycle::allowed_targets(order.status),
            cancellation_pending: order.pending_cancellation().is_some(),
            order,
        }
    }
}

// =============================================================================
// Input Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct StatusInput {
    /// Parsed by hand so an unknown status is a validation error, not a 422.
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancellationInput {
    #[serde(default)]
    pub reason: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

#[instrument(skip(_admin, state))]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Vec<OrderView>>, AppError> {
    let orders = state.orders().query_orders(&query).await?;
    Ok(Json(orders.into_iter().map(OrderView::from).collect()))
}

#[instrument(skip(_admin, state))]
pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderView>, AppError> {
    let order = state.orders().get_order(&OrderId::new(order_id)).await?;
    Ok(Json(order.into()))
}

#[instrument(skip(admin, state), fields(admin = %admin.username))]
pub async fn update_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(input): Json<StatusInput>,
) -> Result<Json<OrderView>, AppError> {
    let target: OrderStatus = input.status.parse().map_err(OrderError::from)?;
    let order = state
        .orders()
        .update_order_status(&OrderId::new(order_id), target)
        .await?;
    Ok(Json(order.into()))
}

/// Open a cancellation request. The body is optional.
#[instrument(skip(admin, state, input), fields(admin = %admin.username))]
pub async fn request_cancellation(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    input: Option<Json<CancellationInput>>,
) -> Result<Json<OrderView>, AppError> {
    let reason = input.and_then(|Json(i)| i.reason);
    let order = state
        .orders()
        .request_cancellation(&OrderId::new(order_id), reason)
        .await?;
    Ok(Json(order.into()))
}

/// Approve the pending cancellation; the order becomes refunded.
#[instrument(skip(admin, state), fields(admin = %admin.username))]
pub async fn approve_refund(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderView>, AppError> {
    let order = state
        .orders()
        .approve_cancellation(&OrderId::new(order_id))
        .await?;
    Ok(Json(order.into()))
}

#[instrument(skip(admin, state), fields(admin = %admin.username))]
pub async fn reject_cancellation(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderView>, AppError> {
    let order = state
        .orders()
        .reject_cancellation(&OrderId::new(order_id))
        .await?;
    Ok(Json(order.into()))
}

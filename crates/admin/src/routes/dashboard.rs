//! Dashboard totals.

use axum::{Json, extract::State};
use tracing::instrument;

use shopdesk_core::DashboardStats;

use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

#[instrument(skip(_admin, state))]
pub async fn stats(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, AppError> {
    Ok(Json(state.orders().dashboard_stats().await?))
}

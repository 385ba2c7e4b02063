//! Company details used on invoices.

use axum::{Json, extract::State};
use tracing::instrument;

use shopdesk_core::CompanyDetails;

use crate::error::AppError;
use crate::middleware::{RequireAdminAuth, RequireSuperAdmin};
use crate::state::AppState;

#[instrument(skip(_admin, state))]
pub async fn show_company(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<CompanyDetails>, AppError> {
    Ok(Json(state.orders().company().await?))
}

#[instrument(skip(admin, state, details), fields(admin = %admin.username))]
pub async fn update_company(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Json(details): Json<CompanyDetails>,
) -> Result<Json<CompanyDetails>, AppError> {
    Ok(Json(state.orders().update_company(details).await?))
}

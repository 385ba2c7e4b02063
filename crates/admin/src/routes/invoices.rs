//! Invoice lookup by customer mobile.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use shopdesk_core::invoice::Invoice;

use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct InvoiceQuery {
    #[serde(default)]
    pub mobile: String,
}

#[instrument(skip(_admin, state))]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<InvoiceQuery>,
) -> Result<Json<Vec<Invoice>>, AppError> {
    Ok(Json(state.orders().invoices_for_mobile(&query.mobile).await?))
}

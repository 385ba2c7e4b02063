//! Payment transactions.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use shopdesk_core::OrderError;
use shopdesk_core::payments::{PaymentFilter, PaymentMethod, Transaction};

use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PaymentsQuery {
    /// `online` or `cash`; blank or `all` means both.
    pub method: Option<String>,
    pub search: Option<String>,
}

impl PaymentsQuery {
    fn into_filter(self) -> Result<PaymentFilter, OrderError> {
        let method = match self.method.as_deref().map(str::trim) {
            None | Some("" | "all") => None,
            Some(raw) => Some(raw.parse::<PaymentMethod>()?),
        };
        Ok(PaymentFilter {
            method,
            search: self.search,
        })
    }
}

#[instrument(skip(_admin, state))]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<PaymentsQuery>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let filter = query.into_filter()?;
    Ok(Json(state.orders().payment_transactions(&filter).await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_all_mean_any_method() {
        for method in [None, Some(String::new()), Some("all".to_string())] {
            let filter = PaymentsQuery { method, search: None }.into_filter().unwrap();
            assert_eq!(filter.method, None);
        }
    }

    #[test]
    fn unknown_method_is_validation_error() {
        let err = PaymentsQuery {
            method: Some("cheque".into()),
            search: None,
        }
        .into_filter()
        .unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }
}

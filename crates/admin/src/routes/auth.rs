//! Login and logout.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAdminAuth, clear_current_admin, set_current_admin};
use crate::models::{AdminRole, CurrentAdmin};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginInput")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub role: AdminRole,
}

/// Check credentials and start a session.
#[instrument(skip(state, session, input), fields(username = %input.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(input): Json<LoginInput>,
) -> Result<Json<LoginResponse>, AppError> {
    if input.username.trim().is_empty() || input.password.is_empty() {
        return Err(AppError::BadRequest(
            "username and password are required".to_string(),
        ));
    }

    let admin = state
        .credentials()
        .verify(&input.username, &input.password)
        .await?;

    set_current_admin(&session, &admin)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
    set_sentry_user(&admin.username);

    Ok(Json(LoginResponse {
        success: true,
        role: admin.role,
    }))
}

/// End the session. Succeeds even without one.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<serde_json::Value>, AppError> {
    clear_current_admin(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session clear failed: {e}")))?;
    clear_sentry_user();
    Ok(Json(serde_json::json!({ "success": true })))
}

pub async fn me(RequireAdminAuth(admin): RequireAdminAuth) -> Json<CurrentAdmin> {
    Json(admin)
}

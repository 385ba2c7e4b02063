//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                               - Liveness
//! GET  /health/ready                         - Readiness (store reachable)
//!
//! # Auth
//! POST /api/auth/login                       - Username/password login
//! POST /api/auth/logout                      - Logout
//! GET  /api/auth/me                          - Current admin
//!
//! # Orders
//! GET  /api/orders                           - Filtered listing
//! GET  /api/orders/{orderId}                 - Detail with allowed transitions
//! PUT  /api/orders/{orderId}/status          - Lifecycle step
//! POST /api/orders/{orderId}/cancellation    - Open a cancellation request
//! POST /api/orders/{orderId}/refund          - Approve the request and refund
//! POST /api/orders/{orderId}/cancellation/reject
//!
//! # Reporting
//! GET  /api/payments                         - Payment transactions
//! GET  /api/invoices?mobile=                 - Invoices by customer mobile
//! GET  /api/dashboard/stats                  - Dashboard totals
//!
//! # Settings
//! GET  /api/settings/company                 - Company details
//! PUT  /api/settings/company                 - Update (super admin only)
//!
//! Anything else is a JSON 404.
//! ```

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod invoices;
pub mod orders;
pub mod payments;
pub mod settings;

use axum::{
    Router,
    http::Uri,
    routing::{get, post, put},
};

use crate::error::AppError;
use crate::state::AppState;

/// Build the API router (without layers or state).
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        // Auth
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        // Orders
        .route("/api/orders", get(orders::index))
        .route("/api/orders/{order_id}", get(orders::show))
        .route("/api/orders/{order_id}/status", put(orders::update_status))
        .route(
            "/api/orders/{order_id}/cancellation",
            post(orders::request_cancellation),
        )
        .route("/api/orders/{order_id}/refund", post(orders::approve_refund))
        .route(
            "/api/orders/{order_id}/cancellation/reject",
            post(orders::reject_cancellation),
        )
        // Reporting
        .route("/api/payments", get(payments::index))
        .route("/api/invoices", get(invoices::index))
        .route("/api/dashboard/stats", get(dashboard::stats))
        // Settings
        .route(
            "/api/settings/company",
            get(settings::show_company).put(settings::update_company),
        )
        .fallback(not_found)
}

/// JSON 404 for unknown paths.
async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}

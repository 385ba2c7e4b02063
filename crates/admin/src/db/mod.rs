//! Persistence for the admin backend.
//!
//! # Tables
//!
//! - `orders` - Order documents (line items as JSONB)
//! - `products` - Catalogue entries (only counted by the dashboard)
//! - `company_details` - Singleton company record for invoices
//! - `admin_users` - Admin logins with argon2 password hashes
//! - `tower_sessions.session` - Session storage
//!
//! Each concern is a trait so handlers can run against `PostgreSQL` in
//! production and [`memory::MemoryStore`] in tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p shopdesk-cli -- migrate
//! ```

pub mod admin_users;
pub mod company;
pub mod memory;
pub mod orders;
pub mod products;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use shopdesk_core::{AdminRole, CompanyDetails, Order, OrderFilter, OrderId, StateGuard};

use crate::models::AdminUser;

pub use admin_users::PgAdminUserStore;
pub use company::PgCompanyStore;
pub use memory::MemoryStore;
pub use orders::PgOrderStore;
pub use products::PgProductStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., duplicate order id).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Order documents.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn get(&self, order_id: &OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Orders matching `filter`, newest first.
    async fn find(&self, filter: &OrderFilter) -> Result<Vec<Order>, RepositoryError>;

    /// Store a newly placed order.
    ///
    /// Returns [`RepositoryError::Conflict`] if the order id is taken.
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError>;

    /// Replace the mutable fields of `order` if the stored order still
    /// matches `expected`.
    ///
    /// Returns `false` when the guard missed (another writer got there
    /// first, or the order does not exist).
    async fn update_if(&self, expected: StateGuard, order: &Order)
    -> Result<bool, RepositoryError>;

    /// Cheap connectivity check for the readiness route.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// The singleton company record.
#[async_trait]
pub trait CompanyStore: Send + Sync {
    async fn get(&self) -> Result<Option<CompanyDetails>, RepositoryError>;
    async fn upsert(&self, details: &CompanyDetails) -> Result<CompanyDetails, RepositoryError>;
}

/// The product catalogue, as far as the dashboard needs it.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn count(&self) -> Result<u64, RepositoryError>;
}

/// Admin logins.
#[async_trait]
pub trait AdminUserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminUser>, RepositoryError>;

    /// Returns [`RepositoryError::Conflict`] if the username is taken.
    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        role: AdminRole,
    ) -> Result<AdminUser, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique-constraint violation to [`RepositoryError::Conflict`].
fn conflict_or_database(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}

fn count_to_u64(count: i64) -> Result<u64, RepositoryError> {
    u64::try_from(count)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative row count {count}")))
}

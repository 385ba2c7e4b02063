//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! ADMIN_PASSWORD='...' sd-cli admin create -u priya -r admin
//! ```
//!
//! Without `ADMIN_PASSWORD` the password is read from the first line of stdin,
//! so it never appears in shell history or the process list.
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string for admin database
//! - `ADMIN_PASSWORD` - Password for the new admin (optional)

use std::io::BufRead;
use std::sync::Arc;

use secrecy::SecretString;
use thiserror::Error;

use shopdesk_admin::db::PgAdminUserStore;
use shopdesk_admin::services::{AdminAuthError, AdminAuthService};
use shopdesk_core::AdminRole;

use super::{CommandError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: super_admin, admin")]
    InvalidRole(String),

    /// Password could not be read.
    #[error("Could not read password: {0}")]
    Password(#[from] std::io::Error),

    /// Creation rejected (duplicate, weak password, database).
    #[error(transparent)]
    Auth(#[from] AdminAuthError),
}

/// Create a new admin user.
///
/// # Errors
///
/// Returns an error for an unknown role, an unreadable or short password, a
/// duplicate username or a database failure.
pub async fn create_user(username: &str, role: &str) -> Result<(), AdminError> {
    let role: AdminRole = role
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))?;

    let password = read_password()?;
    let pool = connect().await?;

    tracing::info!("Creating admin user: {} ({})", username, role);

    let auth = AdminAuthService::new(None, Arc::new(PgAdminUserStore::new(pool)))?;
    let user = auth.create_admin(username, &password, role).await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Username: {}, Role: {}",
        user.id,
        user.username,
        user.role
    );
    Ok(())
}

fn read_password() -> Result<SecretString, std::io::Error> {
    if let Ok(password) = std::env::var("ADMIN_PASSWORD")
        && !password.is_empty()
    {
        return Ok(SecretString::from(password));
    }

    tracing::info!("Reading password from stdin...");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(SecretString::from(line.trim_end_matches(['\r', '\n']).to_string()))
}

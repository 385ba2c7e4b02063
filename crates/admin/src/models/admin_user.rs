//! Admin user domain types.

use chrono::{DateTime, Utc};
use secrecy::SecretString;

use shopdesk_core::{AdminRole, AdminUserId};

/// An admin login stored in the database.
///
/// `Debug` never prints the password hash: `SecretString` redacts it.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: SecretString,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

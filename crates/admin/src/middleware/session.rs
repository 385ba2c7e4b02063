//! Session middleware configuration for admin.
//!
//! Production sessions live in `PostgreSQL` via tower-sessions-sqlx-store
//! (table `tower_sessions.session`, created by migration). Tests pass a
//! `MemoryStore` instead. The session cookie is signed with
//! `ADMIN_SESSION_SECRET`.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::ConfigError;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "shopdesk_admin_session";

/// Session expiry time in seconds (24 hours of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// `PostgreSQL` session store using the default `tower_sessions.session` table.
#[must_use]
pub fn postgres_session_store(pool: &PgPool) -> PostgresStore {
    PostgresStore::new(pool.clone())
}

/// Cookie signing key from the configured session secret.
///
/// # Errors
///
/// Returns `ConfigError::InsecureSecret` if the secret is shorter than a key.
pub fn session_key(secret: &SecretString) -> Result<Key, ConfigError> {
    Key::try_from(secret.expose_secret().as_bytes()).map_err(|e| {
        ConfigError::InsecureSecret("ADMIN_SESSION_SECRET".to_string(), e.to_string())
    })
}

/// Create the signed session layer over any store.
///
/// `secure` marks the cookie HTTPS-only; pass `AdminConfig::secure_cookies()`.
#[must_use]
pub fn create_session_layer<S: SessionStore + Clone>(
    store: S,
    key: Key,
    secure: bool,
) -> SessionManagerLayer<S, SignedCookie> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key)
}

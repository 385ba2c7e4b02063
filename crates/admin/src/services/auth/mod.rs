//! Admin authentication service.
//!
//! Username and password login against two sources: the bootstrap super
//! admin from the environment, then the `admin_users` table. Passwords are
//! only ever held as argon2 PHC strings; the environment password is hashed
//! once at startup. Hashing and verification during requests run on the
//! blocking pool.

mod error;

pub use error::AdminAuthError;

use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use shopdesk_core::AdminRole;

use crate::config::SuperAdminConfig;
use crate::db::{AdminUserStore, RepositoryError};
use crate::models::{AdminUser, CurrentAdmin};

/// Minimum length for passwords of newly created admins.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Hash a password into an argon2 PHC string.
///
/// # Errors
///
/// Returns `AdminAuthError::Hashing` if argon2 rejects the input.
pub fn hash_password(password: &str) -> Result<String, AdminAuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check a password against a PHC string. Malformed hashes never verify.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// [`hash_password`] on the blocking pool, off the async workers.
async fn hash_password_blocking(password: &SecretString) -> Result<String, AdminAuthError> {
    let password = SecretString::from(password.expose_secret().to_owned());
    tokio::task::spawn_blocking(move || hash_password(password.expose_secret()))
        .await
        .map_err(|e| AdminAuthError::Hashing(format!("hashing task failed: {e}")))?
}

/// [`verify_password`] on the blocking pool. A failed task never verifies.
async fn verify_password_blocking(password: &str, hash: &str) -> bool {
    let password = SecretString::from(password.to_owned());
    let hash = hash.to_owned();
    match tokio::task::spawn_blocking(move || verify_password(password.expose_secret(), &hash))
        .await
    {
        Ok(verified) => verified,
        Err(e) => {
            tracing::error!(error = %e, "password verification task failed");
            false
        }
    }
}

/// Checks login credentials. Injected into the login route.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// # Errors
    ///
    /// `AdminAuthError::InvalidCredentials` when the pair does not match.
    async fn verify(&self, username: &str, password: &str)
    -> Result<CurrentAdmin, AdminAuthError>;
}

struct BootstrapAdmin {
    username: String,
    password_hash: SecretString,
}

/// Admin authentication service.
#[derive(Clone)]
pub struct AdminAuthService {
    bootstrap: Option<Arc<BootstrapAdmin>>,
    users: Arc<dyn AdminUserStore>,
    /// Verified against when the username is unknown, so a miss costs the
    /// same as a wrong password.
    decoy_hash: Arc<str>,
}

impl AdminAuthService {
    /// Create the service, hashing the bootstrap password if one is configured.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::Hashing` if argon2 fails.
    pub fn new(
        super_admin: Option<&SuperAdminConfig>,
        users: Arc<dyn AdminUserStore>,
    ) -> Result<Self, AdminAuthError> {
        let bootstrap = super_admin
            .map(|cfg| -> Result<_, AdminAuthError> {
                Ok(Arc::new(BootstrapAdmin {
                    username: cfg.username.clone(),
                    password_hash: SecretString::from(hash_password(
                        cfg.password.expose_secret(),
                    )?),
                }))
            })
            .transpose()?;

        Ok(Self {
            bootstrap,
            users,
            decoy_hash: hash_password("decoy password for unknown users")?.into(),
        })
    }

    /// Check a username and password.
    ///
    /// The bootstrap super admin is tried first and shadows a database user
    /// with the same name.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` for an unknown user or a
    /// wrong password, and `AdminAuthError::Repository` if the lookup fails.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<CurrentAdmin, AdminAuthError> {
        let username = username.trim();

        if let Some(bootstrap) = &self.bootstrap
            && bootstrap.username == username
        {
            return if verify_password_blocking(password, bootstrap.password_hash.expose_secret())
                .await
            {
                tracing::info!(username, "super admin logged in");
                Ok(CurrentAdmin {
                    username: bootstrap.username.clone(),
                    role: AdminRole::SuperAdmin,
                })
            } else {
                tracing::warn!(username, "failed login");
                Err(AdminAuthError::InvalidCredentials)
            };
        }

        let Some(user) = self.users.find_by_username(username).await? else {
            let _ = verify_password_blocking(password, &self.decoy_hash).await;
            tracing::warn!(username, "failed login for unknown user");
            return Err(AdminAuthError::InvalidCredentials);
        };

        if !verify_password_blocking(password, user.password_hash.expose_secret()).await {
            tracing::warn!(username, "failed login");
            return Err(AdminAuthError::InvalidCredentials);
        }

        tracing::info!(username, role = %user.role, "admin logged in");
        Ok(CurrentAdmin {
            username: user.username,
            role: user.role,
        })
    }

    /// Create a database admin.
    ///
    /// # Errors
    ///
    /// - `AdminAuthError::InvalidInput` for an empty username or a short password
    /// - `AdminAuthError::UserAlreadyExists` if the username is taken, including
    ///   by the bootstrap super admin
    pub async fn create_admin(
        &self,
        username: &str,
        password: &SecretString,
        role: AdminRole,
    ) -> Result<AdminUser, AdminAuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AdminAuthError::InvalidInput("username must not be empty".into()));
        }
        if password.expose_secret().chars().count() < MIN_PASSWORD_LEN {
            return Err(AdminAuthError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if self
            .bootstrap
            .as_ref()
            .is_some_and(|b| b.username == username)
        {
            return Err(AdminAuthError::UserAlreadyExists);
        }

        let hash = hash_password_blocking(password).await?;
        let user = self
            .users
            .create(username, &hash, role)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AdminAuthError::UserAlreadyExists,
                other => AdminAuthError::Repository(other),
            })?;

        tracing::info!(username, role = %role, "admin user created");
        Ok(user)
    }
}

#[async_trait]
impl CredentialVerifier for AdminAuthService {
    async fn verify(
        &self,
        username: &str,
        password: &str,
    ) -> Result<CurrentAdmin, AdminAuthError> {
        self.authenticate(username, password).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::db::MemoryStore;

    fn bootstrap() -> SuperAdminConfig {
        SuperAdminConfig {
            username: "owner".into(),
            password: SecretString::from("k3#Vq!9zLr@2wPx"),
        }
    }

    #[test]
    fn hash_round_trip() {
        let hash = hash_password("s3cret-Pass").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret-Pass", &hash));
        assert!(!verify_password("s3cret-pass", &hash));
        assert!(!verify_password("s3cret-Pass", "not a phc string"));
    }

    #[tokio::test]
    async fn bootstrap_super_admin_logs_in() {
        let auth = AdminAuthService::new(Some(&bootstrap()), Arc::new(MemoryStore::new())).unwrap();

        let admin = auth.authenticate("owner", "k3#Vq!9zLr@2wPx").await.unwrap();
        assert!(admin.is_super_admin());

        assert!(matches!(
            auth.authenticate("owner", "wrong").await,
            Err(AdminAuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn database_admin_logs_in_with_its_role() {
        let auth = AdminAuthService::new(None, Arc::new(MemoryStore::new())).unwrap();
        auth.create_admin("priya", &SecretString::from("orders-2024!"), AdminRole::Admin)
            .await
            .unwrap();

        let admin = auth.authenticate(" priya ", "orders-2024!").await.unwrap();
        assert_eq!(admin.role, AdminRole::Admin);
        assert!(!admin.is_super_admin());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn login_leaves_the_runtime_free_while_hashing() {
        let auth = AdminAuthService::new(Some(&bootstrap()), Arc::new(MemoryStore::new())).unwrap();
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = tokio::spawn({
            let ticks = Arc::clone(&ticks);
            async move {
                loop {
                    ticks.fetch_add(1, Ordering::Relaxed);
                    tokio::task::yield_now().await;
                }
            }
        });

        auth.authenticate("owner", "k3#Vq!9zLr@2wPx").await.unwrap();
        ticker.abort();

        assert!(ticks.load(Ordering::Relaxed) > 0);
    }

    #[tokio::test]
    async fn unknown_user_is_invalid_credentials() {
        let auth = AdminAuthService::new(None, Arc::new(MemoryStore::new())).unwrap();
        assert!(matches!(
            auth.authenticate("admin", "admin123").await,
            Err(AdminAuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn create_admin_rejects_bad_input_and_duplicates() {
        let auth = AdminAuthService::new(Some(&bootstrap()), Arc::new(MemoryStore::new())).unwrap();
        let password = SecretString::from("long enough");

        assert!(matches!(
            auth.create_admin("  ", &password, AdminRole::Admin).await,
            Err(AdminAuthError::InvalidInput(_))
        ));
        assert!(matches!(
            auth.create_admin("sam", &SecretString::from("short"), AdminRole::Admin)
                .await,
            Err(AdminAuthError::InvalidInput(_))
        ));
        assert!(matches!(
            auth.create_admin("owner", &password, AdminRole::Admin).await,
            Err(AdminAuthError::UserAlreadyExists)
        ));

        auth.create_admin("sam", &password, AdminRole::Admin).await.unwrap();
        assert!(matches!(
            auth.create_admin("sam", &password, AdminRole::SuperAdmin).await,
            Err(AdminAuthError::UserAlreadyExists)
        ));
    }
}

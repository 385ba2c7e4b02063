//! Application state shared across handlers.

use std::sync::Arc;

use shopdesk_core::RevenuePolicy;

use crate::db::{AdminUserStore, CompanyStore, OrderStore, ProductStore};
use crate::services::{AdminAuthError, AdminAuthService, CredentialVerifier, OrderService};

/// Application state shared across all handlers.
///
/// Cheap to clone: everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    orders: OrderService,
    credentials: Arc<dyn CredentialVerifier>,
    order_store: Arc<dyn OrderStore>,
}

/// The stores the service runs on.
#[derive(Clone)]
pub struct Stores {
    pub orders: Arc<dyn OrderStore>,
    pub products: Arc<dyn ProductStore>,
    pub company: Arc<dyn CompanyStore>,
    pub admins: Arc<dyn AdminUserStore>,
}

impl Stores {
    /// Use one object for every store, as the in-memory store allows.
    pub fn single<S>(store: Arc<S>) -> Self
    where
        S: OrderStore + ProductStore + CompanyStore + AdminUserStore + 'static,
    {
        Self {
            orders: store.clone(),
            products: store.clone(),
            company: store.clone(),
            admins: store,
        }
    }
}

impl AppState {
    /// Build state from stores and an explicit credential verifier.
    #[must_use]
    pub fn new(
        stores: Stores,
        credentials: Arc<dyn CredentialVerifier>,
        revenue_policy: RevenuePolicy,
    ) -> Self {
        let orders = OrderService::new(
            stores.orders.clone(),
            stores.products,
            stores.company,
            revenue_policy,
        );
        Self {
            inner: Arc::new(AppStateInner {
                orders,
                credentials,
                order_store: stores.orders,
            }),
        }
    }

    /// Build state with the standard [`AdminAuthService`] as verifier.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::Hashing` if the bootstrap password cannot be hashed.
    pub fn with_auth_service(
        stores: Stores,
        super_admin: Option<&crate::config::SuperAdminConfig>,
        revenue_policy: RevenuePolicy,
    ) -> Result<Self, AdminAuthError> {
        let auth = AdminAuthService::new(super_admin, stores.admins.clone())?;
        Ok(Self::new(stores, Arc::new(auth), revenue_policy))
    }

    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.orders
    }

    #[must_use]
    pub fn credentials(&self) -> &dyn CredentialVerifier {
        self.inner.credentials.as_ref()
    }

    /// Order store, for readiness checks.
    #[must_use]
    pub fn order_store(&self) -> &dyn OrderStore {
        self.inner.order_store.as_ref()
    }
}

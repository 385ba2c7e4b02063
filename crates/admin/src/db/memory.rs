//! In-memory stores for tests and local demos.
//!
//! One [`MemoryStore`] implements every store trait. Each method takes the
//! lock once, so `update_if` is as atomic as the conditional `UPDATE` in
//! the `PostgreSQL` store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use secrecy::SecretString;
use tokio::sync::RwLock;

use shopdesk_core::query::sort_newest_first;
use shopdesk_core::{
    AdminRole, AdminUserId, CompanyDetails, Order, OrderFilter, OrderId, StateGuard,
};

use super::{AdminUserStore, CompanyStore, OrderStore, ProductStore, RepositoryError};
use crate::models::AdminUser;

#[derive(Debug, Default)]
struct Inner {
    orders: HashMap<OrderId, Order>,
    company: Option<CompanyDetails>,
    products: u64,
    admins: Vec<AdminUser>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of catalogue products reported by [`ProductStore::count`].
    pub async fn set_products_count(&self, count: u64) {
        self.inner.write().await.products = count;
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn get(&self, order_id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.inner.read().await.orders.get(order_id).cloned())
    }

    async fn find(&self, filter: &OrderFilter) -> Result<Vec<Order>, RepositoryError> {
        let inner = self.inner.read().await;
        let mut found = filter.apply(inner.orders.values().cloned());
        sort_newest_first(&mut found);
        Ok(found)
    }

    async fn insert(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.orders.contains_key(&order.order_id) {
            return Err(RepositoryError::Conflict(format!(
                "order {} already exists",
                order.order_id
            )));
        }
        inner.orders.insert(order.order_id.clone(), order.clone());
        Ok(())
    }

    async fn update_if(
        &self,
        expected: StateGuard,
        order: &Order,
    ) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;
        match inner.orders.get_mut(&order.order_id) {
            Some(stored) if stored.guard() == expected => {
                *stored = order.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[async_trait]
impl CompanyStore for MemoryStore {
    async fn get(&self) -> Result<Option<CompanyDetails>, RepositoryError> {
        Ok(self.inner.read().await.company.clone())
    }

    async fn upsert(&self, details: &CompanyDetails) -> Result<CompanyDetails, RepositoryError> {
        self.inner.write().await.company = Some(details.clone());
        Ok(details.clone())
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.inner.read().await.products)
    }
}

#[async_trait]
impl AdminUserStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminUser>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.admins.iter().find(|a| a.username == username).cloned())
    }

    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        role: AdminRole,
    ) -> Result<AdminUser, RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.admins.iter().any(|a| a.username == username) {
            return Err(RepositoryError::Conflict(format!(
                "admin user {username} already exists"
            )));
        }

        let id = i32::try_from(inner.admins.len() + 1)
            .map_err(|_| RepositoryError::DataCorruption("admin id overflow".into()))?;
        let now = Utc::now();
        let user = AdminUser {
            id: AdminUserId::new(id),
            username: username.to_string(),
            password_hash: SecretString::from(password_hash.to_string()),
            role,
            created_at: now,
            updated_at: now,
        };
        inner.admins.push(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use shopdesk_core::{
        Customer, LineItem, NewOrder, OrderStatus, PaymentStatus, Price, cancellation,
    };

    use super::*;

    fn order(id: &str) -> Order {
        NewOrder {
            order_id: OrderId::new(id),
            customer: Customer {
                name: "Ravi Kumar".into(),
                mobile: "9988776655".into(),
                address: "4 Park Street, Kolkata".into(),
            },
            products: vec![LineItem {
                name: "Kettle".into(),
                quantity: 1,
                price: Price::from_rupees(900),
            }],
            payment_id: None,
            payment_status: PaymentStatus::Pending,
        }
        .place(Utc::now())
        .unwrap()
    }

    #[tokio::test]
    async fn duplicate_insert_conflicts() {
        let store = MemoryStore::new();
        store.insert(&order("ORD-1")).await.unwrap();
        let err = store.insert(&order("ORD-1")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_if_misses_on_stale_guard() {
        let store = MemoryStore::new();
        let placed = order("ORD-2");
        store.insert(&placed).await.unwrap();

        let mut confirmed = placed.clone();
        confirmed.status = OrderStatus::Confirmed;
        assert!(store.update_if(placed.guard(), &confirmed).await.unwrap());

        // Second writer still believes the order is placed.
        let mut cancelled = placed.clone();
        cancelled.status = OrderStatus::Cancelled;
        assert!(!store.update_if(placed.guard(), &cancelled).await.unwrap());

        let stored = OrderStore::get(&store, &placed.order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn update_if_misses_after_request_is_reopened() {
        let store = MemoryStore::new();
        let placed = order("ORD-3");
        store.insert(&placed).await.unwrap();

        let t0 = Utc::now();
        let first = cancellation::request(&placed, Some("reason A".into()), t0).unwrap();
        assert!(store.update_if(placed.guard(), &first).await.unwrap());

        // Approval prepared against the first request, written late.
        let stale = cancellation::approve(&first, t0).unwrap();

        let rejected = cancellation::reject(&first, t0 + Duration::seconds(1)).unwrap();
        assert!(store.update_if(first.guard(), &rejected).await.unwrap());
        let second = cancellation::request(
            &rejected,
            Some("reason B".into()),
            t0 + Duration::seconds(2),
        )
        .unwrap();
        assert!(store.update_if(rejected.guard(), &second).await.unwrap());
        assert_eq!(first.guard().cancellation, second.guard().cancellation);

        assert!(!store.update_if(first.guard(), &stale).await.unwrap());

        let stored = OrderStore::get(&store, &placed.order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Placed);
        let request = stored.pending_cancellation().unwrap();
        assert_eq!(request.reason.as_deref(), Some("reason B"));
    }

    #[tokio::test]
    async fn admin_usernames_are_unique() {
        let store = MemoryStore::new();
        store.create("priya", "$argon2id$x", AdminRole::Admin).await.unwrap();
        let err = store.create("priya", "$argon2id$y", AdminRole::Admin).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }
}

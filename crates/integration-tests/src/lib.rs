//! Integration tests for Shopdesk.
//!
//! The admin router is driven in-process with `tower::ServiceExt::oneshot`
//! against the in-memory stores and an in-memory session store, so the
//! tests need no database.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopdesk-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::MemoryStore as MemorySessionStore;
use tower_sessions::cookie::Key;

use shopdesk_admin::build_router;
use shopdesk_admin::config::SuperAdminConfig;
use shopdesk_admin::db::{AdminUserStore, MemoryStore, OrderStore};
use shopdesk_admin::middleware::create_session_layer;
use shopdesk_admin::services::auth::hash_password;
use shopdesk_admin::state::{AppState, Stores};
use shopdesk_core::{
    AdminRole, Customer, LineItem, NewOrder, Order, OrderId, PaymentStatus, Price, RevenuePolicy,
};

pub const SUPER_ADMIN: (&str, &str) = ("owner", "k3#Vq!9zLr@2wPx");
pub const ADMIN: (&str, &str) = ("priya", "orders-2024!");

const SESSION_SECRET: &str =
    "test-only-session-signing-secret-0123456789abcdefghijklmnopqrstuvwxyzABCDEF";

/// A router over fresh in-memory stores.
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryStore>,
}

/// Status and parsed JSON body (`Null` for non-JSON bodies).
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub cookie: Option<String>,
    pub headers: HeaderMap,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_policy(RevenuePolicy::default()).await
    }

    pub async fn with_policy(policy: RevenuePolicy) -> Self {
        let store = Arc::new(MemoryStore::new());
        AdminUserStore::create(
            store.as_ref(),
            ADMIN.0,
            &hash_password(ADMIN.1).unwrap(),
            AdminRole::Admin,
        )
        .await
        .unwrap();

        let super_admin = SuperAdminConfig {
            username: SUPER_ADMIN.0.to_string(),
            password: SecretString::from(SUPER_ADMIN.1),
        };
        let state =
            AppState::with_auth_service(Stores::single(store.clone()), Some(&super_admin), policy)
                .unwrap();

        let key = Key::try_from(SESSION_SECRET.as_bytes()).unwrap();
        let session_layer = create_session_layer(MemorySessionStore::default(), key, false);

        Self {
            router: build_router(state, session_layer),
            store,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let cookie = headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            cookie,
            headers,
        }
    }

    pub async fn get(&self, uri: &str, cookie: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(cookie), None).await
    }

    pub async fn post(&self, uri: &str, cookie: &str, body: Option<Value>) -> TestResponse {
        self.request(Method::POST, uri, Some(cookie), body).await
    }

    pub async fn put(&self, uri: &str, cookie: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(cookie), Some(body))
            .await
    }

    /// Log in and return the session cookie.
    pub async fn login(&self, (username, password): (&str, &str)) -> String {
        let response = self
            .request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(serde_json::json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        response.cookie.unwrap()
    }

    /// Insert a placed order directly into the store.
    pub async fn seed_order(&self, order_id: &str, mobile: &str, created_at: DateTime<Utc>) -> Order {
        let order = new_order(order_id, mobile).place(created_at).unwrap();
        self.store.insert(&order).await.unwrap();
        order
    }

    pub async fn stored(&self, order_id: &str) -> Order {
        OrderStore::get(self.store.as_ref(), &OrderId::new(order_id))
            .await
            .unwrap()
            .unwrap()
    }
}

/// A Rs 500 online-paid order (2 x Rs 150 + 1 x Rs 200).
pub fn new_order(order_id: &str, mobile: &str) -> NewOrder {
    NewOrder {
        order_id: OrderId::new(order_id),
        customer: Customer {
            name: "Asha Verma".to_string(),
            mobile: mobile.to_string(),
            address: "12 MG Road, Pune".to_string(),
        },
        products: vec![
            LineItem {
                name: "Tea".to_string(),
                quantity: 2,
                price: Price::from_rupees(150),
            },
            LineItem {
                name: "Mug".to_string(),
                quantity: 1,
                price: Price::from_rupees(200),
            },
        ],
        payment_id: Some(format!("pay_{order_id}")),
        payment_status: PaymentStatus::Success,
    }
}

//! Payments, invoices, dashboard and company settings over HTTP.

#![allow(clippy::unwrap_used)]

use std::str::FromStr;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde_json::{Value, json};

use shopdesk_admin::db::OrderStore;
use shopdesk_core::{PaymentStatus, RevenuePolicy};
use shopdesk_integration_tests::{ADMIN, SUPER_ADMIN, TestApp, new_order};

fn rupees(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().unwrap()).unwrap()
}

/// Cash on delivery: no gateway id, marked paid.
async fn seed_cash_order(app: &TestApp, order_id: &str, mobile: &str) {
    let mut order = new_order(order_id, mobile);
    order.payment_id = None;
    order.payment_status = PaymentStatus::Success;
    let order = order.place(Utc::now() - Duration::hours(2)).unwrap();
    app.store.insert(&order).await.unwrap();
}

/// One order left placed, one cancelled, one refunded.
async fn seed_mixed(app: &TestApp, cookie: &str) {
    let now = Utc::now();
    app.seed_order("ORD-1", "9876543210", now - Duration::hours(3)).await;
    app.seed_order("ORD-2", "9876543211", now - Duration::hours(2)).await;
    app.seed_order("ORD-3", "9876543212", now - Duration::hours(1)).await;

    let cancelled = app
        .put("/api/orders/ORD-2/status", cookie, json!({ "status": "cancelled" }))
        .await;
    assert_eq!(cancelled.status, StatusCode::OK);

    let requested = app
        .post(
            "/api/orders/ORD-3/cancellation",
            cookie,
            Some(json!({ "reason": "ordered twice" })),
        )
        .await;
    assert_eq!(requested.status, StatusCode::OK);
    let refunded = app.post("/api/orders/ORD-3/refund", cookie, None).await;
    assert_eq!(refunded.status, StatusCode::OK);
}

// =============================================================================
// Payments
// =============================================================================

#[tokio::test]
async fn test_payments_filter_by_method_and_search() {
    let app = TestApp::new().await;
    app.seed_order("ORD-ON", "9876543210", Utc::now()).await;
    seed_cash_order(&app, "ORD-COD", "9123456780").await;
    let cookie = app.login(ADMIN).await;

    let all = app.get("/api/payments", &cookie).await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(all.body.as_array().unwrap().len(), 2);

    let cash = app.get("/api/payments?method=cash", &cookie).await;
    let cash = cash.body.as_array().unwrap();
    assert_eq!(cash.len(), 1);
    assert_eq!(cash[0]["orderId"], "ORD-COD");
    assert_eq!(cash[0]["method"], "cash");
    assert!(cash[0]["paymentId"].is_null());

    let online = app.get("/api/payments?method=online&search=PAY_ORD", &cookie).await;
    let online = online.body.as_array().unwrap();
    assert_eq!(online.len(), 1);
    assert_eq!(online[0]["paymentId"], "pay_ORD-ON");
}

#[tokio::test]
async fn test_unknown_payment_method_is_rejected() {
    let app = TestApp::new().await;
    let cookie = app.login(ADMIN).await;

    let response = app.get("/api/payments?method=cheque", &cookie).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "validation_error");
}

// =============================================================================
// Invoices
// =============================================================================

#[tokio::test]
async fn test_invoice_lookup_needs_full_mobile() {
    let app = TestApp::new().await;
    app.seed_order("ORD-1", "9876543210", Utc::now()).await;
    let cookie = app.login(ADMIN).await;

    for uri in ["/api/invoices?mobile=98765", "/api/invoices"] {
        let response = app.get(uri, &cookie).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(response.body["code"], "validation_error");
    }
}

#[tokio::test]
async fn test_invoices_carry_company_and_lines() {
    let app = TestApp::new().await;
    let now = Utc::now();
    app.seed_order("ORD-OLD", "9876543210", now - Duration::days(2)).await;
    app.seed_order("ORD-NEW", "9876543210", now).await;
    app.seed_order("ORD-OTHER", "9000000000", now).await;

    let owner = app.login(SUPER_ADMIN).await;
    let saved = app
        .put(
            "/api/settings/company",
            &owner,
            json!({ "name": "Chai Co", "gstNumber": "27ABCDE1234F1Z5" }),
        )
        .await;
    assert_eq!(saved.status, StatusCode::OK);

    let cookie = app.login(ADMIN).await;
    let response = app.get("/api/invoices?mobile=9876543210", &cookie).await;
    assert_eq!(response.status, StatusCode::OK);

    let invoices = response.body.as_array().unwrap();
    assert_eq!(invoices.len(), 2);
    assert_eq!(invoices[0]["invoiceNumber"], "INV-ORD-NEW");
    assert_eq!(invoices[1]["invoiceNumber"], "INV-ORD-OLD");
    assert_eq!(invoices[0]["company"]["name"], "Chai Co");
    assert_eq!(invoices[0]["lines"].as_array().unwrap().len(), 2);
    assert_eq!(rupees(&invoices[0]["totalAmount"]), Decimal::from(500));
    assert_eq!(invoices[0]["refunded"], false);
}

// =============================================================================
// Dashboard
// =============================================================================

#[tokio::test]
async fn test_dashboard_excludes_refunds_by_default() {
    let app = TestApp::new().await;
    app.store.set_products_count(8).await;
    let cookie = app.login(ADMIN).await;
    seed_mixed(&app, &cookie).await;

    let response = app.get("/api/dashboard/stats", &cookie).await;
    assert_eq!(response.status, StatusCode::OK);
    let stats = &response.body;

    assert_eq!(stats["totalOrders"], 3);
    assert_eq!(rupees(&stats["totalSales"]), Decimal::from(500));
    assert_eq!(stats["totalCancelledOrders"], 1);
    assert_eq!(rupees(&stats["totalCancelledAmount"]), Decimal::from(500));
    assert_eq!(stats["productsCount"], 8);

    let breakdown = stats["statusBreakdown"].as_array().unwrap();
    let count_of = |status: &str| {
        breakdown
            .iter()
            .find(|entry| entry["status"] == status)
            .map(|entry| entry["count"].as_u64().unwrap())
            .unwrap()
    };
    assert_eq!(count_of("placed"), 1);
    assert_eq!(count_of("cancelled"), 1);
    assert_eq!(count_of("refunded"), 1);
    assert_eq!(count_of("shipped"), 0);
}

#[tokio::test]
async fn test_dashboard_can_count_refunds_as_sales() {
    let app = TestApp::with_policy(RevenuePolicy::IncludeRefunded).await;
    let cookie = app.login(ADMIN).await;
    seed_mixed(&app, &cookie).await;

    let stats = app.get("/api/dashboard/stats", &cookie).await.body;
    assert_eq!(rupees(&stats["totalSales"]), Decimal::from(1000));
    assert_eq!(stats["totalCancelledOrders"], 1);
}

#[tokio::test]
async fn test_dashboard_on_empty_store() {
    let app = TestApp::new().await;
    let cookie = app.login(ADMIN).await;

    let stats = app.get("/api/dashboard/stats", &cookie).await.body;
    assert_eq!(stats["totalOrders"], 0);
    assert_eq!(rupees(&stats["totalSales"]), Decimal::ZERO);
    assert!(stats["salesTrend"].as_array().unwrap().is_empty());
}

// =============================================================================
// Company settings
// =============================================================================

#[tokio::test]
async fn test_company_defaults_to_empty() {
    let app = TestApp::new().await;
    let cookie = app.login(ADMIN).await;

    let response = app.get("/api/settings/company", &cookie).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "");
    assert_eq!(response.body["gstNumber"], "");
}

#[tokio::test]
async fn test_only_super_admin_updates_company() {
    let app = TestApp::new().await;

    let admin = app.login(ADMIN).await;
    let refused = app
        .put("/api/settings/company", &admin, json!({ "name": "Hijack Ltd" }))
        .await;
    assert_eq!(refused.status, StatusCode::FORBIDDEN);
    assert_eq!(refused.body["code"], "forbidden");

    let owner = app.login(SUPER_ADMIN).await;
    let saved = app
        .put(
            "/api/settings/company",
            &owner,
            json!({
                "name": " Chai Co ",
                "address": "4 Park Street, Kolkata",
                "mobile": "9830000000",
                "gstNumber": "19abcde1234f1z5"
            }),
        )
        .await;
    assert_eq!(saved.status, StatusCode::OK);
    assert_eq!(saved.body["name"], "Chai Co");
    assert_eq!(saved.body["gstNumber"], "19ABCDE1234F1Z5");

    let read_back = app.get("/api/settings/company", &admin).await;
    assert_eq!(read_back.body["address"], "4 Park Street, Kolkata");
}

#[tokio::test]
async fn test_malformed_gst_is_rejected() {
    let app = TestApp::new().await;
    let owner = app.login(SUPER_ADMIN).await;

    let response = app
        .put("/api/settings/company", &owner, json!({ "gstNumber": "27-ABC" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "validation_error");

    let unchanged = app.get("/api/settings/company", &owner).await;
    assert_eq!(unchanged.body["gstNumber"], "");
}

//! Seed the database with demo data for local development.
//!
//! Orders are backdated across the last month and then walked through the
//! real order service, so milestone dates and refunds look like production
//! data. Re-running skips orders that already exist.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use shopdesk_admin::db::{PgCompanyStore, PgOrderStore, PgProductStore, RepositoryError};
use shopdesk_admin::services::{OrderService, OrderServiceError};
use shopdesk_core::{
    CompanyDetails, Customer, LineItem, NewOrder, OrderId, OrderStatus, PaymentStatus, Price,
    RevenuePolicy,
};

use super::connect;

const CUSTOMERS: [(&str, &str, &str); 5] = [
    ("Asha Verma", "9876543210", "12 MG Road, Pune"),
    ("Ravi Kumar", "9988776655", "4 Park Street, Kolkata"),
    ("Meera Iyer", "9123456780", "7 Anna Salai, Chennai"),
    ("Kabir Singh", "9811122233", "21 Sector 17, Chandigarh"),
    ("Farah Khan", "9090909090", "3 Linking Road, Mumbai"),
];

const CATALOGUE: [(&str, i64); 8] = [
    ("Assam Tea 250g", 240),
    ("Ceramic Mug", 350),
    ("Cotton Saree", 1800),
    ("Brass Diya", 420),
    ("Jute Tote", 299),
    ("Spice Box", 950),
    ("Copper Bottle", 780),
    ("Handloom Shawl", 2200),
];

/// Where each seeded order ends up.
const OUTCOMES: [Outcome; 8] = [
    Outcome::Advance(0),
    Outcome::Advance(1),
    Outcome::Advance(2),
    Outcome::Advance(3),
    Outcome::Advance(4),
    Outcome::Cancelled,
    Outcome::PendingRequest,
    Outcome::Refunded,
];

#[derive(Clone, Copy)]
enum Outcome {
    /// Number of forward lifecycle steps from `placed`.
    Advance(usize),
    Cancelled,
    PendingRequest,
    Refunded,
}

const FORWARD: [OrderStatus; 4] = [
    OrderStatus::Confirmed,
    OrderStatus::Packed,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
];

/// Insert demo products, company details and orders.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a write fails for a
/// reason other than the row already existing.
pub async fn demo_data(orders: u32, products: u32) -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;

    for (name, rupees) in CATALOGUE.iter().cycle().take(products as usize) {
        sqlx::query("INSERT INTO products (name, price) VALUES ($1, $2)")
            .bind(name)
            .bind(Decimal::from(*rupees))
            .execute(&pool)
            .await?;
    }
    info!(products, "Seeded products");

    let order_store = Arc::new(PgOrderStore::new(pool.clone()));
    let service = OrderService::new(
        order_store.clone(),
        Arc::new(PgProductStore::new(pool.clone())),
        Arc::new(PgCompanyStore::new(pool)),
        RevenuePolicy::default(),
    );

    service
        .update_company(CompanyDetails {
            name: "Shopdesk Demo Traders".to_string(),
            address: "221 Residency Road, Bengaluru".to_string(),
            mobile: "8041234567".to_string(),
            gst_number: "29abcde1234f1z5".to_string(),
        })
        .await?;

    let now = Utc::now();
    let mut created = 0_u32;
    for i in 0..orders {
        let new_order = demo_order(i);
        let order_id = new_order.order_id.clone();
        let placed = new_order.place(now - Duration::days(i64::from(i % 30)))?;

        match shopdesk_admin::db::OrderStore::insert(order_store.as_ref(), &placed).await {
            Ok(()) => {}
            Err(RepositoryError::Conflict(_)) => {
                warn!(%order_id, "order exists, skipping");
                continue;
            }
            Err(e) => return Err(e.into()),
        }

        let outcome = OUTCOMES
            .get(i as usize % OUTCOMES.len())
            .copied()
            .unwrap_or(Outcome::Advance(0));
        walk(&service, &order_id, outcome).await?;
        created += 1;
    }

    info!(created, "Seeded orders");
    Ok(())
}

fn demo_order(i: u32) -> NewOrder {
    let idx = i as usize;
    let (name, mobile, address) = CUSTOMERS
        .get(idx % CUSTOMERS.len())
        .copied()
        .unwrap_or(CUSTOMERS[0]);

    let products = (0..=(idx % 3))
        .filter_map(|offset| CATALOGUE.get((idx + offset * 3) % CATALOGUE.len()))
        .map(|(product, rupees)| LineItem {
            name: (*product).to_string(),
            quantity: i % 2 + 1,
            price: Price::from_rupees(*rupees),
        })
        .collect();

    // Every fourth order is cash on delivery.
    let payment_id = (i % 4 != 0).then(|| format!("pay_demo{:06}", 500 + i));

    NewOrder {
        order_id: OrderId::new(format!("ORD-{:05}", 1001 + i)),
        customer: Customer {
            name: name.to_string(),
            mobile: mobile.to_string(),
            address: address.to_string(),
        },
        products,
        payment_id,
        payment_status: PaymentStatus::Success,
    }
}

async fn walk(
    service: &OrderService,
    order_id: &OrderId,
    outcome: Outcome,
) -> Result<(), OrderServiceError> {
    match outcome {
        Outcome::Advance(steps) => {
            for status in FORWARD.iter().take(steps) {
                service.update_order_status(order_id, *status).await?;
            }
        }
        Outcome::Cancelled => {
            service
                .update_order_status(order_id, OrderStatus::Confirmed)
                .await?;
            service
                .update_order_status(order_id, OrderStatus::Cancelled)
                .await?;
        }
        Outcome::PendingRequest => {
            service
                .request_cancellation(order_id, Some("Ordered the wrong size".to_string()))
                .await?;
        }
        Outcome::Refunded => {
            service
                .update_order_status(order_id, OrderStatus::Confirmed)
                .await?;
            service
                .request_cancellation(order_id, Some("Found it cheaper locally".to_string()))
                .await?;
            service.approve_cancellation(order_id).await?;
        }
    }
    Ok(())
}

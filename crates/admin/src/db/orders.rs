//! `PostgreSQL` order store.
//!
//! Orders are stored one row per document. Line items stay together as a
//! JSONB array; the customer, cancellation request and milestone dates are
//! flattened into columns so filters and the conditional update can use them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use shopdesk_core::{
    CancellationRequest, CancellationStatus, Customer, LineItem, MilestoneDates, Order,
    OrderFilter, OrderId, OrderStatus, PaymentStatus, Price, StateGuard,
};

use super::{OrderStore, RepositoryError, conflict_or_database};

const ORDER_COLUMNS: &str = r"
    order_id, status, customer_name, customer_mobile, customer_address,
    products, total_amount, payment_id, payment_status,
    cancellation_requested, cancellation_status, cancellation_reason,
    cancellation_requested_at, packed_date, shipped_date, delivered_date,
    created_at, updated_at
";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    order_id: String,
    status: OrderStatus,
    customer_name: String,
    customer_mobile: String,
    customer_address: String,
    products: Json<Vec<LineItem>>,
    total_amount: Decimal,
    payment_id: Option<String>,
    payment_status: PaymentStatus,
    cancellation_requested: Option<bool>,
    cancellation_status: Option<CancellationStatus>,
    cancellation_reason: Option<String>,
    cancellation_requested_at: Option<DateTime<Utc>>,
    packed_date: Option<DateTime<Utc>>,
    shipped_date: Option<DateTime<Utc>>,
    delivered_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let cancellation_request = match (row.cancellation_status, row.cancellation_requested_at) {
            (Some(status), Some(requested_at)) => Some(CancellationRequest {
                requested: row.cancellation_requested.unwrap_or(true),
                status,
                reason: row.cancellation_reason,
                requested_at,
            }),
            (None, None) => None,
            _ => {
                return Err(RepositoryError::DataCorruption(format!(
                    "order {} has a partial cancellation request",
                    row.order_id
                )));
            }
        };

        let order = Self {
            order_id: OrderId::new(row.order_id),
            status: row.status,
            customer: Customer {
                name: row.customer_name,
                mobile: row.customer_mobile,
                address: row.customer_address,
            },
            products: row.products.0,
            total_amount: Price::new(row.total_amount),
            payment_id: row.payment_id,
            payment_status: row.payment_status,
            cancellation_request,
            dates: MilestoneDates {
                packed_date: row.packed_date,
                shipped_date: row.shipped_date,
                delivered_date: row.delivered_date,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        };

        if !order.has_consistent_total() {
            return Err(RepositoryError::DataCorruption(format!(
                "order {} total does not match its line items",
                order.order_id
            )));
        }
        Ok(order)
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Order store backed by the `orders` table.
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn get(&self, order_id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1"
        ))
        .bind(order_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find(&self, filter: &OrderFilter) -> Result<Vec<Order>, RepositoryError> {
        let (start, end) = filter
            .date_range()
            .map_or((None, None), |r| (Some(r.start), Some(r.end)));

        // strpos: literal substring match, no LIKE wildcards from user input.
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
              AND ($2::timestamptz IS NULL OR created_at <= $2)
              AND ($3::text IS NULL OR strpos(customer_mobile, $3) > 0)
              AND ($4::text IS NULL
                   OR strpos(lower(order_id), $4) > 0
                   OR strpos(lower(coalesce(payment_id, '')), $4) > 0)
            ORDER BY created_at DESC
            "
        ))
        .bind(start)
        .bind(end)
        .bind(filter.mobile())
        .bind(filter.search())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn insert(&self, order: &Order) -> Result<(), RepositoryError> {
        let request = order.cancellation_request.as_ref();
        sqlx::query(
            r"
            INSERT INTO orders (
                order_id, status, customer_name, customer_mobile, customer_address,
                products, total_amount, payment_id, payment_status,
                cancellation_requested, cancellation_status, cancellation_reason,
                cancellation_requested_at, packed_date, shipped_date, delivered_date,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            ",
        )
        .bind(order.order_id.as_str())
        .bind(order.status)
        .bind(&order.customer.name)
        .bind(&order.customer.mobile)
        .bind(&order.customer.address)
        .bind(Json(&order.products))
        .bind(order.total_amount.amount())
        .bind(order.payment_id.as_deref())
        .bind(order.payment_status)
        .bind(request.map(|r| r.requested))
        .bind(request.map(|r| r.status))
        .bind(request.and_then(|r| r.reason.as_deref()))
        .bind(request.map(|r| r.requested_at))
        .bind(order.dates.packed_date)
        .bind(order.dates.shipped_date)
        .bind(order.dates.delivered_date)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or_database(e, &format!("order {}", order.order_id)))?;

        Ok(())
    }

    async fn update_if(
        &self,
        expected: StateGuard,
        order: &Order,
    ) -> Result<bool, RepositoryError> {
        let request = order.cancellation_request.as_ref();
        let result = sqlx::query(
            r"
            UPDATE orders
            SET status = $2,
                payment_status = $3,
                cancellation_requested = $4,
                cancellation_status = $5,
                cancellation_reason = $6,
                cancellation_requested_at = $7,
                packed_date = $8,
                shipped_date = $9,
                delivered_date = $10,
                updated_at = $11
            WHERE order_id = $1
              AND status = $12
              AND cancellation_status IS NOT DISTINCT FROM $13
              AND cancellation_requested_at IS NOT DISTINCT FROM $14
            ",
        )
        .bind(order.order_id.as_str())
        .bind(order.status)
        .bind(order.payment_status)
        .bind(request.map(|r| r.requested))
        .bind(request.map(|r| r.status))
        .bind(request.and_then(|r| r.reason.as_deref()))
        .bind(request.map(|r| r.requested_at))
        .bind(order.dates.packed_date)
        .bind(order.dates.shipped_date)
        .bind(order.dates.delivered_date)
        .bind(order.updated_at)
        .bind(expected.status)
        .bind(expected.cancellation)
        .bind(expected.requested_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

//! `PostgreSQL` product catalogue.
//!
//! The admin backend only counts products; the catalogue itself is managed
//! elsewhere (and seeded by `sd-cli seed`).

use async_trait::async_trait;
use sqlx::PgPool;

use super::{ProductStore, RepositoryError, count_to_u64};

#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        count_to_u64(count)
    }
}

//! `PostgreSQL` company details store.

use async_trait::async_trait;
use sqlx::PgPool;

use shopdesk_core::CompanyDetails;

use super::{CompanyStore, RepositoryError};

#[derive(Debug, sqlx::FromRow)]
struct CompanyRow {
    name: String,
    address: String,
    mobile: String,
    gst_number: String,
}

impl From<CompanyRow> for CompanyDetails {
    fn from(row: CompanyRow) -> Self {
        Self {
            name: row.name,
            address: row.address,
            mobile: row.mobile,
            gst_number: row.gst_number,
        }
    }
}

/// Singleton row in `company_details`, keyed on `id = TRUE`.
#[derive(Debug, Clone)]
pub struct PgCompanyStore {
    pool: PgPool,
}

impl PgCompanyStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyStore for PgCompanyStore {
    async fn get(&self) -> Result<Option<CompanyDetails>, RepositoryError> {
        let row = sqlx::query_as::<_, CompanyRow>(
            "SELECT name, address, mobile, gst_number FROM company_details WHERE id",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn upsert(&self, details: &CompanyDetails) -> Result<CompanyDetails, RepositoryError> {
        let row = sqlx::query_as::<_, CompanyRow>(
            r"
            INSERT INTO company_details (id, name, address, mobile, gst_number)
            VALUES (TRUE, $1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET name = $1, address = $2, mobile = $3, gst_number = $4, updated_at = NOW()
            RETURNING name, address, mobile, gst_number
            ",
        )
        .bind(&details.name)
        .bind(&details.address)
        .bind(&details.mobile)
        .bind(&details.gst_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}

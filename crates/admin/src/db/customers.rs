//! Customer repository.

use sqlx::PgPool;
use tracing::instrument;

use giftmart_core::CustomerId;

use super::{RepositoryError, like_pattern};
use crate::models::{CustomerSummary, Pagination};

const SUMMARY_SELECT: &str = r"
    SELECT c.id, c.name, c.email, c.phone, c.city, c.is_blocked, c.created_at,
           COUNT(o.id) AS order_count,
           COALESCE(SUM(o.total_amount) FILTER (WHERE o.status <> 'cancelled'), 0) AS total_spent
    FROM market.customer c
    LEFT JOIN market.customer_order o ON o.customer_id = c.id
";

/// Repository for customer accounts.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List customers, newest first, optionally filtered by name/email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        search: Option<&str>,
        window: Pagination,
    ) -> Result<(Vec<CustomerSummary>, i64), RepositoryError> {
        let pattern = search.filter(|s| !s.trim().is_empty()).map(like_pattern);

        let sql = format!(
            "{SUMMARY_SELECT}
             WHERE ($1::text IS NULL OR c.name ILIKE $1 OR c.email ILIKE $1)
             GROUP BY c.id
             ORDER BY c.created_at DESC
             LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, CustomerSummary>(&sql)
            .bind(pattern.as_deref())
            .bind(window.limit)
            .bind(window.offset())
            .fetch_all(self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            r"SELECT COUNT(*) FROM market.customer
              WHERE ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1)",
        )
        .bind(pattern.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok((rows, total))
    }

    /// Get one customer with order totals.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn get(&self, id: CustomerId) -> Result<Option<CustomerSummary>, RepositoryError> {
        let sql = format!("{SUMMARY_SELECT} WHERE c.id = $1 GROUP BY c.id");
        let row = sqlx::query_as::<_, CustomerSummary>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Flip the blocked flag and return the new value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn toggle_block(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        sqlx::query_scalar(
            r"UPDATE market.customer SET is_blocked = NOT is_blocked
              WHERE id = $1
              RETURNING is_blocked",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}

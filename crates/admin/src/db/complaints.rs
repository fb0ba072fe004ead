//! Customer complaint repository.

use sqlx::PgPool;
use tracing::instrument;

use giftmart_core::{ComplaintId, ComplaintStatus, ComplaintType, CustomerId, OrderId, Priority};

use super::RepositoryError;
use crate::models::notification::{ComplaintUpdate, CustomerComplaint};

const COMPLAINT_SELECT: &str = r"
    SELECT cc.id, cc.customer_id, c.name AS customer_name, cc.order_id, cc.complaint_type,
           cc.subject, cc.description, cc.status, cc.priority, cc.resolution,
           cc.satisfaction_rating, cc.resolved_at, cc.created_at, cc.updated_at
    FROM market.customer_complaint cc
    LEFT JOIN market.customer c ON c.id = cc.customer_id
";

#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub customer_id: Option<CustomerId>,
    pub order_id: Option<OrderId>,
    pub complaint_type: ComplaintType,
    pub subject: String,
    pub description: String,
    pub priority: Priority,
}

/// Repository for customer complaints.
pub struct ComplaintRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ComplaintRepository<'a> {
    /// Create a new complaint repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Complaints, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        status: Option<ComplaintStatus>,
        limit: i64,
    ) -> Result<Vec<CustomerComplaint>, RepositoryError> {
        let sql = format!(
            "{COMPLAINT_SELECT}
             WHERE ($1::market.complaint_status IS NULL OR cc.status = $1)
             ORDER BY cc.created_at DESC
             LIMIT $2"
        );
        let rows = sqlx::query_as::<_, CustomerComplaint>(&sql)
            .bind(status)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    async fn get(&self, id: ComplaintId) -> Result<CustomerComplaint, RepositoryError> {
        let sql = format!("{COMPLAINT_SELECT} WHERE cc.id = $1");
        sqlx::query_as::<_, CustomerComplaint>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Log a complaint.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, complaint), fields(subject = %complaint.subject))]
    pub async fn create(
        &self,
        complaint: &NewComplaint,
    ) -> Result<CustomerComplaint, RepositoryError> {
        let id: ComplaintId = sqlx::query_scalar(
            r"INSERT INTO market.customer_complaint
                  (customer_id, order_id, complaint_type, subject, description, priority)
              VALUES ($1, $2, $3, $4, $5, $6)
              RETURNING id",
        )
        .bind(complaint.customer_id)
        .bind(complaint.order_id)
        .bind(complaint.complaint_type)
        .bind(&complaint.subject)
        .bind(&complaint.description)
        .bind(complaint.priority)
        .fetch_one(self.pool)
        .await?;
        self.get(id).await
    }

    /// Apply a status change. `resolved` and `closed` stamp `resolved_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the complaint does not exist.
    #[instrument(skip(self, update), fields(complaint_id = %id, status = %update.status))]
    pub async fn update_status(
        &self,
        id: ComplaintId,
        update: &ComplaintUpdate,
    ) -> Result<CustomerComplaint, RepositoryError> {
        let result = sqlx::query(
            r"UPDATE market.customer_complaint
              SET status = $2,
                  resolution = COALESCE($3, resolution),
                  satisfaction_rating = COALESCE($4, satisfaction_rating),
                  resolved_at = CASE WHEN $5 THEN COALESCE(resolved_at, NOW()) ELSE NULL END,
                  updated_at = NOW()
              WHERE id = $1",
        )
        .bind(id)
        .bind(update.status)
        .bind(update.resolution.as_deref())
        .bind(update.satisfaction_rating)
        .bind(update.status.is_final())
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get(id).await
    }

    /// Delete one complaint.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the complaint does not exist.
    #[instrument(skip(self), fields(complaint_id = %id))]
    pub async fn delete(&self, id: ComplaintId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM market.customer_complaint WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

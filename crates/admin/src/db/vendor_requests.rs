//! Vendor request repository.

use sqlx::PgPool;
use tracing::instrument;

use giftmart_core::{Priority, SellerId, VendorRequestId, VendorRequestStatus, VendorRequestType};

use super::RepositoryError;
use crate::models::notification::VendorRequest;

const REQUEST_SELECT: &str = r"
    SELECT r.id, r.seller_id, s.store_name, r.request_type, r.subject, r.message, r.status,
           r.priority, r.admin_notes, r.resolved_at, r.created_at, r.updated_at
    FROM market.vendor_request r
    LEFT JOIN market.seller s ON s.id = r.seller_id
";

/// A request raised by (or on behalf of) a seller.
#[derive(Debug, Clone)]
pub struct NewVendorRequest {
    pub seller_id: Option<SellerId>,
    pub request_type: VendorRequestType,
    pub subject: String,
    pub message: String,
    pub priority: Priority,
}

/// Repository for seller requests awaiting admin attention.
pub struct VendorRequestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VendorRequestRepository<'a> {
    /// Create a new vendor request repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Requests, newest first, optionally filtered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        status: Option<VendorRequestStatus>,
        request_type: Option<VendorRequestType>,
        limit: i64,
    ) -> Result<Vec<VendorRequest>, RepositoryError> {
        let sql = format!(
            "{REQUEST_SELECT}
             WHERE ($1::market.vendor_request_status IS NULL OR r.status = $1)
               AND ($2::market.vendor_request_type IS NULL OR r.request_type = $2)
             ORDER BY r.created_at DESC
             LIMIT $3"
        );
        let rows = sqlx::query_as::<_, VendorRequest>(&sql)
            .bind(status)
            .bind(request_type)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    async fn get(&self, id: VendorRequestId) -> Result<VendorRequest, RepositoryError> {
        let sql = format!("{REQUEST_SELECT} WHERE r.id = $1");
        sqlx::query_as::<_, VendorRequest>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Record a request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, request), fields(subject = %request.subject))]
    pub async fn create(
        &self,
        request: &NewVendorRequest,
    ) -> Result<VendorRequest, RepositoryError> {
        let id: VendorRequestId = sqlx::query_scalar(
            r"INSERT INTO market.vendor_request (seller_id, request_type, subject, message, priority)
              VALUES ($1, $2, $3, $4, $5)
              RETURNING id",
        )
        .bind(request.seller_id)
        .bind(request.request_type)
        .bind(&request.subject)
        .bind(&request.message)
        .bind(request.priority)
        .fetch_one(self.pool)
        .await?;
        self.get(id).await
    }

    /// Set the status and notes. Final statuses stamp `resolved_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the request does not exist.
    #[instrument(skip(self, admin_notes), fields(vendor_request_id = %id))]
    pub async fn update_status(
        &self,
        id: VendorRequestId,
        status: VendorRequestStatus,
        admin_notes: Option<&str>,
    ) -> Result<VendorRequest, RepositoryError> {
        let result = sqlx::query(
            r"UPDATE market.vendor_request
              SET status = $2,
                  admin_notes = COALESCE($3, admin_notes),
                  resolved_at = CASE WHEN $4 THEN NOW() ELSE NULL END,
                  updated_at = NOW()
              WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(admin_notes)
        .bind(status.is_final())
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get(id).await
    }

    /// Delete one vendor request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the vendor request does not exist.
    #[instrument(skip(self), fields(vendor_request_id = %id))]
    pub async fn delete(&self, id: VendorRequestId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM market.vendor_request WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

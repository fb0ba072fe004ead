//! Seller conversation repository.

use sqlx::PgPool;
use tracing::instrument;

use giftmart_core::{VendorMessageId, VendorMessageStatus};

use super::RepositoryError;
use crate::models::support::{VendorMessage, VendorMessageReply};

const MESSAGE_SELECT: &str = r"
    SELECT m.id, m.seller_id, s.store_name, m.subject, m.message, m.status,
           m.created_at, m.updated_at
    FROM market.vendor_message m
    JOIN market.seller s ON s.id = m.seller_id
";

const REPLY_COLUMNS: &str = "id, message_id, is_admin, author_name, message, created_at";

/// Repository for messages sellers send to the marketplace team.
pub struct VendorMessageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VendorMessageRepository<'a> {
    /// Create a new vendor message repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Messages, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        status: Option<VendorMessageStatus>,
    ) -> Result<Vec<VendorMessage>, RepositoryError> {
        let sql = format!(
            "{MESSAGE_SELECT}
             WHERE ($1::market.vendor_message_status IS NULL OR m.status = $1)
             ORDER BY m.created_at DESC, m.id DESC"
        );
        let rows = sqlx::query_as::<_, VendorMessage>(&sql)
            .bind(status)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Replies on the given messages, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn replies_for(
        &self,
        ids: &[VendorMessageId],
    ) -> Result<Vec<VendorMessageReply>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i32> = ids.iter().map(VendorMessageId::as_i32).collect();
        let rows = sqlx::query_as::<_, VendorMessageReply>(&format!(
            "SELECT {REPLY_COLUMNS} FROM market.vendor_message_reply
             WHERE message_id = ANY($1)
             ORDER BY created_at, id"
        ))
        .bind(raw)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Append an admin reply and mark the message `replied`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the message does not exist.
    #[instrument(skip(self, message), fields(vendor_message_id = %id))]
    pub async fn reply(
        &self,
        id: VendorMessageId,
        author_name: &str,
        message: &str,
    ) -> Result<VendorMessageReply, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE market.vendor_message SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(VendorMessageStatus::Replied)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        let reply = sqlx::query_as::<_, VendorMessageReply>(&format!(
            "INSERT INTO market.vendor_message_reply (message_id, is_admin, author_name, message)
             VALUES ($1, TRUE, $2, $3)
             RETURNING {REPLY_COLUMNS}"
        ))
        .bind(id)
        .bind(author_name)
        .bind(message)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(reply)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the message does not exist.
    #[instrument(skip(self), fields(vendor_message_id = %id))]
    pub async fn set_status(
        &self,
        id: VendorMessageId,
        status: VendorMessageStatus,
    ) -> Result<VendorMessage, RepositoryError> {
        let result = sqlx::query(
            "UPDATE market.vendor_message SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        sqlx::query_as::<_, VendorMessage>(&format!("{MESSAGE_SELECT} WHERE m.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}

//! Admin notifications, order alerts and system updates.

use sqlx::PgPool;
use tracing::instrument;

use giftmart_core::{
    NotificationId, NotificationType, OrderAlertId, OrderAlertType, OrderId, Priority,
    SystemUpdateId, SystemUpdateStatus, SystemUpdateType,
};

use super::RepositoryError;
use crate::models::Pagination;
use crate::models::notification::{HubStats, NewNotification, Notification, OrderAlert, SystemUpdate};

const NOTIFICATION_COLUMNS: &str = "id, title, message, notification_type, priority, is_read, \
     read_at, action_url, action_label, metadata, expires_at, created_at";

const ORDER_ALERT_COLUMNS: &str =
    "id, order_id, alert_type, message, priority, is_read, created_at";

const SYSTEM_UPDATE_COLUMNS: &str = "id, title, description, update_type, status, \
     scheduled_at, completed_at, created_at, updated_at";

/// A system update to record.
#[derive(Debug, Clone)]
pub struct NewSystemUpdate {
    pub title: String,
    pub description: String,
    pub update_type: SystemUpdateType,
    pub status: SystemUpdateStatus,
    pub scheduled_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Repository for the notification side of the hub.
pub struct NotificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationRepository<'a> {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Filtered page of notifications, newest first, with the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        notification_type: Option<NotificationType>,
        is_read: Option<bool>,
        window: Pagination,
    ) -> Result<(Vec<Notification>, i64), RepositoryError> {
        const WHERE: &str = r"
            WHERE ($1::market.notification_type IS NULL OR notification_type = $1)
              AND ($2::boolean IS NULL OR is_read = $2)
              AND (expires_at IS NULL OR expires_at > NOW())";

        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM market.notification {WHERE}
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query_as::<_, Notification>(&sql)
            .bind(notification_type)
            .bind(is_read)
            .bind(window.limit)
            .bind(window.offset())
            .fetch_all(self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM market.notification {WHERE}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(notification_type)
            .bind(is_read)
            .fetch_one(self.pool)
            .await?;

        Ok((rows, total))
    }

    /// Create a notification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, notification), fields(title = %notification.title))]
    pub async fn create(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, RepositoryError> {
        let sql = format!(
            "INSERT INTO market.notification
                 (title, message, notification_type, priority, action_url, action_label,
                  metadata, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {NOTIFICATION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Notification>(&sql)
            .bind(&notification.title)
            .bind(&notification.message)
            .bind(notification.notification_type)
            .bind(notification.priority)
            .bind(notification.action_url.as_deref())
            .bind(notification.action_label.as_deref())
            .bind(&notification.metadata)
            .bind(notification.expires_at)
            .fetch_one(self.pool)
            .await?;
        Ok(row)
    }

    /// Mark one notification read. Reading twice keeps the first `read_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notification does not exist.
    #[instrument(skip(self), fields(notification_id = %id))]
    pub async fn mark_read(&self, id: NotificationId) -> Result<Notification, RepositoryError> {
        let sql = format!(
            "UPDATE market.notification
             SET is_read = TRUE, read_at = COALESCE(read_at, NOW())
             WHERE id = $1
             RETURNING {NOTIFICATION_COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Mark every unread notification (optionally of one type) read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    #[instrument(skip(self))]
    pub async fn mark_all_read(
        &self,
        notification_type: Option<NotificationType>,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"UPDATE market.notification
              SET is_read = TRUE, read_at = NOW()
              WHERE NOT is_read
                AND ($1::market.notification_type IS NULL OR notification_type = $1)",
        )
        .bind(notification_type)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete one notification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notification does not exist.
    #[instrument(skip(self), fields(notification_id = %id))]
    pub async fn delete(&self, id: NotificationId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM market.notification WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete notifications of a type and/or older than a number of days.
    /// With neither filter every read notification is removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self))]
    pub async fn clear(
        &self,
        notification_type: Option<NotificationType>,
        older_than_days: Option<i32>,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"DELETE FROM market.notification
              WHERE ($1::market.notification_type IS NULL OR notification_type = $1)
                AND ($2::int IS NULL OR created_at < NOW() - make_interval(days => $2))
                AND ($1 IS NOT NULL OR $2 IS NOT NULL OR is_read)",
        )
        .bind(notification_type)
        .bind(older_than_days)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    // Order alerts
    // =========================================================================

    /// Order alerts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn order_alerts(
        &self,
        is_read: Option<bool>,
        limit: i64,
    ) -> Result<Vec<OrderAlert>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_ALERT_COLUMNS} FROM market.order_alert
             WHERE ($1::boolean IS NULL OR is_read = $1)
             ORDER BY created_at DESC
             LIMIT $2"
        );
        let rows = sqlx::query_as::<_, OrderAlert>(&sql)
            .bind(is_read)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Raise an alert about an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, message))]
    pub async fn create_order_alert(
        &self,
        order_id: Option<OrderId>,
        alert_type: OrderAlertType,
        message: &str,
        priority: Priority,
    ) -> Result<OrderAlert, RepositoryError> {
        let sql = format!(
            "INSERT INTO market.order_alert (order_id, alert_type, message, priority)
             VALUES ($1, $2, $3, $4)
             RETURNING {ORDER_ALERT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderAlert>(&sql)
            .bind(order_id)
            .bind(alert_type)
            .bind(message)
            .bind(priority)
            .fetch_one(self.pool)
            .await?;
        Ok(row)
    }

    /// Mark an order alert read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the alert does not exist.
    pub async fn mark_order_alert_read(
        &self,
        id: OrderAlertId,
    ) -> Result<OrderAlert, RepositoryError> {
        let sql = format!(
            "UPDATE market.order_alert SET is_read = TRUE WHERE id = $1
             RETURNING {ORDER_ALERT_COLUMNS}"
        );
        sqlx::query_as::<_, OrderAlert>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete one order alert.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order alert does not exist.
    #[instrument(skip(self), fields(order_alert_id = %id))]
    pub async fn delete_order_alert(&self, id: OrderAlertId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM market.order_alert WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    // System updates
    // =========================================================================

    /// System updates, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn system_updates(&self, limit: i64) -> Result<Vec<SystemUpdate>, RepositoryError> {
        let sql = format!(
            "SELECT {SYSTEM_UPDATE_COLUMNS} FROM market.system_update
             ORDER BY created_at DESC LIMIT $1"
        );
        let rows = sqlx::query_as::<_, SystemUpdate>(&sql)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Announce a system update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, update), fields(title = %update.title))]
    pub async fn create_system_update(
        &self,
        update: &NewSystemUpdate,
    ) -> Result<SystemUpdate, RepositoryError> {
        let sql = format!(
            "INSERT INTO market.system_update (title, description, update_type, status, scheduled_at,
                                               completed_at)
             VALUES ($1, $2, $3, $4, $5, CASE WHEN $4::market.system_update_status = 'completed' THEN NOW() END)
             RETURNING {SYSTEM_UPDATE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, SystemUpdate>(&sql)
            .bind(&update.title)
            .bind(&update.description)
            .bind(update.update_type)
            .bind(update.status)
            .bind(update.scheduled_at)
            .fetch_one(self.pool)
            .await?;
        Ok(row)
    }

    /// Move a system update to a new status. `completed` stamps `completed_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the update does not exist.
    #[instrument(skip(self), fields(system_update_id = %id))]
    pub async fn set_system_update_status(
        &self,
        id: SystemUpdateId,
        status: SystemUpdateStatus,
    ) -> Result<SystemUpdate, RepositoryError> {
        let sql = format!(
            "UPDATE market.system_update
             SET status = $2,
                 completed_at = CASE WHEN $2::market.system_update_status = 'completed' THEN NOW() ELSE completed_at END,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {SYSTEM_UPDATE_COLUMNS}"
        );
        sqlx::query_as::<_, SystemUpdate>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete one system update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the system update does not exist.
    #[instrument(skip(self), fields(system_update_id = %id))]
    pub async fn delete_system_update(&self, id: SystemUpdateId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM market.system_update WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    // Hub
    // =========================================================================

    /// Counters for the hub header.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn hub_stats(&self) -> Result<HubStats, RepositoryError> {
        let stats = sqlx::query_as::<_, HubStats>(
            r"SELECT
                (SELECT COUNT(*) FROM market.notification WHERE NOT is_read)
                    AS unread_notifications,
                (SELECT COUNT(*) FROM market.order_alert WHERE NOT is_read)
                    AS unread_order_alerts,
                (SELECT COUNT(*) FROM market.vendor_request WHERE status = 'pending')
                    AS pending_vendor_requests,
                (SELECT COUNT(*) FROM market.customer_complaint WHERE status = 'new')
                    AS new_complaints,
                (SELECT COUNT(*) FROM market.activity_log
                 WHERE created_at >= date_trunc('day', NOW())) AS activity_today",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(stats)
    }
}

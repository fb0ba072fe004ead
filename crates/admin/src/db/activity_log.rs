//! Activity log repository.

use sqlx::PgPool;
use tracing::instrument;

use giftmart_core::{ActivityStatus, ActorRole};

use super::RepositoryError;
use crate::models::Pagination;
use crate::models::notification::{ActivityLog, ActivityStats, NamedCount, NewActivityLog};

const ACTIVITY_COLUMNS: &str = "id, user_role, user_id, user_name, action, entity_type, \
     entity_id, details, status, ip_address, created_at";

/// Filters for the activity log list.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActivityFilter<'q> {
    pub user_role: Option<ActorRole>,
    pub action: Option<&'q str>,
    pub entity_type: Option<&'q str>,
    pub status: Option<ActivityStatus>,
}

/// Repository for the audit trail of admin, seller and system actions.
pub struct ActivityLogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ActivityLogRepository<'a> {
    /// Create a new activity log repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append an entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, entry), fields(action = %entry.action))]
    pub async fn create(&self, entry: &NewActivityLog) -> Result<ActivityLog, RepositoryError> {
        let sql = format!(
            "INSERT INTO market.activity_log
                 (user_role, user_id, user_name, action, entity_type, entity_id, details,
                  status, ip_address)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {ACTIVITY_COLUMNS}"
        );
        let log = sqlx::query_as::<_, ActivityLog>(&sql)
            .bind(entry.user_role)
            .bind(entry.user_id)
            .bind(&entry.user_name)
            .bind(&entry.action)
            .bind(&entry.entity_type)
            .bind(entry.entity_id.as_deref())
            .bind(&entry.details)
            .bind(entry.status)
            .bind(entry.ip_address.as_deref())
            .fetch_one(self.pool)
            .await?;
        Ok(log)
    }

    /// Filtered page of entries, newest first, with the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &ActivityFilter<'_>,
        window: Pagination,
    ) -> Result<(Vec<ActivityLog>, i64), RepositoryError> {
        const WHERE: &str = r"
            WHERE ($1::market.actor_role IS NULL OR user_role = $1)
              AND ($2::text IS NULL OR action = $2)
              AND ($3::text IS NULL OR entity_type = $3)
              AND ($4::market.activity_status IS NULL OR status = $4)";

        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM market.activity_log {WHERE}
             ORDER BY created_at DESC
             LIMIT $5 OFFSET $6"
        );
        let rows = sqlx::query_as::<_, ActivityLog>(&sql)
            .bind(filter.user_role)
            .bind(filter.action)
            .bind(filter.entity_type)
            .bind(filter.status)
            .bind(window.limit)
            .bind(window.offset())
            .fetch_all(self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM market.activity_log {WHERE}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(filter.user_role)
            .bind(filter.action)
            .bind(filter.entity_type)
            .bind(filter.status)
            .fetch_one(self.pool)
            .await?;

        Ok((rows, total))
    }

    /// Most recent entries.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<ActivityLog>, RepositoryError> {
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM market.activity_log
             ORDER BY created_at DESC LIMIT $1"
        );
        let rows = sqlx::query_as::<_, ActivityLog>(&sql)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Delete entries older than `older_than_days`. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self))]
    pub async fn clear_older_than(&self, older_than_days: i32) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"DELETE FROM market.activity_log
              WHERE created_at < NOW() - make_interval(days => $1)",
        )
        .bind(older_than_days)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Counts for today, the last 7 and 30 days, and the five most common
    /// actions and entity types over the last week.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn stats(&self) -> Result<ActivityStats, RepositoryError> {
        let (today, this_week, this_month): (i64, i64, i64) = sqlx::query_as(
            r"SELECT
                COUNT(*) FILTER (WHERE created_at >= date_trunc('day', NOW())),
                COUNT(*) FILTER (WHERE created_at >= NOW() - INTERVAL '7 days'),
                COUNT(*) FILTER (WHERE created_at >= NOW() - INTERVAL '30 days')
              FROM market.activity_log",
        )
        .fetch_one(self.pool)
        .await?;

        let top_actions = sqlx::query_as::<_, NamedCount>(
            r"SELECT action AS name, COUNT(*) AS count FROM market.activity_log
              WHERE created_at >= NOW() - INTERVAL '7 days'
              GROUP BY action ORDER BY count DESC, name LIMIT 5",
        )
        .fetch_all(self.pool)
        .await?;

        let top_entities = sqlx::query_as::<_, NamedCount>(
            r"SELECT entity_type AS name, COUNT(*) AS count FROM market.activity_log
              WHERE created_at >= NOW() - INTERVAL '7 days'
              GROUP BY entity_type ORDER BY count DESC, name LIMIT 5",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(ActivityStats {
            today,
            this_week,
            this_month,
            top_actions,
            top_entities,
        })
    }
}

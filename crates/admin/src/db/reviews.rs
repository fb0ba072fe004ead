//! Review moderation repository.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use giftmart_core::{ReviewId, ReviewStatus};

use super::{RepositoryError, like_pattern};
use crate::models::Pagination;
use crate::models::review::{Review, ReviewStats};

const REVIEW_SELECT: &str = r"
    SELECT r.id, r.product_id, p.name AS product_name, r.customer_id, r.user_name, r.rating,
           r.title, r.comment, r.seller_response, r.is_hidden, r.status, r.report_reason,
           r.likes, r.dislikes, r.created_at
    FROM market.review r
    JOIN market.product p ON p.id = r.product_id
";

/// `$1` search pattern, `$2` status, `$3` rating.
const REVIEW_FILTER: &str = r"
    WHERE ($1::text IS NULL OR r.user_name ILIKE $1 OR r.comment ILIKE $1 OR r.title ILIKE $1)
      AND ($2::market.review_status IS NULL OR r.status = $2)
      AND ($3::smallint IS NULL OR r.rating = $3)
";

/// Filters for the review list.
#[derive(Debug, Default)]
pub struct ReviewFilter<'q> {
    pub search: Option<&'q str>,
    pub status: Option<ReviewStatus>,
    pub rating: Option<i16>,
}

/// Repository for product reviews.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Filtered reviews, newest first, with count and average rating over
    /// the whole filtered set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self, filter))]
    pub async fn list(
        &self,
        filter: &ReviewFilter<'_>,
        window: Pagination,
    ) -> Result<(Vec<Review>, ReviewStats), RepositoryError> {
        let pattern = filter
            .search
            .filter(|s| !s.trim().is_empty())
            .map(like_pattern);

        let rows = sqlx::query_as::<_, Review>(&format!(
            "{REVIEW_SELECT} {REVIEW_FILTER}
             ORDER BY r.created_at DESC
             LIMIT $4 OFFSET $5"
        ))
        .bind(pattern.as_deref())
        .bind(filter.status)
        .bind(filter.rating)
        .bind(window.limit)
        .bind(window.offset())
        .fetch_all(self.pool)
        .await?;

        let (total_reviews, avg_rating): (i64, Decimal) = sqlx::query_as(&format!(
            "SELECT COUNT(*), COALESCE(ROUND(AVG(r.rating)::numeric, 1), 0)
             FROM market.review r {REVIEW_FILTER}"
        ))
        .bind(pattern.as_deref())
        .bind(filter.status)
        .bind(filter.rating)
        .fetch_one(self.pool)
        .await?;

        Ok((
            rows,
            ReviewStats {
                total_reviews,
                avg_rating,
            },
        ))
    }

    /// Set the moderation status. The report reason is kept only for
    /// `reported`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    #[instrument(skip(self, report_reason), fields(review_id = %id, status = %status))]
    pub async fn set_status(
        &self,
        id: ReviewId,
        status: ReviewStatus,
        report_reason: Option<&str>,
    ) -> Result<Review, RepositoryError> {
        let reason = (status == ReviewStatus::Reported)
            .then_some(report_reason)
            .flatten();
        let updated = sqlx::query(
            r"UPDATE market.review SET status = $2, report_reason = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(reason)
        .execute(self.pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get(id).await
    }

    /// Flip `is_hidden` and return the new value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    pub async fn toggle_visibility(&self, id: ReviewId) -> Result<bool, RepositoryError> {
        sqlx::query_scalar(
            "UPDATE market.review SET is_hidden = NOT is_hidden WHERE id = $1 RETURNING is_hidden",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    pub async fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM market.review WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn get(&self, id: ReviewId) -> Result<Review, RepositoryError> {
        sqlx::query_as::<_, Review>(&format!("{REVIEW_SELECT} WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}

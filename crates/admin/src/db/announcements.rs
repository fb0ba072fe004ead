//! Storefront announcement queries.

use sqlx::PgPool;
use tracing::instrument;

use giftmart_core::AnnouncementId;

use super::RepositoryError;
use crate::models::support::{Announcement, NewAnnouncement};

const ANNOUNCEMENT_COLUMNS: &str = "id, title, message, priority, audience, is_active, \
     starts_at, ends_at, created_at, updated_at";

/// All announcements, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_announcements(pool: &PgPool) -> Result<Vec<Announcement>, RepositoryError> {
    let sql = format!(
        "SELECT {ANNOUNCEMENT_COLUMNS} FROM market.announcement ORDER BY created_at DESC"
    );
    let rows = sqlx::query_as::<_, Announcement>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Publish an announcement.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
#[instrument(skip(pool, announcement), fields(title = %announcement.title))]
pub async fn create_announcement(
    pool: &PgPool,
    announcement: &NewAnnouncement,
) -> Result<Announcement, RepositoryError> {
    let sql = format!(
        "INSERT INTO market.announcement
             (title, message, priority, audience, is_active, starts_at, ends_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {ANNOUNCEMENT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Announcement>(&sql)
        .bind(&announcement.title)
        .bind(&announcement.message)
        .bind(announcement.priority)
        .bind(announcement.audience)
        .bind(announcement.is_active)
        .bind(announcement.starts_at)
        .bind(announcement.ends_at)
        .fetch_one(pool)
        .await?;
    Ok(row)
}

/// Replace an announcement.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the announcement does not exist.
#[instrument(skip(pool, announcement), fields(announcement_id = %id))]
pub async fn update_announcement(
    pool: &PgPool,
    id: AnnouncementId,
    announcement: &NewAnnouncement,
) -> Result<Announcement, RepositoryError> {
    let sql = format!(
        "UPDATE market.announcement
         SET title = $2, message = $3, priority = $4, audience = $5, is_active = $6,
             starts_at = $7, ends_at = $8, updated_at = NOW()
         WHERE id = $1
         RETURNING {ANNOUNCEMENT_COLUMNS}"
    );
    sqlx::query_as::<_, Announcement>(&sql)
        .bind(id)
        .bind(&announcement.title)
        .bind(&announcement.message)
        .bind(announcement.priority)
        .bind(announcement.audience)
        .bind(announcement.is_active)
        .bind(announcement.starts_at)
        .bind(announcement.ends_at)
        .fetch_optional(pool)
        .await?
        .ok_or(RepositoryError::NotFound)
}

/// Delete an announcement.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the announcement does not exist.
#[instrument(skip(pool), fields(announcement_id = %id))]
pub async fn delete_announcement(pool: &PgPool, id: AnnouncementId) -> Result<(), RepositoryError> {
    let result = sqlx::query("DELETE FROM market.announcement WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

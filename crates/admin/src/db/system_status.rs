//! Service health board.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::support::{ServiceHealth, ServiceStatusUpdate};

/// Every tracked service, by name.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_services(pool: &PgPool) -> Result<Vec<ServiceHealth>, RepositoryError> {
    let rows = sqlx::query_as::<_, ServiceHealth>(
        "SELECT service, status, message, last_checked FROM market.system_status ORDER BY service",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Set a service's status, adding the service if it is new.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the upsert fails.
pub async fn upsert_service(
    pool: &PgPool,
    update: &ServiceStatusUpdate,
) -> Result<ServiceHealth, RepositoryError> {
    let row = sqlx::query_as::<_, ServiceHealth>(
        r"INSERT INTO market.system_status (service, status, message, last_checked)
          VALUES ($1, $2, $3, NOW())
          ON CONFLICT (service) DO UPDATE
          SET status = EXCLUDED.status, message = EXCLUDED.message, last_checked = NOW()
          RETURNING service, status, message, last_checked",
    )
    .bind(&update.service)
    .bind(update.status)
    .bind(update.message.as_deref())
    .fetch_one(pool)
    .await?;
    Ok(row)
}

//! Backup request log.
//!
//! Rows are written as `pending`; the dump itself is taken by the operator's
//! backup job, which moves them through `running` to `completed` or `failed`.

use sqlx::PgPool;

use giftmart_core::{AdminUserId, BackupId};

use super::RepositoryError;
use crate::models::platform::{Backup, NewBackup};

const BACKUP_COLUMNS: &str =
    "id, backup_name, backup_type, status, size_bytes, tables, started_at, completed_at, created_at";

/// Most recent backups first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_backups(pool: &PgPool, limit: i64) -> Result<Vec<Backup>, RepositoryError> {
    let rows = sqlx::query_as::<_, Backup>(&format!(
        "SELECT {BACKUP_COLUMNS} FROM market.backup ORDER BY created_at DESC, id DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns `RepositoryError::Conflict` if a backup with the same name was
/// requested in the same millisecond.
pub async fn create_backup(
    pool: &PgPool,
    backup: &NewBackup,
    created_by: AdminUserId,
) -> Result<Backup, RepositoryError> {
    sqlx::query_as::<_, Backup>(&format!(
        "INSERT INTO market.backup (backup_name, backup_type, tables, created_by)
         VALUES ($1, $2, $3, $4)
         RETURNING {BACKUP_COLUMNS}"
    ))
    .bind(&backup.backup_name)
    .bind(backup.backup_type)
    .bind(&backup.tables)
    .bind(created_by)
    .fetch_one(pool)
    .await
    .map_err(|e| RepositoryError::unique_or(e, "A backup with this name already exists"))
}

/// # Errors
///
/// Returns `RepositoryError::NotFound` if the backup does not exist.
pub async fn delete_backup(pool: &PgPool, id: BackupId) -> Result<(), RepositoryError> {
    let result = sqlx::query("DELETE FROM market.backup WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

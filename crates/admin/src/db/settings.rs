//! Settings database operations.
//!
//! Settings are JSONB documents keyed by name. Reading a document that was
//! never saved stores and returns its defaults.

use sqlx::PgPool;
use tracing::instrument;

use giftmart_core::AdminUserId;

use crate::models::settings::SettingsDocument;

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Load a settings document, creating it with defaults on first read.
///
/// A stored document missing newer fields picks up their defaults.
///
/// # Errors
///
/// Returns an error if the database query fails or the stored value cannot
/// be decoded.
#[instrument(skip(pool), fields(key = T::KEY))]
pub async fn get_document<T: SettingsDocument>(pool: &PgPool) -> Result<T, SettingsError> {
    let stored: Option<serde_json::Value> =
        sqlx::query_scalar("SELECT value FROM market.setting WHERE key = $1")
            .bind(T::KEY)
            .fetch_optional(pool)
            .await?;

    if let Some(value) = stored {
        return Ok(serde_json::from_value(value)?);
    }

    let defaults = T::default();
    sqlx::query(
        r"INSERT INTO market.setting (key, value)
          VALUES ($1, $2)
          ON CONFLICT (key) DO NOTHING",
    )
    .bind(T::KEY)
    .bind(serde_json::to_value(&defaults)?)
    .execute(pool)
    .await?;

    tracing::info!(key = T::KEY, "Created default settings");
    Ok(defaults)
}

/// Store a settings document, replacing any previous value.
///
/// # Errors
///
/// Returns an error if serialization or the upsert fails.
#[instrument(skip(pool, document), fields(key = T::KEY))]
pub async fn put_document<T: SettingsDocument>(
    pool: &PgPool,
    document: &T,
    updated_by: AdminUserId,
) -> Result<(), SettingsError> {
    sqlx::query(
        r"INSERT INTO market.setting (key, value, updated_by)
          VALUES ($1, $2, $3)
          ON CONFLICT (key) DO UPDATE
          SET value = EXCLUDED.value, updated_by = EXCLUDED.updated_by, updated_at = NOW()",
    )
    .bind(T::KEY)
    .bind(serde_json::to_value(document)?)
    .bind(updated_by)
    .execute(pool)
    .await?;

    Ok(())
}

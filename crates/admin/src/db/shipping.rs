//! Per-seller shipping settings.

use sqlx::PgPool;
use sqlx::types::Json;

use giftmart_core::{AdminUserId, SellerId};

use super::RepositoryError;
use crate::models::shipping::ShippingSettings;

/// The seller's saved settings, if any were ever saved.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails or the stored
/// document no longer decodes.
pub async fn get_shipping(
    pool: &PgPool,
    seller_id: SellerId,
) -> Result<Option<ShippingSettings>, RepositoryError> {
    let row: Option<Json<ShippingSettings>> =
        sqlx::query_scalar("SELECT settings FROM market.seller_shipping WHERE seller_id = $1")
            .bind(seller_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|Json(settings)| settings))
}

/// # Errors
///
/// Returns `RepositoryError::Database` if the upsert fails.
pub async fn put_shipping(
    pool: &PgPool,
    seller_id: SellerId,
    settings: &ShippingSettings,
    updated_by: AdminUserId,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"INSERT INTO market.seller_shipping (seller_id, settings, updated_by)
          VALUES ($1, $2, $3)
          ON CONFLICT (seller_id) DO UPDATE
          SET settings = EXCLUDED.settings, updated_by = EXCLUDED.updated_by, updated_at = NOW()",
    )
    .bind(seller_id)
    .bind(Json(settings))
    .bind(updated_by)
    .execute(pool)
    .await?;
    Ok(())
}

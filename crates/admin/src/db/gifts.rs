//! Gift option database operations.

use sqlx::PgPool;

use giftmart_core::{GiftOptionId, GiftType};

use super::RepositoryError;
use crate::models::gift::{GiftOption, NewGift};

const GIFT_COLUMNS: &str =
    "id, name, gift_type, price, images, description, is_active, created_at, updated_at";

/// Gift options, optionally of one type.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_gifts(
    pool: &PgPool,
    gift_type: Option<GiftType>,
) -> Result<Vec<GiftOption>, RepositoryError> {
    let rows = sqlx::query_as::<_, GiftOption>(&format!(
        "SELECT {GIFT_COLUMNS} FROM market.gift_option
         WHERE ($1::market.gift_type IS NULL OR gift_type = $1)
         ORDER BY created_at DESC"
    ))
    .bind(gift_type)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn create_gift(pool: &PgPool, gift: &NewGift) -> Result<GiftOption, RepositoryError> {
    let row = sqlx::query_as::<_, GiftOption>(&format!(
        "INSERT INTO market.gift_option (name, gift_type, price, images, description, is_active)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {GIFT_COLUMNS}"
    ))
    .bind(&gift.name)
    .bind(gift.gift_type)
    .bind(gift.price)
    .bind(&gift.images)
    .bind(&gift.description)
    .bind(gift.is_active)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns `RepositoryError::NotFound` if the gift option does not exist.
pub async fn update_gift(
    pool: &PgPool,
    id: GiftOptionId,
    gift: &NewGift,
) -> Result<GiftOption, RepositoryError> {
    sqlx::query_as::<_, GiftOption>(&format!(
        "UPDATE market.gift_option
         SET name = $2, gift_type = $3, price = $4, images = $5, description = $6,
             is_active = $7, updated_at = NOW()
         WHERE id = $1
         RETURNING {GIFT_COLUMNS}"
    ))
    .bind(id)
    .bind(&gift.name)
    .bind(gift.gift_type)
    .bind(gift.price)
    .bind(&gift.images)
    .bind(&gift.description)
    .bind(gift.is_active)
    .fetch_optional(pool)
    .await?
    .ok_or(RepositoryError::NotFound)
}

/// # Errors
///
/// Returns `RepositoryError::NotFound` if the gift option does not exist.
pub async fn delete_gift(pool: &PgPool, id: GiftOptionId) -> Result<(), RepositoryError> {
    let result = sqlx::query("DELETE FROM market.gift_option WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

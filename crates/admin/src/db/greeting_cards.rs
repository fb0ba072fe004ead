//! Greeting card catalog.

use sqlx::PgPool;

use giftmart_core::{CardCategory, GreetingCardId};

use super::RepositoryError;
use crate::models::platform::{GreetingCard, NewCard};

const CARD_COLUMNS: &str = "id, title, category, image_url, template, is_active, is_premium, \
                            price, usage_count, created_at, updated_at";

/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_cards(
    pool: &PgPool,
    category: Option<CardCategory>,
) -> Result<Vec<GreetingCard>, RepositoryError> {
    let rows = sqlx::query_as::<_, GreetingCard>(&format!(
        "SELECT {CARD_COLUMNS} FROM market.greeting_card
         WHERE ($1::market.card_category IS NULL OR category = $1)
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(category)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn create_card(pool: &PgPool, card: &NewCard) -> Result<GreetingCard, RepositoryError> {
    let row = sqlx::query_as::<_, GreetingCard>(&format!(
        "INSERT INTO market.greeting_card
             (title, category, image_url, template, is_active, is_premium, price)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {CARD_COLUMNS}"
    ))
    .bind(&card.title)
    .bind(card.category)
    .bind(card.image_url.as_deref())
    .bind(card.template.as_deref())
    .bind(card.is_active)
    .bind(card.is_premium)
    .bind(card.price)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Replace a card, keeping its usage count.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the card does not exist.
pub async fn update_card(
    pool: &PgPool,
    id: GreetingCardId,
    card: &NewCard,
) -> Result<GreetingCard, RepositoryError> {
    sqlx::query_as::<_, GreetingCard>(&format!(
        "UPDATE market.greeting_card
         SET title = $2, category = $3, image_url = $4, template = $5, is_active = $6,
             is_premium = $7, price = $8, updated_at = NOW()
         WHERE id = $1
         RETURNING {CARD_COLUMNS}"
    ))
    .bind(id)
    .bind(&card.title)
    .bind(card.category)
    .bind(card.image_url.as_deref())
    .bind(card.template.as_deref())
    .bind(card.is_active)
    .bind(card.is_premium)
    .bind(card.price)
    .fetch_optional(pool)
    .await?
    .ok_or(RepositoryError::NotFound)
}

/// # Errors
///
/// Returns `RepositoryError::NotFound` if the card does not exist.
pub async fn delete_card(pool: &PgPool, id: GreetingCardId) -> Result<(), RepositoryError> {
    let result = sqlx::query("DELETE FROM market.greeting_card WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

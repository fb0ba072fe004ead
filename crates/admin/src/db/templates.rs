//! Message template database operations.
//!
//! `only` pins a call to one channel so the support desk's email and SMS
//! routes cannot reach templates of another kind.

use sqlx::PgPool;

use giftmart_core::{TemplateChannel, TemplateId};

use super::RepositoryError;
use crate::models::template::{MessageTemplate, NewTemplate};

const TEMPLATE_COLUMNS: &str = "id, channel, name, category, trigger_event, subject, body, \
                                variables, is_active, created_at, updated_at";

/// Templates, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_templates(
    pool: &PgPool,
    channel: Option<TemplateChannel>,
) -> Result<Vec<MessageTemplate>, RepositoryError> {
    let rows = sqlx::query_as::<_, MessageTemplate>(&format!(
        "SELECT {TEMPLATE_COLUMNS} FROM market.message_template
         WHERE ($1::market.template_channel IS NULL OR channel = $1)
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(channel)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn create_template(
    pool: &PgPool,
    template: &NewTemplate,
) -> Result<MessageTemplate, RepositoryError> {
    let row = sqlx::query_as::<_, MessageTemplate>(&format!(
        "INSERT INTO market.message_template
             (channel, name, category, trigger_event, subject, body, variables, is_active)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {TEMPLATE_COLUMNS}"
    ))
    .bind(template.channel)
    .bind(&template.name)
    .bind(&template.category)
    .bind(template.trigger_event.as_deref())
    .bind(template.subject.as_deref())
    .bind(&template.body)
    .bind(&template.variables)
    .bind(template.is_active)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Replace a template.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the template does not exist or is
/// not on the `only` channel.
pub async fn update_template(
    pool: &PgPool,
    id: TemplateId,
    template: &NewTemplate,
    only: Option<TemplateChannel>,
) -> Result<MessageTemplate, RepositoryError> {
    sqlx::query_as::<_, MessageTemplate>(&format!(
        "UPDATE market.message_template
         SET channel = $2, name = $3, category = $4, trigger_event = $5, subject = $6,
             body = $7, variables = $8, is_active = $9, updated_at = NOW()
         WHERE id = $1 AND ($10::market.template_channel IS NULL OR channel = $10)
         RETURNING {TEMPLATE_COLUMNS}"
    ))
    .bind(id)
    .bind(template.channel)
    .bind(&template.name)
    .bind(&template.category)
    .bind(template.trigger_event.as_deref())
    .bind(template.subject.as_deref())
    .bind(&template.body)
    .bind(&template.variables)
    .bind(template.is_active)
    .bind(only)
    .fetch_optional(pool)
    .await?
    .ok_or(RepositoryError::NotFound)
}

/// # Errors
///
/// Returns `RepositoryError::NotFound` if the template does not exist or is
/// not on the `only` channel.
pub async fn delete_template(
    pool: &PgPool,
    id: TemplateId,
    only: Option<TemplateChannel>,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        "DELETE FROM market.message_template
         WHERE id = $1 AND ($2::market.template_channel IS NULL OR channel = $2)",
    )
    .bind(id)
    .bind(only)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

//! Help documents and seller training resources.

use sqlx::PgPool;

use giftmart_core::{HelpDocId, TrainingResourceId, TrainingResourceType};

use super::RepositoryError;
use crate::models::support::{HelpDoc, NewHelpDoc, NewTrainingResource, TrainingResource};

const HELP_DOC_COLUMNS: &str =
    "id, title, content, category, tags, is_published, views, created_at, updated_at";

const TRAINING_COLUMNS: &str = "id, title, description, resource_type, url, duration, pages, \
                                thumbnail, is_active, created_at, updated_at";

/// Published help documents, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_help_docs(
    pool: &PgPool,
    category: Option<&str>,
) -> Result<Vec<HelpDoc>, RepositoryError> {
    let rows = sqlx::query_as::<_, HelpDoc>(&format!(
        "SELECT {HELP_DOC_COLUMNS} FROM market.help_doc
         WHERE is_published AND ($1::text IS NULL OR category = $1)
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
pub async fn create_help_doc(pool: &PgPool, doc: &NewHelpDoc) -> Result<HelpDoc, RepositoryError> {
    let row = sqlx::query_as::<_, HelpDoc>(&format!(
        "INSERT INTO market.help_doc (title, content, category, tags, is_published)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {HELP_DOC_COLUMNS}"
    ))
    .bind(&doc.title)
    .bind(&doc.content)
    .bind(&doc.category)
    .bind(&doc.tags)
    .bind(doc.is_published)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Replace a document, keeping its view count.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the document does not exist.
pub async fn update_help_doc(
    pool: &PgPool,
    id: HelpDocId,
    doc: &NewHelpDoc,
) -> Result<HelpDoc, RepositoryError> {
    sqlx::query_as::<_, HelpDoc>(&format!(
        "UPDATE market.help_doc
         SET title = $2, content = $3, category = $4, tags = $5, is_published = $6,
             updated_at = NOW()
         WHERE id = $1
         RETURNING {HELP_DOC_COLUMNS}"
    ))
    .bind(id)
    .bind(&doc.title)
    .bind(&doc.content)
    .bind(&doc.category)
    .bind(&doc.tags)
    .bind(doc.is_published)
    .fetch_optional(pool)
    .await?
    .ok_or(RepositoryError::NotFound)
}

/// # Errors
///
/// Returns `RepositoryError::NotFound` if the document does not exist.
pub async fn delete_help_doc(pool: &PgPool, id: HelpDocId) -> Result<(), RepositoryError> {
    let result = sqlx::query("DELETE FROM market.help_doc WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Count one read of a published document.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if no published document has this id.
pub async fn record_help_doc_view(pool: &PgPool, id: HelpDocId) -> Result<HelpDoc, RepositoryError> {
    sqlx::query_as::<_, HelpDoc>(&format!(
        "UPDATE market.help_doc SET views = views + 1
         WHERE id = $1 AND is_published
         RETURNING {HELP_DOC_COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(RepositoryError::NotFound)
}

/// Active training resources, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_training(
    pool: &PgPool,
    resource_type: Option<TrainingResourceType>,
) -> Result<Vec<TrainingResource>, RepositoryError> {
    let rows = sqlx::query_as::<_, TrainingResource>(&format!(
        "SELECT {TRAINING_COLUMNS} FROM market.training_resource
         WHERE is_active AND ($1::market.training_resource_type IS NULL OR resource_type = $1)
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(resource_type)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn create_training(
    pool: &PgPool,
    resource: &NewTrainingResource,
) -> Result<TrainingResource, RepositoryError> {
    let row = sqlx::query_as::<_, TrainingResource>(&format!(
        "INSERT INTO market.training_resource
             (title, description, resource_type, url, duration, pages, thumbnail, is_active)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {TRAINING_COLUMNS}"
    ))
    .bind(&resource.title)
    .bind(resource.description.as_deref())
    .bind(resource.resource_type)
    .bind(&resource.url)
    .bind(resource.duration.as_deref())
    .bind(resource.pages)
    .bind(resource.thumbnail.as_deref())
    .bind(resource.is_active)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns `RepositoryError::NotFound` if the resource does not exist.
pub async fn update_training(
    pool: &PgPool,
    id: TrainingResourceId,
    resource: &NewTrainingResource,
) -> Result<TrainingResource, RepositoryError> {
    sqlx::query_as::<_, TrainingResource>(&format!(
        "UPDATE market.training_resource
         SET title = $2, description = $3, resource_type = $4, url = $5, duration = $6,
             pages = $7, thumbnail = $8, is_active = $9, updated_at = NOW()
         WHERE id = $1
         RETURNING {TRAINING_COLUMNS}"
    ))
    .bind(id)
    .bind(&resource.title)
    .bind(resource.description.as_deref())
    .bind(resource.resource_type)
    .bind(&resource.url)
    .bind(resource.duration.as_deref())
    .bind(resource.pages)
    .bind(resource.thumbnail.as_deref())
    .bind(resource.is_active)
    .fetch_optional(pool)
    .await?
    .ok_or(RepositoryError::NotFound)
}

/// # Errors
///
/// Returns `RepositoryError::NotFound` if the resource does not exist.
pub async fn delete_training(pool: &PgPool, id: TrainingResourceId) -> Result<(), RepositoryError> {
    let result = sqlx::query("DELETE FROM market.training_resource WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

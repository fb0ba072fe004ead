//! Category repository.

use sqlx::PgPool;
use tracing::instrument;

use giftmart_core::CategoryId;

use super::RepositoryError;
use crate::models::{Category, NewCategory};

const CATEGORY_COLUMNS: &str =
    "id, name, images, commission_rate, attributes, created_at, updated_at";
const DUPLICATE_NAME: &str = "a category with this name already exists";

/// Repository for product categories.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM market.category ORDER BY name"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM market.category WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    #[instrument(skip(self, category), fields(name = %category.name))]
    pub async fn create(&self, category: &NewCategory) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO market.category (name, images, commission_rate, attributes)
             VALUES ($1, $2, $3, $4)
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(&category.name)
        .bind(&category.images)
        .bind(category.commission_rate.map(giftmart_core::Rate::value))
        .bind(&category.attributes)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_or(e, DUPLICATE_NAME))
    }

    /// Replace a category's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist,
    /// `RepositoryError::Conflict` if the new name is taken.
    #[instrument(skip(self, category), fields(category_id = %id))]
    pub async fn update(
        &self,
        id: CategoryId,
        category: &NewCategory,
    ) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(&format!(
            "UPDATE market.category
             SET name = $2, images = $3, commission_rate = $4, attributes = $5, updated_at = NOW()
             WHERE id = $1
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id)
        .bind(&category.name)
        .bind(&category.images)
        .bind(category.commission_rate.map(giftmart_core::Rate::value))
        .bind(&category.attributes)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_or(e, DUPLICATE_NAME))?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM market.category WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

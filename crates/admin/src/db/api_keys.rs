//! Partner API key repository.

use sqlx::PgPool;
use tracing::instrument;

use giftmart_core::{AdminUserId, ApiKeyId};

use super::RepositoryError;
use crate::models::platform::{ApiKey, NewApiKey};

const API_KEY_COLUMNS: &str = "id, name, api_key, rate_limit, rate_limit_window, \
                               allowed_origins, permissions, is_active, expires_at, \
                               last_used_at, usage_count, created_at";

/// Repository for keys issued to storefronts and partners.
pub struct ApiKeyRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ApiKeyRepository<'a> {
    /// Create a new API key repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Keys, newest first. Secrets are never selected.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<ApiKey>, RepositoryError> {
        let rows = sqlx::query_as::<_, ApiKey>(&format!(
            "SELECT {API_KEY_COLUMNS} FROM market.api_key ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Store a new key with the hash of its secret.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the generated key already exists.
    #[instrument(skip(self, key, api_key, secret_hash), fields(name = %key.name))]
    pub async fn create(
        &self,
        key: &NewApiKey,
        api_key: &str,
        secret_hash: &str,
        created_by: AdminUserId,
    ) -> Result<ApiKey, RepositoryError> {
        sqlx::query_as::<_, ApiKey>(&format!(
            "INSERT INTO market.api_key
                 (name, api_key, secret_hash, rate_limit, rate_limit_window, allowed_origins,
                  permissions, expires_at, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {API_KEY_COLUMNS}"
        ))
        .bind(&key.name)
        .bind(api_key)
        .bind(secret_hash)
        .bind(key.rate_limit)
        .bind(key.rate_limit_window)
        .bind(&key.allowed_origins)
        .bind(&key.permissions)
        .bind(key.expires_at)
        .bind(created_by)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_or(e, "API key already exists"))
    }

    /// Flip `is_active`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the key does not exist.
    #[instrument(skip(self), fields(api_key_id = %id))]
    pub async fn toggle(&self, id: ApiKeyId) -> Result<ApiKey, RepositoryError> {
        sqlx::query_as::<_, ApiKey>(&format!(
            "UPDATE market.api_key SET is_active = NOT is_active
             WHERE id = $1
             RETURNING {API_KEY_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the key does not exist.
    #[instrument(skip(self), fields(api_key_id = %id))]
    pub async fn delete(&self, id: ApiKeyId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM market.api_key WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

//! Access role repository.

use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use giftmart_core::RoleId;

use super::RepositoryError;
use crate::models::platform::{AccessRole, NewRole};

const ROLE_COLUMNS: &str =
    "id, role_name, description, is_system_role, permissions, created_at, updated_at";

const DUPLICATE_ROLE: &str = "Role name already exists";

/// Repository for named permission sets.
pub struct RoleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RoleRepository<'a> {
    /// Create a new role repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// System roles first, then by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<AccessRole>, RepositoryError> {
        let rows = sqlx::query_as::<_, AccessRole>(&format!(
            "SELECT {ROLE_COLUMNS} FROM market.access_role
             ORDER BY is_system_role DESC, role_name"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: RoleId) -> Result<Option<AccessRole>, RepositoryError> {
        let row = sqlx::query_as::<_, AccessRole>(&format!(
            "SELECT {ROLE_COLUMNS} FROM market.access_role WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Create a custom role. Roles created here are never system roles.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    #[instrument(skip(self, role), fields(role_name = %role.role_name))]
    pub async fn create(&self, role: &NewRole) -> Result<AccessRole, RepositoryError> {
        sqlx::query_as::<_, AccessRole>(&format!(
            "INSERT INTO market.access_role (role_name, description, permissions)
             VALUES ($1, $2, $3)
             RETURNING {ROLE_COLUMNS}"
        ))
        .bind(&role.role_name)
        .bind(role.description.as_deref())
        .bind(Json(&role.permissions))
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_or(e, DUPLICATE_ROLE))
    }

    /// Replace a role's name, description and permissions.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the role does not exist, or
    /// `RepositoryError::Conflict` if the new name is taken.
    #[instrument(skip(self, role), fields(role_id = %id))]
    pub async fn update(&self, id: RoleId, role: &NewRole) -> Result<AccessRole, RepositoryError> {
        sqlx::query_as::<_, AccessRole>(&format!(
            "UPDATE market.access_role
             SET role_name = $2, description = $3, permissions = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING {ROLE_COLUMNS}"
        ))
        .bind(id)
        .bind(&role.role_name)
        .bind(role.description.as_deref())
        .bind(Json(&role.permissions))
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_or(e, DUPLICATE_ROLE))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a custom role. System roles are left in place.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no custom role has this id.
    #[instrument(skip(self), fields(role_id = %id))]
    pub async fn delete(&self, id: RoleId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM market.access_role WHERE id = $1 AND NOT is_system_role")
                .bind(id)
                .execute(self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

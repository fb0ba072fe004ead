//! Warehouse database operations.

use sqlx::PgPool;

use giftmart_core::WarehouseId;

use super::RepositoryError;
use crate::models::warehouse::{NewWarehouse, Warehouse};

const WAREHOUSE_COLUMNS: &str = "id, name, location, manager, contact_number, capacity, \
                                 is_active, created_at, updated_at";

/// All warehouses, active first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_warehouses(pool: &PgPool) -> Result<Vec<Warehouse>, RepositoryError> {
    let rows = sqlx::query_as::<_, Warehouse>(&format!(
        "SELECT {WAREHOUSE_COLUMNS} FROM market.warehouse ORDER BY is_active DESC, name"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_warehouse(
    pool: &PgPool,
    id: WarehouseId,
) -> Result<Option<Warehouse>, RepositoryError> {
    let row = sqlx::query_as::<_, Warehouse>(&format!(
        "SELECT {WAREHOUSE_COLUMNS} FROM market.warehouse WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn create_warehouse(
    pool: &PgPool,
    warehouse: &NewWarehouse,
) -> Result<Warehouse, RepositoryError> {
    let row = sqlx::query_as::<_, Warehouse>(&format!(
        "INSERT INTO market.warehouse (name, location, manager, contact_number, capacity, is_active)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {WAREHOUSE_COLUMNS}"
    ))
    .bind(&warehouse.name)
    .bind(&warehouse.location)
    .bind(warehouse.manager.as_deref())
    .bind(warehouse.contact_number.as_deref())
    .bind(warehouse.capacity)
    .bind(warehouse.is_active)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns `RepositoryError::NotFound` if the warehouse does not exist.
pub async fn update_warehouse(
    pool: &PgPool,
    id: WarehouseId,
    warehouse: &NewWarehouse,
) -> Result<Warehouse, RepositoryError> {
    sqlx::query_as::<_, Warehouse>(&format!(
        "UPDATE market.warehouse
         SET name = $2, location = $3, manager = $4, contact_number = $5,
             capacity = $6, is_active = $7, updated_at = NOW()
         WHERE id = $1
         RETURNING {WAREHOUSE_COLUMNS}"
    ))
    .bind(id)
    .bind(&warehouse.name)
    .bind(&warehouse.location)
    .bind(warehouse.manager.as_deref())
    .bind(warehouse.contact_number.as_deref())
    .bind(warehouse.capacity)
    .bind(warehouse.is_active)
    .fetch_optional(pool)
    .await?
    .ok_or(RepositoryError::NotFound)
}

/// # Errors
///
/// Returns `RepositoryError::NotFound` if the warehouse does not exist.
pub async fn delete_warehouse(pool: &PgPool, id: WarehouseId) -> Result<(), RepositoryError> {
    let result = sqlx::query("DELETE FROM market.warehouse WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

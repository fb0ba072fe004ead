//! Warehouse CRUD.

use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};
use tracing::instrument;

use giftmart_core::WarehouseId;

use crate::{
    db::warehouses,
    error::{AppError, AppResult},
    extract::{ApiJson, ApiPath},
    middleware::{RequireAdminAuth, RequireWriteAccess},
    models::warehouse::{Warehouse, WarehouseInput},
    state::AppState,
};

/// Build the warehouses router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/warehouses", get(list).post(create))
        .route("/warehouses/{id}", get(show).put(update).delete(remove))
}

/// GET /api/admin/warehouses
async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Warehouse>>> {
    Ok(Json(warehouses::list_warehouses(state.pool()).await?))
}

/// GET /api/admin/warehouses/{id}
async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<WarehouseId>,
) -> AppResult<Json<Warehouse>> {
    warehouses::get_warehouse(state.pool(), id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("warehouse {id}")))
}

/// POST /api/admin/warehouses
#[instrument(skip(_admin, state, body))]
async fn create(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<WarehouseInput>,
) -> AppResult<Json<Value>> {
    let warehouse = warehouses::create_warehouse(state.pool(), &body.validate()?).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Warehouse created",
        "warehouse": warehouse,
    })))
}

/// PUT /api/admin/warehouses/{id}
#[instrument(skip(_admin, state, body))]
async fn update(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<WarehouseId>,
    ApiJson(body): ApiJson<WarehouseInput>,
) -> AppResult<Json<Value>> {
    let warehouse = warehouses::update_warehouse(state.pool(), id, &body.validate()?).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Warehouse updated",
        "warehouse": warehouse,
    })))
}

/// DELETE /api/admin/warehouses/{id}
#[instrument(skip(_admin, state))]
async fn remove(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<WarehouseId>,
) -> AppResult<Json<Value>> {
    warehouses::delete_warehouse(state.pool(), id).await?;
    Ok(Json(json!({ "success": true, "message": "Warehouse deleted" })))
}

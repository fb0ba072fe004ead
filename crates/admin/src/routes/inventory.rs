//! Stock level handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, patch, post},
};
use serde_json::{Value, json};
use tracing::instrument;

use giftmart_core::ProductId;

use crate::{
    db::ProductRepository,
    error::{AppError, AppResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::{RequireAdminAuth, RequireWriteAccess},
    models::inventory::{BulkStockUpdate, InventoryOverview, InventoryQuery, StockUpdate},
    state::AppState,
};

/// Build the inventory router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(overview))
        .route("/inventory/bulk", post(bulk_update))
        .route("/inventory/{product_id}", patch(update_stock))
}

/// GET /api/admin/inventory
#[instrument(skip(_admin, state))]
async fn overview(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<InventoryQuery>,
) -> AppResult<Json<InventoryOverview>> {
    let items = ProductRepository::new(state.pool())
        .inventory(query.search.as_deref())
        .await?;
    Ok(Json(InventoryOverview::summarize(
        items,
        state.marketplace().low_stock_threshold,
    )))
}

/// PATCH /api/admin/inventory/{product_id}
#[instrument(skip(_admin, state, body))]
async fn update_stock(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<StockUpdate>,
) -> AppResult<Json<Value>> {
    if body.stock < 0 {
        return Err(AppError::BadRequest("stock cannot be negative".to_string()));
    }
    let item = ProductRepository::new(state.pool())
        .set_stock(product_id, body.stock)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Stock updated",
        "item": item,
    })))
}

/// Update several products' stock in one transaction.
///
/// POST /api/admin/inventory/bulk
#[instrument(skip(_admin, state, body))]
async fn bulk_update(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<BulkStockUpdate>,
) -> AppResult<Json<Value>> {
    let updates = body.validate()?;
    let modified = ProductRepository::new(state.pool())
        .bulk_set_stock(&updates)
        .await?;
    tracing::info!(requested = updates.len(), modified, "Bulk stock update applied");

    Ok(Json(json!({
        "success": true,
        "message": format!("Updated stock for {modified} products"),
        "modifiedCount": modified,
    })))
}

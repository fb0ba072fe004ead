//! Category CRUD.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use serde_json::{Value, json};
use tracing::instrument;

use giftmart_core::CategoryId;

use crate::{
    db::CategoryRepository,
    error::{AppError, AppResult},
    extract::{ApiJson, ApiPath},
    middleware::{RequireAdminAuth, RequireWriteAccess},
    models::{Category, CategoryInput},
    state::AppState,
};

/// Build the categories router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list).post(create))
        .route("/categories/{id}", get(show).put(update).delete(remove))
}

/// GET /api/admin/categories
#[instrument(skip(_admin, state))]
async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(CategoryRepository::new(state.pool()).list().await?))
}

/// GET /api/admin/categories/{id}
#[instrument(skip(_admin, state))]
async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CategoryId>,
) -> AppResult<Json<Category>> {
    CategoryRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("category {id}")))
}

/// POST /api/admin/categories
#[instrument(skip(_admin, state, body))]
async fn create(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CategoryInput>,
) -> AppResult<Json<Value>> {
    let category = body.validate()?;
    let category = CategoryRepository::new(state.pool()).create(&category).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Category created",
        "category": category,
    })))
}

/// PUT /api/admin/categories/{id}
#[instrument(skip(_admin, state, body))]
async fn update(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CategoryId>,
    ApiJson(body): ApiJson<CategoryInput>,
) -> AppResult<Json<Value>> {
    let category = body.validate()?;
    let category = CategoryRepository::new(state.pool())
        .update(id, &category)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Category updated",
        "category": category,
    })))
}

/// DELETE /api/admin/categories/{id}
#[instrument(skip(_admin, state))]
async fn remove(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CategoryId>,
) -> AppResult<Json<Value>> {
    CategoryRepository::new(state.pool()).delete(id).await?;
    Ok(Json(json!({ "success": true, "message": "Category deleted" })))
}

//! Gift add-on handlers.

use axum::{Json, Router, extract::State, routing::{get, put}};
use serde_json::{Value, json};
use tracing::instrument;

use giftmart_core::GiftOptionId;

use crate::{
    db::gifts,
    error::AppResult,
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::{RequireAdminAuth, RequireWriteAccess},
    models::gift::{GiftInput, GiftListQuery, GiftOption},
    state::AppState,
};

/// Build the gifts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/gifts", get(list).post(create))
        .route("/gifts/{id}", put(update).delete(remove))
}

/// GET /api/admin/gifts
async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<GiftListQuery>,
) -> AppResult<Json<Vec<GiftOption>>> {
    Ok(Json(gifts::list_gifts(state.pool(), query.gift_type).await?))
}

/// POST /api/admin/gifts
#[instrument(skip(_admin, state, body))]
async fn create(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GiftInput>,
) -> AppResult<Json<Value>> {
    let gift = gifts::create_gift(state.pool(), &body.validate()?).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Gift option added",
        "gift": gift,
    })))
}

/// PUT /api/admin/gifts/{id}
#[instrument(skip(_admin, state, body))]
async fn update(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<GiftOptionId>,
    ApiJson(body): ApiJson<GiftInput>,
) -> AppResult<Json<Value>> {
    let gift = gifts::update_gift(state.pool(), id, &body.validate()?).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Gift option updated",
        "gift": gift,
    })))
}

/// DELETE /api/admin/gifts/{id}
#[instrument(skip(_admin, state))]
async fn remove(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<GiftOptionId>,
) -> AppResult<Json<Value>> {
    gifts::delete_gift(state.pool(), id).await?;
    Ok(Json(json!({ "success": true, "message": "Gift option deleted" })))
}

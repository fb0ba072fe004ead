//! Product moderation handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get, patch},
};
use serde_json::{Value, json};
use tracing::instrument;

use giftmart_core::{ProductId, ProductStatus};

use crate::{
    db::ProductRepository,
    error::{AppError, AppResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::{RequireAdminAuth, RequireWriteAccess},
    models::{
        Paged, Pagination,
        product::{ProductListQuery, ProductListing, ProductStatusUpdate},
    },
    services::activity,
    state::AppState,
};

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list))
        .route("/products/{id}", delete(remove))
        .route("/products/{id}/status", patch(moderate))
        .route("/products/{id}/featured", patch(toggle_featured))
}

/// GET /api/admin/products
#[instrument(skip(_admin, state))]
async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductListQuery>,
) -> AppResult<Json<Paged<ProductListing>>> {
    let window = Pagination::new(query.page, query.limit);
    let (items, total) = ProductRepository::new(state.pool())
        .list(query.filter, query.search.as_deref(), window)
        .await?;
    Ok(Json(Paged {
        items,
        pagination: window.info(total),
    }))
}

/// Approve or reject a product.
///
/// PATCH /api/admin/products/{id}/status
#[instrument(skip(admin, state, body), fields(admin_id = %admin.id))]
async fn moderate(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<ProductStatusUpdate>,
) -> AppResult<Json<Value>> {
    let decision = body.validate()?;
    let product = ProductRepository::new(state.pool())
        .moderate(id, &decision)
        .await?;
    state.invalidate_dashboard_stats().await;

    activity::record(
        state.pool(),
        activity::admin_entry(
            &admin,
            &format!("product_{}", decision.status),
            "product",
            id,
            json!({ "name": product.name, "reason": decision.rejection_reason }),
        ),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "message": format!("Product {}", decision.status),
        "product": product,
    })))
}

/// Flip the featured flag. Only approved products can be featured.
///
/// PATCH /api/admin/products/{id}/featured
#[instrument(skip(_admin, state))]
async fn toggle_featured(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> AppResult<Json<Value>> {
    let repo = ProductRepository::new(state.pool());
    let product = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let featured = !product.is_featured;
    if featured && product.status != ProductStatus::Approved {
        return Err(AppError::BadRequest(
            "Only approved products can be featured".to_string(),
        ));
    }

    let product = repo.set_featured(id, featured).await?;
    Ok(Json(json!({
        "success": true,
        "message": if featured { "Product featured" } else { "Product unfeatured" },
        "product": product,
    })))
}

/// DELETE /api/admin/products/{id}
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
async fn remove(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> AppResult<Json<Value>> {
    ProductRepository::new(state.pool()).delete(id).await?;
    state.invalidate_dashboard_stats().await;
    activity::record(
        state.pool(),
        activity::admin_entry(&admin, "product_deleted", "product", id, json!({})),
    )
    .await;
    Ok(Json(json!({ "success": true, "message": "Product deleted" })))
}

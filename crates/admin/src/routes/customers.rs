//! Customer account handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, patch},
};
use serde_json::{Value, json};
use tracing::instrument;

use giftmart_core::CustomerId;

use crate::{
    db::CustomerRepository,
    error::{AppError, AppResult},
    extract::{ApiPath, ApiQuery},
    middleware::{RequireAdminAuth, RequireWriteAccess},
    models::{CustomerListQuery, CustomerSummary, Paged, Pagination},
    services::activity,
    state::AppState,
};

/// Build the customers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list))
        .route("/customers/{id}", get(show))
        .route("/customers/{id}/block", patch(toggle_block))
}

/// GET /api/admin/customers
#[instrument(skip(_admin, state))]
async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CustomerListQuery>,
) -> AppResult<Json<Paged<CustomerSummary>>> {
    let window = Pagination::new(query.page, query.limit);
    let (items, total) = CustomerRepository::new(state.pool())
        .list(query.search.as_deref(), window)
        .await?;
    Ok(Json(Paged {
        items,
        pagination: window.info(total),
    }))
}

/// GET /api/admin/customers/{id}
#[instrument(skip(_admin, state))]
async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
) -> AppResult<Json<CustomerSummary>> {
    CustomerRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("customer {id}")))
}

/// PATCH /api/admin/customers/{id}/block
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
async fn toggle_block(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
) -> AppResult<Json<Value>> {
    let is_blocked = CustomerRepository::new(state.pool()).toggle_block(id).await?;

    let action = if is_blocked { "customer_blocked" } else { "customer_unblocked" };
    activity::record(
        state.pool(),
        activity::admin_entry(&admin, action, "customer", id, json!({})),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "message": if is_blocked { "Customer blocked" } else { "Customer unblocked" },
        "isBlocked": is_blocked,
    })))
}

//! Review moderation handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get, patch},
};
use serde_json::{Value, json};
use tracing::instrument;

use giftmart_core::ReviewId;

use crate::{
    db::{ReviewRepository, reviews::ReviewFilter},
    error::AppResult,
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::{RequireAdminAuth, RequireWriteAccess},
    models::{
        Pagination,
        review::{ReviewListQuery, ReviewPage, ReviewStatusUpdate},
    },
    state::AppState,
};

/// Build the reviews router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(list))
        .route("/reviews/{id}", delete(remove))
        .route("/reviews/{id}/status", patch(set_status))
        .route("/reviews/{id}/visibility", patch(toggle_visibility))
}

/// GET /api/admin/reviews
#[instrument(skip(_admin, state))]
async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ReviewListQuery>,
) -> AppResult<Json<ReviewPage>> {
    let window = Pagination::new(query.page, query.limit);
    let filter = ReviewFilter {
        search: query.search.as_deref(),
        status: query.status,
        rating: query.rating,
    };
    let (reviews, stats) = ReviewRepository::new(state.pool())
        .list(&filter, window)
        .await?;
    let pagination = window.info(stats.total_reviews);

    Ok(Json(ReviewPage {
        reviews,
        stats,
        pagination,
    }))
}

/// PATCH /api/admin/reviews/{id}/status
#[instrument(skip(_admin, state, body))]
async fn set_status(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ReviewId>,
    ApiJson(body): ApiJson<ReviewStatusUpdate>,
) -> AppResult<Json<Value>> {
    let review = ReviewRepository::new(state.pool())
        .set_status(id, body.status, body.report_reason.as_deref())
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Review marked {}", review.status),
        "review": review,
    })))
}

/// PATCH /api/admin/reviews/{id}/visibility
#[instrument(skip(_admin, state))]
async fn toggle_visibility(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ReviewId>,
) -> AppResult<Json<Value>> {
    let is_hidden = ReviewRepository::new(state.pool())
        .toggle_visibility(id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": if is_hidden { "Review hidden" } else { "Review visible" },
        "isHidden": is_hidden,
    })))
}

/// DELETE /api/admin/reviews/{id}
#[instrument(skip(_admin, state))]
async fn remove(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ReviewId>,
) -> AppResult<Json<Value>> {
    ReviewRepository::new(state.pool()).delete(id).await?;
    Ok(Json(json!({ "success": true, "message": "Review deleted" })))
}

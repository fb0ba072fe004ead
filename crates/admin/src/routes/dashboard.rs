//! Dashboard stats and activity feed.

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use tracing::instrument;

use crate::{
    db::ReportRepository,
    error::AppResult,
    middleware::RequireAdminAuth,
    models::{DashboardStats, RecentActivity},
    state::AppState,
};

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard/stats", get(stats))
        .route("/dashboard/activities", get(activities))
}

/// Headline numbers, served from cache while fresh.
///
/// GET /api/admin/dashboard/stats
#[instrument(skip(_admin, state))]
async fn stats(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Arc<DashboardStats>>> {
    if let Some(cached) = state.cached_dashboard_stats().await {
        return Ok(Json(cached));
    }

    let stats = Arc::new(ReportRepository::new(state.pool()).dashboard_stats().await?);
    state.cache_dashboard_stats(Arc::clone(&stats)).await;
    Ok(Json(stats))
}

/// GET /api/admin/dashboard/activities
#[instrument(skip(_admin, state))]
async fn activities(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<RecentActivity>>> {
    let activity = ReportRepository::new(state.pool()).recent_activity().await?;
    Ok(Json(activity))
}

//! Marketplace analytics and the order CSV export.

use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use tracing::instrument;

use crate::{
    db::ReportRepository,
    error::AppResult,
    extract::ApiQuery,
    middleware::RequireAdminAuth,
    models::report::{Analytics, ExportRange},
    services::reports::orders_csv,
    state::AppState,
};

/// Months of revenue on the analytics page.
const ANALYTICS_MONTHS: i32 = 12;
/// Categories ranked by revenue.
const TOP_CATEGORIES: i64 = 10;

/// Build the analytics router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analytics", get(overview))
        .route("/analytics/export", get(export))
}

/// GET /api/admin/analytics
#[instrument(skip(_admin, state))]
async fn overview(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Analytics>> {
    let repo = ReportRepository::new(state.pool());
    let (monthly_revenue, status_breakdown, top_categories) = tokio::try_join!(
        repo.monthly_revenue(ANALYTICS_MONTHS),
        repo.status_breakdown(),
        repo.top_categories(TOP_CATEGORIES),
    )?;

    Ok(Json(Analytics {
        monthly_revenue,
        status_breakdown,
        top_categories,
    }))
}

/// GET /api/admin/analytics/export
#[instrument(skip(_admin, state))]
async fn export(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(range): ApiQuery<ExportRange>,
) -> AppResult<Response> {
    let rows = ReportRepository::new(state.pool())
        .export_rows(range.from, range.to)
        .await?;
    tracing::info!(rows = rows.len(), "Exporting orders");

    let filename = format!("orders-{}.csv", Utc::now().format("%Y%m%d"));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        orders_csv(&rows),
    )
        .into_response())
}

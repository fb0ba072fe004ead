//! Reports, mounted at `/api/reports`.

use axum::{Json, Router, extract::State, routing::get};
use tracing::instrument;

use crate::{
    db::ReportRepository,
    error::AppResult,
    extract::ApiQuery,
    middleware::RequireAdminAuth,
    models::report::{
        CustomerReport, ProductPerformance, ReportRange, ReportSummary, RevenueReport,
        VendorPerformance,
    },
    services::reports::{average, frequency_buckets, product_performance, vendor_performance},
    state::AppState,
};

/// Build the reports router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/revenue", get(revenue))
        .route("/vendors", get(vendors))
        .route("/products", get(products))
        .route("/customers", get(customers))
        .route("/summary", get(summary))
}

/// GET /api/reports/revenue
#[instrument(skip(_admin, state))]
async fn revenue(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(range): ApiQuery<ReportRange>,
) -> AppResult<Json<RevenueReport>> {
    let (daily, summary) = ReportRepository::new(state.pool())
        .revenue(range.start_date, range.end_date)
        .await?;
    Ok(Json(RevenueReport { daily, summary }))
}

/// GET /api/reports/vendors
async fn vendors(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<VendorPerformance>>> {
    let rows = ReportRepository::new(state.pool())
        .vendor_order_counts()
        .await?
        .into_iter()
        .map(vendor_performance)
        .collect();
    Ok(Json(rows))
}

/// GET /api/reports/products
async fn products(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProductPerformance>>> {
    let rows = ReportRepository::new(state.pool())
        .product_sales()
        .await?
        .into_iter()
        .map(product_performance)
        .collect();
    Ok(Json(rows))
}

/// GET /api/reports/customers
#[instrument(skip(_admin, state))]
async fn customers(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<CustomerReport>> {
    let repo = ReportRepository::new(state.pool());
    let (totals, order_counts, top_cities) = tokio::try_join!(
        repo.customer_totals(),
        repo.orders_per_customer(),
        repo.top_cities(),
    )?;

    Ok(Json(CustomerReport {
        total_customers: totals.total_customers,
        new_customers: totals.new_customers,
        returning_customers: (totals.total_customers - totals.new_customers).max(0),
        average_lifetime_value: average(totals.lifetime_revenue, totals.total_customers),
        frequency: frequency_buckets(order_counts),
        top_cities,
    }))
}

/// GET /api/reports/summary
async fn summary(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<ReportSummary>> {
    Ok(Json(ReportRepository::new(state.pool()).summary().await?))
}

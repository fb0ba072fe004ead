//! HTTP routes for the admin API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health, /health/ready
//!
//! /api/admin/auth        register, login, logout, me (rate limited)
//! /api/admin             users, dashboard, customers, sellers, categories,
//!                        products, orders, reviews, finance, inventory,
//!                        warehouses, coupons, banners, flash-sales, gifts,
//!                        analytics
//! /api/notifications     hub, notifications, order alerts, system updates,
//!                        vendor requests, complaints, settings, activity logs
//! /api/support           overview, tickets, announcements, vendor messages,
//!                        email and SMS templates, help docs, training
//!                        resources, system status
//! /api/settings          overview, site, tax, payment, email, sms, security,
//!                        gdpr, backup settings, personalization,
//!                        customization, payment gateways, API keys, roles,
//!                        backups, message templates, greeting cards
//! /api/reports           revenue, vendors, products, customers, summary
//! ```

pub mod admin_users;
pub mod analytics;
pub mod auth;
pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod finance;
pub mod gifts;
pub mod inventory;
pub mod marketing;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod reports;
pub mod reviews;
pub mod sellers;
pub mod settings;
pub mod support;
pub mod warehouses;

use axum::{
    Json, Router,
    extract::State,
    http::{Request, Response, StatusCode},
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;
use tracing::Span;

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Routes under `/api/admin`, except auth.
fn admin_routes() -> Router<AppState> {
    Router::new()
        .merge(admin_users::router())
        .merge(dashboard::router())
        .merge(customers::router())
        .merge(sellers::router())
        .merge(categories::router())
        .merge(products::router())
        .merge(orders::router())
        .merge(reviews::router())
        .merge(finance::router())
        .merge(inventory::router())
        .merge(warehouses::router())
        .merge(marketing::router())
        .merge(gifts::router())
        .merge(analytics::router())
}

/// Assemble the full application with its middleware stack.
pub fn app(state: AppState, session_layer: SessionManagerLayer<PostgresStore>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest(
            "/api/admin/auth",
            auth::router().layer(auth_rate_limiter()),
        )
        .nest("/api/admin", admin_routes())
        .nest("/api/notifications", notifications::router())
        .nest("/api/support", support::router())
        .nest("/api/settings", settings::router())
        .nest("/api/reports", reports::router())
        .fallback(not_found)
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: std::time::Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry outermost for full request coverage
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness check. Does not touch the database.
async fn health() -> &'static str {
    "ok"
}

/// Readiness check: 503 when the database is unreachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "Route not found" })),
    )
}

//! Coupons, banners and flash sales.

use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get, patch},
};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::instrument;

use giftmart_core::{BannerId, CouponId, FlashSaleId};

use crate::{
    db::MarketingRepository,
    error::AppResult,
    extract::{ApiJson, ApiPath},
    middleware::{RequireAdminAuth, RequireWriteAccess},
    models::marketing::{
        Banner, BannerInput, Coupon, CouponInput, FlashSaleInput, FlashSaleView,
    },
    state::AppState,
};

/// Build the marketing router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/coupons", get(list_coupons).post(create_coupon))
        .route("/coupons/{id}", delete(delete_coupon))
        .route("/coupons/{id}/toggle", patch(toggle_coupon))
        .route("/banners", get(list_banners).post(create_banner))
        .route("/banners/{id}", delete(delete_banner))
        .route("/banners/{id}/toggle", patch(toggle_banner))
        .route("/flash-sales", get(list_flash_sales).post(create_flash_sale))
        .route("/flash-sales/{id}", delete(delete_flash_sale))
        .route("/flash-sales/{id}/toggle", patch(toggle_flash_sale))
}

fn toggled(noun: &str, is_active: bool) -> Json<Value> {
    let state = if is_active { "activated" } else { "deactivated" };
    Json(json!({
        "success": true,
        "message": format!("{noun} {state}"),
        "isActive": is_active,
    }))
}

fn deleted(noun: &str) -> Json<Value> {
    Json(json!({ "success": true, "message": format!("{noun} deleted") }))
}

// =============================================================================
// Coupons
// =============================================================================

/// GET /api/admin/coupons
async fn list_coupons(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Coupon>>> {
    Ok(Json(MarketingRepository::new(state.pool()).list_coupons().await?))
}

/// POST /api/admin/coupons
#[instrument(skip(_admin, state, body))]
async fn create_coupon(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CouponInput>,
) -> AppResult<Json<Value>> {
    let coupon = body.validate(Utc::now())?;
    let coupon = MarketingRepository::new(state.pool())
        .create_coupon(&coupon)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Coupon created",
        "coupon": coupon,
    })))
}

/// PATCH /api/admin/coupons/{id}/toggle
#[instrument(skip(_admin, state))]
async fn toggle_coupon(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CouponId>,
) -> AppResult<Json<Value>> {
    let is_active = MarketingRepository::new(state.pool()).toggle_coupon(id).await?;
    Ok(toggled("Coupon", is_active))
}

/// DELETE /api/admin/coupons/{id}
#[instrument(skip(_admin, state))]
async fn delete_coupon(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CouponId>,
) -> AppResult<Json<Value>> {
    MarketingRepository::new(state.pool()).delete_coupon(id).await?;
    Ok(deleted("Coupon"))
}

// =============================================================================
// Banners
// =============================================================================

/// GET /api/admin/banners
async fn list_banners(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Banner>>> {
    Ok(Json(MarketingRepository::new(state.pool()).list_banners().await?))
}

/// POST /api/admin/banners
#[instrument(skip(_admin, state, body))]
async fn create_banner(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<BannerInput>,
) -> AppResult<Json<Value>> {
    let banner = MarketingRepository::new(state.pool())
        .create_banner(&body.validate()?)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Banner created",
        "banner": banner,
    })))
}

/// PATCH /api/admin/banners/{id}/toggle
#[instrument(skip(_admin, state))]
async fn toggle_banner(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BannerId>,
) -> AppResult<Json<Value>> {
    let is_active = MarketingRepository::new(state.pool()).toggle_banner(id).await?;
    Ok(toggled("Banner", is_active))
}

/// DELETE /api/admin/banners/{id}
#[instrument(skip(_admin, state))]
async fn delete_banner(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BannerId>,
) -> AppResult<Json<Value>> {
    MarketingRepository::new(state.pool()).delete_banner(id).await?;
    Ok(deleted("Banner"))
}

// =============================================================================
// Flash sales
// =============================================================================

/// GET /api/admin/flash-sales
async fn list_flash_sales(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<FlashSaleView>>> {
    let now = Utc::now();
    let sales = MarketingRepository::new(state.pool())
        .list_flash_sales()
        .await?
        .into_iter()
        .map(|sale| FlashSaleView {
            phase: sale.phase(now),
            sale,
        })
        .collect();
    Ok(Json(sales))
}

/// POST /api/admin/flash-sales
#[instrument(skip(_admin, state, body))]
async fn create_flash_sale(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<FlashSaleInput>,
) -> AppResult<Json<Value>> {
    let sale = MarketingRepository::new(state.pool())
        .create_flash_sale(&body.validate()?)
        .await?;
    let view = FlashSaleView {
        phase: sale.phase(Utc::now()),
        sale,
    };
    Ok(Json(json!({
        "success": true,
        "message": "Flash sale created",
        "flashSale": view,
    })))
}

/// PATCH /api/admin/flash-sales/{id}/toggle
#[instrument(skip(_admin, state))]
async fn toggle_flash_sale(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<FlashSaleId>,
) -> AppResult<Json<Value>> {
    let is_active = MarketingRepository::new(state.pool())
        .toggle_flash_sale(id)
        .await?;
    Ok(toggled("Flash sale", is_active))
}

/// DELETE /api/admin/flash-sales/{id}
#[instrument(skip(_admin, state))]
async fn delete_flash_sale(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<FlashSaleId>,
) -> AppResult<Json<Value>> {
    MarketingRepository::new(state.pool())
        .delete_flash_sale(id)
        .await?;
    Ok(deleted("Flash sale"))
}

//! Seller approval, commission, ledger and shipping handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, patch},
};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::instrument;

use giftmart_core::SellerId;

use crate::{
    db::{ProductRepository, SellerRepository, shipping},
    error::{AppError, AppResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::{RequireAdminAuth, RequireWriteAccess},
    models::{
        Paged, Pagination,
        product::ProductListing,
        seller::{CommissionUpdate, Seller, SellerListQuery, SellerSummary},
        shipping::ShippingSettings,
        validation,
    },
    services::{
        activity,
        finance::{SellerLedger, effective_rate, hold_cutoff},
    },
    state::AppState,
};

/// Build the sellers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sellers", get(list))
        .route("/sellers/{id}", get(show))
        .route("/sellers/{id}/approval", patch(toggle_approval))
        .route("/sellers/{id}/commission", patch(set_commission))
        .route("/sellers/{id}/products", get(products))
        .route("/sellers/{id}/ledger", get(ledger))
        .route("/sellers/{id}/shipping", get(show_shipping).put(update_shipping))
}

/// GET /api/admin/sellers
#[instrument(skip(_admin, state))]
async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SellerListQuery>,
) -> AppResult<Json<Paged<SellerSummary>>> {
    let window = Pagination::new(query.page, query.limit);
    let (items, total) = SellerRepository::new(state.pool())
        .list(query.search.as_deref(), query.status, window)
        .await?;
    Ok(Json(Paged {
        items,
        pagination: window.info(total),
    }))
}

async fn find(state: &AppState, id: SellerId) -> AppResult<Seller> {
    SellerRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("seller {id}")))
}

/// GET /api/admin/sellers/{id}
#[instrument(skip(_admin, state))]
async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SellerId>,
) -> AppResult<Json<Seller>> {
    Ok(Json(find(&state, id).await?))
}

/// PATCH /api/admin/sellers/{id}/approval
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
async fn toggle_approval(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SellerId>,
) -> AppResult<Json<Value>> {
    let seller = SellerRepository::new(state.pool()).toggle_approval(id).await?;
    state.invalidate_dashboard_stats().await;

    let action = if seller.is_approved {
        "seller_approved"
    } else {
        "seller_unapproved"
    };
    activity::record(
        state.pool(),
        activity::admin_entry(
            &admin,
            action,
            "seller",
            id,
            json!({ "storeName": seller.store_name }),
        ),
    )
    .await;
    tracing::info!(seller_id = %id, approved = seller.is_approved, "Seller approval changed");

    Ok(Json(json!({
        "success": true,
        "message": if seller.is_approved { "Seller approved" } else { "Seller approval revoked" },
        "seller": seller,
    })))
}

/// PATCH /api/admin/sellers/{id}/commission
#[instrument(skip(admin, state, body), fields(admin_id = %admin.id))]
async fn set_commission(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SellerId>,
    ApiJson(body): ApiJson<CommissionUpdate>,
) -> AppResult<Json<Value>> {
    let rate = validation::rate("commissionRate", body.commission_rate)?;
    let seller = SellerRepository::new(state.pool())
        .set_commission(id, rate)
        .await?;

    activity::record(
        state.pool(),
        activity::admin_entry(
            &admin,
            "commission_updated",
            "seller",
            id,
            json!({ "commissionRate": rate.value() }),
        ),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "message": "Commission rate updated",
        "seller": seller,
    })))
}

/// GET /api/admin/sellers/{id}/products
#[instrument(skip(_admin, state))]
async fn products(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SellerId>,
) -> AppResult<Json<Vec<ProductListing>>> {
    find(&state, id).await?;
    let products = ProductRepository::new(state.pool()).by_seller(id).await?;
    Ok(Json(products))
}

/// GET /api/admin/sellers/{id}/ledger
#[instrument(skip(_admin, state))]
async fn ledger(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SellerId>,
) -> AppResult<Json<SellerLedger>> {
    let seller = find(&state, id).await?;
    let rules = state.marketplace();
    let rate = effective_rate(seller.commission_rate, rules.default_commission_rate);
    let totals = SellerRepository::new(state.pool())
        .ledger_totals(id, hold_cutoff(Utc::now(), rules.settlement_hold_days))
        .await?;
    Ok(Json(SellerLedger::compute(id, rate, &totals)))
}

/// GET /api/admin/sellers/{id}/shipping
///
/// A seller who never saved shipping settings reads the defaults.
#[instrument(skip(_admin, state))]
async fn show_shipping(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SellerId>,
) -> AppResult<Json<ShippingSettings>> {
    find(&state, id).await?;
    let settings = shipping::get_shipping(state.pool(), id)
        .await?
        .unwrap_or_default();
    Ok(Json(settings))
}

/// PUT /api/admin/sellers/{id}/shipping
#[instrument(skip(admin, state, body), fields(admin_id = %admin.id))]
async fn update_shipping(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SellerId>,
    ApiJson(body): ApiJson<ShippingSettings>,
) -> AppResult<Json<Value>> {
    let seller = find(&state, id).await?;
    let settings = body.validate()?;
    shipping::put_shipping(state.pool(), id, &settings, admin.id).await?;

    activity::record(
        state.pool(),
        activity::admin_entry(
            &admin,
            "shipping_updated",
            "seller",
            id,
            json!({ "storeName": seller.store_name }),
        ),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "message": "Shipping settings updated",
        "shipping": settings,
    })))
}

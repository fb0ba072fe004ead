//! Order list, detail and status handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, patch},
};
use serde_json::{Value, json};
use tracing::instrument;

use giftmart_core::{OrderAlertType, OrderId, OrderStatus, Priority};

use crate::{
    db::{NotificationRepository, OrderRepository, orders::OrderFilter},
    error::{AppError, AppResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::{RequireAdminAuth, RequireWriteAccess},
    models::{
        Paged, Pagination,
        order::{OrderDetail, OrderListQuery, OrderStatusUpdate, OrderSummary, order_reference},
    },
    services::activity,
    state::AppState,
};

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list))
        .route("/orders/{id}", get(show))
        .route("/orders/{id}/status", patch(update_status))
}

/// GET /api/admin/orders
#[instrument(skip(_admin, state))]
async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<OrderListQuery>,
) -> AppResult<Json<Paged<OrderSummary>>> {
    let window = Pagination::new(query.page, query.limit);
    let filter = OrderFilter {
        status: query.status,
        search: query.search.as_deref(),
        from: query.from,
        to: query.to,
    };
    let (items, total) = OrderRepository::new(state.pool())
        .list(&filter, window)
        .await?;
    Ok(Json(Paged {
        items,
        pagination: window.info(total),
    }))
}

/// GET /api/admin/orders/{id}
#[instrument(skip(_admin, state))]
async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
) -> AppResult<Json<OrderDetail>> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    let customer = repo.customer(id).await?;
    let items = repo.items(id).await?;

    Ok(Json(OrderDetail {
        order,
        customer,
        items,
    }))
}

/// Alert raised for orders moving into a status admins should notice.
fn alert_for(status: OrderStatus) -> Option<(OrderAlertType, Priority)> {
    match status {
        OrderStatus::Cancelled => Some((OrderAlertType::OrderCancelled, Priority::Medium)),
        OrderStatus::Returned => Some((OrderAlertType::OrderReturned, Priority::High)),
        _ => None,
    }
}

/// PATCH /api/admin/orders/{id}/status
#[instrument(skip(admin, state, body), fields(admin_id = %admin.id, next = %body.status))]
async fn update_status(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
    ApiJson(body): ApiJson<OrderStatusUpdate>,
) -> AppResult<Json<Value>> {
    let order = OrderRepository::new(state.pool())
        .transition(id, body.status)
        .await?
        .map_err(|current| {
            AppError::BadRequest(format!(
                "Cannot change order status from {current} to {}",
                body.status
            ))
        })?;
    state.invalidate_dashboard_stats().await;

    activity::record(
        state.pool(),
        activity::admin_entry(
            &admin,
            "order_status_updated",
            "order",
            id,
            json!({ "status": order.status }),
        ),
    )
    .await;

    if let Some((alert_type, priority)) = alert_for(order.status) {
        let message = format!("Order #{} is now {}", order_reference(id), order.status);
        if let Err(e) = NotificationRepository::new(state.pool())
            .create_order_alert(Some(id), alert_type, &message, priority)
            .await
        {
            tracing::warn!(error = %e, order_id = %id, "Failed to raise order alert");
        }
    }

    Ok(Json(json!({
        "success": true,
        "message": format!("Order status updated to {}", order.status),
        "order": order,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alerts_only_for_cancellations_and_returns() {
        assert_eq!(
            alert_for(OrderStatus::Returned),
            Some((OrderAlertType::OrderReturned, Priority::High))
        );
        assert!(alert_for(OrderStatus::Cancelled).is_some());
        assert!(alert_for(OrderStatus::Shipped).is_none());
    }
}

//! Notifications hub: notifications, order alerts, system updates, vendor
//! requests, customer complaints, activity logs and delivery settings.
//!
//! Mounted at `/api/notifications`.

use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get, patch},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use giftmart_core::{
    ComplaintId, NotificationId, OrderAlertId, Priority, SystemUpdateId, SystemUpdateStatus,
    SystemUpdateType, VendorRequestId,
};

use crate::{
    db::{
        ActivityLogRepository, ComplaintRepository, NotificationRepository,
        VendorRequestRepository, activity_log::ActivityFilter, complaints::NewComplaint,
        notifications::NewSystemUpdate, settings, vendor_requests::NewVendorRequest,
    },
    error::{AppError, AppResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::{RequireAdminAuth, RequireWriteAccess},
    models::{
        Paged, Pagination,
        notification::{
            ActivityLog, ActivityLogQuery, ActivityStats, ClearQuery, ComplaintInput,
            ComplaintQuery, ComplaintUpdate, CustomerComplaint, MarkAllReadQuery,
            NewActivityLog, Notification, NotificationHub, NotificationInput, NotificationQuery,
            NotificationSettings, OrderAlert, OrderAlertInput, OrderAlertQuery, SystemUpdate,
            SystemUpdateInput, SystemUpdateStatusChange, VendorRequest, VendorRequestInput,
            VendorRequestQuery, VendorRequestUpdate,
        },
        settings::SettingsDocument,
        validation::{optional, required},
    },
    services::activity,
    state::AppState,
};

/// Rows of each kind shown on the hub.
const HUB_RECENT: i64 = 10;
/// Rows returned by the unpaged lists.
const LIST_LIMIT: i64 = 50;
/// Activity older than this is cleared when no age is given.
const DEFAULT_ACTIVITY_RETENTION_DAYS: i32 = 90;

/// Build the notifications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(hub))
        .route("/notifications", get(list_notifications).post(create_notification))
        .route("/notifications/read-all", patch(mark_all_read))
        .route("/notifications/clear", delete(clear_notifications))
        .route("/notifications/{id}", delete(delete_notification))
        .route("/notifications/{id}/read", patch(mark_read))
        .route("/order-alerts", get(list_order_alerts).post(create_order_alert))
        .route("/order-alerts/{id}", delete(delete_order_alert))
        .route("/order-alerts/{id}/read", patch(mark_order_alert_read))
        .route("/system-updates", get(list_system_updates).post(create_system_update))
        .route("/system-updates/{id}", delete(delete_system_update))
        .route("/system-updates/{id}/status", patch(set_system_update_status))
        .route("/vendor-requests", get(list_vendor_requests).post(create_vendor_request))
        .route(
            "/vendor-requests/{id}",
            patch(update_vendor_request).delete(delete_vendor_request),
        )
        .route("/complaints", get(list_complaints).post(create_complaint))
        .route("/complaints/{id}", patch(update_complaint).delete(delete_complaint))
        .route("/settings", get(get_settings).put(update_settings))
        .route(
            "/activity-logs",
            get(list_activity).post(create_activity).delete(clear_activity),
        )
        .route("/activity-logs/stats", get(activity_stats))
}

/// Convert a day count from the query string to the width the database takes.
fn days(value: Option<i64>) -> AppResult<Option<i32>> {
    value
        .map(|days| {
            i32::try_from(days)
                .ok()
                .filter(|d| *d >= 0)
                .ok_or_else(|| AppError::BadRequest("olderThanDays is out of range".into()))
        })
        .transpose()
}

/// GET /api/notifications
#[instrument(skip(_admin, state))]
async fn hub(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<NotificationHub>> {
    let pool = state.pool();
    let notifications = NotificationRepository::new(pool);
    let vendor_requests = VendorRequestRepository::new(pool);
    let complaints = ComplaintRepository::new(pool);
    let activity_logs = ActivityLogRepository::new(pool);

    let (
        (recent_notifications, _),
        order_alerts,
        system_updates,
        vendor_requests,
        complaints,
        activity_logs,
        stats,
    ) = tokio::try_join!(
        notifications.list(None, None, Pagination::new(Some(1), Some(HUB_RECENT))),
        notifications.order_alerts(None, HUB_RECENT),
        notifications.system_updates(HUB_RECENT),
        vendor_requests.list(None, None, HUB_RECENT),
        complaints.list(None, HUB_RECENT),
        activity_logs.recent(HUB_RECENT),
        notifications.hub_stats(),
    )?;

    Ok(Json(NotificationHub {
        notifications: recent_notifications,
        order_alerts,
        system_updates,
        vendor_requests,
        complaints,
        activity_logs,
        stats,
    }))
}

// =============================================================================
// Notifications
// =============================================================================

/// GET /api/notifications/notifications
async fn list_notifications(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NotificationQuery>,
) -> AppResult<Json<Paged<Notification>>> {
    let window = Pagination::new(query.page, query.limit);
    let (items, total) = NotificationRepository::new(state.pool())
        .list(query.notification_type, query.is_read, window)
        .await?;
    Ok(Json(Paged {
        items,
        pagination: window.info(total),
    }))
}

/// POST /api/notifications/notifications
#[instrument(skip(_admin, state, body))]
async fn create_notification(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NotificationInput>,
) -> AppResult<Json<Value>> {
    let notification = NotificationRepository::new(state.pool())
        .create(&body.validate()?)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Notification created",
        "notification": notification,
    })))
}

/// PATCH /api/notifications/notifications/{id}/read
async fn mark_read(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<NotificationId>,
) -> AppResult<Json<Value>> {
    let notification = NotificationRepository::new(state.pool())
        .mark_read(id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Notification marked as read",
        "notification": notification,
    })))
}

/// PATCH /api/notifications/notifications/read-all
async fn mark_all_read(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MarkAllReadQuery>,
) -> AppResult<Json<Value>> {
    let modified = NotificationRepository::new(state.pool())
        .mark_all_read(query.notification_type)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("{modified} notifications marked as read"),
        "modifiedCount": modified,
    })))
}

/// DELETE /api/notifications/notifications/{id}
#[instrument(skip(_admin, state))]
async fn delete_notification(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<NotificationId>,
) -> AppResult<Json<Value>> {
    NotificationRepository::new(state.pool()).delete(id).await?;
    Ok(Json(json!({ "success": true, "message": "Notification deleted" })))
}

/// DELETE /api/notifications/notifications/clear
#[instrument(skip(_admin, state))]
async fn clear_notifications(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ClearQuery>,
) -> AppResult<Json<Value>> {
    let deleted = NotificationRepository::new(state.pool())
        .clear(query.notification_type, days(query.older_than_days)?)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("{deleted} notifications cleared"),
        "deletedCount": deleted,
    })))
}

// =============================================================================
// Order alerts
// =============================================================================

/// GET /api/notifications/order-alerts
async fn list_order_alerts(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<OrderAlertQuery>,
) -> AppResult<Json<Vec<OrderAlert>>> {
    let limit = query.limit.unwrap_or(LIST_LIMIT).clamp(1, LIST_LIMIT * 2);
    let alerts = NotificationRepository::new(state.pool())
        .order_alerts(query.is_read, limit)
        .await?;
    Ok(Json(alerts))
}

/// POST /api/notifications/order-alerts
#[instrument(skip(_admin, state, body))]
async fn create_order_alert(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<OrderAlertInput>,
) -> AppResult<Json<Value>> {
    let message = required("message", body.message.as_deref())?;
    let alert = NotificationRepository::new(state.pool())
        .create_order_alert(
            body.order_id,
            body.alert_type,
            &message,
            body.priority.unwrap_or(Priority::Medium),
        )
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Order alert created",
        "alert": alert,
    })))
}

/// PATCH /api/notifications/order-alerts/{id}/read
async fn mark_order_alert_read(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderAlertId>,
) -> AppResult<Json<Value>> {
    let alert = NotificationRepository::new(state.pool())
        .mark_order_alert_read(id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Order alert marked as read",
        "alert": alert,
    })))
}

/// DELETE /api/notifications/order-alerts/{id}
#[instrument(skip(_admin, state))]
async fn delete_order_alert(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderAlertId>,
) -> AppResult<Json<Value>> {
    NotificationRepository::new(state.pool()).delete_order_alert(id).await?;
    Ok(Json(json!({ "success": true, "message": "Order alert deleted" })))
}

// =============================================================================
// System updates
// =============================================================================

/// GET /api/notifications/system-updates
async fn list_system_updates(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<SystemUpdate>>> {
    let updates = NotificationRepository::new(state.pool())
        .system_updates(LIST_LIMIT)
        .await?;
    Ok(Json(updates))
}

/// POST /api/notifications/system-updates
#[instrument(skip(admin, state, body), fields(admin = %admin.email))]
async fn create_system_update(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SystemUpdateInput>,
) -> AppResult<Json<Value>> {
    let update = NewSystemUpdate {
        title: required("title", body.title.as_deref())?,
        description: required("description", body.description.as_deref())?,
        update_type: body.update_type.unwrap_or(SystemUpdateType::Feature),
        status: body.status.unwrap_or(SystemUpdateStatus::Scheduled),
        scheduled_at: body.scheduled_at,
    };
    let update = NotificationRepository::new(state.pool())
        .create_system_update(&update)
        .await?;

    tracing::info!(update_id = %update.id, "System update announced");
    Ok(Json(json!({
        "success": true,
        "message": "System update created",
        "update": update,
    })))
}

/// PATCH /api/notifications/system-updates/{id}/status
#[instrument(skip(_admin, state, body))]
async fn set_system_update_status(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SystemUpdateId>,
    ApiJson(body): ApiJson<SystemUpdateStatusChange>,
) -> AppResult<Json<Value>> {
    let update = NotificationRepository::new(state.pool())
        .set_system_update_status(id, body.status)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("System update marked {}", body.status),
        "update": update,
    })))
}

/// DELETE /api/notifications/system-updates/{id}
#[instrument(skip(_admin, state))]
async fn delete_system_update(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SystemUpdateId>,
) -> AppResult<Json<Value>> {
    NotificationRepository::new(state.pool())
        .delete_system_update(id)
        .await?;
    Ok(Json(json!({ "success": true, "message": "System update deleted" })))
}

// =============================================================================
// Vendor requests
// =============================================================================

/// GET /api/notifications/vendor-requests
async fn list_vendor_requests(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<VendorRequestQuery>,
) -> AppResult<Json<Vec<VendorRequest>>> {
    let requests = VendorRequestRepository::new(state.pool())
        .list(query.status, query.request_type, LIST_LIMIT)
        .await?;
    Ok(Json(requests))
}

/// POST /api/notifications/vendor-requests
#[instrument(skip(_admin, state, body))]
async fn create_vendor_request(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<VendorRequestInput>,
) -> AppResult<Json<Value>> {
    let request = NewVendorRequest {
        seller_id: body.seller_id,
        request_type: body.request_type,
        subject: required("subject", body.subject.as_deref())?,
        message: required("message", body.message.as_deref())?,
        priority: body.priority.unwrap_or(Priority::Medium),
    };
    let request = VendorRequestRepository::new(state.pool())
        .create(&request)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Vendor request created",
        "request": request,
    })))
}

/// PATCH /api/notifications/vendor-requests/{id}
#[instrument(skip(admin, state, body), fields(admin = %admin.email))]
async fn update_vendor_request(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<VendorRequestId>,
    ApiJson(body): ApiJson<VendorRequestUpdate>,
) -> AppResult<Json<Value>> {
    let notes = optional(body.admin_notes.as_deref());
    let request = VendorRequestRepository::new(state.pool())
        .update_status(id, body.status, notes.as_deref())
        .await?;

    activity::record(
        state.pool(),
        activity::admin_entry(
            &admin,
            &format!("vendor_request_{}", body.status),
            "vendor_request",
            id,
            json!({ "adminNotes": notes }),
        ),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "message": format!("Vendor request {}", body.status),
        "request": request,
    })))
}

/// DELETE /api/notifications/vendor-requests/{id}
#[instrument(skip(_admin, state))]
async fn delete_vendor_request(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<VendorRequestId>,
) -> AppResult<Json<Value>> {
    VendorRequestRepository::new(state.pool()).delete(id).await?;
    Ok(Json(json!({ "success": true, "message": "Vendor request deleted" })))
}

// =============================================================================
// Customer complaints
// =============================================================================

/// GET /api/notifications/complaints
async fn list_complaints(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ComplaintQuery>,
) -> AppResult<Json<Vec<CustomerComplaint>>> {
    let complaints = ComplaintRepository::new(state.pool())
        .list(query.status, LIST_LIMIT)
        .await?;
    Ok(Json(complaints))
}

/// POST /api/notifications/complaints
#[instrument(skip(_admin, state, body))]
async fn create_complaint(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ComplaintInput>,
) -> AppResult<Json<Value>> {
    let complaint = NewComplaint {
        customer_id: body.customer_id,
        order_id: body.order_id,
        complaint_type: body.complaint_type,
        subject: required("subject", body.subject.as_deref())?,
        description: required("description", body.description.as_deref())?,
        priority: body.priority.unwrap_or(Priority::Medium),
    };
    let complaint = ComplaintRepository::new(state.pool())
        .create(&complaint)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Complaint recorded",
        "complaint": complaint,
    })))
}

/// PATCH /api/notifications/complaints/{id}
#[instrument(skip(_admin, state, body))]
async fn update_complaint(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ComplaintId>,
    ApiJson(body): ApiJson<ComplaintUpdate>,
) -> AppResult<Json<Value>> {
    let update = body.validate()?;
    let complaint = ComplaintRepository::new(state.pool())
        .update_status(id, &update)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Complaint {}", update.status),
        "complaint": complaint,
    })))
}

/// DELETE /api/notifications/complaints/{id}
#[instrument(skip(_admin, state))]
async fn delete_complaint(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ComplaintId>,
) -> AppResult<Json<Value>> {
    ComplaintRepository::new(state.pool()).delete(id).await?;
    Ok(Json(json!({ "success": true, "message": "Complaint deleted" })))
}

// =============================================================================
// Settings
// =============================================================================

/// GET /api/notifications/settings
async fn get_settings(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<NotificationSettings>> {
    Ok(Json(settings::get_document(state.pool()).await?))
}

/// PUT /api/notifications/settings
#[instrument(skip(admin, state, body), fields(admin = %admin.email))]
async fn update_settings(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NotificationSettings>,
) -> AppResult<Json<Value>> {
    let document = body.validate()?;
    settings::put_document(state.pool(), &document, admin.id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Notification settings updated",
        "settings": document,
    })))
}

// =============================================================================
// Activity logs
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClearActivityQuery {
    older_than_days: Option<i64>,
}

/// GET /api/notifications/activity-logs
async fn list_activity(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ActivityLogQuery>,
) -> AppResult<Json<Paged<ActivityLog>>> {
    let window = Pagination::new(query.page, query.limit);
    let filter = ActivityFilter {
        user_role: query.user_role,
        action: query.action.as_deref(),
        entity_type: query.entity_type.as_deref(),
        status: query.status,
    };
    let (items, total) = ActivityLogRepository::new(state.pool())
        .list(&filter, window)
        .await?;
    Ok(Json(Paged {
        items,
        pagination: window.info(total),
    }))
}

/// POST /api/notifications/activity-logs
#[instrument(skip(_admin, state, body))]
async fn create_activity(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewActivityLog>,
) -> AppResult<Json<Value>> {
    let entry = NewActivityLog {
        user_name: required("userName", Some(&body.user_name))?,
        action: required("action", Some(&body.action))?,
        entity_type: required("entityType", Some(&body.entity_type))?,
        ..body
    };
    let log = ActivityLogRepository::new(state.pool())
        .create(&entry)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Activity logged",
        "log": log,
    })))
}

/// DELETE /api/notifications/activity-logs
#[instrument(skip(_admin, state))]
async fn clear_activity(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ClearActivityQuery>,
) -> AppResult<Json<Value>> {
    let older_than = days(query.older_than_days)?.unwrap_or(DEFAULT_ACTIVITY_RETENTION_DAYS);
    let deleted = ActivityLogRepository::new(state.pool())
        .clear_older_than(older_than)
        .await?;

    tracing::info!(deleted, older_than, "Cleared activity log");
    Ok(Json(json!({
        "success": true,
        "message": format!("Cleared {deleted} entries older than {older_than} days"),
        "deletedCount": deleted,
    })))
}

/// GET /api/notifications/activity-logs/stats
async fn activity_stats(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<ActivityStats>> {
    Ok(Json(ActivityLogRepository::new(state.pool()).stats().await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_range() {
        assert_eq!(days(None).ok(), Some(None));
        assert_eq!(days(Some(30)).ok(), Some(Some(30)));
        assert!(days(Some(-1)).is_err());
        assert!(days(Some(i64::from(i32::MAX) + 1)).is_err());
    }
}

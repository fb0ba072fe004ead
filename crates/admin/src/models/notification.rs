//! Notifications hub: admin notifications, order alerts, system updates,
//! vendor requests, customer complaints and the activity log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use giftmart_core::{
    ActivityLogId, ActivityStatus, ActorRole, ComplaintId, ComplaintStatus, ComplaintType,
    CustomerId, NotificationId, NotificationType, OrderAlertId, OrderAlertType, OrderId,
    Priority, SellerId, SystemUpdateId, SystemUpdateStatus, SystemUpdateType, VendorRequestId,
    VendorRequestStatus, VendorRequestType,
};

use super::validation::{ValidationError, clock_time, optional, required};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub priority: Priority,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub action_url: Option<String>,
    pub action_label: Option<String>,
    pub metadata: serde_json::Value,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    #[serde(rename = "type")]
    pub notification_type: Option<NotificationType>,
    pub is_read: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationInput {
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub notification_type: Option<NotificationType>,
    pub priority: Option<Priority>,
    pub action_url: Option<String>,
    pub action_label: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub priority: Priority,
    pub action_url: Option<String>,
    pub action_label: Option<String>,
    pub metadata: serde_json::Value,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NotificationInput {
    /// # Errors
    ///
    /// Returns `ValidationError` when title or message is missing.
    pub fn validate(self) -> Result<NewNotification, ValidationError> {
        Ok(NewNotification {
            title: required("title", self.title.as_deref())?,
            message: required("message", self.message.as_deref())?,
            notification_type: self.notification_type.unwrap_or(NotificationType::General),
            priority: self.priority.unwrap_or(Priority::Medium),
            action_url: optional(self.action_url.as_deref()),
            action_label: optional(self.action_label.as_deref()),
            metadata: self
                .metadata
                .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new())),
            expires_at: self.expires_at,
        })
    }
}

/// Query for `PATCH /notifications/read-all`.
#[derive(Debug, Default, Deserialize)]
pub struct MarkAllReadQuery {
    #[serde(rename = "type")]
    pub notification_type: Option<NotificationType>,
}

/// Query for clearing old entries.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearQuery {
    #[serde(rename = "type")]
    pub notification_type: Option<NotificationType>,
    pub older_than_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderAlert {
    pub id: OrderAlertId,
    pub order_id: Option<OrderId>,
    pub alert_type: OrderAlertType,
    pub message: String,
    pub priority: Priority,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAlertQuery {
    pub is_read: Option<bool>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAlertInput {
    pub order_id: Option<OrderId>,
    pub alert_type: OrderAlertType,
    pub message: Option<String>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SystemUpdate {
    pub id: SystemUpdateId,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub update_type: SystemUpdateType,
    pub status: SystemUpdateStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemUpdateInput {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub update_type: Option<SystemUpdateType>,
    pub status: Option<SystemUpdateStatus>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct SystemUpdateStatusChange {
    pub status: SystemUpdateStatus,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VendorRequest {
    pub id: VendorRequestId,
    pub seller_id: Option<SellerId>,
    pub store_name: Option<String>,
    #[serde(rename = "type")]
    pub request_type: VendorRequestType,
    pub subject: String,
    pub message: String,
    pub status: VendorRequestStatus,
    pub priority: Priority,
    pub admin_notes: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VendorRequestQuery {
    pub status: Option<VendorRequestStatus>,
    #[serde(rename = "type")]
    pub request_type: Option<VendorRequestType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorRequestInput {
    pub seller_id: Option<SellerId>,
    #[serde(rename = "type")]
    pub request_type: VendorRequestType,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorRequestUpdate {
    pub status: VendorRequestStatus,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CustomerComplaint {
    pub id: ComplaintId,
    pub customer_id: Option<CustomerId>,
    pub customer_name: Option<String>,
    pub order_id: Option<OrderId>,
    #[serde(rename = "type")]
    pub complaint_type: ComplaintType,
    pub subject: String,
    pub description: String,
    pub status: ComplaintStatus,
    pub priority: Priority,
    pub resolution: Option<String>,
    pub satisfaction_rating: Option<i16>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ComplaintQuery {
    pub status: Option<ComplaintStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintInput {
    pub customer_id: Option<CustomerId>,
    pub order_id: Option<OrderId>,
    #[serde(rename = "type")]
    pub complaint_type: ComplaintType,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintUpdate {
    pub status: ComplaintStatus,
    pub resolution: Option<String>,
    pub satisfaction_rating: Option<i16>,
}

impl ComplaintUpdate {
    /// # Errors
    ///
    /// Returns `ValidationError` for a rating outside `1..=5`.
    pub fn validate(self) -> Result<Self, ValidationError> {
        if self
            .satisfaction_rating
            .is_some_and(|rating| !(1..=5).contains(&rating))
        {
            return Err(ValidationError::new(
                "satisfactionRating must be between 1 and 5",
            ));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: ActivityLogId,
    pub user_role: ActorRole,
    pub user_id: Option<i32>,
    pub user_name: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub details: serde_json::Value,
    pub status: ActivityStatus,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogQuery {
    pub user_role: Option<ActorRole>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub status: Option<ActivityStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// A new activity log entry, from the API or recorded by the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivityLog {
    pub user_role: ActorRole,
    pub user_id: Option<i32>,
    pub user_name: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    #[serde(default = "empty_object")]
    pub details: serde_json::Value,
    #[serde(default = "default_activity_status")]
    pub status: ActivityStatus,
    pub ip_address: Option<String>,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

const fn default_activity_status() -> ActivityStatus {
    ActivityStatus::Success
}

/// Count for one action or entity type.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct NamedCount {
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    pub today: i64,
    pub this_week: i64,
    pub this_month: i64,
    pub top_actions: Vec<NamedCount>,
    pub top_entities: Vec<NamedCount>,
}

/// Counters shown on the notifications hub.
#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HubStats {
    pub unread_notifications: i64,
    pub unread_order_alerts: i64,
    pub pending_vendor_requests: i64,
    pub new_complaints: i64,
    pub activity_today: i64,
}

/// Everything the notifications hub shows at once.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationHub {
    pub notifications: Vec<Notification>,
    pub order_alerts: Vec<OrderAlert>,
    pub system_updates: Vec<SystemUpdate>,
    pub vendor_requests: Vec<VendorRequest>,
    pub complaints: Vec<CustomerComplaint>,
    pub activity_logs: Vec<ActivityLog>,
    pub stats: HubStats,
}

/// Delivery channels for admin notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub email: bool,
    pub push: bool,
    pub sms: bool,
    pub order_alerts: bool,
    pub vendor_requests: bool,
    pub complaints: bool,
    pub system_updates: bool,
    pub quiet_hours: QuietHours,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            sms: false,
            order_alerts: true,
            vendor_requests: true,
            complaints: true,
            system_updates: true,
            quiet_hours: QuietHours::default(),
        }
    }
}

/// `HH:MM` window during which push and SMS stay silent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuietHours {
    pub enabled: bool,
    pub start: String,
    pub end: String,
}

impl Default for QuietHours {
    fn default() -> Self {
        Self {
            enabled: false,
            start: "22:00".to_string(),
            end: "08:00".to_string(),
        }
    }
}

impl NotificationSettings {
    /// # Errors
    ///
    /// Returns `ValidationError` when a quiet-hours bound is not `HH:MM`.
    pub fn validate_quiet_hours(&self) -> Result<(), ValidationError> {
        clock_time("quietHours.start", &self.quiet_hours.start)?;
        clock_time("quietHours.end", &self.quiet_hours.end)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults_fill_missing_fields() {
        let settings: NotificationSettings =
            serde_json::from_value(serde_json::json!({ "sms": true })).unwrap();
        assert!(settings.sms);
        assert!(settings.email);
        assert_eq!(settings.quiet_hours.start, "22:00");
        assert_eq!(settings.quiet_hours.end, "08:00");
    }

    fn is_clock_time(value: &str) -> bool {
        clock_time("time", value).is_ok()
    }

    #[test]
    fn test_quiet_hours_format() {
        assert!(is_clock_time("00:00"));
        assert!(is_clock_time("23:59"));
        assert!(!is_clock_time("24:00"));
        assert!(!is_clock_time("7:30"));
        assert!(!is_clock_time("0730"));
    }

    #[test]
    fn test_notification_defaults() {
        let input: NotificationInput =
            serde_json::from_value(serde_json::json!({"title": "Stock", "message": "Low"}))
                .unwrap();
        let n = input.validate().unwrap();
        assert_eq!(n.notification_type, NotificationType::General);
        assert_eq!(n.priority, Priority::Medium);
        assert!(n.metadata.is_object());
    }

    #[test]
    fn test_complaint_rating_range() {
        let update = |rating| ComplaintUpdate {
            status: ComplaintStatus::Resolved,
            resolution: None,
            satisfaction_rating: Some(rating),
        };
        assert!(update(5).validate().is_ok());
        assert!(update(0).validate().is_err());
        assert!(update(6).validate().is_err());
    }
}

//! Records admin mutations in the activity log.

use std::fmt::Display;

use sqlx::PgPool;

use giftmart_core::{ActivityStatus, ActorRole};

use crate::db::ActivityLogRepository;
use crate::models::CurrentAdmin;
use crate::models::notification::NewActivityLog;

/// Build the log entry for an action taken by `admin`.
#[must_use]
pub fn admin_entry(
    admin: &CurrentAdmin,
    action: &str,
    entity_type: &str,
    entity_id: impl Display,
    details: serde_json::Value,
) -> NewActivityLog {
    NewActivityLog {
        user_role: ActorRole::Admin,
        user_id: Some(admin.id.as_i32()),
        user_name: admin.name.clone(),
        action: action.to_string(),
        entity_type: entity_type.to_string(),
        entity_id: Some(entity_id.to_string()),
        details,
        status: ActivityStatus::Success,
        ip_address: None,
    }
}

/// Write an activity entry. A failed write is logged and otherwise ignored:
/// the mutation it describes has already happened.
pub async fn record(pool: &PgPool, entry: NewActivityLog) {
    let action = entry.action.clone();
    if let Err(e) = ActivityLogRepository::new(pool).create(&entry).await {
        tracing::warn!(error = %e, action = %action, "Failed to record admin activity");
    }
}

#[cfg(test)]
mod tests {
    use giftmart_core::{AdminRole, AdminUserId, Email};

    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_admin_entry() {
        let admin = CurrentAdmin {
            id: AdminUserId::new(4),
            email: Email::parse("ops@giftmart.in").unwrap(),
            name: "Ops".into(),
            role: AdminRole::Admin,
        };
        let entry = admin_entry(
            &admin,
            "seller.approval",
            "seller",
            12,
            serde_json::json!({ "isApproved": true }),
        );
        assert_eq!(entry.user_role, ActorRole::Admin);
        assert_eq!(entry.user_id, Some(4));
        assert_eq!(entry.entity_id.as_deref(), Some("12"));
        assert_eq!(entry.status, ActivityStatus::Success);
    }
}

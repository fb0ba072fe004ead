//! Admin account domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use giftmart_core::{AdminUserId, Email};

pub use giftmart_core::AdminRole;

/// An admin account (domain type). The password hash never leaves the
/// repository layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: Email,
    pub name: String,
    pub role: AdminRole,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

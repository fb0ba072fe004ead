//! Database operations for the marketplace `PostgreSQL` database.
//!
//! # Schema: `market`
//!
//! - `admin_user`, `session` - Admin accounts and tower-sessions storage
//! - `customer`, `seller`, `category`, `product` - Accounts and catalog
//! - `customer_order`, `order_item`, `payout` - Orders and seller money movement
//! - `review`, `coupon`, `banner`, `flash_sale` - Moderation and marketing
//! - `warehouse`, `gift_option` - Fulfilment and add-ons
//! - `notification`, `order_alert`, `system_update`, `vendor_request`,
//!   `customer_complaint`, `activity_log` - Notifications hub
//! - `support_ticket`, `ticket_reply`, `announcement` - Support desk
//! - `vendor_message`, `vendor_message_reply`, `message_template`, `help_doc`,
//!   `training_resource`, `system_status` - Seller support content
//! - `setting` - JSONB documents keyed by name
//! - `payment_gateway_config`, `api_key`, `access_role`, `backup`,
//!   `greeting_card`, `seller_shipping` - Platform configuration
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p giftmart-cli -- migrate
//! ```

pub mod activity_log;
pub mod admin_users;
pub mod announcements;
pub mod api_keys;
pub mod backups;
pub mod categories;
pub mod complaints;
pub mod customers;
pub mod finance;
pub mod gateways;
pub mod gifts;
pub mod greeting_cards;
pub mod help_center;
pub mod marketing;
pub mod notifications;
pub mod orders;
pub mod payouts;
pub mod products;
pub mod reports;
pub mod reviews;
pub mod roles;
pub mod sellers;
pub mod settings;
pub mod shipping;
pub mod support;
pub mod system_status;
pub mod templates;
pub mod vendor_messages;
pub mod vendor_requests;
pub mod warehouses;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use activity_log::ActivityLogRepository;
pub use admin_users::AdminUserRepository;
pub use api_keys::ApiKeyRepository;
pub use categories::CategoryRepository;
pub use complaints::ComplaintRepository;
pub use customers::CustomerRepository;
pub use finance::FinanceRepository;
pub use marketing::MarketingRepository;
pub use notifications::NotificationRepository;
pub use orders::OrderRepository;
pub use payouts::PayoutRepository;
pub use products::ProductRepository;
pub use reports::ReportRepository;
pub use reviews::ReviewRepository;
pub use roles::RoleRepository;
pub use sellers::SellerRepository;
pub use support::TicketRepository;
pub use vendor_messages::VendorMessageRepository;
pub use vendor_requests::VendorRequestRepository;

/// Postgres SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-violation error to `Conflict(message)`, passing other
    /// errors through as `Database`.
    pub(crate) fn unique_or(err: sqlx::Error, message: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Self::Conflict(message.to_string())
            }
            _ => Self::Database(err),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Escape `%`, `_` and `\` so user search text matches literally in `ILIKE`.
#[must_use]
pub fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rose"), "%rose%");
        assert_eq!(like_pattern(" 50%_off "), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_unique_or_passes_through_other_errors() {
        let err = RepositoryError::unique_or(sqlx::Error::RowNotFound, "duplicate");
        assert!(matches!(err, RepositoryError::Database(sqlx::Error::RowNotFound)));
    }
}

//! Dashboard statistics and recent activity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_customers: i64,
    pub total_sellers: i64,
    pub total_products: i64,
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub active_sellers: i64,
    pub pending_sellers: i64,
    pub pending_products: i64,
    pub monthly_revenue: Vec<MonthlyRevenue>,
}

/// Revenue bucket labelled `YYYY-MM`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    pub month: String,
    pub revenue: Decimal,
    pub orders: i64,
}

/// What a recent activity entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Order,
    Seller,
}

/// One line in the dashboard activity feed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub kind: ActivityKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

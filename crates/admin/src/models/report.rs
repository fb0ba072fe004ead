//! Report and analytics shapes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use giftmart_core::{OrderId, OrderStatus, ProductId, SellerId};

/// Optional date window for reports.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRange {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Window for the CSV export.
#[derive(Debug, Default, Deserialize)]
pub struct ExportRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Revenue for one day, labelled `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DailyRevenue {
    pub day: String,
    pub revenue: Decimal,
    pub orders: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    pub total_revenue: Decimal,
    pub total_orders: i64,
    pub average_order_value: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub daily: Vec<DailyRevenue>,
    pub summary: RevenueSummary,
}

/// Raw per-seller order counts.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VendorOrderCounts {
    pub seller_id: SellerId,
    pub store_name: String,
    pub revenue: Decimal,
    pub total_orders: i64,
    pub delivered_orders: i64,
    pub returned_orders: i64,
    pub cancelled_orders: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorPerformance {
    pub seller_id: SellerId,
    pub store_name: String,
    pub revenue: Decimal,
    pub total_orders: i64,
    pub fulfillment_rate: Decimal,
    pub return_rate: Decimal,
}

/// Raw per-product sales.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductSales {
    pub product_id: ProductId,
    pub name: String,
    pub views: i32,
    pub purchases: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPerformance {
    pub product_id: ProductId,
    pub name: String,
    pub views: i32,
    pub purchases: i64,
    pub revenue: Decimal,
    pub conversion_rate: Decimal,
}

/// Customers grouped by number of orders placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyBuckets {
    pub one_time: i64,
    pub repeat: i64,
    pub frequent: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CityCount {
    pub city: String,
    pub customers: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerReport {
    pub total_customers: i64,
    pub new_customers: i64,
    pub returning_customers: i64,
    pub average_lifetime_value: Decimal,
    pub frequency: FrequencyBuckets,
    pub top_cities: Vec<CityCount>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub today_revenue: Decimal,
    pub today_orders: i64,
    pub total_revenue: Decimal,
    pub total_orders: i64,
    pub total_customers: i64,
    pub total_sellers: i64,
    pub total_products: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue: Decimal,
    pub units: i64,
}

/// Monthly revenue, status mix and best categories.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub monthly_revenue: Vec<super::dashboard::MonthlyRevenue>,
    pub status_breakdown: Vec<StatusCount>,
    pub top_categories: Vec<CategoryRevenue>,
}

/// One order line of the CSV export.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExportRow {
    pub order_id: OrderId,
    pub customer_name: String,
    pub created_at: DateTime<Utc>,
    pub payment_id: Option<String>,
    pub status: OrderStatus,
    pub total_amount: Decimal,
}

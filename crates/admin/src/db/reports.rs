//! Aggregate queries for the dashboard, reports and analytics.
//!
//! Day and month buckets are labelled with `to_char` in SQL, so nothing here
//! binds or decodes `DATE` values.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use giftmart_core::{OrderId, format_rupees};

use super::RepositoryError;
use crate::models::dashboard::{ActivityKind, DashboardStats, MonthlyRevenue, RecentActivity};
use crate::models::order::order_reference;
use crate::models::report::{
    CategoryRevenue, CityCount, DailyRevenue, ExportRow, ProductSales, ReportSummary,
    RevenueSummary, StatusCount, VendorOrderCounts,
};

/// Longest daily series returned by the revenue report.
pub const MAX_DAILY_ROWS: i64 = 30;

#[derive(Debug, sqlx::FromRow)]
struct DashboardCounts {
    total_customers: i64,
    total_sellers: i64,
    total_products: i64,
    total_orders: i64,
    total_revenue: Decimal,
    active_sellers: i64,
    pending_sellers: i64,
    pending_products: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerCounts {
    total_customers: i64,
    new_customers: i64,
    lifetime_revenue: Decimal,
}

/// Customer headline figures.
#[derive(Debug, Clone)]
pub struct CustomerTotals {
    pub total_customers: i64,
    pub new_customers: i64,
    pub lifetime_revenue: Decimal,
}

/// Repository for reporting queries.
pub struct ReportRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReportRepository<'a> {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Revenue (excluding cancelled orders) per month for the last `months`
    /// months, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn monthly_revenue(&self, months: i32) -> Result<Vec<MonthlyRevenue>, RepositoryError> {
        let rows = sqlx::query_as::<_, MonthlyRevenue>(
            r"SELECT to_char(date_trunc('month', created_at), 'YYYY-MM') AS month,
                     COALESCE(SUM(total_amount), 0) AS revenue,
                     COUNT(*) AS orders
              FROM market.customer_order
              WHERE status <> 'cancelled'
                AND created_at >= date_trunc('month', NOW()) - make_interval(months => $1 - 1)
              GROUP BY 1
              ORDER BY 1",
        )
        .bind(months)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Headline dashboard numbers plus six months of revenue.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, RepositoryError> {
        let counts = sqlx::query_as::<_, DashboardCounts>(
            r"SELECT
                (SELECT COUNT(*) FROM market.customer) AS total_customers,
                (SELECT COUNT(*) FROM market.seller) AS total_sellers,
                (SELECT COUNT(*) FROM market.product) AS total_products,
                (SELECT COUNT(*) FROM market.customer_order) AS total_orders,
                (SELECT COALESCE(SUM(total_amount), 0) FROM market.customer_order
                 WHERE status <> 'cancelled') AS total_revenue,
                (SELECT COUNT(*) FROM market.seller WHERE is_approved) AS active_sellers,
                (SELECT COUNT(*) FROM market.seller WHERE NOT is_approved) AS pending_sellers,
                (SELECT COUNT(*) FROM market.product WHERE status = 'pending') AS pending_products",
        )
        .fetch_one(self.pool)
        .await?;

        let monthly_revenue = self.monthly_revenue(6).await?;

        Ok(DashboardStats {
            total_customers: counts.total_customers,
            total_sellers: counts.total_sellers,
            total_products: counts.total_products,
            total_orders: counts.total_orders,
            total_revenue: counts.total_revenue,
            active_sellers: counts.active_sellers,
            pending_sellers: counts.pending_sellers,
            pending_products: counts.pending_products,
            monthly_revenue,
        })
    }

    /// Latest three orders and two seller sign-ups, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn recent_activity(&self) -> Result<Vec<RecentActivity>, RepositoryError> {
        let orders: Vec<(OrderId, Decimal, DateTime<Utc>)> = sqlx::query_as(
            r"SELECT id, total_amount, created_at FROM market.customer_order
              ORDER BY created_at DESC LIMIT 3",
        )
        .fetch_all(self.pool)
        .await?;

        let sellers: Vec<(String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT store_name, created_at FROM market.seller ORDER BY created_at DESC LIMIT 2",
        )
        .fetch_all(self.pool)
        .await?;

        let mut activity: Vec<RecentActivity> = orders
            .into_iter()
            .map(|(id, amount, created_at)| RecentActivity {
                kind: ActivityKind::Order,
                message: format!(
                    "New Order #{} of {}",
                    order_reference(id),
                    format_rupees(amount)
                ),
                created_at,
            })
            .chain(sellers.into_iter().map(|(store, created_at)| RecentActivity {
                kind: ActivityKind::Seller,
                message: format!("New seller {store} registered"),
                created_at,
            }))
            .collect();
        activity.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(activity)
    }

    /// Daily revenue in a window (default: the last 30 days), newest first,
    /// plus totals over the window.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn revenue(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<(Vec<DailyRevenue>, RevenueSummary), RepositoryError> {
        let end = end.unwrap_or_else(Utc::now);
        let start = start.unwrap_or(end - Duration::days(MAX_DAILY_ROWS));

        let daily = sqlx::query_as::<_, DailyRevenue>(
            r"SELECT to_char(date_trunc('day', created_at), 'YYYY-MM-DD') AS day,
                     COALESCE(SUM(total_amount), 0) AS revenue,
                     COUNT(*) AS orders
              FROM market.customer_order
              WHERE status <> 'cancelled' AND created_at >= $1 AND created_at <= $2
              GROUP BY 1
              ORDER BY 1 DESC
              LIMIT $3",
        )
        .bind(start)
        .bind(end)
        .bind(MAX_DAILY_ROWS)
        .fetch_all(self.pool)
        .await?;

        let (total_revenue, total_orders): (Decimal, i64) = sqlx::query_as(
            r"SELECT COALESCE(SUM(total_amount), 0), COUNT(*)
              FROM market.customer_order
              WHERE status <> 'cancelled' AND created_at >= $1 AND created_at <= $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(self.pool)
        .await?;

        Ok((
            daily,
            RevenueSummary {
                total_revenue,
                total_orders,
                average_order_value: crate::services::reports::average(
                    total_revenue,
                    total_orders,
                ),
            },
        ))
    }

    /// Order counts per seller for the ten highest-earning sellers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn vendor_order_counts(&self) -> Result<Vec<VendorOrderCounts>, RepositoryError> {
        let rows = sqlx::query_as::<_, VendorOrderCounts>(
            r"SELECT s.id AS seller_id, s.store_name,
                     COALESCE(SUM(oi.quantity * oi.unit_price)
                              FILTER (WHERE o.status <> 'cancelled'), 0) AS revenue,
                     COUNT(DISTINCT o.id) AS total_orders,
                     COUNT(DISTINCT o.id) FILTER (WHERE o.status = 'delivered') AS delivered_orders,
                     COUNT(DISTINCT o.id) FILTER (WHERE o.status = 'returned') AS returned_orders,
                     COUNT(DISTINCT o.id) FILTER (WHERE o.status = 'cancelled') AS cancelled_orders
              FROM market.seller s
              JOIN market.order_item oi ON oi.seller_id = s.id
              JOIN market.customer_order o ON o.id = oi.order_id
              GROUP BY s.id
              ORDER BY revenue DESC
              LIMIT 10",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Views, units sold and revenue for the twenty best-selling products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_sales(&self) -> Result<Vec<ProductSales>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductSales>(
            r"SELECT p.id AS product_id, p.name, p.view_count AS views,
                     COALESCE(SUM(oi.quantity) FILTER (WHERE o.status <> 'cancelled'), 0)::bigint
                         AS purchases,
                     COALESCE(SUM(oi.quantity * oi.unit_price)
                              FILTER (WHERE o.status <> 'cancelled'), 0) AS revenue
              FROM market.product p
              LEFT JOIN market.order_item oi ON oi.product_id = p.id
              LEFT JOIN market.customer_order o ON o.id = oi.order_id
              GROUP BY p.id
              ORDER BY revenue DESC, purchases DESC
              LIMIT 20",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Customer totals: everyone, sign-ups in the last 30 days and revenue
    /// from non-cancelled orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn customer_totals(&self) -> Result<CustomerTotals, RepositoryError> {
        let counts = sqlx::query_as::<_, CustomerCounts>(
            r"SELECT
                (SELECT COUNT(*) FROM market.customer) AS total_customers,
                (SELECT COUNT(*) FROM market.customer
                 WHERE created_at >= NOW() - INTERVAL '30 days') AS new_customers,
                (SELECT COALESCE(SUM(total_amount), 0) FROM market.customer_order
                 WHERE status <> 'cancelled') AS lifetime_revenue",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(CustomerTotals {
            total_customers: counts.total_customers,
            new_customers: counts.new_customers,
            lifetime_revenue: counts.lifetime_revenue,
        })
    }

    /// Number of orders placed by each customer who has ordered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn orders_per_customer(&self) -> Result<Vec<i64>, RepositoryError> {
        let counts = sqlx::query_scalar(
            "SELECT COUNT(*) FROM market.customer_order GROUP BY customer_id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(counts)
    }

    /// Ten cities with the most customers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_cities(&self) -> Result<Vec<CityCount>, RepositoryError> {
        let rows = sqlx::query_as::<_, CityCount>(
            r"SELECT city, COUNT(*) AS customers
              FROM market.customer
              WHERE city IS NOT NULL AND city <> ''
              GROUP BY city
              ORDER BY customers DESC, city
              LIMIT 10",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Today's and all-time figures.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary(&self) -> Result<ReportSummary, RepositoryError> {
        let summary = sqlx::query_as::<_, ReportSummary>(
            r"SELECT
                (SELECT COALESCE(SUM(total_amount), 0) FROM market.customer_order
                 WHERE status <> 'cancelled' AND created_at >= date_trunc('day', NOW()))
                    AS today_revenue,
                (SELECT COUNT(*) FROM market.customer_order
                 WHERE created_at >= date_trunc('day', NOW())) AS today_orders,
                (SELECT COALESCE(SUM(total_amount), 0) FROM market.customer_order
                 WHERE status <> 'cancelled') AS total_revenue,
                (SELECT COUNT(*) FROM market.customer_order) AS total_orders,
                (SELECT COUNT(*) FROM market.customer) AS total_customers,
                (SELECT COUNT(*) FROM market.seller) AS total_sellers,
                (SELECT COUNT(*) FROM market.product) AS total_products",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(summary)
    }

    /// Orders per status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn status_breakdown(&self) -> Result<Vec<StatusCount>, RepositoryError> {
        let rows = sqlx::query_as::<_, StatusCount>(
            r"SELECT status, COUNT(*) AS count
              FROM market.customer_order
              GROUP BY status
              ORDER BY count DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Categories by item revenue on non-cancelled orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_categories(&self, limit: i64) -> Result<Vec<CategoryRevenue>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRevenue>(
            r"SELECT COALESCE(c.name, 'Uncategorized') AS category,
                     SUM(oi.quantity * oi.unit_price) AS revenue,
                     SUM(oi.quantity)::bigint AS units
              FROM market.order_item oi
              JOIN market.customer_order o ON o.id = oi.order_id
              LEFT JOIN market.product p ON p.id = oi.product_id
              LEFT JOIN market.category c ON c.id = p.category_id
              WHERE o.status <> 'cancelled'
              GROUP BY 1
              ORDER BY revenue DESC
              LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Orders for the CSV export, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn export_rows(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<ExportRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, ExportRow>(
            r"SELECT o.id AS order_id, c.name AS customer_name, o.created_at, o.payment_id,
                     o.status, o.total_amount
              FROM market.customer_order o
              JOIN market.customer c ON c.id = o.customer_id
              WHERE ($1::timestamptz IS NULL OR o.created_at >= $1)
                AND ($2::timestamptz IS NULL OR o.created_at <= $2)
              ORDER BY o.created_at",
        )
        .bind(from)
        .bind(to)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}

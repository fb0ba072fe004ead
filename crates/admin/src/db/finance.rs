//! Read-only finance queries: transaction feed, settlements, commission,
//! refunds and totals.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use super::RepositoryError;
use crate::models::finance::{HeldOrder, OrderCredit, RefundCase, SellerGross};

/// Money totals that come straight from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FinanceTotals {
    pub delivered_revenue: Decimal,
    pub completed_payouts: Decimal,
    pub pending_payouts: Decimal,
    pub held_funds: Decimal,
}

/// Repository for finance reporting.
pub struct FinanceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FinanceRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Latest non-cancelled orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent_credits(&self, limit: i64) -> Result<Vec<OrderCredit>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderCredit>(
            r"SELECT o.id AS order_id, c.name AS customer_name, o.total_amount, o.created_at
              FROM market.customer_order o
              JOIN market.customer c ON c.id = o.customer_id
              WHERE o.status <> 'cancelled'
              ORDER BY o.created_at DESC
              LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Delivered orders still inside the hold window, soonest release first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn held_orders(
        &self,
        hold_cutoff: DateTime<Utc>,
        hold_days: i64,
    ) -> Result<Vec<HeldOrder>, RepositoryError> {
        let rows = sqlx::query_as::<_, HeldOrder>(
            r"SELECT o.id AS order_id, c.name AS customer_name, o.total_amount,
                     o.delivered_at,
                     o.delivered_at + make_interval(days => $2::int) AS release_at
              FROM market.customer_order o
              JOIN market.customer c ON c.id = o.customer_id
              WHERE o.status = 'delivered' AND o.delivered_at >= $1
              ORDER BY o.delivered_at",
        )
        .bind(hold_cutoff)
        .bind(hold_days)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Delivered item revenue per seller with the seller's own rate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delivered_gross_by_seller(&self) -> Result<Vec<SellerGross>, RepositoryError> {
        let rows = sqlx::query_as::<_, SellerGross>(
            r"SELECT s.id AS seller_id, s.store_name, s.commission_rate,
                     SUM(oi.quantity * oi.unit_price) AS gross
              FROM market.order_item oi
              JOIN market.customer_order o ON o.id = oi.order_id
              JOIN market.seller s ON s.id = oi.seller_id
              WHERE o.status = 'delivered'
              GROUP BY s.id
              ORDER BY gross DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Cancelled, returned and refunded orders, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn refund_cases(&self) -> Result<Vec<RefundCase>, RepositoryError> {
        let rows = sqlx::query_as::<_, RefundCase>(
            r"SELECT o.id AS order_id, c.name AS customer_name, o.total_amount, o.status,
                     o.payment_id, o.updated_at
              FROM market.customer_order o
              JOIN market.customer c ON c.id = o.customer_id
              WHERE o.status IN ('cancelled', 'returned', 'refunded')
              ORDER BY o.updated_at DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn totals(&self, hold_cutoff: DateTime<Utc>) -> Result<FinanceTotals, RepositoryError> {
        let totals = sqlx::query_as::<_, FinanceTotals>(
            r"SELECT
                COALESCE((SELECT SUM(total_amount) FROM market.customer_order
                          WHERE status = 'delivered'), 0) AS delivered_revenue,
                COALESCE((SELECT SUM(amount) FROM market.payout
                          WHERE status = 'completed'), 0) AS completed_payouts,
                COALESCE((SELECT SUM(amount) FROM market.payout
                          WHERE status = 'pending'), 0) AS pending_payouts,
                COALESCE((SELECT SUM(total_amount) FROM market.customer_order
                          WHERE status = 'delivered' AND delivered_at >= $1), 0) AS held_funds",
        )
        .bind(hold_cutoff)
        .fetch_one(self.pool)
        .await?;
        Ok(totals)
    }
}

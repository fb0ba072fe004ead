//! Seller repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use giftmart_core::{Rate, SellerId};

use super::{RepositoryError, like_pattern};
use crate::models::finance::LedgerTotals;
use crate::models::seller::{Seller, SellerFilter, SellerSummary};
use crate::models::Pagination;

const SELLER_COLUMNS: &str = "s.id, s.name, s.email, s.store_name, s.phone, s.is_approved, \
                              s.commission_rate, s.created_at, s.updated_at";

/// Repository for seller accounts.
pub struct SellerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SellerRepository<'a> {
    /// Create a new seller repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List sellers with product and sales totals, newest first.
    ///
    /// Sales count item revenue on orders that were not cancelled.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        search: Option<&str>,
        filter: Option<SellerFilter>,
        window: Pagination,
    ) -> Result<(Vec<SellerSummary>, i64), RepositoryError> {
        let pattern = search.filter(|s| !s.trim().is_empty()).map(like_pattern);
        let approved = filter.map(SellerFilter::is_approved);

        let sql = format!(
            "SELECT {SELLER_COLUMNS},
                    (SELECT COUNT(*) FROM market.product p WHERE p.seller_id = s.id) AS total_products,
                    COALESCE(SUM(oi.quantity * oi.unit_price)
                             FILTER (WHERE o.status <> 'cancelled'), 0) AS total_sales,
                    COUNT(DISTINCT o.id) FILTER (WHERE o.status <> 'cancelled') AS total_orders
             FROM market.seller s
             LEFT JOIN market.order_item oi ON oi.seller_id = s.id
             LEFT JOIN market.customer_order o ON o.id = oi.order_id
             WHERE ($1::text IS NULL OR s.name ILIKE $1 OR s.store_name ILIKE $1 OR s.email ILIKE $1)
               AND ($2::boolean IS NULL OR s.is_approved = $2)
             GROUP BY s.id
             ORDER BY s.created_at DESC
             LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query_as::<_, SellerSummary>(&sql)
            .bind(pattern.as_deref())
            .bind(approved)
            .bind(window.limit)
            .bind(window.offset())
            .fetch_all(self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            r"SELECT COUNT(*) FROM market.seller s
              WHERE ($1::text IS NULL OR s.name ILIKE $1 OR s.store_name ILIKE $1 OR s.email ILIKE $1)
                AND ($2::boolean IS NULL OR s.is_approved = $2)",
        )
        .bind(pattern.as_deref())
        .bind(approved)
        .fetch_one(self.pool)
        .await?;

        Ok((rows, total))
    }

    /// Get a seller by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(seller_id = %id))]
    pub async fn get(&self, id: SellerId) -> Result<Option<Seller>, RepositoryError> {
        let row = sqlx::query_as::<_, Seller>(&format!(
            "SELECT {SELLER_COLUMNS} FROM market.seller s WHERE s.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Flip the approval flag and return the updated seller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the seller does not exist.
    #[instrument(skip(self), fields(seller_id = %id))]
    pub async fn toggle_approval(&self, id: SellerId) -> Result<Seller, RepositoryError> {
        sqlx::query_as::<_, Seller>(&format!(
            "UPDATE market.seller s SET is_approved = NOT is_approved, updated_at = NOW()
             WHERE s.id = $1
             RETURNING {SELLER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Set the seller's own commission rate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the seller does not exist.
    #[instrument(skip(self), fields(seller_id = %id))]
    pub async fn set_commission(&self, id: SellerId, rate: Rate) -> Result<Seller, RepositoryError> {
        sqlx::query_as::<_, Seller>(&format!(
            "UPDATE market.seller s SET commission_rate = $2, updated_at = NOW()
             WHERE s.id = $1
             RETURNING {SELLER_COLUMNS}"
        ))
        .bind(id)
        .bind(rate.value())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Read the amounts behind a seller's ledger.
    ///
    /// Items count once their order is delivered. Items delivered at or
    /// after `hold_cutoff` are still held.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ledger_totals(
        &self,
        id: SellerId,
        hold_cutoff: DateTime<Utc>,
    ) -> Result<LedgerTotals, RepositoryError> {
        ledger_totals(self.pool, id, hold_cutoff).await
    }
}

/// Ledger amounts for one seller. Takes any executor so payout creation can
/// read them inside its transaction.
pub(crate) async fn ledger_totals<'e, E>(
    executor: E,
    id: SellerId,
    hold_cutoff: DateTime<Utc>,
) -> Result<LedgerTotals, RepositoryError>
where
    E: sqlx::PgExecutor<'e>,
{
    let totals = sqlx::query_as::<_, LedgerTotals>(
        r"SELECT
            COALESCE((SELECT SUM(oi.quantity * oi.unit_price)
                      FROM market.order_item oi
                      JOIN market.customer_order o ON o.id = oi.order_id
                      WHERE oi.seller_id = $1 AND o.status = 'delivered'
                        AND o.delivered_at < $2), 0) AS released_gross,
            COALESCE((SELECT SUM(oi.quantity * oi.unit_price)
                      FROM market.order_item oi
                      JOIN market.customer_order o ON o.id = oi.order_id
                      WHERE oi.seller_id = $1 AND o.status = 'delivered'
                        AND o.delivered_at >= $2), 0) AS held_gross,
            COALESCE((SELECT SUM(amount) FROM market.payout
                      WHERE seller_id = $1 AND status = 'completed'), 0) AS paid,
            COALESCE((SELECT SUM(amount) FROM market.payout
                      WHERE seller_id = $1 AND status = 'pending'), 0) AS pending",
    )
    .bind(id)
    .bind(hold_cutoff)
    .fetch_one(executor)
    .await?;

    Ok(totals)
}

/// Seller's own commission rate, locking the seller row.
pub(crate) async fn lock_seller_rate(
    conn: &mut sqlx::PgConnection,
    id: SellerId,
) -> Result<Option<Decimal>, RepositoryError> {
    let row: Option<(Option<Decimal>,)> =
        sqlx::query_as("SELECT commission_rate FROM market.seller WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;
    row.map(|(rate,)| rate).ok_or(RepositoryError::NotFound)
}

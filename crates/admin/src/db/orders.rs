//! Order repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use giftmart_core::{OrderId, OrderStatus};

use super::{RepositoryError, like_pattern};
use crate::models::order::{Order, OrderItem, OrderSummary};
use crate::models::{Customer, Pagination};

const ORDER_COLUMNS: &str = "o.id, o.customer_id, o.total_amount, o.status, o.payment_id, \
                             o.shipping_city, o.delivered_at, o.created_at, o.updated_at";

/// Filters for the order list.
#[derive(Debug, Default)]
pub struct OrderFilter<'q> {
    pub status: Option<OrderStatus>,
    pub search: Option<&'q str>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Repository for customer orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders, newest first. Search matches the customer's name or
    /// email, or the order number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self, filter), fields(status = ?filter.status))]
    pub async fn list(
        &self,
        filter: &OrderFilter<'_>,
        window: Pagination,
    ) -> Result<(Vec<OrderSummary>, i64), RepositoryError> {
        let pattern = filter
            .search
            .filter(|s| !s.trim().is_empty())
            .map(like_pattern);
        let where_clause = r"
            WHERE ($1::market.order_status IS NULL OR o.status = $1)
              AND ($2::text IS NULL OR c.name ILIKE $2 OR c.email ILIKE $2 OR o.id::text ILIKE $2)
              AND ($3::timestamptz IS NULL OR o.created_at >= $3)
              AND ($4::timestamptz IS NULL OR o.created_at <= $4)";

        let sql = format!(
            "SELECT {ORDER_COLUMNS}, c.name AS customer_name,
                    (SELECT COUNT(*) FROM market.order_item oi WHERE oi.order_id = o.id) AS item_count
             FROM market.customer_order o
             JOIN market.customer c ON c.id = o.customer_id
             {where_clause}
             ORDER BY o.created_at DESC
             LIMIT $5 OFFSET $6"
        );
        let rows = sqlx::query_as::<_, OrderSummary>(&sql)
            .bind(filter.status)
            .bind(pattern.as_deref())
            .bind(filter.from)
            .bind(filter.to)
            .bind(window.limit)
            .bind(window.offset())
            .fetch_all(self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM market.customer_order o
             JOIN market.customer c ON c.id = o.customer_id
             {where_clause}"
        ))
        .bind(filter.status)
        .bind(pattern.as_deref())
        .bind(filter.from)
        .bind(filter.to)
        .fetch_one(self.pool)
        .await?;

        Ok((rows, total))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM market.customer_order o WHERE o.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// The customer who placed an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn customer(&self, id: OrderId) -> Result<Customer, RepositoryError> {
        sqlx::query_as::<_, Customer>(
            r"SELECT c.id, c.name, c.email, c.phone, c.city, c.is_blocked, c.created_at
              FROM market.customer c
              JOIN market.customer_order o ON o.customer_id = c.id
              WHERE o.id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Line items of an order with their sellers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItem>(
            r"SELECT oi.id, oi.order_id, oi.product_id, oi.seller_id, s.store_name,
                     oi.product_name, oi.quantity, oi.unit_price,
                     oi.quantity * oi.unit_price AS line_total
              FROM market.order_item oi
              JOIN market.seller s ON s.id = oi.seller_id
              WHERE oi.order_id = $1
              ORDER BY oi.id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Move an order to `next` if the lifecycle allows it.
    ///
    /// The row is locked while the transition is checked, so two admins
    /// cannot both move the same order. Moving to `delivered` stamps
    /// `delivered_at`.
    ///
    /// Returns `Ok(Err(current))` when the transition is not allowed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    #[instrument(skip(self), fields(order_id = %id, next = %next))]
    pub async fn transition(
        &self,
        id: OrderId,
        next: OrderStatus,
    ) -> Result<Result<Order, OrderStatus>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(OrderStatus, Option<String>)> = sqlx::query_as(
            "SELECT status, payment_id FROM market.customer_order WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let (status, payment_id) = current.ok_or(RepositoryError::NotFound)?;

        if !status.can_transition_to(next, payment_id.is_some()) {
            return Ok(Err(status));
        }

        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE market.customer_order o
             SET status = $2,
                 delivered_at = CASE WHEN $2 = 'delivered'::market.order_status THEN NOW()
                                     ELSE delivered_at END,
                 updated_at = NOW()
             WHERE o.id = $1
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(next)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Ok(order))
    }
}

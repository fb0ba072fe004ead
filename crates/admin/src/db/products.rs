//! Product repository: moderation, featuring and stock.

use sqlx::PgPool;
use tracing::instrument;

use giftmart_core::{ProductId, ProductStatus, SellerId, StockAvailability};

use super::{RepositoryError, like_pattern};
use crate::models::Pagination;
use crate::models::inventory::{BulkStockEntry, InventoryItem};
use crate::models::product::{ModerationDecision, Product, ProductFilter, ProductListing};

const PRODUCT_COLUMNS: &str = "p.id, p.seller_id, p.category_id, p.name, p.description, p.price, \
                               p.stock, p.availability, p.is_available, p.status, \
                               p.rejection_reason, p.is_featured, p.view_count, p.created_at, \
                               p.updated_at";

const LISTING_FROM: &str = r"
    FROM market.product p
    JOIN market.seller s ON s.id = p.seller_id
    LEFT JOIN market.category c ON c.id = p.category_id
";

/// `WHERE` clause shared by list and count. `$1` is the search pattern,
/// `$2` the status, `$3` featured-only, `$4` out-of-stock-only.
const LISTING_FILTER: &str = r"
    WHERE ($1::text IS NULL OR p.name ILIKE $1 OR s.store_name ILIKE $1)
      AND ($2::market.product_status IS NULL OR p.status = $2)
      AND (NOT $3 OR p.is_featured)
      AND (NOT $4 OR p.stock <= 0)
";

/// Repository for products.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products for moderation, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: Option<ProductFilter>,
        search: Option<&str>,
        window: Pagination,
    ) -> Result<(Vec<ProductListing>, i64), RepositoryError> {
        let pattern = search.filter(|s| !s.trim().is_empty()).map(like_pattern);
        let status = matches!(filter, Some(ProductFilter::Pending)).then_some(ProductStatus::Pending);
        let featured = matches!(filter, Some(ProductFilter::Featured));
        let out_of_stock = matches!(filter, Some(ProductFilter::OutOfStock));

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS}, s.store_name, c.name AS category_name
             {LISTING_FROM} {LISTING_FILTER}
             ORDER BY p.created_at DESC
             LIMIT $5 OFFSET $6"
        );
        let rows = sqlx::query_as::<_, ProductListing>(&sql)
            .bind(pattern.as_deref())
            .bind(status)
            .bind(featured)
            .bind(out_of_stock)
            .bind(window.limit)
            .bind(window.offset())
            .fetch_all(self.pool)
            .await?;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) {LISTING_FROM} {LISTING_FILTER}"))
                .bind(pattern.as_deref())
                .bind(status)
                .bind(featured)
                .bind(out_of_stock)
                .fetch_one(self.pool)
                .await?;

        Ok((rows, total))
    }

    /// Products of one seller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn by_seller(&self, seller_id: SellerId) -> Result<Vec<ProductListing>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductListing>(&format!(
            "SELECT {PRODUCT_COLUMNS}, s.store_name, c.name AS category_name
             {LISTING_FROM}
             WHERE p.seller_id = $1
             ORDER BY p.created_at DESC"
        ))
        .bind(seller_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM market.product p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Approve or reject a product. Rejected products lose their featured
    /// flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self, decision), fields(product_id = %id, status = %decision.status))]
    pub async fn moderate(
        &self,
        id: ProductId,
        decision: &ModerationDecision,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "UPDATE market.product p
             SET status = $2,
                 rejection_reason = $3,
                 is_featured = CASE WHEN $2 = 'rejected'::market.product_status THEN FALSE ELSE is_featured END,
                 updated_at = NOW()
             WHERE p.id = $1
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(decision.status)
        .bind(decision.rejection_reason.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Set the featured flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn set_featured(&self, id: ProductId, featured: bool) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "UPDATE market.product p SET is_featured = $2, updated_at = NOW()
             WHERE p.id = $1
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(featured)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM market.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Stock rows, lowest stock first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn inventory(&self, search: Option<&str>) -> Result<Vec<InventoryItem>, RepositoryError> {
        let pattern = search.filter(|s| !s.trim().is_empty()).map(like_pattern);
        let rows = sqlx::query_as::<_, InventoryItem>(
            r"SELECT p.id AS product_id, p.name, s.store_name, p.price, p.stock,
                     p.availability, p.is_available
              FROM market.product p
              JOIN market.seller s ON s.id = p.seller_id
              WHERE ($1::text IS NULL OR p.name ILIKE $1 OR s.store_name ILIKE $1)
              ORDER BY p.stock ASC, p.name",
        )
        .bind(pattern.as_deref())
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Set one product's stock and derived availability.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn set_stock(&self, id: ProductId, stock: i32) -> Result<InventoryItem, RepositoryError> {
        let availability = StockAvailability::classify(stock);
        sqlx::query_as::<_, InventoryItem>(
            r"UPDATE market.product p
              SET stock = $2, availability = $3, is_available = $4, updated_at = NOW()
              FROM market.seller s
              WHERE p.id = $1 AND s.id = p.seller_id
              RETURNING p.id AS product_id, p.name, s.store_name, p.price, p.stock,
                        p.availability, p.is_available",
        )
        .bind(id)
        .bind(stock)
        .bind(availability)
        .bind(availability.is_available())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Apply several stock updates atomically. Returns how many products
    /// were modified; unknown product IDs are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any update fails; nothing is
    /// applied in that case.
    #[instrument(skip(self, updates), fields(count = updates.len()))]
    pub async fn bulk_set_stock(&self, updates: &[BulkStockEntry]) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut modified = 0;

        for update in updates {
            let availability = StockAvailability::classify(update.stock);
            let result = sqlx::query(
                r"UPDATE market.product
                  SET stock = $2, availability = $3, is_available = $4, updated_at = NOW()
                  WHERE id = $1",
            )
            .bind(update.product_id)
            .bind(update.stock)
            .bind(availability)
            .bind(availability.is_available())
            .execute(&mut *tx)
            .await?;
            modified += result.rows_affected();
        }

        tx.commit().await?;
        Ok(modified)
    }
}

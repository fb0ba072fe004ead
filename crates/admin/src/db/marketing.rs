//! Coupons, banners and flash sales.

use sqlx::PgPool;
use tracing::instrument;

use giftmart_core::{BannerId, CouponId, FlashSaleId};

use super::RepositoryError;
use crate::models::marketing::{
    Banner, Coupon, FlashSale, NewBanner, NewCoupon, NewFlashSale,
};

const COUPON_COLUMNS: &str =
    "id, code, discount_type, value, min_order_amount, expiry_date, is_active, created_at";
const BANNER_COLUMNS: &str = "id, title, image_url, link, is_active, created_at";
const FLASH_SALE_COLUMNS: &str =
    "id, title, product_id, discount_percent, starts_at, ends_at, is_active, created_at";

/// Tables with an `is_active` flag managed here.
#[derive(Debug, Clone, Copy)]
enum Campaign {
    Coupon,
    Banner,
    FlashSale,
}

impl Campaign {
    const fn table(self) -> &'static str {
        match self {
            Self::Coupon => "market.coupon",
            Self::Banner => "market.banner",
            Self::FlashSale => "market.flash_sale",
        }
    }
}

/// Repository for marketing campaigns.
pub struct MarketingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MarketingRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    async fn toggle(&self, campaign: Campaign, id: i32) -> Result<bool, RepositoryError> {
        sqlx::query_scalar(&format!(
            "UPDATE {} SET is_active = NOT is_active WHERE id = $1 RETURNING is_active",
            campaign.table()
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, campaign: Campaign, id: i32) -> Result<(), RepositoryError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", campaign.table()))
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_coupons(&self) -> Result<Vec<Coupon>, RepositoryError> {
        let rows = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM market.coupon ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code already exists.
    #[instrument(skip(self, coupon), fields(code = %coupon.code))]
    pub async fn create_coupon(&self, coupon: &NewCoupon) -> Result<Coupon, RepositoryError> {
        sqlx::query_as::<_, Coupon>(&format!(
            "INSERT INTO market.coupon (code, discount_type, value, min_order_amount, expiry_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COUPON_COLUMNS}"
        ))
        .bind(&coupon.code)
        .bind(coupon.discount_type)
        .bind(coupon.value)
        .bind(coupon.min_order_amount)
        .bind(coupon.expiry_date)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_or(e, "coupon code already exists"))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the coupon does not exist.
    pub async fn toggle_coupon(&self, id: CouponId) -> Result<bool, RepositoryError> {
        self.toggle(Campaign::Coupon, id.as_i32()).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the coupon does not exist.
    pub async fn delete_coupon(&self, id: CouponId) -> Result<(), RepositoryError> {
        self.delete(Campaign::Coupon, id.as_i32()).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_banners(&self) -> Result<Vec<Banner>, RepositoryError> {
        let rows = sqlx::query_as::<_, Banner>(&format!(
            "SELECT {BANNER_COLUMNS} FROM market.banner ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_banner(&self, banner: &NewBanner) -> Result<Banner, RepositoryError> {
        let row = sqlx::query_as::<_, Banner>(&format!(
            "INSERT INTO market.banner (title, image_url, link)
             VALUES ($1, $2, $3)
             RETURNING {BANNER_COLUMNS}"
        ))
        .bind(&banner.title)
        .bind(&banner.image_url)
        .bind(banner.link.as_deref())
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the banner does not exist.
    pub async fn toggle_banner(&self, id: BannerId) -> Result<bool, RepositoryError> {
        self.toggle(Campaign::Banner, id.as_i32()).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the banner does not exist.
    pub async fn delete_banner(&self, id: BannerId) -> Result<(), RepositoryError> {
        self.delete(Campaign::Banner, id.as_i32()).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_flash_sales(&self) -> Result<Vec<FlashSale>, RepositoryError> {
        let rows = sqlx::query_as::<_, FlashSale>(&format!(
            "SELECT {FLASH_SALE_COLUMNS} FROM market.flash_sale ORDER BY starts_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails, including an
    /// unknown product ID.
    pub async fn create_flash_sale(&self, sale: &NewFlashSale) -> Result<FlashSale, RepositoryError> {
        let row = sqlx::query_as::<_, FlashSale>(&format!(
            "INSERT INTO market.flash_sale (title, product_id, discount_percent, starts_at, ends_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {FLASH_SALE_COLUMNS}"
        ))
        .bind(&sale.title)
        .bind(sale.product_id)
        .bind(sale.discount_percent)
        .bind(sale.starts_at)
        .bind(sale.ends_at)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the sale does not exist.
    pub async fn toggle_flash_sale(&self, id: FlashSaleId) -> Result<bool, RepositoryError> {
        self.toggle(Campaign::FlashSale, id.as_i32()).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the sale does not exist.
    pub async fn delete_flash_sale(&self, id: FlashSaleId) -> Result<(), RepositoryError> {
        self.delete(Campaign::FlashSale, id.as_i32()).await
    }
}

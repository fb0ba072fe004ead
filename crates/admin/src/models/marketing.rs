//! Coupons, banners and flash sales.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use giftmart_core::{BannerId, CouponId, DiscountType, FlashSaleId, ProductId};

use super::validation::{ValidationError, non_negative, optional, positive, required};

/// Largest discount a flash sale may give.
pub const MAX_FLASH_SALE_DISCOUNT: i32 = 90;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    pub discount_type: DiscountType,
    pub value: Decimal,
    pub min_order_amount: Decimal,
    pub expiry_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponInput {
    pub code: Option<String>,
    pub discount_type: DiscountType,
    pub value: Decimal,
    pub min_order_amount: Option<Decimal>,
    pub expiry_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCoupon {
    pub code: String,
    pub discount_type: DiscountType,
    pub value: Decimal,
    pub min_order_amount: Decimal,
    pub expiry_date: DateTime<Utc>,
}

impl CouponInput {
    /// Normalize the code to upper case and check the discount value.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a blank code, a value outside the range
    /// for its discount type, a negative minimum, or a past expiry.
    pub fn validate(self, now: DateTime<Utc>) -> Result<NewCoupon, ValidationError> {
        let code = required("code", self.code.as_deref())?.to_uppercase();
        if code.chars().any(char::is_whitespace) {
            return Err(ValidationError::new("code cannot contain spaces"));
        }
        let value = positive("value", self.value)?;
        if self.discount_type == DiscountType::Percentage && value > Decimal::ONE_HUNDRED {
            return Err(ValidationError::new(
                "percentage discount cannot exceed 100",
            ));
        }
        let min_order_amount =
            non_negative("minOrderAmount", self.min_order_amount.unwrap_or_default())?;
        if self.expiry_date <= now {
            return Err(ValidationError::new("expiryDate must be in the future"));
        }

        Ok(NewCoupon {
            code,
            discount_type: self.discount_type,
            value,
            min_order_amount,
            expiry_date: self.expiry_date,
        })
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub id: BannerId,
    pub title: String,
    pub image_url: String,
    pub link: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerInput {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBanner {
    pub title: String,
    pub image_url: String,
    pub link: Option<String>,
}

impl BannerInput {
    /// # Errors
    ///
    /// Returns `ValidationError` when title or image URL is missing.
    pub fn validate(self) -> Result<NewBanner, ValidationError> {
        Ok(NewBanner {
            title: required("title", self.title.as_deref())?,
            image_url: required("imageUrl", self.image_url.as_deref())?,
            link: optional(self.link.as_deref()),
        })
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FlashSale {
    pub id: FlashSaleId,
    pub title: String,
    pub product_id: Option<ProductId>,
    pub discount_percent: i32,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Where a flash sale is relative to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashSalePhase {
    Scheduled,
    Live,
    Ended,
}

impl FlashSale {
    #[must_use]
    pub fn phase(&self, now: DateTime<Utc>) -> FlashSalePhase {
        if now < self.starts_at {
            FlashSalePhase::Scheduled
        } else if now < self.ends_at {
            FlashSalePhase::Live
        } else {
            FlashSalePhase::Ended
        }
    }
}

/// Flash sale with its derived phase.
#[derive(Debug, Clone, Serialize)]
pub struct FlashSaleView {
    #[serde(flatten)]
    pub sale: FlashSale,
    pub phase: FlashSalePhase,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashSaleInput {
    pub title: Option<String>,
    pub product_id: Option<ProductId>,
    pub discount_percent: i32,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFlashSale {
    pub title: String,
    pub product_id: Option<ProductId>,
    pub discount_percent: i32,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl FlashSaleInput {
    /// # Errors
    ///
    /// Returns `ValidationError` for a blank title, a discount outside
    /// `1..=90`, or an end that is not after the start.
    pub fn validate(self) -> Result<NewFlashSale, ValidationError> {
        let title = required("title", self.title.as_deref())?;
        if !(1..=MAX_FLASH_SALE_DISCOUNT).contains(&self.discount_percent) {
            return Err(ValidationError(format!(
                "discountPercent must be between 1 and {MAX_FLASH_SALE_DISCOUNT}"
            )));
        }
        if self.ends_at <= self.starts_at {
            return Err(ValidationError::new("endsAt must be after startsAt"));
        }
        Ok(NewFlashSale {
            title,
            product_id: self.product_id,
            discount_percent: self.discount_percent,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn coupon(discount_type: DiscountType, value: i64, days: i64) -> CouponInput {
        CouponInput {
            code: Some(" diwali20 ".to_string()),
            discount_type,
            value: Decimal::from(value),
            min_order_amount: None,
            expiry_date: Utc::now() + Duration::days(days),
        }
    }

    #[test]
    fn test_coupon_code_is_upper_cased() {
        let c = coupon(DiscountType::Percentage, 20, 5)
            .validate(Utc::now())
            .unwrap();
        assert_eq!(c.code, "DIWALI20");
        assert_eq!(c.min_order_amount, Decimal::ZERO);
    }

    #[test]
    fn test_coupon_value_rules() {
        let now = Utc::now();
        assert!(coupon(DiscountType::Percentage, 101, 5).validate(now).is_err());
        assert!(coupon(DiscountType::Fixed, 500, 5).validate(now).is_ok());
        assert!(coupon(DiscountType::Fixed, 0, 5).validate(now).is_err());
        assert!(coupon(DiscountType::Fixed, 10, -1).validate(now).is_err());
    }

    #[test]
    fn test_flash_sale_phase() {
        let now = Utc::now();
        let sale = FlashSale {
            id: FlashSaleId::new(1),
            title: "Rakhi rush".into(),
            product_id: None,
            discount_percent: 30,
            starts_at: now - Duration::hours(1),
            ends_at: now + Duration::hours(1),
            is_active: true,
            created_at: now,
        };
        assert_eq!(sale.phase(now), FlashSalePhase::Live);
        assert_eq!(sale.phase(now - Duration::hours(2)), FlashSalePhase::Scheduled);
        assert_eq!(sale.phase(now + Duration::hours(1)), FlashSalePhase::Ended);
    }

    #[test]
    fn test_flash_sale_validation() {
        let now = Utc::now();
        let input = |pct, end_offset| FlashSaleInput {
            title: Some("Holi".into()),
            product_id: None,
            discount_percent: pct,
            starts_at: now,
            ends_at: now + Duration::hours(end_offset),
        };
        assert!(input(30, 4).validate().is_ok());
        assert!(input(91, 4).validate().is_err());
        assert!(input(0, 4).validate().is_err());
        assert!(input(30, 0).validate().is_err());
    }
}

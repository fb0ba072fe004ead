//! Products and moderation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use giftmart_core::{
    CategoryId, ProductId, ProductStatus, SellerId, StockAvailability,
};

use super::validation::{ValidationError, optional};

/// A product listed by a seller.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub seller_id: SellerId,
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub availability: StockAvailability,
    pub is_available: bool,
    pub status: ProductStatus,
    pub rejection_reason: Option<String>,
    pub is_featured: bool,
    pub view_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product with the names admins see in lists.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub product: Product,
    pub store_name: String,
    pub category_name: Option<String>,
}

/// Named product list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductFilter {
    Pending,
    Featured,
    OutOfStock,
}

/// Query string for the product list.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    #[serde(rename = "type")]
    pub filter: Option<ProductFilter>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Body of `PATCH /products/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct ProductStatusUpdate {
    pub status: ProductStatus,
    pub reason: Option<String>,
}

/// A validated moderation decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationDecision {
    pub status: ProductStatus,
    pub rejection_reason: Option<String>,
}

impl ProductStatusUpdate {
    /// Only `approved` and `rejected` are decisions; the reason is kept only
    /// for rejections.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` when the status is `pending`.
    pub fn validate(self) -> Result<ModerationDecision, ValidationError> {
        match self.status {
            ProductStatus::Approved => Ok(ModerationDecision {
                status: ProductStatus::Approved,
                rejection_reason: None,
            }),
            ProductStatus::Rejected => Ok(ModerationDecision {
                status: ProductStatus::Rejected,
                rejection_reason: optional(self.reason.as_deref()),
            }),
            ProductStatus::Pending => Err(ValidationError::new(
                "status must be approved or rejected",
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_filter_query_names() {
        let q: ProductListQuery =
            serde_json::from_value(serde_json::json!({ "type": "out-of-stock" })).unwrap();
        assert_eq!(q.filter, Some(ProductFilter::OutOfStock));
    }

    #[test]
    fn test_moderation_decision() {
        let approve = ProductStatusUpdate {
            status: ProductStatus::Approved,
            reason: Some("looks fine".into()),
        };
        assert_eq!(approve.validate().unwrap().rejection_reason, None);

        let reject = ProductStatusUpdate {
            status: ProductStatus::Rejected,
            reason: Some(" blurry photos ".into()),
        };
        assert_eq!(
            reject.validate().unwrap().rejection_reason.as_deref(),
            Some("blurry photos")
        );

        let pending = ProductStatusUpdate {
            status: ProductStatus::Pending,
            reason: None,
        };
        assert!(pending.validate().is_err());
    }
}

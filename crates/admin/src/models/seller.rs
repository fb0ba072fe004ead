//! Seller accounts, approval and commission.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use giftmart_core::{Email, SellerId};

/// A marketplace seller.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    pub id: SellerId,
    pub name: String,
    pub email: Email,
    pub store_name: String,
    pub phone: Option<String>,
    pub is_approved: bool,
    /// `None` means the marketplace default applies.
    pub commission_rate: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Seller with catalog and sales totals.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SellerSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub seller: Seller,
    pub total_products: i64,
    pub total_sales: Decimal,
    pub total_orders: i64,
}

/// Approval filter for the seller list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SellerFilter {
    Approved,
    Pending,
}

impl SellerFilter {
    /// Value of `is_approved` this filter selects.
    #[must_use]
    pub const fn is_approved(self) -> bool {
        matches!(self, Self::Approved)
    }
}

/// Query string for the seller list.
#[derive(Debug, Default, Deserialize)]
pub struct SellerListQuery {
    pub search: Option<String>,
    pub status: Option<SellerFilter>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Body of `PATCH /sellers/{id}/commission`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionUpdate {
    pub commission_rate: Decimal,
}

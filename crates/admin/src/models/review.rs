//! Product reviews and their moderation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use giftmart_core::{CustomerId, ProductId, ReviewId, ReviewStatus};

use super::pagination::PageInfo;

/// A customer review.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub product_name: String,
    pub customer_id: Option<CustomerId>,
    pub user_name: String,
    pub rating: i16,
    pub title: String,
    pub comment: String,
    pub seller_response: Option<String>,
    pub is_hidden: bool,
    pub status: ReviewStatus,
    pub report_reason: Option<String>,
    pub likes: i32,
    pub dislikes: i32,
    pub created_at: DateTime<Utc>,
}

/// Query string for the review list.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewListQuery {
    pub search: Option<String>,
    pub status: Option<ReviewStatus>,
    pub rating: Option<i16>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Aggregate over the filtered reviews.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_reviews: i64,
    /// Rounded to one decimal place.
    pub avg_rating: Decimal,
}

/// Review list response.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewPage {
    pub reviews: Vec<Review>,
    pub stats: ReviewStats,
    pub pagination: PageInfo,
}

/// Body of `PATCH /reviews/{id}/status`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStatusUpdate {
    pub status: ReviewStatus,
    pub report_reason: Option<String>,
}

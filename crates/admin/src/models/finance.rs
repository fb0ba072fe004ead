//! Payouts, settlements, commission and the transaction feed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use giftmart_core::{AdminUserId, OrderId, OrderStatus, PayoutId, PayoutStatus, SellerId};

/// A payout to a seller.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub id: PayoutId,
    pub seller_id: SellerId,
    pub store_name: String,
    pub amount: Decimal,
    pub status: PayoutStatus,
    pub transaction_id: Option<String>,
    pub note: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<AdminUserId>,
}

/// Pending payouts and recent history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutOverview {
    pub pending: Vec<Payout>,
    pub processed: Vec<Payout>,
}

/// Body of `POST /finance/payouts`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRequest {
    pub seller_id: SellerId,
    pub amount: Decimal,
    pub note: Option<String>,
}

/// Body of `PATCH /finance/payouts/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutDecision {
    pub status: PayoutStatus,
    pub transaction_id: Option<String>,
    pub note: Option<String>,
}

/// Direction of money in the transaction feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Credit,
    Debit,
}

/// An order (credit) or a completed payout (debit).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub kind: TransactionKind,
    pub reference: String,
    pub description: String,
    pub amount: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Query for the transaction feed.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    pub limit: Option<i64>,
}

/// A delivered order still inside the hold window.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HeldOrder {
    pub order_id: OrderId,
    pub customer_name: String,
    pub total_amount: Decimal,
    pub delivered_at: DateTime<Utc>,
    pub release_at: DateTime<Utc>,
}

/// Settlement view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlements {
    pub hold_days: i64,
    pub orders: Vec<HeldOrder>,
    pub total_held: Decimal,
}

/// Delivered gross per seller, the input to commission maths.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SellerGross {
    pub seller_id: SellerId,
    pub store_name: String,
    pub commission_rate: Option<Decimal>,
    pub gross: Decimal,
}

/// Commission owed by one seller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionLine {
    pub seller_id: SellerId,
    pub store_name: String,
    pub gross: Decimal,
    pub rate: Decimal,
    pub commission: Decimal,
    pub net: Decimal,
}

/// Commission report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionReport {
    pub sellers: Vec<CommissionLine>,
    pub total_gross: Decimal,
    pub total_commission: Decimal,
    pub total_net: Decimal,
}

/// A cancelled, returned or refunded order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RefundCase {
    pub order_id: OrderId,
    pub customer_name: String,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Marketplace-wide money totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceStats {
    pub delivered_revenue: Decimal,
    pub total_commission: Decimal,
    pub completed_payouts: Decimal,
    pub pending_payouts: Decimal,
    pub held_funds: Decimal,
}

/// Raw per-seller amounts read from the database for one ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct LedgerTotals {
    /// Delivered item revenue released from hold.
    pub released_gross: Decimal,
    /// Delivered item revenue still inside the hold window.
    pub held_gross: Decimal,
    pub paid: Decimal,
    pub pending: Decimal,
}

/// A non-cancelled order as a credit in the transaction feed.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderCredit {
    pub order_id: OrderId,
    pub customer_name: String,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

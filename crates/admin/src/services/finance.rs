//! Seller settlement maths.
//!
//! Delivered revenue is held for a configurable number of days after
//! delivery. Once released, the marketplace keeps its commission and the
//! rest can be paid out.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use giftmart_core::{Rate, SellerId};

use crate::models::finance::{
    CommissionLine, CommissionReport, LedgerTotals, OrderCredit, Payout, SellerGross, Transaction,
    TransactionKind,
};
use crate::models::order::order_reference;

/// Commission rate for a seller: their own, else the marketplace default.
#[must_use]
pub fn effective_rate(seller_rate: Option<Decimal>, default: Rate) -> Rate {
    seller_rate
        .and_then(|rate| Rate::new(rate).ok())
        .unwrap_or(default)
}

/// When funds for an order delivered at `delivered_at` are released.
#[must_use]
pub fn release_at(delivered_at: DateTime<Utc>, hold_days: i64) -> DateTime<Utc> {
    delivered_at + Duration::days(hold_days)
}

/// Orders delivered before this instant are out of the hold window.
#[must_use]
pub fn hold_cutoff(now: DateTime<Utc>, hold_days: i64) -> DateTime<Utc> {
    now - Duration::days(hold_days)
}

/// Where a seller's money stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerLedger {
    pub seller_id: SellerId,
    pub commission_rate: Decimal,
    /// Delivered item revenue released from hold.
    pub gross: Decimal,
    pub commission: Decimal,
    /// `gross - commission`.
    pub earned: Decimal,
    pub paid: Decimal,
    pub pending: Decimal,
    /// `earned - paid - pending`, never below zero.
    pub available: Decimal,
    /// Net of delivered items still inside the hold window.
    pub held: Decimal,
}

impl SellerLedger {
    #[must_use]
    pub fn compute(seller_id: SellerId, rate: Rate, totals: &LedgerTotals) -> Self {
        let commission = rate.of(totals.released_gross);
        let earned = totals.released_gross - commission;
        let available = (earned - totals.paid - totals.pending).max(Decimal::ZERO);
        let held = totals.held_gross - rate.of(totals.held_gross);

        Self {
            seller_id,
            commission_rate: rate.value(),
            gross: totals.released_gross,
            commission,
            earned,
            paid: totals.paid,
            pending: totals.pending,
            available,
            held,
        }
    }

    /// Whether a new payout of `amount` fits in the available balance.
    #[must_use]
    pub fn covers(&self, amount: Decimal) -> bool {
        amount > Decimal::ZERO && amount <= self.available
    }
}

/// Build the commission report from delivered gross per seller.
#[must_use]
pub fn commission_report(rows: Vec<SellerGross>, default: Rate) -> CommissionReport {
    let sellers: Vec<CommissionLine> = rows
        .into_iter()
        .map(|row| {
            let rate = effective_rate(row.commission_rate, default);
            let commission = rate.of(row.gross);
            CommissionLine {
                seller_id: row.seller_id,
                store_name: row.store_name,
                gross: row.gross,
                rate: rate.value(),
                commission,
                net: row.gross - commission,
            }
        })
        .collect();

    let total_gross = sellers.iter().map(|s| s.gross).sum();
    let total_commission = sellers.iter().map(|s| s.commission).sum();
    let total_net = sellers.iter().map(|s| s.net).sum();

    CommissionReport {
        sellers,
        total_gross,
        total_commission,
        total_net,
    }
}

/// Merge order credits and payout debits, newest first, keeping `limit`.
#[must_use]
pub fn transaction_feed(
    credits: Vec<OrderCredit>,
    payouts: Vec<Payout>,
    limit: usize,
) -> Vec<Transaction> {
    let credits = credits.into_iter().map(|order| Transaction {
        kind: TransactionKind::Credit,
        reference: format!("ORD-{}", order_reference(order.order_id)),
        description: format!("Order from {}", order.customer_name),
        amount: order.total_amount,
        occurred_at: order.created_at,
    });
    let debits = payouts.into_iter().map(|payout| Transaction {
        kind: TransactionKind::Debit,
        reference: payout
            .transaction_id
            .unwrap_or_else(|| format!("PAY-{}", payout.id)),
        description: format!("Payout to {}", payout.store_name),
        amount: payout.amount,
        occurred_at: payout.processed_at.unwrap_or(payout.requested_at),
    });

    let mut feed: Vec<Transaction> = credits.chain(debits).collect();
    feed.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    feed.truncate(limit);
    feed
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn totals(released: &str, held: &str, paid: &str, pending: &str) -> LedgerTotals {
        LedgerTotals {
            released_gross: d(released),
            held_gross: d(held),
            paid: d(paid),
            pending: d(pending),
        }
    }

    #[test]
    fn test_ledger_uses_seller_rate() {
        let rate = effective_rate(Some(d("12.5")), Rate::DEFAULT_COMMISSION);
        let ledger = SellerLedger::compute(
            SellerId::new(3),
            rate,
            &totals("1000", "200", "300", "100"),
        );
        assert_eq!(ledger.commission, d("125.00"));
        assert_eq!(ledger.earned, d("875.00"));
        assert_eq!(ledger.available, d("475.00"));
        assert_eq!(ledger.held, d("175.00"));
        assert!(ledger.covers(d("475")));
        assert!(!ledger.covers(d("475.01")));
        assert!(!ledger.covers(Decimal::ZERO));
    }

    #[test]
    fn test_ledger_default_rate_and_floor() {
        let rate = effective_rate(None, Rate::DEFAULT_COMMISSION);
        let ledger = SellerLedger::compute(SellerId::new(1), rate, &totals("100", "0", "95", "0"));
        assert_eq!(ledger.commission_rate, Decimal::TEN);
        assert_eq!(ledger.earned, d("90.00"));
        assert_eq!(ledger.available, Decimal::ZERO);
    }

    #[test]
    fn test_commission_rounds_half_away_from_zero() {
        let rate = effective_rate(Some(d("10")), Rate::DEFAULT_COMMISSION);
        let ledger =
            SellerLedger::compute(SellerId::new(1), rate, &totals("0.05", "0", "0", "0"));
        assert_eq!(ledger.commission, d("0.01"));
    }

    #[test]
    fn test_commission_report_totals() {
        let report = commission_report(
            vec![
                SellerGross {
                    seller_id: SellerId::new(1),
                    store_name: "Petals".into(),
                    commission_rate: None,
                    gross: d("1000"),
                },
                SellerGross {
                    seller_id: SellerId::new(2),
                    store_name: "Crafts".into(),
                    commission_rate: Some(d("5")),
                    gross: d("400"),
                },
            ],
            Rate::DEFAULT_COMMISSION,
        );
        assert_eq!(report.total_gross, d("1400"));
        assert_eq!(report.total_commission, d("120.00"));
        assert_eq!(report.total_net, d("1280.00"));
        assert_eq!(report.sellers[1].rate, d("5"));
    }

    #[test]
    fn test_transaction_feed_orders_by_time() {
        use giftmart_core::{OrderId, PayoutId, PayoutStatus};

        let at = |s: &str| s.parse::<DateTime<Utc>>().unwrap();
        let credits = vec![
            OrderCredit {
                order_id: OrderId::new(10),
                customer_name: "Asha".into(),
                total_amount: d("500"),
                created_at: at("2026-10-03T00:00:00Z"),
            },
            OrderCredit {
                order_id: OrderId::new(9),
                customer_name: "Ravi".into(),
                total_amount: d("300"),
                created_at: at("2026-10-01T00:00:00Z"),
            },
        ];
        let payouts = vec![Payout {
            id: PayoutId::new(2),
            seller_id: SellerId::new(1),
            store_name: "Petals".into(),
            amount: d("200"),
            status: PayoutStatus::Completed,
            transaction_id: Some("UTR123".into()),
            note: None,
            requested_at: at("2026-10-01T12:00:00Z"),
            processed_at: Some(at("2026-10-02T00:00:00Z")),
            processed_by: None,
        }];

        let feed = transaction_feed(credits, payouts, 2);
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].kind, TransactionKind::Credit);
        assert_eq!(feed[0].reference, "ORD-10");
        assert_eq!(feed[1].kind, TransactionKind::Debit);
        assert_eq!(feed[1].reference, "UTR123");
    }

    #[test]
    fn test_hold_window() {
        let delivered = "2026-10-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(
            release_at(delivered, 7),
            "2026-10-08T10:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert_eq!(hold_cutoff(release_at(delivered, 7), 7), delivered);
    }
}

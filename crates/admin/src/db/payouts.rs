//! Payout repository.
//!
//! Requests and decisions run in transactions that lock the rows they
//! depend on: the seller row while the available balance is checked, the
//! payout row while it is processed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use giftmart_core::{AdminUserId, PayoutId, PayoutStatus, Rate, SellerId};

use super::RepositoryError;
use super::sellers::{ledger_totals, lock_seller_rate};
use crate::models::finance::Payout;
use crate::services::finance::{SellerLedger, effective_rate};

const PAYOUT_SELECT: &str = r"
    SELECT p.id, p.seller_id, s.store_name, p.amount, p.status, p.transaction_id, p.note,
           p.requested_at, p.processed_at, p.processed_by
    FROM market.payout p
    JOIN market.seller s ON s.id = p.seller_id
";

/// Why a payout request or decision was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayoutRefusal {
    /// Requested more than the seller can be paid.
    InsufficientBalance { available: Decimal },
    /// The payout was already completed or rejected.
    AlreadyProcessed(PayoutStatus),
    /// Not a status a pending payout can move to.
    InvalidTransition(PayoutStatus),
}

/// A validated decision on a pending payout.
#[derive(Debug, Clone)]
pub struct PayoutProcessing<'q> {
    pub status: PayoutStatus,
    pub transaction_id: Option<&'q str>,
    pub note: Option<&'q str>,
    pub processed_by: AdminUserId,
}

/// Repository for seller payouts.
pub struct PayoutRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PayoutRepository<'a> {
    /// Create a new payout repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Pending payouts, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn pending(&self) -> Result<Vec<Payout>, RepositoryError> {
        let rows = sqlx::query_as::<_, Payout>(&format!(
            "{PAYOUT_SELECT} WHERE p.status = 'pending' ORDER BY p.requested_at"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Most recently processed payouts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent_processed(&self, limit: i64) -> Result<Vec<Payout>, RepositoryError> {
        let rows = sqlx::query_as::<_, Payout>(&format!(
            "{PAYOUT_SELECT} WHERE p.status <> 'pending'
             ORDER BY p.processed_at DESC NULLS LAST
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Completed payouts, newest first, for the transaction feed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent_completed(&self, limit: i64) -> Result<Vec<Payout>, RepositoryError> {
        let rows = sqlx::query_as::<_, Payout>(&format!(
            "{PAYOUT_SELECT} WHERE p.status = 'completed'
             ORDER BY p.processed_at DESC NULLS LAST
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_in<'e, E>(executor: E, id: PayoutId) -> Result<Payout, RepositoryError>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as::<_, Payout>(&format!("{PAYOUT_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Record a payout request if it fits in the seller's available balance.
    ///
    /// The seller row stays locked until commit, so concurrent requests for
    /// the same seller are checked one after another.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the seller does not exist.
    #[instrument(skip(self, note), fields(seller_id = %seller_id, amount = %amount))]
    pub async fn request(
        &self,
        seller_id: SellerId,
        amount: Decimal,
        note: Option<&str>,
        default_rate: Rate,
        hold_cutoff: DateTime<Utc>,
    ) -> Result<Result<Payout, PayoutRefusal>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let seller_rate = lock_seller_rate(&mut tx, seller_id).await?;
        let totals = ledger_totals(&mut *tx, seller_id, hold_cutoff).await?;
        let ledger = SellerLedger::compute(
            seller_id,
            effective_rate(seller_rate, default_rate),
            &totals,
        );

        if !ledger.covers(amount) {
            return Ok(Err(PayoutRefusal::InsufficientBalance {
                available: ledger.available,
            }));
        }

        let id: PayoutId = sqlx::query_scalar(
            r"INSERT INTO market.payout (seller_id, amount, note)
              VALUES ($1, $2, $3)
              RETURNING id",
        )
        .bind(seller_id)
        .bind(amount)
        .bind(note)
        .fetch_one(&mut *tx)
        .await?;

        let payout = Self::get_in(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(payout_id = %payout.id, "Payout requested");
        Ok(Ok(payout))
    }

    /// Complete or reject a pending payout.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payout does not exist.
    #[instrument(skip(self, decision), fields(payout_id = %id, status = %decision.status))]
    pub async fn process(
        &self,
        id: PayoutId,
        decision: &PayoutProcessing<'_>,
    ) -> Result<Result<Payout, PayoutRefusal>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<PayoutStatus> =
            sqlx::query_scalar("SELECT status FROM market.payout WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let current = current.ok_or(RepositoryError::NotFound)?;

        if current != PayoutStatus::Pending {
            return Ok(Err(PayoutRefusal::AlreadyProcessed(current)));
        }
        if !current.can_transition_to(decision.status) {
            return Ok(Err(PayoutRefusal::InvalidTransition(decision.status)));
        }

        sqlx::query(
            r"UPDATE market.payout
              SET status = $2,
                  transaction_id = $3,
                  note = COALESCE($4, note),
                  processed_at = NOW(),
                  processed_by = $5
              WHERE id = $1",
        )
        .bind(id)
        .bind(decision.status)
        .bind(decision.transaction_id)
        .bind(decision.note)
        .bind(decision.processed_by)
        .execute(&mut *tx)
        .await?;

        let payout = Self::get_in(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(Ok(payout))
    }
}

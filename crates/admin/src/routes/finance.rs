//! Payouts, settlements, commission and money reports.
//!
//! Balance checks and payout decisions happen inside repository
//! transactions; these handlers validate input and shape responses.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, patch},
};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::instrument;

use giftmart_core::{PayoutId, PayoutStatus, format_rupees};

use crate::{
    db::{
        FinanceRepository, PayoutRepository,
        payouts::{PayoutProcessing, PayoutRefusal},
    },
    error::{AppError, AppResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::{RequireAdminAuth, RequireWriteAccess},
    models::{
        finance::{
            CommissionReport, FinanceStats, PayoutDecision, PayoutOverview, PayoutRequest,
            RefundCase, Settlements, Transaction, TransactionQuery,
        },
        pagination::{DEFAULT_LIMIT, MAX_LIMIT},
        validation,
    },
    services::{
        activity,
        finance::{commission_report, hold_cutoff, transaction_feed},
    },
    state::AppState,
};

/// Processed payouts shown alongside the pending queue.
const RECENT_PAYOUTS: i64 = 20;

/// Build the finance router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/finance/transactions", get(transactions))
        .route("/finance/payouts", get(payouts).post(request_payout))
        .route("/finance/payouts/{id}", patch(process_payout))
        .route("/finance/settlements", get(settlements))
        .route("/finance/commission", get(commission))
        .route("/finance/refunds", get(refunds))
        .route("/finance/stats", get(stats))
}

impl From<PayoutRefusal> for AppError {
    fn from(refusal: PayoutRefusal) -> Self {
        match refusal {
            PayoutRefusal::InsufficientBalance { available } => Self::BadRequest(format!(
                "Amount exceeds available balance of {}",
                format_rupees(available)
            )),
            PayoutRefusal::AlreadyProcessed(status) => {
                Self::Conflict(format!("Payout has already been {status}"))
            }
            PayoutRefusal::InvalidTransition(status) => Self::BadRequest(format!(
                "A pending payout cannot be marked {status}"
            )),
        }
    }
}

/// Orders as credits and completed payouts as debits, newest first.
///
/// GET /api/admin/finance/transactions
#[instrument(skip(_admin, state))]
async fn transactions(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TransactionQuery>,
) -> AppResult<Json<Vec<Transaction>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let credits = FinanceRepository::new(state.pool())
        .recent_credits(limit)
        .await?;
    let debits = PayoutRepository::new(state.pool())
        .recent_completed(limit)
        .await?;

    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    Ok(Json(transaction_feed(credits, debits, limit)))
}

/// GET /api/admin/finance/payouts
#[instrument(skip(_admin, state))]
async fn payouts(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<PayoutOverview>> {
    let repo = PayoutRepository::new(state.pool());
    Ok(Json(PayoutOverview {
        pending: repo.pending().await?,
        processed: repo.recent_processed(RECENT_PAYOUTS).await?,
    }))
}

/// Record a payout request against the seller's available balance.
///
/// POST /api/admin/finance/payouts
#[instrument(skip(admin, state, body), fields(admin_id = %admin.id, seller_id = %body.seller_id))]
async fn request_payout(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<PayoutRequest>,
) -> AppResult<Json<Value>> {
    let amount = validation::positive("amount", body.amount)?;
    let rules = state.marketplace();

    let payout = PayoutRepository::new(state.pool())
        .request(
            body.seller_id,
            amount,
            body.note.as_deref().map(str::trim).filter(|n| !n.is_empty()),
            rules.default_commission_rate,
            hold_cutoff(Utc::now(), rules.settlement_hold_days),
        )
        .await??;

    activity::record(
        state.pool(),
        activity::admin_entry(
            &admin,
            "payout_requested",
            "payout",
            payout.id,
            json!({ "sellerId": payout.seller_id, "amount": payout.amount }),
        ),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "message": "Payout request recorded",
        "payout": payout,
    })))
}

/// Complete (with a gateway transaction id) or reject a pending payout.
///
/// PATCH /api/admin/finance/payouts/{id}
#[instrument(skip(admin, state, body), fields(admin_id = %admin.id, status = %body.status))]
async fn process_payout(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PayoutId>,
    ApiJson(body): ApiJson<PayoutDecision>,
) -> AppResult<Json<Value>> {
    let transaction_id = body
        .transaction_id
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if body.status == PayoutStatus::Completed && transaction_id.is_none() {
        return Err(AppError::BadRequest(
            "transactionId is required to complete a payout".to_string(),
        ));
    }

    let decision = PayoutProcessing {
        status: body.status,
        transaction_id,
        note: body.note.as_deref(),
        processed_by: admin.id,
    };
    let payout = PayoutRepository::new(state.pool())
        .process(id, &decision)
        .await??;

    activity::record(
        state.pool(),
        activity::admin_entry(
            &admin,
            &format!("payout_{}", payout.status),
            "payout",
            id,
            json!({
                "sellerId": payout.seller_id,
                "amount": payout.amount,
                "transactionId": payout.transaction_id,
            }),
        ),
    )
    .await;
    tracing::info!(payout_id = %id, status = %payout.status, "Payout processed");

    Ok(Json(json!({
        "success": true,
        "message": format!("Payout {}", payout.status),
        "payout": payout,
    })))
}

/// GET /api/admin/finance/settlements
#[instrument(skip(_admin, state))]
async fn settlements(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Settlements>> {
    let hold_days = state.marketplace().settlement_hold_days;
    let orders = FinanceRepository::new(state.pool())
        .held_orders(hold_cutoff(Utc::now(), hold_days), hold_days)
        .await?;
    let total_held = orders.iter().map(|o| o.total_amount).sum();

    Ok(Json(Settlements {
        hold_days,
        orders,
        total_held,
    }))
}

/// GET /api/admin/finance/commission
#[instrument(skip(_admin, state))]
async fn commission(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<CommissionReport>> {
    let rows = FinanceRepository::new(state.pool())
        .delivered_gross_by_seller()
        .await?;
    Ok(Json(commission_report(
        rows,
        state.marketplace().default_commission_rate,
    )))
}

/// GET /api/admin/finance/refunds
#[instrument(skip(_admin, state))]
async fn refunds(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<RefundCase>>> {
    Ok(Json(FinanceRepository::new(state.pool()).refund_cases().await?))
}

/// GET /api/admin/finance/stats
#[instrument(skip(_admin, state))]
async fn stats(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<FinanceStats>> {
    let rules = state.marketplace();
    let repo = FinanceRepository::new(state.pool());
    let totals = repo
        .totals(hold_cutoff(Utc::now(), rules.settlement_hold_days))
        .await?;
    let report = commission_report(
        repo.delivered_gross_by_seller().await?,
        rules.default_commission_rate,
    );

    Ok(Json(FinanceStats {
        delivered_revenue: totals.delivered_revenue,
        total_commission: report.total_commission,
        completed_payouts: totals.completed_payouts,
        pending_payouts: totals.pending_payouts,
        held_funds: totals.held_funds,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use rust_decimal::Decimal;

    #[test]
    fn test_payout_refusals_map_to_statuses() {
        let err: AppError = PayoutRefusal::InsufficientBalance {
            available: Decimal::new(12_050, 2),
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("120.50"));

        let err: AppError = PayoutRefusal::AlreadyProcessed(PayoutStatus::Completed).into();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err: AppError = PayoutRefusal::InvalidTransition(PayoutStatus::Pending).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}

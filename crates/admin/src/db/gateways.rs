//! Payment gateway configuration.

use sqlx::PgPool;
use sqlx::types::Json;

use giftmart_core::PaymentGateway;

use super::RepositoryError;
use crate::models::platform::{GatewayConfig, GatewayUpdate};

const GATEWAY_COLUMNS: &str = "gateway, display_name, description, icon, is_active, test_mode, \
                               credentials, auto_capture, refund_enabled, partial_payment, \
                               sort_order, updated_at";

/// All configured gateways in display order.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_gateways(pool: &PgPool) -> Result<Vec<GatewayConfig>, RepositoryError> {
    let rows = sqlx::query_as::<_, GatewayConfig>(&format!(
        "SELECT {GATEWAY_COLUMNS} FROM market.payment_gateway_config ORDER BY sort_order, gateway"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_gateway(
    pool: &PgPool,
    gateway: PaymentGateway,
) -> Result<Option<GatewayConfig>, RepositoryError> {
    let row = sqlx::query_as::<_, GatewayConfig>(&format!(
        "SELECT {GATEWAY_COLUMNS} FROM market.payment_gateway_config WHERE gateway = $1"
    ))
    .bind(gateway)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Write a resolved gateway row.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the upsert fails.
pub async fn upsert_gateway(
    pool: &PgPool,
    update: &GatewayUpdate,
) -> Result<GatewayConfig, RepositoryError> {
    let row = sqlx::query_as::<_, GatewayConfig>(&format!(
        "INSERT INTO market.payment_gateway_config
             (gateway, display_name, description, icon, is_active, test_mode, credentials,
              auto_capture, refund_enabled, partial_payment, sort_order)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         ON CONFLICT (gateway) DO UPDATE
         SET display_name = EXCLUDED.display_name,
             description = EXCLUDED.description,
             icon = EXCLUDED.icon,
             is_active = EXCLUDED.is_active,
             test_mode = EXCLUDED.test_mode,
             credentials = EXCLUDED.credentials,
             auto_capture = EXCLUDED.auto_capture,
             refund_enabled = EXCLUDED.refund_enabled,
             partial_payment = EXCLUDED.partial_payment,
             sort_order = EXCLUDED.sort_order,
             updated_at = NOW()
         RETURNING {GATEWAY_COLUMNS}"
    ))
    .bind(update.gateway)
    .bind(&update.display_name)
    .bind(update.description.as_deref())
    .bind(update.icon.as_deref())
    .bind(update.is_active)
    .bind(update.test_mode)
    .bind(Json(&update.credentials))
    .bind(update.auto_capture)
    .bind(update.refund_enabled)
    .bind(update.partial_payment)
    .bind(update.sort_order)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

//! Platform records managed from the settings area: payment gateways, API
//! keys, access roles, backups and greeting cards.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

use giftmart_core::{
    ApiKeyId, BackupId, BackupStatus, BackupType, CardCategory, GreetingCardId, PaymentGateway,
    RoleId,
};

use super::settings::{carry, mask};
use super::validation::{ValidationError, non_negative, optional, required};

// =============================================================================
// Payment gateways
// =============================================================================

/// Provider credentials. Secrets are masked whenever a gateway is returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayCredentials {
    pub key_id: Option<String>,
    pub key_secret: Option<String>,
    pub webhook_secret: Option<String>,
    pub merchant_id: Option<String>,
}

impl GatewayCredentials {
    #[must_use]
    pub fn redacted(self) -> Self {
        Self {
            key_secret: mask(self.key_secret),
            webhook_secret: mask(self.webhook_secret),
            ..self
        }
    }

    /// Merge an update over the stored credentials.
    #[must_use]
    pub fn merged(self, stored: &Self) -> Self {
        Self {
            key_id: carry(self.key_id, stored.key_id.as_deref()),
            key_secret: carry(self.key_secret, stored.key_secret.as_deref()),
            webhook_secret: carry(self.webhook_secret, stored.webhook_secret.as_deref()),
            merchant_id: carry(self.merchant_id, stored.merchant_id.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    pub gateway: PaymentGateway,
    pub display_name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub is_active: bool,
    pub test_mode: bool,
    pub credentials: Json<GatewayCredentials>,
    pub auto_capture: bool,
    pub refund_enabled: bool,
    pub partial_payment: bool,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub updated_at: DateTime<Utc>,
}

impl GatewayConfig {
    #[must_use]
    pub fn redacted(mut self) -> Self {
        self.credentials = Json(self.credentials.0.redacted());
        self
    }
}

/// Body for `PUT /payment-gateways/{gateway}`. Absent fields keep their
/// stored value, or the default when the gateway is new.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayInput {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
    pub test_mode: Option<bool>,
    #[serde(default)]
    pub credentials: GatewayCredentials,
    pub auto_capture: Option<bool>,
    pub refund_enabled: Option<bool>,
    pub partial_payment: Option<bool>,
    pub order: Option<i32>,
}

impl GatewayInput {
    /// Resolve the update against the stored row, if any.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` when activating a non-COD gateway without a
    /// key id and key secret, or for a negative display order.
    pub fn resolve(
        self,
        gateway: PaymentGateway,
        stored: Option<&GatewayConfig>,
    ) -> Result<GatewayUpdate, ValidationError> {
        let stored_credentials = stored.map(|g| g.credentials.0.clone()).unwrap_or_default();
        let credentials = self.credentials.merged(&stored_credentials);
        let is_active = self
            .is_active
            .unwrap_or_else(|| stored.is_some_and(|g| g.is_active));

        if is_active
            && gateway != PaymentGateway::Cod
            && (credentials.key_id.is_none() || credentials.key_secret.is_none())
        {
            return Err(ValidationError(format!(
                "{gateway} needs credentials.keyId and credentials.keySecret before it can be enabled"
            )));
        }
        let sort_order = self.order.or(stored.map(|g| g.sort_order)).unwrap_or(0);
        if sort_order < 0 {
            return Err(ValidationError::new("order cannot be negative"));
        }

        Ok(GatewayUpdate {
            gateway,
            display_name: optional(self.display_name.as_deref())
                .or_else(|| stored.map(|g| g.display_name.clone()))
                .unwrap_or_else(|| gateway.display_name().to_string()),
            description: optional(self.description.as_deref())
                .or_else(|| stored.and_then(|g| g.description.clone())),
            icon: optional(self.icon.as_deref()).or_else(|| stored.and_then(|g| g.icon.clone())),
            is_active,
            test_mode: self
                .test_mode
                .unwrap_or_else(|| stored.is_none_or(|g| g.test_mode)),
            credentials,
            auto_capture: self
                .auto_capture
                .unwrap_or_else(|| stored.is_none_or(|g| g.auto_capture)),
            refund_enabled: self
                .refund_enabled
                .unwrap_or_else(|| stored.is_none_or(|g| g.refund_enabled)),
            partial_payment: self
                .partial_payment
                .unwrap_or_else(|| stored.is_some_and(|g| g.partial_payment)),
            sort_order,
        })
    }
}

/// A fully resolved gateway row ready to upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayUpdate {
    pub gateway: PaymentGateway,
    pub display_name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub is_active: bool,
    pub test_mode: bool,
    pub credentials: GatewayCredentials,
    pub auto_capture: bool,
    pub refund_enabled: bool,
    pub partial_payment: bool,
    pub sort_order: i32,
}

// =============================================================================
// API keys
// =============================================================================

/// Prefix on every issued key.
pub const API_KEY_PREFIX: &str = "gng_";

/// Requests allowed per window when none is given.
pub const DEFAULT_RATE_LIMIT: i32 = 1000;

/// Window length in seconds when none is given.
pub const DEFAULT_RATE_LIMIT_WINDOW: i32 = 3600;

/// An issued key. The secret is only ever shown once, on creation.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub id: ApiKeyId,
    #[serde(rename = "apiName")]
    pub name: String,
    pub api_key: String,
    pub rate_limit: i32,
    pub rate_limit_window: i32,
    pub allowed_origins: Vec<String>,
    pub permissions: Vec<String>,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub usage_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyInput {
    pub api_name: Option<String>,
    pub rate_limit: Option<i32>,
    pub rate_limit_window: Option<i32>,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApiKey {
    pub name: String,
    pub rate_limit: i32,
    pub rate_limit_window: i32,
    pub allowed_origins: Vec<String>,
    pub permissions: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ApiKeyInput {
    /// # Errors
    ///
    /// Returns `ValidationError` for a missing name, a non-positive rate
    /// limit or window, an origin that is not an http(s) URL, or an expiry
    /// in the past.
    pub fn validate(self, now: DateTime<Utc>) -> Result<NewApiKey, ValidationError> {
        let name = required("apiName", self.api_name.as_deref())?;
        let rate_limit = self.rate_limit.unwrap_or(DEFAULT_RATE_LIMIT);
        let rate_limit_window = self.rate_limit_window.unwrap_or(DEFAULT_RATE_LIMIT_WINDOW);
        if rate_limit <= 0 {
            return Err(ValidationError::new("rateLimit must be greater than 0"));
        }
        if rate_limit_window <= 0 {
            return Err(ValidationError::new("rateLimitWindow must be greater than 0"));
        }
        let allowed_origins = clean_list(self.allowed_origins);
        if let Some(origin) = allowed_origins
            .iter()
            .find(|o| !(o.starts_with("https://") || o.starts_with("http://")))
        {
            return Err(ValidationError(format!(
                "allowedOrigins entry {origin} must start with http:// or https://"
            )));
        }
        if self.expires_at.is_some_and(|at| at <= now) {
            return Err(ValidationError::new("expiresAt must be in the future"));
        }
        Ok(NewApiKey {
            name,
            rate_limit,
            rate_limit_window,
            allowed_origins,
            permissions: clean_list(self.permissions),
            expires_at: self.expires_at,
        })
    }
}

/// Trimmed, non-blank, de-duplicated entries in their original order.
fn clean_list(values: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for value in values.iter().filter_map(|v| optional(Some(v.as_str()))) {
        if !cleaned.contains(&value) {
            cleaned.push(value);
        }
    }
    cleaned
}

// =============================================================================
// Access roles
// =============================================================================

/// Areas a role grants access to and the actions each area supports.
pub const PERMISSION_AREAS: &[(&str, &[&str])] = &[
    ("dashboard", &["view", "edit"]),
    ("products", &["view", "create", "edit", "delete"]),
    ("orders", &["view", "edit", "cancel", "refund"]),
    ("users", &["view", "create", "edit", "delete", "block"]),
    ("vendors", &["view", "approve", "edit", "delete"]),
    ("categories", &["view", "create", "edit", "delete"]),
    ("reports", &["view", "export"]),
    ("settings", &["view", "edit"]),
    ("marketing", &["view", "create", "edit"]),
    ("finance", &["view", "edit", "process"]),
];

/// `area -> action -> allowed`.
pub type PermissionMatrix = BTreeMap<String, BTreeMap<String, bool>>;

/// Check a matrix against [`PERMISSION_AREAS`] and fill every action it
/// leaves out with `false`.
///
/// # Errors
///
/// Returns `ValidationError` naming an unknown area or action.
pub fn complete_permissions(matrix: PermissionMatrix) -> Result<PermissionMatrix, ValidationError> {
    for (area, actions) in &matrix {
        let Some((_, known)) = PERMISSION_AREAS.iter().find(|(name, _)| *name == area.as_str()) else {
            return Err(ValidationError(format!("unknown permission area {area}")));
        };
        if let Some(action) = actions.keys().find(|a| !known.contains(&a.as_str())) {
            return Err(ValidationError(format!("unknown action {action} for {area}")));
        }
    }
    Ok(PERMISSION_AREAS
        .iter()
        .map(|(area, actions)| {
            let granted = matrix.get(*area);
            let row = actions
                .iter()
                .map(|action| {
                    let allowed = granted
                        .and_then(|g| g.get(*action))
                        .copied()
                        .unwrap_or(false);
                    ((*action).to_string(), allowed)
                })
                .collect();
            ((*area).to_string(), row)
        })
        .collect())
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AccessRole {
    pub id: RoleId,
    pub role_name: String,
    pub description: Option<String>,
    pub is_system_role: bool,
    pub permissions: Json<PermissionMatrix>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleInput {
    pub role_name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: PermissionMatrix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    pub role_name: String,
    pub description: Option<String>,
    pub permissions: PermissionMatrix,
}

impl RoleInput {
    /// # Errors
    ///
    /// Returns `ValidationError` for a missing name or an unknown permission.
    pub fn validate(self) -> Result<NewRole, ValidationError> {
        Ok(NewRole {
            role_name: required("roleName", self.role_name.as_deref())?,
            description: optional(self.description.as_deref()),
            permissions: complete_permissions(self.permissions)?,
        })
    }
}

// =============================================================================
// Backups
// =============================================================================

/// Tables a `database` or `full` backup covers when none are named.
pub const BACKUP_TABLES: &[&str] = &[
    "customer",
    "seller",
    "category",
    "product",
    "customer_order",
    "order_item",
    "payout",
    "review",
    "coupon",
    "setting",
];

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub id: BackupId,
    pub backup_name: String,
    pub backup_type: BackupType,
    pub status: BackupStatus,
    pub size_bytes: Option<i64>,
    pub tables: Vec<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupInput {
    pub backup_type: Option<BackupType>,
    #[serde(default, alias = "collections")]
    pub tables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBackup {
    pub backup_name: String,
    pub backup_type: BackupType,
    pub tables: Vec<String>,
}

impl BackupInput {
    /// Name the backup after `now` and settle which tables it covers.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a table outside [`BACKUP_TABLES`].
    pub fn validate(self, now: DateTime<Utc>) -> Result<NewBackup, ValidationError> {
        let tables = clean_list(self.tables);
        if let Some(table) = tables.iter().find(|t| !BACKUP_TABLES.contains(&t.as_str())) {
            return Err(ValidationError(format!("unknown table {table}")));
        }
        let backup_type = self.backup_type.unwrap_or(BackupType::Full);
        let tables = if tables.is_empty() && backup_type != BackupType::Files {
            BACKUP_TABLES.iter().map(|t| (*t).to_string()).collect()
        } else {
            tables
        };
        Ok(NewBackup {
            backup_name: format!("backup_{}", now.format("%Y-%m-%dT%H-%M-%S-%3fZ")),
            backup_type,
            tables,
        })
    }
}

// =============================================================================
// Greeting cards
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GreetingCard {
    pub id: GreetingCardId,
    pub title: String,
    pub category: CardCategory,
    pub image_url: Option<String>,
    pub template: Option<String>,
    pub is_active: bool,
    pub is_premium: bool,
    pub price: Decimal,
    pub usage_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CardQuery {
    pub category: Option<CardCategory>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardInput {
    pub title: Option<String>,
    pub category: Option<CardCategory>,
    #[serde(alias = "image")]
    pub image_url: Option<String>,
    pub template: Option<String>,
    pub is_active: Option<bool>,
    pub is_premium: Option<bool>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCard {
    pub title: String,
    pub category: CardCategory,
    pub image_url: Option<String>,
    pub template: Option<String>,
    pub is_active: bool,
    pub is_premium: bool,
    pub price: Decimal,
}

impl CardInput {
    /// # Errors
    ///
    /// Returns `ValidationError` for a missing title, a negative or
    /// sub-paisa price, or a premium card priced at zero.
    pub fn validate(self) -> Result<NewCard, ValidationError> {
        let price = non_negative("price", self.price.unwrap_or(Decimal::ZERO))?;
        let is_premium = self.is_premium.unwrap_or(false);
        if is_premium && price.is_zero() {
            return Err(ValidationError::new("premium cards need a price"));
        }
        Ok(NewCard {
            title: required("title", self.title.as_deref())?,
            category: self.category.unwrap_or(CardCategory::Other),
            image_url: optional(self.image_url.as_deref()),
            template: optional(self.template.as_deref()),
            is_active: self.is_active.unwrap_or(true),
            is_premium,
            price,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::settings::SECRET_MASK;

    fn stored_razorpay() -> GatewayConfig {
        GatewayConfig {
            gateway: PaymentGateway::Razorpay,
            display_name: "Razorpay".to_string(),
            description: Some("Cards and UPI".to_string()),
            icon: None,
            is_active: true,
            test_mode: false,
            credentials: Json(GatewayCredentials {
                key_id: Some("rzp_live_1".to_string()),
                key_secret: Some("s3cret".to_string()),
                webhook_secret: None,
                merchant_id: None,
            }),
            auto_capture: true,
            refund_enabled: true,
            partial_payment: false,
            sort_order: 1,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_gateway_update_keeps_stored_values() {
        let stored = stored_razorpay();
        let input: GatewayInput = serde_json::from_value(serde_json::json!({
            "credentials": { "keySecret": SECRET_MASK },
            "partialPayment": true
        }))
        .unwrap();
        let update = input.resolve(PaymentGateway::Razorpay, Some(&stored)).unwrap();
        assert!(update.is_active);
        assert!(!update.test_mode);
        assert!(update.partial_payment);
        assert_eq!(update.sort_order, 1);
        assert_eq!(update.credentials.key_secret.as_deref(), Some("s3cret"));
        assert_eq!(update.description.as_deref(), Some("Cards and UPI"));
    }

    #[test]
    fn test_gateway_activation_needs_credentials() {
        let input: GatewayInput =
            serde_json::from_value(serde_json::json!({ "isActive": true })).unwrap();
        assert!(input.resolve(PaymentGateway::Stripe, None).is_err());

        let input: GatewayInput =
            serde_json::from_value(serde_json::json!({ "isActive": true })).unwrap();
        let cod = input.resolve(PaymentGateway::Cod, None).unwrap();
        assert_eq!(cod.display_name, "Cash on Delivery");
        assert!(cod.test_mode);
    }

    #[test]
    fn test_gateway_secrets_masked() {
        let shown = stored_razorpay().redacted();
        assert_eq!(shown.credentials.key_id.as_deref(), Some("rzp_live_1"));
        assert_eq!(shown.credentials.key_secret.as_deref(), Some(SECRET_MASK));
        assert_eq!(shown.credentials.webhook_secret, None);
    }

    #[test]
    fn test_api_key_input() {
        let now = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
        let input: ApiKeyInput = serde_json::from_value(serde_json::json!({
            "apiName": "Partner feed",
            "allowedOrigins": ["https://partner.example", "https://partner.example", " "]
        }))
        .unwrap();
        let key = input.validate(now).unwrap();
        assert_eq!(key.rate_limit, DEFAULT_RATE_LIMIT);
        assert_eq!(key.rate_limit_window, DEFAULT_RATE_LIMIT_WINDOW);
        assert_eq!(key.allowed_origins, vec!["https://partner.example"]);

        let input: ApiKeyInput =
            serde_json::from_value(serde_json::json!({ "apiName": "x", "rateLimit": 0 })).unwrap();
        assert!(input.validate(now).is_err());

        let input: ApiKeyInput = serde_json::from_value(serde_json::json!({
            "apiName": "x",
            "allowedOrigins": ["partner.example"]
        }))
        .unwrap();
        assert!(input.validate(now).is_err());

        let input: ApiKeyInput = serde_json::from_value(serde_json::json!({
            "apiName": "x",
            "expiresAt": "2026-09-30T00:00:00Z"
        }))
        .unwrap();
        assert!(input.validate(now).is_err());
    }

    #[test]
    fn test_permissions_completed_and_checked() {
        let mut matrix = PermissionMatrix::new();
        matrix.insert(
            "orders".to_string(),
            BTreeMap::from([("view".to_string(), true)]),
        );
        let full = complete_permissions(matrix).unwrap();
        assert_eq!(full.len(), PERMISSION_AREAS.len());
        assert!(full["orders"]["view"]);
        assert!(!full["orders"]["refund"]);
        assert!(!full["finance"]["process"]);

        let mut unknown = PermissionMatrix::new();
        unknown.insert("warehouse".to_string(), BTreeMap::new());
        assert!(complete_permissions(unknown).is_err());

        let mut bad_action = PermissionMatrix::new();
        bad_action.insert(
            "reports".to_string(),
            BTreeMap::from([("delete".to_string(), true)]),
        );
        assert_eq!(
            complete_permissions(bad_action).unwrap_err(),
            ValidationError::new("unknown action delete for reports")
        );
    }

    #[test]
    fn test_backup_naming_and_tables() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 2, 0, 0).unwrap();
        let backup = BackupInput::default().validate(now).unwrap();
        assert_eq!(backup.backup_name, "backup_2026-10-19T02-00-00-000Z");
        assert_eq!(backup.backup_type, BackupType::Full);
        assert_eq!(backup.tables.len(), BACKUP_TABLES.len());

        let files = BackupInput {
            backup_type: Some(BackupType::Files),
            tables: Vec::new(),
        }
        .validate(now)
        .unwrap();
        assert!(files.tables.is_empty());

        let unknown = BackupInput {
            backup_type: None,
            tables: vec!["session".to_string()],
        };
        assert!(unknown.validate(now).is_err());
    }

    #[test]
    fn test_card_rules() {
        let parse =
            |value: serde_json::Value| -> CardInput { serde_json::from_value(value).unwrap() };
        let card = parse(serde_json::json!({"title": "Happy Diwali", "category": "festive"}))
            .validate()
            .unwrap();
        assert_eq!(card.price, Decimal::ZERO);
        assert!(card.is_active);

        assert!(parse(serde_json::json!({"title": "Gold foil", "isPremium": true}))
            .validate()
            .is_err());
        assert!(parse(serde_json::json!({"title": "x", "price": "0.005"}))
            .validate()
            .is_err());
    }
}

//! Marketplace settings, mounted at `/api/settings`.
//!
//! Every JSON document shares the same read and write handlers; the type
//! parameter picks the storage key, defaults, validation and which fields
//! are credentials. Gateways, API keys, roles, backups, message templates
//! and greeting cards are rows of their own.

use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get, patch, put},
};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::instrument;

use giftmart_core::{ApiKeyId, BackupId, GreetingCardId, PaymentGateway, RoleId, TemplateId};

use crate::{
    db::{
        ApiKeyRepository, RoleRepository, backups, gateways, greeting_cards, settings, templates,
    },
    error::{AppError, AppResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::{RequireAdminAuth, RequireWriteAccess},
    models::{
        platform::{
            AccessRole, ApiKey, ApiKeyInput, Backup, BackupInput, CardInput, CardQuery,
            GatewayConfig, GatewayInput, GreetingCard, RoleInput,
        },
        settings::{
            BackupSettings, CustomizationSettings, EmailSettings, GdprSettings, PaymentSettings,
            PersonalizationSettings, SecuritySettings, SettingsDocument, SettingsOverview,
            SiteSettings, SmsSettings, TaxSettings,
        },
        template::{MessageTemplate, TemplateInput, TemplateQuery},
    },
    services::{activity, auth::issue_api_key},
    state::AppState,
};

/// Backups listed on the settings page.
const BACKUP_HISTORY: i64 = 50;

/// Build the settings router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(overview))
        .route("/site", get(read::<SiteSettings>).put(write::<SiteSettings>))
        .route("/tax", get(read::<TaxSettings>).put(write::<TaxSettings>))
        .route(
            "/payment",
            get(read::<PaymentSettings>).put(write::<PaymentSettings>),
        )
        .route("/email", get(read::<EmailSettings>).put(write::<EmailSettings>))
        .route("/sms", get(read::<SmsSettings>).put(write::<SmsSettings>))
        .route(
            "/security",
            get(read::<SecuritySettings>).put(write::<SecuritySettings>),
        )
        .route("/gdpr", get(read::<GdprSettings>).put(write::<GdprSettings>))
        .route(
            "/backup-settings",
            get(read::<BackupSettings>).put(write::<BackupSettings>),
        )
        .route(
            "/personalization",
            get(read::<PersonalizationSettings>).put(write::<PersonalizationSettings>),
        )
        .route(
            "/customization",
            get(read::<CustomizationSettings>).put(write::<CustomizationSettings>),
        )
        .route("/payment-gateways", get(list_gateways))
        .route("/payment-gateways/{gateway}", put(update_gateway))
        .route("/payment-gateways/{gateway}/toggle", patch(toggle_gateway))
        .route("/api-keys", get(list_api_keys).post(create_api_key))
        .route("/api-keys/{id}", delete(delete_api_key))
        .route("/api-keys/{id}/toggle", patch(toggle_api_key))
        .route("/roles", get(list_roles).post(create_role))
        .route("/roles/{id}", put(update_role).delete(delete_role))
        .route("/backups", get(list_backups).post(create_backup))
        .route("/backups/{id}", delete(delete_backup))
        .route(
            "/message-templates",
            get(list_templates).post(create_template),
        )
        .route(
            "/message-templates/{id}",
            put(update_template).delete(delete_template),
        )
        .route("/greeting-cards", get(list_cards).post(create_card))
        .route("/greeting-cards/{id}", put(update_card).delete(delete_card))
}

/// GET /api/settings
#[instrument(skip(_admin, state))]
async fn overview(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<SettingsOverview>> {
    let pool = state.pool();
    let (site, tax, payment, email, sms, security, gdpr, backup, personalization, customization) =
        tokio::try_join!(
            settings::get_document::<SiteSettings>(pool),
            settings::get_document::<TaxSettings>(pool),
            settings::get_document::<PaymentSettings>(pool),
            settings::get_document::<EmailSettings>(pool),
            settings::get_document::<SmsSettings>(pool),
            settings::get_document::<SecuritySettings>(pool),
            settings::get_document::<GdprSettings>(pool),
            settings::get_document::<BackupSettings>(pool),
            settings::get_document::<PersonalizationSettings>(pool),
            settings::get_document::<CustomizationSettings>(pool),
        )?;

    let keys = ApiKeyRepository::new(pool);
    let roles = RoleRepository::new(pool);
    let (payment_gateways, api_keys, roles, backups, message_templates, greeting_cards) =
        tokio::try_join!(
            gateways::list_gateways(pool),
            keys.list(),
            roles.list(),
            backups::list_backups(pool, BACKUP_HISTORY),
            templates::list_templates(pool, None),
            greeting_cards::list_cards(pool, None),
        )?;

    Ok(Json(SettingsOverview {
        site: site.redacted(),
        tax: tax.redacted(),
        payment: payment.redacted(),
        email: email.redacted(),
        sms: sms.redacted(),
        security: security.redacted(),
        gdpr: gdpr.redacted(),
        backup_settings: backup.redacted(),
        personalization: personalization.redacted(),
        customization: customization.redacted(),
        payment_gateways: payment_gateways
            .into_iter()
            .map(GatewayConfig::redacted)
            .collect(),
        api_keys,
        roles,
        backups,
        message_templates,
        greeting_cards,
    }))
}

// =============================================================================
// Documents
// =============================================================================

/// GET /api/settings/{document}
async fn read<T: SettingsDocument>(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<T>> {
    let document = settings::get_document::<T>(state.pool()).await?;
    Ok(Json(document.redacted()))
}

/// PUT /api/settings/{document}
///
/// Credentials left out or sent back masked keep their stored value.
#[instrument(skip(admin, state, body), fields(admin = %admin.email, key = T::KEY))]
async fn write<T: SettingsDocument>(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<T>,
) -> AppResult<Json<Value>> {
    let stored = settings::get_document::<T>(state.pool()).await?;
    let document = body.keep_secrets(&stored).validate()?;
    settings::put_document(state.pool(), &document, admin.id).await?;

    tracing::info!("Settings updated");
    Ok(Json(json!({
        "success": true,
        "message": "Settings updated",
        "settings": document.redacted(),
    })))
}

// =============================================================================
// Payment gateways
// =============================================================================

/// GET /api/settings/payment-gateways
async fn list_gateways(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<GatewayConfig>>> {
    let rows = gateways::list_gateways(state.pool()).await?;
    Ok(Json(rows.into_iter().map(GatewayConfig::redacted).collect()))
}

async fn save_gateway(
    state: &AppState,
    gateway: PaymentGateway,
    body: GatewayInput,
    stored: Option<&GatewayConfig>,
) -> AppResult<GatewayConfig> {
    let update = body.resolve(gateway, stored)?;
    Ok(gateways::upsert_gateway(state.pool(), &update).await?)
}

/// PUT /api/settings/payment-gateways/{gateway}
#[instrument(skip(admin, state, body), fields(admin = %admin.email))]
async fn update_gateway(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(gateway): ApiPath<PaymentGateway>,
    ApiJson(body): ApiJson<GatewayInput>,
) -> AppResult<Json<Value>> {
    let stored = gateways::get_gateway(state.pool(), gateway).await?;
    let config = save_gateway(&state, gateway, body, stored.as_ref()).await?;

    activity::record(
        state.pool(),
        activity::admin_entry(
            &admin,
            "update_payment_gateway",
            "payment_gateway",
            gateway,
            json!({ "isActive": config.is_active, "testMode": config.test_mode }),
        ),
    )
    .await;
    Ok(Json(json!({
        "success": true,
        "message": format!("{} updated", config.display_name),
        "gateway": config.redacted(),
    })))
}

/// PATCH /api/settings/payment-gateways/{gateway}/toggle
#[instrument(skip(admin, state), fields(admin = %admin.email))]
async fn toggle_gateway(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(gateway): ApiPath<PaymentGateway>,
) -> AppResult<Json<Value>> {
    let stored = gateways::get_gateway(state.pool(), gateway)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Gateway {gateway} is not configured")))?;
    let body = GatewayInput {
        is_active: Some(!stored.is_active),
        ..GatewayInput::default()
    };
    let config = save_gateway(&state, gateway, body, Some(&stored)).await?;

    activity::record(
        state.pool(),
        activity::admin_entry(
            &admin,
            "toggle_payment_gateway",
            "payment_gateway",
            gateway,
            json!({ "isActive": config.is_active }),
        ),
    )
    .await;
    let state_word = if config.is_active { "enabled" } else { "disabled" };
    Ok(Json(json!({
        "success": true,
        "message": format!("{} {state_word}", config.display_name),
        "gateway": config.redacted(),
    })))
}

// =============================================================================
// API keys
// =============================================================================

/// GET /api/settings/api-keys
async fn list_api_keys(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ApiKey>>> {
    Ok(Json(ApiKeyRepository::new(state.pool()).list().await?))
}

/// POST /api/settings/api-keys
///
/// The secret is returned in this response only.
#[instrument(skip(admin, state, body), fields(admin = %admin.email))]
async fn create_api_key(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ApiKeyInput>,
) -> AppResult<Json<Value>> {
    let input = body.validate(Utc::now())?;
    let issued = issue_api_key()?;
    let key = ApiKeyRepository::new(state.pool())
        .create(&input, &issued.key, &issued.secret_hash, admin.id)
        .await?;

    activity::record(
        state.pool(),
        activity::admin_entry(
            &admin,
            "create_api_key",
            "api_key",
            key.id,
            json!({ "name": key.name }),
        ),
    )
    .await;
    tracing::info!(api_key_id = %key.id, "API key issued");
    Ok(Json(json!({
        "success": true,
        "message": "API key created. Store the secret now; it will not be shown again.",
        "apiKey": key,
        "apiSecret": issued.secret,
    })))
}

/// PATCH /api/settings/api-keys/{id}/toggle
#[instrument(skip(_admin, state))]
async fn toggle_api_key(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ApiKeyId>,
) -> AppResult<Json<Value>> {
    let key = ApiKeyRepository::new(state.pool()).toggle(id).await?;
    let message = if key.is_active {
        "API key enabled"
    } else {
        "API key disabled"
    };
    Ok(Json(json!({
        "success": true,
        "message": message,
        "apiKey": key,
    })))
}

/// DELETE /api/settings/api-keys/{id}
#[instrument(skip(admin, state), fields(admin = %admin.email))]
async fn delete_api_key(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ApiKeyId>,
) -> AppResult<Json<Value>> {
    ApiKeyRepository::new(state.pool()).delete(id).await?;
    activity::record(
        state.pool(),
        activity::admin_entry(&admin, "delete_api_key", "api_key", id, json!({})),
    )
    .await;
    Ok(Json(json!({ "success": true, "message": "API key deleted" })))
}

// =============================================================================
// Roles
// =============================================================================

/// GET /api/settings/roles
async fn list_roles(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<AccessRole>>> {
    Ok(Json(RoleRepository::new(state.pool()).list().await?))
}

/// POST /api/settings/roles
#[instrument(skip(admin, state, body), fields(admin = %admin.email))]
async fn create_role(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RoleInput>,
) -> AppResult<Json<Value>> {
    let role = RoleRepository::new(state.pool())
        .create(&body.validate()?)
        .await?;
    activity::record(
        state.pool(),
        activity::admin_entry(
            &admin,
            "create_role",
            "role",
            role.id,
            json!({ "roleName": role.role_name }),
        ),
    )
    .await;
    Ok(Json(json!({
        "success": true,
        "message": "Role created",
        "role": role,
    })))
}

/// PUT /api/settings/roles/{id}
#[instrument(skip(admin, state, body), fields(admin = %admin.email))]
async fn update_role(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RoleId>,
    ApiJson(body): ApiJson<RoleInput>,
) -> AppResult<Json<Value>> {
    let role = RoleRepository::new(state.pool())
        .update(id, &body.validate()?)
        .await?;
    activity::record(
        state.pool(),
        activity::admin_entry(
            &admin,
            "update_role",
            "role",
            id,
            json!({ "roleName": role.role_name }),
        ),
    )
    .await;
    Ok(Json(json!({
        "success": true,
        "message": "Role updated",
        "role": role,
    })))
}

/// DELETE /api/settings/roles/{id}
#[instrument(skip(admin, state), fields(admin = %admin.email))]
async fn delete_role(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RoleId>,
) -> AppResult<Json<Value>> {
    let repo = RoleRepository::new(state.pool());
    let role = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Role {id} not found")))?;
    if role.is_system_role {
        return Err(AppError::BadRequest("Cannot delete system role".into()));
    }
    repo.delete(id).await?;

    activity::record(
        state.pool(),
        activity::admin_entry(
            &admin,
            "delete_role",
            "role",
            id,
            json!({ "roleName": role.role_name }),
        ),
    )
    .await;
    Ok(Json(json!({ "success": true, "message": "Role deleted" })))
}

// =============================================================================
// Backups
// =============================================================================

/// GET /api/settings/backups
async fn list_backups(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Backup>>> {
    Ok(Json(
        backups::list_backups(state.pool(), BACKUP_HISTORY).await?,
    ))
}

/// POST /api/settings/backups
///
/// Records a `pending` request for the backup job to pick up.
#[instrument(skip(admin, state, body), fields(admin = %admin.email))]
async fn create_backup(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<BackupInput>,
) -> AppResult<Json<Value>> {
    let backup =
        backups::create_backup(state.pool(), &body.validate(Utc::now())?, admin.id).await?;

    activity::record(
        state.pool(),
        activity::admin_entry(
            &admin,
            "request_backup",
            "backup",
            backup.id,
            json!({ "backupType": backup.backup_type }),
        ),
    )
    .await;
    tracing::info!(backup = %backup.backup_name, "Backup requested");
    Ok(Json(json!({
        "success": true,
        "message": "Backup requested",
        "backup": backup,
    })))
}

/// DELETE /api/settings/backups/{id}
#[instrument(skip(_admin, state))]
async fn delete_backup(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BackupId>,
) -> AppResult<Json<Value>> {
    backups::delete_backup(state.pool(), id).await?;
    Ok(Json(json!({ "success": true, "message": "Backup deleted" })))
}

// =============================================================================
// Message templates
// =============================================================================

/// GET /api/settings/message-templates
async fn list_templates(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TemplateQuery>,
) -> AppResult<Json<Vec<MessageTemplate>>> {
    Ok(Json(
        templates::list_templates(state.pool(), query.channel).await?,
    ))
}

/// POST /api/settings/message-templates
#[instrument(skip(_admin, state, body))]
async fn create_template(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<TemplateInput>,
) -> AppResult<Json<Value>> {
    let template = templates::create_template(state.pool(), &body.validate()?).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Template created",
        "template": template,
    })))
}

/// PUT /api/settings/message-templates/{id}
#[instrument(skip(_admin, state, body))]
async fn update_template(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TemplateId>,
    ApiJson(body): ApiJson<TemplateInput>,
) -> AppResult<Json<Value>> {
    let template = templates::update_template(state.pool(), id, &body.validate()?, None).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Template updated",
        "template": template,
    })))
}

/// DELETE /api/settings/message-templates/{id}
#[instrument(skip(_admin, state))]
async fn delete_template(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TemplateId>,
) -> AppResult<Json<Value>> {
    templates::delete_template(state.pool(), id, None).await?;
    Ok(Json(json!({ "success": true, "message": "Template deleted" })))
}

// =============================================================================
// Greeting cards
// =============================================================================

/// GET /api/settings/greeting-cards
async fn list_cards(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CardQuery>,
) -> AppResult<Json<Vec<GreetingCard>>> {
    Ok(Json(
        greeting_cards::list_cards(state.pool(), query.category).await?,
    ))
}

/// POST /api/settings/greeting-cards
#[instrument(skip(_admin, state, body))]
async fn create_card(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CardInput>,
) -> AppResult<Json<Value>> {
    let card = greeting_cards::create_card(state.pool(), &body.validate()?).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Greeting card created",
        "card": card,
    })))
}

/// PUT /api/settings/greeting-cards/{id}
#[instrument(skip(_admin, state, body))]
async fn update_card(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<GreetingCardId>,
    ApiJson(body): ApiJson<CardInput>,
) -> AppResult<Json<Value>> {
    let card = greeting_cards::update_card(state.pool(), id, &body.validate()?).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Greeting card updated",
        "card": card,
    })))
}

/// DELETE /api/settings/greeting-cards/{id}
#[instrument(skip(_admin, state))]
async fn delete_card(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<GreetingCardId>,
) -> AppResult<Json<Value>> {
    greeting_cards::delete_card(state.pool(), id).await?;
    Ok(Json(json!({ "success": true, "message": "Greeting card deleted" })))
}

//! Support desk, mounted at `/api/support`: tickets, announcements, seller
//! messages, email and SMS templates, help documents, training resources and
//! the service status board.

use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, patch, post, put},
};
use serde_json::{Value, json};
use tracing::instrument;

use giftmart_core::{
    AnnouncementId, HelpDocId, ServiceStatus, TemplateChannel, TemplateId, TicketId,
    TrainingResourceId, VendorMessageId, VendorMessageStatus,
};

use crate::{
    db::{
        TicketRepository, VendorMessageRepository, announcements, help_center, system_status,
        templates,
    },
    error::{AppError, AppResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::{RequireAdminAuth, RequireWriteAccess},
    models::{
        support::{
            Announcement, AnnouncementInput, HelpDoc, HelpDocInput, HelpDocQuery,
            MessageStatusInput, ReplyInput, ServiceStatusInput, SupportOverview, SupportTicket,
            TicketDetail, TicketInput, TicketQuery, TicketUpdate, TrainingInput, TrainingQuery,
            TrainingResource, VendorMessageQuery, VendorThread, status_board,
        },
        template::{MessageTemplate, TemplateInput},
        validation::required,
    },
    state::AppState,
};

/// Build the support router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(overview))
        .route("/tickets", get(list_tickets).post(create_ticket))
        .route("/tickets/{id}", get(show_ticket).patch(update_ticket))
        .route("/tickets/{id}/reply", post(reply))
        .route(
            "/announcements",
            get(list_announcements).post(create_announcement),
        )
        .route(
            "/announcements/{id}",
            put(update_announcement).delete(delete_announcement),
        )
        .route("/vendor-messages", get(list_vendor_messages))
        .route("/vendor-messages/{id}/reply", post(reply_vendor_message))
        .route("/vendor-messages/{id}/status", patch(set_vendor_message_status))
        .route(
            "/email-templates",
            get(list_email_templates).post(create_email_template),
        )
        .route(
            "/email-templates/{id}",
            put(update_email_template).delete(delete_email_template),
        )
        .route("/sms-templates", get(list_sms_templates).post(create_sms_template))
        .route(
            "/sms-templates/{id}",
            put(update_sms_template).delete(delete_sms_template),
        )
        .route("/help-docs", get(list_help_docs).post(create_help_doc))
        .route(
            "/help-docs/{id}",
            put(update_help_doc).delete(delete_help_doc),
        )
        .route("/help-docs/{id}/view", post(view_help_doc))
        .route(
            "/training-resources",
            get(list_training).post(create_training),
        )
        .route(
            "/training-resources/{id}",
            put(update_training).delete(delete_training),
        )
        .route(
            "/system-status",
            get(show_system_status).put(update_system_status),
        )
}

/// Seller threads with their replies, newest thread first.
async fn vendor_threads(
    state: &AppState,
    status: Option<VendorMessageStatus>,
) -> AppResult<Vec<VendorThread>> {
    let repo = VendorMessageRepository::new(state.pool());
    let messages = repo.list(status).await?;
    let ids: Vec<VendorMessageId> = messages.iter().map(|m| m.id).collect();
    let replies = repo.replies_for(&ids).await?;
    Ok(VendorThread::assemble(messages, replies))
}

/// GET /api/support
#[instrument(skip(_admin, state))]
async fn overview(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<SupportOverview>> {
    let pool = state.pool();
    let vendor_messages = VendorMessageRepository::new(pool);
    let tickets = TicketRepository::new(pool);

    let (
        messages,
        support_tickets,
        announcements,
        email_templates,
        sms_templates,
        help_docs,
        training_resources,
        services,
    ) = tokio::try_join!(
        vendor_messages.list(None),
        tickets.list(None, None, None),
        announcements::list_announcements(pool),
        templates::list_templates(pool, Some(TemplateChannel::Email)),
        templates::list_templates(pool, Some(TemplateChannel::Sms)),
        help_center::list_help_docs(pool, None),
        help_center::list_training(pool, None),
        system_status::list_services(pool),
    )?;
    let ids: Vec<VendorMessageId> = messages.iter().map(|m| m.id).collect();
    let replies = vendor_messages.replies_for(&ids).await?;

    Ok(Json(SupportOverview {
        vendor_messages: VendorThread::assemble(messages, replies),
        support_tickets,
        announcements,
        email_templates,
        sms_templates,
        help_docs,
        training_resources,
        system_status: status_board(&services),
    }))
}

// =============================================================================
// Tickets
// =============================================================================

/// GET /api/support/tickets
async fn list_tickets(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TicketQuery>,
) -> AppResult<Json<Vec<SupportTicket>>> {
    let tickets = TicketRepository::new(state.pool())
        .list(query.status, query.priority, query.category.as_deref())
        .await?;
    Ok(Json(tickets))
}

/// GET /api/support/tickets/{id}
async fn show_ticket(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TicketId>,
) -> AppResult<Json<TicketDetail>> {
    let repo = TicketRepository::new(state.pool());
    let ticket = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ticket {id} not found")))?;
    let replies = repo.replies(id).await?;
    Ok(Json(TicketDetail { ticket, replies }))
}

/// POST /api/support/tickets
#[instrument(skip(_admin, state, body))]
async fn create_ticket(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<TicketInput>,
) -> AppResult<Json<Value>> {
    let ticket = TicketRepository::new(state.pool())
        .create(&body.validate()?)
        .await?;
    tracing::info!(ticket_id = %ticket.id, "Support ticket opened");
    Ok(Json(json!({
        "success": true,
        "message": "Ticket created",
        "ticket": ticket,
    })))
}

/// PATCH /api/support/tickets/{id}
#[instrument(skip(_admin, state, body))]
async fn update_ticket(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TicketId>,
    ApiJson(body): ApiJson<TicketUpdate>,
) -> AppResult<Json<Value>> {
    let ticket = TicketRepository::new(state.pool()).update(id, &body).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Ticket updated",
        "ticket": ticket,
    })))
}

/// POST /api/support/tickets/{id}/reply
#[instrument(skip(admin, state, body), fields(admin = %admin.email))]
async fn reply(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TicketId>,
    ApiJson(body): ApiJson<ReplyInput>,
) -> AppResult<Json<Value>> {
    let message = required("message", body.message.as_deref())?;
    let reply = TicketRepository::new(state.pool())
        .reply(id, &admin.name, &message)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Reply added",
        "reply": reply,
    })))
}

// =============================================================================
// Announcements
// =============================================================================

/// GET /api/support/announcements
async fn list_announcements(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Announcement>>> {
    Ok(Json(announcements::list_announcements(state.pool()).await?))
}

/// POST /api/support/announcements
#[instrument(skip(_admin, state, body))]
async fn create_announcement(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AnnouncementInput>,
) -> AppResult<Json<Value>> {
    let announcement =
        announcements::create_announcement(state.pool(), &body.validate()?).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Announcement created",
        "announcement": announcement,
    })))
}

/// PUT /api/support/announcements/{id}
#[instrument(skip(_admin, state, body))]
async fn update_announcement(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AnnouncementId>,
    ApiJson(body): ApiJson<AnnouncementInput>,
) -> AppResult<Json<Value>> {
    let announcement =
        announcements::update_announcement(state.pool(), id, &body.validate()?).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Announcement updated",
        "announcement": announcement,
    })))
}

/// DELETE /api/support/announcements/{id}
#[instrument(skip(_admin, state))]
async fn delete_announcement(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AnnouncementId>,
) -> AppResult<Json<Value>> {
    announcements::delete_announcement(state.pool(), id).await?;
    Ok(Json(json!({ "success": true, "message": "Announcement deleted" })))
}

// =============================================================================
// Seller messages
// =============================================================================

/// GET /api/support/vendor-messages
async fn list_vendor_messages(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<VendorMessageQuery>,
) -> AppResult<Json<Vec<VendorThread>>> {
    Ok(Json(vendor_threads(&state, query.status).await?))
}

/// POST /api/support/vendor-messages/{id}/reply
#[instrument(skip(admin, state, body), fields(admin = %admin.email))]
async fn reply_vendor_message(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<VendorMessageId>,
    ApiJson(body): ApiJson<ReplyInput>,
) -> AppResult<Json<Value>> {
    let message = required("message", body.message.as_deref())?;
    let reply = VendorMessageRepository::new(state.pool())
        .reply(id, &admin.name, &message)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Reply sent",
        "reply": reply,
    })))
}

/// PATCH /api/support/vendor-messages/{id}/status
#[instrument(skip(_admin, state, body))]
async fn set_vendor_message_status(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<VendorMessageId>,
    ApiJson(body): ApiJson<MessageStatusInput>,
) -> AppResult<Json<Value>> {
    let status = body
        .status
        .ok_or_else(|| AppError::BadRequest("status is required".into()))?;
    let message = VendorMessageRepository::new(state.pool())
        .set_status(id, status)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Status updated",
        "vendorMessage": message,
    })))
}

// =============================================================================
// Email and SMS templates
// =============================================================================

async fn list_channel(
    state: &AppState,
    channel: TemplateChannel,
) -> AppResult<Json<Vec<MessageTemplate>>> {
    Ok(Json(templates::list_templates(state.pool(), Some(channel)).await?))
}

async fn create_on_channel(
    state: &AppState,
    channel: TemplateChannel,
    body: TemplateInput,
) -> AppResult<Json<Value>> {
    let template =
        templates::create_template(state.pool(), &body.on_channel(channel).validate()?).await?;
    tracing::info!(template_id = %template.id, channel = %channel, "Template created");
    Ok(Json(json!({
        "success": true,
        "message": "Template created",
        "template": template,
    })))
}

async fn update_on_channel(
    state: &AppState,
    channel: TemplateChannel,
    id: TemplateId,
    body: TemplateInput,
) -> AppResult<Json<Value>> {
    let template = templates::update_template(
        state.pool(),
        id,
        &body.on_channel(channel).validate()?,
        Some(channel),
    )
    .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Template updated",
        "template": template,
    })))
}

async fn delete_on_channel(
    state: &AppState,
    channel: TemplateChannel,
    id: TemplateId,
) -> AppResult<Json<Value>> {
    templates::delete_template(state.pool(), id, Some(channel)).await?;
    Ok(Json(json!({ "success": true, "message": "Template deleted" })))
}

/// GET /api/support/email-templates
async fn list_email_templates(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<MessageTemplate>>> {
    list_channel(&state, TemplateChannel::Email).await
}

/// POST /api/support/email-templates
#[instrument(skip(_admin, state, body))]
async fn create_email_template(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<TemplateInput>,
) -> AppResult<Json<Value>> {
    create_on_channel(&state, TemplateChannel::Email, body).await
}

/// PUT /api/support/email-templates/{id}
#[instrument(skip(_admin, state, body))]
async fn update_email_template(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TemplateId>,
    ApiJson(body): ApiJson<TemplateInput>,
) -> AppResult<Json<Value>> {
    update_on_channel(&state, TemplateChannel::Email, id, body).await
}

/// DELETE /api/support/email-templates/{id}
#[instrument(skip(_admin, state))]
async fn delete_email_template(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TemplateId>,
) -> AppResult<Json<Value>> {
    delete_on_channel(&state, TemplateChannel::Email, id).await
}

/// GET /api/support/sms-templates
async fn list_sms_templates(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<MessageTemplate>>> {
    list_channel(&state, TemplateChannel::Sms).await
}

/// POST /api/support/sms-templates
#[instrument(skip(_admin, state, body))]
async fn create_sms_template(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<TemplateInput>,
) -> AppResult<Json<Value>> {
    create_on_channel(&state, TemplateChannel::Sms, body).await
}

/// PUT /api/support/sms-templates/{id}
#[instrument(skip(_admin, state, body))]
async fn update_sms_template(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TemplateId>,
    ApiJson(body): ApiJson<TemplateInput>,
) -> AppResult<Json<Value>> {
    update_on_channel(&state, TemplateChannel::Sms, id, body).await
}

/// DELETE /api/support/sms-templates/{id}
#[instrument(skip(_admin, state))]
async fn delete_sms_template(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TemplateId>,
) -> AppResult<Json<Value>> {
    delete_on_channel(&state, TemplateChannel::Sms, id).await
}

// =============================================================================
// Help documents
// =============================================================================

/// GET /api/support/help-docs
async fn list_help_docs(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<HelpDocQuery>,
) -> AppResult<Json<Vec<HelpDoc>>> {
    let docs = help_center::list_help_docs(state.pool(), query.category.as_deref()).await?;
    Ok(Json(docs))
}

/// POST /api/support/help-docs
#[instrument(skip(_admin, state, body))]
async fn create_help_doc(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<HelpDocInput>,
) -> AppResult<Json<Value>> {
    let doc = help_center::create_help_doc(state.pool(), &body.validate()?).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Help document created",
        "helpDoc": doc,
    })))
}

/// PUT /api/support/help-docs/{id}
#[instrument(skip(_admin, state, body))]
async fn update_help_doc(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<HelpDocId>,
    ApiJson(body): ApiJson<HelpDocInput>,
) -> AppResult<Json<Value>> {
    let doc = help_center::update_help_doc(state.pool(), id, &body.validate()?).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Help document updated",
        "helpDoc": doc,
    })))
}

/// DELETE /api/support/help-docs/{id}
#[instrument(skip(_admin, state))]
async fn delete_help_doc(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<HelpDocId>,
) -> AppResult<Json<Value>> {
    help_center::delete_help_doc(state.pool(), id).await?;
    Ok(Json(json!({ "success": true, "message": "Help document deleted" })))
}

/// POST /api/support/help-docs/{id}/view
///
/// Counts a read; any signed-in admin may record one.
async fn view_help_doc(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<HelpDocId>,
) -> AppResult<Json<Value>> {
    let doc = help_center::record_help_doc_view(state.pool(), id).await?;
    Ok(Json(json!({ "success": true, "views": doc.views })))
}

// =============================================================================
// Training resources
// =============================================================================

/// GET /api/support/training-resources
async fn list_training(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TrainingQuery>,
) -> AppResult<Json<Vec<TrainingResource>>> {
    Ok(Json(
        help_center::list_training(state.pool(), query.resource_type).await?,
    ))
}

/// POST /api/support/training-resources
#[instrument(skip(_admin, state, body))]
async fn create_training(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<TrainingInput>,
) -> AppResult<Json<Value>> {
    let resource = help_center::create_training(state.pool(), &body.validate()?).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Training resource created",
        "resource": resource,
    })))
}

/// PUT /api/support/training-resources/{id}
#[instrument(skip(_admin, state, body))]
async fn update_training(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TrainingResourceId>,
    ApiJson(body): ApiJson<TrainingInput>,
) -> AppResult<Json<Value>> {
    let resource = help_center::update_training(state.pool(), id, &body.validate()?).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Training resource updated",
        "resource": resource,
    })))
}

/// DELETE /api/support/training-resources/{id}
#[instrument(skip(_admin, state))]
async fn delete_training(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TrainingResourceId>,
) -> AppResult<Json<Value>> {
    help_center::delete_training(state.pool(), id).await?;
    Ok(Json(json!({ "success": true, "message": "Training resource deleted" })))
}

// =============================================================================
// System status
// =============================================================================

/// GET /api/support/system-status
async fn show_system_status(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> AppResult<Json<BTreeMap<String, ServiceStatus>>> {
    let services = system_status::list_services(state.pool()).await?;
    Ok(Json(status_board(&services)))
}

/// PUT /api/support/system-status
#[instrument(skip(admin, state, body), fields(admin = %admin.email))]
async fn update_system_status(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ServiceStatusInput>,
) -> AppResult<Json<Value>> {
    let service = system_status::upsert_service(state.pool(), &body.validate()?).await?;
    tracing::info!(service = %service.service, status = %service.status, "Service status changed");
    let services = system_status::list_services(state.pool()).await?;
    Ok(Json(json!({
        "success": true,
        "message": "System status updated",
        "systemStatus": status_board(&services),
    })))
}

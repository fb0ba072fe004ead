//! Support desk tickets, seller conversations, storefront announcements and
//! the help centre.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use giftmart_core::{
    ActorRole, AnnouncementId, AnnouncementPriority, Audience, Email, HelpDocId, Priority,
    SellerId, ServiceStatus, TicketId, TicketReplyId, TicketStatus, TrainingResourceId,
    TrainingResourceType, VendorMessageId, VendorMessageReplyId, VendorMessageStatus,
};

use super::template::MessageTemplate;

use super::validation::{ValidationError, optional, required};

/// Ticket category used when none is given.
pub const DEFAULT_TICKET_CATEGORY: &str = "general";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SupportTicket {
    pub id: TicketId,
    pub subject: String,
    pub description: String,
    pub requester_name: String,
    pub requester_email: String,
    pub priority: Priority,
    pub category: String,
    pub status: TicketStatus,
    pub assigned_to: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TicketReply {
    pub id: TicketReplyId,
    pub ticket_id: TicketId,
    pub author_role: ActorRole,
    pub author_name: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetail {
    #[serde(flatten)]
    pub ticket: SupportTicket,
    pub replies: Vec<TicketReply>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TicketQuery {
    pub status: Option<TicketStatus>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketInput {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub requester_name: Option<String>,
    pub requester_email: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub subject: String,
    pub description: String,
    pub requester_name: String,
    pub requester_email: Email,
    pub priority: Priority,
    pub category: String,
}

impl TicketInput {
    /// # Errors
    ///
    /// Returns `ValidationError` for missing fields or a bad email.
    pub fn validate(self) -> Result<NewTicket, ValidationError> {
        let requester_email = Email::parse(&required(
            "requesterEmail",
            self.requester_email.as_deref(),
        )?)
        .map_err(|e| ValidationError(e.to_string()))?;

        Ok(NewTicket {
            subject: required("subject", self.subject.as_deref())?,
            description: required("description", self.description.as_deref())?,
            requester_name: required("requesterName", self.requester_name.as_deref())?,
            requester_email,
            priority: self.priority.unwrap_or(Priority::Medium),
            category: optional(self.category.as_deref())
                .unwrap_or_else(|| DEFAULT_TICKET_CATEGORY.to_string()),
        })
    }
}

/// Partial update of a ticket. Absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketUpdate {
    pub status: Option<TicketStatus>,
    pub priority: Option<Priority>,
    pub assigned_to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReplyInput {
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: AnnouncementId,
    pub title: String,
    pub message: String,
    pub priority: AnnouncementPriority,
    pub audience: Audience,
    pub is_active: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementInput {
    pub title: Option<String>,
    pub message: Option<String>,
    pub priority: Option<AnnouncementPriority>,
    pub audience: Option<Audience>,
    pub is_active: Option<bool>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnnouncement {
    pub title: String,
    pub message: String,
    pub priority: AnnouncementPriority,
    pub audience: Audience,
    pub is_active: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl AnnouncementInput {
    /// # Errors
    ///
    /// Returns `ValidationError` for a missing title or message, or a window
    /// that ends before it starts.
    pub fn validate(self) -> Result<NewAnnouncement, ValidationError> {
        if matches!((self.starts_at, self.ends_at), (Some(start), Some(end)) if end <= start) {
            return Err(ValidationError::new("endsAt must be after startsAt"));
        }
        Ok(NewAnnouncement {
            title: required("title", self.title.as_deref())?,
            message: required("message", self.message.as_deref())?,
            priority: self.priority.unwrap_or(AnnouncementPriority::Normal),
            audience: self.audience.unwrap_or(Audience::All),
            is_active: self.is_active.unwrap_or(true),
            starts_at: self.starts_at,
            ends_at: self.ends_at,
        })
    }
}

// =============================================================================
// Seller conversations
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VendorMessage {
    pub id: VendorMessageId,
    pub seller_id: SellerId,
    pub store_name: String,
    pub subject: String,
    pub message: String,
    pub status: VendorMessageStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VendorMessageReply {
    pub id: VendorMessageReplyId,
    pub message_id: VendorMessageId,
    pub is_admin: bool,
    pub author_name: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// A seller message with its replies, oldest reply first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorThread {
    #[serde(flatten)]
    pub message: VendorMessage,
    pub replies: Vec<VendorMessageReply>,
}

impl VendorThread {
    /// Attach each reply to its message, keeping the message order.
    #[must_use]
    pub fn assemble(messages: Vec<VendorMessage>, replies: Vec<VendorMessageReply>) -> Vec<Self> {
        let mut by_message: BTreeMap<VendorMessageId, Vec<VendorMessageReply>> = BTreeMap::new();
        for reply in replies {
            by_message.entry(reply.message_id).or_default().push(reply);
        }
        messages
            .into_iter()
            .map(|message| Self {
                replies: by_message.remove(&message.id).unwrap_or_default(),
                message,
            })
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VendorMessageQuery {
    pub status: Option<VendorMessageStatus>,
}

#[derive(Debug, Deserialize)]
pub struct MessageStatusInput {
    pub status: Option<VendorMessageStatus>,
}

// =============================================================================
// Help centre
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HelpDoc {
    pub id: HelpDocId,
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub views: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HelpDocQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpDocInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHelpDoc {
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub is_published: bool,
}

impl HelpDocInput {
    /// Tags are trimmed, lower-cased and de-duplicated.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a missing title or content.
    pub fn validate(self) -> Result<NewHelpDoc, ValidationError> {
        let mut tags: Vec<String> = Vec::new();
        for tag in self.tags.iter().filter_map(|t| optional(Some(t.as_str()))) {
            let tag = tag.to_lowercase();
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        Ok(NewHelpDoc {
            title: required("title", self.title.as_deref())?,
            content: required("content", self.content.as_deref())?,
            category: optional(self.category.as_deref())
                .unwrap_or_else(|| DEFAULT_TICKET_CATEGORY.to_string()),
            tags,
            is_published: self.is_published.unwrap_or(true),
        })
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TrainingResource {
    pub id: TrainingResourceId,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: TrainingResourceType,
    pub url: String,
    pub duration: Option<String>,
    pub pages: Option<i32>,
    pub thumbnail: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrainingQuery {
    #[serde(rename = "type")]
    pub resource_type: Option<TrainingResourceType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingInput {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: Option<TrainingResourceType>,
    pub url: Option<String>,
    pub duration: Option<String>,
    pub pages: Option<i32>,
    pub thumbnail: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrainingResource {
    pub title: String,
    pub description: Option<String>,
    pub resource_type: TrainingResourceType,
    pub url: String,
    pub duration: Option<String>,
    pub pages: Option<i32>,
    pub thumbnail: Option<String>,
    pub is_active: bool,
}

impl TrainingInput {
    /// # Errors
    ///
    /// Returns `ValidationError` for a missing title, a missing or non-http
    /// URL, or a page count below one.
    pub fn validate(self) -> Result<NewTrainingResource, ValidationError> {
        let url = required("url", self.url.as_deref())?;
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ValidationError::new("url must start with http:// or https://"));
        }
        if matches!(self.pages, Some(pages) if pages < 1) {
            return Err(ValidationError::new("pages must be at least 1"));
        }
        Ok(NewTrainingResource {
            title: required("title", self.title.as_deref())?,
            description: optional(self.description.as_deref()),
            resource_type: self.resource_type.unwrap_or(TrainingResourceType::Video),
            url,
            duration: optional(self.duration.as_deref()),
            pages: self.pages,
            thumbnail: optional(self.thumbnail.as_deref()),
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

// =============================================================================
// Service status board
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealth {
    pub service: String,
    pub status: ServiceStatus,
    pub message: Option<String>,
    pub last_checked: DateTime<Utc>,
}

/// `service -> status` as shown on the board.
#[must_use]
pub fn status_board(services: &[ServiceHealth]) -> BTreeMap<String, ServiceStatus> {
    services
        .iter()
        .map(|s| (s.service.clone(), s.status))
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct ServiceStatusInput {
    pub service: Option<String>,
    pub status: Option<ServiceStatus>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatusUpdate {
    pub service: String,
    pub status: ServiceStatus,
    pub message: Option<String>,
}

impl ServiceStatusInput {
    /// Service names are stored lower-case.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a missing service or status.
    pub fn validate(self) -> Result<ServiceStatusUpdate, ValidationError> {
        Ok(ServiceStatusUpdate {
            service: required("service", self.service.as_deref())?.to_lowercase(),
            status: self
                .status
                .ok_or_else(|| ValidationError::new("status is required"))?,
            message: optional(self.message.as_deref()),
        })
    }
}

/// Everything on the support desk, for `GET /api/support`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportOverview {
    pub vendor_messages: Vec<VendorThread>,
    pub support_tickets: Vec<SupportTicket>,
    pub announcements: Vec<Announcement>,
    pub email_templates: Vec<MessageTemplate>,
    pub sms_templates: Vec<MessageTemplate>,
    pub help_docs: Vec<HelpDoc>,
    pub training_resources: Vec<TrainingResource>,
    pub system_status: BTreeMap<String, ServiceStatus>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_defaults() {
        let input: TicketInput = serde_json::from_value(serde_json::json!({
            "subject": "Late delivery",
            "description": "Order 14 has not arrived",
            "requesterName": "Asha",
            "requesterEmail": "Asha@Example.com"
        }))
        .unwrap();
        let ticket = input.validate().unwrap();
        assert_eq!(ticket.priority, Priority::Medium);
        assert_eq!(ticket.category, DEFAULT_TICKET_CATEGORY);
        assert_eq!(ticket.requester_email.as_str(), "asha@example.com");
    }

    #[test]
    fn test_announcement_defaults_and_window() {
        let input: AnnouncementInput = serde_json::from_value(serde_json::json!({
            "title": "Diwali hours",
            "message": "Support closes early"
        }))
        .unwrap();
        let a = input.validate().unwrap();
        assert_eq!(a.priority, AnnouncementPriority::Normal);
        assert_eq!(a.audience, Audience::All);

        let input: AnnouncementInput = serde_json::from_value(serde_json::json!({
            "title": "x",
            "message": "y",
            "startsAt": "2026-11-01T00:00:00Z",
            "endsAt": "2026-10-01T00:00:00Z"
        }))
        .unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_help_doc_tags_normalized() {
        let input: HelpDocInput = serde_json::from_value(serde_json::json!({
            "title": "Shipping rakhi hampers",
            "content": "Pack them flat.",
            "tags": ["Shipping", " shipping ", "", "Festive"]
        }))
        .unwrap();
        let doc = input.validate().unwrap();
        assert_eq!(doc.tags, vec!["shipping".to_string(), "festive".to_string()]);
        assert_eq!(doc.category, "general");
        assert!(doc.is_published);
    }

    #[test]
    fn test_training_resource_rules() {
        let parse = |value: serde_json::Value| -> TrainingInput {
            serde_json::from_value(value).unwrap()
        };
        let resource = parse(serde_json::json!({
            "title": "Listing photos",
            "url": "https://learn.giftmart.dev/photos"
        }))
        .validate()
        .unwrap();
        assert_eq!(resource.resource_type, TrainingResourceType::Video);

        assert!(parse(serde_json::json!({"title": "x", "url": "ftp://files"})).validate().is_err());
        assert!(parse(serde_json::json!({"title": "x"})).validate().is_err());
        assert!(
            parse(serde_json::json!({"title": "x", "url": "https://a.b", "type": "guide", "pages": 0}))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_threads_keep_message_order() {
        let now = Utc::now();
        let message = |id: i32| VendorMessage {
            id: VendorMessageId::new(id),
            seller_id: SellerId::new(1),
            store_name: "Petal Co".to_string(),
            subject: "Payout".to_string(),
            message: "When?".to_string(),
            status: VendorMessageStatus::Unread,
            created_at: now,
            updated_at: now,
        };
        let reply = |id: i32, message_id: i32| VendorMessageReply {
            id: VendorMessageReplyId::new(id),
            message_id: VendorMessageId::new(message_id),
            is_admin: true,
            author_name: "Ops".to_string(),
            message: "Friday".to_string(),
            created_at: now,
        };
        let threads = VendorThread::assemble(
            vec![message(9), message(4)],
            vec![reply(1, 4), reply(2, 9), reply(3, 4)],
        );
        assert_eq!(threads[0].message.id, VendorMessageId::new(9));
        assert_eq!(threads[0].replies.len(), 1);
        let ids: Vec<_> = threads[1].replies.iter().map(|r| r.id.as_i32()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_service_status_input() {
        let input: ServiceStatusInput = serde_json::from_value(serde_json::json!({
            "service": " Payments ",
            "status": "degraded",
            "message": "Gateway slow"
        }))
        .unwrap();
        let update = input.validate().unwrap();
        assert_eq!(update.service, "payments");
        assert_eq!(update.status, ServiceStatus::Degraded);

        let input: ServiceStatusInput =
            serde_json::from_value(serde_json::json!({"service": "cdn"})).unwrap();
        assert!(input.validate().is_err());
    }
}

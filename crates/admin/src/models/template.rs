//! Message templates for email, SMS, push and WhatsApp.
//!
//! The settings area manages every channel; the support desk exposes the
//! email and SMS templates under their own routes. Placeholders are written
//! `{{name}}` and are collected from the body on every save.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use giftmart_core::{TemplateChannel, TemplateId};

use super::validation::{ValidationError, optional, required};

/// Category used when none is given.
pub const DEFAULT_TEMPLATE_CATEGORY: &str = "general";

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("Invalid regex"));

/// Placeholders in `body`, in order of first use, written as `{{name}}`.
#[must_use]
pub fn extract_variables(body: &str) -> Vec<String> {
    let mut variables: Vec<String> = Vec::new();
    for captures in PLACEHOLDER_RE.captures_iter(body) {
        if let Some(name) = captures.get(1) {
            let variable = format!("{{{{{}}}}}", name.as_str());
            if !variables.contains(&variable) {
                variables.push(variable);
            }
        }
    }
    variables
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MessageTemplate {
    pub id: TemplateId,
    pub channel: TemplateChannel,
    pub name: String,
    pub category: String,
    pub trigger_event: Option<String>,
    pub subject: Option<String>,
    pub body: String,
    pub variables: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TemplateQuery {
    #[serde(rename = "type")]
    pub channel: Option<TemplateChannel>,
}

/// Body for creating or replacing a template. SMS templates send their text
/// as `message`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInput {
    pub name: Option<String>,
    #[serde(alias = "type")]
    pub channel: Option<TemplateChannel>,
    pub category: Option<String>,
    #[serde(alias = "trigger")]
    pub trigger_event: Option<String>,
    pub subject: Option<String>,
    #[serde(alias = "message")]
    pub body: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTemplate {
    pub channel: TemplateChannel,
    pub name: String,
    pub category: String,
    pub trigger_event: Option<String>,
    pub subject: Option<String>,
    pub body: String,
    pub variables: Vec<String>,
    pub is_active: bool,
}

impl TemplateInput {
    /// Pin the channel, ignoring whatever the body said.
    #[must_use]
    pub fn on_channel(mut self, channel: TemplateChannel) -> Self {
        self.channel = Some(channel);
        self
    }

    /// # Errors
    ///
    /// Returns `ValidationError` for a missing name, channel or body, or an
    /// email template without a subject.
    pub fn validate(self) -> Result<NewTemplate, ValidationError> {
        let name = required("name", self.name.as_deref())?;
        let channel = self
            .channel
            .ok_or_else(|| ValidationError::new("type is required"))?;
        let body = required("body", self.body.as_deref())?;
        let subject = if channel.needs_subject() {
            Some(required("subject", self.subject.as_deref())?)
        } else {
            optional(self.subject.as_deref())
        };

        Ok(NewTemplate {
            channel,
            name,
            category: optional(self.category.as_deref())
                .unwrap_or_else(|| DEFAULT_TEMPLATE_CATEGORY.to_string()),
            trigger_event: optional(self.trigger_event.as_deref()),
            subject,
            variables: extract_variables(&body),
            body,
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(value: serde_json::Value) -> TemplateInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_extract_variables() {
        assert_eq!(
            extract_variables("Hi {{name}}, order {{orderId}} ships soon. Thanks {{name}}!"),
            vec!["{{name}}".to_string(), "{{orderId}}".to_string()]
        );
        assert!(extract_variables("No placeholders {{ spaced }} {single}").is_empty());
    }

    #[test]
    fn test_email_template_needs_subject() {
        let err = input(serde_json::json!({"name": "Welcome", "body": "Hello {{name}}"}))
            .on_channel(TemplateChannel::Email)
            .validate()
            .unwrap_err();
        assert_eq!(err, ValidationError::new("subject is required"));
    }

    #[test]
    fn test_sms_template_accepts_message_field() {
        let template = input(serde_json::json!({
            "name": "OTP",
            "message": "Your code is {{otp}}",
            "type": "email"
        }))
        .on_channel(TemplateChannel::Sms)
        .validate()
        .unwrap();
        assert_eq!(template.channel, TemplateChannel::Sms);
        assert_eq!(template.body, "Your code is {{otp}}");
        assert_eq!(template.variables, vec!["{{otp}}".to_string()]);
        assert_eq!(template.category, DEFAULT_TEMPLATE_CATEGORY);
        assert_eq!(template.subject, None);
    }

    #[test]
    fn test_channel_required_without_pin() {
        assert!(
            input(serde_json::json!({"name": "Push", "body": "Sale!"}))
                .validate()
                .is_err()
        );
        let template = input(serde_json::json!({
            "name": "Shipped",
            "type": "whatsapp",
            "trigger": "order_shipped",
            "body": "Your gift is on its way"
        }))
        .validate()
        .unwrap();
        assert_eq!(template.trigger_event.as_deref(), Some("order_shipped"));
    }
}

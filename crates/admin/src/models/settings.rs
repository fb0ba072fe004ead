//! Marketplace settings stored as JSON documents.
//!
//! Each document type names its storage key and provides defaults; a
//! missing row reads back as the default and is written on first access.
//! Documents holding provider credentials mask them on the way out and
//! keep the stored value when an update sends the mask back.

use std::net::IpAddr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use giftmart_core::{Email, RUPEE_SYMBOL};

use super::notification::NotificationSettings;
use super::platform::{AccessRole, ApiKey, Backup, GatewayConfig, GreetingCard};
use super::template::MessageTemplate;
use super::validation::{ValidationError, clock_time, non_negative, optional, rate, required};
use crate::services::auth::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

/// Placeholder returned in place of a stored credential.
pub const SECRET_MASK: &str = "********";

/// A settings document with a fixed storage key.
pub trait SettingsDocument: Serialize + DeserializeOwned + Default + Send + Sync {
    /// Primary key in `market.setting`.
    const KEY: &'static str;

    /// Check a document before it is stored.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` describing the first invalid field.
    fn validate(self) -> Result<Self, ValidationError> {
        Ok(self)
    }

    /// The document as shown to clients, credentials masked.
    #[must_use]
    fn redacted(self) -> Self {
        self
    }

    /// Carry stored credentials over where `self` left them out or sent the
    /// mask back.
    #[must_use]
    fn keep_secrets(self, _stored: &Self) -> Self {
        self
    }
}

/// Mask a credential if one is set.
#[must_use]
pub fn mask(secret: Option<String>) -> Option<String> {
    secret.map(|_| SECRET_MASK.to_string())
}

/// Merge an incoming credential with the stored one. Absent or masked keeps
/// the stored value; blank clears it.
#[must_use]
pub fn carry(update: Option<String>, stored: Option<&str>) -> Option<String> {
    match update {
        None => stored.map(String::from),
        Some(value) if value == SECRET_MASK => stored.map(String::from),
        Some(value) => optional(Some(value.as_str())),
    }
}

fn optional_email(field: &str, value: Option<String>) -> Result<Option<String>, ValidationError> {
    optional(value.as_deref())
        .map(|v| {
            Email::parse(&v)
                .map(|email| email.as_str().to_string())
                .map_err(|_| ValidationError(format!("{field} must be a valid email")))
        })
        .transpose()
}

fn at_least(field: &str, value: u32, min: u32) -> Result<(), ValidationError> {
    if value < min {
        return Err(ValidationError(format!("{field} must be at least {min}")));
    }
    Ok(())
}

/// Storefront identity and locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteSettings {
    pub site_name: String,
    pub site_url: Option<String>,
    pub logo: Option<String>,
    pub tagline: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub currency: String,
    pub currency_symbol: String,
    pub timezone: String,
    pub language: String,
    pub maintenance_mode: bool,
    pub maintenance_message: Option<String>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "Gift N Gifts".to_string(),
            site_url: None,
            logo: None,
            tagline: None,
            contact_email: None,
            contact_phone: None,
            address: None,
            currency: "INR".to_string(),
            currency_symbol: RUPEE_SYMBOL.to_string(),
            timezone: "Asia/Kolkata".to_string(),
            language: "en".to_string(),
            maintenance_mode: false,
            maintenance_message: None,
        }
    }
}

impl SettingsDocument for SiteSettings {
    const KEY: &'static str = "site";

    fn validate(mut self) -> Result<Self, ValidationError> {
        self.site_name = required("siteName", Some(&self.site_name))?;
        self.currency = required("currency", Some(&self.currency))?.to_uppercase();
        Ok(self)
    }
}

/// One GST slab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRate {
    pub name: String,
    pub rate: Decimal,
    pub category: String,
    #[serde(default)]
    pub is_default: bool,
}

impl TaxRate {
    fn gst(rate: i64, category: &str, is_default: bool) -> Self {
        Self {
            name: format!("GST {rate}%"),
            rate: Decimal::from(rate),
            category: category.to_string(),
            is_default,
        }
    }
}

/// GST configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaxSettings {
    pub tax_name: String,
    pub is_enabled: bool,
    pub included_in_price: bool,
    pub display_on_checkout: bool,
    pub tax_rates: Vec<TaxRate>,
    pub exempt_categories: Vec<String>,
    pub tax_number: Option<String>,
}

impl Default for TaxSettings {
    fn default() -> Self {
        Self {
            tax_name: "GST".to_string(),
            is_enabled: true,
            included_in_price: true,
            display_on_checkout: true,
            tax_rates: vec![
                TaxRate::gst(5, "essentials", false),
                TaxRate::gst(12, "standard", false),
                TaxRate::gst(18, "general", true),
                TaxRate::gst(28, "luxury", false),
            ],
            exempt_categories: Vec::new(),
            tax_number: None,
        }
    }
}

impl TaxSettings {
    /// The slab marked default.
    #[must_use]
    pub fn default_rate(&self) -> Option<&TaxRate> {
        self.tax_rates.iter().find(|r| r.is_default)
    }
}

impl SettingsDocument for TaxSettings {
    const KEY: &'static str = "tax";

    fn validate(self) -> Result<Self, ValidationError> {
        for tax_rate in &self.tax_rates {
            rate("taxRates.rate", tax_rate.rate)?;
        }
        if self.tax_rates.iter().filter(|r| r.is_default).count() > 1 {
            return Err(ValidationError::new("only one tax rate can be the default"));
        }
        Ok(self)
    }
}

/// Checkout payment options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentSettings {
    pub cod_enabled: bool,
    pub online_enabled: bool,
    pub gateway: String,
    pub test_mode: bool,
    /// Orders above this amount cannot use cash on delivery.
    pub cod_limit: Decimal,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            cod_enabled: true,
            online_enabled: true,
            gateway: "razorpay".to_string(),
            test_mode: true,
            cod_limit: Decimal::from(10_000),
        }
    }
}

impl SettingsDocument for PaymentSettings {
    const KEY: &'static str = "payment";

    fn validate(self) -> Result<Self, ValidationError> {
        if !self.cod_enabled && !self.online_enabled {
            return Err(ValidationError::new(
                "at least one payment method must be enabled",
            ));
        }
        non_negative("codLimit", self.cod_limit)?;
        Ok(self)
    }
}

impl SettingsDocument for NotificationSettings {
    const KEY: &'static str = "notifications";

    fn validate(self) -> Result<Self, ValidationError> {
        self.validate_quiet_hours()?;
        Ok(self)
    }
}

// =============================================================================
// Outbound email and SMS providers
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailProvider {
    Smtp,
    Sendgrid,
    Mailgun,
    Ses,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmtpSettings {
    pub host: Option<String>,
    pub port: u16,
    pub secure: bool,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: None,
            port: 587,
            secure: false,
            username: None,
            password: None,
        }
    }
}

/// Transactional email delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailSettings {
    pub provider: EmailProvider,
    pub is_active: bool,
    pub smtp: SmtpSettings,
    pub api_key: Option<String>,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    pub reply_to: Option<String>,
    pub bcc_admin: bool,
    pub bcc_email: Option<String>,
    pub daily_limit: u32,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            provider: EmailProvider::Smtp,
            is_active: false,
            smtp: SmtpSettings::default(),
            api_key: None,
            from_email: None,
            from_name: None,
            reply_to: None,
            bcc_admin: false,
            bcc_email: None,
            daily_limit: 500,
        }
    }
}

impl SettingsDocument for EmailSettings {
    const KEY: &'static str = "email";

    fn validate(mut self) -> Result<Self, ValidationError> {
        self.from_email = optional_email("fromEmail", self.from_email)?;
        self.reply_to = optional_email("replyTo", self.reply_to)?;
        self.bcc_email = optional_email("bccEmail", self.bcc_email)?;
        at_least("dailyLimit", self.daily_limit, 1)?;
        if self.smtp.port == 0 {
            return Err(ValidationError::new("smtp.port must be between 1 and 65535"));
        }
        if self.is_active {
            if self.from_email.is_none() {
                return Err(ValidationError::new("fromEmail is required to enable email"));
            }
            if self.provider == EmailProvider::Smtp && optional(self.smtp.host.as_deref()).is_none() {
                return Err(ValidationError::new("smtp.host is required for the smtp provider"));
            }
        }
        Ok(self)
    }

    fn redacted(mut self) -> Self {
        self.smtp.password = mask(self.smtp.password);
        self.api_key = mask(self.api_key);
        self
    }

    fn keep_secrets(mut self, stored: &Self) -> Self {
        self.smtp.password = carry(self.smtp.password, stored.smtp.password.as_deref());
        self.api_key = carry(self.api_key, stored.api_key.as_deref());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmsProvider {
    Twilio,
    Msg91,
    Textlocal,
    AwsSns,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmsCredentials {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub sender_id: Option<String>,
    pub api_key: Option<String>,
}

/// Texts sent on order events. `{{name}}` placeholders are filled at send time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmsMessages {
    pub otp: String,
    pub order_confirmation: String,
    pub order_shipped: String,
    pub order_delivered: String,
}

impl Default for SmsMessages {
    fn default() -> Self {
        Self {
            otp: "{{otp}} is your Gift N Gifts verification code".to_string(),
            order_confirmation: "Order {{orderId}} confirmed. Thank you for shopping with us!"
                .to_string(),
            order_shipped: "Order {{orderId}} has shipped. Track it at {{trackingUrl}}"
                .to_string(),
            order_delivered: "Order {{orderId}} was delivered. We hope they love it!".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmsSettings {
    pub provider: SmsProvider,
    pub is_active: bool,
    pub credentials: SmsCredentials,
    pub templates: SmsMessages,
    pub daily_limit: u32,
}

impl Default for SmsSettings {
    fn default() -> Self {
        Self {
            provider: SmsProvider::Twilio,
            is_active: false,
            credentials: SmsCredentials::default(),
            templates: SmsMessages::default(),
            daily_limit: 1000,
        }
    }
}

impl SettingsDocument for SmsSettings {
    const KEY: &'static str = "sms";

    fn validate(mut self) -> Result<Self, ValidationError> {
        at_least("dailyLimit", self.daily_limit, 1)?;
        self.credentials.sender_id = optional(self.credentials.sender_id.as_deref());
        if self.is_active && self.credentials.sender_id.is_none() {
            return Err(ValidationError::new(
                "credentials.senderId is required to enable SMS",
            ));
        }
        Ok(self)
    }

    fn redacted(mut self) -> Self {
        self.credentials.auth_token = mask(self.credentials.auth_token);
        self.credentials.api_key = mask(self.credentials.api_key);
        self
    }

    fn keep_secrets(mut self, stored: &Self) -> Self {
        self.credentials.auth_token =
            carry(self.credentials.auth_token, stored.credentials.auth_token.as_deref());
        self.credentials.api_key =
            carry(self.credentials.api_key, stored.credentials.api_key.as_deref());
        self
    }
}

// =============================================================================
// Security and privacy
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TwoFactorMethod {
    Email,
    Sms,
    Authenticator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TwoFactorAuth {
    pub enabled: bool,
    pub required_for_admin: bool,
    pub methods: Vec<TwoFactorMethod>,
}

impl Default for TwoFactorAuth {
    fn default() -> Self {
        Self {
            enabled: false,
            required_for_admin: true,
            methods: vec![TwoFactorMethod::Email],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PasswordPolicy {
    pub min_length: u32,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_numbers: bool,
    pub require_special_chars: bool,
    /// Zero disables expiry.
    pub expiry_days: u32,
    pub prevent_reuse: u32,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_lowercase: true,
            require_numbers: true,
            require_special_chars: false,
            expiry_days: 90,
            prevent_reuse: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginSecurity {
    pub max_attempts: u32,
    /// Minutes.
    pub lockout_duration: u32,
    /// Minutes.
    pub session_timeout: u32,
    pub single_session: bool,
}

impl Default for LoginSecurity {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout_duration: 30,
            session_timeout: 60,
            single_session: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptchaProvider {
    Recaptcha,
    Hcaptcha,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecuritySettings {
    pub two_factor_auth: TwoFactorAuth,
    pub password_policy: PasswordPolicy,
    pub login_security: LoginSecurity,
    pub ip_whitelist: Vec<String>,
    pub ip_blacklist: Vec<String>,
    pub captcha_enabled: bool,
    pub captcha_provider: Option<CaptchaProvider>,
    pub captcha_site_key: Option<String>,
    pub captcha_secret_key: Option<String>,
}

/// An IP address or CIDR block such as `10.0.0.0/8`.
fn is_ip_rule(rule: &str) -> bool {
    let (address, prefix) = match rule.split_once('/') {
        Some((address, prefix)) => (address, Some(prefix)),
        None => (rule, None),
    };
    let Ok(address) = address.parse::<IpAddr>() else {
        return false;
    };
    let max = if address.is_ipv4() { 32 } else { 128 };
    prefix.is_none_or(|p| p.parse::<u8>().is_ok_and(|p| p <= max))
}

fn ip_rules(field: &str, rules: Vec<String>) -> Result<Vec<String>, ValidationError> {
    let mut cleaned: Vec<String> = Vec::new();
    for rule in rules.iter().filter_map(|r| optional(Some(r.as_str()))) {
        if !is_ip_rule(&rule) {
            return Err(ValidationError(format!(
                "{field} entry {rule} is not an IP address or CIDR block"
            )));
        }
        if !cleaned.contains(&rule) {
            cleaned.push(rule);
        }
    }
    Ok(cleaned)
}

impl SettingsDocument for SecuritySettings {
    const KEY: &'static str = "security";

    fn validate(mut self) -> Result<Self, ValidationError> {
        let min_length = self.password_policy.min_length;
        if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&(min_length as usize)) {
            return Err(ValidationError(format!(
                "passwordPolicy.minLength must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH}"
            )));
        }
        at_least("loginSecurity.maxAttempts", self.login_security.max_attempts, 1)?;
        at_least("loginSecurity.lockoutDuration", self.login_security.lockout_duration, 1)?;
        at_least("loginSecurity.sessionTimeout", self.login_security.session_timeout, 5)?;
        if self.two_factor_auth.enabled && self.two_factor_auth.methods.is_empty() {
            return Err(ValidationError::new(
                "twoFactorAuth.methods needs at least one method",
            ));
        }
        if self.captcha_enabled && self.captcha_provider.is_none() {
            return Err(ValidationError::new("captchaProvider is required to enable captcha"));
        }

        self.ip_whitelist = ip_rules("ipWhitelist", self.ip_whitelist)?;
        self.ip_blacklist = ip_rules("ipBlacklist", self.ip_blacklist)?;
        if let Some(rule) = self.ip_whitelist.iter().find(|r| self.ip_blacklist.contains(*r)) {
            return Err(ValidationError(format!(
                "{rule} cannot be both whitelisted and blacklisted"
            )));
        }
        Ok(self)
    }

    fn redacted(mut self) -> Self {
        self.captcha_secret_key = mask(self.captcha_secret_key);
        self
    }

    fn keep_secrets(mut self, stored: &Self) -> Self {
        self.captcha_secret_key = carry(self.captcha_secret_key, stored.captcha_secret_key.as_deref());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CookieConsent {
    pub enabled: bool,
    pub message: String,
    pub accept_button_text: String,
    pub decline_button_text: String,
    pub policy_link: Option<String>,
}

impl Default for CookieConsent {
    fn default() -> Self {
        Self {
            enabled: true,
            message: "We use cookies to keep your basket and improve your experience.".to_string(),
            accept_button_text: "Accept".to_string(),
            decline_button_text: "Decline".to_string(),
            policy_link: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataRetention {
    pub user_data_days: u32,
    pub order_data_days: u32,
    pub log_data_days: u32,
}

impl Default for DataRetention {
    fn default() -> Self {
        Self {
            user_data_days: 365,
            order_data_days: 730,
            log_data_days: 90,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyDocument {
    pub content: Option<String>,
    pub last_updated: Option<chrono::DateTime<chrono::Utc>>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GdprSettings {
    pub cookie_consent: CookieConsent,
    pub data_retention: DataRetention,
    pub privacy_policy: PolicyDocument,
    pub terms_of_service: PolicyDocument,
    pub data_export_enabled: bool,
    pub data_deletion_enabled: bool,
    pub consent_logging: bool,
}

impl Default for GdprSettings {
    fn default() -> Self {
        Self {
            cookie_consent: CookieConsent::default(),
            data_retention: DataRetention::default(),
            privacy_policy: PolicyDocument::default(),
            terms_of_service: PolicyDocument::default(),
            data_export_enabled: true,
            data_deletion_enabled: true,
            consent_logging: true,
        }
    }
}

impl SettingsDocument for GdprSettings {
    const KEY: &'static str = "gdpr";

    fn validate(self) -> Result<Self, ValidationError> {
        let retention = &self.data_retention;
        at_least("dataRetention.userDataDays", retention.user_data_days, 1)?;
        at_least("dataRetention.orderDataDays", retention.order_data_days, 1)?;
        at_least("dataRetention.logDataDays", retention.log_data_days, 1)?;
        Ok(self)
    }
}

// =============================================================================
// Backups
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupFrequency {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupStorage {
    Local,
    S3,
    Gcs,
    Azure,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CloudCredentials {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub bucket: Option<String>,
    pub region: Option<String>,
}

/// Schedule for automatic backups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackupSettings {
    pub auto_backup_enabled: bool,
    pub frequency: BackupFrequency,
    /// `HH:MM`, server time.
    pub time: String,
    pub retention_count: u32,
    pub storage_location: BackupStorage,
    pub cloud_credentials: CloudCredentials,
    pub notify_on_complete: bool,
    pub notify_on_fail: bool,
    pub notify_email: Option<String>,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            auto_backup_enabled: false,
            frequency: BackupFrequency::Weekly,
            time: "02:00".to_string(),
            retention_count: 10,
            storage_location: BackupStorage::Local,
            cloud_credentials: CloudCredentials::default(),
            notify_on_complete: true,
            notify_on_fail: true,
            notify_email: None,
        }
    }
}

impl SettingsDocument for BackupSettings {
    const KEY: &'static str = "backup";

    fn validate(mut self) -> Result<Self, ValidationError> {
        clock_time("time", &self.time)?;
        at_least("retentionCount", self.retention_count, 1)?;
        self.notify_email = optional_email("notifyEmail", self.notify_email)?;
        if self.storage_location != BackupStorage::Local
            && optional(self.cloud_credentials.bucket.as_deref()).is_none()
        {
            return Err(ValidationError::new(
                "cloudCredentials.bucket is required for cloud storage",
            ));
        }
        Ok(self)
    }

    fn redacted(mut self) -> Self {
        self.cloud_credentials.secret_key = mask(self.cloud_credentials.secret_key);
        self
    }

    fn keep_secrets(mut self, stored: &Self) -> Self {
        self.cloud_credentials.secret_key = carry(
            self.cloud_credentials.secret_key,
            stored.cloud_credentials.secret_key.as_deref(),
        );
        self
    }
}

// =============================================================================
// Storefront experience
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationAlgorithm {
    #[serde(rename = "collaborative")]
    Collaborative,
    #[serde(rename = "content-based")]
    ContentBased,
    #[serde(rename = "hybrid")]
    Hybrid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalizationSettings {
    pub enable_recommendations: bool,
    pub recommendation_algorithm: RecommendationAlgorithm,
    pub max_recommendations: u32,
    pub enable_recently_viewed: bool,
    pub recently_viewed_limit: u32,
    pub enable_wishlist_reminders: bool,
    pub enable_abandoned_cart_reminders: bool,
    /// Hours after the last basket change.
    pub abandoned_cart_delay: u32,
    pub enable_personalized_emails: bool,
    pub enable_birthday_offers: bool,
    pub birthday_discount_percent: Decimal,
}

impl Default for PersonalizationSettings {
    fn default() -> Self {
        Self {
            enable_recommendations: true,
            recommendation_algorithm: RecommendationAlgorithm::Hybrid,
            max_recommendations: 10,
            enable_recently_viewed: true,
            recently_viewed_limit: 10,
            enable_wishlist_reminders: true,
            enable_abandoned_cart_reminders: true,
            abandoned_cart_delay: 24,
            enable_personalized_emails: true,
            enable_birthday_offers: true,
            birthday_discount_percent: Decimal::TEN,
        }
    }
}

impl SettingsDocument for PersonalizationSettings {
    const KEY: &'static str = "personalization";

    fn validate(self) -> Result<Self, ValidationError> {
        at_least("maxRecommendations", self.max_recommendations, 1)?;
        at_least("recentlyViewedLimit", self.recently_viewed_limit, 1)?;
        at_least("abandonedCartDelay", self.abandoned_cart_delay, 1)?;
        rate("birthdayDiscountPercent", self.birthday_discount_percent)?;
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Theme {
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub background_color: String,
    pub text_color: String,
    pub font_family: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_color: "#3B82F6".to_string(),
            secondary_color: "#10B981".to_string(),
            accent_color: "#F59E0B".to_string(),
            background_color: "#FFFFFF".to_string(),
            text_color: "#1F2937".to_string(),
            font_family: "Inter".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutOptions {
    pub guest_checkout: bool,
    pub show_order_summary: bool,
    pub show_coupon_field: bool,
    pub show_gift_wrap: bool,
    pub terms_required: bool,
}

impl Default for CheckoutOptions {
    fn default() -> Self {
        Self {
            guest_checkout: true,
            show_order_summary: true,
            show_coupon_field: true,
            show_gift_wrap: true,
            terms_required: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductPageOptions {
    pub show_stock: bool,
    #[serde(rename = "showSKU")]
    pub show_sku: bool,
    pub show_reviews: bool,
    pub show_related: bool,
    pub show_share: bool,
    pub enable_zoom: bool,
}

impl Default for ProductPageOptions {
    fn default() -> Self {
        Self {
            show_stock: true,
            show_sku: false,
            show_reviews: true,
            show_related: true,
            show_share: true,
            enable_zoom: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PanelNotifications {
    pub show_new_orders: bool,
    pub play_sound: bool,
    pub desktop_notifications: bool,
}

impl Default for PanelNotifications {
    fn default() -> Self {
        Self {
            show_new_orders: true,
            play_sound: false,
            desktop_notifications: true,
        }
    }
}

/// Storefront look and behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomizationSettings {
    pub theme: Theme,
    pub checkout: CheckoutOptions,
    pub product_page: ProductPageOptions,
    pub notifications: PanelNotifications,
}

/// `#RRGGBB`.
fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

impl SettingsDocument for CustomizationSettings {
    const KEY: &'static str = "customization";

    fn validate(mut self) -> Result<Self, ValidationError> {
        let theme = &mut self.theme;
        for (field, color) in [
            ("theme.primaryColor", &mut theme.primary_color),
            ("theme.secondaryColor", &mut theme.secondary_color),
            ("theme.accentColor", &mut theme.accent_color),
            ("theme.backgroundColor", &mut theme.background_color),
            ("theme.textColor", &mut theme.text_color),
        ] {
            if !is_hex_color(color.trim()) {
                return Err(ValidationError(format!("{field} must be a #RRGGBB colour")));
            }
            *color = color.trim().to_uppercase();
        }
        theme.font_family = required("theme.fontFamily", Some(&theme.font_family))?;
        Ok(self)
    }
}

/// Everything the settings area shows on its landing page. Credentials are
/// masked.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsOverview {
    pub site: SiteSettings,
    pub tax: TaxSettings,
    pub payment: PaymentSettings,
    pub email: EmailSettings,
    pub sms: SmsSettings,
    pub security: SecuritySettings,
    pub gdpr: GdprSettings,
    pub backup_settings: BackupSettings,
    pub personalization: PersonalizationSettings,
    pub customization: CustomizationSettings,
    pub payment_gateways: Vec<GatewayConfig>,
    pub api_keys: Vec<ApiKey>,
    pub roles: Vec<AccessRole>,
    pub backups: Vec<Backup>,
    pub message_templates: Vec<MessageTemplate>,
    pub greeting_cards: Vec<GreetingCard>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_site_defaults() {
        let site = SiteSettings::default();
        assert_eq!(site.site_name, "Gift N Gifts");
        assert_eq!(site.currency_symbol, "₹");
        assert_eq!(site.timezone, "Asia/Kolkata");
        assert!(!site.maintenance_mode);
    }

    #[test]
    fn test_partial_site_update_keeps_defaults() {
        let site: SiteSettings =
            serde_json::from_value(serde_json::json!({ "maintenanceMode": true })).unwrap();
        assert!(site.maintenance_mode);
        assert_eq!(site.language, "en");
    }

    #[test]
    fn test_tax_defaults() {
        let tax = TaxSettings::default();
        let rates: Vec<_> = tax.tax_rates.iter().map(|r| r.rate).collect();
        assert_eq!(
            rates,
            vec![Decimal::from(5), Decimal::from(12), Decimal::from(18), Decimal::from(28)]
        );
        assert_eq!(tax.default_rate().unwrap().rate, Decimal::from(18));
    }

    #[test]
    fn test_tax_validation() {
        let mut tax = TaxSettings::default();
        tax.tax_rates[0].rate = Decimal::from(120);
        assert!(SettingsDocument::validate(tax).is_err());

        let mut tax = TaxSettings::default();
        tax.tax_rates[0].is_default = true;
        assert!(SettingsDocument::validate(tax).is_err());
    }

    #[test]
    fn test_payment_requires_a_method() {
        let payment = PaymentSettings {
            cod_enabled: false,
            online_enabled: false,
            ..PaymentSettings::default()
        };
        assert!(SettingsDocument::validate(payment).is_err());
        assert!(SettingsDocument::validate(PaymentSettings::default()).is_ok());
    }

    #[test]
    fn test_credentials_masked_and_carried() {
        let stored = EmailSettings {
            api_key: Some("SG.live-key".to_string()),
            smtp: SmtpSettings {
                password: Some("hunter22".to_string()),
                ..SmtpSettings::default()
            },
            ..EmailSettings::default()
        };
        let shown = stored.clone().redacted();
        assert_eq!(shown.api_key.as_deref(), Some(SECRET_MASK));
        assert_eq!(shown.smtp.password.as_deref(), Some(SECRET_MASK));

        // Sending the masked document back keeps the real values.
        let kept = shown.keep_secrets(&stored);
        assert_eq!(kept.api_key.as_deref(), Some("SG.live-key"));
        assert_eq!(kept.smtp.password.as_deref(), Some("hunter22"));

        // A blank value clears, a new value replaces.
        let update: EmailSettings = serde_json::from_value(serde_json::json!({
            "apiKey": "",
            "smtp": { "password": "new-pass" }
        }))
        .unwrap();
        let merged = update.keep_secrets(&stored);
        assert_eq!(merged.api_key, None);
        assert_eq!(merged.smtp.password.as_deref(), Some("new-pass"));
    }

    #[test]
    fn test_email_settings_validation() {
        let defaults = EmailSettings::default();
        assert_eq!(defaults.smtp.port, 587);
        assert_eq!(defaults.daily_limit, 500);

        let active: EmailSettings = serde_json::from_value(serde_json::json!({
            "isActive": true,
            "fromEmail": "Orders@GiftMart.dev"
        }))
        .unwrap();
        assert_eq!(
            SettingsDocument::validate(active).unwrap_err(),
            ValidationError::new("smtp.host is required for the smtp provider")
        );

        let sendgrid: EmailSettings = serde_json::from_value(serde_json::json!({
            "provider": "sendgrid",
            "isActive": true,
            "fromEmail": "Orders@GiftMart.dev"
        }))
        .unwrap();
        let sendgrid = SettingsDocument::validate(sendgrid).unwrap();
        assert_eq!(sendgrid.from_email.as_deref(), Some("orders@giftmart.dev"));

        let bad: EmailSettings =
            serde_json::from_value(serde_json::json!({ "replyTo": "not-an-email" })).unwrap();
        assert!(SettingsDocument::validate(bad).is_err());
    }

    #[test]
    fn test_sms_needs_sender_when_active() {
        let sms: SmsSettings =
            serde_json::from_value(serde_json::json!({ "provider": "msg91", "isActive": true }))
                .unwrap();
        assert!(SettingsDocument::validate(sms).is_err());
        assert!(SmsSettings::default().templates.otp.contains("{{otp}}"));
    }

    #[test]
    fn test_security_rules() {
        assert!(SettingsDocument::validate(SecuritySettings::default()).is_ok());

        let mut weak = SecuritySettings::default();
        weak.password_policy.min_length = 4;
        assert!(SettingsDocument::validate(weak).is_err());

        let lists: SecuritySettings = serde_json::from_value(serde_json::json!({
            "ipWhitelist": ["10.0.0.0/8", " 192.168.1.4 ", "10.0.0.0/8", "::1"],
            "ipBlacklist": ["203.0.113.0/24"]
        }))
        .unwrap();
        let lists = SettingsDocument::validate(lists).unwrap();
        assert_eq!(lists.ip_whitelist, vec!["10.0.0.0/8", "192.168.1.4", "::1"]);

        let bad_cidr: SecuritySettings =
            serde_json::from_value(serde_json::json!({ "ipBlacklist": ["10.0.0.0/33"] })).unwrap();
        assert!(SettingsDocument::validate(bad_cidr).is_err());

        let both: SecuritySettings = serde_json::from_value(serde_json::json!({
            "ipWhitelist": ["198.51.100.2"],
            "ipBlacklist": ["198.51.100.2"]
        }))
        .unwrap();
        assert!(SettingsDocument::validate(both).is_err());
    }

    #[test]
    fn test_backup_schedule() {
        let defaults = BackupSettings::default();
        assert_eq!(defaults.frequency, BackupFrequency::Weekly);
        assert_eq!(defaults.time, "02:00");

        let late: BackupSettings =
            serde_json::from_value(serde_json::json!({ "time": "25:00" })).unwrap();
        assert!(SettingsDocument::validate(late).is_err());

        let s3: BackupSettings =
            serde_json::from_value(serde_json::json!({ "storageLocation": "s3" })).unwrap();
        assert!(SettingsDocument::validate(s3).is_err());
    }

    #[test]
    fn test_personalization_and_theme() {
        let defaults = PersonalizationSettings::default();
        assert_eq!(defaults.birthday_discount_percent, Decimal::TEN);
        let algorithm: PersonalizationSettings = serde_json::from_value(
            serde_json::json!({ "recommendationAlgorithm": "content-based" }),
        )
        .unwrap();
        assert_eq!(
            algorithm.recommendation_algorithm,
            RecommendationAlgorithm::ContentBased
        );

        let theme: CustomizationSettings = serde_json::from_value(serde_json::json!({
            "theme": { "primaryColor": "#ff5a5f" }
        }))
        .unwrap();
        let theme = SettingsDocument::validate(theme).unwrap();
        assert_eq!(theme.theme.primary_color, "#FF5A5F");
        assert_eq!(theme.theme.font_family, "Inter");

        let bad: CustomizationSettings = serde_json::from_value(serde_json::json!({
            "theme": { "accentColor": "orange" }
        }))
        .unwrap();
        assert!(SettingsDocument::validate(bad).is_err());
    }
}

//! Enums for the notifications hub and the support desk.

define_status! {
    /// Category of an in-app admin notification.
    NotificationType => "market.notification_type" {
        Order = "order",
        System = "system",
        Vendor = "vendor",
        Customer = "customer",
        General = "general",
    }
}

define_status! {
    /// Urgency shared by notifications, alerts, vendor requests, complaints
    /// and support tickets.
    Priority => "market.priority" {
        Low = "low",
        Medium = "medium",
        High = "high",
        Urgent = "urgent",
    }
}

define_status! {
    /// Event that raised an order alert.
    OrderAlertType => "market.order_alert_type" {
        NewOrder = "new_order",
        PaymentReceived = "payment_received",
        PaymentFailed = "payment_failed",
        OrderCancelled = "order_cancelled",
        RefundRequested = "refund_requested",
        DeliveryDelayed = "delivery_delayed",
        OrderReturned = "order_returned",
    }
}

define_status! {
    /// Kind of platform change announced to admins.
    SystemUpdateType => "market.system_update_type" {
        Feature = "feature",
        Maintenance = "maintenance",
        Security = "security",
        BugFix = "bug_fix",
        Performance = "performance",
    }
}

define_status! {
    SystemUpdateStatus => "market.system_update_status" {
        Scheduled = "scheduled",
        InProgress = "in_progress",
        Completed = "completed",
        Cancelled = "cancelled",
    }
}

define_status! {
    /// What a seller is asking the marketplace for.
    VendorRequestType => "market.vendor_request_type" {
        Registration = "registration",
        ProductApproval = "product_approval",
        Payout = "payout",
        AccountUpdate = "account_update",
        Support = "support",
        CommissionDispute = "commission_dispute",
        Other = "other",
    }
}

define_status! {
    VendorRequestStatus => "market.vendor_request_status" {
        Pending = "pending",
        InReview = "in_review",
        Approved = "approved",
        Rejected = "rejected",
        Resolved = "resolved",
    }
}

impl VendorRequestStatus {
    /// Statuses that close the request and stamp `resolved_at`.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Resolved)
    }
}

define_status! {
    ComplaintType => "market.complaint_type" {
        ProductQuality = "product_quality",
        DeliveryIssue = "delivery_issue",
        PaymentIssue = "payment_issue",
        Refund = "refund",
        VendorIssue = "vendor_issue",
        WebsiteBug = "website_bug",
        Other = "other",
    }
}

define_status! {
    ComplaintStatus => "market.complaint_status" {
        New = "new",
        Investigating = "investigating",
        Resolved = "resolved",
        Closed = "closed",
        Escalated = "escalated",
    }
}

impl ComplaintStatus {
    /// Statuses that stamp `resolved_at`.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

define_status! {
    /// Who performed a logged action.
    ActorRole => "market.actor_role" {
        Admin = "admin",
        Seller = "seller",
        Customer = "customer",
        System = "system",
    }
}

define_status! {
    ActivityStatus => "market.activity_status" {
        Success = "success",
        Failed = "failed",
        Pending = "pending",
    }
}

define_status! {
    TicketStatus => "market.ticket_status" {
        Open = "open",
        InProgress = "in_progress",
        Resolved = "resolved",
        Closed = "closed",
    }
}

define_status! {
    /// Display weight of a storefront announcement.
    AnnouncementPriority => "market.announcement_priority" {
        Low = "low",
        Normal = "normal",
        High = "high",
    }
}

define_status! {
    /// Who sees an announcement.
    Audience => "market.audience" {
        All = "all",
        Customers = "customers",
        Sellers = "sellers",
    }
}

define_status! {
    /// Where a seller conversation with the marketplace stands.
    VendorMessageStatus => "market.vendor_message_status" {
        Unread = "unread",
        Read = "read",
        Replied = "replied",
        Closed = "closed",
    }
}

define_status! {
    /// Delivery channel of a message template.
    TemplateChannel => "market.template_channel" {
        Email = "email",
        Sms = "sms",
        Push = "push",
        Whatsapp = "whatsapp",
    }
}

impl TemplateChannel {
    /// Channels whose templates carry a subject line.
    #[must_use]
    pub const fn needs_subject(self) -> bool {
        matches!(self, Self::Email)
    }
}

define_status! {
    TrainingResourceType => "market.training_resource_type" {
        Video = "video",
        Document = "document",
        Webinar = "webinar",
        Guide = "guide",
    }
}

define_status! {
    /// Health of one platform service on the status board.
    ServiceStatus => "market.service_status" {
        Operational = "operational",
        Degraded = "degraded",
        PartialOutage = "partial_outage",
        MajorOutage = "major_outage",
        Maintenance = "maintenance",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_statuses() {
        let closing: Vec<_> = VendorRequestStatus::ALL
            .iter()
            .copied()
            .filter(|s| s.is_final())
            .collect();
        assert_eq!(
            closing,
            vec![
                VendorRequestStatus::Approved,
                VendorRequestStatus::Rejected,
                VendorRequestStatus::Resolved
            ]
        );
        assert!(ComplaintStatus::Closed.is_final());
        assert!(!ComplaintStatus::Escalated.is_final());
    }

    #[test]
    fn test_multiword_labels() {
        assert_eq!(OrderAlertType::DeliveryDelayed.as_str(), "delivery_delayed");
        assert_eq!(
            "commission_dispute".parse::<VendorRequestType>(),
            Ok(VendorRequestType::CommissionDispute)
        );
        assert_eq!(TicketStatus::InProgress.to_string(), "in_progress");
        assert_eq!(
            "partial_outage".parse::<ServiceStatus>(),
            Ok(ServiceStatus::PartialOutage)
        );
    }

    #[test]
    fn test_only_email_templates_need_a_subject() {
        let with_subject: Vec<_> = TemplateChannel::ALL
            .iter()
            .copied()
            .filter(|c| c.needs_subject())
            .collect();
        assert_eq!(with_subject, vec![TemplateChannel::Email]);
    }
}

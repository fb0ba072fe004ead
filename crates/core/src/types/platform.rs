//! Enums for platform settings: payment gateways, backups and greeting cards.

define_status! {
    /// A payment provider the checkout can route through.
    PaymentGateway => "market.payment_gateway" {
        Razorpay = "razorpay",
        Stripe = "stripe",
        Paypal = "paypal",
        Paytm = "paytm",
        Cod = "cod",
    }
}

impl PaymentGateway {
    /// Name shown at checkout when none is configured.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Razorpay => "Razorpay",
            Self::Stripe => "Stripe",
            Self::Paypal => "PayPal",
            Self::Paytm => "Paytm",
            Self::Cod => "Cash on Delivery",
        }
    }
}

define_status! {
    BackupType => "market.backup_type" {
        Full = "full",
        Incremental = "incremental",
        Database = "database",
        Files = "files",
    }
}

define_status! {
    BackupStatus => "market.backup_status" {
        Pending = "pending",
        Running = "running",
        Completed = "completed",
        Failed = "failed",
    }
}

define_status! {
    /// Occasion a greeting card is designed for.
    CardCategory => "market.card_category" {
        Birthday = "birthday",
        Anniversary = "anniversary",
        Wedding = "wedding",
        Festive = "festive",
        ThankYou = "thank_you",
        Congratulations = "congratulations",
        Sympathy = "sympathy",
        Other = "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_labels() {
        assert_eq!(PaymentGateway::Cod.as_str(), "cod");
        assert_eq!(PaymentGateway::Cod.display_name(), "Cash on Delivery");
        assert_eq!("paypal".parse::<PaymentGateway>(), Ok(PaymentGateway::Paypal));
        assert!("upi".parse::<PaymentGateway>().is_err());
    }

    #[test]
    fn test_card_category_labels() {
        assert_eq!(CardCategory::ThankYou.to_string(), "thank_you");
        assert_eq!(CardCategory::ALL.len(), 8);
    }
}

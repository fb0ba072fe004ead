//! Status enums for accounts, catalog, orders and money movement.
//!
//! Transition rules live next to the enums so handlers and the CLI agree on
//! what a legal status change is.

use thiserror::Error;

/// A status string that does not name any variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseStatusError {
    /// Enum that rejected the value.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

define_status! {
    /// Admin role with different permission levels.
    AdminRole => "market.admin_role" {
        /// Everything, including admin account management.
        SuperAdmin = "super_admin",
        /// Full store management.
        Admin = "admin",
        /// Read-only access.
        Viewer = "viewer",
    }
}

impl AdminRole {
    /// Whether this role may change store data.
    #[must_use]
    pub const fn can_write(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }
}

define_status! {
    /// Lifecycle of a customer order.
    OrderStatus => "market.order_status" {
        Pending = "pending",
        Processing = "processing",
        Shipped = "shipped",
        Delivered = "delivered",
        Cancelled = "cancelled",
        Returned = "returned",
        Refunded = "refunded",
    }
}

impl OrderStatus {
    /// Whether an admin may move an order from `self` to `next`.
    ///
    /// `paid` is true when the order carries a gateway payment id; only paid
    /// cancellations can be refunded.
    #[must_use]
    pub const fn can_transition_to(self, next: Self, paid: bool) -> bool {
        match (self, next) {
            (Self::Pending, Self::Processing | Self::Cancelled)
            | (Self::Processing, Self::Shipped | Self::Cancelled)
            | (Self::Shipped, Self::Delivered)
            | (Self::Delivered, Self::Returned)
            | (Self::Returned, Self::Refunded) => true,
            (Self::Cancelled, Self::Refunded) => paid,
            _ => false,
        }
    }

    /// Orders that count toward gross revenue figures.
    #[must_use]
    pub const fn counts_as_revenue(self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Orders that show up in the refunds report.
    #[must_use]
    pub const fn is_refund_related(self) -> bool {
        matches!(self, Self::Cancelled | Self::Returned | Self::Refunded)
    }
}

define_status! {
    /// Moderation state of a seller's product listing.
    ProductStatus => "market.product_status" {
        Pending = "pending",
        Approved = "approved",
        Rejected = "rejected",
    }
}

define_status! {
    /// Stock availability shown to shoppers.
    StockAvailability => "market.stock_availability" {
        InStock = "in_stock",
        LowStock = "low_stock",
        OutOfStock = "out_of_stock",
    }
}

impl StockAvailability {
    /// Stock strictly below this is reported as low.
    pub const LOW_STOCK_BELOW: i32 = 5;

    /// Classify a stock count.
    #[must_use]
    pub const fn classify(stock: i32) -> Self {
        if stock <= 0 {
            Self::OutOfStock
        } else if stock < Self::LOW_STOCK_BELOW {
            Self::LowStock
        } else {
            Self::InStock
        }
    }

    /// Whether the product can be bought at all.
    #[must_use]
    pub const fn is_available(self) -> bool {
        !matches!(self, Self::OutOfStock)
    }
}

define_status! {
    /// State of a seller payout.
    PayoutStatus => "market.payout_status" {
        Pending = "pending",
        Completed = "completed",
        Rejected = "rejected",
    }
}

impl PayoutStatus {
    /// Payouts are processed exactly once: pending to completed or rejected.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Completed | Self::Rejected)
        )
    }
}

define_status! {
    /// Moderation state of a product review.
    ReviewStatus => "market.review_status" {
        Pending = "pending",
        Approved = "approved",
        Rejected = "rejected",
        Reported = "reported",
    }
}

define_status! {
    /// How a coupon's value is applied.
    DiscountType => "market.discount_type" {
        Percentage = "percentage",
        Fixed = "fixed",
    }
}

define_status! {
    /// Kind of add-on gift option.
    GiftType => "market.gift_type" {
        Wrapper = "wrapper",
        Card = "card",
        Message = "message",
        Packaging = "packaging",
        Corporate = "corporate",
        Bulk = "bulk",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_forward_path() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Processing, false));
        assert!(Processing.can_transition_to(Shipped, false));
        assert!(Shipped.can_transition_to(Delivered, false));
        assert!(Delivered.can_transition_to(Returned, false));
        assert!(Returned.can_transition_to(Refunded, false));
    }

    #[test]
    fn test_order_rejects_skips_and_reversals() {
        use OrderStatus::*;
        assert!(!Pending.can_transition_to(Delivered, true));
        assert!(!Delivered.can_transition_to(Pending, true));
        assert!(!Shipped.can_transition_to(Cancelled, true));
        assert!(!Refunded.can_transition_to(Pending, true));
        assert!(!Pending.can_transition_to(Pending, true));
    }

    #[test]
    fn test_cancelled_refund_requires_payment() {
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Refunded, false));
        assert!(OrderStatus::Cancelled.can_transition_to(OrderStatus::Refunded, true));
    }

    #[test]
    fn test_revenue_and_refund_buckets() {
        let revenue: Vec<_> = OrderStatus::ALL
            .iter()
            .filter(|s| s.counts_as_revenue())
            .collect();
        assert_eq!(revenue.len(), 6);
        assert!(OrderStatus::Returned.is_refund_related());
        assert!(!OrderStatus::Delivered.is_refund_related());
    }

    #[test]
    fn test_stock_classification() {
        assert_eq!(StockAvailability::classify(-3), StockAvailability::OutOfStock);
        assert_eq!(StockAvailability::classify(0), StockAvailability::OutOfStock);
        assert_eq!(StockAvailability::classify(1), StockAvailability::LowStock);
        assert_eq!(StockAvailability::classify(4), StockAvailability::LowStock);
        assert_eq!(StockAvailability::classify(5), StockAvailability::InStock);
        assert!(!StockAvailability::OutOfStock.is_available());
        assert!(StockAvailability::LowStock.is_available());
    }

    #[test]
    fn test_payout_processed_once() {
        use PayoutStatus::*;
        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Completed.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn test_admin_role_parse_and_permissions() {
        assert_eq!("super_admin".parse::<AdminRole>().unwrap(), AdminRole::SuperAdmin);
        assert!("owner".parse::<AdminRole>().is_err());
        assert!(AdminRole::Admin.can_write());
        assert!(!AdminRole::Viewer.can_write());
    }

    #[test]
    fn test_wire_labels_match_display() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
        let parsed: StockAvailability = serde_json::from_str("\"out_of_stock\"").unwrap();
        assert_eq!(parsed, StockAvailability::OutOfStock);
    }

    #[test]
    fn test_parse_error_names_the_enum() {
        let err = "lost".parse::<PayoutStatus>().unwrap_err();
        assert_eq!(err.to_string(), "invalid PayoutStatus: lost");
    }
}

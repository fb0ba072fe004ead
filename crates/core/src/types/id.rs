//! Newtype IDs for type-safe entity references.
//!
//! Every table keyed by `SERIAL` gets its own wrapper so a `SellerId` can never
//! be passed where a `ProductId` is expected.

/// Define a type-safe wrapper around an `i32` primary key.
///
/// The generated type is `Copy`, serializes transparently, implements
/// `Display` and converts to and from `i32`. With the `postgres` feature it
/// also encodes and decodes as `INT4`.
///
/// ```rust
/// # use giftmart_core::define_id;
/// define_id!(ShipmentId);
///
/// let id = ShipmentId::new(7);
/// assert_eq!(id.as_i32(), 7);
/// assert_eq!(id.to_string(), "7");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw database key.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// The raw database key.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

// Accounts
define_id!(AdminUserId);
define_id!(CustomerId);
define_id!(SellerId);

// Catalog
define_id!(CategoryId);
define_id!(ProductId);
define_id!(WarehouseId);
define_id!(GiftOptionId);

// Orders and money
define_id!(OrderId);
define_id!(OrderItemId);
define_id!(PayoutId);

// Moderation and marketing
define_id!(ReviewId);
define_id!(CouponId);
define_id!(BannerId);
define_id!(FlashSaleId);

// Notifications hub
define_id!(NotificationId);
define_id!(OrderAlertId);
define_id!(SystemUpdateId);
define_id!(VendorRequestId);
define_id!(ComplaintId);
define_id!(ActivityLogId);

// Support desk
define_id!(TicketId);
define_id!(TicketReplyId);
define_id!(AnnouncementId);
define_id!(VendorMessageId);
define_id!(VendorMessageReplyId);
define_id!(TemplateId);
define_id!(HelpDocId);
define_id!(TrainingResourceId);

// Platform settings
define_id!(ApiKeyId);
define_id!(RoleId);
define_id!(BackupId);
define_id!(GreetingCardId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        let id = SellerId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let back: SellerId = serde_json::from_str("42").unwrap();
        assert_eq!(back, id);
        assert_eq!(i32::from(back), 42);
    }
}

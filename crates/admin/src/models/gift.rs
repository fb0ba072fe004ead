//! Gift add-ons (wrapping, cards, corporate packs).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use giftmart_core::{GiftOptionId, GiftType};

use super::validation::{ValidationError, non_negative, required};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GiftOption {
    pub id: GiftOptionId,
    pub name: String,
    #[serde(rename = "type")]
    pub gift_type: GiftType,
    pub price: Decimal,
    pub images: Vec<String>,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GiftListQuery {
    #[serde(rename = "type")]
    pub gift_type: Option<GiftType>,
}

/// Body for adding or replacing a gift option. `type` arrives as text so an
/// unknown type is a 400 with a readable message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftInput {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub gift_type: Option<String>,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub images: Vec<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGift {
    pub name: String,
    pub gift_type: GiftType,
    pub price: Decimal,
    pub images: Vec<String>,
    pub description: String,
    pub is_active: bool,
}

impl GiftInput {
    /// # Errors
    ///
    /// Returns `ValidationError` for a missing name, type or price, an
    /// unknown type, or a negative price.
    pub fn validate(self) -> Result<NewGift, ValidationError> {
        let name = required("name", self.name.as_deref())?;
        let gift_type = required("type", self.gift_type.as_deref())?
            .parse::<GiftType>()
            .map_err(|e| ValidationError(e.to_string()))?;
        let price = self
            .price
            .ok_or_else(|| ValidationError::new("price is required"))?;
        let price = non_negative("price", price)?;

        Ok(NewGift {
            name,
            gift_type,
            price,
            images: self.images,
            description: self.description.unwrap_or_default().trim().to_string(),
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(value: serde_json::Value) -> GiftInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_gift_validation() {
        let gift = input(serde_json::json!({"name": "Kraft wrap", "type": "wrapper", "price": 49}))
            .validate()
            .unwrap();
        assert_eq!(gift.gift_type, GiftType::Wrapper);
        assert!(gift.is_active);

        assert!(input(serde_json::json!({"name": "x", "type": "balloon", "price": 1}))
            .validate()
            .is_err());
        assert!(input(serde_json::json!({"name": "x", "type": "card"}))
            .validate()
            .is_err());
        assert!(input(serde_json::json!({"name": "x", "type": "card", "price": -5}))
            .validate()
            .is_err());
    }
}

//! Product categories.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use giftmart_core::{CategoryId, Rate};

use super::validation::{ValidationError, rate, required};

/// A product category.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub images: Vec<String>,
    pub commission_rate: Option<Decimal>,
    pub attributes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for creating or replacing a category.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub commission_rate: Option<Decimal>,
    #[serde(default)]
    pub attributes: Vec<String>,
}

/// A category ready to be written.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub images: Vec<String>,
    pub commission_rate: Option<Rate>,
    pub attributes: Vec<String>,
}

impl CategoryInput {
    /// Validate and normalize.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a blank name or an out-of-range rate.
    pub fn validate(self) -> Result<NewCategory, ValidationError> {
        let name = required("name", self.name.as_deref())?;
        let commission_rate = self
            .commission_rate
            .map(|r| rate("commissionRate", r))
            .transpose()?;
        let attributes = self
            .attributes
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .map(String::from)
            .collect();

        Ok(NewCategory {
            name,
            images: self.images,
            commission_rate,
            attributes,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_validation() {
        let input: CategoryInput = serde_json::from_value(serde_json::json!({
            "name": " Hampers ",
            "commissionRate": 12.5,
            "attributes": ["size", " ", "flavour"]
        }))
        .unwrap();
        let category = input.validate().unwrap();
        assert_eq!(category.name, "Hampers");
        assert_eq!(category.attributes, vec!["size", "flavour"]);
        assert_eq!(
            category.commission_rate.unwrap().value(),
            "12.5".parse::<Decimal>().unwrap()
        );

        let input: CategoryInput =
            serde_json::from_value(serde_json::json!({ "name": "X", "commissionRate": 150 }))
                .unwrap();
        assert!(input.validate().is_err());
    }
}

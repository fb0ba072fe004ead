//! Fulfilment warehouses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use giftmart_core::WarehouseId;

use super::validation::{ValidationError, optional, required};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: WarehouseId,
    pub name: String,
    pub location: String,
    pub manager: Option<String>,
    pub contact_number: Option<String>,
    pub capacity: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for creating or replacing a warehouse.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseInput {
    pub name: Option<String>,
    pub location: Option<String>,
    pub manager: Option<String>,
    pub contact_number: Option<String>,
    pub capacity: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWarehouse {
    pub name: String,
    pub location: String,
    pub manager: Option<String>,
    pub contact_number: Option<String>,
    pub capacity: i32,
    pub is_active: bool,
}

impl WarehouseInput {
    /// # Errors
    ///
    /// Returns `ValidationError` for a missing name or location, or a
    /// negative capacity.
    pub fn validate(self) -> Result<NewWarehouse, ValidationError> {
        let name = required("name", self.name.as_deref())?;
        let location = required("location", self.location.as_deref())?;
        let capacity = self.capacity.unwrap_or(0);
        if capacity < 0 {
            return Err(ValidationError::new("capacity cannot be negative"));
        }
        Ok(NewWarehouse {
            name,
            location,
            manager: optional(self.manager.as_deref()),
            contact_number: optional(self.contact_number.as_deref()),
            capacity,
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

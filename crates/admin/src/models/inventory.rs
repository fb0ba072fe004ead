//! Stock levels.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use giftmart_core::{ProductId, StockAvailability};

use super::validation::ValidationError;

/// Stock row for one product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub product_id: ProductId,
    pub name: String,
    pub store_name: String,
    pub price: Decimal,
    pub stock: i32,
    pub availability: StockAvailability,
    pub is_available: bool,
}

/// Inventory overview.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryOverview {
    pub items: Vec<InventoryItem>,
    pub low_stock: Vec<InventoryItem>,
    pub low_stock_threshold: i32,
    pub total_value: Decimal,
    pub out_of_stock_count: usize,
}

impl InventoryOverview {
    /// Summarize `items`: anything below `threshold` is low stock.
    #[must_use]
    pub fn summarize(items: Vec<InventoryItem>, threshold: i32) -> Self {
        let low_stock = items
            .iter()
            .filter(|item| item.stock < threshold)
            .cloned()
            .collect();
        let total_value = items
            .iter()
            .map(|item| item.price * Decimal::from(item.stock.max(0)))
            .sum();
        let out_of_stock_count = items.iter().filter(|item| item.stock <= 0).count();

        Self {
            items,
            low_stock,
            low_stock_threshold: threshold,
            total_value,
            out_of_stock_count,
        }
    }
}

/// Query string for the inventory list.
#[derive(Debug, Default, Deserialize)]
pub struct InventoryQuery {
    pub search: Option<String>,
}

/// Body of `PATCH /inventory/{productId}`.
#[derive(Debug, Deserialize)]
pub struct StockUpdate {
    pub stock: i32,
}

/// One entry of a bulk update.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkStockEntry {
    pub product_id: ProductId,
    pub stock: i32,
}

/// Body of `POST /inventory/bulk`.
#[derive(Debug, Deserialize)]
pub struct BulkStockUpdate {
    #[serde(default)]
    pub updates: Vec<BulkStockEntry>,
}

impl BulkStockUpdate {
    /// # Errors
    ///
    /// Returns `ValidationError` for an empty list or any negative stock.
    pub fn validate(self) -> Result<Vec<BulkStockEntry>, ValidationError> {
        if self.updates.is_empty() {
            return Err(ValidationError::new("updates must not be empty"));
        }
        if let Some(bad) = self.updates.iter().find(|u| u.stock < 0) {
            return Err(ValidationError(format!(
                "stock for product {} cannot be negative",
                bad.product_id
            )));
        }
        Ok(self.updates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i32, price: i64, stock: i32) -> InventoryItem {
        InventoryItem {
            product_id: ProductId::new(id),
            name: format!("Item {id}"),
            store_name: "Petals".to_string(),
            price: Decimal::from(price),
            stock,
            availability: StockAvailability::classify(stock),
            is_available: stock > 0,
        }
    }

    #[test]
    fn test_summarize() {
        let overview =
            InventoryOverview::summarize(vec![item(1, 100, 0), item(2, 50, 4), item(3, 10, 25)], 10);
        assert_eq!(overview.low_stock.len(), 2);
        assert_eq!(overview.out_of_stock_count, 1);
        assert_eq!(overview.total_value, Decimal::from(450));
    }

    #[test]
    fn test_bulk_validation() {
        assert!(BulkStockUpdate { updates: vec![] }.validate().is_err());
        let bad = BulkStockUpdate {
            updates: vec![BulkStockEntry {
                product_id: ProductId::new(7),
                stock: -1,
            }],
        };
        assert_eq!(
            bad.validate().map(|_| ()),
            Err(ValidationError::new("stock for product 7 cannot be negative"))
        );
    }
}

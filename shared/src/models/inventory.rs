//! Inventory Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Inventory item (库存)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub reorder_level: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub cost_per_unit: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl InventoryItem {
    /// At or below the reorder level
    pub fn is_low(&self) -> bool {
        self.quantity <= self.reorder_level
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InventoryItemCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub reorder_level: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub cost_per_unit: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct InventoryItemUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub quantity: Option<Decimal>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub reorder_level: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_stock_threshold_inclusive() {
        let mut item: InventoryItem = serde_json::from_value(serde_json::json!({
            "id": "inv1", "name": "Ceramic coat", "category": null, "unit": "ml",
            "quantity": 5, "reorder_level": 5
        }))
        .unwrap();
        assert!(item.is_low());
        item.quantity = Decimal::new(6, 0);
        assert!(!item.is_low());
    }
}

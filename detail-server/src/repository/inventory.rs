//! Inventory Repository

use serde_json::json;
use shared::models::{
    AlertType, InventoryItem, InventoryItemCreate, InventoryItemUpdate, TableName,
};
use shared::{AppResult, ErrorCode};

use super::{Entity, TableRepository, notify};
use crate::alerts::AlertCenter;

impl Entity for InventoryItem {
    const TABLE: TableName = TableName::Inventory;
    const NOT_FOUND: ErrorCode = ErrorCode::InventoryItemNotFound;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct InventoryRepository {
    table: TableRepository<InventoryItem>,
    alerts: AlertCenter,
}

impl InventoryRepository {
    pub fn new(table: TableRepository<InventoryItem>, alerts: AlertCenter) -> Self {
        Self { table, alerts }
    }

    pub async fn get_all(&self) -> AppResult<Vec<InventoryItem>> {
        self.table.get_all_or_cached().await
    }

    pub async fn create(&self, data: &InventoryItemCreate, actor: &str) -> AppResult<InventoryItem> {
        let item = self.table.create(data).await?;
        self.check_low(&item, actor).await;
        Ok(item)
    }

    pub async fn update(
        &self,
        id: &str,
        data: &InventoryItemUpdate,
        actor: &str,
    ) -> AppResult<InventoryItem> {
        let item = self.table.update(id, data).await?;
        self.check_low(&item, actor).await;
        Ok(item)
    }

    pub async fn remove(&self, id: &str) -> AppResult<()> {
        self.table.remove(id).await
    }

    pub async fn upsert(&self, items: &[InventoryItem]) -> AppResult<()> {
        self.table.upsert(items).await
    }

    async fn check_low(&self, item: &InventoryItem, actor: &str) {
        if !item.is_low() {
            return;
        }
        notify(
            &self.alerts,
            AlertType::InventoryLow,
            format!(
                "{} is low: {} left (reorder at {})",
                item.name, item.quantity, item.reorder_level
            ),
            actor,
            json!({ "id": item.id, "quantity": item.quantity.to_string() }),
        )
        .await;
    }
}

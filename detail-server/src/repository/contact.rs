//! Contact Message Repository

use serde_json::json;
use shared::models::{AlertType, ContactMessage, ContactMessageCreate, TableName};
use shared::AppResult;

use super::{Entity, TableRepository, notify};
use crate::alerts::AlertCenter;

impl Entity for ContactMessage {
    const TABLE: TableName = TableName::ContactMessages;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct ContactMessageRepository {
    table: TableRepository<ContactMessage>,
    alerts: AlertCenter,
}

impl ContactMessageRepository {
    pub fn new(table: TableRepository<ContactMessage>, alerts: AlertCenter) -> Self {
        Self { table, alerts }
    }

    pub async fn get_all(&self) -> AppResult<Vec<ContactMessage>> {
        self.table.get_all().await
    }

    /// Public contact form submission
    pub async fn create(&self, data: &ContactMessageCreate) -> AppResult<ContactMessage> {
        let message = self.table.create(data).await?;
        notify(
            &self.alerts,
            AlertType::ContactMessage,
            format!("New message from {}", message.name),
            &message.email,
            json!({ "id": message.id }),
        )
        .await;
        Ok(message)
    }

    pub async fn remove(&self, id: &str) -> AppResult<()> {
        self.table.remove(id).await
    }

    pub async fn upsert(&self, messages: &[ContactMessage]) -> AppResult<()> {
        self.table.upsert(messages).await
    }
}

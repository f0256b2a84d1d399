//! Customer Repository

use serde_json::json;
use shared::AppResult;
use shared::models::{AlertType, Customer, CustomerCreate, CustomerUpdate, TableName};
use shared::ErrorCode;

use super::{Entity, TableRepository, notify};
use crate::alerts::AlertCenter;

impl Entity for Customer {
    const TABLE: TableName = TableName::Customers;
    const NOT_FOUND: ErrorCode = ErrorCode::CustomerNotFound;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct CustomerRepository {
    table: TableRepository<Customer>,
    alerts: AlertCenter,
}

impl CustomerRepository {
    pub fn new(table: TableRepository<Customer>, alerts: AlertCenter) -> Self {
        Self { table, alerts }
    }

    pub async fn get_all(&self) -> AppResult<Vec<Customer>> {
        self.table.get_all_or_cached().await
    }

    pub async fn create(&self, data: &CustomerCreate, actor: &str) -> AppResult<Customer> {
        let customer = self.table.create(data).await?;
        notify(
            &self.alerts,
            AlertType::CustomerCreated,
            format!("New customer: {}", customer.full_name),
            actor,
            json!({ "id": customer.id }),
        )
        .await;
        Ok(customer)
    }

    pub async fn update(&self, id: &str, data: &CustomerUpdate) -> AppResult<Customer> {
        self.table.update(id, data).await
    }

    pub async fn remove(&self, id: &str) -> AppResult<()> {
        self.table.remove(id).await
    }

    pub async fn upsert(&self, customers: &[Customer]) -> AppResult<()> {
        self.table.upsert(customers).await
    }
}

//! Expense Repository

use serde_json::json;
use shared::models::{AlertType, Expense, ExpenseCreate, ExpenseUpdate, TableName};
use shared::AppResult;

use super::{Entity, TableRepository, notify};
use crate::alerts::AlertCenter;

impl Entity for Expense {
    const TABLE: TableName = TableName::Expenses;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct ExpenseRepository {
    table: TableRepository<Expense>,
    alerts: AlertCenter,
}

impl ExpenseRepository {
    pub fn new(table: TableRepository<Expense>, alerts: AlertCenter) -> Self {
        Self { table, alerts }
    }

    pub async fn get_all(&self) -> AppResult<Vec<Expense>> {
        self.table.get_all().await
    }

    pub async fn create(&self, data: &ExpenseCreate, actor: &str) -> AppResult<Expense> {
        let expense = self.table.create(data).await?;
        notify(
            &self.alerts,
            AlertType::ExpenseAdded,
            format!("Expense added: {} {}", expense.category, expense.amount),
            actor,
            json!({ "id": expense.id }),
        )
        .await;
        Ok(expense)
    }

    pub async fn update(&self, id: &str, data: &ExpenseUpdate) -> AppResult<Expense> {
        self.table.update(id, data).await
    }

    pub async fn remove(&self, id: &str) -> AppResult<()> {
        self.table.remove(id).await
    }

    pub async fn upsert(&self, expenses: &[Expense]) -> AppResult<()> {
        self.table.upsert(expenses).await
    }
}

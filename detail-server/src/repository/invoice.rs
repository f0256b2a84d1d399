//! Invoice Repository

use serde_json::json;
use shared::models::{AlertType, Invoice, InvoiceCreate, InvoiceUpdate, PaymentStatus, TableName};
use shared::{AppResult, ErrorCode};

use super::{Entity, TableRepository, notify};
use crate::alerts::AlertCenter;

impl Entity for Invoice {
    const TABLE: TableName = TableName::Invoices;
    const NOT_FOUND: ErrorCode = ErrorCode::InvoiceNotFound;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct InvoiceRepository {
    table: TableRepository<Invoice>,
    alerts: AlertCenter,
}

impl InvoiceRepository {
    pub fn new(table: TableRepository<Invoice>, alerts: AlertCenter) -> Self {
        Self { table, alerts }
    }

    pub async fn get_all(&self) -> AppResult<Vec<Invoice>> {
        self.table.get_all_or_cached().await
    }

    /// Records `invoice_created`, plus `invoice_unpaid` unless already paid
    pub async fn create(&self, data: &InvoiceCreate, actor: &str) -> AppResult<Invoice> {
        let invoice = self.table.create(data).await?;
        let payload = json!({ "id": invoice.id });
        notify(
            &self.alerts,
            AlertType::InvoiceCreated,
            format!("Invoice #{} created ({})", invoice.invoice_number, invoice.total),
            actor,
            payload.clone(),
        )
        .await;
        if invoice.is_unpaid() {
            notify(
                &self.alerts,
                AlertType::InvoiceUnpaid,
                format!("Invoice #{} unpaid", invoice.invoice_number),
                actor,
                payload,
            )
            .await;
        }
        Ok(invoice)
    }

    pub async fn update(&self, id: &str, data: &InvoiceUpdate, actor: &str) -> AppResult<Invoice> {
        let invoice = self.table.update(id, data).await?;
        if data.payment_status == Some(PaymentStatus::Paid) {
            notify(
                &self.alerts,
                AlertType::InvoicePaid,
                format!("Invoice #{} paid", invoice.invoice_number),
                actor,
                json!({ "id": invoice.id }),
            )
            .await;
        }
        Ok(invoice)
    }

    pub async fn remove(&self, id: &str) -> AppResult<()> {
        self.table.remove(id).await
    }

    pub async fn upsert(&self, invoices: &[Invoice]) -> AppResult<()> {
        self.table.upsert(invoices).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_parts;
    use rust_decimal::Decimal;

    fn input(status: PaymentStatus) -> InvoiceCreate {
        InvoiceCreate {
            invoice_number: "1001".into(),
            customer_id: Some("c1".into()),
            booking_id: None,
            total: Decimal::new(15000, 2),
            payment_status: status,
            due_date: None,
        }
    }

    #[tokio::test]
    async fn test_unpaid_invoice_raises_two_alerts() {
        let (remote, kv, alerts) = test_parts();
        let repo = InvoiceRepository::new(TableRepository::new(remote, kv), alerts.clone());

        repo.create(&input(PaymentStatus::Unpaid), "owner").await.unwrap();

        let kinds: Vec<_> = alerts.list().await.iter().map(|a| a.alert_type).collect();
        assert_eq!(kinds, vec![AlertType::InvoiceCreated, AlertType::InvoiceUnpaid]);
    }

    #[tokio::test]
    async fn test_paid_invoice_raises_one_alert() {
        let (remote, kv, alerts) = test_parts();
        let repo = InvoiceRepository::new(TableRepository::new(remote, kv), alerts.clone());

        repo.create(&input(PaymentStatus::Paid), "owner").await.unwrap();

        let kinds: Vec<_> = alerts.list().await.iter().map(|a| a.alert_type).collect();
        assert_eq!(kinds, vec![AlertType::InvoiceCreated]);
    }

    #[tokio::test]
    async fn test_marking_paid_raises_alert() {
        let (remote, kv, alerts) = test_parts();
        let repo = InvoiceRepository::new(TableRepository::new(remote, kv), alerts.clone());
        let invoice = repo.create(&input(PaymentStatus::Unpaid), "owner").await.unwrap();

        let patch = InvoiceUpdate {
            payment_status: Some(PaymentStatus::Paid),
            ..Default::default()
        };
        let updated = repo.update(&invoice.id, &patch, "owner").await.unwrap();

        assert!(!updated.is_unpaid());
        let last = alerts.list().await.pop().unwrap();
        assert_eq!(last.alert_type, AlertType::InvoicePaid);
    }

    #[tokio::test]
    async fn test_failed_insert_raises_no_alert() {
        let (remote, kv, alerts) = test_parts();
        remote.fail_on("invoices", crate::remote::RemoteOp::Insert);
        let repo = InvoiceRepository::new(TableRepository::new(remote, kv), alerts.clone());

        assert!(repo.create(&input(PaymentStatus::Unpaid), "owner").await.is_err());
        assert!(alerts.list().await.is_empty());
    }
}

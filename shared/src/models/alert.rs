//! Admin Alert Model
//!
//! Alerts are small notification records shown in the admin bell. They live
//! in local storage under [`ALERTS_STORAGE_KEY`], newest last.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::util::{now_millis, now_rfc3339, random_base36};

/// Local-storage key holding the serialized alert list
pub const ALERTS_STORAGE_KEY: &str = "admin_alerts";

/// Default number of alerts kept (oldest evicted first)
pub const DEFAULT_ALERT_CAPACITY: usize = 500;

/// Alert kinds (告警类型)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    BookingCreated,
    BookingUpdated,
    BookingCancelled,
    BookingCompleted,
    CustomerCreated,
    CustomerUpdated,
    InvoiceCreated,
    InvoiceUnpaid,
    InvoicePaid,
    InvoiceOverdue,
    ExpenseAdded,
    InventoryLow,
    InventoryUpdated,
    InventoryUsed,
    PayrollProcessed,
    EmployeeAdded,
    TrainingCompleted,
    CertificationExpiring,
    ContactMessage,
    ReviewReceived,
    CouponCreated,
    PackageUpdated,
    TodoAssigned,
    BackupCompleted,
    RestoreCompleted,
    SystemError,
    /// Kinds written by newer builds
    #[serde(other)]
    Other,
}

impl AlertType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BookingCreated => "booking_created",
            Self::BookingUpdated => "booking_updated",
            Self::BookingCancelled => "booking_cancelled",
            Self::BookingCompleted => "booking_completed",
            Self::CustomerCreated => "customer_created",
            Self::CustomerUpdated => "customer_updated",
            Self::InvoiceCreated => "invoice_created",
            Self::InvoiceUnpaid => "invoice_unpaid",
            Self::InvoicePaid => "invoice_paid",
            Self::InvoiceOverdue => "invoice_overdue",
            Self::ExpenseAdded => "expense_added",
            Self::InventoryLow => "inventory_low",
            Self::InventoryUpdated => "inventory_updated",
            Self::InventoryUsed => "inventory_used",
            Self::PayrollProcessed => "payroll_processed",
            Self::EmployeeAdded => "employee_added",
            Self::TrainingCompleted => "training_completed",
            Self::CertificationExpiring => "certification_expiring",
            Self::ContactMessage => "contact_message",
            Self::ReviewReceived => "review_received",
            Self::CouponCreated => "coupon_created",
            Self::PackageUpdated => "package_updated",
            Self::TodoAssigned => "todo_assigned",
            Self::BackupCompleted => "backup_completed",
            Self::RestoreCompleted => "restore_completed",
            Self::SystemError => "system_error",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One alert in the admin log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// `<type>_<unix-millis>_<6 base36 chars>`
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub message: String,
    pub actor: String,
    /// ISO-8601
    pub timestamp: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub read: bool,
}

impl AlertRecord {
    /// Build a new unread alert with a fresh id
    pub fn new(
        alert_type: AlertType,
        message: impl Into<String>,
        actor: impl Into<String>,
        payload: Option<Value>,
    ) -> Self {
        Self {
            id: alert_id(alert_type),
            alert_type,
            message: message.into(),
            actor: actor.into(),
            timestamp: now_rfc3339(),
            payload: payload.unwrap_or(Value::Null),
            read: false,
        }
    }
}

/// Generate an alert id for `alert_type`
pub fn alert_id(alert_type: AlertType) -> String {
    format!("{}_{}_{}", alert_type.as_str(), now_millis(), random_base36(6))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_alert_id_format() {
        let id = alert_id(AlertType::InvoiceUnpaid);
        let rest = id.strip_prefix("invoice_unpaid_").unwrap();
        let (millis, suffix) = rest.split_once('_').unwrap();
        assert!(millis.parse::<i64>().unwrap() > 0);
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_record_wire_shape() {
        let record = AlertRecord::new(
            AlertType::InvoiceUnpaid,
            "Invoice #100 unpaid",
            "system",
            Some(json!({"id": "i1"})),
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "invoice_unpaid");
        assert_eq!(value["payload"]["id"], "i1");
        assert_eq!(value["read"], false);
    }

    #[test]
    fn test_unknown_kind_parses_as_other() {
        let record: AlertRecord = serde_json::from_value(json!({
            "id": "x", "type": "payroll_reversed", "message": "m",
            "actor": "a", "timestamp": "2026-01-01T00:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(record.alert_type, AlertType::Other);
        assert!(!record.read);
    }
}

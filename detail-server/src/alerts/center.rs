use std::sync::Arc;

use serde_json::Value;
use shared::models::{ALERTS_STORAGE_KEY, AlertRecord, AlertType, DEFAULT_ALERT_CAPACITY};
use shared::{AppError, AppResult};
use tokio::sync::Mutex;

use crate::message::{MessageBus, UiEvent};
use crate::store::LocalStorage;

/// 告警中心 - bounded alert log persisted to local storage
#[derive(Clone)]
pub struct AlertCenter {
    storage: LocalStorage,
    bus: MessageBus,
    capacity: usize,
    /// Serializes read-modify-write cycles on the stored list
    write_lock: Arc<Mutex<()>>,
}

impl AlertCenter {
    pub fn new(storage: LocalStorage, bus: MessageBus) -> Self {
        Self::with_capacity(storage, bus, DEFAULT_ALERT_CAPACITY)
    }

    pub fn with_capacity(storage: LocalStorage, bus: MessageBus, capacity: usize) -> Self {
        Self {
            storage,
            bus,
            capacity: capacity.max(1),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an alert, evicting the oldest beyond capacity
    pub async fn push_alert(
        &self,
        alert_type: AlertType,
        message: impl Into<String>,
        actor: impl Into<String>,
        payload: Option<Value>,
    ) -> AppResult<AlertRecord> {
        let record = AlertRecord::new(alert_type, message, actor, payload);
        let _guard = self.write_lock.lock().await;

        let mut alerts = self.load_raw();
        let entry = serde_json::to_value(&record).map_err(|e| AppError::internal(e.to_string()))?;
        alerts.push(entry);
        if alerts.len() > self.capacity {
            let excess = alerts.len() - self.capacity;
            alerts.drain(..excess);
        }
        self.save(&alerts)?;

        tracing::debug!(id = %record.id, alert_type = %alert_type, "Alert pushed");
        Ok(record)
    }

    /// All alerts, oldest first
    pub async fn list(&self) -> Vec<AlertRecord> {
        decode_records(self.load_raw())
    }

    pub async fn unread_count(&self) -> usize {
        self.list().await.iter().filter(|a| !a.read).count()
    }

    pub async fn mark_read(&self, id: &str) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut alerts = self.load_raw();
        let alert = alerts
            .iter_mut()
            .find(|a| record_id(a) == Some(id))
            .ok_or_else(|| AppError::alert_not_found(id))?;
        if is_read(alert) {
            return Ok(());
        }
        set_read(alert);
        self.save(&alerts)
    }

    /// Mark everything read, returning how many flipped
    pub async fn mark_all_read(&self) -> AppResult<usize> {
        let _guard = self.write_lock.lock().await;
        let mut alerts = self.load_raw();
        let mut flipped = 0;
        for alert in alerts.iter_mut().filter(|a| !is_read(a)) {
            set_read(alert);
            flipped += 1;
        }
        if flipped > 0 {
            self.save(&alerts)?;
        }
        Ok(flipped)
    }

    pub async fn dismiss(&self, id: &str) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut alerts = self.load_raw();
        let before = alerts.len();
        alerts.retain(|a| record_id(a) != Some(id));
        if alerts.len() == before {
            return Err(AppError::alert_not_found(id));
        }
        self.save(&alerts)
    }

    pub async fn clear_all(&self) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        self.save(&[])
    }

    /// Stored entries as written, so kinds and fields this build does not
    /// know survive a rewrite. Only a value that is not a JSON array counts
    /// as empty.
    fn load_raw(&self) -> Vec<Value> {
        match self.storage.get_json::<Vec<Value>>(ALERTS_STORAGE_KEY) {
            Ok(alerts) => alerts.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Stored alerts unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    /// Persist (fires the storage event for other handles) and announce in-process
    fn save(&self, alerts: &[Value]) -> AppResult<()> {
        self.storage.set_json(ALERTS_STORAGE_KEY, alerts)?;
        self.bus.publish(UiEvent::alerts_updated());
        Ok(())
    }
}

/// Decode stored entries one by one; a malformed entry is skipped, not fatal
pub(crate) fn decode_records(raw: Vec<Value>) -> Vec<AlertRecord> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<AlertRecord>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed stored alert");
                None
            }
        })
        .collect()
}

fn record_id(alert: &Value) -> Option<&str> {
    alert.get("id").and_then(Value::as_str)
}

fn is_read(alert: &Value) -> bool {
    alert.get("read").and_then(Value::as_bool).unwrap_or(false)
}

fn set_read(alert: &mut Value) {
    if let Some(fields) = alert.as_object_mut() {
        fields.insert("read".to_string(), Value::Bool(true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryBackend, StorageArea};
    use serde_json::json;
    use shared::ErrorCode;
    use shared::message::UiEventKind;

    fn center() -> AlertCenter {
        AlertCenter::new(StorageArea::in_memory().handle(), MessageBus::new())
    }

    #[tokio::test]
    async fn test_push_and_list() {
        let alerts = center();
        let record = alerts
            .push_alert(
                AlertType::BookingCreated,
                "New booking for Ada",
                "system",
                Some(json!({"id": "b1"})),
            )
            .await
            .unwrap();

        let listed = alerts.list().await;
        assert_eq!(listed, vec![record.clone()]);
        assert!(record.id.starts_with("booking_created_"));
        assert_eq!(alerts.unread_count().await, 1);
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let alerts = center();
        for i in 0..501 {
            alerts
                .push_alert(AlertType::SystemError, format!("alert {}", i), "system", None)
                .await
                .unwrap();
        }

        let listed = alerts.list().await;
        assert_eq!(listed.len(), 500);
        assert_eq!(listed[0].message, "alert 1");
        assert_eq!(listed[499].message, "alert 500");
    }

    #[tokio::test]
    async fn test_mark_all_read() {
        let alerts = center();
        alerts
            .push_alert(
                AlertType::InvoiceUnpaid,
                "Invoice #100 unpaid",
                "system",
                Some(json!({"id": "i1"})),
            )
            .await
            .unwrap();
        alerts
            .push_alert(AlertType::InvoiceCreated, "Invoice #100 created", "system", None)
            .await
            .unwrap();

        assert_eq!(alerts.mark_all_read().await.unwrap(), 2);
        assert!(alerts.list().await.iter().all(|a| a.read));
        assert_eq!(alerts.unread_count().await, 0);
        assert_eq!(alerts.mark_all_read().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_read_and_dismiss() {
        let alerts = center();
        let a = alerts
            .push_alert(AlertType::ContactMessage, "New message", "web", None)
            .await
            .unwrap();
        let b = alerts
            .push_alert(AlertType::InventoryLow, "Wax low", "system", None)
            .await
            .unwrap();

        alerts.mark_read(&a.id).await.unwrap();
        alerts.mark_read(&a.id).await.unwrap();
        assert_eq!(alerts.unread_count().await, 1);

        alerts.dismiss(&a.id).await.unwrap();
        let listed = alerts.list().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, b.id);

        let err = alerts.dismiss(&a.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AlertNotFound);
        let err = alerts.mark_read("missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AlertNotFound);

        alerts.clear_all().await.unwrap();
        assert!(alerts.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_storage_reads_empty() {
        let storage = StorageArea::in_memory().handle();
        storage.set_item(ALERTS_STORAGE_KEY, "{oops").unwrap();
        let alerts = AlertCenter::new(storage, MessageBus::new());

        assert!(alerts.list().await.is_empty());
        alerts
            .push_alert(AlertType::SystemError, "recovered", "system", None)
            .await
            .unwrap();
        assert_eq!(alerts.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_mutation_publishes_event() {
        let bus = MessageBus::new();
        let mut rx = bus.subscribe();
        let alerts = AlertCenter::new(StorageArea::in_memory().handle(), bus);

        alerts
            .push_alert(AlertType::BackupCompleted, "Backup uploaded", "system", None)
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, UiEventKind::AdminAlertsUpdated);
    }

    #[tokio::test]
    async fn test_storage_full_surfaces_error() {
        let storage = StorageArea::new(MemoryBackend::with_quota(32)).handle();
        let alerts = AlertCenter::new(storage, MessageBus::new());
        let err = alerts
            .push_alert(AlertType::SystemError, "too big to fit", "system", None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::StorageFull);
        assert!(alerts.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_kind_survives_push() {
        let storage = StorageArea::in_memory().handle();
        storage
            .set_json(
                ALERTS_STORAGE_KEY,
                &json!([{
                    "id": "a1", "type": "payroll_reversed", "message": "Payroll reversed",
                    "actor": "system", "timestamp": "2026-01-01T00:00:00.000Z",
                    "read": false, "source": "payroll"
                }]),
            )
            .unwrap();
        let alerts = AlertCenter::new(storage.clone(), MessageBus::new());

        alerts
            .push_alert(AlertType::SystemError, "later", "system", None)
            .await
            .unwrap();
        alerts.mark_read("a1").await.unwrap();

        let stored: Vec<Value> = storage.get_json(ALERTS_STORAGE_KEY).unwrap().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0]["type"], "payroll_reversed");
        assert_eq!(stored[0]["source"], "payroll");
        assert_eq!(stored[0]["read"], true);
        assert_eq!(alerts.list().await[0].alert_type, AlertType::Other);
    }

    #[tokio::test]
    async fn test_malformed_entry_does_not_wipe_log() {
        let storage = StorageArea::in_memory().handle();
        storage
            .set_json(
                ALERTS_STORAGE_KEY,
                &json!([
                    {
                        "id": "a1", "type": "invoice_unpaid", "message": "Invoice #7 unpaid",
                        "actor": "system", "timestamp": "2026-01-01T00:00:00.000Z", "read": false
                    },
                    {
                        "id": "a2", "type": "booking_created", "message": "no actor",
                        "timestamp": "2026-01-01T00:00:01.000Z"
                    }
                ]),
            )
            .unwrap();
        let alerts = AlertCenter::new(storage.clone(), MessageBus::new());

        let listed = alerts.list().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "a1");

        alerts
            .push_alert(AlertType::SystemError, "later", "system", None)
            .await
            .unwrap();

        let stored: Vec<Value> = storage.get_json(ALERTS_STORAGE_KEY).unwrap().unwrap();
        let ids: Vec<_> = stored.iter().filter_map(|a| a["id"].as_str()).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(&ids[..2], ["a1", "a2"]);

        alerts.dismiss("a2").await.unwrap();
        assert_eq!(alerts.list().await.len(), 2);
        assert_eq!(alerts.unread_count().await, 2);
    }
}

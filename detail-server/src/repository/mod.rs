//! Repository Module
//!
//! Per-entity accessors over the remote backend. Every method wraps exactly
//! one remote call and propagates its error immediately. Some write paths
//! also record an admin alert; alert failures never fail the write.

pub mod booking;
pub mod contact;
pub mod customer;
pub mod expense;
pub mod inventory;
pub mod invoice;

pub use booking::BookingRepository;
pub use contact::ContactMessageRepository;
pub use customer::CustomerRepository;
pub use expense::ExpenseRepository;
pub use inventory::InventoryRepository;
pub use invoice::InvoiceRepository;

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::models::{AlertType, Row, TableName};
use shared::{AppError, AppResult, ErrorCode};
use validator::Validate;

use crate::alerts::AlertCenter;
use crate::remote::{RemoteError, RemoteTableClient};
use crate::store::KeyValueStore;

/// A typed row of one remote table
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: TableName;
    /// Error code for a missing row
    const NOT_FOUND: ErrorCode = ErrorCode::NotFound;

    fn id(&self) -> &str;
}

/// Key under which [`TableRepository::get_all_or_cached`] mirrors a table
pub fn cache_key(table: TableName) -> String {
    format!("cache:{}", table)
}

/// Generic CRUD over one remote table
pub struct TableRepository<T> {
    remote: Arc<dyn RemoteTableClient>,
    kv: Arc<dyn KeyValueStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for TableRepository<T> {
    fn clone(&self) -> Self {
        Self {
            remote: Arc::clone(&self.remote),
            kv: Arc::clone(&self.kv),
            _marker: PhantomData,
        }
    }
}

impl<T: Entity> TableRepository<T> {
    pub fn new(remote: Arc<dyn RemoteTableClient>, kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            remote,
            kv,
            _marker: PhantomData,
        }
    }

    fn table(&self) -> &'static str {
        T::TABLE.as_str()
    }

    fn key(&self) -> &'static str {
        T::TABLE.conflict_key()
    }

    pub async fn get_all(&self) -> AppResult<Vec<T>> {
        let rows = self.remote.select_all(self.table()).await?;
        decode_rows(rows)
    }

    /// Prefer the remote; mirror its answer locally and fall back to the
    /// mirror when the remote call fails
    pub async fn get_all_or_cached(&self) -> AppResult<Vec<T>> {
        let cache_key = cache_key(T::TABLE);
        match self.remote.select_all(self.table()).await {
            Ok(rows) => {
                let mirror = Value::Array(rows.iter().cloned().map(Value::Object).collect());
                if let Err(e) = self.kv.set_item(&cache_key, &mirror).await {
                    tracing::warn!(table = %T::TABLE, error = %e, "Local mirror not updated");
                }
                decode_rows(rows)
            }
            Err(remote_err) => {
                tracing::warn!(table = %T::TABLE, error = %remote_err, "Remote read failed, using local mirror");
                match self.kv.get_item(&cache_key).await {
                    Ok(Some(cached)) => serde_json::from_value(cached).map_err(|e| {
                        AppError::with_message(ErrorCode::LocalStoreCorrupted, e.to_string())
                    }),
                    _ => Err(remote_err.into()),
                }
            }
        }
    }

    /// Validate, assign an id and insert
    pub async fn create<C>(&self, input: &C) -> AppResult<T>
    where
        C: Serialize + Validate + Sync,
    {
        input.validate()?;
        let mut row = to_row(input)?;
        row.entry("id")
            .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
        let stored = self.remote.insert(self.table(), &row).await?;
        decode_row(stored)
    }

    pub async fn update<P>(&self, id: &str, patch: &P) -> AppResult<T>
    where
        P: Serialize + Validate + Sync,
    {
        patch.validate()?;
        let row = to_row(patch)?;
        if row.is_empty() {
            return Err(AppError::validation("Nothing to update"));
        }
        let stored = self
            .remote
            .update(self.table(), self.key(), id, &row)
            .await
            .map_err(|e| self.not_found_or(e, id))?;
        decode_row(stored)
    }

    pub async fn remove(&self, id: &str) -> AppResult<()> {
        self.remote.delete(self.table(), self.key(), id).await?;
        Ok(())
    }

    /// Insert-or-replace by id; an item without an id is rejected before any remote call
    pub async fn upsert(&self, items: &[T]) -> AppResult<()> {
        if let Some(pos) = items.iter().position(|item| item.id().trim().is_empty()) {
            return Err(AppError::validation(format!("{} row {} has no id", T::TABLE, pos))
                .with_detail("index", pos));
        }
        let rows = items.iter().map(to_row).collect::<AppResult<Vec<Row>>>()?;
        self.remote.upsert(self.table(), &rows, self.key()).await?;
        tracing::debug!(table = %T::TABLE, rows = rows.len(), "Rows upserted");
        Ok(())
    }

    fn not_found_or(&self, err: RemoteError, id: &str) -> AppError {
        match err {
            RemoteError::NoRows { .. } => AppError::with_message(
                T::NOT_FOUND,
                format!("{} {} not found", T::TABLE, id),
            )
            .with_detail("id", id),
            other => other.into(),
        }
    }
}

fn to_row<S: Serialize + ?Sized>(value: &S) -> AppResult<Row> {
    match serde_json::to_value(value) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(_) => Err(AppError::internal("Entity did not serialize to an object")),
        Err(e) => Err(AppError::internal(e.to_string())),
    }
}

fn decode_row<T: DeserializeOwned>(row: Row) -> AppResult<T> {
    serde_json::from_value(Value::Object(row))
        .map_err(|e| AppError::with_message(ErrorCode::RemoteDecodeFailed, e.to_string()))
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Row>) -> AppResult<Vec<T>> {
    rows.into_iter().map(decode_row).collect()
}

/// Record an alert; failures are logged and dropped
pub(crate) async fn notify(
    alerts: &AlertCenter,
    alert_type: AlertType,
    message: String,
    actor: &str,
    payload: Value,
) {
    if let Err(e) = alerts
        .push_alert(alert_type, message, actor, Some(payload))
        .await
    {
        tracing::warn!(alert_type = %alert_type, error = %e, "Alert not recorded");
    }
}

#[cfg(test)]
pub(crate) fn test_parts() -> (
    Arc<crate::remote::MemoryRemote>,
    Arc<crate::store::MemoryKvStore>,
    AlertCenter,
) {
    use crate::message::MessageBus;
    use crate::store::StorageArea;

    let remote = Arc::new(crate::remote::MemoryRemote::new());
    let kv = Arc::new(crate::store::MemoryKvStore::new());
    let alerts = AlertCenter::new(StorageArea::in_memory().handle(), MessageBus::new());
    (remote, kv, alerts)
}

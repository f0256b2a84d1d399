//! Synchronous string storage with cross-handle change events
//!
//! A [`StorageArea`] is the shared backing store (one per browser profile);
//! each open tab holds its own [`LocalStorage`] handle. Writes are visible to
//! every handle immediately, but the change event is only delivered to the
//! handles that did *not* perform the write. Same-handle listeners must rely
//! on an in-process event instead.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::message::StorageEvent;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::{StoreError, StoreResult};

/// key = storage key, value = raw string
const ENTRIES_TABLE: TableDefinition<&str, &str> = TableDefinition::new("local_storage");

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Raw string storage behind a [`StorageArea`]
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
    /// All keys, sorted
    fn keys(&self) -> StoreResult<Vec<String>>;
    fn clear(&self) -> StoreResult<()>;
}

/// In-memory backend with an optional size quota (sum of key and value bytes)
#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: RwLock::default(),
            quota: Some(quota),
        }
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("local storage lock poisoned".into())
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        if let Some(quota) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;
        Ok(entries.keys().cloned().collect())
    }

    fn clear(&self) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.clear();
        Ok(())
    }
}

/// redb backend (`work_dir/local_storage.redb`)
pub struct RedbBackend {
    db: Database,
}

impl RedbBackend {
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ENTRIES_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db })
    }
}

impl StorageBackend for RedbBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ENTRIES_TABLE)?;
        Ok(table.get(key)?.map(|guard| guard.value().to_string()))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ENTRIES_TABLE)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ENTRIES_TABLE)?;
            table.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ENTRIES_TABLE)?;
        let mut keys = Vec::new();
        for entry in table.iter()? {
            let (key, _) = entry?;
            keys.push(key.value().to_string());
        }
        Ok(keys)
    }

    fn clear(&self) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        write_txn.delete_table(ENTRIES_TABLE)?;
        {
            let _ = write_txn.open_table(ENTRIES_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

/// 共享存储区域
pub struct StorageArea {
    backend: Box<dyn StorageBackend>,
    events: broadcast::Sender<StorageEvent>,
}

impl StorageArea {
    pub fn new(backend: impl StorageBackend + 'static) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            backend: Box::new(backend),
            events,
        })
    }

    pub fn in_memory() -> Arc<Self> {
        Self::new(MemoryBackend::new())
    }

    pub fn open(path: impl AsRef<Path>) -> StoreResult<Arc<Self>> {
        Ok(Self::new(RedbBackend::open(path)?))
    }

    /// Open a new handle (one per tab)
    pub fn handle(self: &Arc<Self>) -> LocalStorage {
        LocalStorage {
            id: Uuid::new_v4(),
            area: Arc::clone(self),
        }
    }

    fn notify(&self, event: StorageEvent) {
        // no listeners is fine
        let _ = self.events.send(event);
    }
}

/// Per-tab handle onto a [`StorageArea`]
#[derive(Clone)]
pub struct LocalStorage {
    id: Uuid,
    area: Arc<StorageArea>,
}

impl LocalStorage {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Another handle onto the same area (a second tab)
    pub fn sibling(&self) -> LocalStorage {
        self.area.handle()
    }

    pub fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        self.area.backend.get(key)
    }

    pub fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        let old_value = self.area.backend.get(key)?;
        self.area.backend.set(key, value)?;
        self.area.notify(StorageEvent {
            key: Some(key.to_string()),
            old_value,
            new_value: Some(value.to_string()),
            origin: self.id,
        });
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> StoreResult<()> {
        let Some(old_value) = self.area.backend.get(key)? else {
            return Ok(());
        };
        self.area.backend.remove(key)?;
        self.area.notify(StorageEvent {
            key: Some(key.to_string()),
            old_value: Some(old_value),
            new_value: None,
            origin: self.id,
        });
        Ok(())
    }

    pub fn keys(&self) -> StoreResult<Vec<String>> {
        self.area.backend.keys()
    }

    pub fn clear(&self) -> StoreResult<()> {
        self.area.backend.clear()?;
        self.area.notify(StorageEvent {
            key: None,
            old_value: None,
            new_value: None,
            origin: self.id,
        });
        Ok(())
    }

    /// Read a JSON-encoded value
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.get_item(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Write a JSON-encoded value
    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value)?;
        self.set_item(key, &raw)
    }

    /// Change events raised by other handles
    pub fn subscribe(&self) -> StorageEvents {
        StorageEvents {
            own: self.id,
            rx: self.area.events.subscribe(),
        }
    }
}

/// Storage event stream for one handle; skips the handle's own writes
pub struct StorageEvents {
    own: Uuid,
    rx: broadcast::Receiver<StorageEvent>,
}

impl StorageEvents {
    /// Next foreign event. `Lagged` is surfaced so readers can resync.
    pub async fn recv(&mut self) -> Result<StorageEvent, broadcast::error::RecvError> {
        loop {
            let event = self.rx.recv().await?;
            if event.origin != self.own {
                return Ok(event);
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv)
    pub fn try_recv(&mut self) -> Result<StorageEvent, broadcast::error::TryRecvError> {
        loop {
            let event = self.rx.try_recv()?;
            if event.origin != self.own {
                return Ok(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use broadcast::error::TryRecvError;

    #[test]
    fn test_values_shared_between_handles() {
        let area = StorageArea::in_memory();
        let tab_a = area.handle();
        let tab_b = area.handle();

        tab_a.set_item("theme", "dark").unwrap();
        assert_eq!(tab_b.get_item("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(tab_b.keys().unwrap(), vec!["theme"]);
    }

    #[test]
    fn test_events_skip_writer() {
        let area = StorageArea::in_memory();
        let tab_a = area.handle();
        let tab_b = area.handle();
        let mut events_a = tab_a.subscribe();
        let mut events_b = tab_b.subscribe();

        tab_a.set_item("admin_alerts", "[]").unwrap();

        let event = events_b.try_recv().unwrap();
        assert_eq!(event.key.as_deref(), Some("admin_alerts"));
        assert_eq!(event.old_value, None);
        assert_eq!(event.new_value.as_deref(), Some("[]"));
        assert_eq!(event.origin, tab_a.id());

        assert!(matches!(events_a.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_remove_missing_key_is_silent() {
        let area = StorageArea::in_memory();
        let tab_a = area.handle();
        let mut events_b = area.handle().subscribe();

        tab_a.remove_item("nothing").unwrap();
        assert!(matches!(events_b.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_quota_rejects_write() {
        let area = StorageArea::new(MemoryBackend::with_quota(16));
        let tab = area.handle();
        tab.set_item("a", "12345").unwrap();
        let err = tab.set_item("b", "0123456789abcdef").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
        assert_eq!(tab.get_item("b").unwrap(), None);
    }

    #[test]
    fn test_json_helpers() {
        let tab = StorageArea::in_memory().handle();
        tab.set_json("counts", &vec![1, 2]).unwrap();
        assert_eq!(tab.get_item("counts").unwrap().as_deref(), Some("[1,2]"));
        let counts: Vec<u32> = tab.get_json("counts").unwrap().unwrap();
        assert_eq!(counts, vec![1, 2]);

        tab.set_item("broken", "{not json").unwrap();
        assert!(matches!(
            tab.get_json::<Vec<u32>>("broken"),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn test_redb_backend_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let area = StorageArea::open(dir.path().join("local_storage.redb")).unwrap();
        let tab = area.handle();
        tab.set_item("k1", "v1").unwrap();
        tab.set_item("k2", "v2").unwrap();
        assert_eq!(tab.keys().unwrap(), vec!["k1", "k2"]);
        tab.clear().unwrap();
        assert!(tab.keys().unwrap().is_empty());
    }
}

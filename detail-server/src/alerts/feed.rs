use serde_json::Value;
use shared::message::UiEventKind;
use shared::models::{ALERTS_STORAGE_KEY, AlertRecord};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use super::center::decode_records;
use crate::message::{MessageBus, UiEvent};
use crate::store::{LocalStorage, StorageEvents};

/// Which channel reported the change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertChange {
    /// Another handle rewrote the stored list
    Storage,
    /// Same-process `admin_alerts_updated` event
    Bus,
    /// A channel overflowed; the reader should resync
    Lagged,
}

/// Reader-side view of the alert log, listening on both channels
pub struct AlertFeed {
    storage: LocalStorage,
    storage_events: StorageEvents,
    bus_events: broadcast::Receiver<UiEvent>,
    storage_open: bool,
    bus_open: bool,
}

impl AlertFeed {
    /// `storage` is the reader's own handle
    pub fn new(storage: LocalStorage, bus: &MessageBus) -> Self {
        Self {
            storage_events: storage.subscribe(),
            bus_events: bus.subscribe(),
            storage,
            storage_open: true,
            bus_open: true,
        }
    }

    /// Current alerts as seen through the reader's handle
    pub fn snapshot(&self) -> Vec<AlertRecord> {
        let raw = self
            .storage
            .get_json::<Vec<Value>>(ALERTS_STORAGE_KEY)
            .ok()
            .flatten()
            .unwrap_or_default();
        decode_records(raw)
    }

    /// Wait for the next change to the alert log; `None` once both channels close
    pub async fn changed(&mut self) -> Option<AlertChange> {
        loop {
            if !self.storage_open && !self.bus_open {
                return None;
            }
            tokio::select! {
                event = self.storage_events.recv(), if self.storage_open => match event {
                    Ok(event) if is_alert_key(event.key.as_deref()) => {
                        return Some(AlertChange::Storage);
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(_)) => return Some(AlertChange::Lagged),
                    Err(RecvError::Closed) => self.storage_open = false,
                },
                event = self.bus_events.recv(), if self.bus_open => match event {
                    Ok(event) if event.kind == UiEventKind::AdminAlertsUpdated => {
                        return Some(AlertChange::Bus);
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(_)) => return Some(AlertChange::Lagged),
                    Err(RecvError::Closed) => self.bus_open = false,
                },
            }
        }
    }
}

/// A cleared area (`None` key) affects alerts too
fn is_alert_key(key: Option<&str>) -> bool {
    key.is_none_or(|k| k == ALERTS_STORAGE_KEY)
}
